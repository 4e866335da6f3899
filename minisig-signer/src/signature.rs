//! minisign signature format
//!
//! ```text
//! untrusted comment: <untrusted comment>
//! base64("ED" || key_id[8] || ed25519(digest)[64])
//! trusted comment: <trusted comment>
//! base64(ed25519(signature[64] || trusted_comment)[64])
//! ```
//!
//! The `ED` algorithm signs the BLAKE2b-512 hash of the content instead of
//! the content itself, which is exactly what a digest-only signer has. The
//! second (global) signature binds the trusted comment to the first one.
//! Output is accepted by `minisign -V` and `rsign verify`.

use crate::comment::TrustedComment;
use crate::digest::{Digest, HashAlgorithm};
use crate::error::{Result, SignerError};
use crate::keys::{KeyId, PublicKey, SecretKey, KEY_ID_LEN, UNTRUSTED_COMMENT_PREFIX};
use base64::{engine::general_purpose, Engine as _};
use ed25519_dalek::Signer as _;
use std::fmt;
use tracing::debug;

pub const TRUSTED_COMMENT_PREFIX: &str = "trusted comment: ";

const ED25519_SIGNATURE_LEN: usize = 64;
const SIGNATURE_BOX_LEN: usize = 2 + KEY_ID_LEN + ED25519_SIGNATURE_LEN;

/// A parsed or freshly created minisign signature
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    untrusted_comment: String,
    algorithm: HashAlgorithm,
    key_id: KeyId,
    signature: [u8; ED25519_SIGNATURE_LEN],
    trusted_comment: String,
    global_signature: [u8; ED25519_SIGNATURE_LEN],
}

impl Signature {
    /// Sign `digest` and bind both comments to it.
    ///
    /// # Errors
    /// - `Internal` if a comment would break the line-based format
    /// - `Internal` if Ed25519 signing fails
    pub fn create(
        secret: &SecretKey,
        digest: &Digest,
        trusted_comment: &str,
        untrusted_comment: &str,
    ) -> Result<Self> {
        for (name, comment) in [("trusted", trusted_comment), ("untrusted", untrusted_comment)] {
            if comment.contains(['\n', '\r']) {
                return Err(SignerError::Internal(format!(
                    "{} comment contains a line break",
                    name
                )));
            }
        }

        let key = secret.signing_key();

        let signature = key
            .try_sign(digest.as_bytes())
            .map_err(|e| SignerError::Internal(format!("Digest signing failed: {}", e)))?
            .to_bytes();

        let global_signature = key
            .try_sign(&global_message(&signature, trusted_comment))
            .map_err(|e| SignerError::Internal(format!("Comment signing failed: {}", e)))?
            .to_bytes();

        Ok(Self {
            untrusted_comment: untrusted_comment.to_string(),
            algorithm: digest.algorithm(),
            key_id: secret.key_id(),
            signature,
            trusted_comment: trusted_comment.to_string(),
            global_signature,
        })
    }

    /// Parse signature text.
    ///
    /// # Errors
    /// - `MalformedSignature` for anything that is not a four-line minisign
    ///   signature with a supported algorithm
    pub fn from_text(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let mut next_line = |what: &str| {
            lines
                .next()
                .ok_or_else(|| SignerError::MalformedSignature(format!("missing {}", what)))
        };

        let untrusted_comment = next_line("untrusted comment")?
            .strip_prefix(UNTRUSTED_COMMENT_PREFIX)
            .ok_or_else(|| {
                SignerError::MalformedSignature("untrusted comment line has no prefix".to_string())
            })?
            .to_string();

        let signature_box = decode_line(next_line("signature")?, SIGNATURE_BOX_LEN, "signature")?;

        let trusted_comment = next_line("trusted comment")?
            .strip_prefix(TRUSTED_COMMENT_PREFIX)
            .ok_or_else(|| {
                SignerError::MalformedSignature("trusted comment line has no prefix".to_string())
            })?
            .to_string();

        let global_box = decode_line(
            next_line("global signature")?,
            ED25519_SIGNATURE_LEN,
            "global signature",
        )?;

        let algorithm = HashAlgorithm::from_signature_algorithm([signature_box[0], signature_box[1]])
            .ok_or_else(|| {
                SignerError::MalformedSignature(format!(
                    "unsupported signature algorithm {:?}",
                    String::from_utf8_lossy(&signature_box[..2])
                ))
            })?;

        let mut key_id = [0u8; KEY_ID_LEN];
        key_id.copy_from_slice(&signature_box[2..2 + KEY_ID_LEN]);
        let mut signature = [0u8; ED25519_SIGNATURE_LEN];
        signature.copy_from_slice(&signature_box[2 + KEY_ID_LEN..]);
        let mut global_signature = [0u8; ED25519_SIGNATURE_LEN];
        global_signature.copy_from_slice(&global_box);

        Ok(Self {
            untrusted_comment,
            algorithm,
            key_id: KeyId::new(key_id),
            signature,
            trusted_comment,
            global_signature,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| SignerError::MalformedSignature(format!("not UTF-8: {}", e)))?;
        Self::from_text(text)
    }

    /// Four-line text without a trailing newline
    pub fn to_text(&self) -> String {
        let mut signature_box = Vec::with_capacity(SIGNATURE_BOX_LEN);
        signature_box.extend_from_slice(&self.algorithm.signature_algorithm());
        signature_box.extend_from_slice(self.key_id.as_bytes());
        signature_box.extend_from_slice(&self.signature);

        format!(
            "{}{}\n{}\n{}{}\n{}",
            UNTRUSTED_COMMENT_PREFIX,
            self.untrusted_comment,
            general_purpose::STANDARD.encode(signature_box),
            TRUSTED_COMMENT_PREFIX,
            self.trusted_comment,
            general_purpose::STANDARD.encode(self.global_signature),
        )
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_text().into_bytes()
    }

    /// Check both signatures against `public`.
    ///
    /// A signature from another key, over another digest, or with an altered
    /// trusted comment is simply invalid.
    pub fn verify(&self, public: &PublicKey, digest: &Digest) -> bool {
        if self.key_id != public.key_id() {
            debug!(
                "Signature key id {} does not match public key {}",
                self.key_id,
                public.key_id()
            );
            return false;
        }

        if self.algorithm != digest.algorithm() {
            debug!(
                "Signature covers a {} digest, got {}",
                self.algorithm,
                digest.algorithm()
            );
            return false;
        }

        let key = public.verifying_key();
        let signature = ed25519_dalek::Signature::from_bytes(&self.signature);
        if key.verify_strict(digest.as_bytes(), &signature).is_err() {
            debug!("Digest signature verification failed");
            return false;
        }

        let global_signature = ed25519_dalek::Signature::from_bytes(&self.global_signature);
        if key
            .verify_strict(
                &global_message(&self.signature, &self.trusted_comment),
                &global_signature,
            )
            .is_err()
        {
            debug!("Trusted comment signature verification failed");
            return false;
        }

        true
    }

    pub fn untrusted_comment(&self) -> &str {
        &self.untrusted_comment
    }

    pub fn trusted_comment(&self) -> &str {
        &self.trusted_comment
    }

    /// Decode the trusted comment as one written by this service.
    ///
    /// Only meaningful after `verify` succeeded.
    pub fn decode_trusted_comment(&self) -> Result<TrustedComment> {
        TrustedComment::unmarshal(&self.trusted_comment)
    }

    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("algorithm", &self.algorithm)
            .field("key_id", &self.key_id)
            .field("trusted_comment", &self.trusted_comment)
            .finish_non_exhaustive()
    }
}

fn global_message(signature: &[u8; ED25519_SIGNATURE_LEN], trusted_comment: &str) -> Vec<u8> {
    let mut message = Vec::with_capacity(ED25519_SIGNATURE_LEN + trusted_comment.len());
    message.extend_from_slice(signature);
    message.extend_from_slice(trusted_comment.as_bytes());
    message
}

fn decode_line(line: &str, expected_len: usize, what: &str) -> Result<Vec<u8>> {
    let bytes = general_purpose::STANDARD
        .decode(line.trim())
        .map_err(|e| SignerError::MalformedSignature(format!("{} is not base64: {}", what, e)))?;

    if bytes.len() != expected_len {
        return Err(SignerError::MalformedSignature(format!(
            "{} must be {} bytes, got {}",
            what,
            expected_len,
            bytes.len()
        )));
    }

    Ok(bytes)
}
