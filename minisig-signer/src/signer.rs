//! Digest signer
//!
//! Owns the identity and the keypair for the life of the process. All
//! operations take `&self`; there is nothing to lock.
//!
//! # Signing flow
//!
//! ```text
//! (digest, at)
//!     ↓
//! TrustedComment { at, by: identity }  →  JSON
//! "Signed by <identity> at <time>"
//!     ↓
//! Ed25519(digest)  +  Ed25519(signature || trusted comment)
//!     ↓
//! minisign signature text
//! ```

use crate::comment::{render_untrusted_comment, TrustedComment};
use crate::digest::Digest;
use crate::error::{Result, SignerError};
use crate::keys::{KeyPair, PublicKey};
use crate::signature::Signature;
use crate::traits::DigestSigner;
use chrono::{DateTime, Utc};
use tracing::debug;

/// minisign signer bound to one identity and one keypair
///
/// # Example
///
/// ```rust
/// use chrono::{DateTime, Utc};
/// use ed25519_dalek::SigningKey;
/// use minisig_signer::keys::{KeyId, KeyPair, SecretKey};
/// use minisig_signer::{decode_hex_digest, DigestSigner, Signer};
///
/// let secret = SecretKey::new(KeyId::new([1; 8]), SigningKey::from_bytes(&[7; 32]));
/// let signer = Signer::new("https://example.test", KeyPair::from_secret_key(secret)).unwrap();
///
/// let digest = decode_hex_digest("0".repeat(128).as_bytes()).unwrap();
/// let at = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
/// let signature = DigestSigner::sign(&signer, &digest, at).unwrap();
///
/// assert!(DigestSigner::verify(&signer, &digest, &signature).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct Signer {
    identity: String,
    keys: KeyPair,
}

impl Signer {
    /// Create a signer.
    ///
    /// # Errors
    /// - `Validation` if `identity` is empty or spans several lines
    pub fn new(identity: impl Into<String>, keys: KeyPair) -> Result<Self> {
        let identity = identity.into();

        if identity.is_empty() {
            return Err(SignerError::Validation(
                "signer identity is empty".to_string(),
            ));
        }
        if identity.contains(['\n', '\r']) {
            return Err(SignerError::Validation(
                "signer identity must be a single line".to_string(),
            ));
        }

        debug!(
            "Created signer for {} with key {}",
            identity,
            keys.public_key().key_id()
        );

        Ok(Self { identity, keys })
    }

    /// Trusted and untrusted comment for a signature made at `at`
    pub fn comments(&self, at: DateTime<Utc>) -> Result<(String, String)> {
        let trusted = TrustedComment::new(at.timestamp(), self.identity.as_str()).marshal()?;
        let untrusted = render_untrusted_comment(&self.identity, at);
        Ok((trusted, untrusted))
    }

    /// Sign `digest` as of `at`.
    ///
    /// # Errors
    /// - `Internal` if the trusted comment cannot be encoded
    /// - `Internal` if the signing primitive fails
    pub fn sign_digest(&self, digest: &Digest, at: DateTime<Utc>) -> Result<Signature> {
        let (trusted, untrusted) = self.comments(at).map_err(|e| match e {
            SignerError::Encode(msg) => SignerError::Internal(msg),
            other => other,
        })?;

        let signature = Signature::create(self.keys.secret_key(), digest, &trusted, &untrusted)?;

        debug!(
            "Signed {} digest {} at {}",
            digest.algorithm(),
            digest.to_hex(),
            at.timestamp()
        );

        Ok(signature)
    }

    pub fn verify_digest(&self, digest: &Digest, signature: &Signature) -> bool {
        signature.verify(self.keys.public_key(), digest)
    }

    pub fn public_key(&self) -> &PublicKey {
        self.keys.public_key()
    }
}

impl DigestSigner for Signer {
    fn sign(&self, digest: &Digest, at: DateTime<Utc>) -> Result<Vec<u8>> {
        Ok(self.sign_digest(digest, at)?.to_bytes())
    }

    fn verify(&self, digest: &Digest, signature: &[u8]) -> Result<bool> {
        let signature = Signature::from_bytes(signature)?;
        Ok(self.verify_digest(digest, &signature))
    }

    fn public_key_text(&self) -> String {
        self.keys.public_key().to_base64()
    }

    fn identity(&self) -> &str {
        &self.identity
    }
}
