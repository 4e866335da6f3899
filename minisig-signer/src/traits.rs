/// Interface the HTTP layer signs through
use crate::digest::Digest;
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Digest signer trait
///
/// Implementations hold their keys immutably and must be safe to call from
/// any number of request handlers at once.
pub trait DigestSigner: Send + Sync {
    /// Sign digest, returning signature text without a trailing newline
    fn sign(&self, digest: &Digest, at: DateTime<Utc>) -> Result<Vec<u8>>;

    /// Verify signature text against digest
    ///
    /// `Ok(false)` for a well-formed but invalid signature, `Err` only when
    /// the text cannot be parsed.
    fn verify(&self, digest: &Digest, signature: &[u8]) -> Result<bool>;

    /// Base64 public key line
    fn public_key_text(&self) -> String;

    /// Value written into the `by` field of every trusted comment
    fn identity(&self) -> &str;

    /// Public key document as served to clients:
    ///
    /// ```text
    /// untrusted comment: <identity> public key
    /// <base64 key>
    /// ```
    fn public_key_document(&self) -> String {
        format!(
            "untrusted comment: {} public key\n{}",
            self.identity(),
            self.public_key_text()
        )
    }
}
