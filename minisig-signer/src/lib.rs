//! minisign digest signing library
//!
//! Signs BLAKE2b-512 digests with a long-lived minisign key. Every signature
//! carries a versioned JSON trusted comment (`{"at":..,"by":..,"typ":"minisig","v":"1"}`)
//! and a human-readable untrusted comment. Output verifies with stock
//! `minisign -V -H`.
//!
//! # Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use ed25519_dalek::SigningKey;
//! use minisig_signer::keys::{KeyId, KeyPair, SecretKey};
//! use minisig_signer::{decode_hex_digest, Signature, Signer};
//!
//! // Keys normally come from KeyPair::from_files
//! let secret = SecretKey::new(KeyId::new([0x2a; 8]), SigningKey::from_bytes(&[1; 32]));
//! let signer = Signer::new("https://minisig.me", KeyPair::from_secret_key(secret)).unwrap();
//!
//! // Sign digest
//! let digest = decode_hex_digest("ab".repeat(64).as_bytes()).unwrap();
//! let signature = signer.sign_digest(&digest, Utc::now()).unwrap();
//!
//! // Verify signature
//! let parsed = Signature::from_text(&signature.to_text()).unwrap();
//! assert!(signer.verify_digest(&digest, &parsed));
//! assert_eq!(parsed.decode_trusted_comment().unwrap().by, "https://minisig.me");
//! ```

pub mod comment;
pub mod digest;
pub mod error;
pub mod keys;
pub mod signature;
pub mod signer;
pub mod traits;

// Re-export commonly used types
pub use comment::{
    marshal_trusted_comment, render_untrusted_comment, unmarshal_trusted_comment,
    CommentVersion, TrustedComment,
};
pub use digest::{decode_hex_digest, Digest, HashAlgorithm};
pub use error::{Result, SignerError};
pub use keys::{KeyPair, PublicKey, SecretKey};
pub use signature::Signature;
pub use signer::Signer;
pub use traits::DigestSigner;

#[cfg(test)]
mod proptests;
