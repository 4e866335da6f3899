//! Digest input handling
//!
//! Callers never send the content itself, only its hash. The hash function
//! that produced the digest is carried next to the bytes so that the length
//! check and the algorithm tag written into the signature cannot drift apart.

use crate::error::{Result, SignerError};
use std::fmt;

/// Hash functions a digest may come from.
///
/// Only BLAKE2b-512 is accepted today; that is what `minisign -H` and the
/// prehashed `ED` signature algorithm expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    #[default]
    Blake2b512,
}

impl HashAlgorithm {
    /// Output size in bytes
    pub const fn digest_size(self) -> usize {
        match self {
            HashAlgorithm::Blake2b512 => 64,
        }
    }

    /// Signature algorithm tag written in front of the key id
    pub const fn signature_algorithm(self) -> [u8; 2] {
        match self {
            HashAlgorithm::Blake2b512 => *b"ED",
        }
    }

    pub fn from_signature_algorithm(tag: [u8; 2]) -> Option<Self> {
        match &tag {
            b"ED" => Some(HashAlgorithm::Blake2b512),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Blake2b512 => "BLAKE2b-512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const BLAKE2B_512_SIZE: usize = HashAlgorithm::Blake2b512.digest_size();

/// A validated content digest
#[derive(Clone, PartialEq, Eq)]
pub struct Digest {
    algorithm: HashAlgorithm,
    bytes: [u8; BLAKE2B_512_SIZE],
}

impl Digest {
    /// Wrap raw BLAKE2b-512 output
    pub fn blake2b_512(bytes: [u8; BLAKE2B_512_SIZE]) -> Self {
        Self {
            algorithm: HashAlgorithm::Blake2b512,
            bytes,
        }
    }

    pub fn from_slice(algorithm: HashAlgorithm, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != algorithm.digest_size() {
            return Err(SignerError::Validation(format!(
                "{} digest must be {} bytes, got {}",
                algorithm,
                algorithm.digest_size(),
                bytes.len()
            )));
        }

        let mut out = [0u8; BLAKE2B_512_SIZE];
        out.copy_from_slice(bytes);
        Ok(Self {
            algorithm,
            bytes: out,
        })
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}:{})", self.algorithm, self.to_hex())
    }
}

/// Decode a hex digest produced by `algorithm`.
///
/// # Errors
/// - `Validation` if the input is empty
/// - `Validation` if it is not `2 * digest_size` characters long
/// - `Validation` if it contains non-hex characters
pub fn decode_hex_digest_with(algorithm: HashAlgorithm, hex_input: &[u8]) -> Result<Digest> {
    if hex_input.is_empty() {
        return Err(SignerError::Validation("digest is empty".to_string()));
    }

    let expected = algorithm.digest_size() * 2;
    if hex_input.len() != expected {
        return Err(SignerError::Validation(format!(
            "hex digest is the wrong length: expected {} characters, got {}",
            expected,
            hex_input.len()
        )));
    }

    let bytes = hex::decode(hex_input)
        .map_err(|e| SignerError::Validation(format!("hex digest is not valid hex: {}", e)))?;

    Digest::from_slice(algorithm, &bytes)
}

/// Decode a hex-encoded BLAKE2b-512 digest
pub fn decode_hex_digest(hex_input: &[u8]) -> Result<Digest> {
    decode_hex_digest_with(HashAlgorithm::Blake2b512, hex_input)
}
