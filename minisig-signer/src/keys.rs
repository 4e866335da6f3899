//! minisign key material
//!
//! # Public key box
//!
//! ```text
//! untrusted comment: <free text>
//! base64("Ed" || key_id[8] || ed25519_public[32])
//! ```
//!
//! # Secret key box
//!
//! ```text
//! untrusted comment: <free text>
//! base64("Ed" || kdf[2] || "B2" || salt[32] || opslimit[8] || memlimit[8] || keynum_sk[104])
//!
//! keynum_sk = stream ^ (key_id[8] || ed25519_secret[64] || checksum[32])
//! checksum  = BLAKE2b-256("Ed" || key_id || ed25519_secret)
//! ```
//!
//! `kdf` is `"Sc"` when the key is password protected (the stream comes from
//! scrypt over the password) and two zero bytes when it is stored in clear.
//!
//! Keys are loaded once at startup and never change afterwards. Key
//! generation is deliberately absent: use `minisign -G`.

use crate::error::{Result, SignerError};
use base64::{engine::general_purpose, Engine as _};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as _};
use ed25519_dalek::{SigningKey, VerifyingKey};
use std::fmt;
use std::path::Path;
use tracing::debug;

pub const KEY_ID_LEN: usize = 8;
pub(crate) const UNTRUSTED_COMMENT_PREFIX: &str = "untrusted comment: ";

const KEY_ALGORITHM: [u8; 2] = *b"Ed";
const CHECKSUM_ALGORITHM: [u8; 2] = *b"B2";
const KDF_SCRYPT: [u8; 2] = *b"Sc";
const KDF_NONE: [u8; 2] = [0, 0];

const PUBLIC_KEY_LEN: usize = 32;
const SECRET_KEY_LEN: usize = 64;
const CHECKSUM_LEN: usize = 32;
const SALT_LEN: usize = 32;
const KEYNUM_SK_LEN: usize = KEY_ID_LEN + SECRET_KEY_LEN + CHECKSUM_LEN;

const PUBLIC_BOX_LEN: usize = 2 + KEY_ID_LEN + PUBLIC_KEY_LEN;
const SECRET_BOX_LEN: usize = 2 + 2 + 2 + SALT_LEN + 8 + 8 + KEYNUM_SK_LEN;

type Blake2b256 = Blake2b<U32>;

/// Random 8-byte identifier shared by a public/secret key pair
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyId([u8; KEY_ID_LEN]);

impl KeyId {
    pub const fn new(bytes: [u8; KEY_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_ID_LEN] {
        &self.0
    }
}

/// Same rendering as `minisign -V`: the id read as a little-endian u64, upper hex
impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", u64::from_le_bytes(self.0))
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", self)
    }
}

/// Ed25519 public key tagged with its minisign key id
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    key_id: KeyId,
    key: VerifyingKey,
}

impl PublicKey {
    pub fn new(key_id: KeyId, key: VerifyingKey) -> Self {
        Self { key_id, key }
    }

    /// Parse the bare base64 key line
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| SignerError::Key(format!("Failed to decode public key: {}", e)))?;

        if bytes.len() != PUBLIC_BOX_LEN {
            return Err(SignerError::Key(format!(
                "Invalid public key length: expected {} bytes, got {}",
                PUBLIC_BOX_LEN,
                bytes.len()
            )));
        }

        if bytes[..2] != KEY_ALGORITHM {
            return Err(SignerError::Key(
                "Unsupported public key algorithm".to_string(),
            ));
        }

        let mut key_id = [0u8; KEY_ID_LEN];
        key_id.copy_from_slice(&bytes[2..2 + KEY_ID_LEN]);

        let mut key = [0u8; PUBLIC_KEY_LEN];
        key.copy_from_slice(&bytes[2 + KEY_ID_LEN..]);
        let key = VerifyingKey::from_bytes(&key)
            .map_err(|e| SignerError::Key(format!("Invalid Ed25519 public key: {}", e)))?;

        Ok(Self::new(KeyId::new(key_id), key))
    }

    /// Parse a public key box, with or without its comment line
    pub fn from_text(text: &str) -> Result<Self> {
        let line = key_line(text)
            .ok_or_else(|| SignerError::Key("Public key box is empty".to_string()))?;
        Self::from_base64(line)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let key = Self::from_text(&text)?;
        debug!("Loaded public key {} from {:?}", key.key_id, path.as_ref());
        Ok(key)
    }

    /// Base64 key line as published and accepted by `minisign -P`
    pub fn to_base64(&self) -> String {
        let mut bytes = Vec::with_capacity(PUBLIC_BOX_LEN);
        bytes.extend_from_slice(&KEY_ALGORITHM);
        bytes.extend_from_slice(self.key_id.as_bytes());
        bytes.extend_from_slice(self.key.as_bytes());
        general_purpose::STANDARD.encode(bytes)
    }

    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.key
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}, {})", self.key_id, self.to_base64())
    }
}

/// Decrypted Ed25519 secret key tagged with its minisign key id
#[derive(Clone)]
pub struct SecretKey {
    key_id: KeyId,
    key: SigningKey,
}

impl SecretKey {
    pub fn new(key_id: KeyId, key: SigningKey) -> Self {
        Self { key_id, key }
    }

    /// Parse and decrypt a secret key box.
    ///
    /// Unencrypted boxes ignore `password`.
    ///
    /// # Errors
    /// - `Key` if the box is malformed or uses an unknown algorithm
    /// - `Key` if the checksum does not match (wrong password or corrupt file)
    pub fn from_text(text: &str, password: &str) -> Result<Self> {
        let line = key_line(text)
            .ok_or_else(|| SignerError::Key("Secret key box is empty".to_string()))?;

        let bytes = general_purpose::STANDARD
            .decode(line)
            .map_err(|e| SignerError::Key(format!("Failed to decode secret key: {}", e)))?;

        if bytes.len() != SECRET_BOX_LEN {
            return Err(SignerError::Key(format!(
                "Invalid secret key length: expected {} bytes, got {}",
                SECRET_BOX_LEN,
                bytes.len()
            )));
        }

        let (sig_alg, rest) = bytes.split_at(2);
        let (kdf_alg, rest) = rest.split_at(2);
        let (chk_alg, rest) = rest.split_at(2);
        let (salt, rest) = rest.split_at(SALT_LEN);
        let (opslimit, rest) = rest.split_at(8);
        let (memlimit, keynum_sk) = rest.split_at(8);

        if sig_alg != KEY_ALGORITHM {
            return Err(SignerError::Key(
                "Unsupported secret key algorithm".to_string(),
            ));
        }
        if chk_alg != CHECKSUM_ALGORITHM {
            return Err(SignerError::Key(
                "Unsupported secret key checksum algorithm".to_string(),
            ));
        }

        let mut keynum_sk: [u8; KEYNUM_SK_LEN] = keynum_sk
            .try_into()
            .map_err(|_| SignerError::Key("Truncated secret key".to_string()))?;

        match [kdf_alg[0], kdf_alg[1]] {
            KDF_SCRYPT => {
                let opslimit = u64::from_le_bytes(opslimit.try_into().unwrap_or_default());
                let memlimit = u64::from_le_bytes(memlimit.try_into().unwrap_or_default());
                let stream = derive_stream(password.as_bytes(), salt, opslimit, memlimit)?;
                xor_in_place(&mut keynum_sk, &stream);
            }
            KDF_NONE => {
                debug!("Secret key is stored unencrypted");
            }
            _ => {
                return Err(SignerError::Key(
                    "Unsupported secret key KDF algorithm".to_string(),
                ))
            }
        }

        let mut key_id = [0u8; KEY_ID_LEN];
        key_id.copy_from_slice(&keynum_sk[..KEY_ID_LEN]);
        let mut secret = [0u8; SECRET_KEY_LEN];
        secret.copy_from_slice(&keynum_sk[KEY_ID_LEN..KEY_ID_LEN + SECRET_KEY_LEN]);
        let stored_checksum = &keynum_sk[KEY_ID_LEN + SECRET_KEY_LEN..];

        if checksum(&key_id, &secret)[..] != stored_checksum[..] {
            return Err(SignerError::Key(
                "Secret key checksum mismatch (wrong password?)".to_string(),
            ));
        }

        let key = SigningKey::from_keypair_bytes(&secret)
            .map_err(|e| SignerError::Key(format!("Invalid Ed25519 secret key: {}", e)))?;

        Ok(Self::new(KeyId::new(key_id), key))
    }

    pub fn from_file<P: AsRef<Path>>(path: P, password: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let key = Self::from_text(&text, password)?;
        debug!("Loaded secret key {} from {:?}", key.key_id, path.as_ref());
        Ok(key)
    }

    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::new(self.key_id, self.key.verifying_key())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.key
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({}, <redacted>)", self.key_id)
    }
}

/// Matching secret and public key
#[derive(Clone, Debug)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Pair a secret key with a separately loaded public key.
    ///
    /// # Errors
    /// - `Key` if the key ids or the Ed25519 keys differ
    pub fn new(secret: SecretKey, public: PublicKey) -> Result<Self> {
        if secret.key_id() != public.key_id() {
            return Err(SignerError::Key(format!(
                "Key id mismatch: secret key {} vs public key {}",
                secret.key_id(),
                public.key_id()
            )));
        }

        if secret.public_key() != public {
            return Err(SignerError::Key(
                "Public key does not belong to the secret key".to_string(),
            ));
        }

        Ok(Self { secret, public })
    }

    pub fn from_secret_key(secret: SecretKey) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }

    pub fn from_files<P: AsRef<Path>, S: AsRef<Path>>(
        public_key_path: P,
        secret_key_path: S,
        password: &str,
    ) -> Result<Self> {
        let public = PublicKey::from_file(public_key_path)?;
        let secret = SecretKey::from_file(secret_key_path, password)?;
        Self::new(secret, public)
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }
}

/// First line that is neither blank nor an untrusted comment
fn key_line(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with(UNTRUSTED_COMMENT_PREFIX.trim_end()))
}

fn checksum(key_id: &[u8; KEY_ID_LEN], secret: &[u8; SECRET_KEY_LEN]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Blake2b256::new();
    hasher.update(KEY_ALGORITHM);
    hasher.update(key_id);
    hasher.update(secret);
    hasher.finalize().into()
}

fn xor_in_place(target: &mut [u8], stream: &[u8]) {
    for (byte, mask) in target.iter_mut().zip(stream) {
        *byte ^= mask;
    }
}

/// scrypt keystream for `keynum_sk`, using the libsodium
/// `crypto_pwhash_scryptsalsa208sha256` mapping from ops/mem limits to N, r, p.
fn derive_stream(
    password: &[u8],
    salt: &[u8],
    opslimit: u64,
    memlimit: u64,
) -> Result<[u8; KEYNUM_SK_LEN]> {
    let params = scrypt_params(opslimit, memlimit)?;
    let mut stream = [0u8; KEYNUM_SK_LEN];
    scrypt::scrypt(password, salt, &params, &mut stream)
        .map_err(|e| SignerError::Key(format!("Key derivation failed: {}", e)))?;
    Ok(stream)
}

fn scrypt_params(opslimit: u64, memlimit: u64) -> Result<scrypt::Params> {
    const R: u32 = 8;
    let opslimit = opslimit.max(32768);

    let (log_n, p) = if opslimit < memlimit / 32 {
        let max_n = opslimit / (u64::from(R) * 4);
        (log2_at_most(max_n), 1)
    } else {
        let max_n = memlimit / (u64::from(R) * 128);
        let log_n = log2_at_most(max_n);
        let max_rp = ((opslimit / 4) / (1u64 << log_n)).min(0x3fff_ffff);
        (log_n, (max_rp / u64::from(R)) as u32)
    };

    scrypt::Params::new(log_n, R, p, scrypt::Params::RECOMMENDED_LEN).map_err(|e| {
        SignerError::Key(format!(
            "Unusable scrypt parameters (log_n={}, r={}, p={}): {}",
            log_n, R, p, e
        ))
    })
}

fn log2_at_most(max_n: u64) -> u8 {
    let mut log_n = 1u8;
    while log_n < 63 && (1u64 << log_n) <= max_n / 2 {
        log_n += 1;
    }
    log_n
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use rand::RngCore;

    /// Cheap parameters: N = 2^10, r = 8, p = 1
    const TEST_OPSLIMIT: u64 = 32768;
    const TEST_MEMLIMIT: u64 = 1 << 20;

    fn encode_secret_box(secret: &SecretKey, kdf: [u8; 2], password: &str) -> String {
        let key_id = *secret.key_id().as_bytes();
        let keypair_bytes = secret.signing_key().to_keypair_bytes();

        let mut keynum_sk = Vec::with_capacity(KEYNUM_SK_LEN);
        keynum_sk.extend_from_slice(&key_id);
        keynum_sk.extend_from_slice(&keypair_bytes);
        keynum_sk.extend_from_slice(&checksum(&key_id, &keypair_bytes));

        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        if kdf == KDF_SCRYPT {
            let stream =
                derive_stream(password.as_bytes(), &salt, TEST_OPSLIMIT, TEST_MEMLIMIT).unwrap();
            xor_in_place(&mut keynum_sk, &stream);
        }

        let mut bytes = Vec::with_capacity(SECRET_BOX_LEN);
        bytes.extend_from_slice(&KEY_ALGORITHM);
        bytes.extend_from_slice(&kdf);
        bytes.extend_from_slice(&CHECKSUM_ALGORITHM);
        bytes.extend_from_slice(&salt);
        bytes.extend_from_slice(&TEST_OPSLIMIT.to_le_bytes());
        bytes.extend_from_slice(&TEST_MEMLIMIT.to_le_bytes());
        bytes.extend_from_slice(&keynum_sk);

        format!(
            "untrusted comment: minisign encrypted secret key\n{}\n",
            general_purpose::STANDARD.encode(bytes)
        )
    }

    fn random_secret_key() -> SecretKey {
        let mut key_id = [0u8; KEY_ID_LEN];
        OsRng.fill_bytes(&mut key_id);
        SecretKey::new(KeyId::new(key_id), SigningKey::generate(&mut OsRng))
    }

    #[test]
    fn test_key_id_display() {
        let id = KeyId::new([0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(id.to_string(), "0807060504030201");
    }

    #[test]
    fn test_public_key_text_roundtrip() {
        let public = random_secret_key().public_key();
        let text = format!(
            "untrusted comment: minisign public key {}\n{}\n",
            public.key_id(),
            public
        );

        assert_eq!(PublicKey::from_text(&text).unwrap(), public);
        assert_eq!(PublicKey::from_base64(&public.to_base64()).unwrap(), public);
    }

    #[test]
    fn test_known_public_key() {
        // From the minisign README
        let public =
            PublicKey::from_base64("RWQf6LRCGA9i53mlYecO4IzT51TGPpvWucNSCh1CBM0QTaLn73Y7GFO3")
                .unwrap();
        assert_eq!(public.key_id().to_string(), "E7620F1842B4E81F");
    }

    #[test]
    fn test_public_key_wrong_algorithm() {
        let public = random_secret_key().public_key();
        let mut bytes = general_purpose::STANDARD
            .decode(public.to_base64())
            .unwrap();
        bytes[0] = b'X';
        let result = PublicKey::from_base64(&general_purpose::STANDARD.encode(bytes));
        assert!(matches!(result, Err(SignerError::Key(_))));
    }

    #[test]
    fn test_public_key_rejects_garbage() {
        assert!(PublicKey::from_text("").is_err());
        assert!(PublicKey::from_text("untrusted comment: nothing else\n").is_err());
        assert!(PublicKey::from_base64("not base64!").is_err());
        assert!(PublicKey::from_base64("RWQf6LRC").is_err());
    }

    #[test]
    fn test_unencrypted_secret_key() {
        let secret = random_secret_key();
        let text = encode_secret_box(&secret, KDF_NONE, "");

        let loaded = SecretKey::from_text(&text, "ignored").unwrap();
        assert_eq!(loaded.key_id(), secret.key_id());
        assert_eq!(loaded.public_key(), secret.public_key());
    }

    #[test]
    fn test_encrypted_secret_key() {
        let secret = random_secret_key();
        let text = encode_secret_box(&secret, KDF_SCRYPT, "correct horse");

        let loaded = SecretKey::from_text(&text, "correct horse").unwrap();
        assert_eq!(loaded.public_key(), secret.public_key());
    }

    #[test]
    fn test_encrypted_secret_key_empty_password() {
        let secret = random_secret_key();
        let text = encode_secret_box(&secret, KDF_SCRYPT, "");

        let loaded = SecretKey::from_text(&text, "").unwrap();
        assert_eq!(loaded.public_key(), secret.public_key());
    }

    #[test]
    fn test_wrong_password() {
        let secret = random_secret_key();
        let text = encode_secret_box(&secret, KDF_SCRYPT, "correct horse");

        match SecretKey::from_text(&text, "battery staple") {
            Err(SignerError::Key(msg)) => assert!(msg.contains("checksum mismatch")),
            other => panic!("Expected checksum failure, got {:?}", other),
        }
    }

    #[test]
    fn test_secret_key_wrong_length() {
        let text = general_purpose::STANDARD.encode([0u8; 100]);
        match SecretKey::from_text(&text, "") {
            Err(SignerError::Key(msg)) => assert!(msg.contains("Invalid secret key length")),
            other => panic!("Expected length error, got {:?}", other),
        }
    }

    #[test]
    fn test_keypair_mismatch() {
        let a = random_secret_key();
        let b = random_secret_key();

        assert!(KeyPair::new(a.clone(), a.public_key()).is_ok());
        assert!(KeyPair::new(a.clone(), b.public_key()).is_err());

        // Same id, different key
        let forged = PublicKey::new(a.key_id(), *b.public_key().verifying_key());
        assert!(KeyPair::new(a, forged).is_err());
    }

    #[test]
    fn test_scrypt_params_small() {
        let params = scrypt_params(TEST_OPSLIMIT, TEST_MEMLIMIT).unwrap();
        assert_eq!(params.log_n(), 10);
        assert_eq!(params.r(), 8);
        assert_eq!(params.p(), 1);
    }

    #[test]
    fn test_scrypt_params_minisign_defaults() {
        // minisign: opslimit = 33554432, memlimit = 1073741824
        let params = scrypt_params(33_554_432, 1_073_741_824).unwrap();
        assert_eq!(params.log_n(), 20);
        assert_eq!(params.r(), 8);
        assert_eq!(params.p(), 1);
    }

    #[test]
    fn test_secret_key_debug_redacted() {
        let secret = random_secret_key();
        let rendered = format!("{:?}", secret);
        assert!(rendered.contains("redacted"));
    }
}
