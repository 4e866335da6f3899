//! Property-based tests for the comment codec and digest decoding.

use chrono::{DateTime, Utc};
use ed25519_dalek::SigningKey;
use proptest::prelude::*;

use crate::comment::{marshal_trusted_comment, unmarshal_trusted_comment, TrustedComment};
use crate::digest::{decode_hex_digest, Digest, HashAlgorithm};
use crate::error::SignerError;
use crate::keys::{KeyId, KeyPair, SecretKey};
use crate::signer::Signer;
use crate::traits::DigestSigner;

fn keys(seed: [u8; 32]) -> KeyPair {
    KeyPair::from_secret_key(SecretKey::new(
        KeyId::new(*b"proptest"),
        SigningKey::from_bytes(&seed),
    ))
}

proptest! {
    /// Any timestamp and identity survive a marshal/unmarshal cycle.
    #[test]
    fn trusted_comment_roundtrip(at in any::<i64>(), by in any::<String>()) {
        let json = marshal_trusted_comment(at, &by).unwrap();
        let decoded = unmarshal_trusted_comment(&json).unwrap();
        prop_assert_eq!(decoded, TrustedComment::new(at, by));
    }

    /// A well-formed comment with a foreign `typ` is a schema error.
    #[test]
    fn foreign_type_rejected(typ in "[a-z]{0,12}", at in any::<i64>()) {
        prop_assume!(typ != "minisig");
        let json = format!(r#"{{"at":{},"by":"x","typ":"{}","v":"1"}}"#, at, typ);
        prop_assert!(matches!(unmarshal_trusted_comment(&json), Err(SignerError::Schema(_))));
    }

    /// A well-formed comment with an unknown version is a schema error.
    #[test]
    fn unknown_version_rejected(v in "[0-9a-z.]{0,6}") {
        prop_assume!(v != "1");
        let json = format!(r#"{{"at":0,"by":"x","typ":"minisig","v":"{}"}}"#, v);
        prop_assert!(matches!(unmarshal_trusted_comment(&json), Err(SignerError::Schema(_))));
    }

    /// A discriminator that is not a JSON string is a schema error, whatever it holds.
    #[test]
    fn non_string_discriminator_rejected(
        raw in prop_oneof![
            Just("null".to_string()),
            any::<i64>().prop_map(|n| n.to_string()),
            any::<bool>().prop_map(|b| b.to_string()),
            "[a-z0-9]{0,8}".prop_map(|s| format!(r#"["{}"]"#, s)),
            "[a-z0-9]{0,8}".prop_map(|s| format!(r#"{{"k":"{}"}}"#, s)),
        ],
        in_typ in any::<bool>(),
    ) {
        let json = if in_typ {
            format!(r#"{{"at":0,"by":"x","typ":{},"v":"1"}}"#, raw)
        } else {
            format!(r#"{{"at":0,"by":"x","typ":"minisig","v":{}}}"#, raw)
        };
        prop_assert!(matches!(unmarshal_trusted_comment(&json), Err(SignerError::Schema(_))));
    }

    /// Hex strings of any length other than 128 are rejected.
    #[test]
    fn wrong_length_hex_rejected(len in 0usize..300) {
        prop_assume!(len != 128);
        let input = "a".repeat(len);
        prop_assert!(matches!(decode_hex_digest(input.as_bytes()), Err(SignerError::Validation(_))));
    }

    /// Any 64 bytes, hex encoded, decode back to themselves.
    #[test]
    fn hex_digest_decodes(bytes in prop::collection::vec(any::<u8>(), 64)) {
        let digest = decode_hex_digest(hex::encode(&bytes).as_bytes()).unwrap();
        prop_assert_eq!(digest.as_bytes(), &bytes[..]);
    }

    /// Whatever the digest, identity and signing time, a fresh signature verifies
    /// and carries the identity and time it was made with.
    #[test]
    fn sign_then_verify(
        seed in prop::array::uniform32(any::<u8>()),
        bytes in prop::collection::vec(any::<u8>(), 64),
        identity in "[^\r\n]{1,32}",
        secs in DateTime::<Utc>::MIN_UTC.timestamp()..=DateTime::<Utc>::MAX_UTC.timestamp(),
    ) {
        let signer = Signer::new(identity.clone(), keys(seed)).unwrap();
        let digest = Digest::from_slice(HashAlgorithm::default(), &bytes).unwrap();
        let at = DateTime::<Utc>::from_timestamp(secs, 0).unwrap();

        let signature = DigestSigner::sign(&signer, &digest, at).unwrap();
        prop_assert!(DigestSigner::verify(&signer, &digest, &signature).unwrap());

        let comment = crate::signature::Signature::from_bytes(&signature)
            .unwrap()
            .decode_trusted_comment()
            .unwrap();
        prop_assert_eq!(comment, TrustedComment::new(secs, identity));
    }
}
