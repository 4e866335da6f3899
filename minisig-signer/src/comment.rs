//! Trusted and untrusted comment codec
//!
//! Every signature carries two comments:
//!
//! - **Trusted comment**: a small JSON document covered by the global
//!   signature. It is versioned with a `typ`/`v` pair so that comments
//!   written by other tools, or by a future incompatible version of this
//!   service, are rejected instead of being misread.
//! - **Untrusted comment**: free text for humans. Not covered by any
//!   signature.
//!
//! # Wire schema (version 1)
//!
//! ```text
//! {"at":<unix seconds>,"by":"<signer identity>","typ":"minisig","v":"1"}
//! ```

use crate::error::{Result, SignerError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value of the `typ` discriminator
pub const COMMENT_TYPE: &str = "minisig";

/// Go-style RFC 1123 with a numeric zone, e.g. `Thu, 01 Jan 1970 00:00:00 +0000`
const RFC1123Z: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Known trusted comment schema versions.
///
/// Decoding picks the variant from the `typ`/`v` pair; new versions are new
/// variants with their own body layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentVersion {
    V1,
}

impl CommentVersion {
    /// Version written by `marshal`
    pub const CURRENT: CommentVersion = CommentVersion::V1;

    pub fn tag(self) -> &'static str {
        match self {
            CommentVersion::V1 => "1",
        }
    }

    fn from_wire(typ: Option<&str>, v: Option<&str>) -> Option<Self> {
        match (typ, v) {
            (Some(COMMENT_TYPE), Some("1")) => Some(CommentVersion::V1),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct WireCommentV1<'a> {
    at: i64,
    by: &'a str,
    typ: &'static str,
    v: &'static str,
}

/// Discriminator fields. Kept as raw JSON so that a missing, null or
/// non-string discriminator surfaces as a schema mismatch rather than a
/// parse failure.
#[derive(Deserialize)]
struct WireHeader {
    #[serde(default)]
    typ: Option<Value>,
    #[serde(default)]
    v: Option<Value>,
}

impl WireHeader {
    fn typ(&self) -> Option<&str> {
        self.typ.as_ref().and_then(Value::as_str)
    }

    fn v(&self) -> Option<&str> {
        self.v.as_ref().and_then(Value::as_str)
    }
}

/// Discriminator as shown in error messages
fn describe(field: &Option<Value>) -> String {
    match field {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "nothing".to_string(),
    }
}

#[derive(Deserialize)]
struct WireBodyV1 {
    at: i64,
    by: String,
}

/// Payload of a trusted comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedComment {
    /// Signing time, seconds since the Unix epoch (UTC)
    pub at: i64,
    /// Signer identity
    pub by: String,
}

impl TrustedComment {
    pub fn new(at: i64, by: impl Into<String>) -> Self {
        Self { at, by: by.into() }
    }

    /// Serialize with the current schema version
    pub fn marshal(&self) -> Result<String> {
        let wire = WireCommentV1 {
            at: self.at,
            by: &self.by,
            typ: COMMENT_TYPE,
            v: CommentVersion::CURRENT.tag(),
        };

        serde_json::to_string(&wire).map_err(|e| SignerError::Encode(e.to_string()))
    }

    /// Parse a trusted comment, dispatching on its `typ`/`v` pair.
    ///
    /// # Errors
    /// - `Decode` if `data` is not a JSON object of the expected shape
    /// - `Schema` if `typ` or `v` is not a known combination
    pub fn unmarshal(data: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(data).map_err(|e| SignerError::Decode(e.to_string()))?;
        if !value.is_object() {
            return Err(SignerError::Decode(
                "trusted comment is not a JSON object".to_string(),
            ));
        }

        let header =
            WireHeader::deserialize(&value).map_err(|e| SignerError::Decode(e.to_string()))?;

        let version = CommentVersion::from_wire(header.typ(), header.v()).ok_or_else(|| {
            if header.typ() != Some(COMMENT_TYPE) {
                SignerError::Schema(format!(
                    "incorrect 'typ' field. Expected {}, got {}",
                    COMMENT_TYPE,
                    describe(&header.typ)
                ))
            } else {
                SignerError::Schema(format!(
                    "incorrect 'v' field. Expected {}, got {}",
                    CommentVersion::CURRENT.tag(),
                    describe(&header.v)
                ))
            }
        })?;

        match version {
            CommentVersion::V1 => {
                let body =
                    WireBodyV1::deserialize(&value).map_err(|e| SignerError::Decode(e.to_string()))?;
                Ok(Self {
                    at: body.at,
                    by: body.by,
                })
            }
        }
    }
}

pub fn marshal_trusted_comment(at: i64, by: &str) -> Result<String> {
    TrustedComment::new(at, by).marshal()
}

pub fn unmarshal_trusted_comment(data: &str) -> Result<TrustedComment> {
    TrustedComment::unmarshal(data)
}

/// `Signed by <by> at <RFC 1123 time with numeric zone>`
pub fn render_untrusted_comment(by: &str, at: DateTime<Utc>) -> String {
    format!("Signed by {} at {}", by, at.format(RFC1123Z))
}
