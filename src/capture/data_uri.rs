//! `data:<mime>;base64,<payload>` handling.
//!
//! Images travel through the whole app as data URIs: they are what the
//! model receives inline, what the favorites store persists, and what the
//! report shows. Parsing checks the shape only; the payload is not decoded.

use crate::error::SchemaError;
use base64::Engine;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn data_uri_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^data:(?P<mime>[A-Za-z]+/[A-Za-z0-9.+-]+);base64,(?P<payload>[A-Za-z0-9+/]+={0,2})$")
            .expect("data URI pattern is a valid regex")
    })
}

/// A parsed data URI. Displays back to its canonical string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    mime_type: String,
    payload: String,
}

impl DataUri {
    /// Parse a data URI string. `field` names the value in the error.
    pub fn parse(raw: &str, field: &str) -> Result<Self, SchemaError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(SchemaError::new(field, "is empty"));
        }
        if !raw.starts_with("data:") {
            return Err(SchemaError::new(field, "must start with 'data:'"));
        }
        if !raw.contains(";base64,") {
            return Err(SchemaError::new(field, "must use base64 encoding"));
        }
        let caps = data_uri_pattern().captures(raw).ok_or_else(|| {
            SchemaError::new(field, "must look like data:<mimetype>;base64,<encoded_data>")
        })?;
        Ok(Self {
            mime_type: caps["mime"].to_lowercase(),
            payload: caps["payload"].to_string(),
        })
    }

    /// Build a data URI from raw bytes.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            payload: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 payload without the `data:` header.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.payload)
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.payload)
    }
}
