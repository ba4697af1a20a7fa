//! HTTP method and captured response types.
//!
//! All fields use owned types (`String`, `Vec`) so values can cross FFI
//! boundaries without lifetime concerns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    /// Every method, in the order the method selector shows them.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownMethod(s.to_string()))
    }
}

/// A response as captured by the executor.
///
/// Produced once per successful exchange, whatever the status code. Headers
/// keep the order the server sent them; repeated names are folded into one
/// entry joined by `", "`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSnapshot {
    pub status_code: u16,
    pub reason_phrase: String,
    pub headers: Vec<(String, String)>,
    pub body_bytes: Vec<u8>,
    pub elapsed_ms: f64,
    pub decoded_json: Option<Value>,
}

impl ResponseSnapshot {
    /// Build a snapshot, attempting a JSON decode of `body_bytes`.
    /// A body that is not JSON leaves `decoded_json` empty.
    pub fn new(
        status_code: u16,
        reason_phrase: String,
        headers: Vec<(String, String)>,
        body_bytes: Vec<u8>,
        elapsed_ms: f64,
    ) -> Self {
        let decoded_json = serde_json::from_slice(&body_bytes).ok();
        Self {
            status_code,
            reason_phrase,
            headers,
            body_bytes,
            elapsed_ms,
            decoded_json,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn size_bytes(&self) -> usize {
        self.body_bytes.len()
    }

    /// `"404 Not Found"`, or just the code when no reason is known.
    pub fn status_line(&self) -> String {
        if self.reason_phrase.is_empty() {
            self.status_code.to_string()
        } else {
            format!("{} {}", self.status_code, self.reason_phrase)
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body_bytes).into_owned()
    }

    /// Pretty-printed JSON when the body decoded, raw text otherwise.
    pub fn pretty_body(&self) -> String {
        self.decoded_json
            .as_ref()
            .and_then(|v| serde_json::to_string_pretty(v).ok())
            .unwrap_or_else(|| self.text())
    }
}

/// Append a header, folding it into an existing entry of the same name.
pub(crate) fn fold_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
        Some((_, existing)) => {
            existing.push_str(", ");
            existing.push_str(&value);
        }
        None => headers.push((name.to_string(), value)),
    }
}
