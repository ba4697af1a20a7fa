//! Error types for request assembly and execution.
//!
//! # Design
//! Two separate types for two separate phases. `ValidationError` is raised
//! while turning editor input into a `RequestSpec` and always means no
//! socket was opened. `ErrorDetail` describes a failed network exchange.
//! A response with a 4xx/5xx status is neither: it is a successful outcome.

use std::fmt;

use thiserror::Error;

/// Input rejected before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The URL field was empty at send time.
    #[error("please enter a URL")]
    MissingUrl,

    /// The JSON body text does not parse.
    #[error("invalid JSON body: {message}")]
    MalformedJson {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    /// A method literal outside the supported set.
    #[error("unsupported HTTP method: {0}")]
    UnknownMethod(String),
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        // serde_json reports 0 when it has no position.
        let line = Some(err.line()).filter(|&l| l > 0);
        let column = Some(err.column()).filter(|&c| c > 0);
        ValidationError::MalformedJson {
            message: err.to_string(),
            line,
            column,
        }
    }
}

/// Machine-distinguishable category of a failed exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// DNS, connect, TLS, redirect or protocol failure.
    TransportFailure,
    /// The per-call deadline elapsed.
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::TransportFailure => write!(f, "transport failure"),
            ErrorKind::Timeout => write!(f, "timeout"),
        }
    }
}

/// A failed exchange: a kind plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorDetail {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::TransportFailure,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }
}

impl From<ureq::Error> for ErrorDetail {
    fn from(err: ureq::Error) -> Self {
        let timed_out = match &err {
            ureq::Error::Timeout(_) => true,
            ureq::Error::Io(io) => io.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        };
        if timed_out {
            ErrorDetail::timeout(err.to_string())
        } else {
            ErrorDetail::transport(err.to_string())
        }
    }
}
