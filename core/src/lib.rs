//! Request-building and execution core for an interactive HTTP client.
//!
//! # Overview
//! Turns loosely typed editor input (key/value rows with active flags, raw
//! JSON text, form fields) into a validated `RequestSpec`, executes it with
//! timing instrumentation, and returns an `ExecutionOutcome` for the host to
//! render.
//!
//! # Design
//! - Validation is fail-fast: `ValidationError` is always returned before any
//!   socket is opened.
//! - `RequestExecutor` is stateless between calls and runs one blocking
//!   request at a time; each call owns its connection.
//! - A non-2xx status is a successful outcome. Only transport failures and
//!   timeouts are `ExecutionOutcome::Failure`.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.

pub mod body;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod rows;

pub use body::{build_body, BodySpec, BodyType};
pub use client::{ExecutionOutcome, RequestExecutor};
pub use config::ExecutorConfig;
pub use error::{ErrorDetail, ErrorKind, ValidationError};
pub use http::{HttpMethod, ResponseSnapshot};
pub use request::{assemble, RequestInput, RequestSpec};
pub use rows::{EffectiveMapping, KeyValueRow, KeyValueSet};
