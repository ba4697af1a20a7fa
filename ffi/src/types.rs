//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use reqpad_core::{
    ErrorDetail, ErrorKind, KeyValueSet, RequestExecutor, ResponseSnapshot, ValidationError,
};

/// Opaque handle to a `KeyValueSet` being filled row by row.
pub struct FfiRowSet {
    pub(crate) inner: KeyValueSet,
}

/// Opaque handle to a `RequestExecutor`.
pub struct FfiExecutor {
    pub(crate) inner: RequestExecutor,
}

/// Copy a Rust string into a heap C string. Interior NUL bytes are dropped.
pub(crate) fn c_string(s: &str) -> *mut c_char {
    let cleaned: String = s.chars().filter(|&c| c != '\0').collect();
    CString::new(cleaned).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A single response header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A captured response exposed to C.
///
/// `body` holds `body_len` raw bytes and is not NUL-terminated.
/// `decoded_json` is a pretty-printed JSON string, or null when the body is
/// not JSON.
#[repr(C)]
pub struct FfiResponse {
    pub status_code: u16,
    pub reason_phrase: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut u8,
    pub body_len: usize,
    pub elapsed_ms: f64,
    pub decoded_json: *mut c_char,
}

impl FfiResponse {
    fn from_core(snapshot: ResponseSnapshot) -> Self {
        let decoded_json = snapshot
            .decoded_json
            .as_ref()
            .and_then(|v| serde_json::to_string_pretty(v).ok())
            .map(|s| c_string(&s))
            .unwrap_or(std::ptr::null_mut());

        let headers_len = snapshot.headers.len() as u32;
        let headers = if snapshot.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = snapshot
                .headers
                .iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        let body_len = snapshot.body_bytes.len();
        let body = if body_len == 0 {
            std::ptr::null_mut()
        } else {
            Box::into_raw(snapshot.body_bytes.into_boxed_slice()) as *mut u8
        };

        FfiResponse {
            status_code: snapshot.status_code,
            reason_phrase: c_string(&snapshot.reason_phrase),
            headers,
            headers_len,
            body,
            body_len,
            elapsed_ms: snapshot.elapsed_ms,
            decoded_json,
        }
    }

    /// Release every allocation owned by this response (but not the struct).
    ///
    /// # Safety
    /// The fields must have been produced by `FfiResponse::from_core` and not
    /// freed before.
    pub(crate) unsafe fn free_fields(&self) {
        if !self.reason_phrase.is_null() {
            drop(CString::from_raw(self.reason_phrase));
        }
        if !self.decoded_json.is_null() {
            drop(CString::from_raw(self.decoded_json));
        }
        if !self.headers.is_null() && self.headers_len > 0 {
            let headers = Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                self.headers,
                self.headers_len as usize,
            ));
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(CString::from_raw(h.key));
                }
                if !h.value.is_null() {
                    drop(CString::from_raw(h.value));
                }
            }
        }
        if !self.body.is_null() && self.body_len > 0 {
            drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                self.body,
                self.body_len,
            )));
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiOutcome`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    MissingUrl = 1,
    MalformedJson = 2,
    UnknownMethod = 3,
    Transport = 4,
    Timeout = 5,
    Panic = 6,
    NullArg = 7,
    InvalidArg = 8,
}

/// Result envelope for `reqpad_send`.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `response`
/// points to the captured response, whatever its status code.
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `response` is null.
#[repr(C)]
pub struct FfiOutcome {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub response: *mut FfiResponse,
}

impl FfiOutcome {
    fn error(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiOutcome {
            error_code,
            error_message: c_string(msg),
            response: std::ptr::null_mut(),
        }))
    }

    /// Build a success outcome carrying a response.
    pub(crate) fn ok(snapshot: ResponseSnapshot) -> *mut Self {
        let response = Box::new(FfiResponse::from_core(snapshot));
        Box::into_raw(Box::new(FfiOutcome {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            response: Box::into_raw(response),
        }))
    }

    /// Build an error outcome from a rejected input.
    pub(crate) fn from_validation(err: ValidationError) -> *mut Self {
        let code = match &err {
            ValidationError::MissingUrl => FfiErrorCode::MissingUrl,
            ValidationError::MalformedJson { .. } => FfiErrorCode::MalformedJson,
            ValidationError::UnknownMethod(_) => FfiErrorCode::UnknownMethod,
        };
        Self::error(code, &err.to_string())
    }

    /// Build an error outcome from a failed exchange.
    pub(crate) fn from_failure(err: ErrorDetail) -> *mut Self {
        let code = match err.kind {
            ErrorKind::TransportFailure => FfiErrorCode::Transport,
            ErrorKind::Timeout => FfiErrorCode::Timeout,
        };
        Self::error(code, &err.message)
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    pub(crate) fn invalid_arg(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::InvalidArg, msg)
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg)
    }
}
