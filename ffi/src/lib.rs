//! C-ABI wrapper around `reqpad-core`.
//!
//! # Overview
//! Lets a presentation layer written in any language with a C FFI assemble
//! and send requests: fill row sets for params, headers and form fields,
//! call `reqpad_send`, render the returned `FfiOutcome`.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Methods arrive as their literal names and body types as integers, so a
//!   bad value from C becomes an error code instead of an invalid Rust enum.
//! - The C caller owns all returned pointers and must call the matching
//!   `reqpad_*_free` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::time::Duration;

use reqpad_core::{
    BodyType, ExecutionOutcome, ExecutorConfig, HttpMethod, KeyValueRow, KeyValueSet,
    RequestExecutor, RequestInput,
};

use types::*;

/// Read a nullable C string, replacing invalid UTF-8.
fn read_str(p: *const c_char) -> Option<String> {
    if p.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned())
}

/// Clone the rows behind a nullable handle; null means no rows.
fn read_rows(p: *const FfiRowSet) -> KeyValueSet {
    if p.is_null() {
        KeyValueSet::new()
    } else {
        unsafe { &*p }.inner.clone()
    }
}

// ---------------------------------------------------------------------------
// Row sets
// ---------------------------------------------------------------------------

/// Create an empty row set. Free it with `reqpad_rows_free`.
#[unsafe(no_mangle)]
pub extern "C" fn reqpad_rows_new() -> *mut FfiRowSet {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiRowSet {
            inner: KeyValueSet::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Append a row. A null `key` or `value` is stored as an empty string.
///
/// Returns false if `rows` is null.
#[unsafe(no_mangle)]
pub extern "C" fn reqpad_rows_push(
    rows: *mut FfiRowSet,
    key: *const c_char,
    value: *const c_char,
    active: bool,
) -> bool {
    catch_unwind(|| {
        if rows.is_null() {
            return false;
        }
        let rows = unsafe { &mut *rows };
        rows.inner.push(KeyValueRow {
            key: read_str(key).unwrap_or_default(),
            value: read_str(value).unwrap_or_default(),
            active,
        });
        true
    })
    .unwrap_or(false)
}

/// Free a row set created by `reqpad_rows_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn reqpad_rows_free(rows: *mut FfiRowSet) {
    if !rows.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(rows) });
        });
    }
}

// ---------------------------------------------------------------------------
// Executor lifecycle
// ---------------------------------------------------------------------------

/// Create an executor. `timeout_ms == 0` keeps the default timeout.
/// Free it with `reqpad_executor_free`.
#[unsafe(no_mangle)]
pub extern "C" fn reqpad_executor_new(timeout_ms: u64, max_redirects: u32) -> *mut FfiExecutor {
    catch_unwind(|| {
        let mut config = ExecutorConfig {
            max_redirects,
            ..ExecutorConfig::default()
        };
        if timeout_ms > 0 {
            config.timeout = Duration::from_millis(timeout_ms);
        }
        Box::into_raw(Box::new(FfiExecutor {
            inner: RequestExecutor::new(config),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free an executor created by `reqpad_executor_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn reqpad_executor_free(executor: *mut FfiExecutor) {
    if !executor.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(executor) });
        });
    }
}

// ---------------------------------------------------------------------------
// Send
// ---------------------------------------------------------------------------

/// Validate the editor state and, if valid, execute the request.
///
/// - `method` is one of `GET POST PUT DELETE PATCH OPTIONS HEAD`.
/// - `params`, `headers` and `form` may be null (no rows).
/// - `body_type`: 0 = none, 1 = JSON (`json_text`, null or empty means no
///   body), 2 = form (`form`).
/// - `timeout_ms == 0` uses the executor's configured timeout.
///
/// Blocks until the response is buffered or the request fails. Always
/// returns an outcome; free it with `reqpad_outcome_free`.
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn reqpad_send(
    executor: *const FfiExecutor,
    method: *const c_char,
    url: *const c_char,
    params: *const FfiRowSet,
    headers: *const FfiRowSet,
    body_type: i32,
    json_text: *const c_char,
    form: *const FfiRowSet,
    timeout_ms: u64,
) -> *mut FfiOutcome {
    catch_unwind(|| {
        if executor.is_null() {
            return FfiOutcome::null_arg("executor");
        }
        let Some(method) = read_str(method) else {
            return FfiOutcome::null_arg("method");
        };
        let method = match method.parse::<HttpMethod>() {
            Ok(m) => m,
            Err(e) => return FfiOutcome::from_validation(e),
        };
        let body_type = match body_type {
            0 => BodyType::None,
            1 => BodyType::Json,
            2 => BodyType::Form,
            other => return FfiOutcome::invalid_arg(&format!("unknown body type: {other}")),
        };

        let input = RequestInput {
            method: Some(method),
            url: read_str(url).unwrap_or_default(),
            params: read_rows(params),
            headers: read_rows(headers),
            body_type,
            json_text: read_str(json_text),
            form: (!form.is_null()).then(|| read_rows(form)),
        };
        let spec = match input.into_spec() {
            Ok(spec) => spec,
            Err(e) => return FfiOutcome::from_validation(e),
        };

        let executor = unsafe { &*executor };
        let timeout = if timeout_ms > 0 {
            Duration::from_millis(timeout_ms)
        } else {
            executor.inner.config().timeout
        };
        match executor.inner.execute(&spec, timeout) {
            ExecutionOutcome::Success(snapshot) => FfiOutcome::ok(snapshot),
            ExecutionOutcome::Failure(err) => FfiOutcome::from_failure(err),
        }
    })
    .unwrap_or_else(|_| {
        tracing::error!("panic in reqpad_send");
        FfiOutcome::panic("panic in reqpad_send")
    })
}

// ---------------------------------------------------------------------------
// Free
// ---------------------------------------------------------------------------

/// Free an outcome returned by `reqpad_send`, including its response.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn reqpad_outcome_free(outcome: *mut FfiOutcome) {
    if outcome.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let outcome = unsafe { Box::from_raw(outcome) };
        if !outcome.error_message.is_null() {
            drop(unsafe { std::ffi::CString::from_raw(outcome.error_message) });
        }
        if !outcome.response.is_null() {
            let response = unsafe { Box::from_raw(outcome.response) };
            unsafe { response.free_fields() };
        }
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn cstr(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    fn message(outcome: &FfiOutcome) -> String {
        unsafe { CStr::from_ptr(outcome.error_message) }
            .to_str()
            .unwrap()
            .to_string()
    }

    fn rows(pairs: &[(&str, &str, bool)]) -> *mut FfiRowSet {
        let set = reqpad_rows_new();
        for (k, v, active) in pairs {
            let (k, v) = (cstr(k), cstr(v));
            assert!(reqpad_rows_push(set, k.as_ptr(), v.as_ptr(), *active));
        }
        set
    }

    #[test]
    fn rows_new_push_and_free() {
        let set = rows(&[("a", "1", true), ("", "x", true), ("b", "2", false)]);
        let inner = unsafe { &(*set).inner };
        assert_eq!(inner.rows().len(), 3);
        let mapping = inner.effective_mapping();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("a"), Some("1"));
        reqpad_rows_free(set);
    }

    #[test]
    fn rows_push_null_set_returns_false() {
        let k = cstr("a");
        assert!(!reqpad_rows_push(std::ptr::null_mut(), k.as_ptr(), k.as_ptr(), true));
    }

    #[test]
    fn rows_push_null_key_is_empty_key() {
        let set = reqpad_rows_new();
        let v = cstr("v");
        assert!(reqpad_rows_push(set, std::ptr::null(), v.as_ptr(), true));
        assert!(unsafe { &(*set).inner }.effective_mapping().is_empty());
        reqpad_rows_free(set);
    }

    #[test]
    fn free_null_handles_is_safe() {
        reqpad_rows_free(std::ptr::null_mut());
        reqpad_executor_free(std::ptr::null_mut());
        reqpad_outcome_free(std::ptr::null_mut());
    }

    #[test]
    fn executor_new_applies_timeout() {
        let executor = reqpad_executor_new(250, 3);
        let config = unsafe { &*executor }.inner.config();
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.max_redirects, 3);
        reqpad_executor_free(executor);
    }

    #[test]
    fn send_null_executor_returns_null_arg() {
        let method = cstr("GET");
        let url = cstr("http://localhost");
        let outcome = reqpad_send(
            std::ptr::null(),
            method.as_ptr(),
            url.as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            0,
            std::ptr::null(),
            std::ptr::null(),
            0,
        );
        let o = unsafe { &*outcome };
        assert_eq!(o.error_code, FfiErrorCode::NullArg);
        assert!(o.response.is_null());
        reqpad_outcome_free(outcome);
    }

    #[test]
    fn send_empty_url_returns_missing_url() {
        let executor = reqpad_executor_new(0, 10);
        let method = cstr("GET");
        let url = cstr("");
        let outcome = reqpad_send(
            executor,
            method.as_ptr(),
            url.as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            0,
            std::ptr::null(),
            std::ptr::null(),
            0,
        );
        let o = unsafe { &*outcome };
        assert_eq!(o.error_code, FfiErrorCode::MissingUrl);
        assert_eq!(message(o), "please enter a URL");
        reqpad_outcome_free(outcome);
        reqpad_executor_free(executor);
    }

    #[test]
    fn send_bad_json_returns_malformed_json() {
        let executor = reqpad_executor_new(0, 10);
        let method = cstr("POST");
        let url = cstr("http://127.0.0.1:9/");
        let json = cstr("{invalid");
        let outcome = reqpad_send(
            executor,
            method.as_ptr(),
            url.as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            1,
            json.as_ptr(),
            std::ptr::null(),
            0,
        );
        let o = unsafe { &*outcome };
        assert_eq!(o.error_code, FfiErrorCode::MalformedJson);
        assert!(message(o).starts_with("invalid JSON body"));
        reqpad_outcome_free(outcome);
        reqpad_executor_free(executor);
    }

    #[test]
    fn send_unknown_method_and_body_type() {
        let executor = reqpad_executor_new(0, 10);
        let url = cstr("http://localhost");

        let method = cstr("FETCH");
        let outcome = reqpad_send(
            executor,
            method.as_ptr(),
            url.as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            0,
            std::ptr::null(),
            std::ptr::null(),
            0,
        );
        assert_eq!(unsafe { &*outcome }.error_code, FfiErrorCode::UnknownMethod);
        reqpad_outcome_free(outcome);

        let method = cstr("GET");
        let outcome = reqpad_send(
            executor,
            method.as_ptr(),
            url.as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            7,
            std::ptr::null(),
            std::ptr::null(),
            0,
        );
        assert_eq!(unsafe { &*outcome }.error_code, FfiErrorCode::InvalidArg);
        reqpad_outcome_free(outcome);

        reqpad_executor_free(executor);
    }

    #[test]
    fn send_against_mock_server_returns_response() {
        let addr = mock_server::spawn();
        let executor = reqpad_executor_new(5_000, 10);
        let method = cstr("GET");
        let url = cstr(&format!("http://{addr}/status/404"));
        let outcome = reqpad_send(
            executor,
            method.as_ptr(),
            url.as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            0,
            std::ptr::null(),
            std::ptr::null(),
            0,
        );

        let o = unsafe { &*outcome };
        assert_eq!(o.error_code, FfiErrorCode::Ok);
        assert!(o.error_message.is_null());
        let r = unsafe { &*o.response };
        assert_eq!(r.status_code, 404);
        let reason = unsafe { CStr::from_ptr(r.reason_phrase) }.to_str().unwrap();
        assert_eq!(reason, "Not Found");
        assert!(r.elapsed_ms > 0.0);
        assert!(!r.decoded_json.is_null());
        let body = unsafe { std::slice::from_raw_parts(r.body, r.body_len) };
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "not found"}));
        assert!(r.headers_len > 0);

        reqpad_outcome_free(outcome);
        reqpad_executor_free(executor);
    }

    #[test]
    fn send_form_rows_reach_the_server() {
        let addr = mock_server::spawn();
        let executor = reqpad_executor_new(5_000, 10);
        let method = cstr("POST");
        let url = cstr(&format!("http://{addr}/echo"));
        let form = rows(&[("user", "ferris", true), ("skip", "me", false)]);
        let outcome = reqpad_send(
            executor,
            method.as_ptr(),
            url.as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            2,
            std::ptr::null(),
            form,
            0,
        );

        let o = unsafe { &*outcome };
        assert_eq!(o.error_code, FfiErrorCode::Ok);
        let r = unsafe { &*o.response };
        let body = unsafe { std::slice::from_raw_parts(r.body, r.body_len) };
        let echo: mock_server::Echo = serde_json::from_slice(body).unwrap();
        assert_eq!(echo.body, "user=ferris");

        reqpad_outcome_free(outcome);
        reqpad_rows_free(form);
        reqpad_executor_free(executor);
    }

    #[test]
    fn send_slow_endpoint_times_out() {
        let addr = mock_server::spawn();
        let executor = reqpad_executor_new(0, 10);
        let method = cstr("GET");
        let url = cstr(&format!("http://{addr}/slow/500"));
        let outcome = reqpad_send(
            executor,
            method.as_ptr(),
            url.as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            0,
            std::ptr::null(),
            std::ptr::null(),
            1,
        );

        let o = unsafe { &*outcome };
        assert_eq!(o.error_code, FfiErrorCode::Timeout);
        assert!(o.response.is_null());

        reqpad_outcome_free(outcome);
        reqpad_executor_free(executor);
    }
}
