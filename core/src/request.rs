//! Assembly of editor input into a send-ready request.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::body::{build_body, BodySpec, BodyType};
use crate::error::ValidationError;
use crate::http::HttpMethod;
use crate::rows::{EffectiveMapping, KeyValueSet};

/// A fully validated request. Fields are private so a spec cannot change
/// after `assemble` returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    method: HttpMethod,
    url: String,
    params: EffectiveMapping,
    headers: EffectiveMapping,
    body: BodySpec,
}

impl RequestSpec {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &EffectiveMapping {
        &self.params
    }

    pub fn headers(&self) -> &EffectiveMapping {
        &self.headers
    }

    pub fn body(&self) -> &BodySpec {
        &self.body
    }

    /// Case-insensitive check against the resolved headers.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

/// Build a `RequestSpec` from the editor's state.
///
/// The URL is only checked for literal emptiness: `"  "` is accepted and left
/// for the transport to reject. Param and header rows are resolved with
/// `KeyValueSet::effective_mapping`; header names that differ only in case
/// collapse to the last one.
pub fn assemble(
    method: HttpMethod,
    url: &str,
    header_rows: &KeyValueSet,
    param_rows: &KeyValueSet,
    body: BodySpec,
) -> Result<RequestSpec, ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::MissingUrl);
    }
    let spec = RequestSpec {
        method,
        url: url.to_string(),
        params: param_rows.effective_mapping(),
        headers: header_rows.effective_mapping_ignore_case(),
        body,
    };
    debug!(
        method = %spec.method,
        url = %spec.url,
        params = spec.params.len(),
        headers = spec.headers.len(),
        "assembled request"
    );
    Ok(spec)
}

/// Everything the editor submits on "send", before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestInput {
    pub method: Option<HttpMethod>,
    pub url: String,
    pub params: KeyValueSet,
    pub headers: KeyValueSet,
    pub body_type: BodyType,
    pub json_text: Option<String>,
    pub form: Option<KeyValueSet>,
}

impl RequestInput {
    /// Validate in the order the editor reports problems: URL first, then
    /// the body. A missing method means `GET`.
    pub fn into_spec(self) -> Result<RequestSpec, ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        let body = build_body(self.body_type, self.json_text.as_deref(), self.form)?;
        assemble(
            self.method.unwrap_or(HttpMethod::Get),
            &self.url,
            &self.headers,
            &self.params,
            body,
        )
    }
}
