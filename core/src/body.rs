//! Request body selection and validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::rows::{EffectiveMapping, KeyValueSet};

/// The body-type selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyType {
    #[default]
    None,
    Json,
    Form,
}

/// A validated request body. JSON and form encodings are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BodySpec {
    #[default]
    NoBody,
    /// The parsed value, re-serialized on send.
    JsonBody(Value),
    FormBody(KeyValueSet),
}

impl BodySpec {
    /// Form fields after active/empty-key filtering, if this is a form body.
    pub fn form_fields(&self) -> Option<EffectiveMapping> {
        match self {
            BodySpec::FormBody(fields) => Some(fields.effective_mapping()),
            _ => None,
        }
    }
}

/// Validate the body editor's state into a `BodySpec`.
///
/// Only the input matching `body_type` is consulted. For `Json`, absent text
/// and `""` are the same case and produce `NoBody`; any other text must parse
/// as JSON or the whole send is aborted. Whitespace-only text is not empty and
/// so fails to parse.
pub fn build_body(
    body_type: BodyType,
    raw_text: Option<&str>,
    form_rows: Option<KeyValueSet>,
) -> Result<BodySpec, ValidationError> {
    match body_type {
        BodyType::None => Ok(BodySpec::NoBody),
        BodyType::Json => match raw_text {
            None | Some("") => Ok(BodySpec::NoBody),
            Some(text) => {
                let value: Value = serde_json::from_str(text)?;
                Ok(BodySpec::JsonBody(value))
            }
        },
        BodyType::Form => Ok(BodySpec::FormBody(form_rows.unwrap_or_default())),
    }
}
