//! Blocking request executor.
//!
//! # Design
//! `RequestExecutor` holds only an `ExecutorConfig` and carries no mutable
//! state between calls. Every `execute` builds its own ureq agent, so
//! connections live exactly as long as the call and are dropped on every exit
//! path. Status codes are never turned into errors here: ureq is configured
//! with `http_status_as_error(false)` and any response that arrives becomes a
//! `ResponseSnapshot`.

use std::time::{Duration, Instant};

use tracing::{info, warn};
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, Body, RequestBuilder};

use crate::body::BodySpec;
use crate::config::ExecutorConfig;
use crate::error::ErrorDetail;
use crate::http::{fold_header, HttpMethod, ResponseSnapshot};
use crate::request::RequestSpec;

/// Result of one send: a captured response or a classified failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Success(ResponseSnapshot),
    Failure(ErrorDetail),
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success(_))
    }

    pub fn response(&self) -> Option<&ResponseSnapshot> {
        match self {
            ExecutionOutcome::Success(snapshot) => Some(snapshot),
            ExecutionOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorDetail> {
        match self {
            ExecutionOutcome::Success(_) => None,
            ExecutionOutcome::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<ResponseSnapshot, ErrorDetail> {
        match self {
            ExecutionOutcome::Success(snapshot) => Ok(snapshot),
            ExecutionOutcome::Failure(err) => Err(err),
        }
    }
}

/// Executes one `RequestSpec` at a time, single attempt, no retries.
#[derive(Debug, Clone, Default)]
pub struct RequestExecutor {
    config: ExecutorConfig,
}

impl RequestExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Execute with the configured default timeout.
    pub fn send(&self, spec: &RequestSpec) -> ExecutionOutcome {
        self.execute(spec, self.config.timeout)
    }

    /// Execute `spec`, failing with `ErrorKind::Timeout` once `timeout`
    /// elapses. The whole body is buffered before returning.
    pub fn execute(&self, spec: &RequestSpec, timeout: Duration) -> ExecutionOutcome {
        let start = Instant::now();
        match self.round_trip(spec, timeout, start) {
            Ok(snapshot) => {
                info!(
                    method = %spec.method(),
                    url = spec.url(),
                    status = snapshot.status_code,
                    elapsed_ms = snapshot.elapsed_ms,
                    size = snapshot.size_bytes(),
                    "request completed"
                );
                ExecutionOutcome::Success(snapshot)
            }
            Err(err) => {
                let detail = ErrorDetail::from(err);
                warn!(
                    method = %spec.method(),
                    url = spec.url(),
                    kind = %detail.kind,
                    elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "request failed: {}",
                    detail.message
                );
                ExecutionOutcome::Failure(detail)
            }
        }
    }

    fn agent(&self, timeout: Duration) -> Agent {
        Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .max_redirects(self.config.max_redirects)
            .user_agent(self.config.user_agent.as_str())
            .build()
            .new_agent()
    }

    fn round_trip(
        &self,
        spec: &RequestSpec,
        timeout: Duration,
        start: Instant,
    ) -> Result<ResponseSnapshot, ureq::Error> {
        let agent = self.agent(timeout);
        let url = spec.url();

        let mut response = match spec.method() {
            HttpMethod::Get => send_without_body(agent.get(url), spec),
            HttpMethod::Delete => send_without_body(agent.delete(url), spec),
            HttpMethod::Options => send_without_body(agent.options(url), spec),
            HttpMethod::Head => send_without_body(agent.head(url), spec),
            HttpMethod::Post => send_with_body(agent.post(url), spec),
            HttpMethod::Put => send_with_body(agent.put(url), spec),
            HttpMethod::Patch => send_with_body(agent.patch(url), spec),
        }?;

        let status = response.status();
        // ureq does not expose the phrase from the status line.
        let reason = status.canonical_reason().unwrap_or_default().to_string();

        let mut headers = Vec::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            fold_header(&mut headers, name.as_str(), value);
        }

        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        Ok(ResponseSnapshot::new(status.as_u16(), reason, headers, body, elapsed_ms))
    }
}

/// Attach query params and headers. Invalid header names surface from ureq
/// as an error when the request is sent.
fn decorate<B>(mut builder: RequestBuilder<B>, spec: &RequestSpec) -> RequestBuilder<B> {
    for (key, value) in spec.params().iter() {
        builder = builder.query(key, value);
    }
    for (key, value) in spec.headers().iter() {
        builder = builder.header(key, value);
    }
    builder
}

fn send_without_body(
    builder: RequestBuilder<WithoutBody>,
    spec: &RequestSpec,
) -> Result<ureq::http::Response<Body>, ureq::Error> {
    match spec.body() {
        BodySpec::NoBody => decorate(builder, spec).call(),
        _ => send_with_body(builder.force_send_body(), spec),
    }
}

fn send_with_body(
    builder: RequestBuilder<WithBody>,
    spec: &RequestSpec,
) -> Result<ureq::http::Response<Body>, ureq::Error> {
    let builder = decorate(builder, spec);
    match spec.body() {
        BodySpec::NoBody => builder.send_empty(),
        BodySpec::JsonBody(value) => {
            let bytes = serde_json::to_vec(value).map_err(ureq::Error::Json)?;
            let builder = if spec.has_header("content-type") {
                builder
            } else {
                builder.header("content-type", "application/json")
            };
            builder.send(&bytes[..])
        }
        BodySpec::FormBody(fields) => {
            let fields = fields.effective_mapping();
            builder.send_form(fields.iter())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{build_body, BodyType};
    use crate::error::ErrorKind;
    use crate::request::assemble;
    use crate::rows::KeyValueSet;

    fn spec(url: &str) -> RequestSpec {
        assemble(
            HttpMethod::Get,
            url,
            &KeyValueSet::new(),
            &KeyValueSet::new(),
            BodySpec::NoBody,
        )
        .unwrap()
    }

    #[test]
    fn outcome_accessors() {
        let failure = ExecutionOutcome::Failure(ErrorDetail::transport("refused"));
        assert!(!failure.is_success());
        assert!(failure.response().is_none());
        assert_eq!(failure.error().unwrap().kind, ErrorKind::TransportFailure);
        assert!(failure.into_result().is_err());
    }

    #[test]
    fn malformed_url_is_a_transport_failure() {
        let outcome = RequestExecutor::default().execute(&spec("not a url"), Duration::from_secs(1));
        assert_eq!(outcome.error().unwrap().kind, ErrorKind::TransportFailure);
    }

    #[test]
    fn whitespace_url_fails_at_transport() {
        let outcome = RequestExecutor::default().execute(&spec("  "), Duration::from_secs(1));
        assert!(!outcome.is_success());
    }

    #[test]
    fn refused_connection_is_a_transport_failure() {
        // Bind then drop to get a port with nothing listening.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let body = build_body(BodyType::Json, Some(r#"{"a":1}"#), None).unwrap();
        let spec = assemble(
            HttpMethod::Post,
            &format!("http://127.0.0.1:{port}/"),
            &KeyValueSet::new(),
            &KeyValueSet::new(),
            body,
        )
        .unwrap();
        let outcome = RequestExecutor::default().execute(&spec, Duration::from_secs(2));
        assert_eq!(outcome.error().unwrap().kind, ErrorKind::TransportFailure);
    }
}
