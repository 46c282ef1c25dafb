use serde_json::Value;
use std::fmt;

/// Failure talking to the upstream prediction service. Carried inside
/// `anyhow::Error`; callers can `downcast_ref` it for the raw body.
#[derive(Debug, Clone)]
pub struct UpstreamError {
    pub provider: &'static str,
    pub stage: &'static str,
    pub detail: String,
    pub raw_body: Option<String>,
    pub raw_json: Option<Value>,
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "prediction upstream error (provider={}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for UpstreamError {}
