use crate::config::{Settings, MAX_PREDICTION_API_RETRIES};
use crate::domain::contract::UpstreamPrediction;
use crate::predict::error::UpstreamError;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};
use std::time::Duration;

const PROVIDER_NAME: &str = "http_predict";
/// Backoff doubles per failed attempt up to `1s << MAX_BACKOFF_SHIFT`.
const MAX_BACKOFF_SHIFT: u32 = 3;

#[async_trait::async_trait]
pub trait PredictionProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Parsed body plus the raw JSON it came from.
    async fn fetch_prediction(&self, ticker: &str) -> Result<(UpstreamPrediction, Value)>;
}

#[derive(Debug, Clone)]
pub struct HttpPredictionProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    path: String,
    retries: u32,
}

impl HttpPredictionProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_prediction_api_base_url()?.to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.prediction_api_timeout_secs))
            .build()
            .context("failed to build prediction http client")?;

        Ok(Self {
            http,
            base_url,
            api_key: settings.prediction_api_key.clone(),
            path: settings.prediction_api_path.clone(),
            retries: settings.prediction_api_retries.clamp(1, MAX_PREDICTION_API_RETRIES),
        })
    }

    fn url(&self) -> String {
        join_url(&self.base_url, &self.path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }

    async fn fetch_once(&self, ticker: &str) -> Result<(UpstreamPrediction, Value)> {
        let res = self
            .http
            .post(self.url())
            .headers(self.headers()?)
            .json(&json!({ "ticker": ticker }))
            .send()
            .await
            .context("prediction request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read prediction response")?;

        if !status.is_success() {
            return Err(UpstreamError {
                provider: PROVIDER_NAME,
                stage: "http",
                detail: format!("status={status}"),
                raw_json: serde_json::from_str::<Value>(&text).ok(),
                raw_body: Some(text),
            }
            .into());
        }

        let raw_json = serde_json::from_str::<Value>(&text).map_err(|e| UpstreamError {
            provider: PROVIDER_NAME,
            stage: "json",
            detail: e.to_string(),
            raw_body: Some(text.clone()),
            raw_json: None,
        })?;

        let parsed = serde_json::from_value::<UpstreamPrediction>(raw_json.clone())
            .context("failed to parse prediction response into UpstreamPrediction")?;
        Ok((parsed, raw_json))
    }
}

#[async_trait::async_trait]
impl PredictionProvider for HttpPredictionProvider {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_prediction(&self, ticker: &str) -> Result<(UpstreamPrediction, Value)> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(ticker).await {
                Ok(ok) => return Ok(ok),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = backoff(attempt);
                    tracing::warn!(attempt, ?backoff, %ticker, error = %err, "prediction fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1 << attempt.saturating_sub(1).min(MAX_BACKOFF_SHIFT))
}

fn join_url(base_url: &str, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
