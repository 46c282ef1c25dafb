pub mod chat;
pub mod domain;
pub mod market;
pub mod predict;
pub mod time;

pub mod config {
    use anyhow::Context;
    use std::ops::RangeInclusive;

    use crate::market::generator::SeedStrategy;

    const DEFAULT_PORT: u16 = 3000;
    const DEFAULT_PORTFOLIO_SEED: u64 = 42;
    const DEFAULT_QUIZ_PROBABILITY: f64 = 0.3;
    const DEFAULT_REPLY_DELAY_MS: RangeInclusive<u64> = 500..=1000;
    const DEFAULT_PREDICTION_API_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_PREDICTION_API_PATH: &str = "/predict";
    const DEFAULT_PREDICTION_API_RETRIES: u32 = 1;
    /// Upper bound on upstream attempts; a dead upstream must not stall requests.
    pub const MAX_PREDICTION_API_RETRIES: u32 = 5;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub port: u16,
        pub sentry_dsn: Option<String>,
        pub prediction_api_base_url: Option<String>,
        pub prediction_api_key: Option<String>,
        pub prediction_api_path: String,
        pub prediction_api_timeout_secs: u64,
        /// Total attempts per request, in `1..=MAX_PREDICTION_API_RETRIES`.
        pub prediction_api_retries: u32,
        pub seed_strategy: SeedStrategy,
        pub portfolio_seed: u64,
        pub quiz_probability: f64,
        pub reply_delay_ms: RangeInclusive<u64>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let seed_strategy = match std::env::var("MOCK_SEED_STRATEGY") {
                Ok(s) => SeedStrategy::parse(&s)
                    .with_context(|| format!("invalid MOCK_SEED_STRATEGY: {s}"))?,
                Err(_) => SeedStrategy::PerSymbol,
            };

            let quiz_probability = std::env::var("CHAT_QUIZ_PROBABILITY")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or(DEFAULT_QUIZ_PROBABILITY);
            anyhow::ensure!(
                (0.0..=1.0).contains(&quiz_probability),
                "CHAT_QUIZ_PROBABILITY must be between 0 and 1 (got {quiz_probability})"
            );

            let reply_delay_ms = match std::env::var("CHAT_REPLY_DELAY_MS") {
                Ok(s) => parse_delay_range(&s)
                    .with_context(|| format!("invalid CHAT_REPLY_DELAY_MS: {s}"))?,
                Err(_) => DEFAULT_REPLY_DELAY_MS,
            };

            Ok(Self {
                port: std::env::var("PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_PORT),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                prediction_api_base_url: std::env::var("PREDICTION_API_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
                prediction_api_key: std::env::var("PREDICTION_API_KEY").ok(),
                prediction_api_path: std::env::var("PREDICTION_API_PATH")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_PREDICTION_API_PATH.to_string()),
                prediction_api_timeout_secs: std::env::var("PREDICTION_API_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_PREDICTION_API_TIMEOUT_SECS),
                prediction_api_retries: std::env::var("PREDICTION_API_RETRIES")
                    .ok()
                    .and_then(|s| s.parse::<u32>().ok())
                    .unwrap_or(DEFAULT_PREDICTION_API_RETRIES)
                    .clamp(1, MAX_PREDICTION_API_RETRIES),
                seed_strategy,
                portfolio_seed: std::env::var("PORTFOLIO_SEED")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_PORTFOLIO_SEED),
                quiz_probability,
                reply_delay_ms,
            })
        }

        pub fn require_prediction_api_base_url(&self) -> anyhow::Result<&str> {
            self.prediction_api_base_url
                .as_deref()
                .context("PREDICTION_API_BASE_URL is required")
        }
    }

    /// Accepts `"750"` or `"500..1000"` (inclusive bounds, milliseconds).
    pub fn parse_delay_range(s: &str) -> anyhow::Result<RangeInclusive<u64>> {
        let s = s.trim();
        let (lo, hi) = match s.split_once("..") {
            Some((lo, hi)) => (lo.trim().parse::<u64>()?, hi.trim().parse::<u64>()?),
            None => {
                let v = s.parse::<u64>()?;
                (v, v)
            }
        };
        anyhow::ensure!(lo <= hi, "delay range start must not exceed end");
        Ok(lo..=hi)
    }

}
