pub mod error;
pub mod provider;

use crate::domain::quote::MarketBundle;
use crate::market::generator::MockMarketGenerator;
use chrono::NaiveDate;
use serde::Serialize;

pub use provider::{HttpPredictionProvider, PredictionProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    Upstream,
    Mock,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedPrediction {
    pub source: PredictionSource,
    pub bundle: MarketBundle,
}

/// Live prediction when a provider is configured and answers with a valid
/// payload; the generated bundle otherwise. Never fails.
pub async fn resolve_prediction(
    provider: Option<&dyn PredictionProvider>,
    generator: &MockMarketGenerator,
    ticker: &str,
    as_of_date: NaiveDate,
) -> ResolvedPrediction {
    let mock = generator.generate(ticker, None, as_of_date);

    let Some(provider) = provider else {
        return ResolvedPrediction {
            source: PredictionSource::Mock,
            bundle: mock,
        };
    };

    let upstream = provider
        .fetch_prediction(&mock.ticker)
        .await
        .and_then(|(parsed, _raw)| parsed.validate_and_merge(mock.clone()));

    match upstream {
        Ok(bundle) => {
            tracing::debug!(ticker = %bundle.ticker, provider = provider.provider_name(), "using upstream prediction");
            ResolvedPrediction {
                source: PredictionSource::Upstream,
                bundle,
            }
        }
        Err(err) => {
            tracing::warn!(
                ticker = %mock.ticker,
                provider = provider.provider_name(),
                error = %format!("{err:#}"),
                "upstream prediction unavailable; serving generated data"
            );
            ResolvedPrediction {
                source: PredictionSource::Mock,
                bundle: mock,
            }
        }
    }
}
