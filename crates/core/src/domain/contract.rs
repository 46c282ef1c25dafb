use crate::domain::quote::{
    HistoricalPoint, MarketBundle, PredictionPoint, QuoteSnapshot, PREDICTION_DAYS,
};
use crate::domain::recommendation::Recommendation;
use crate::market::generator::clamp_confidence;
use anyhow::{bail, ensure, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body returned by the upstream `POST /predict` endpoint.
///
/// Two shapes are accepted: a headline (`percent_change`, `recommendation`,
/// `confidence`) with an optional `predictions` ladder, or a bare ladder whose
/// first day supplies the headline. `day1..day3` is the older per-day form
/// and is only read when `predictions` is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamPrediction {
    #[serde(default)]
    pub ticker: Option<String>,
    pub current_price: f64,
    #[serde(default)]
    pub percent_change: Option<f64>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub historical: Vec<UpstreamHistoricalPoint>,
    #[serde(default)]
    pub predictions: Vec<UpstreamDay>,
    #[serde(default)]
    pub day1: Option<UpstreamDay>,
    #[serde(default)]
    pub day2: Option<UpstreamDay>,
    #[serde(default)]
    pub day3: Option<UpstreamDay>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamHistoricalPoint {
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamDay {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub price: f64,
    #[serde(default, alias = "percent")]
    pub change_percent: Option<f64>,
    pub confidence: f64,
    #[serde(default)]
    pub recommendation: Option<String>,
}

impl UpstreamPrediction {
    /// Validates the payload and overlays it on `base`, the locally generated
    /// bundle for the same ticker. Fields the upstream never sends (volume,
    /// market cap, history when omitted) keep the generated values.
    pub fn validate_and_merge(self, base: MarketBundle) -> anyhow::Result<MarketBundle> {
        if let Some(ticker) = self.ticker.as_deref() {
            ensure!(
                ticker.trim().eq_ignore_ascii_case(&base.ticker),
                "upstream ticker mismatch: expected {}, got {ticker}",
                base.ticker
            );
        }

        ensure!(
            self.current_price.is_finite() && self.current_price > 0.0,
            "current_price must be positive (got {})",
            self.current_price
        );

        let days = self.explicit_days();
        for (i, d) in days.iter().enumerate() {
            ensure!(
                d.price.is_finite() && d.price > 0.0,
                "day{} price must be positive (got {})",
                i + 1,
                d.price
            );
            ensure!(d.confidence.is_finite(), "day{} confidence must be finite", i + 1);
            if let Some(pct) = d.change_percent {
                ensure!(pct.is_finite(), "day{} change_percent must be finite", i + 1);
            }
        }
        let dates: Vec<NaiveDate> = days.iter().filter_map(|d| d.date).collect();
        ensure!(
            dates.windows(2).all(|w| w[0] < w[1]),
            "prediction dates must be strictly increasing"
        );

        let first = days.first().copied();
        let percent_change = match (self.percent_change, first) {
            (Some(pct), _) => pct,
            (None, Some(d)) => d
                .change_percent
                .unwrap_or((d.price - self.current_price) / self.current_price * 100.0),
            (None, None) => bail!("percent_change missing and no prediction ladder to derive it from"),
        };
        ensure!(percent_change.is_finite(), "percent_change must be finite");

        let confidence = self
            .confidence
            .or(first.map(|d| d.confidence))
            .context("confidence missing and no prediction ladder to derive it from")?;
        ensure!(
            (0.0..=100.0).contains(&confidence),
            "confidence must be between 0 and 100 (got {confidence})"
        );

        let recommendation = match self
            .recommendation
            .as_deref()
            .or(first.and_then(|d| d.recommendation.as_deref()))
        {
            Some(raw) => match Recommendation::parse(raw) {
                Some(r) => r,
                None => bail!("unknown recommendation: {raw}"),
            },
            None => Recommendation::classify(percent_change),
        };

        let predictions = prediction_ladder(&days, self.current_price, percent_change, confidence);

        let historical = if self.historical.is_empty() {
            base.historical
        } else {
            let mut out = Vec::with_capacity(self.historical.len());
            for p in self.historical {
                ensure!(
                    p.price.is_finite() && p.price > 0.0,
                    "historical price must be positive (date={}, price={})",
                    p.date,
                    p.price
                );
                out.push(HistoricalPoint {
                    date: p.date,
                    price: p.price,
                });
            }
            out.sort_by_key(|p| p.date);
            out
        };

        let change_absolute = self.current_price * percent_change / 100.0;
        let snapshot = QuoteSnapshot {
            current_price: self.current_price,
            previous_close: self.current_price - change_absolute,
            change_absolute,
            change_percent: percent_change,
            volume_label: base.snapshot.volume_label,
            market_cap_label: base.snapshot.market_cap_label,
        };

        Ok(MarketBundle {
            ticker: base.ticker,
            name: base.name,
            as_of_date: base.as_of_date,
            seed: base.seed,
            snapshot,
            predictions,
            historical,
            recommendation,
        })
    }

    /// Upstream-supplied days, at most three: `predictions` when present,
    /// otherwise the leading run of `day1..day3`.
    fn explicit_days(&self) -> Vec<&UpstreamDay> {
        if !self.predictions.is_empty() {
            return self.predictions.iter().take(PREDICTION_DAYS).collect();
        }
        [&self.day1, &self.day2, &self.day3]
            .into_iter()
            .map_while(|d| d.as_ref())
            .collect()
    }
}

/// Explicit days are used as given; missing days are extrapolated from the
/// previous one with growing uncertainty.
fn prediction_ladder(
    days: &[&UpstreamDay],
    current_price: f64,
    percent_change: f64,
    confidence: f64,
) -> [PredictionPoint; PREDICTION_DAYS] {
    let mut price = current_price * (1.0 + percent_change / 100.0);
    let mut change = percent_change;
    let mut confidence = confidence;
    std::array::from_fn(|i| {
        match days.get(i) {
            Some(d) => {
                price = d.price;
                confidence = d.confidence;
                if let Some(pct) = d.change_percent {
                    change = pct;
                }
            }
            None if i > 0 => {
                price *= 1.0 + change / 200.0;
                change *= 1.1;
                confidence *= 0.9;
            }
            None => {}
        }
        PredictionPoint {
            day_offset: (i + 1) as u8,
            predicted_price: price,
            confidence_percent: clamp_confidence(confidence),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::generator::MockMarketGenerator;
    use serde_json::json;

    fn base(ticker: &str) -> MarketBundle {
        let as_of = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        MockMarketGenerator::default().generate(ticker, None, as_of)
    }

    fn parse(v: serde_json::Value) -> UpstreamPrediction {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn merges_minimal_payload_over_generated_bundle() {
        let b = base("AAPL");
        let p = parse(json!({
            "current_price": 200.0,
            "percent_change": 3.0,
            "recommendation": "BUY",
            "confidence": 88.0,
            "historical": [
                {"date": "2026-10-18", "price": 198.0},
                {"date": "2026-10-17", "price": 197.5}
            ]
        }));

        let merged = p.validate_and_merge(b.clone()).unwrap();
        assert_eq!(merged.name.as_deref(), Some("Apple Inc."));
        assert_eq!(merged.snapshot.current_price, 200.0);
        assert_eq!(merged.snapshot.volume_label, b.snapshot.volume_label);
        assert_eq!(merged.recommendation, Recommendation::Buy);
        assert_eq!(merged.historical.len(), 2);
        assert!(merged.historical[0].date < merged.historical[1].date);

        assert_eq!(merged.predictions[0].confidence_percent, 88);
        assert_eq!(merged.predictions[1].confidence_percent, 79);
        assert!((merged.predictions[0].predicted_price - 206.0).abs() < 1e-9);
    }

    #[test]
    fn uses_explicit_days_when_present() {
        let p = parse(json!({
            "ticker": "msft",
            "current_price": 400.0,
            "percent_change": -1.0,
            "recommendation": "hold",
            "confidence": 80.0,
            "day1": {"price": 396.0, "percent": -1.0, "confidence": 80.0},
            "day2": {"price": 394.0, "percent": -1.5, "confidence": 72.0},
            "day3": {"price": 392.0, "confidence": 64.8}
        }));
        let merged = p.validate_and_merge(base("MSFT")).unwrap();
        assert_eq!(merged.predictions[2].predicted_price, 392.0);
        assert_eq!(merged.predictions[2].confidence_percent, 64);
        assert_eq!(merged.historical.len(), 30);
    }

    #[test]
    fn rejects_bad_payloads() {
        let bad = [
            json!({"current_price": 0.0, "percent_change": 1.0, "recommendation": "BUY", "confidence": 50.0}),
            json!({"current_price": 10.0, "percent_change": 1.0, "recommendation": "MAYBE", "confidence": 50.0}),
            json!({"current_price": 10.0, "percent_change": 1.0, "recommendation": "BUY", "confidence": 150.0}),
            json!({"ticker": "TSLA", "current_price": 10.0, "percent_change": 1.0, "recommendation": "BUY", "confidence": 50.0}),
            json!({"current_price": 10.0, "percent_change": 1.0, "recommendation": "BUY", "confidence": 50.0,
                   "historical": [{"date": "2026-10-18", "price": -1.0}]}),
        ];
        for v in bad {
            assert!(parse(v.clone()).validate_and_merge(base("AAPL")).is_err(), "{v}");
        }
    }

    #[test]
    fn predictions_array_takes_precedence_over_extrapolation() {
        let p = parse(json!({
            "current_price": 100.0,
            "percent_change": 1.0,
            "recommendation": "HOLD",
            "confidence": 90.0,
            "predictions": [
                {"price": 150.0, "confidence": 90.0},
                {"price": 160.0, "confidence": 80.0},
                {"price": 170.0, "confidence": 70.0}
            ]
        }));
        let merged = p.validate_and_merge(base("AAPL")).unwrap();
        let prices: Vec<f64> = merged.predictions.iter().map(|d| d.predicted_price).collect();
        assert_eq!(prices, vec![150.0, 160.0, 170.0]);
        assert_eq!(merged.predictions[2].confidence_percent, 70);
        assert_eq!(merged.snapshot.change_percent, 1.0);
        assert_eq!(merged.recommendation, Recommendation::Hold);
    }

    #[test]
    fn ladder_only_payload_derives_headline_from_first_day() {
        let p = parse(json!({
            "ticker": "AAPL",
            "current_price": 150.0,
            "predictions": [
                {"date": "2026-10-20", "price": 153.5, "change_percent": 2.33, "confidence": 90, "recommendation": "BUY"},
                {"date": "2026-10-21", "price": 155.0, "change_percent": 3.33, "confidence": 80, "recommendation": "BUY"},
                {"date": "2026-10-22", "price": 151.0, "change_percent": 0.67, "confidence": 70, "recommendation": "HOLD"}
            ],
            "historical": [{"date": "2026-10-18", "price": 149.0}],
            "last_updated": "2026-10-19 09:00:00"
        }));
        let merged = p.validate_and_merge(base("AAPL")).unwrap();
        assert_eq!(merged.snapshot.change_percent, 2.33);
        assert_eq!(merged.recommendation, Recommendation::Buy);
        let confidences: Vec<u8> = merged.predictions.iter().map(|d| d.confidence_percent).collect();
        assert_eq!(confidences, vec![90, 80, 70]);
        assert_eq!(merged.predictions[1].predicted_price, 155.0);
        assert_eq!(merged.historical.len(), 1);
    }

    #[test]
    fn short_ladder_is_extended_and_missing_recommendation_is_classified() {
        let p = parse(json!({
            "current_price": 100.0,
            "predictions": [{"price": 90.0, "confidence": 80.0}]
        }));
        let merged = p.validate_and_merge(base("AAPL")).unwrap();
        assert!((merged.snapshot.change_percent + 10.0).abs() < 1e-9);
        assert_eq!(merged.recommendation, Recommendation::Sell);
        assert_eq!(merged.predictions[0].predicted_price, 90.0);
        assert!(merged.predictions[1].predicted_price < 90.0);
        assert_eq!(merged.predictions[1].confidence_percent, 72);
    }

    #[test]
    fn headline_or_ladder_is_required() {
        assert!(serde_json::from_value::<UpstreamPrediction>(json!({"percent_change": 1.0})).is_err());

        let bare = parse(json!({"current_price": 1.0}));
        assert!(bare.validate_and_merge(base("AAPL")).is_err());

        let no_confidence = parse(json!({"current_price": 1.0, "percent_change": 1.0}));
        assert!(no_confidence.validate_and_merge(base("AAPL")).is_err());
    }

    #[test]
    fn out_of_order_prediction_dates_are_rejected() {
        let p = parse(json!({
            "current_price": 100.0,
            "predictions": [
                {"date": "2026-10-21", "price": 101.0, "confidence": 80.0},
                {"date": "2026-10-20", "price": 102.0, "confidence": 70.0}
            ]
        }));
        assert!(p.validate_and_merge(base("AAPL")).is_err());
    }
}
