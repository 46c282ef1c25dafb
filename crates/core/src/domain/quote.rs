use crate::domain::recommendation::Recommendation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const PREDICTION_DAYS: usize = 3;
pub const HISTORY_DAYS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub current_price: f64,
    pub previous_close: f64,
    pub change_absolute: f64,
    pub change_percent: f64,
    pub volume_label: String,
    pub market_cap_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub day_offset: u8,
    pub predicted_price: f64,
    pub confidence_percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketBundle {
    pub ticker: String,
    /// `None` when the ticker is not part of the dashboard universe.
    pub name: Option<String>,
    pub as_of_date: NaiveDate,
    pub seed: u64,
    pub snapshot: QuoteSnapshot,
    pub predictions: [PredictionPoint; PREDICTION_DAYS],
    pub historical: Vec<HistoricalPoint>,
    pub recommendation: Recommendation,
}

impl MarketBundle {
    pub fn is_known(&self) -> bool {
        self.name.is_some()
    }

    pub fn next_day(&self) -> &PredictionPoint {
        &self.predictions[0]
    }
}

/// `"$X.XXT"` for values of 1000 (billions) and up, `"$X.XXB"` below.
pub fn format_market_cap(billions: f64) -> String {
    if billions >= 1000.0 {
        format!("${:.2}T", billions / 1000.0)
    } else {
        format!("${billions:.2}B")
    }
}

pub fn format_volume(millions: u32) -> String {
    format!("{millions}M")
}
