use serde::{Deserialize, Serialize};
use std::fmt;

/// Change-percent threshold for the quote widgets.
pub const QUOTE_THRESHOLD_PCT: f64 = 2.0;

/// Gain/loss threshold for portfolio holdings.
pub const PORTFOLIO_THRESHOLD_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl Recommendation {
    pub fn classify(change_percent: f64) -> Self {
        Self::classify_with_threshold(change_percent, QUOTE_THRESHOLD_PCT)
    }

    /// Strictly above `threshold` is BUY, strictly below `-threshold` is SELL.
    /// NaN falls through to HOLD.
    pub fn classify_with_threshold(change_percent: f64, threshold: f64) -> Self {
        if change_percent > threshold {
            Self::Buy
        } else if change_percent < -threshold {
            Self::Sell
        } else {
            Self::Hold
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Some(Self::Buy),
            "SELL" => Some(Self::Sell),
            "HOLD" => Some(Self::Hold),
            _ => None,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
