use crate::domain::quote::{
    format_market_cap, format_volume, HistoricalPoint, MarketBundle, PredictionPoint,
    QuoteSnapshot, HISTORY_DAYS, PREDICTION_DAYS,
};
use crate::domain::recommendation::Recommendation;
use crate::domain::symbol::{self, SYMBOLS};
use crate::time::calendar;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PRICE_RANGE: std::ops::RangeInclusive<f64> = 50.0..=500.0;
const CHANGE_PCT_RANGE: std::ops::RangeInclusive<f64> = -5.0..=5.0;
const VOLUME_MILLIONS_RANGE: std::ops::RangeInclusive<u32> = 10..=100;
const MARKET_CAP_FACTOR_RANGE: std::ops::RangeInclusive<f64> = 10.0..=30.0;
const DAILY_GROWTH_PCT_RANGE: std::ops::RangeInclusive<f64> = 0.0..=3.0;
const CONFIDENCE_NOISE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;
const HISTORY_STEP_PCT_RANGE: std::ops::RangeInclusive<f64> = -2.0..=2.0;

const CONFIDENCE_BASE: f64 = 95.0;
const CONFIDENCE_DECAY_PER_DAY: f64 = 7.0;

/// How a seed is chosen when the caller does not pass one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStrategy {
    /// Sum of the ticker's code points. Stable per symbol across runs.
    PerSymbol,
    /// Same seed for every symbol.
    Fixed(u64),
    /// Fresh random seed on every call. Not reproducible unless the
    /// recorded `MarketBundle::seed` is replayed.
    Entropy,
}

impl SeedStrategy {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "" | "symbol" | "per_symbol" => Ok(Self::PerSymbol),
            "entropy" | "random" => Ok(Self::Entropy),
            other => other
                .parse::<u64>()
                .map(Self::Fixed)
                .map_err(|_| anyhow::anyhow!("expected `symbol`, `entropy` or an integer seed")),
        }
    }
}

pub fn derive_seed(ticker: &str) -> u64 {
    ticker.chars().map(|c| c as u64).sum()
}

#[derive(Debug, Clone)]
pub struct MockMarketGenerator {
    strategy: SeedStrategy,
}

impl Default for MockMarketGenerator {
    fn default() -> Self {
        Self::new(SeedStrategy::PerSymbol)
    }
}

impl MockMarketGenerator {
    pub fn new(strategy: SeedStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> SeedStrategy {
        self.strategy
    }

    pub fn seed_for(&self, ticker: &str) -> u64 {
        match self.strategy {
            SeedStrategy::PerSymbol => derive_seed(ticker),
            SeedStrategy::Fixed(seed) => seed,
            SeedStrategy::Entropy => rand::thread_rng().gen(),
        }
    }

    /// Builds the full quote/prediction/history bundle for `ticker`.
    ///
    /// Unknown tickers still produce numbers; `MarketBundle::name` is `None`
    /// and callers are expected to treat that as not found.
    pub fn generate(&self, ticker: &str, seed: Option<u64>, as_of_date: NaiveDate) -> MarketBundle {
        let ticker = ticker.trim().to_uppercase();
        let seed = seed.unwrap_or_else(|| self.seed_for(&ticker));
        let name = symbol::display_name(&ticker).map(str::to_string);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut bundle = generate_with_rng(&ticker, as_of_date, &mut rng);
        bundle.name = name;
        bundle.seed = seed;
        bundle
    }

    pub fn generate_all(&self, as_of_date: NaiveDate) -> Vec<MarketBundle> {
        SYMBOLS
            .iter()
            .map(|s| self.generate(s.ticker, None, as_of_date))
            .collect()
    }
}

/// Draw order is part of the contract: snapshot, predictions, history.
/// Changing it changes every seeded bundle.
pub fn generate_with_rng<R: Rng>(
    ticker: &str,
    as_of_date: NaiveDate,
    rng: &mut R,
) -> MarketBundle {
    let snapshot = draw_snapshot(rng);
    let predictions = draw_predictions(snapshot.current_price, rng);
    let historical = draw_history(snapshot.previous_close, as_of_date, rng);
    let recommendation = Recommendation::classify(snapshot.change_percent);

    MarketBundle {
        ticker: ticker.to_string(),
        name: None,
        as_of_date,
        seed: 0,
        snapshot,
        predictions,
        historical,
        recommendation,
    }
}

fn draw_snapshot<R: Rng>(rng: &mut R) -> QuoteSnapshot {
    let current_price = rng.gen_range(PRICE_RANGE);
    let change_percent = rng.gen_range(CHANGE_PCT_RANGE);
    let change_absolute = current_price * change_percent / 100.0;
    let previous_close = current_price - change_absolute;

    let volume = rng.gen_range(VOLUME_MILLIONS_RANGE);
    let market_cap = current_price * rng.gen_range(MARKET_CAP_FACTOR_RANGE);

    QuoteSnapshot {
        current_price,
        previous_close,
        change_absolute,
        change_percent,
        volume_label: format_volume(volume),
        market_cap_label: format_market_cap(market_cap),
    }
}

fn draw_predictions<R: Rng>(
    current_price: f64,
    rng: &mut R,
) -> [PredictionPoint; PREDICTION_DAYS] {
    let mut price = current_price;
    std::array::from_fn(|i| {
        let day = (i + 1) as u8;
        let growth_pct = rng.gen_range(DAILY_GROWTH_PCT_RANGE);
        price *= 1.0 + growth_pct / 100.0;

        let raw = CONFIDENCE_BASE - CONFIDENCE_DECAY_PER_DAY * f64::from(day)
            + rng.gen_range(CONFIDENCE_NOISE_RANGE);

        PredictionPoint {
            day_offset: day,
            predicted_price: price,
            confidence_percent: clamp_confidence(raw),
        }
    })
}

pub fn clamp_confidence(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.floor().clamp(0.0, 100.0) as u8
}

fn draw_history<R: Rng>(
    previous_close: f64,
    as_of_date: NaiveDate,
    rng: &mut R,
) -> Vec<HistoricalPoint> {
    let mut price = previous_close;
    let mut out: Vec<HistoricalPoint> = calendar::history_dates(as_of_date, HISTORY_DAYS)
        .into_iter()
        .map(|date| {
            price *= 1.0 + rng.gen_range(HISTORY_STEP_PCT_RANGE) / 100.0;
            HistoricalPoint { date, price }
        })
        .collect();

    // Already in order; consumers rely on the explicit guarantee.
    out.sort_by_key(|p| p.date);
    out
}
