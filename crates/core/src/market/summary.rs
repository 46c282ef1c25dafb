use crate::domain::quote::MarketBundle;
use crate::domain::recommendation::Recommendation;
use crate::domain::symbol::DEFAULT_WATCHLIST;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

pub const MOVERS_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoverEntry {
    pub ticker: String,
    pub name: String,
    pub current_price: f64,
    pub change_percent: f64,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Breadth {
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

/// A major index, moved by the universe's mean change scaled by `beta`.
#[derive(Debug, Clone, Copy)]
pub struct IndexDef {
    pub name: &'static str,
    pub symbol: &'static str,
    pub previous_close: f64,
    pub beta: f64,
}

pub const INDEXES: [IndexDef; 3] = [
    IndexDef {
        name: "S&P 500",
        symbol: "SPX",
        previous_close: 4_953.95,
        beta: 1.0,
    },
    IndexDef {
        name: "NASDAQ",
        symbol: "COMP",
        previous_close: 16_833.39,
        beta: 1.3,
    },
    IndexDef {
        name: "Dow Jones",
        symbol: "DJI",
        previous_close: 37_909.29,
        beta: 0.8,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexQuote {
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub change_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub as_of_date: NaiveDate,
    pub indexes: Vec<IndexQuote>,
    pub gainers: Vec<MoverEntry>,
    pub losers: Vec<MoverEntry>,
    pub watchlist: Vec<MoverEntry>,
    pub breadth: Breadth,
}

impl MarketSummary {
    /// Unknown tickers in `bundles` are skipped.
    pub fn from_bundles(as_of_date: NaiveDate, bundles: &[MarketBundle]) -> Self {
        let mut entries: Vec<MoverEntry> = bundles.iter().filter_map(to_entry).collect();

        let mut breadth = Breadth::default();
        for e in &entries {
            match e.recommendation {
                Recommendation::Buy => breadth.buy += 1,
                Recommendation::Sell => breadth.sell += 1,
                Recommendation::Hold => breadth.hold += 1,
            }
        }

        let watchlist = DEFAULT_WATCHLIST
            .iter()
            .filter_map(|t| entries.iter().find(|e| e.ticker == *t).cloned())
            .collect();

        let mean_change = if entries.is_empty() {
            0.0
        } else {
            entries.iter().map(|e| e.change_percent).sum::<f64>() / entries.len() as f64
        };
        let indexes = INDEXES
            .iter()
            .map(|def| {
                let change_percent = mean_change * def.beta;
                IndexQuote {
                    name: def.name.to_string(),
                    symbol: def.symbol.to_string(),
                    price: def.previous_close * (1.0 + change_percent / 100.0),
                    change_percent,
                }
            })
            .collect();

        entries.sort_by(by_change_desc);
        let gainers = entries.iter().take(MOVERS_LEN).cloned().collect();
        entries.sort_by(by_change_asc);
        let losers = entries.iter().take(MOVERS_LEN).cloned().collect();

        Self {
            as_of_date,
            indexes,
            gainers,
            losers,
            watchlist,
            breadth,
        }
    }
}

fn to_entry(bundle: &MarketBundle) -> Option<MoverEntry> {
    Some(MoverEntry {
        ticker: bundle.ticker.clone(),
        name: bundle.name.clone()?,
        current_price: bundle.snapshot.current_price,
        change_percent: bundle.snapshot.change_percent,
        recommendation: bundle.recommendation,
    })
}

fn by_change_desc(a: &MoverEntry, b: &MoverEntry) -> Ordering {
    b.change_percent
        .partial_cmp(&a.change_percent)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.ticker.cmp(&b.ticker))
}

fn by_change_asc(a: &MoverEntry, b: &MoverEntry) -> Ordering {
    a.change_percent
        .partial_cmp(&b.change_percent)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.ticker.cmp(&b.ticker))
}
