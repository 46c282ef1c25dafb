use crate::domain::recommendation::{Recommendation, PORTFOLIO_THRESHOLD_PCT};
use crate::domain::symbol::SYMBOLS;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub ticker: String,
    pub name: String,
    pub shares: u32,
    pub avg_price: f64,
    pub current_price: f64,
    pub value: f64,
    pub change_percent: f64,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Portfolio {
    pub seed: u64,
    pub total_value: f64,
    pub total_change: f64,
    pub percent_change: f64,
    pub holdings: Vec<Holding>,
}

/// Mock holdings for every dashboard symbol, one position each.
pub fn generate_portfolio(seed: u64) -> Portfolio {
    let mut rng = StdRng::seed_from_u64(seed);

    let holdings: Vec<Holding> = SYMBOLS
        .iter()
        .map(|s| {
            let shares = rng.gen_range(10..110u32);
            let avg_price = rng.gen_range(50.0..=550.0);
            let current_price = avg_price * (1.0 + rng.gen_range(-0.1..=0.1));
            let change_percent = (current_price - avg_price) / avg_price * 100.0;

            Holding {
                ticker: s.ticker.to_string(),
                name: s.name.to_string(),
                shares,
                avg_price,
                current_price,
                value: f64::from(shares) * current_price,
                change_percent,
                recommendation: Recommendation::classify_with_threshold(
                    change_percent,
                    PORTFOLIO_THRESHOLD_PCT,
                ),
            }
        })
        .collect();

    let total_value: f64 = holdings.iter().map(|h| h.value).sum();
    let total_change: f64 = holdings
        .iter()
        .map(|h| f64::from(h.shares) * (h.current_price - h.avg_price))
        .sum();
    let cost_basis = total_value - total_change;
    let percent_change = if cost_basis > 0.0 {
        total_change / cost_basis * 100.0
    } else {
        0.0
    };

    Portfolio {
        seed,
        total_value,
        total_change,
        percent_change,
        holdings,
    }
}
