use std::collections::BTreeSet;
use velora_core::domain::symbol::{self, Symbol, SYMBOLS};

/// Symbols for a batch run, in dashboard order. An empty request selects the
/// whole universe; unknown tickers fail the run rather than producing
/// nameless bundles.
pub fn select_symbols(requested: &[String]) -> anyhow::Result<Vec<&'static Symbol>> {
    if requested.is_empty() {
        return Ok(SYMBOLS.iter().collect());
    }

    let mut wanted = BTreeSet::new();
    let mut unknown = Vec::new();
    for t in requested {
        match symbol::lookup(t) {
            Some(s) => {
                wanted.insert(s.ticker);
            }
            None => unknown.push(t.trim().to_string()),
        }
    }

    anyhow::ensure!(
        unknown.is_empty(),
        "unknown tickers (not in the dashboard universe): {}",
        unknown.join(", ")
    );

    Ok(SYMBOLS
        .iter()
        .filter(|s| wanted.contains(s.ticker))
        .collect())
}
