use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub ticker: &'static str,
    pub name: &'static str,
}

const fn sym(ticker: &'static str, name: &'static str) -> Symbol {
    Symbol { ticker, name }
}

/// Dashboard universe, in display order.
pub const SYMBOLS: [Symbol; 46] = [
    sym("AAPL", "Apple Inc."),
    sym("MSFT", "Microsoft Corp."),
    sym("GOOGL", "Alphabet Inc. (Google)"),
    sym("AMZN", "Amazon.com Inc."),
    sym("TSLA", "Tesla Inc."),
    sym("NVDA", "NVIDIA Corp."),
    sym("META", "Meta Platforms Inc."),
    sym("JPM", "JPMorgan Chase & Co."),
    sym("V", "Visa Inc."),
    sym("PG", "Procter & Gamble Co."),
    sym("MA", "Mastercard Inc."),
    sym("HD", "Home Depot Inc."),
    sym("CVX", "Chevron Corp."),
    sym("MRK", "Merck & Co."),
    sym("ABBV", "AbbVie Inc."),
    sym("LLY", "Eli Lilly & Co."),
    sym("BAC", "Bank of America Corp."),
    sym("PFE", "Pfizer Inc."),
    sym("AVGO", "Broadcom Inc."),
    sym("KO", "Coca-Cola Co."),
    sym("PEP", "PepsiCo Inc."),
    sym("TMO", "Thermo Fisher Scientific"),
    sym("COST", "Costco Wholesale Corp."),
    sym("DIS", "Walt Disney Co."),
    sym("CSCO", "Cisco Systems Inc."),
    sym("ADBE", "Adobe Inc."),
    sym("WFC", "Wells Fargo & Co."),
    sym("VZ", "Verizon Communications"),
    sym("ACN", "Accenture PLC"),
    sym("ABT", "Abbott Laboratories"),
    sym("CRM", "Salesforce Inc."),
    sym("DHR", "Danaher Corp."),
    sym("INTC", "Intel Corp."),
    sym("NFLX", "Netflix Inc."),
    sym("CMCSA", "Comcast Corp."),
    sym("TXN", "Texas Instruments"),
    sym("NEE", "NextEra Energy Inc."),
    sym("QCOM", "Qualcomm Inc."),
    sym("HON", "Honeywell International"),
    sym("AMGN", "Amgen Inc."),
    sym("IBM", "IBM Corp."),
    sym("LOW", "Lowe's Companies Inc."),
    sym("INTU", "Intuit Inc."),
    sym("PM", "Philip Morris International"),
    sym("ORCL", "Oracle Corp."),
    sym("MCD", "McDonald's Corp."),
];

pub const DEFAULT_WATCHLIST: [&str; 5] = ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"];

const MIN_QUERY_LEN: usize = 2;
const MAX_SEARCH_RESULTS: usize = 5;

/// Case-insensitive ticker lookup. Surrounding whitespace is ignored.
pub fn lookup(ticker: &str) -> Option<&'static Symbol> {
    let ticker = ticker.trim();
    SYMBOLS
        .iter()
        .find(|s| s.ticker.eq_ignore_ascii_case(ticker))
}

pub fn display_name(ticker: &str) -> Option<&'static str> {
    lookup(ticker).map(|s| s.name)
}

pub fn search(query: &str) -> Vec<&'static Symbol> {
    let q = query.trim().to_lowercase();
    if q.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    SYMBOLS
        .iter()
        .filter(|s| s.ticker.to_lowercase().contains(&q) || s.name.to_lowercase().contains(&q))
        .take(MAX_SEARCH_RESULTS)
        .collect()
}
