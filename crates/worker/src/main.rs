use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use velora_core::domain::quote::MarketBundle;
use velora_core::market::generator::{MockMarketGenerator, SeedStrategy};
use velora_core::market::portfolio::{self, Portfolio};
use velora_core::market::summary::MarketSummary;

mod universe;

#[derive(Debug, Parser)]
#[command(name = "velora_worker")]
struct Args {
    /// As-of date (YYYY-MM-DD). History ends the day before. Defaults to today's UTC date.
    #[arg(long)]
    as_of_date: Option<String>,

    /// Restrict the run to these tickers (repeatable). Defaults to the whole universe.
    #[arg(long = "ticker")]
    tickers: Vec<String>,

    /// Fixed seed for every symbol. Overrides MOCK_SEED_STRATEGY.
    #[arg(long)]
    seed: Option<u64>,

    /// Include the gainers/losers/watchlist summary.
    #[arg(long)]
    summary: bool,

    /// Include the mock portfolio (seeded from PORTFOLIO_SEED).
    #[arg(long)]
    portfolio: bool,

    /// Write the JSON document here instead of stdout.
    #[arg(long)]
    out: Option<std::path::PathBuf>,

    /// Generate everything but do not write any output.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Serialize)]
struct BatchOutput {
    as_of_date: NaiveDate,
    generated_at: DateTime<Utc>,
    seed_strategy: String,
    bundles: Vec<MarketBundle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<MarketSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    portfolio: Option<Portfolio>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = velora_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let now = Utc::now();
    let as_of_date = velora_core::time::calendar::resolve_as_of_date(args.as_of_date.as_deref(), now)?;

    let strategy = args
        .seed
        .map(SeedStrategy::Fixed)
        .unwrap_or(settings.seed_strategy);
    let generator = MockMarketGenerator::new(strategy);

    let symbols = universe::select_symbols(&args.tickers)?;
    let bundles: Vec<MarketBundle> = symbols
        .iter()
        .map(|s| generator.generate(s.ticker, None, as_of_date))
        .collect();

    let summary = args
        .summary
        .then(|| MarketSummary::from_bundles(as_of_date, &bundles));
    let portfolio = args
        .portfolio
        .then(|| portfolio::generate_portfolio(settings.portfolio_seed));

    if args.dry_run {
        tracing::info!(
            %as_of_date,
            dry_run = true,
            bundles_len = bundles.len(),
            ?strategy,
            "batch generated (dry-run)"
        );
        return Ok(());
    }

    let output = BatchOutput {
        as_of_date,
        generated_at: now,
        seed_strategy: format!("{strategy:?}"),
        bundles,
        summary,
        portfolio,
    };

    if let Err(err) = write_output(&output, args.out.as_deref()) {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(%as_of_date, error = %err, "batch output failed");
        return Err(err);
    }

    tracing::info!(
        %as_of_date,
        bundles_len = output.bundles.len(),
        out = ?args.out,
        "batch written"
    );
    Ok(())
}

fn write_output(output: &BatchOutput, path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(output).context("serialize batch output failed")?;
    match path {
        Some(p) => std::fs::write(p, json)
            .with_context(|| format!("write batch output to {} failed", p.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn init_sentry(settings: &velora_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_tickers_and_flags() {
        let args = Args::parse_from([
            "velora_worker",
            "--as-of-date",
            "2026-10-19",
            "--ticker",
            "AAPL",
            "--ticker",
            "MSFT",
            "--seed",
            "7",
            "--summary",
            "--dry-run",
        ]);
        assert_eq!(args.as_of_date.as_deref(), Some("2026-10-19"));
        assert_eq!(args.tickers, vec!["AAPL", "MSFT"]);
        assert_eq!(args.seed, Some(7));
        assert!(args.summary);
        assert!(!args.portfolio);
        assert!(args.dry_run);
    }

    #[test]
    fn output_omits_absent_sections() {
        let as_of = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let generator = MockMarketGenerator::new(SeedStrategy::Fixed(1));
        let output = BatchOutput {
            as_of_date: as_of,
            generated_at: Utc::now(),
            seed_strategy: "Fixed(1)".to_string(),
            bundles: vec![generator.generate("AAPL", None, as_of)],
            summary: None,
            portfolio: None,
        };
        let v = serde_json::to_value(&output).unwrap();
        assert_eq!(v["as_of_date"], "2026-10-19");
        assert_eq!(v["bundles"][0]["seed"], 1);
        assert!(v.get("summary").is_none());
        assert!(v.get("portfolio").is_none());
    }
}
