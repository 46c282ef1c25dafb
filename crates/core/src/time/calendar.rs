use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Explicit `YYYY-MM-DD` wins; otherwise the UTC calendar date of `now_utc`.
pub fn resolve_as_of_date(
    as_of_date_arg: Option<&str>,
    now_utc: DateTime<Utc>,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = as_of_date_arg {
        return NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid as-of date (expected YYYY-MM-DD): {s}"));
    }
    Ok(now_utc.date_naive())
}

/// `days` consecutive calendar days ending the day before `as_of_date`.
pub fn history_dates(as_of_date: NaiveDate, days: usize) -> Vec<NaiveDate> {
    let start = as_of_date - Duration::days(days as i64);
    (0..days)
        .map(|i| start + Duration::days(i as i64))
        .collect()
}

/// `days` consecutive calendar days following `last`.
pub fn forecast_dates(last: NaiveDate, days: usize) -> Vec<NaiveDate> {
    (1..=days)
        .map(|i| last + Duration::days(i as i64))
        .collect()
}
