use crate::domain::quote::MarketBundle;
use crate::time::calendar;
use chrono::NaiveDate;
use serde::Serialize;

/// Two aligned line series for the price chart: history followed by the
/// forecast days. Each series is `None` where the other one is plotted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub ticker: String,
    pub labels: Vec<NaiveDate>,
    pub historical: Vec<Option<f64>>,
    pub predicted: Vec<Option<f64>>,
}

impl ChartSeries {
    pub fn from_bundle(bundle: &MarketBundle) -> Self {
        let history_len = bundle.historical.len();
        let forecast_len = bundle.predictions.len();

        let mut labels: Vec<NaiveDate> = bundle.historical.iter().map(|p| p.date).collect();
        let last = labels
            .last()
            .copied()
            .unwrap_or_else(|| bundle.as_of_date.pred_opt().unwrap_or(bundle.as_of_date));
        labels.extend(calendar::forecast_dates(last, forecast_len));

        let historical = bundle
            .historical
            .iter()
            .map(|p| Some(p.price))
            .chain(std::iter::repeat(None).take(forecast_len))
            .collect();

        let predicted = std::iter::repeat(None)
            .take(history_len)
            .chain(bundle.predictions.iter().map(|p| Some(p.predicted_price)))
            .collect();

        Self {
            ticker: bundle.ticker.clone(),
            labels,
            historical,
            predicted,
        }
    }
}
