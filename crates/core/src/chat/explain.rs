use crate::domain::quote::MarketBundle;
use crate::domain::recommendation::Recommendation;

pub const DISCLAIMER: &str = "Please note that all predictions are based on historical data and market patterns, and should not be considered as financial advice.";

/// Plain-language walkthrough of the next-day prediction in `bundle`.
pub fn explain(bundle: &MarketBundle) -> String {
    let Some(name) = bundle.name.as_deref() else {
        return format!(
            "I currently don't have enough data to explain the prediction for {}.",
            bundle.ticker
        );
    };

    let current = bundle.snapshot.current_price;
    let next = bundle.next_day();
    let change_pct = if current > 0.0 {
        (next.predicted_price - current) / current * 100.0
    } else {
        0.0
    };

    let mut out = format!(
        "Based on our LSTM model analysis, {name} ({}) is currently trading at ${current:.2}. ",
        bundle.ticker
    );

    // Rounded to the displayed precision so "0.00%" never reads as a move.
    let shown_pct = (change_pct * 100.0).round() / 100.0;
    if shown_pct > 0.0 {
        out.push_str(&format!(
            "Our model predicts the price will increase by {shown_pct:.2}% to ${:.2} tomorrow. ",
            next.predicted_price
        ));
    } else if shown_pct < 0.0 {
        out.push_str(&format!(
            "Our model predicts the price will decrease by {:.2}% to ${:.2} tomorrow. ",
            shown_pct.abs(),
            next.predicted_price
        ));
    } else {
        out.push_str(&format!(
            "Our model predicts the price will remain stable at around ${:.2} tomorrow. ",
            next.predicted_price
        ));
    }

    out.push_str(&format!(
        "The confidence level for this prediction is {}%. ",
        next.confidence_percent
    ));

    out.push_str(match bundle.recommendation {
        Recommendation::Buy => {
            "Based on this analysis, our system suggests this stock may be a good buying opportunity."
        }
        Recommendation::Sell => {
            "Based on this analysis, our system suggests this may be a good time to consider selling."
        }
        Recommendation::Hold => {
            "Based on this analysis, our system suggests holding this position for now."
        }
    });

    out.push_str("\n\n");
    out.push_str(DISCLAIMER);
    out
}
