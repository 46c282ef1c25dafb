//! Server-side assistant. Answers from the selected ticker's bundle when one
//! is in context, handles a few general topics otherwise, and hands anything
//! it does not recognise to the keyword selector in `rules`.

use crate::chat::explain;
use crate::chat::rules::{self, ChatContext, ChatReply, Rule, RuleKind};
use crate::domain::quote::MarketBundle;
use crate::domain::recommendation::Recommendation;
use chrono::Duration;
use std::fmt::Write;

pub const HOW_IT_WORKS_TEXT: &str = "I use Long Short-Term Memory (LSTM) neural networks to make stock predictions. This deep learning approach is well-suited for time series forecasting as it can learn patterns in historical price data. My models consider factors like historical prices, trading volume, and market trends to generate predictions.";

pub const ACCURACY_TEXT: &str = "My prediction accuracy varies by stock and time horizon. Generally, short-term predictions (1-3 days) tend to be more accurate than longer-term forecasts. On average, my predictions achieve 70-85% directional accuracy for major stocks in stable market conditions. Every prediction includes a confidence score to help you gauge reliability.";

pub const WHICH_STOCKS_TEXT: &str = "I don't provide general stock recommendations as proper investment advice should consider your personal financial situation, goals, and risk tolerance. I can, however, analyze specific stocks you're interested in and provide predictions based on historical data patterns.";

pub const GREETING_TEXT: &str = "Hello! I'm your AI stock prediction assistant. I can help analyze stock trends, explain price forecasts, and answer questions about specific stocks. What would you like to know today?";

pub const THANKS_TEXT: &str = "You're welcome! If you have any other questions about stocks or predictions, feel free to ask.";

pub const HELP_TEXT: &str = "I can help you with:\n1. Stock price predictions for specific tickers\n2. Explanations of why a stock might move in a certain direction\n3. Information about a company and its recent performance\n4. Confidence levels for predictions\n5. Basic investment considerations\n\nTry asking something like:\n- \"What's your prediction for AAPL?\"\n- \"Explain why MSFT might go up\"\n- \"How confident are you about TSLA's forecast?\"\n- \"Should I consider buying GOOGL?\"";

fn contains_any(message: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| message.contains(n))
}

/// Whole-word match, so "this" or "anything" never read as a greeting.
fn has_word(message: &str, words: &[&str]) -> bool {
    message
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| words.contains(&w))
}

/// Ticker rules need the selected bundle; they sit above the general ones and
/// `TickerHelp` catches everything else while a ticker is in context.
pub const ASSISTANT_RULES: &[Rule] = &[
    Rule {
        kind: RuleKind::Explain,
        offers_quiz: false,
        matches: |m, ctx| {
            ctx.quote.is_some() && contains_any(m, &["explain", "why", "how", "analysis"])
        },
        render: |ctx| ctx.quote.map(explain::explain),
    },
    Rule {
        kind: RuleKind::Forecast,
        offers_quiz: false,
        matches: |m, ctx| ctx.quote.is_some() && contains_any(m, &["price", "predict", "forecast"]),
        render: |ctx| ctx.quote.map(render_forecast),
    },
    Rule {
        kind: RuleKind::Confidence,
        offers_quiz: false,
        matches: |m, ctx| {
            ctx.quote.is_some() && contains_any(m, &["confidence", "accuracy", "certain"])
        },
        render: |ctx| ctx.quote.map(render_confidence),
    },
    Rule {
        kind: RuleKind::Advice,
        offers_quiz: true,
        matches: |m, ctx| {
            ctx.quote.is_some() && contains_any(m, &["buy", "sell", "invest", "recommend"])
        },
        render: |ctx| ctx.quote.map(render_advice),
    },
    Rule {
        kind: RuleKind::TickerHelp,
        offers_quiz: false,
        matches: |_, ctx| ctx.quote.is_some(),
        render: |ctx| {
            ctx.quote.map(|b| {
                format!(
                    "I can help with questions about {}'s price predictions, explanations of the forecast, or investment recommendations. What specifically would you like to know?",
                    b.ticker
                )
            })
        },
    },
    Rule {
        kind: RuleKind::HowItWorks,
        offers_quiz: false,
        matches: |m, _| contains_any(m, &["how do you", "how does your", "how are predictions"]),
        render: |_| Some(HOW_IT_WORKS_TEXT.to_string()),
    },
    Rule {
        kind: RuleKind::Accuracy,
        offers_quiz: false,
        matches: |m, _| m.contains("accuracy") || m.contains("how accurate"),
        render: |_| Some(ACCURACY_TEXT.to_string()),
    },
    Rule {
        kind: RuleKind::WhichStocks,
        offers_quiz: false,
        matches: |m, _| contains_any(m, &["which stocks", "what stocks", "recommend stocks"]),
        render: |_| Some(WHICH_STOCKS_TEXT.to_string()),
    },
    Rule {
        kind: RuleKind::Greeting,
        offers_quiz: false,
        matches: |m, _| has_word(m, &["hello", "hi", "hey"]),
        render: |_| Some(GREETING_TEXT.to_string()),
    },
    Rule {
        kind: RuleKind::Thanks,
        offers_quiz: false,
        matches: |m, _| m.contains("thank"),
        render: |_| Some(THANKS_TEXT.to_string()),
    },
    Rule {
        kind: RuleKind::Help,
        offers_quiz: false,
        matches: |m, _| m.contains("help"),
        render: |_| Some(HELP_TEXT.to_string()),
    },
];

/// Assistant table first, then the keyword selector (which always answers).
pub fn respond(message: &str, ctx: &ChatContext<'_>) -> ChatReply {
    rules::first_match(ASSISTANT_RULES, message, ctx).unwrap_or_else(|| rules::respond(message, ctx))
}

fn change_from_current(bundle: &MarketBundle, price: f64) -> f64 {
    let current = bundle.snapshot.current_price;
    if current > 0.0 {
        (price - current) / current * 100.0
    } else {
        0.0
    }
}

fn signed_pct(pct: f64) -> String {
    if pct > 0.0 {
        format!("+{pct:.2}%")
    } else {
        format!("{pct:.2}%")
    }
}

fn render_forecast(bundle: &MarketBundle) -> String {
    let mut out = format!("Here's my price forecast for {}:\n", bundle.ticker);
    for p in &bundle.predictions {
        let date = bundle.as_of_date + Duration::days(i64::from(p.day_offset) - 1);
        let pct = change_from_current(bundle, p.predicted_price);
        let _ = writeln!(
            out,
            "• {date}: ${:.2} ({}) - {}",
            p.predicted_price,
            signed_pct(pct),
            Recommendation::classify(pct)
        );
    }
    out
}

fn render_confidence(bundle: &MarketBundle) -> String {
    let total: u32 = bundle
        .predictions
        .iter()
        .map(|p| u32::from(p.confidence_percent))
        .sum();
    let avg = f64::from(total) / bundle.predictions.len() as f64;
    format!(
        "My predictions for {} have an average confidence level of {avg:.1}%. The confidence decreases the further into the future we predict.",
        bundle.ticker
    )
}

fn render_advice(bundle: &MarketBundle) -> String {
    let next = bundle.next_day();
    let pct = change_from_current(bundle, next.predicted_price);
    format!(
        "Based on my analysis of {}, the current recommendation is: {}. The current price is ${:.2} and I predict it will be ${:.2} tomorrow ({}). Remember that this is not financial advice and all investments carry risk.",
        bundle.ticker,
        bundle.recommendation,
        bundle.snapshot.current_price,
        next.predicted_price,
        signed_pct(pct)
    )
}
