use crate::domain::quote::MarketBundle;
use crate::domain::symbol::Symbol;
use serde::Serialize;

pub const BUY_TEXT: &str = "Based on our LSTM model's analysis, this stock is marked as a 'Buy' due to three key factors:\n\n1. Recent positive earnings report showing growth above expectations\n2. Increased trading volume indicating strong market interest\n3. Positive momentum with the stock trading above its 50-day moving average\n\nThe prediction has a high confidence score based on historical accuracy for this stock.";

pub const SELL_TEXT: &str = "Our model suggests a 'Sell' recommendation based on:\n\n1. Technical indicators showing overbought conditions\n2. Recent negative earnings surprise\n3. Decreasing volume on price increases, suggesting weakening momentum\n\nThe confidence score for this prediction is moderate, as the stock shows mixed signals.";

pub const HOLD_TEXT: &str = "The 'Hold' recommendation comes from our LSTM model analyzing:\n\n1. Stable price action within a defined range\n2. Average trading volume without significant changes\n3. Mixed technical indicators not showing a clear direction\n\nThe model has moderate confidence in this prediction due to the mixed signals.";

pub const HOW_PREDICTION_TEXT: &str = "Our predictions use Long Short-Term Memory (LSTM) neural networks, a type of recurrent neural network well-suited for time series forecasting. The model analyzes historical price patterns, trading volumes, and technical indicators to identify trends and make future price predictions.";

pub const FALLBACK_TEXT: &str = "I can help with understanding stock predictions, market analysis, and trading strategies. Just ask specific questions about stocks or predictions you see here!";

/// What the chat widget currently has on screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatContext<'a> {
    pub selected: Option<&'a Symbol>,
    pub quote: Option<&'a MarketBundle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Buy,
    Sell,
    Hold,
    HowPrediction,
    SelectedTicker,
    Explain,
    Forecast,
    Confidence,
    Advice,
    TickerHelp,
    HowItWorks,
    Accuracy,
    WhichStocks,
    Greeting,
    Thanks,
    Help,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub kind: RuleKind,
    pub text: String,
    /// Whether a learning quiz may follow this reply.
    pub offers_quiz: bool,
}

pub struct Rule {
    pub kind: RuleKind,
    pub offers_quiz: bool,
    /// Receives the lower-cased message.
    pub matches: fn(&str, &ChatContext<'_>) -> bool,
    /// `None` means the rule cannot render in this context; the scan moves on.
    pub render: fn(&ChatContext<'_>) -> Option<String>,
}

/// Evaluated top to bottom; the first rule that matches and renders wins.
pub const RULES: &[Rule] = &[
    Rule {
        kind: RuleKind::Buy,
        offers_quiz: true,
        matches: |m, _| m.contains("buy"),
        render: |_| Some(BUY_TEXT.to_string()),
    },
    Rule {
        kind: RuleKind::Sell,
        offers_quiz: false,
        matches: |m, _| m.contains("sell"),
        render: |_| Some(SELL_TEXT.to_string()),
    },
    Rule {
        kind: RuleKind::Hold,
        offers_quiz: false,
        matches: |m, _| m.contains("hold"),
        render: |_| Some(HOLD_TEXT.to_string()),
    },
    Rule {
        kind: RuleKind::HowPrediction,
        offers_quiz: false,
        matches: |m, _| m.contains("how") && m.contains("prediction"),
        render: |_| Some(HOW_PREDICTION_TEXT.to_string()),
    },
    Rule {
        kind: RuleKind::SelectedTicker,
        offers_quiz: false,
        matches: |m, ctx| {
            ctx.selected
                .is_some_and(|s| m.contains(&s.ticker.to_lowercase()))
        },
        render: render_selected_ticker,
    },
];

fn render_selected_ticker(ctx: &ChatContext<'_>) -> Option<String> {
    let symbol = ctx.selected?;
    let quote = ctx.quote?;
    Some(format!(
        "{} ({}) is currently showing a {} recommendation based on our LSTM model analysis. \
         The model has a confidence level of {}% for tomorrow's prediction.",
        symbol.ticker,
        symbol.name,
        quote.recommendation,
        quote.next_day().confidence_percent
    ))
}

pub fn respond(message: &str, ctx: &ChatContext<'_>) -> ChatReply {
    first_match(RULES, message, ctx).unwrap_or_else(|| ChatReply {
        kind: RuleKind::Fallback,
        text: FALLBACK_TEXT.to_string(),
        offers_quiz: false,
    })
}

/// First rule in `table` that matches the lower-cased `message` and renders.
pub fn first_match(table: &[Rule], message: &str, ctx: &ChatContext<'_>) -> Option<ChatReply> {
    let lower = message.to_lowercase();
    table
        .iter()
        .filter(|rule| (rule.matches)(&lower, ctx))
        .find_map(|rule| {
            (rule.render)(ctx).map(|text| ChatReply {
                kind: rule.kind,
                text,
                offers_quiz: rule.offers_quiz,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::symbol;
    use crate::market::generator::MockMarketGenerator;
    use chrono::NaiveDate;

    fn bundle(ticker: &str) -> MarketBundle {
        let as_of = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        MockMarketGenerator::default().generate(ticker, None, as_of)
    }

    #[test]
    fn why_buy_returns_canned_buy_text() {
        let reply = respond("Why buy?", &ChatContext::default());
        assert_eq!(reply.kind, RuleKind::Buy);
        assert_eq!(reply.text, BUY_TEXT);
        assert!(reply.offers_quiz);
    }

    #[test]
    fn unmatched_message_falls_back() {
        let reply = respond("market update", &ChatContext::default());
        assert_eq!(reply.kind, RuleKind::Fallback);
        assert_eq!(reply.text, FALLBACK_TEXT);
        assert!(!reply.offers_quiz);
    }

    #[test]
    fn earlier_rule_wins_on_ties() {
        let ctx = ChatContext::default();
        assert_eq!(respond("buy or sell?", &ctx).kind, RuleKind::Buy);
        assert_eq!(respond("SELL or HOLD", &ctx).kind, RuleKind::Sell);
        assert_eq!(respond("hold - how is the prediction made", &ctx).kind, RuleKind::Hold);
        assert_eq!(
            respond("How does the prediction work?", &ctx).kind,
            RuleKind::HowPrediction
        );
        assert_eq!(respond("how are you", &ctx).kind, RuleKind::Fallback);
    }

    #[test]
    fn selected_ticker_interpolates_quote() {
        let aapl = symbol::lookup("AAPL").unwrap();
        let quote = bundle("AAPL");
        let ctx = ChatContext {
            selected: Some(aapl),
            quote: Some(&quote),
        };

        let reply = respond("Tell me about aapl", &ctx);
        assert_eq!(reply.kind, RuleKind::SelectedTicker);
        assert!(reply.text.starts_with("AAPL (Apple Inc.) is currently showing a "));
        assert!(reply.text.contains(quote.recommendation.as_str()));
        assert!(reply
            .text
            .contains(&format!("{}%", quote.predictions[0].confidence_percent)));
    }

    #[test]
    fn selected_ticker_needs_a_quote() {
        let msft = symbol::lookup("MSFT").unwrap();
        let ctx = ChatContext {
            selected: Some(msft),
            quote: None,
        };
        assert_eq!(respond("msft?", &ctx).kind, RuleKind::Fallback);
    }

    #[test]
    fn keyword_rules_outrank_ticker_rule() {
        let msft = symbol::lookup("MSFT").unwrap();
        let quote = bundle("MSFT");
        let ctx = ChatContext {
            selected: Some(msft),
            quote: Some(&quote),
        };
        assert_eq!(respond("should I sell MSFT", &ctx).kind, RuleKind::Sell);
    }
}
