use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "neutral" => Some(Self::Neutral),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    pub title: &'static str,
    pub source: &'static str,
    pub hours_ago: u32,
    pub sentiment: Sentiment,
}

impl NewsItem {
    pub fn time_label(&self) -> String {
        match self.hours_ago {
            0 => "just now".to_string(),
            1 => "1 hour ago".to_string(),
            h => format!("{h} hours ago"),
        }
    }
}

/// Newest first.
pub const NEWS: [NewsItem; 6] = [
    NewsItem {
        title: "Tech Stocks Surge on AI Breakthrough",
        source: "Financial Times",
        hours_ago: 2,
        sentiment: Sentiment::Positive,
    },
    NewsItem {
        title: "Federal Reserve Hints at Interest Rate Changes",
        source: "Wall Street Journal",
        hours_ago: 4,
        sentiment: Sentiment::Neutral,
    },
    NewsItem {
        title: "Emerging Markets Show Resilience in Global Economy",
        source: "Bloomberg",
        hours_ago: 6,
        sentiment: Sentiment::Positive,
    },
    NewsItem {
        title: "Chipmakers Slide as Export Curbs Tighten",
        source: "Reuters",
        hours_ago: 8,
        sentiment: Sentiment::Negative,
    },
    NewsItem {
        title: "Retail Earnings Season Opens with Mixed Results",
        source: "CNBC",
        hours_ago: 11,
        sentiment: Sentiment::Neutral,
    },
    NewsItem {
        title: "Oil Prices Dip on Supply Outlook",
        source: "MarketWatch",
        hours_ago: 15,
        sentiment: Sentiment::Negative,
    },
];

pub const DEFAULT_NEWS_LIMIT: usize = 3;

/// Newest `limit` items, optionally restricted to one sentiment.
pub fn latest(limit: usize, sentiment: Option<Sentiment>) -> Vec<&'static NewsItem> {
    NEWS.iter()
        .filter(|n| sentiment.map_or(true, |s| n.sentiment == s))
        .take(limit)
        .collect()
}
