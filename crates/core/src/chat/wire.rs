use crate::chat::quiz::{QuizFeedback, QuizQuestion};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid message format";

/// Inbound socket frame. Untyped frames are chat messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    Chat {
        message: String,
        ticker: Option<String>,
    },
    QuizAnswer {
        answer: Option<usize>,
    },
}

#[derive(Debug, Deserialize)]
struct RawClientFrame {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    ticker: Option<String>,
    #[serde(default)]
    answer: Option<usize>,
}

pub fn parse_client_frame(text: &str) -> anyhow::Result<ClientFrame> {
    let raw: RawClientFrame = serde_json::from_str(text)?;
    match raw.kind.as_deref() {
        None | Some("chat") => Ok(ClientFrame::Chat {
            message: raw.message.unwrap_or_default(),
            ticker: raw.ticker.filter(|t| !t.trim().is_empty()),
        }),
        Some("quiz_answer") => Ok(ClientFrame::QuizAnswer { answer: raw.answer }),
        Some(other) => anyhow::bail!("unknown frame type: {other}"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    BotResponse {
        message: String,
        timestamp: String,
    },
    Quiz {
        question: &'static str,
        options: [&'static str; 4],
    },
    QuizFeedback {
        correct: bool,
        message: String,
        score: u32,
    },
    Error {
        message: String,
    },
}

impl ServerFrame {
    pub fn bot_response(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::BotResponse {
            message: message.into(),
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn quiz(question: &QuizQuestion) -> Self {
        Self::Quiz {
            question: question.question,
            options: question.options,
        }
    }

    pub fn feedback(feedback: &QuizFeedback, score: u32) -> Self {
        Self::QuizFeedback {
            correct: feedback.is_correct(),
            message: feedback.message(),
            score,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> String {
        // Only strings, bools and integers; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!("{{\"type\":\"error\",\"message\":\"{INVALID_FORMAT_MESSAGE}\"}}")
        })
    }
}
