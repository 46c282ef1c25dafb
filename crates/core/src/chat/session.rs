use crate::chat::error::ChatError;
use crate::chat::quiz::{QuizFeedback, QuizQuestion, POINTS_PER_CORRECT_ANSWER, QUESTIONS};
use crate::chat::assistant;
use crate::chat::rules::{ChatContext, ChatReply};
use rand::rngs::StdRng;
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub quiz_probability: f64,
    pub reply_delay_ms: RangeInclusive<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quiz_probability: 0.3,
            reply_delay_ms: 500..=1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatState {
    Idle,
    UserTyped { message: String },
    BotResponding { reply: ChatReply },
    QuizShown { question: QuizQuestion },
}

/// A reply that is ready but must not be shown before `delay` elapses.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReply {
    pub reply: ChatReply,
    pub delay: Duration,
}

/// Per-conversation chat widget state. Owned by exactly one connection.
#[derive(Debug)]
pub struct ChatSession {
    state: ChatState,
    config: SessionConfig,
    rng: StdRng,
    score: u32,
}

impl ChatSession {
    pub fn new(config: SessionConfig, rng: StdRng) -> Self {
        Self {
            state: ChatState::Idle,
            config,
            rng,
            score: 0,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Accepted while idle or while a quiz is open; typing over an open
    /// quiz dismisses it.
    pub fn user_typed(&mut self, message: &str) -> Result<(), ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        match self.state {
            ChatState::Idle | ChatState::QuizShown { .. } => {
                self.state = ChatState::UserTyped {
                    message: message.to_string(),
                };
                Ok(())
            }
            ChatState::UserTyped { .. } | ChatState::BotResponding { .. } => Err(ChatError::Busy),
        }
    }

    pub fn respond(&mut self, ctx: &ChatContext<'_>) -> Result<PendingReply, ChatError> {
        let ChatState::UserTyped { message } = &self.state else {
            return Err(ChatError::NothingToAnswer);
        };

        let reply = assistant::respond(message, ctx);
        let delay = Duration::from_millis(self.rng.gen_range(self.config.reply_delay_ms.clone()));
        self.state = ChatState::BotResponding {
            reply: reply.clone(),
        };
        Ok(PendingReply { reply, delay })
    }

    /// Typed-then-respond in one step.
    pub fn handle_message(
        &mut self,
        message: &str,
        ctx: &ChatContext<'_>,
    ) -> Result<PendingReply, ChatError> {
        self.user_typed(message)?;
        self.respond(ctx)
    }

    /// Marks the pending reply as shown. Returns the quiz question if one
    /// should follow it.
    pub fn reply_delivered(&mut self) -> Result<Option<QuizQuestion>, ChatError> {
        let ChatState::BotResponding { reply } = &self.state else {
            return Err(ChatError::NothingToAnswer);
        };

        let show_quiz =
            reply.offers_quiz && self.rng.gen_bool(self.config.quiz_probability.clamp(0.0, 1.0));
        if show_quiz {
            let question = QUESTIONS[self.rng.gen_range(0..QUESTIONS.len())];
            self.state = ChatState::QuizShown { question };
            Ok(Some(question))
        } else {
            self.state = ChatState::Idle;
            Ok(None)
        }
    }

    /// Rejected answers (nothing selected, out of range) leave the quiz open.
    pub fn submit_answer(&mut self, answer: Option<usize>) -> Result<QuizFeedback, ChatError> {
        let ChatState::QuizShown { question } = &self.state else {
            return Err(ChatError::NoActiveQuiz);
        };
        let answer = answer.ok_or(ChatError::NoOptionSelected)?;
        if answer >= question.options.len() {
            return Err(ChatError::InvalidOption {
                index: answer,
                options: question.options.len(),
            });
        }

        let feedback = if question.is_correct(answer) {
            self.score += POINTS_PER_CORRECT_ANSWER;
            QuizFeedback::Correct {
                points: POINTS_PER_CORRECT_ANSWER,
            }
        } else {
            QuizFeedback::Incorrect {
                correct_answer: question.correct_option(),
            }
        };
        self.state = ChatState::Idle;
        Ok(feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::rules::RuleKind;
    use rand::SeedableRng;

    fn session(quiz_probability: f64) -> ChatSession {
        ChatSession::new(
            SessionConfig {
                quiz_probability,
                reply_delay_ms: 500..=1000,
            },
            StdRng::seed_from_u64(11),
        )
    }

    #[test]
    fn full_turn_returns_to_idle() {
        let mut s = session(0.0);
        let pending = s.handle_message("market update", &ChatContext::default()).unwrap();
        assert_eq!(pending.reply.kind, RuleKind::Fallback);
        assert!(pending.delay >= Duration::from_millis(500));
        assert!(pending.delay <= Duration::from_millis(1000));
        assert!(matches!(s.state(), ChatState::BotResponding { .. }));

        assert_eq!(s.reply_delivered().unwrap(), None);
        assert_eq!(s.state(), &ChatState::Idle);
    }

    #[test]
    fn empty_message_is_ignored() {
        let mut s = session(0.0);
        assert_eq!(s.user_typed("   "), Err(ChatError::EmptyMessage));
        assert_eq!(s.state(), &ChatState::Idle);
    }

    #[test]
    fn cannot_type_while_bot_is_responding() {
        let mut s = session(0.0);
        s.handle_message("hold?", &ChatContext::default()).unwrap();
        assert_eq!(s.user_typed("again"), Err(ChatError::Busy));
    }

    #[test]
    fn buy_reply_always_opens_quiz_at_probability_one() {
        let mut s = session(1.0);
        s.handle_message("why buy", &ChatContext::default()).unwrap();
        let q = s.reply_delivered().unwrap().expect("quiz expected");
        assert!(matches!(s.state(), ChatState::QuizShown { .. }));
        assert!(QUESTIONS.contains(&q));
    }

    #[test]
    fn ticker_advice_can_open_quiz() {
        let as_of = chrono::NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let quote = crate::market::generator::MockMarketGenerator::default().generate("AAPL", None, as_of);
        let ctx = ChatContext {
            selected: crate::domain::symbol::lookup("AAPL"),
            quote: Some(&quote),
        };
        let mut s = session(1.0);
        let pending = s.handle_message("should I buy?", &ctx).unwrap();
        assert_eq!(pending.reply.kind, RuleKind::Advice);
        assert!(s.reply_delivered().unwrap().is_some());
    }

    #[test]
    fn non_buy_reply_never_opens_quiz() {
        let mut s = session(1.0);
        s.handle_message("sell", &ChatContext::default()).unwrap();
        assert_eq!(s.reply_delivered().unwrap(), None);
    }

    #[test]
    fn quiz_rate_is_roughly_thirty_percent() {
        let mut s = session(0.3);
        let mut shown = 0;
        let n = 2000;
        for _ in 0..n {
            s.handle_message("buy", &ChatContext::default()).unwrap();
            if s.reply_delivered().unwrap().is_some() {
                shown += 1;
                s.submit_answer(Some(0)).unwrap();
            }
        }
        let rate = shown as f64 / n as f64;
        assert!((0.25..0.35).contains(&rate), "rate={rate}");
    }

    #[test]
    fn grading_uses_answer_key() {
        let mut s = session(1.0);
        s.handle_message("buy", &ChatContext::default()).unwrap();
        let q = s.reply_delivered().unwrap().unwrap();

        let wrong = (q.correct_answer + 1) % q.options.len();
        let feedback = s.submit_answer(Some(wrong)).unwrap();
        assert_eq!(
            feedback,
            QuizFeedback::Incorrect {
                correct_answer: q.correct_option()
            }
        );
        assert_eq!(s.score(), 0);
        assert_eq!(s.state(), &ChatState::Idle);

        s.handle_message("buy", &ChatContext::default()).unwrap();
        let q = s.reply_delivered().unwrap().unwrap();
        let feedback = s.submit_answer(Some(q.correct_answer)).unwrap();
        assert!(feedback.is_correct());
        assert_eq!(s.score(), POINTS_PER_CORRECT_ANSWER);
    }

    #[test]
    fn missing_selection_keeps_quiz_open() {
        let mut s = session(1.0);
        s.handle_message("buy", &ChatContext::default()).unwrap();
        s.reply_delivered().unwrap().unwrap();

        assert_eq!(s.submit_answer(None), Err(ChatError::NoOptionSelected));
        assert!(matches!(s.state(), ChatState::QuizShown { .. }));
        assert!(matches!(
            s.submit_answer(Some(9)),
            Err(ChatError::InvalidOption { index: 9, options: 4 })
        ));
        assert!(matches!(s.state(), ChatState::QuizShown { .. }));
    }

    #[test]
    fn answering_without_quiz_is_rejected() {
        let mut s = session(0.0);
        assert_eq!(s.submit_answer(Some(1)), Err(ChatError::NoActiveQuiz));
        assert_eq!(s.reply_delivered(), Err(ChatError::NothingToAnswer));
    }

    #[test]
    fn typing_dismisses_open_quiz() {
        let mut s = session(1.0);
        s.handle_message("buy", &ChatContext::default()).unwrap();
        s.reply_delivered().unwrap().unwrap();
        s.handle_message("how is the prediction made", &ChatContext::default())
            .unwrap();
        assert!(matches!(s.state(), ChatState::BotResponding { .. }));
    }
}
