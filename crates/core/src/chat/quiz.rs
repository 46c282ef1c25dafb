use serde::Serialize;

pub const POINTS_PER_CORRECT_ANSWER: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
    pub question: &'static str,
    pub options: [&'static str; 4],
    #[serde(skip)]
    pub correct_answer: usize,
}

impl QuizQuestion {
    pub fn is_correct(&self, answer: usize) -> bool {
        answer == self.correct_answer
    }

    pub fn correct_option(&self) -> &'static str {
        self.options[self.correct_answer]
    }
}

pub const QUESTIONS: [QuizQuestion; 4] = [
    QuizQuestion {
        question: "What had the highest impact on this stock's 'Buy' recommendation?",
        options: [
            "Market sentiment",
            "Recent earnings report",
            "Trading volume",
            "Technical indicators",
        ],
        correct_answer: 1,
    },
    QuizQuestion {
        question: "Which model is used for the price predictions?",
        options: [
            "Random Forest",
            "LSTM neural network",
            "Linear Regression",
            "Moving Average",
        ],
        correct_answer: 1,
    },
    QuizQuestion {
        question: "What does a high confidence score mean?",
        options: [
            "The stock will definitely increase",
            "Historical predictions were accurate",
            "Many analysts agree",
            "The model is certain",
        ],
        correct_answer: 1,
    },
    QuizQuestion {
        question: "What data is used to train the prediction model?",
        options: [
            "Only price data",
            "Price, volume and technical indicators",
            "News headlines",
            "Social media sentiment",
        ],
        correct_answer: 1,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum QuizFeedback {
    Correct { points: u32 },
    Incorrect { correct_answer: &'static str },
}

impl QuizFeedback {
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Self::Correct { points } => format!(
                "Correct! You've earned {points} points. Your understanding of our prediction model is improving."
            ),
            Self::Incorrect { correct_answer } => {
                format!("Not quite. The correct answer is: {correct_answer}. Keep learning!")
            }
        }
    }
}
