use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    EmptyMessage,
    Busy,
    NothingToAnswer,
    NoActiveQuiz,
    NoOptionSelected,
    InvalidOption { index: usize, options: usize },
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMessage => f.write_str("message is empty"),
            Self::Busy => f.write_str("a reply is still being prepared"),
            Self::NothingToAnswer => f.write_str("no message is waiting for a reply"),
            Self::NoActiveQuiz => f.write_str("no quiz is open"),
            Self::NoOptionSelected => f.write_str("Please select an answer"),
            Self::InvalidOption { index, options } => {
                write!(f, "answer {index} is out of range (quiz has {options} options)")
            }
        }
    }
}

impl std::error::Error for ChatError {}
