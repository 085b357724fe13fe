//! Error types for AMA Core.

use std::fmt;

use thiserror::Error;

/// Errors raised while decoding core values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

/// One of the three required answer sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerField {
    Core,
    Steps,
    Limits,
}

impl fmt::Display for AnswerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnswerField::Core => "core",
            AnswerField::Steps => "steps",
            AnswerField::Limits => "limits",
        };
        f.write_str(name)
    }
}

/// Malformed or out-of-range user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title is required")]
    EmptyTitle,

    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },

    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },

    #[error("question must be between 1 and {max} characters")]
    QuestionLength { max: usize },

    #[error("answer field `{0}` is required")]
    EmptyAnswerField(AnswerField),
}
