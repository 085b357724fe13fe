//! Input validation: trimming and length rules for user-supplied text.
//!
//! Lengths are counted in Unicode scalar values after trimming leading and
//! trailing whitespace.

use serde::{Deserialize, Serialize};

use crate::error::{AnswerField, ValidationError};

/// Maximum title length.
pub const MAX_TITLE_CHARS: usize = 100;

/// Maximum description length.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Maximum question length.
pub const MAX_QUESTION_CHARS: usize = 140;

/// Length limits applied to user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_title_chars: usize,
    pub max_description_chars: usize,
    pub max_question_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_title_chars: MAX_TITLE_CHARS,
            max_description_chars: MAX_DESCRIPTION_CHARS,
            max_question_chars: MAX_QUESTION_CHARS,
        }
    }
}

/// Trim a session title and check it is present and short enough.
pub fn normalize_title(raw: &str, max: usize) -> Result<String, ValidationError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if title.chars().count() > max {
        return Err(ValidationError::TitleTooLong { max });
    }
    Ok(title.to_owned())
}

/// Trim an optional description. Blank descriptions become `None`.
pub fn normalize_description(
    raw: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    let Some(description) = raw.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    if description.chars().count() > max {
        return Err(ValidationError::DescriptionTooLong { max });
    }
    Ok(Some(description.to_owned()))
}

/// Trim question text and check it holds between 1 and `max` characters.
pub fn normalize_question_text(raw: &str, max: usize) -> Result<String, ValidationError> {
    let text = raw.trim();
    let len = text.chars().count();
    if len == 0 || len > max {
        return Err(ValidationError::QuestionLength { max });
    }
    Ok(text.to_owned())
}

/// The three sections of an answer as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerDraft {
    pub core: String,
    pub steps: String,
    pub limits: String,
}

impl AnswerDraft {
    pub fn new(
        core: impl Into<String>,
        steps: impl Into<String>,
        limits: impl Into<String>,
    ) -> Self {
        Self {
            core: core.into(),
            steps: steps.into(),
            limits: limits.into(),
        }
    }

    /// Trim every section; each must be non-empty afterwards.
    pub fn normalize(self) -> Result<Self, ValidationError> {
        Ok(Self {
            core: required(&self.core, AnswerField::Core)?,
            steps: required(&self.steps, AnswerField::Steps)?,
            limits: required(&self.limits, AnswerField::Limits)?,
        })
    }
}

fn required(raw: &str, field: AnswerField) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::EmptyAnswerField(field));
    }
    Ok(value.to_owned())
}
