//! # AMA Core
//!
//! Pure records for the AMA platform: sessions, questions, answers, and the
//! input rules that guard them.
//!
//! This crate contains no I/O, no storage, no networking. Persistence lives in
//! `ama-store`, capability checks in `ama-perms`.
//!
//! ## Key Types
//!
//! - [`Session`] - One Q&A event with its four capability tokens
//! - [`Question`] - An audience question with a vote count and hidden flag
//! - [`Answer`] - The single, immutable answer to a question
//! - [`Token`] - An unguessable capability string embedded in a share link
//! - [`VoterId`] - The network-address heuristic used to deduplicate votes
//!
//! ## Lifecycle
//!
//! ```text
//! Session:  Draft ──publish──> Published      (one way)
//! Question: Unanswered ──answer──> Answered   (one way)
//! ```

pub mod error;
pub mod record;
pub mod types;
pub mod validation;
pub mod voter;

pub use error::{AnswerField, CoreError, ValidationError};
pub use record::{Answer, Question, Session, SessionTokens};
pub use types::{now_millis, AnswerId, QuestionId, SessionId, Token};
pub use validation::{
    normalize_description, normalize_question_text, normalize_title, AnswerDraft, Limits,
    MAX_DESCRIPTION_CHARS, MAX_QUESTION_CHARS, MAX_TITLE_CHARS,
};
pub use voter::{VoterId, FALLBACK_VOTER_ID};
