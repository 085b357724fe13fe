//! Store trait: the abstract interface for AMA persistence.
//!
//! This trait keeps the service storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use ama_core::{Answer, Question, QuestionId, Session, SessionId, Token, VoterId};

use crate::error::Result;

/// Result of publishing a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishResult {
    /// The session moved from draft to published.
    Published,
    /// The session was already published; nothing changed.
    AlreadyPublished,
    /// No session with this id.
    NotFound,
}

/// Result of editing a draft session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// The fields were written; carries the session as stored.
    Updated(Session),
    /// The session is published and can no longer be edited.
    AlreadyPublished,
    /// No session with this id.
    NotFound,
}

/// Result of recording a vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteResult {
    /// The voter was added; carries the new vote count.
    Recorded { vote_count: u32 },
    /// The voter had already voted on this question; nothing changed.
    AlreadyVoted,
    /// No question with this id.
    QuestionNotFound,
}

/// Result of inserting an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerInsertResult {
    /// The answer was stored.
    Inserted,
    /// The question already has an answer; nothing changed.
    AlreadyAnswered,
}

/// The Store trait: async interface for AMA persistence.
///
/// # Design Notes
///
/// - **Conditional writes**: publish, draft edits, votes and answers report
///   their outcome through a result enum. The check and the write happen in
///   one atomic step inside the store, so two concurrent callers can never
///   both succeed.
/// - **Vote consistency**: a question's `vote_count` always equals the size
///   of its voter set.
/// - **No deletes**: records are never removed.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Session Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new session.
    async fn insert_session(&self, session: &Session) -> Result<()>;

    /// Get a session by id.
    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>>;

    /// Find the session holding `token` in any of its four role fields.
    async fn find_session_by_token(&self, token: &Token) -> Result<Option<Session>>;

    /// Mark a session published if it is still a draft.
    async fn publish_session(&self, id: &SessionId) -> Result<PublishResult>;

    /// Overwrite the given fields if the session is still a draft.
    ///
    /// `None` leaves the stored value untouched.
    async fn update_session_details(
        &self,
        id: &SessionId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<UpdateResult>;

    // ─────────────────────────────────────────────────────────────────────────
    // Question Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new question.
    async fn insert_question(&self, question: &Question) -> Result<()>;

    /// Get a question by id.
    async fn get_question(&self, id: &QuestionId) -> Result<Option<Question>>;

    /// Set the hidden flag. Returns the updated question, `None` if absent.
    async fn set_question_hidden(&self, id: &QuestionId, hidden: bool)
        -> Result<Option<Question>>;

    /// All questions of a session, most votes first, then in creation order.
    async fn list_questions(&self, session_id: &SessionId) -> Result<Vec<Question>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Vote Ledger
    // ─────────────────────────────────────────────────────────────────────────

    /// Add `voter` to the question's voter set and bump its vote count.
    async fn record_vote(&self, question_id: &QuestionId, voter: &VoterId) -> Result<VoteResult>;

    /// Whether `voter` has already voted on the question.
    async fn has_voted(&self, question_id: &QuestionId, voter: &VoterId) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Answer Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Store an answer unless its question already has one.
    async fn insert_answer(&self, answer: &Answer) -> Result<AnswerInsertResult>;

    /// Get the answer of a question.
    async fn get_answer(&self, question_id: &QuestionId) -> Result<Option<Answer>>;

    /// All answers to questions of a session.
    async fn list_answers(&self, session_id: &SessionId) -> Result<Vec<Answer>>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Load a question together with the session that owns it.
    fn question_with_session(
        &self,
        question_id: &QuestionId,
    ) -> impl std::future::Future<Output = Result<Option<(Question, Session)>>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn question_with_session(
        &self,
        question_id: &QuestionId,
    ) -> Result<Option<(Question, Session)>> {
        let Some(question) = self.get_question(question_id).await? else {
            return Ok(None);
        };

        // Questions reference their session, so a miss here means the rows
        // were written outside this store.
        let session = self.get_session(&question.session_id).await?.ok_or_else(|| {
            crate::error::StoreError::InvalidData(format!(
                "question {} references missing session {}",
                question.id, question.session_id
            ))
        })?;

        Ok(Some((question, session)))
    }
}
