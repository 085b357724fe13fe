//! The AMA service: every operation a token holder can perform.
//!
//! Each operation runs its checks in a fixed order: resolve the token and
//! authorize the role, check the publication state, validate input, then
//! issue a single conditional write. Uniqueness of votes and answers is
//! enforced by the store, not here.

use std::collections::HashMap;
use std::sync::Arc;

use ama_core::{
    normalize_description, normalize_question_text, normalize_title, now_millis, Answer,
    AnswerDraft, Question, QuestionId, Session, Token, VoterId,
};
use ama_perms::{issue_session_tokens, require, resolve, Capability};
use ama_store::{AnswerInsertResult, PublishResult, Store, StoreExt, UpdateResult, VoteResult};

use crate::config::AmaConfig;
use crate::error::{AmaError, ConflictError, Result, StateError};
use crate::view::{CreatedSession, QuestionView, SessionUpdate, SessionView, VoteReceipt};

/// The AMA service.
///
/// Stateless apart from the store handle; clones share the same store.
pub struct Ama<S: Store> {
    store: Arc<S>,
    config: AmaConfig,
}

impl<S: Store> Clone for Ama<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: Store> Ama<S> {
    /// Create a new service over `store`.
    pub fn new(store: S, config: AmaConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &AmaConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a draft session and issue its four tokens.
    pub async fn create_session(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<CreatedSession> {
        let limits = &self.config.limits;
        let title = normalize_title(title, limits.max_title_chars)?;
        let description = normalize_description(description, limits.max_description_chars)?;

        let session = Session::new(title, description, issue_session_tokens(), now_millis());
        self.store.insert_session(&session).await?;

        tracing::info!(session_id = %session.id, "session created");
        Ok(CreatedSession::from(session))
    }

    /// Publish a draft session. Publishing twice is an error.
    pub async fn publish(&self, host_token: &Token) -> Result<Session> {
        let mut session = self.authorize_session(host_token, Capability::Host).await?;
        if session.published {
            return Err(StateError::AlreadyPublished.into());
        }

        match self.store.publish_session(&session.id).await? {
            PublishResult::Published => {
                session.published = true;
                tracing::info!(session_id = %session.id, "session published");
                Ok(session)
            }
            PublishResult::AlreadyPublished => Err(StateError::AlreadyPublished.into()),
            PublishResult::NotFound => Err(AmaError::NotFound),
        }
    }

    /// Edit the title and description of a draft session.
    pub async fn update_session(&self, host_token: &Token, update: SessionUpdate) -> Result<Session> {
        let session = self.authorize_session(host_token, Capability::Host).await?;
        if session.published {
            return Err(StateError::AlreadyPublished.into());
        }

        let limits = &self.config.limits;
        let title = update
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(|t| normalize_title(t, limits.max_title_chars))
            .transpose()?;
        let description =
            normalize_description(update.description.as_deref(), limits.max_description_chars)?;

        match self
            .store
            .update_session_details(&session.id, title.as_deref(), description.as_deref())
            .await?
        {
            UpdateResult::Updated(session) => {
                tracing::debug!(session_id = %session.id, "session details updated");
                Ok(session)
            }
            UpdateResult::AlreadyPublished => Err(StateError::AlreadyPublished.into()),
            UpdateResult::NotFound => Err(AmaError::NotFound),
        }
    }

    /// The session as seen through `token`, with the questions that role may see.
    pub async fn view_session(&self, token: &Token) -> Result<SessionView> {
        let (session, capability) = self.resolve_session(token).await?;
        let questions = self.question_views(&session, capability).await?;
        Ok(SessionView::new(session, capability, questions))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Question Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Submit a question to a published session.
    pub async fn create_question(&self, ask_token: &Token, text: &str) -> Result<Question> {
        let session = self.authorize_session(ask_token, Capability::Ask).await?;
        if !session.published {
            return Err(StateError::NotPublished.into());
        }

        let text = normalize_question_text(text, self.config.limits.max_question_chars)?;
        let question = Question::new(session.id, text, now_millis());
        self.store.insert_question(&question).await?;

        tracing::debug!(session_id = %session.id, question_id = %question.id, "question created");
        Ok(question)
    }

    /// Hide or show a question. Repeatable in both directions.
    pub async fn set_question_visibility(
        &self,
        question_id: &QuestionId,
        host_token: &Token,
        hidden: bool,
    ) -> Result<Question> {
        let (_, session) = self.question_and_session(question_id).await?;
        require(&session.tokens, host_token, Capability::Host)?;

        let question = self
            .store
            .set_question_hidden(question_id, hidden)
            .await?
            .ok_or(AmaError::NotFound)?;

        tracing::info!(question_id = %question.id, hidden, "question visibility changed");
        Ok(question)
    }

    /// Questions of the session `token` belongs to, most votes first.
    ///
    /// Ask and digest holders do not see hidden questions.
    pub async fn list_questions(&self, token: &Token) -> Result<Vec<QuestionView>> {
        let (session, capability) = self.resolve_session(token).await?;
        self.question_views(&session, capability).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Votes
    // ─────────────────────────────────────────────────────────────────────────

    /// Record one vote from `voter`. A second vote from the same voter conflicts.
    pub async fn cast_vote(
        &self,
        question_id: &QuestionId,
        ask_token: &Token,
        voter: &VoterId,
    ) -> Result<VoteReceipt> {
        let (_, session) = self.question_and_session(question_id).await?;
        require(&session.tokens, ask_token, Capability::Ask)?;
        if !session.published {
            return Err(StateError::NotPublished.into());
        }

        match self.store.record_vote(question_id, voter).await? {
            VoteResult::Recorded { vote_count } => {
                tracing::debug!(%question_id, vote_count, "vote recorded");
                Ok(VoteReceipt {
                    question_id: *question_id,
                    vote_count,
                    has_voted: true,
                })
            }
            VoteResult::AlreadyVoted => {
                tracing::debug!(%question_id, "duplicate vote rejected");
                Err(ConflictError::AlreadyVoted.into())
            }
            VoteResult::QuestionNotFound => Err(AmaError::NotFound),
        }
    }

    /// Whether `voter` has already voted on the question.
    pub async fn has_voted(
        &self,
        question_id: &QuestionId,
        ask_token: &Token,
        voter: &VoterId,
    ) -> Result<bool> {
        let (_, session) = self.question_and_session(question_id).await?;
        require(&session.tokens, ask_token, Capability::Ask)?;
        Ok(self.store.has_voted(question_id, voter).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Answers
    // ─────────────────────────────────────────────────────────────────────────

    /// Answer a question. Each question takes exactly one answer, ever.
    pub async fn submit_answer(
        &self,
        question_id: &QuestionId,
        answer_token: &Token,
        draft: AnswerDraft,
    ) -> Result<Answer> {
        let (_, session) = self.question_and_session(question_id).await?;
        require(&session.tokens, answer_token, Capability::Answer)?;
        if !session.published {
            return Err(StateError::NotPublished.into());
        }

        let answer = Answer::new(*question_id, draft.normalize()?, now_millis());
        match self.store.insert_answer(&answer).await? {
            AnswerInsertResult::Inserted => {
                tracing::info!(%question_id, answer_id = %answer.id, "answer submitted");
                Ok(answer)
            }
            AnswerInsertResult::AlreadyAnswered => Err(ConflictError::AlreadyAnswered.into()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    /// Find the session holding `token` and the role it grants.
    async fn resolve_session(&self, token: &Token) -> Result<(Session, Capability)> {
        let session = self
            .store
            .find_session_by_token(token)
            .await?
            .ok_or(AmaError::NotFound)?;
        let capability = resolve(&session.tokens, token).ok_or(AmaError::NotFound)?;
        Ok((session, capability))
    }

    /// Find the session holding `token` and require the token to carry `required`.
    async fn authorize_session(&self, token: &Token, required: Capability) -> Result<Session> {
        let session = self
            .store
            .find_session_by_token(token)
            .await?
            .ok_or(AmaError::NotFound)?;
        require(&session.tokens, token, required)?;
        Ok(session)
    }

    async fn question_and_session(&self, question_id: &QuestionId) -> Result<(Question, Session)> {
        self.store
            .question_with_session(question_id)
            .await?
            .ok_or(AmaError::NotFound)
    }

    async fn question_views(
        &self,
        session: &Session,
        capability: Capability,
    ) -> Result<Vec<QuestionView>> {
        let questions = self.store.list_questions(&session.id).await?;
        let mut answers: HashMap<QuestionId, Answer> = self
            .store
            .list_answers(&session.id)
            .await?
            .into_iter()
            .map(|a| (a.question_id, a))
            .collect();

        Ok(questions
            .into_iter()
            .filter(|q| capability.sees_hidden() || !q.hidden)
            .map(|question| {
                let answer = answers.remove(&question.id);
                QuestionView { question, answer }
            })
            .collect())
    }
}
