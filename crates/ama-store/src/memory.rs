//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use ama_core::{Answer, Question, QuestionId, Session, SessionId, Token, VoterId};

use crate::error::{Result, StoreError};
use crate::traits::{AnswerInsertResult, PublishResult, Store, UpdateResult, VoteResult};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock; every
/// conditional write runs under a single write guard.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Sessions indexed by ID.
    sessions: HashMap<SessionId, Session>,

    /// Questions indexed by ID.
    questions: HashMap<QuestionId, StoredQuestion>,

    /// Answers indexed by the question they answer.
    answers: HashMap<QuestionId, Answer>,

    /// Insertion counter used as the final ordering tie-breaker.
    next_seq: u64,
}

struct StoredQuestion {
    question: Question,
    voters: BTreeSet<VoterId>,
    seq: u64,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_session(&self, session: &Session) -> Result<()> {
        let mut inner = self.write()?;
        if inner.sessions.contains_key(&session.id) {
            return Err(StoreError::InvalidData(format!(
                "session {} already exists",
                session.id
            )));
        }
        inner.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
        Ok(self.read()?.sessions.get(id).cloned())
    }

    async fn find_session_by_token(&self, token: &Token) -> Result<Option<Session>> {
        let inner = self.read()?;
        Ok(inner
            .sessions
            .values()
            .find(|s| s.tokens.all().contains(&token))
            .cloned())
    }

    async fn publish_session(&self, id: &SessionId) -> Result<PublishResult> {
        let mut inner = self.write()?;
        Ok(match inner.sessions.get_mut(id) {
            None => PublishResult::NotFound,
            Some(session) if session.published => PublishResult::AlreadyPublished,
            Some(session) => {
                session.published = true;
                PublishResult::Published
            }
        })
    }

    async fn update_session_details(
        &self,
        id: &SessionId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<UpdateResult> {
        let mut inner = self.write()?;
        Ok(match inner.sessions.get_mut(id) {
            None => UpdateResult::NotFound,
            Some(session) if session.published => UpdateResult::AlreadyPublished,
            Some(session) => {
                if let Some(title) = title {
                    session.title = title.to_owned();
                }
                if let Some(description) = description {
                    session.description = Some(description.to_owned());
                }
                UpdateResult::Updated(session.clone())
            }
        })
    }

    async fn insert_question(&self, question: &Question) -> Result<()> {
        let mut inner = self.write()?;
        if !inner.sessions.contains_key(&question.session_id) {
            return Err(StoreError::InvalidData(format!(
                "question {} references missing session {}",
                question.id, question.session_id
            )));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.questions.insert(
            question.id,
            StoredQuestion {
                question: question.clone(),
                voters: BTreeSet::new(),
                seq,
            },
        );
        Ok(())
    }

    async fn get_question(&self, id: &QuestionId) -> Result<Option<Question>> {
        Ok(self.read()?.questions.get(id).map(|sq| sq.question.clone()))
    }

    async fn set_question_hidden(
        &self,
        id: &QuestionId,
        hidden: bool,
    ) -> Result<Option<Question>> {
        let mut inner = self.write()?;
        Ok(inner.questions.get_mut(id).map(|sq| {
            sq.question.hidden = hidden;
            sq.question.clone()
        }))
    }

    async fn list_questions(&self, session_id: &SessionId) -> Result<Vec<Question>> {
        let inner = self.read()?;

        let mut stored: Vec<&StoredQuestion> = inner
            .questions
            .values()
            .filter(|sq| sq.question.session_id == *session_id)
            .collect();

        stored.sort_by_key(|sq| (Reverse(sq.question.vote_count), sq.question.created_at, sq.seq));
        Ok(stored.into_iter().map(|sq| sq.question.clone()).collect())
    }

    async fn record_vote(&self, question_id: &QuestionId, voter: &VoterId) -> Result<VoteResult> {
        let mut inner = self.write()?;

        let Some(sq) = inner.questions.get_mut(question_id) else {
            return Ok(VoteResult::QuestionNotFound);
        };

        if !sq.voters.insert(voter.clone()) {
            return Ok(VoteResult::AlreadyVoted);
        }

        sq.question.vote_count += 1;
        Ok(VoteResult::Recorded {
            vote_count: sq.question.vote_count,
        })
    }

    async fn has_voted(&self, question_id: &QuestionId, voter: &VoterId) -> Result<bool> {
        Ok(self
            .read()?
            .questions
            .get(question_id)
            .is_some_and(|sq| sq.voters.contains(voter)))
    }

    async fn insert_answer(&self, answer: &Answer) -> Result<AnswerInsertResult> {
        let mut inner = self.write()?;

        if !inner.questions.contains_key(&answer.question_id) {
            return Err(StoreError::InvalidData(format!(
                "answer {} references missing question {}",
                answer.id, answer.question_id
            )));
        }
        if inner.answers.contains_key(&answer.question_id) {
            return Ok(AnswerInsertResult::AlreadyAnswered);
        }

        inner.answers.insert(answer.question_id, answer.clone());
        Ok(AnswerInsertResult::Inserted)
    }

    async fn get_answer(&self, question_id: &QuestionId) -> Result<Option<Answer>> {
        Ok(self.read()?.answers.get(question_id).cloned())
    }

    async fn list_answers(&self, session_id: &SessionId) -> Result<Vec<Answer>> {
        let inner = self.read()?;

        let mut answers: Vec<Answer> = inner
            .answers
            .values()
            .filter(|a| {
                inner
                    .questions
                    .get(&a.question_id)
                    .is_some_and(|sq| sq.question.session_id == *session_id)
            })
            .cloned()
            .collect();

        answers.sort_by_key(|a| a.created_at);
        Ok(answers)
    }
}
