//! Persisted records: sessions, questions, answers.
//!
//! Records are plain data. The rules about who may create or change them live
//! in the service layer; the rules about what they may contain live in
//! [`validation`](crate::validation).

use serde::Serialize;

use crate::types::{AnswerId, QuestionId, SessionId, Token};
use crate::validation::AnswerDraft;

/// The four capability tokens of a session.
///
/// Generated once at creation and never changed afterwards. Each role has a
/// fixed field; a token is never reinterpreted as a different role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub host: Token,
    pub ask: Token,
    pub answer: Token,
    pub digest: Token,
}

impl SessionTokens {
    /// All four tokens, in role order (host, ask, answer, digest).
    pub fn all(&self) -> [&Token; 4] {
        [&self.host, &self.ask, &self.answer, &self.digest]
    }

    /// Whether the four tokens are pairwise distinct.
    pub fn are_distinct(&self) -> bool {
        let all = self.all();
        all.iter()
            .enumerate()
            .all(|(i, a)| all[i + 1..].iter().all(|b| a != b))
    }
}

/// A Q&A session ("AMA").
///
/// Deliberately not `Serialize`: the tokens must only leave the process
/// through views that decide which of them the caller may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub title: String,
    pub description: Option<String>,
    pub published: bool,
    pub created_at: i64,
    pub tokens: SessionTokens,
}

impl Session {
    /// A fresh, unpublished session.
    pub fn new(
        title: String,
        description: Option<String>,
        tokens: SessionTokens,
        created_at: i64,
    ) -> Self {
        Self {
            id: SessionId::random(),
            title,
            description,
            published: false,
            created_at,
            tokens,
        }
    }
}

/// An audience question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub session_id: SessionId,
    pub text: String,
    /// Always equal to the number of distinct voters recorded for this question.
    pub vote_count: u32,
    #[serde(rename = "isHidden")]
    pub hidden: bool,
    pub created_at: i64,
}

impl Question {
    pub fn new(session_id: SessionId, text: String, created_at: i64) -> Self {
        Self {
            id: QuestionId::random(),
            session_id,
            text,
            vote_count: 0,
            hidden: false,
            created_at,
        }
    }
}

/// The answer to a question. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: QuestionId,
    /// The main point.
    pub core: String,
    /// The process.
    pub steps: String,
    /// The limitations.
    pub limits: String,
    pub created_at: i64,
}

impl Answer {
    /// Build an answer from an already-normalized draft.
    pub fn new(question_id: QuestionId, draft: AnswerDraft, created_at: i64) -> Self {
        Self {
            id: AnswerId::random(),
            question_id,
            core: draft.core,
            steps: draft.steps,
            limits: draft.limits,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(host: &str, ask: &str, answer: &str, digest: &str) -> SessionTokens {
        SessionTokens {
            host: Token::from(host),
            ask: Token::from(ask),
            answer: Token::from(answer),
            digest: Token::from(digest),
        }
    }

    #[test]
    fn test_tokens_distinct() {
        assert!(tokens("a", "b", "c", "d").are_distinct());
        assert!(!tokens("a", "b", "a", "d").are_distinct());
        assert!(!tokens("a", "b", "c", "c").are_distinct());
    }

    #[test]
    fn test_new_session_is_draft() {
        let session = Session::new("Topic".into(), None, tokens("a", "b", "c", "d"), 1000);
        assert!(!session.published);
        assert_eq!(session.created_at, 1000);
    }

    #[test]
    fn test_new_question_defaults() {
        let question = Question::new(SessionId::random(), "Why?".into(), 1000);
        assert_eq!(question.vote_count, 0);
        assert!(!question.hidden);
    }

    #[test]
    fn test_question_json_is_camel_case() {
        let question = Question::new(SessionId::from_bytes([0; 16]), "Why?".into(), 5);
        let json = serde_json::to_value(&question).unwrap();
        assert_eq!(json["voteCount"], 0);
        assert_eq!(json["isHidden"], false);
        assert_eq!(json["sessionId"], "00".repeat(16));
    }
}
