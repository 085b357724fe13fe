//! Read models returned by the service.
//!
//! Views are what leaves the service. They never carry voter identifiers, and
//! only the host view carries share tokens.

use serde::{Deserialize, Serialize};

use ama_core::{Answer, Question, QuestionId, Session, SessionId, Token};
use ama_perms::{Capability, Permissions};

/// A freshly created session together with all four of its tokens.
///
/// Returned exactly once, to the creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSession {
    pub id: SessionId,
    pub title: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub created_at: i64,
    pub host_token: Token,
    pub ask_token: Token,
    pub answer_token: Token,
    pub digest_token: Token,
}

impl From<Session> for CreatedSession {
    fn from(session: Session) -> Self {
        let tokens = session.tokens;
        Self {
            id: session.id,
            title: session.title,
            description: session.description,
            is_published: session.published,
            created_at: session.created_at,
            host_token: tokens.host,
            ask_token: tokens.ask,
            answer_token: tokens.answer,
            digest_token: tokens.digest,
        }
    }
}

/// Links the host hands out to the other roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareTokens {
    pub ask_token: Token,
    pub answer_token: Token,
    pub digest_token: Token,
}

/// A question as seen by a token holder, with its answer if there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    #[serde(flatten)]
    pub question: Question,
    pub answer: Option<Answer>,
}

/// A session as seen through one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: SessionId,
    pub title: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub created_at: i64,
    pub capability: Capability,
    pub permissions: Permissions,
    pub questions: Vec<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<ShareTokens>,
}

impl SessionView {
    pub(crate) fn new(session: Session, capability: Capability, questions: Vec<QuestionView>) -> Self {
        let tokens = capability.sees_tokens().then(|| ShareTokens {
            ask_token: session.tokens.ask.clone(),
            answer_token: session.tokens.answer.clone(),
            digest_token: session.tokens.digest.clone(),
        });

        Self {
            id: session.id,
            title: session.title,
            description: session.description,
            is_published: session.published,
            created_at: session.created_at,
            capability,
            permissions: capability.permissions(),
            questions,
            tokens,
        }
    }
}

/// Outcome of a successful vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub question_id: QuestionId,
    pub vote_count: u32,
    /// Always true on a receipt; the caller's vote is now counted.
    pub has_voted: bool,
}

/// Draft edits. Absent or blank fields leave the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}
