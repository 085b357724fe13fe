//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use ama::{Ama, AmaConfig, AnswerDraft, CreatedSession, Question, Token, VoterId};
use ama_store::MemoryStore;

/// A service over a fresh memory store with one published session.
pub struct TestFixture {
    pub ama: Ama<MemoryStore>,
    pub session: CreatedSession,
}

impl TestFixture {
    /// Create a fixture whose session is already published.
    pub async fn published() -> Self {
        let fixture = Self::draft().await;
        fixture
            .ama
            .publish(fixture.host())
            .await
            .expect("publish fixture session");
        fixture
    }

    /// Create a fixture whose session is still a draft.
    pub async fn draft() -> Self {
        let ama = Ama::new(MemoryStore::new(), AmaConfig::default());
        let session = ama
            .create_session("Fixture session", None)
            .await
            .expect("create fixture session");
        Self { ama, session }
    }

    pub fn host(&self) -> &Token {
        &self.session.host_token
    }

    pub fn ask(&self) -> &Token {
        &self.session.ask_token
    }

    pub fn answer(&self) -> &Token {
        &self.session.answer_token
    }

    pub fn digest(&self) -> &Token {
        &self.session.digest_token
    }

    /// Submit a question with the ask token.
    pub async fn ask_question(&self, text: &str) -> Question {
        self.ama
            .create_question(self.ask(), text)
            .await
            .expect("create question")
    }

    /// Cast `count` votes on `question`, each from a distinct voter.
    pub async fn upvote(&self, question: &Question, count: usize) {
        for voter in voters(count) {
            self.ama
                .cast_vote(&question.id, self.ask(), &voter)
                .await
                .expect("cast vote");
        }
    }

    /// A complete, valid answer draft.
    pub fn draft_answer() -> AnswerDraft {
        AnswerDraft::new("core point", "step one, step two", "only tested locally")
    }
}

/// `count` distinct voter ids from the benchmarking address range.
pub fn voters(count: usize) -> Vec<VoterId> {
    (0..count)
        .map(|i| VoterId::new(format!("198.18.{}.{}", i / 256, i % 256)))
        .collect()
}
