//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.
//!
//! Uniqueness is enforced by the schema, not by application locks: the vote
//! ledger has a `(question_id, voter_id)` primary key and `answers.question_id`
//! is `UNIQUE`. Several processes may share one database file.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::debug;

use ama_core::{
    now_millis, Answer, AnswerId, Question, QuestionId, Session, SessionId, SessionTokens,
    Token, VoterId,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{AnswerInsertResult, PublishResult, Store, UpdateResult, VoteResult};

/// How long a writer waits on a database locked by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SESSION_COLUMNS: &str = "session_id, title, description, published, created_at,
     host_token, ask_token, answer_token, digest_token";

const QUESTION_COLUMNS: &str = "question_id, session_id, text, vote_count, hidden, created_at";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Clone)]
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file (and missing parent directories) and runs migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        Self::init(Connection::open(path)?)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking thread pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::TaskJoin(e.to_string()))?
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row helpers
// ─────────────────────────────────────────────────────────────────────────────

fn id_bytes(row: &rusqlite::Row<'_>, idx: usize, name: &str) -> rusqlite::Result<[u8; 16]> {
    let bytes: Vec<u8> = row.get(idx)?;
    bytes.try_into().map_err(|_| {
        rusqlite::Error::InvalidColumnType(idx, name.into(), rusqlite::types::Type::Blob)
    })
}

fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: SessionId::from_bytes(id_bytes(row, 0, "session_id")?),
        title: row.get(1)?,
        description: row.get(2)?,
        published: row.get(3)?,
        created_at: row.get(4)?,
        tokens: SessionTokens {
            host: Token::new(row.get::<_, String>(5)?),
            ask: Token::new(row.get::<_, String>(6)?),
            answer: Token::new(row.get::<_, String>(7)?),
            digest: Token::new(row.get::<_, String>(8)?),
        },
    })
}

fn row_to_question(row: &rusqlite::Row<'_>) -> rusqlite::Result<Question> {
    Ok(Question {
        id: QuestionId::from_bytes(id_bytes(row, 0, "question_id")?),
        session_id: SessionId::from_bytes(id_bytes(row, 1, "session_id")?),
        text: row.get(2)?,
        vote_count: row.get(3)?,
        hidden: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn row_to_answer(row: &rusqlite::Row<'_>) -> rusqlite::Result<Answer> {
    Ok(Answer {
        id: AnswerId::from_bytes(id_bytes(row, 0, "answer_id")?),
        question_id: QuestionId::from_bytes(id_bytes(row, 1, "question_id")?),
        core: row.get(2)?,
        steps: row.get(3)?,
        limits: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn load_session(conn: &Connection, id: &SessionId) -> Result<Option<Session>> {
    conn.query_row(
        &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?1"),
        params![id.as_bytes().as_slice()],
        row_to_session,
    )
    .optional()
    .map_err(StoreError::from)
}

fn load_question(conn: &Connection, id: &QuestionId) -> Result<Option<Question>> {
    conn.query_row(
        &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE question_id = ?1"),
        params![id.as_bytes().as_slice()],
        row_to_question,
    )
    .optional()
    .map_err(StoreError::from)
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_session(&self, session: &Session) -> Result<()> {
        let session = session.clone();

        self.with_conn(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO sessions ({SESSION_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params![
                    session.id.as_bytes().as_slice(),
                    session.title,
                    session.description,
                    session.published,
                    session.created_at,
                    session.tokens.host.as_str(),
                    session.tokens.ask.as_str(),
                    session.tokens.answer.as_str(),
                    session.tokens.digest.as_str(),
                ],
            )?;
            debug!(session = ?session.id, "inserted session");
            Ok(())
        })
        .await
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
        let id = *id;
        self.with_conn(move |conn| load_session(conn, &id)).await
    }

    async fn find_session_by_token(&self, token: &Token) -> Result<Option<Session>> {
        let token = token.clone();

        self.with_conn(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {SESSION_COLUMNS} FROM sessions
                     WHERE host_token = ?1 OR ask_token = ?1
                        OR answer_token = ?1 OR digest_token = ?1
                     LIMIT 1"
                ),
                params![token.as_str()],
                row_to_session,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn publish_session(&self, id: &SessionId) -> Result<PublishResult> {
        let id = *id;

        self.with_conn(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let changed = tx.execute(
                "UPDATE sessions SET published = 1 WHERE session_id = ?1 AND published = 0",
                params![id.as_bytes().as_slice()],
            )?;

            let result = if changed == 1 {
                PublishResult::Published
            } else if load_session(&tx, &id)?.is_some() {
                PublishResult::AlreadyPublished
            } else {
                PublishResult::NotFound
            };

            tx.commit()?;
            Ok(result)
        })
        .await
    }

    async fn update_session_details(
        &self,
        id: &SessionId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<UpdateResult> {
        let id = *id;
        let title = title.map(str::to_owned);
        let description = description.map(str::to_owned);

        self.with_conn(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let changed = tx.execute(
                "UPDATE sessions
                 SET title = COALESCE(?2, title), description = COALESCE(?3, description)
                 WHERE session_id = ?1 AND published = 0",
                params![id.as_bytes().as_slice(), title, description],
            )?;

            let stored = load_session(&tx, &id)?;
            tx.commit()?;

            Ok(match stored {
                Some(session) if changed == 1 => UpdateResult::Updated(session),
                Some(_) => UpdateResult::AlreadyPublished,
                None => UpdateResult::NotFound,
            })
        })
        .await
    }

    async fn insert_question(&self, question: &Question) -> Result<()> {
        let question = question.clone();

        self.with_conn(move |conn| {
            conn.execute(
                &format!("INSERT INTO questions ({QUESTION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![
                    question.id.as_bytes().as_slice(),
                    question.session_id.as_bytes().as_slice(),
                    question.text,
                    question.vote_count,
                    question.hidden,
                    question.created_at,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_question(&self, id: &QuestionId) -> Result<Option<Question>> {
        let id = *id;
        self.with_conn(move |conn| load_question(conn, &id)).await
    }

    async fn set_question_hidden(
        &self,
        id: &QuestionId,
        hidden: bool,
    ) -> Result<Option<Question>> {
        let id = *id;

        self.with_conn(move |conn| {
            conn.execute(
                "UPDATE questions SET hidden = ?2 WHERE question_id = ?1",
                params![id.as_bytes().as_slice(), hidden],
            )?;
            load_question(conn, &id)
        })
        .await
    }

    async fn list_questions(&self, session_id: &SessionId) -> Result<Vec<Question>> {
        let session_id = *session_id;

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {QUESTION_COLUMNS} FROM questions
                 WHERE session_id = ?1
                 ORDER BY vote_count DESC, created_at ASC, rowid ASC"
            ))?;

            let questions = stmt
                .query_map(params![session_id.as_bytes().as_slice()], row_to_question)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(questions)
        })
        .await
    }

    async fn record_vote(&self, question_id: &QuestionId, voter: &VoterId) -> Result<VoteResult> {
        let question_id = *question_id;
        let voter = voter.clone();

        self.with_conn(move |conn| {
            // IMMEDIATE takes the write lock up front, so the membership check
            // and the increment cannot interleave with another writer.
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            if load_question(&tx, &question_id)?.is_none() {
                return Ok(VoteResult::QuestionNotFound);
            }

            let inserted = tx.execute(
                "INSERT INTO question_voters (question_id, voter_id, voted_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (question_id, voter_id) DO NOTHING",
                params![question_id.as_bytes().as_slice(), voter.as_str(), now_millis()],
            )?;

            if inserted == 0 {
                return Ok(VoteResult::AlreadyVoted);
            }

            let vote_count: u32 = tx.query_row(
                "UPDATE questions SET vote_count = vote_count + 1
                 WHERE question_id = ?1
                 RETURNING vote_count",
                params![question_id.as_bytes().as_slice()],
                |row| row.get(0),
            )?;

            tx.commit()?;
            debug!(question = ?question_id, vote_count, "recorded vote");
            Ok(VoteResult::Recorded { vote_count })
        })
        .await
    }

    async fn has_voted(&self, question_id: &QuestionId, voter: &VoterId) -> Result<bool> {
        let question_id = *question_id;
        let voter = voter.clone();

        self.with_conn(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM question_voters WHERE question_id = ?1 AND voter_id = ?2",
                    params![question_id.as_bytes().as_slice(), voter.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn insert_answer(&self, answer: &Answer) -> Result<AnswerInsertResult> {
        let answer = answer.clone();

        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO answers (answer_id, question_id, core, steps, limits, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (question_id) DO NOTHING",
                params![
                    answer.id.as_bytes().as_slice(),
                    answer.question_id.as_bytes().as_slice(),
                    answer.core,
                    answer.steps,
                    answer.limits,
                    answer.created_at,
                ],
            )?;

            Ok(if inserted == 1 {
                AnswerInsertResult::Inserted
            } else {
                AnswerInsertResult::AlreadyAnswered
            })
        })
        .await
    }

    async fn get_answer(&self, question_id: &QuestionId) -> Result<Option<Answer>> {
        let question_id = *question_id;

        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT answer_id, question_id, core, steps, limits, created_at
                 FROM answers WHERE question_id = ?1",
                params![question_id.as_bytes().as_slice()],
                row_to_answer,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_answers(&self, session_id: &SessionId) -> Result<Vec<Answer>> {
        let session_id = *session_id;

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT a.answer_id, a.question_id, a.core, a.steps, a.limits, a.created_at
                 FROM answers a JOIN questions q ON q.question_id = a.question_id
                 WHERE q.session_id = ?1
                 ORDER BY a.created_at ASC",
            )?;

            let answers = stmt
                .query_map(params![session_id.as_bytes().as_slice()], row_to_answer)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(answers)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ama_core::AnswerDraft;

    fn make_session() -> Session {
        let tokens = SessionTokens {
            host: Token::new(format!("host-{}", SessionId::random())),
            ask: Token::new(format!("ask-{}", SessionId::random())),
            answer: Token::new(format!("answer-{}", SessionId::random())),
            digest: Token::new(format!("digest-{}", SessionId::random())),
        };
        Session::new("Topic A".into(), Some("about".into()), tokens, 1000)
    }

    async fn published_question(store: &SqliteStore) -> (Session, Question) {
        let session = make_session();
        store.insert_session(&session).await.unwrap();
        store.publish_session(&session.id).await.unwrap();
        let question = Question::new(session.id, "Why X?".into(), 2000);
        store.insert_question(&question).await.unwrap();
        (session, question)
    }

    #[tokio::test]
    async fn test_insert_and_get_session() {
        let store = SqliteStore::open_memory().unwrap();
        let session = make_session();
        store.insert_session(&session).await.unwrap();

        let retrieved = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(retrieved, session);
        assert!(store.get_session(&SessionId::random()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_any_token() {
        let store = SqliteStore::open_memory().unwrap();
        let session = make_session();
        store.insert_session(&session).await.unwrap();

        for token in session.tokens.all() {
            let found = store.find_session_by_token(token).await.unwrap().unwrap();
            assert_eq!(found.id, session.id);
        }
        assert!(store
            .find_session_by_token(&Token::from("nope"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_publish_once() {
        let store = SqliteStore::open_memory().unwrap();
        let session = make_session();
        store.insert_session(&session).await.unwrap();

        assert_eq!(
            store.publish_session(&session.id).await.unwrap(),
            PublishResult::Published
        );
        assert_eq!(
            store.publish_session(&session.id).await.unwrap(),
            PublishResult::AlreadyPublished
        );
        assert_eq!(
            store.publish_session(&SessionId::random()).await.unwrap(),
            PublishResult::NotFound
        );
    }

    #[tokio::test]
    async fn test_update_only_while_draft() {
        let store = SqliteStore::open_memory().unwrap();
        let session = make_session();
        store.insert_session(&session).await.unwrap();

        let updated = store
            .update_session_details(&session.id, Some("Topic B"), None)
            .await
            .unwrap();
        match updated {
            UpdateResult::Updated(s) => {
                assert_eq!(s.title, "Topic B");
                assert_eq!(s.description.as_deref(), Some("about"));
            }
            other => panic!("unexpected {other:?}"),
        }

        store.publish_session(&session.id).await.unwrap();
        assert_eq!(
            store
                .update_session_details(&session.id, Some("Topic C"), None)
                .await
                .unwrap(),
            UpdateResult::AlreadyPublished
        );
        let stored = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Topic B");
    }

    #[tokio::test]
    async fn test_vote_once_per_voter() {
        let store = SqliteStore::open_memory().unwrap();
        let (_, question) = published_question(&store).await;
        let voter = VoterId::from("1.2.3.4");

        assert_eq!(
            store.record_vote(&question.id, &voter).await.unwrap(),
            VoteResult::Recorded { vote_count: 1 }
        );
        assert_eq!(
            store.record_vote(&question.id, &voter).await.unwrap(),
            VoteResult::AlreadyVoted
        );
        assert_eq!(
            store
                .record_vote(&question.id, &VoterId::from("5.6.7.8"))
                .await
                .unwrap(),
            VoteResult::Recorded { vote_count: 2 }
        );
        assert!(store.has_voted(&question.id, &voter).await.unwrap());

        let stored = store.get_question(&question.id).await.unwrap().unwrap();
        assert_eq!(stored.vote_count, 2);
    }

    #[tokio::test]
    async fn test_vote_unknown_question() {
        let store = SqliteStore::open_memory().unwrap();
        assert_eq!(
            store
                .record_vote(&QuestionId::random(), &VoterId::from("1.2.3.4"))
                .await
                .unwrap(),
            VoteResult::QuestionNotFound
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_identical_votes() {
        let store = SqliteStore::open_memory().unwrap();
        let (_, question) = published_question(&store).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let id = question.id;
                tokio::spawn(async move { store.record_vote(&id, &VoterId::from("1.2.3.4")).await })
            })
            .collect();

        let mut recorded = 0;
        for handle in handles {
            if let VoteResult::Recorded { .. } = handle.await.unwrap().unwrap() {
                recorded += 1;
            }
        }
        assert_eq!(recorded, 1);

        let stored = store.get_question(&question.id).await.unwrap().unwrap();
        assert_eq!(stored.vote_count, 1);
    }

    #[tokio::test]
    async fn test_single_answer_per_question() {
        let store = SqliteStore::open_memory().unwrap();
        let (session, question) = published_question(&store).await;

        let first = Answer::new(question.id, AnswerDraft::new("c", "s", "l"), 3000);
        let second = Answer::new(question.id, AnswerDraft::new("c2", "s2", "l2"), 3001);

        assert_eq!(
            store.insert_answer(&first).await.unwrap(),
            AnswerInsertResult::Inserted
        );
        assert_eq!(
            store.insert_answer(&second).await.unwrap(),
            AnswerInsertResult::AlreadyAnswered
        );

        let stored = store.get_answer(&question.id).await.unwrap().unwrap();
        assert_eq!(stored, first);
        assert_eq!(store.list_answers(&session.id).await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn test_list_questions_by_votes_then_age() {
        let store = SqliteStore::open_memory().unwrap();
        let (session, first) = published_question(&store).await;
        let second = Question::new(session.id, "Second".into(), 2001);
        let third = Question::new(session.id, "Third".into(), 2002);
        store.insert_question(&second).await.unwrap();
        store.insert_question(&third).await.unwrap();

        store.record_vote(&third.id, &VoterId::from("a")).await.unwrap();

        let ids: Vec<_> = store
            .list_questions(&session.id)
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(ids, vec![third.id, first.id, second.id]);
    }

    #[tokio::test]
    async fn test_hide_and_show() {
        let store = SqliteStore::open_memory().unwrap();
        let (_, question) = published_question(&store).await;

        let hidden = store.set_question_hidden(&question.id, true).await.unwrap().unwrap();
        assert!(hidden.hidden);
        let shown = store.set_question_hidden(&question.id, false).await.unwrap().unwrap();
        assert!(!shown.hidden);
        assert!(store
            .set_question_hidden(&QuestionId::random(), true)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ama.db");
        let session = make_session();

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_session(&session).await.unwrap();
            store.publish_session(&session.id).await.unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        let stored = reopened.get_session(&session.id).await.unwrap().unwrap();
        assert!(stored.published);
    }
}
