//! # AMA
//!
//! The service API for the AMA platform: hosted Q&A sessions where access is
//! granted by capability tokens instead of accounts.
//!
//! ## Overview
//!
//! A host creates a session and receives four share links:
//!
//! - **Host**: publish, edit the draft, hide and show questions
//! - **Ask**: submit questions and vote, once per voter
//! - **Answer**: answer each question once
//! - **Digest**: read-only view of the exchange
//!
//! ## Key Concepts
//!
//! - **Publish**: one-way. Questions, votes and answers need a published session.
//! - **Uniform not-found**: an unknown token and a missing session look the same.
//! - **Once-only writes**: duplicate votes and answers fail with a conflict,
//!   enforced atomically by the store.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ama::{Ama, AmaConfig};
//! use ama::store::SqliteStore;
//! use ama::core::VoterId;
//!
//! async fn example() {
//!     let store = SqliteStore::open("ama.db").unwrap();
//!     let ama = Ama::new(store, AmaConfig::default());
//!
//!     let created = ama.create_session("Topic A", None).await.unwrap();
//!     ama.publish(&created.host_token).await.unwrap();
//!
//!     let question = ama
//!         .create_question(&created.ask_token, "Why X?")
//!         .await
//!         .unwrap();
//!
//!     let receipt = ama
//!         .cast_vote(&question.id, &created.ask_token, &VoterId::from("1.2.3.4"))
//!         .await
//!         .unwrap();
//!     assert_eq!(receipt.vote_count, 1);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `ama::core` - Records, identifiers and input rules
//! - `ama::perms` - Tokens and capability resolution
//! - `ama::store` - Storage abstraction and SQLite

pub mod config;
pub mod error;
pub mod service;
pub mod view;

// Re-export component crates
pub use ama_core as core;
pub use ama_perms as perms;
pub use ama_store as store;

pub use config::AmaConfig;
pub use error::{AmaError, ConflictError, ErrorKind, Result, StateError};
pub use service::Ama;
pub use view::{CreatedSession, QuestionView, SessionUpdate, SessionView, ShareTokens, VoteReceipt};

pub use ama_core::{Answer, AnswerDraft, Limits, Question, QuestionId, Session, SessionId, Token, VoterId};
pub use ama_perms::{Capability, Permissions};
