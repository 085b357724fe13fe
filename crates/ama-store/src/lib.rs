//! # AMA Store
//!
//! Storage abstraction for the AMA platform. Provides a trait-based interface
//! for session, question, vote and answer persistence with SQLite and
//! in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts persistence behind the [`Store`] trait,
//! allowing the service to be storage-agnostic. The primary implementation
//! is [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`VoteResult`] - Outcome of adding a voter to a question
//! - [`AnswerInsertResult`] - Outcome of storing an answer
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ama_store::{SqliteStore, Store};
//! use ama_core::SessionId;
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("ama.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     let missing = store.get_session(&SessionId::random()).await.unwrap();
//!     assert!(missing.is_none());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **One vote per voter**: a second vote from the same voter returns `AlreadyVoted`
//! - **One answer per question**: a second answer returns `AlreadyAnswered`
//! - **One-way publish**: publishing twice returns `AlreadyPublished`
//! - **Draft-only edits**: editing a published session returns `AlreadyPublished`

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{AnswerInsertResult, PublishResult, Store, StoreExt, UpdateResult, VoteResult};
