//! # AMA Testkit
//!
//! Testing utilities for the AMA platform.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A service over a memory store with a session ready to use
//! - **Generators**: Proptest strategies for property-based testing
//! - **Voter vectors**: Known header combinations and the voter id they yield
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use ama_testkit::TestFixture;
//!
//! let fixture = TestFixture::published().await;
//! let question = fixture.ask_question("Why X?").await;
//! fixture.upvote(&question, 3).await;
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ama_testkit::generators::question_text;
//!
//! proptest! {
//!     #[test]
//!     fn any_valid_text_is_accepted(text in question_text()) {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Voter Vectors
//!
//! ```rust
//! use ama_testkit::vectors::verify_voter_vectors;
//!
//! assert!(verify_voter_vectors().is_empty());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{voters, TestFixture};
pub use vectors::{voter_vectors, verify_voter_vectors, VoterVector};
