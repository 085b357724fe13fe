//! # AMA Permissions
//!
//! Capability tokens and the rules that turn a token into a role.
//!
//! ## Overview
//!
//! There are no user accounts. Every session carries four unguessable
//! tokens, one per role, and whoever holds a token holds the role:
//!
//! - **Host**: publishes, edits the draft, hides and shows questions
//! - **Ask**: submits and votes on questions
//! - **Answer**: answers questions
//! - **Digest**: read-only view of the exchange
//!
//! The [`issuer`] draws the tokens, the [`capability`] module resolves a
//! presented token against a session.
//!
//! ## Usage
//!
//! ```rust
//! use ama_perms::{issue_session_tokens, resolve, Capability};
//!
//! let tokens = issue_session_tokens();
//! assert_eq!(resolve(&tokens, &tokens.ask), Some(Capability::Ask));
//! ```

pub mod capability;
pub mod error;
pub mod issuer;

pub use capability::{require, resolve, Capability, Permissions};
pub use error::{PermsError, Result};
pub use issuer::{generate_token, issue_session_tokens, TOKEN_BYTES};
