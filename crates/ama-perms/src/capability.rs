//! Capability resolution.
//!
//! A token is compared against the four role fields of a session. The result
//! is a single [`Capability`] rather than four independent flags, so call
//! sites match on the role instead of checking the right boolean.

use std::fmt;

use serde::Serialize;
use subtle::ConstantTimeEq;

use ama_core::{SessionTokens, Token};

use crate::error::{PermsError, Result};

/// The role a token grants on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Host,
    Ask,
    Answer,
    Digest,
}

impl Capability {
    /// Whether this role sees questions the host has hidden.
    pub fn sees_hidden(&self) -> bool {
        matches!(self, Capability::Host | Capability::Answer)
    }

    /// Whether this role may read the session's share tokens.
    pub fn sees_tokens(&self) -> bool {
        matches!(self, Capability::Host)
    }

    /// Expand to the flag view used by clients.
    pub fn permissions(&self) -> Permissions {
        Permissions {
            is_host: *self == Capability::Host,
            can_ask: *self == Capability::Ask,
            can_answer: *self == Capability::Answer,
            is_digest: *self == Capability::Digest,
        }
    }

    /// The token field of `tokens` that carries this role.
    pub fn token_of<'a>(&self, tokens: &'a SessionTokens) -> &'a Token {
        match self {
            Capability::Host => &tokens.host,
            Capability::Ask => &tokens.ask,
            Capability::Answer => &tokens.answer,
            Capability::Digest => &tokens.digest,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Host => "host",
            Capability::Ask => "ask",
            Capability::Answer => "answer",
            Capability::Digest => "digest",
        };
        f.write_str(name)
    }
}

/// Flag view of a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub is_host: bool,
    pub can_ask: bool,
    pub can_answer: bool,
    pub is_digest: bool,
}

/// Resolve `token` against a session's tokens.
///
/// Returns `None` when the token matches no role. Host is tried first.
pub fn resolve(tokens: &SessionTokens, token: &Token) -> Option<Capability> {
    [
        Capability::Host,
        Capability::Ask,
        Capability::Answer,
        Capability::Digest,
    ]
    .into_iter()
    .find(|capability| tokens_match(capability.token_of(tokens), token))
}

/// Require `token` to be exactly the session's token for `required`.
///
/// Holding a different valid role is not enough.
pub fn require(tokens: &SessionTokens, token: &Token, required: Capability) -> Result<()> {
    if tokens_match(required.token_of(tokens), token) {
        Ok(())
    } else {
        Err(PermsError::PermissionDenied { required })
    }
}

fn tokens_match(expected: &Token, presented: &Token) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuer::issue_session_tokens;

    #[test]
    fn test_each_token_resolves_to_its_role() {
        let tokens = issue_session_tokens();
        assert_eq!(resolve(&tokens, &tokens.host), Some(Capability::Host));
        assert_eq!(resolve(&tokens, &tokens.ask), Some(Capability::Ask));
        assert_eq!(resolve(&tokens, &tokens.answer), Some(Capability::Answer));
        assert_eq!(resolve(&tokens, &tokens.digest), Some(Capability::Digest));
    }

    #[test]
    fn test_unknown_token_resolves_to_none() {
        let tokens = issue_session_tokens();
        let other = issue_session_tokens();
        assert_eq!(resolve(&tokens, &other.host), None);
        assert_eq!(resolve(&tokens, &Token::from("")), None);
    }

    #[test]
    fn test_prefix_does_not_match() {
        let tokens = issue_session_tokens();
        let prefix = Token::new(&tokens.ask.as_str()[..10]);
        assert_eq!(resolve(&tokens, &prefix), None);
    }

    #[test]
    fn test_require_exact_role() {
        let tokens = issue_session_tokens();
        assert!(require(&tokens, &tokens.host, Capability::Host).is_ok());
        assert_eq!(
            require(&tokens, &tokens.ask, Capability::Host),
            Err(PermsError::PermissionDenied {
                required: Capability::Host
            })
        );
        assert!(require(&tokens, &tokens.host, Capability::Answer).is_err());
    }

    #[test]
    fn test_visibility_rules() {
        assert!(Capability::Host.sees_hidden());
        assert!(Capability::Answer.sees_hidden());
        assert!(!Capability::Ask.sees_hidden());
        assert!(!Capability::Digest.sees_hidden());

        assert!(Capability::Host.sees_tokens());
        assert!(!Capability::Answer.sees_tokens());
        assert!(!Capability::Digest.sees_tokens());
    }

    #[test]
    fn test_permissions_exactly_one_flag() {
        for capability in [
            Capability::Host,
            Capability::Ask,
            Capability::Answer,
            Capability::Digest,
        ] {
            let p = capability.permissions();
            let set = [p.is_host, p.can_ask, p.can_answer, p.is_digest]
                .iter()
                .filter(|flag| **flag)
                .count();
            assert_eq!(set, 1, "{capability}");
        }
    }

    #[test]
    fn test_permissions_json() {
        let json = serde_json::to_value(Capability::Digest.permissions()).unwrap();
        assert_eq!(json["isDigest"], true);
        assert_eq!(json["isHost"], false);
    }
}
