//! Token issuance.
//!
//! Each token is 32 bytes from the operating system CSPRNG, encoded with the
//! URL-safe base64 alphabet without padding.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};

use ama_core::{SessionTokens, Token};

/// Random bytes per token (a 256-bit search space).
pub const TOKEN_BYTES: usize = 32;

/// Generate one capability token.
pub fn generate_token() -> Token {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Token::new(URL_SAFE_NO_PAD.encode(bytes))
}

/// Generate the four tokens of a new session.
///
/// Every token is drawn independently. A set with a repeated token is
/// discarded and redrawn, so the result is always pairwise distinct.
pub fn issue_session_tokens() -> SessionTokens {
    loop {
        let tokens = SessionTokens {
            host: generate_token(),
            ask: generate_token(),
            answer: generate_token(),
            digest: generate_token(),
        };
        if tokens.are_distinct() {
            return tokens;
        }
    }
}
