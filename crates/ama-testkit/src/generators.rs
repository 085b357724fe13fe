//! Proptest generators for property-based testing.

use proptest::prelude::*;

use ama_core::{QuestionId, SessionId, Token, VoterId, MAX_QUESTION_CHARS};

/// Generate a random SessionId.
pub fn session_id() -> impl Strategy<Value = SessionId> {
    any::<[u8; 16]>().prop_map(SessionId::from_bytes)
}

/// Generate a random QuestionId.
pub fn question_id() -> impl Strategy<Value = QuestionId> {
    any::<[u8; 16]>().prop_map(QuestionId::from_bytes)
}

/// Generate a token-shaped string that was never issued.
pub fn stray_token() -> impl Strategy<Value = Token> {
    "[A-Za-z0-9_-]{0,64}".prop_map(Token::from)
}

/// Question text that is valid after trimming, padded with whitespace.
pub fn question_text() -> impl Strategy<Value = String> {
    let visible = any::<char>().prop_filter("visible", |c| !c.is_whitespace());
    (
        "[ \t]{0,3}",
        prop::collection::vec(visible, 1..=MAX_QUESTION_CHARS),
        "[ \t\n]{0,3}",
    )
        .prop_map(|(lead, body, trail)| {
            let body: String = body.into_iter().collect();
            format!("{lead}{body}{trail}")
        })
}

/// Question text that is too long after trimming.
pub fn oversized_question_text() -> impl Strategy<Value = String> {
    "[a-z?]{141,300}".prop_map(String::from)
}

/// A non-blank title within the default limit.
pub fn title() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 ]{0,98}[A-Za-z0-9]".prop_map(String::from)
}

/// An IPv4-looking voter id.
pub fn voter_id() -> impl Strategy<Value = VoterId> {
    any::<[u8; 4]>().prop_map(|[a, b, c, d]| VoterId::new(format!("{a}.{b}.{c}.{d}")))
}

/// A forwarded-for header value: one or more comma-separated addresses.
pub fn forwarded_for() -> impl Strategy<Value = (String, VoterId)> {
    prop::collection::vec(voter_id(), 1..5).prop_map(|hops| {
        let header = hops
            .iter()
            .map(VoterId::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        (header, hops[0].clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ama_core::{normalize_question_text, normalize_title, MAX_TITLE_CHARS};

    proptest! {
        #[test]
        fn generated_question_text_is_valid(text in question_text()) {
            prop_assert!(normalize_question_text(&text, MAX_QUESTION_CHARS).is_ok());
        }

        #[test]
        fn oversized_question_text_is_rejected(text in oversized_question_text()) {
            prop_assert!(normalize_question_text(&text, MAX_QUESTION_CHARS).is_err());
        }

        #[test]
        fn generated_title_is_valid(t in title()) {
            prop_assert!(normalize_title(&t, MAX_TITLE_CHARS).is_ok());
        }

        #[test]
        fn first_forwarded_hop_wins((header, first) in forwarded_for()) {
            prop_assert_eq!(VoterId::from_headers(Some(header.as_str()), Some("10.0.0.1")), first);
        }
    }
}
