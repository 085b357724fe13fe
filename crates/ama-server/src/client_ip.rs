//! Voter identity from proxy headers.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use ama::VoterId;

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const REAL_IP: &str = "x-real-ip";

/// Extracts the [`VoterId`] of the caller.
///
/// Spoofable by anyone who can set the headers.
#[derive(Debug, Clone)]
pub struct Voter(pub VoterId);

pub fn voter_from_headers(headers: &HeaderMap) -> VoterId {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
    VoterId::from_headers(header(FORWARDED_FOR), header(REAL_IP))
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Voter {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Voter(voter_from_headers(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("1.2.3.4, 10.0.0.1"));
        headers.insert(REAL_IP, HeaderValue::from_static("9.9.9.9"));
        assert_eq!(voter_from_headers(&headers).as_str(), "1.2.3.4");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(
            voter_from_headers(&HeaderMap::new()).as_str(),
            ama::core::FALLBACK_VOTER_ID
        );
    }
}
