//! Voter-id derivation vectors.
//!
//! Fixed header combinations and the voter id each must produce. Any
//! transport that extracts voter ids has to agree with these.

use ama_core::{VoterId, FALLBACK_VOTER_ID};

/// A voter-id test vector.
#[derive(Debug, Clone)]
pub struct VoterVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Value of the forwarded-for header, if sent.
    pub forwarded_for: Option<&'static str>,
    /// Value of the real-ip header, if sent.
    pub real_ip: Option<&'static str>,
    /// Expected voter id.
    pub expected: &'static str,
}

/// Get all voter-id vectors.
pub fn voter_vectors() -> Vec<VoterVector> {
    vec![
        VoterVector {
            name: "single forwarded-for address",
            forwarded_for: Some("1.2.3.4"),
            real_ip: None,
            expected: "1.2.3.4",
        },
        VoterVector {
            name: "first hop of a proxy chain",
            forwarded_for: Some("1.2.3.4, 10.0.0.1, 10.0.0.2"),
            real_ip: Some("9.9.9.9"),
            expected: "1.2.3.4",
        },
        VoterVector {
            name: "surrounding whitespace trimmed",
            forwarded_for: Some("  203.0.113.7 ,10.0.0.1"),
            real_ip: None,
            expected: "203.0.113.7",
        },
        VoterVector {
            name: "real-ip when no forwarded-for",
            forwarded_for: None,
            real_ip: Some("198.51.100.2"),
            expected: "198.51.100.2",
        },
        VoterVector {
            name: "blank forwarded-for falls through",
            forwarded_for: Some(" , 10.0.0.1"),
            real_ip: Some("198.51.100.2"),
            expected: "198.51.100.2",
        },
        VoterVector {
            name: "ipv6 address kept verbatim",
            forwarded_for: Some("2001:db8::1"),
            real_ip: None,
            expected: "2001:db8::1",
        },
        VoterVector {
            name: "no proxy metadata",
            forwarded_for: None,
            real_ip: None,
            expected: FALLBACK_VOTER_ID,
        },
        VoterVector {
            name: "blank headers",
            forwarded_for: Some(""),
            real_ip: Some("   "),
            expected: FALLBACK_VOTER_ID,
        },
    ]
}

/// Derive the voter id for a vector.
pub fn derive(vector: &VoterVector) -> VoterId {
    VoterId::from_headers(vector.forwarded_for, vector.real_ip)
}

/// Check every vector. Returns the names of the ones that disagree.
pub fn verify_voter_vectors() -> Vec<&'static str> {
    voter_vectors()
        .into_iter()
        .filter(|v| derive(v).as_str() != v.expected)
        .map(|v| v.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_pass() {
        let failed = verify_voter_vectors();
        assert!(failed.is_empty(), "failing vectors: {failed:?}");
    }

    #[test]
    fn test_vector_names_unique() {
        let mut names: Vec<_> = voter_vectors().iter().map(|v| v.name).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
