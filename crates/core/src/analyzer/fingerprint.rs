//! Replay fingerprints.

use std::cmp::Ordering;
use uuid::Uuid;

/// Computes the deduplication fingerprint of a replay.
///
/// MD5 over the participants' battle tags in invariant-culture order followed
/// by the match's random value, rendered as a GUID. The digest is read with the
/// little-endian field layout the remote service expects, so every client
/// produces the same string for the same match.
pub fn compute_fingerprint<S: AsRef<str>>(battle_tags: &[S], random_value: u64) -> String {
    let mut tags: Vec<&str> = battle_tags.iter().map(|t| t.as_ref()).collect();
    tags.sort_by(|a, b| culture_order(a, b));

    let mut input = String::new();
    for tag in tags {
        input.push_str(tag);
    }
    input.push_str(&random_value.to_string());

    let digest = md5::compute(input.as_bytes());
    Uuid::from_bytes_le(digest.0).to_string()
}

/// Orders strings case-insensitively, breaking ties with lowercase first.
fn culture_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_order_independent() {
        let a = compute_fingerprint(&["Bob#2", "Alice#1", "Carol#3"], 99);
        let b = compute_fingerprint(&["Carol#3", "Bob#2", "Alice#1"], 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_depends_on_random_value() {
        let a = compute_fingerprint(&["Alice#1"], 1);
        let b = compute_fingerprint(&["Alice#1"], 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_is_guid_shaped() {
        let fp = compute_fingerprint(&["Alice#1", "Bob#2"], 12345);
        assert_eq!(fp.len(), 36);
        assert!(Uuid::parse_str(&fp).is_ok());
    }

    fn expected(input: &str) -> String {
        Uuid::from_bytes_le(md5::compute(input.as_bytes()).0).to_string()
    }

    #[test]
    fn test_fingerprint_sorts_case_insensitively() {
        let fp = compute_fingerprint(&["alice#1", "Bob#2"], 7);
        assert_eq!(fp, expected("alice#1Bob#27"));
        assert_eq!(fp, compute_fingerprint(&["Bob#2", "alice#1"], 7));
    }

    #[test]
    fn test_fingerprint_lowercase_first_on_tie() {
        let fp = compute_fingerprint(&["Alice#1", "alice#1"], 3);
        assert_eq!(fp, expected("alice#1Alice#13"));
    }

    #[test]
    fn test_fingerprint_byte_order() {
        // First GUID group is the first four digest bytes reversed.
        let digest = md5::compute(b"0");
        let fp = compute_fingerprint::<&str>(&[], 0);
        let bytes = digest.0;
        let expected_first_group = format!(
            "{:02x}{:02x}{:02x}{:02x}",
            bytes[3], bytes[2], bytes[1], bytes[0]
        );
        assert!(fp.starts_with(&expected_first_group));
    }
}
