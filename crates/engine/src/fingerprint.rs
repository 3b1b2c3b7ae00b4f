//! Deterministic content identity for a candidate question (C1, §4.1).

use sha2::{Digest, Sha256};

/// Byte that separates the sorted option list before hashing. Question text
/// is human-authored prose, so this control character is not expected to
/// appear in it; the Validator rejects it upstream if it does (§4.1).
const FIELD_SEPARATOR: char = '\u{1F}';

/// Collapse runs of whitespace to a single ASCII space after trimming the
/// ends. Case is left untouched — body text is never case-folded (§4.3).
fn collapse_whitespace(s: &str) -> String {
    s.trim().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `true` if any field contains the reserved separator byte, meaning the
/// fingerprint cannot be computed safely. The Validator (C2) treats this as
/// `MalformedOptions`.
pub fn contains_reserved_separator(stem: &str, options: &[String], correct_answer: &str) -> bool {
    stem.contains(FIELD_SEPARATOR)
        || correct_answer.contains(FIELD_SEPARATOR)
        || options.iter().any(|o| o.contains(FIELD_SEPARATOR))
}

/// Computes the 64-character lowercase hex SHA-256 fingerprint over
/// `(stem, options, correct_answer)`, per §4.1. Options are sorted
/// lexicographically so that option ordering does not affect identity.
pub fn fingerprint(stem: &str, options: &[String], correct_answer: &str) -> String {
    let normalized_stem = collapse_whitespace(stem);
    let normalized_answer = collapse_whitespace(correct_answer);

    let mut normalized_options: Vec<String> = options.iter().map(|o| collapse_whitespace(o)).collect();
    normalized_options.sort();

    let mut payload = String::new();
    payload.push_str(&normalized_stem);
    payload.push(FIELD_SEPARATOR);
    payload.push_str(&normalized_options.join(&FIELD_SEPARATOR.to_string()));
    payload.push(FIELD_SEPARATOR);
    payload.push_str(&normalized_answer);

    let digest = Sha256::digest(payload.as_bytes());
    format!("{:x}", digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_yields_identical_fingerprint() {
        let a = fingerprint("What is 2 + 2?", &["4".into(), "3".into(), "5".into(), "6".into()], "4");
        let b = fingerprint("What is 2 + 2?", &["6".into(), "5".into(), "4".into(), "3".into()], "4");
        assert_eq!(a, b, "option ordering must not affect the fingerprint");
    }

    #[test]
    fn whitespace_is_collapsed_before_hashing() {
        let a = fingerprint("What  is   2+2?", &["4".into(), "3".into(), "5".into(), "6".into()], "4");
        let b = fingerprint("What is 2+2?", &["4".into(), "3".into(), "5".into(), "6".into()], "4");
        assert_eq!(a, b);
    }

    #[test]
    fn case_is_preserved() {
        let a = fingerprint("Sodium symbol?", &["Na".into(), "NA".into(), "na".into(), "nA".into()], "Na");
        let b = fingerprint("Sodium symbol?", &["Na".into(), "NA".into(), "na".into(), "nA".into()], "na");
        assert_ne!(a, b, "case must be significant in the question body");
    }

    #[test]
    fn fingerprint_is_64_char_lowercase_hex() {
        let f = fingerprint("stem", &["a".into(), "b".into(), "c".into(), "d".into()], "a");
        assert_eq!(f.len(), 64);
        assert!(f.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
    }

    #[test]
    fn detects_reserved_separator() {
        assert!(contains_reserved_separator(
            "stem with \u{1F} inside",
            &["a".into(), "b".into(), "c".into(), "d".into()],
            "a"
        ));
        assert!(!contains_reserved_separator(
            "plain stem",
            &["a".into(), "b".into(), "c".into(), "d".into()],
            "a"
        ));
    }
}
