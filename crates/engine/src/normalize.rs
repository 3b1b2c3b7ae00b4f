//! Single boundary for case-folding metadata fields (C3, §4.3).
//!
//! `subject`/`topic`/`subtopic` are normalized to NFKC-composed, casefolded
//! form on write and query. Question bodies (`stem`, `options`,
//! `correct_answer`, `rationale`) never pass through this module.

use unicode_normalization::UnicodeNormalization;

/// Write/query-time normalization: trim, then Unicode NFKC + casefold.
pub fn normalize_metadata(s: &str) -> String {
    s.trim().nfkc().collect::<String>().to_lowercase()
}

/// Read-out presentation transform: capitalize the first letter of each
/// whitespace-separated word. Applied only at the point data leaves the core
/// for an external consumer — the stored/queried form stays lowercase.
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_metadata("  Multiplication  "), "multiplication");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_metadata("Single Digit Multiplication");
        let twice = normalize_metadata(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn title_case_capitalizes_each_word() {
        assert_eq!(title_case("single digit multiplication"), "Single Digit Multiplication");
    }

    #[test]
    fn title_case_handles_single_word() {
        assert_eq!(title_case("math"), "Math");
    }
}
