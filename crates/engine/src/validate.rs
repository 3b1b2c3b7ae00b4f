//! Structural + semantic checks on a candidate question before admission (C2, §4.2).
//!
//! Pure: this module never touches the store.

use iqrah_backend_domain::{Difficulty, ValidationKind};

use crate::fingerprint::contains_reserved_separator;

/// A candidate question prior to fingerprinting, in the shape shared by both
/// the Generation Coordinator's generator output and caller-submitted
/// candidates.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub subject: String,
    pub topic: String,
    pub subtopic: String,
    pub grade: Option<i16>,
    pub difficulty: String,
    pub stem: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub rationale: Option<String>,
    pub standard_ref: Option<String>,
}

/// Validate a candidate per §4.2. Returns the parsed `Difficulty` on success
/// so callers do not have to re-parse the string.
pub fn validate(candidate: &Candidate) -> Result<Difficulty, ValidationKind> {
    if candidate.subject.trim().is_empty()
        || candidate.topic.trim().is_empty()
        || candidate.subtopic.trim().is_empty()
    {
        return Err(ValidationKind::MissingMetadata);
    }

    if let Some(grade) = candidate.grade {
        if !(0..=12).contains(&grade) {
            return Err(ValidationKind::BadGrade);
        }
    }

    if candidate.stem.trim().is_empty() {
        return Err(ValidationKind::EmptyStem);
    }

    if candidate.options.len() != 4 {
        return Err(ValidationKind::MalformedOptions);
    }

    let trimmed: Vec<&str> = candidate.options.iter().map(|o| o.trim()).collect();
    if trimmed.iter().any(|o| o.is_empty()) {
        return Err(ValidationKind::MalformedOptions);
    }
    for i in 0..trimmed.len() {
        for j in (i + 1)..trimmed.len() {
            if trimmed[i] == trimmed[j] {
                return Err(ValidationKind::MalformedOptions);
            }
        }
    }

    if contains_reserved_separator(&candidate.stem, &candidate.options, &candidate.correct_answer) {
        return Err(ValidationKind::MalformedOptions);
    }

    if !candidate.options.iter().any(|o| o == &candidate.correct_answer) {
        return Err(ValidationKind::AnswerNotInOptions);
    }

    candidate
        .difficulty
        .parse::<Difficulty>()
        .map_err(|_| ValidationKind::BadDifficulty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_candidate() -> Candidate {
        Candidate {
            subject: "math".into(),
            topic: "multiplication".into(),
            subtopic: "single digit".into(),
            grade: Some(3),
            difficulty: "easy".into(),
            stem: "What is 2 * 2?".into(),
            options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
            correct_answer: "4".into(),
            rationale: None,
            standard_ref: None,
        }
    }

    #[test]
    fn accepts_well_formed_candidate() {
        assert_eq!(validate(&valid_candidate()), Ok(Difficulty::Easy));
    }

    #[test]
    fn rejects_duplicate_options_after_trim() {
        let mut c = valid_candidate();
        c.options = vec!["4".into(), " 4 ".into(), "5".into(), "6".into()];
        assert_eq!(validate(&c), Err(ValidationKind::MalformedOptions));
    }

    #[test]
    fn rejects_wrong_option_count() {
        let mut c = valid_candidate();
        c.options = vec!["4".into(), "5".into(), "6".into()];
        assert_eq!(validate(&c), Err(ValidationKind::MalformedOptions));
    }

    #[test]
    fn rejects_answer_not_in_options() {
        let mut c = valid_candidate();
        c.correct_answer = "7".into();
        assert_eq!(validate(&c), Err(ValidationKind::AnswerNotInOptions));
    }

    #[test]
    fn answer_match_is_case_sensitive() {
        let mut c = valid_candidate();
        c.options = vec!["Na".into(), "NA".into(), "na".into(), "nA".into()];
        c.correct_answer = "na".into();
        assert_eq!(validate(&c), Ok(Difficulty::Easy));

        c.correct_answer = "NOT_PRESENT".into();
        assert_eq!(validate(&c), Err(ValidationKind::AnswerNotInOptions));
    }

    #[test]
    fn rejects_empty_stem() {
        let mut c = valid_candidate();
        c.stem = "   ".into();
        assert_eq!(validate(&c), Err(ValidationKind::EmptyStem));
    }

    #[test]
    fn rejects_bad_difficulty() {
        let mut c = valid_candidate();
        c.difficulty = "impossible".into();
        assert_eq!(validate(&c), Err(ValidationKind::BadDifficulty));
    }

    #[test]
    fn rejects_bad_grade() {
        let mut c = valid_candidate();
        c.grade = Some(13);
        assert_eq!(validate(&c), Err(ValidationKind::BadGrade));
    }

    #[test]
    fn rejects_missing_metadata() {
        let mut c = valid_candidate();
        c.topic = "".into();
        assert_eq!(validate(&c), Err(ValidationKind::MissingMetadata));
    }
}
