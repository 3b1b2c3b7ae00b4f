//! Maps a learner's cross-subject accuracy history to a difficulty
//! preference order (C6, §4.6). Pure and deterministic; recomputed on every
//! fetch.

use iqrah_backend_domain::{AccuracySummary, Difficulty};

/// §4.6's mapping table, boundaries inclusive exactly as specified.
pub fn preference_order(summary: &AccuracySummary) -> Vec<Difficulty> {
    use Difficulty::*;

    if summary.total_attempts == 0 {
        return vec![Easy, Medium];
    }

    let accuracy = summary.total_correct as f64 / summary.total_attempts as f64;

    if accuracy >= 0.95 && summary.total_attempts >= 10 {
        vec![Medium, Hard, Easy]
    } else if accuracy >= 0.80 {
        vec![Easy, Medium, Hard]
    } else {
        vec![Easy]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_attempts_yields_easy_medium() {
        let summary = AccuracySummary { total_attempts: 0, total_correct: 0 };
        assert_eq!(preference_order(&summary), vec![Difficulty::Easy, Difficulty::Medium]);
    }

    #[test]
    fn mastery_requires_both_accuracy_and_volume() {
        let summary = AccuracySummary { total_attempts: 10, total_correct: 10 };
        assert_eq!(preference_order(&summary), vec![Difficulty::Medium, Difficulty::Hard, Difficulty::Easy]);
    }

    #[test]
    fn high_accuracy_below_volume_floor_falls_back() {
        let summary = AccuracySummary { total_attempts: 9, total_correct: 9 };
        assert_eq!(preference_order(&summary), vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]);
    }

    #[test]
    fn low_accuracy_yields_easy_only() {
        let summary = AccuracySummary { total_attempts: 100, total_correct: 79 };
        assert_eq!(preference_order(&summary), vec![Difficulty::Easy]);
    }

    #[test]
    fn boundary_at_point_eight() {
        let summary = AccuracySummary { total_attempts: 100, total_correct: 80 };
        assert_eq!(preference_order(&summary), vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]);
    }
}
