use crate::consolidate::Match;
use crate::report::finding::{Confidence, Severity};

/// Overall severity and confidence of a batch: the highest rating of any
/// match, starting from the bottom of each scale. Missing ratings are skipped.
///
/// # Panics
///
/// Panics on an empty batch.
pub fn aggregate(matches: &[Match]) -> (Severity, Confidence) {
    assert!(!matches.is_empty(), "aggregate called with an empty batch");

    let mut severity = Severity::LOWEST;
    let mut confidence = Confidence::LOWEST;
    for m in matches {
        if let Some(s) = m.severity {
            if s > severity {
                severity = s;
            }
        }
        if let Some(c) = m.confidence {
            if c > confidence {
                confidence = c;
            }
        }
    }
    (severity, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidate::tests::m;

    #[test]
    fn test_takes_highest_severity() {
        let batch = vec![
            m("a", 0, 1, "a", Some(Severity::Info), Some(Confidence::Firm)),
            m("b", 1, 2, "b", Some(Severity::High), Some(Confidence::Firm)),
            m("c", 2, 3, "c", Some(Severity::Low), Some(Confidence::Firm)),
        ];
        assert_eq!(aggregate(&batch), (Severity::High, Confidence::Firm));
    }

    #[test]
    fn test_all_tentative_stays_tentative() {
        let batch = vec![
            m("a", 0, 1, "a", Some(Severity::Low), Some(Confidence::Tentative)),
            m("b", 1, 2, "b", Some(Severity::Low), Some(Confidence::Tentative)),
        ];
        assert_eq!(aggregate(&batch).1, Confidence::Tentative);
    }

    #[test]
    fn test_missing_rating_is_skipped() {
        let batch = vec![
            m("a", 0, 1, "a", Some(Severity::Medium), Some(Confidence::Certain)),
            m("b", 1, 2, "b", None, None),
        ];
        assert_eq!(aggregate(&batch), (Severity::Medium, Confidence::Certain));

        let unrated = vec![m("a", 0, 1, "a", None, None)];
        assert_eq!(aggregate(&unrated), (Severity::Info, Confidence::Tentative));
    }

    #[test]
    fn test_order_independent() {
        let mut batch = vec![
            m("a", 0, 1, "a", Some(Severity::Low), Some(Confidence::Certain)),
            m("b", 1, 2, "b", Some(Severity::Medium), Some(Confidence::Tentative)),
            m("c", 2, 3, "c", None, Some(Confidence::Firm)),
        ];
        let forward = aggregate(&batch);
        batch.reverse();
        assert_eq!(aggregate(&batch), forward);
        assert_eq!(forward, (Severity::Medium, Confidence::Certain));
    }

    #[test]
    #[should_panic(expected = "empty batch")]
    fn test_empty_batch_panics() {
        aggregate(&[]);
    }
}
