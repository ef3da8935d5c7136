use crate::consolidate::Match;
use crate::report::finding::Highlight;

/// Order matches by position: start, then end, then rule name.
///
/// The result depends only on the matches themselves, never on the order the
/// scanner produced them in.
pub fn rank(mut matches: Vec<Match>) -> Vec<Match> {
    matches.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.end.cmp(&b.end))
            .then_with(|| a.match_type.cmp(&b.match_type))
    });
    matches
}

/// One highlight per match, in the given order. Overlapping or nested
/// ranges are kept as they are.
pub fn highlight_ranges(ranked: &[Match]) -> Vec<Highlight> {
    ranked
        .iter()
        .map(|m| Highlight {
            start: m.start,
            end: m.end,
        })
        .collect()
}
