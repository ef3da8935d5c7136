use crate::consolidate::Match;

/// Title shared by every version disclosure finding
pub const FINDING_TITLE: &str = "Software Version Numbers Revealed";

const PREAMBLE: &str = "The server software versions used by the application are revealed by the web server.\n\
Displaying version information could allow an attacker to determine which vulnerabilities are present in the software, \
particularly if an outdated version with published vulnerabilities is in use.\n\n\
The following software appears to be in use:\n";

/// Build the detail text of a finding: a fixed explanation followed by one
/// bullet per match, in the given order.
pub fn render(ranked: &[Match]) -> String {
    let mut detail = String::with_capacity(PREAMBLE.len() + ranked.len() * 64);
    detail.push_str(PREAMBLE);
    for m in ranked {
        detail.push_str("\n- ");
        detail.push_str(&m.match_type);
        detail.push_str(": ");
        detail.push_str(&m.capture);
    }
    detail
}
