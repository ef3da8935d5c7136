use crate::report::finding::{Confidence, Severity};
use crate::rules::MatchRule;

const BUILTIN: &str = "built-in";

struct Builtin {
    match_type: &'static str,
    pattern: &'static str,
    severity: Severity,
    confidence: Confidence,
}

/// Built-in version disclosure signatures. Every pattern captures the
/// version-bearing part in group 1, and runs with Unicode off so that its
/// classes also match bytes that are not valid UTF-8.
const BUILTINS: &[Builtin] = &[
    // ── Response headers ─────────────────────────────
    Builtin {
        match_type: "Server header",
        pattern: r"(?im-u)^Server:[ \t]*([^\r\n]*[0-9][^\r\n]*)",
        severity: Severity::Low,
        confidence: Confidence::Certain,
    },
    Builtin {
        match_type: "X-Powered-By",
        pattern: r"(?im-u)^X-Powered-By:[ \t]*([^\r\n]*[0-9][^\r\n]*)",
        severity: Severity::Low,
        confidence: Confidence::Certain,
    },
    Builtin {
        match_type: "ASP.NET version",
        pattern: r"(?im-u)^X-AspNet-Version:[ \t]*([^\r\n]+)",
        severity: Severity::Low,
        confidence: Confidence::Certain,
    },
    Builtin {
        match_type: "ASP.NET MVC version",
        pattern: r"(?im-u)^X-AspNetMvc-Version:[ \t]*([^\r\n]+)",
        severity: Severity::Low,
        confidence: Confidence::Certain,
    },
    Builtin {
        match_type: "X-Generator",
        pattern: r"(?im-u)^X-Generator:[ \t]*([^\r\n]*[0-9][^\r\n]*)",
        severity: Severity::Info,
        confidence: Confidence::Certain,
    },
    // ── Error pages ──────────────────────────────────
    Builtin {
        match_type: "Apache Tomcat",
        pattern: r"(?-u)(Apache Tomcat/[0-9][0-9A-Za-z.\-]*)",
        severity: Severity::Low,
        confidence: Confidence::Firm,
    },
    Builtin {
        match_type: "Apache error page",
        pattern: r"(?-u)<address>(Apache/[0-9][^<]*)</address>",
        severity: Severity::Low,
        confidence: Confidence::Firm,
    },
    Builtin {
        match_type: "nginx error page",
        pattern: r"(?-u)<center>(nginx/[0-9][0-9.]*)</center>",
        severity: Severity::Low,
        confidence: Confidence::Firm,
    },
    Builtin {
        match_type: "ASP.NET error page",
        pattern: r"(?-u)Microsoft \.NET Framework Version:[ \t]*([0-9][0-9.]*)",
        severity: Severity::Low,
        confidence: Confidence::Firm,
    },
    Builtin {
        match_type: "JBoss",
        pattern: r"(?-u)((?:JBoss|WildFly)[A-Za-z \-]*/[0-9][0-9A-Za-z.\-]*)",
        severity: Severity::Low,
        confidence: Confidence::Firm,
    },
    Builtin {
        match_type: "Jetty",
        pattern: r"(?-u)(Jetty\([0-9][^)\r\n]*\))",
        severity: Severity::Low,
        confidence: Confidence::Firm,
    },
    // ── Body content ─────────────────────────────────
    Builtin {
        match_type: "Generator meta tag",
        pattern: r#"(?i-u)<meta\s+name=["']generator["']\s+content=["']([^"']*[0-9][^"']*)["']"#,
        severity: Severity::Info,
        confidence: Confidence::Firm,
    },
    Builtin {
        match_type: "OpenSSL",
        pattern: r"(?-u)(OpenSSL/[0-9][0-9A-Za-z.\-]*)",
        severity: Severity::Low,
        confidence: Confidence::Tentative,
    },
];

/// The built-in rule set, in a fixed order
pub fn builtin_rules() -> Vec<MatchRule> {
    BUILTINS
        .iter()
        .map(|b| {
            MatchRule::new(
                b.match_type,
                b.pattern,
                Some(1),
                Some(b.severity),
                Some(b.confidence),
                BUILTIN,
            )
            .unwrap()
        })
        .collect()
}
