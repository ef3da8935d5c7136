use owo_colors::OwoColorize;

use crate::report::finding::{ScanReport, Severity};

/// Render a scan report to the terminal with colors
pub fn render(report: &ScanReport) {
    println!();
    println!(
        "{}  verscout v{} — Scanned {} responses from {} hosts in {:.2}s",
        "🔍".bold(),
        report.version,
        report.responses_scanned,
        report.hosts,
        report.duration_ms as f64 / 1000.0
    );
    println!();

    if report.findings.is_empty() {
        println!("  {}  No new version disclosures found!", "✅".bold());
        println!();
        return;
    }

    for finding in &report.findings {
        let severity_display = format!(" {} ", finding.severity);
        let severity_colored = match finding.severity {
            Severity::High => severity_display.on_red().white().bold().to_string(),
            Severity::Medium => severity_display.on_yellow().black().bold().to_string(),
            Severity::Low => severity_display.on_blue().white().bold().to_string(),
            Severity::Info => severity_display.on_white().black().to_string(),
        };

        println!(
            "  {}  {}  {}",
            severity_colored,
            finding.host.bold(),
            finding.source.as_deref().unwrap_or("").dimmed(),
        );
        println!(
            "           {} ({} confidence)",
            finding.title.bold(),
            finding.confidence.to_string().to_lowercase()
        );

        // Evidence (max 120 chars per match)
        for (text, range) in finding.evidence.iter().zip(&finding.highlights) {
            let trimmed = if text.chars().count() > 120 {
                format!("{}…", text.chars().take(119).collect::<String>())
            } else {
                text.clone()
            };
            println!(
                "           → {} {}",
                trimmed.dimmed(),
                format!("[{}..{}]", range.start, range.end).dimmed()
            );
        }
        println!();
    }

    // Summary bar
    println!("{}", "━".repeat(60));

    let mut summary_parts = Vec::new();
    if report.summary.high > 0 {
        summary_parts.push(format!("{} high", report.summary.high).red().bold().to_string());
    }
    if report.summary.medium > 0 {
        summary_parts.push(
            format!("{} medium", report.summary.medium).yellow().bold().to_string(),
        );
    }
    if report.summary.low > 0 {
        summary_parts.push(format!("{} low", report.summary.low).blue().to_string());
    }
    if report.summary.info > 0 {
        summary_parts.push(format!("{} info", report.summary.info).white().to_string());
    }

    println!(
        " Found {} findings ({} raw matches): {}",
        report.summary.total.to_string().bold(),
        report.raw_matches,
        summary_parts.join(", ")
    );

    if report.responses_skipped > 0 {
        println!(
            " ({} responses skipped)",
            report.responses_skipped.to_string().dimmed()
        );
    }

    println!("{}", "━".repeat(60));
    println!();
}
