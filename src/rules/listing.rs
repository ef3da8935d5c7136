use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::cli::ListRulesArgs;
use crate::config::VerscoutConfig;
use crate::rules::{self, MatchRule};

/// The rules a scan of `args.path` would run with the same flags
pub fn listed_rules(args: &ListRulesArgs) -> Result<Vec<MatchRule>> {
    let path = std::fs::canonicalize(&args.path)?;
    let config = VerscoutConfig::resolve(&path, args.no_config);
    Ok(rules::configured_rules(
        &args.rules,
        &args.disable_rule,
        &config.rules,
    )?)
}

fn rules_table(rules: &[MatchRule]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Type", "Severity", "Confidence", "Group", "Source"]);

    for rule in rules {
        table.add_row(vec![
            rule.match_type.clone(),
            rule.severity.map_or("-".to_string(), |s| s.to_string()),
            rule.confidence.map_or("-".to_string(), |c| c.to_string()),
            rule.group.to_string(),
            rule.origin.clone(),
        ]);
    }
    table
}

/// List the effective version disclosure rules
pub fn list_rules(rules: &[MatchRule]) {
    println!();
    println!("🔎 verscout — Version Disclosure Rules");
    println!();
    println!("{}", rules_table(rules));
    println!();
    println!("  {} rules loaded", rules.len());
    println!();
    println!("  Run `verscout scan <captures>` to scan captured responses");
    println!("  Run `verscout scan <captures> --rules extra.toml` to add your own rules");
    println!();
}
