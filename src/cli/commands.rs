use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan captured HTTP responses for version disclosures
    Scan(ScanArgs),

    /// Initialize a .verscout.toml config file in the current directory
    Init,

    /// List the version disclosure rules
    ListRules(ListRulesArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScanArgs {
    /// Capture file or directory to scan (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format: "terminal" or "json" (overrides config)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Write report to file
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Fail (exit code 1) if findings at or above this severity are found.
    /// Values: HIGH, MEDIUM, LOW, INFO
    #[arg(long)]
    pub fail_on: Option<String>,

    /// Only report findings at or above this severity (overrides config)
    #[arg(long)]
    pub min_severity: Option<String>,

    /// Maximum capture file size in bytes (skip larger files)
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Glob patterns to include (can be repeated)
    #[arg(long)]
    pub include: Vec<String>,

    /// Glob patterns to exclude (can be repeated)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Extra rule files (can be repeated)
    #[arg(long = "rules")]
    pub rules: Vec<PathBuf>,

    /// Built-in rule types to disable (can be repeated)
    #[arg(long)]
    pub disable_rule: Vec<String>,

    /// Ignore .verscout.toml config files found near the scanned path.
    #[arg(long)]
    pub no_config: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ListRulesArgs {
    /// Directory whose .verscout.toml applies (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Extra rule files to include in the listing (can be repeated)
    #[arg(long = "rules")]
    pub rules: Vec<PathBuf>,

    /// Built-in rule types to leave out (can be repeated)
    #[arg(long)]
    pub disable_rule: Vec<String>,

    /// Ignore .verscout.toml config files found near the path.
    #[arg(long)]
    pub no_config: bool,
}
