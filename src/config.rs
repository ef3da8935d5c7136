use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const CONFIG_FILE: &str = ".verscout.toml";

/// verscout configuration (loaded from .verscout.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerscoutConfig {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Glob patterns to exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Glob patterns to include
    #[serde(default)]
    pub include: Vec<String>,

    /// Max capture file size in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            exclude: Vec::new(),
            include: Vec::new(),
            max_file_size: default_max_file_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RulesConfig {
    /// Extra rule files, relative to the config file
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Built-in rule types to disable
    #[serde(default)]
    pub disable: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,

    /// Minimum severity to report
    #[serde(default)]
    pub min_severity: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: default_format(),
            min_severity: None,
        }
    }
}

fn default_max_file_size() -> u64 {
    16 * 1_048_576 // 16MB
}

fn default_format() -> String {
    "terminal".to_string()
}

impl VerscoutConfig {
    /// Try to load .verscout.toml from the given directory or its parents
    pub fn load(scan_path: &Path) -> Option<Self> {
        let config_path = find_config_file(scan_path)?;
        debug!("Found config: {}", config_path.display());

        match std::fs::read_to_string(&config_path) {
            Ok(content) => match Self::parse(&content, config_path.parent()) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    Some(config)
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", config_path.display(), e);
                    None
                }
            },
            Err(e) => {
                debug!("Could not read {}: {}", config_path.display(), e);
                None
            }
        }
    }

    /// The config that applies under `scan_path`: the nearest
    /// .verscout.toml, or the defaults when there is none or `no_config` is set
    pub fn resolve(scan_path: &Path, no_config: bool) -> Self {
        if no_config {
            return Self::default();
        }
        Self::load(scan_path).unwrap_or_default()
    }

    /// Parse config text; relative rule files are resolved against `base`
    pub fn parse(content: &str, base: Option<&Path>) -> Result<Self, toml::de::Error> {
        let mut config: VerscoutConfig = toml::from_str(content)?;
        if let Some(base) = base {
            for file in &mut config.rules.files {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }
        Ok(config)
    }
}

/// Walk up from the scan path to find .verscout.toml
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    if current.is_file() {
        current.pop();
    }
    loop {
        let config = current.join(CONFIG_FILE);
        if config.exists() {
            return Some(config);
        }
        if !current.pop() {
            return None;
        }
    }
}

const DEFAULT_CONFIG: &str = r#"# verscout configuration

[scan]
# Glob patterns to exclude from scanning
exclude = [
    "archive/**",
]

# Glob patterns to include (empty = every capture file)
# include = ["**/*.jsonl"]

# Max capture file size to scan (bytes). Default: 16MB
# max_file_size = 16777216

[rules]
# Extra rule files (TOML, [[rule]] tables), relative to this file
# files = ["rules/internal-apps.toml"]

# Built-in rule types to disable
# disable = ["OpenSSL"]

[output]
# Default output format: "terminal" or "json"
format = "terminal"

# Minimum severity to report: "INFO", "LOW", "MEDIUM", "HIGH"
# min_severity = "LOW"
"#;

/// Create a default .verscout.toml in the current directory
pub fn init_config() -> Result<()> {
    let config_path = std::env::current_dir()?.join(CONFIG_FILE);

    if config_path.exists() {
        println!("⚠️  {} already exists in this directory", CONFIG_FILE);
        return Ok(());
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    println!("✅ Created {}", CONFIG_FILE);
    println!("   Edit it to customize your scan settings.");

    Ok(())
}
