pub mod commands;

use clap::Parser;

pub use commands::{Commands, ListRulesArgs, ScanArgs};

/// verscout — software version disclosure scanner
///
/// Reads captured HTTP responses and reports the server and framework
/// versions they reveal, once per host.
#[derive(Parser, Debug)]
#[command(
    name = "verscout",
    version,
    about = "🔎 verscout — Software version disclosure scanner",
    long_about = "verscout scans captured HTTP responses for banners, headers and error pages\nthat reveal backend software versions.\n\nEach version string is reported once per host."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}
