use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::models::Platform;

#[derive(Parser, Debug, Clone)]
#[command(name = "mobile-phish", version, about = "Measure mobile browser phishing protection on BrowserStack Automate")]
pub struct Cli {
    /// Configuration file (default: ./config.yml, then the user config directory)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Verbose human output
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue, global = true)]
    pub verbose: bool,

    /// Debug logs (implies verbose)
    #[arg(short = 'd', long = "debug", action = ArgAction::SetTrue, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the test script over every batch of targets
    Exec,

    /// Fetch the browser matrix and write batch files for a platform
    GenerateTargets {
        #[arg(short = 'p', long = "platform", value_enum)]
        platform: Platform,

        /// Browser version lists used to scope desktop targets
        #[arg(long = "versions", value_name = "FILE")]
        versions: Option<PathBuf>,
    },

    /// Extract per-URL outcomes from session logs
    SaveOutcome(SessionSelector),

    /// Download raw session logs
    SaveLogs(SessionSelector),

    /// Extract outcomes and download raw logs in one pass
    SaveAll(SessionSelector),

    /// Write the latest desktop browser versions to the targets directory
    ScopeVersions,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
#[group(required = true, multiple = false)]
pub struct SessionSelector {
    /// A single session id
    #[arg(short = 's', long = "session-id", value_name = "SESSION_ID")]
    pub session_id: Option<String>,

    /// Every session of the builds whose name contains this string
    #[arg(short = 'u', long = "unique-id", value_name = "BUILD_FRAGMENT")]
    pub unique_id: Option<String>,
}
