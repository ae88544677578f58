//! CLI module for shop-auth
//!
//! Command-line parsing for the `shop-auth` binary, using clap.

use crate::auth::jwt::Subject;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// shop-auth - stateless token authentication service
#[derive(Parser, Debug)]
#[command(
    name = "shop-auth",
    version,
    about = "Stateless token authentication service",
    long_about = "Issues signed session tokens at login/registration and verifies them on\n\
                  every request without server-side session storage.\n\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  shop-auth                          # Start the server (requires shop.toml)\n    \
                  shop-auth --config my.toml serve   # Use a custom config file\n    \
                  shop-auth issue-token 42           # Print a token for user 42\n    \
                  shop-auth config --validate        # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "shop.toml", env = "SHOP_CONFIG", global = true)]
    pub config: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Issue a token for a subject using the configured secret
    IssueToken {
        /// Subject identifier; integers are encoded as JSON numbers
        subject: String,
    },

    /// Show configuration information
    Config {
        /// Only validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Interpret a command-line subject: integers become numeric subjects.
pub fn parse_subject(raw: &str) -> Subject {
    raw.parse::<i64>()
        .map(Subject::from)
        .unwrap_or_else(|_| Subject::from(raw))
}
