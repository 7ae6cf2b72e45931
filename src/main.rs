//! Blumbot - A client for the Blum game service.
//!
//! This is the main entry point for the bot, which runs a list of accounts
//! against the Blum game service: farming, rewards, tasks and games.
//!
//! # Overview
//!
//! Each configured account gets its own session: it logs in with its identity
//! payload, collects the daily and farming rewards, claims the friends reward,
//! completes the tasks and spends its play passes. Accounts are run one after
//! the other with a random pause in between.
//!
//! # Configuration
//!
//! Create a `config.yaml` file with your settings:
//!
//! ```yaml
//! points: [190, 230]
//!
//! play:
//!   max_retries: 10
//!
//! accounts:
//!   - name: "alice"
//!     query: "query_id=...&user=...&hash=..."
//! ```
//!
//! See the [`config`] module for every setting and its default.
//!
//! # Environment Variable Overrides
//!
//! Override any configuration value using environment variables with the `BLUMBOT_` prefix:
//!
//! ```bash
//! export BLUMBOT_SERVICE__TIMEOUT_SECS=30
//! export BLUMBOT_PLAY__ENABLED=false
//! ```
//!
//! # Usage
//!
//! ```bash
//! blumbot --config config.yaml
//! blumbot --config config.yaml register --referral-code abcd1234
//! ```
//!
//! # Architecture
//!
//! - [`blum`] - Blum service client: auth, queries, farming, referral, tasks and games
//! - [`bot`] - Runs the accounts through the selected command
//! - [`config`] - YAML configuration file structures and loading with environment variable support
//! - [`utils`] - Random pacing and timestamp helpers
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)
//!   - Set to `debug` for request and response logs

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info};

use crate::{bot::Bot, config::Config};

mod blum;
mod bot;
mod config;
mod utils;

/// Command-line arguments for the bot.
///
/// # Examples
///
/// ```bash
/// blumbot --config config.yaml farm
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// Environment variables prefixed with `BLUMBOT_` override its values.
    #[arg(short, long)]
    config: String,

    /// Action to run on every account, `farm` when omitted.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Action run on every account.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Collect rewards, complete tasks and play games
    Farm,
    /// Register the accounts with a referral code
    Register {
        /// Referral code to register with
        #[arg(short, long)]
        referral_code: String,
    },
}

/// Main entry point for the bot.
///
/// 1. **Logging Setup**: `info` level by default, overridden by `RUST_LOG`
/// 2. **Argument Parsing**: Parses command-line arguments using `clap`
/// 3. **Configuration Loading**: Reads the YAML file and the environment overrides
/// 4. **Bot Execution**: Runs the command on every account
///
/// Configuration errors are logged and end the process without panicking.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug blumbot --config config.yaml
/// ```
#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting blumbot {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config file: {}", e);
            return;
        }
    };

    let bot = Bot::new(config);
    if let Err(e) = bot.run(&args.command.unwrap_or(Command::Farm)).await {
        error!("{:#}", e);
    }
}
