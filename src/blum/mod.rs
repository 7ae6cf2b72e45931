//! Blum game service integration and API client.
//!
//! This module provides every component needed to drive one authenticated
//! session against the Blum game service: authentication, balance queries,
//! farming, referrals, tasks and the game-play loop.
//!
//! # Modules
//!
//! - `requester` - HTTP client shared by every component, injects the bearer header
//! - `token` - In-memory token store shared through the requester
//! - `auth` - Login, registration and token refresh
//! - `queries` - Read-only balance and farming window queries
//! - `farming` - Farming start/claim and the daily reward
//! - `referral` - Friend balance, referral code and friend reward claim
//! - `tasks` - Task listing, start and claim
//! - `game` - Game client and the play-pass state machine
//! - `delay` - Injectable sleep strategy
//! - `retry` - Single retry policy for transient HTTP failures
//! - `identity` - Identity payload providers
//! - `client` - Assembles the components of one account session
//! - `response_structs` - Internal data structures for API responses
//! - `structs` - Public data structures exposed by the components
//!
//! # Examples
//!
//! ```no_run
//! use blumbot::blum::BlumClient;
//!
//! # async fn example(config: &blumbot::config::Config) -> Result<(), anyhow::Error> {
//! let client = BlumClient::new(config, "account-1")?;
//! if client.auth.login("query_id=...").await {
//!     let balance = client.queries.balance().await?;
//!     println!("play passes: {}", balance.play_passes);
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod delay;
mod farming;
mod game;
mod identity;
mod queries;
mod referral;
mod requester;
mod response_structs;
mod retry;
mod structs;
mod tasks;
mod token;

pub use crate::blum::client::BlumClient;
pub use crate::blum::delay::{Delay, TokioDelay};
pub use crate::blum::game::StopReason;
pub use crate::blum::identity::{IdentityProvider, StaticIdentity};
pub use crate::blum::structs::{Balance, DailyReward, TaskStatus};

use reqwest::StatusCode;

/// Errors returned by requests to the Blum service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A field required by the operation is absent from the response.
    #[error("missing field `{0}` in response")]
    MissingField(&'static str),

    /// An authenticated call was attempted before login.
    #[error("not authenticated")]
    NotAuthenticated,
}

/// Errors returned by account registration.
///
/// The two business variants are told apart from the response body; the
/// caller reacts to each one with a different account or referral strategy.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    /// The referral code reached its usage cap.
    #[error("referral token limit reached")]
    ReferralLimit,

    /// The identity is already bound to another account.
    #[error("account already connected")]
    AccountAlreadyLinked,

    /// Any other failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}
