//! Bot module running the configured accounts against the Blum service.
//!
//! This module provides the main [`Bot`] implementation. It builds one
//! [`BlumClient`] per account and drives it through the selected command.
//!
//! # Overview
//!
//! Accounts are processed one after the other, with a random pause between
//! two accounts. Each account gets its own session: its own connection pool
//! and its own token. A failing account is logged and skipped, it never stops
//! the run.
//!
//! # Farm Flow
//!
//! ```text
//! login → daily reward → farming claim/start → friends reward → tasks → games → refresh
//! ```
//!
//! # Register Flow
//!
//! ```text
//! register(referral code) → log the referral code of the new account
//! ```

use anyhow::bail;
use log::{error, info, warn};

use crate::{
    Command,
    blum::{
        Balance, BlumClient, DailyReward, Delay, IdentityProvider, RegisterError, StaticIdentity,
        StopReason, TaskStatus, TokioDelay,
    },
    config::{Account, Config},
    utils::{now_secs, random_duration, random_username},
};

/// Runs the configured accounts.
///
/// # Examples
///
/// ```no_run
/// # use blumbot::{bot::Bot, config::Config, Command};
/// # async fn example() -> Result<(), anyhow::Error> {
/// let config = Config::load("config.yaml")?;
/// let bot = Bot::new(config);
/// bot.run(&Command::Farm).await?;
/// # Ok(())
/// # }
/// ```
pub struct Bot {
    /// Loaded configuration
    config: Config,
    /// Pauses between accounts and tasks
    delay: TokioDelay,
}

impl Bot {
    pub fn new(config: Config) -> Self {
        Bot {
            config,
            delay: TokioDelay,
        }
    }

    /// Runs the command on every account, in configuration order.
    ///
    /// # Errors
    ///
    /// Only when registration cannot go on: the referral code reached its
    /// limit and no fallback code is configured. Per-account failures are
    /// logged and skipped.
    pub async fn run(&self, command: &Command) -> Result<(), anyhow::Error> {
        if self.config.accounts.is_empty() {
            warn!("no account configured");
            return Ok(());
        }

        let mut referral_code = match command {
            Command::Register { referral_code } => Some(referral_code.clone()),
            Command::Farm => None,
        };

        for (index, account) in self.config.accounts.iter().enumerate() {
            if index > 0 {
                self.delay
                    .sleep(random_duration(&self.config.delays.account))
                    .await;
            }

            match referral_code.as_mut() {
                Some(code) => self.register_account(account, code).await?,
                None => {
                    if let Err(e) = self.farm_account(account).await {
                        error!("{} | {:#}", account.name, e);
                    }
                }
            }
        }

        info!("all accounts processed");
        Ok(())
    }

    /// Farms one account.
    async fn farm_account(&self, account: &Account) -> Result<(), anyhow::Error> {
        let mut client = BlumClient::new(&self.config, &account.name)?;
        let identity = StaticIdentity::new(&account.query);

        if !client.auth.login(&identity.payload(None).await?).await {
            bail!("skipping account, login failed");
        }

        match client.farming.claim_daily_reward().await {
            Ok(DailyReward::Claimed) => info!("{} | daily reward claimed", account.name),
            Ok(DailyReward::NotClaimed(reason)) => {
                info!("{} | daily reward not claimed: {}", account.name, reason)
            }
            Err(e) => error!("{} | daily reward failed: {}", account.name, e),
        }

        let balance = client.queries.balance().await?;
        self.farm(&client, account, &balance).await?;
        self.claim_friends(&client, account).await;

        if self.config.tasks.enabled {
            self.complete_tasks(&client, account).await;
        }

        if self.config.play.enabled {
            self.play_games(&mut client, account).await?;
        }

        client.auth.refresh().await?;
        info!("{} | done", account.name);

        Ok(())
    }

    /// Claims a mature farming window and starts a new one.
    async fn farm(
        &self,
        client: &BlumClient,
        account: &Account,
        balance: &Balance,
    ) -> Result<(), anyhow::Error> {
        let now = balance.now.unwrap_or_else(now_secs);
        let window = &balance.window;

        if !window.is_active() {
            client.farming.start().await?;
            return Ok(());
        }

        if window.is_mature(now) {
            let (timestamp, available) = client.farming.claim().await?;
            info!(
                "{} | farming claimed at {}, balance: {:?}",
                account.name, timestamp, available
            );
            client.farming.start().await?;
        } else if let Some(end_time) = window.end_time {
            info!(
                "{} | farming ends in {}s",
                account.name,
                end_time.saturating_sub(now)
            );
        }

        Ok(())
    }

    async fn claim_friends(&self, client: &BlumClient, account: &Account) {
        let (amount, can_claim) = match client.referral.friend_balance().await {
            Ok(balance) => balance,
            Err(e) => {
                error!("{} | friends balance failed: {}", account.name, e);
                return;
            }
        };

        if can_claim == Some(true) && amount.is_some_and(|a| a > 0.0) {
            if let Err(e) = client.referral.friend_claim().await {
                error!("{} | friends claim failed: {}", account.name, e);
            }
        }
    }

    /// Starts the tasks not started yet and claims the started ones.
    async fn complete_tasks(&self, client: &BlumClient, account: &Account) {
        let tasks = match client.tasks.get_tasks().await {
            Ok(tasks) => tasks,
            Err(e) => {
                error!("{} | get tasks failed: {}", account.name, e);
                return;
            }
        };

        for task in tasks {
            let result = match task.status {
                TaskStatus::Unclaimed => client.tasks.start_task(&task).await.map(|_| {
                    info!("{} | task started: {}", account.name, task.title);
                }),
                TaskStatus::Started => client.tasks.claim_task(&task).await.map(|claimed| {
                    if claimed {
                        info!("{} | task claimed: {}", account.name, task.title);
                    }
                }),
                TaskStatus::Claimed | TaskStatus::Unknown(_) => continue,
            };

            if let Err(e) = result {
                error!("{} | task {} failed: {}", account.name, task, e);
            }
            self.delay
                .sleep(random_duration(&self.config.delays.task))
                .await;
        }
    }

    /// Plays the passes available after the other rewards were collected.
    async fn play_games(
        &self,
        client: &mut BlumClient,
        account: &Account,
    ) -> Result<(), anyhow::Error> {
        let play_passes = client.queries.balance().await?.play_passes;
        info!("{} | {} play passes", account.name, play_passes);

        let report = client.game.play(play_passes).await;
        match report.stop {
            StopReason::Exhausted => info!(
                "{} | played {} games, {} points",
                account.name, report.completed, report.points
            ),
            reason => warn!(
                "{} | stopped playing after {} games ({:?}), {} passes left",
                account.name, report.completed, reason, report.remaining
            ),
        }

        Ok(())
    }

    /// Registers one account with the current referral code.
    ///
    /// When the code reached its limit, the account's own fallback code
    /// replaces it for this account and the following ones.
    async fn register_account(
        &self,
        account: &Account,
        referral_code: &mut String,
    ) -> Result<(), anyhow::Error> {
        let client = BlumClient::new(&self.config, &account.name)?;
        let identity = StaticIdentity::new(&account.query);

        loop {
            let payload = identity.payload(Some(referral_code.as_str())).await?;
            let username = random_username();

            match client
                .auth
                .register(referral_code.as_str(), &username, &payload)
                .await
            {
                Ok(()) => {
                    match client.referral.referral_code().await {
                        Ok(Some(code)) => info!("{} | referral code: {}", account.name, code),
                        Ok(None) => warn!("{} | referral code unavailable", account.name),
                        Err(e) => error!("{} | referral code failed: {}", account.name, e),
                    }
                    return Ok(());
                }
                Err(RegisterError::AccountAlreadyLinked) => {
                    warn!("{} | account already connected, skipping", account.name);
                    return Ok(());
                }
                Err(RegisterError::ReferralLimit) => match &account.referral_code {
                    Some(fallback) if fallback.as_str() != referral_code.as_str() => {
                        warn!(
                            "{} | referral code {} reached its limit, switching to {}",
                            account.name, referral_code, fallback
                        );
                        *referral_code = fallback.clone();
                    }
                    _ => bail!("referral code {} reached its limit", referral_code),
                },
                Err(RegisterError::Api(e)) => {
                    error!("{} | registration failed: {}", account.name, e);
                    return Ok(());
                }
            }
        }
    }
}
