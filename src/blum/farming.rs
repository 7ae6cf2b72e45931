//! Farming and daily reward.
//!
//! Farming is a time-gated passive reward: a window is started, matures after
//! a few hours and is then claimed. Start and claim are retried once on a
//! non-success status.

use log::{debug, info};

use crate::blum::{
    ApiError,
    delay::Delay,
    requester::{BlumRequester, Host},
    response_structs::FarmingClaimResponse,
    retry::retry_once,
    structs::DailyReward,
};
use crate::utils::ms_to_secs;

/// Literal body of a successful claim.
const OK_MARKER: &str = "OK";

/// Starts and claims the farming window of one account.
pub struct FarmingController<D: Delay> {
    account: String,
    requester: BlumRequester,
    delay: D,
}

impl<D: Delay> FarmingController<D> {
    pub fn new(account: &str, requester: BlumRequester, delay: D) -> Self {
        FarmingController {
            account: account.to_owned(),
            requester,
            delay,
        }
    }

    /// Request `/farming/start`, once more after a second on a non-success status.
    ///
    /// The response body is not inspected.
    pub async fn start(&self) -> Result<(), ApiError> {
        let response = retry_once(&self.delay, "farming start", || {
            self.requester.post(Host::Game, "/farming/start")
        })
        .await?;

        info!("{} | farming started ({})", self.account, response.status);
        Ok(())
    }

    /// Request `/farming/claim`, once more after a second on a non-success status.
    ///
    /// This api call returns a json object such as:
    /// ```text
    /// { availableBalance: "1234.5", timestamp: 1700000000123 }
    /// ```
    ///
    /// # Returns
    ///
    /// The reward timestamp in seconds and the new available balance.
    ///
    /// # Errors
    ///
    /// [`ApiError::MissingField`] when the final response has no timestamp.
    pub async fn claim(&self) -> Result<(i64, Option<f64>), ApiError> {
        let response = retry_once(&self.delay, "farming claim", || {
            self.requester.post(Host::Game, "/farming/claim")
        })
        .await?;

        let claim: FarmingClaimResponse = response.json()?;
        let timestamp = claim.timestamp.ok_or(ApiError::MissingField("timestamp"))?;
        let balance = claim.available_balance.map(|a| a.0);

        info!(
            "{} | farming claimed, balance: {}",
            self.account,
            balance.map_or("unknown".to_owned(), |b| b.to_string())
        );

        Ok((ms_to_secs(timestamp), balance))
    }

    /// Request `/daily-reward?offset=-180`.
    ///
    /// The service answers `OK` when the reward is granted and an explanation
    /// otherwise, usually because it was already claimed today.
    pub async fn claim_daily_reward(&self) -> Result<DailyReward, ApiError> {
        let response = self
            .requester
            .post(Host::Game, "/daily-reward?offset=-180")
            .await?;

        debug!("{} | daily reward -> {}", self.account, response.body);

        if response.body == OK_MARKER {
            Ok(DailyReward::Claimed)
        } else {
            Ok(DailyReward::NotClaimed(response.body))
        }
    }
}
