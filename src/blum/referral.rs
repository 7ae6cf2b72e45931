//! Referral rewards and referral code.
//!
//! Every call follows the same pattern: issue the request, and on a
//! non-success status wait a second and issue it once more. The fields are
//! read from the last response; a second failure gives absent fields rather
//! than an error.

use log::{debug, info, warn};

use crate::blum::{
    ApiError,
    delay::Delay,
    requester::{BlumRequester, Host, RawResponse},
    response_structs::{FriendBalanceResponse, FriendClaimResponse},
    retry::retry_once,
    structs::ReferralState,
};

const FRIENDS_BALANCE_PATH: &str = "/friends/balance";
const FRIENDS_CLAIM_PATH: &str = "/friends/claim";

/// Claims the rewards accrued from invited accounts.
pub struct ReferralController<D: Delay> {
    account: String,
    requester: BlumRequester,
    delay: D,
}

impl<D: Delay> ReferralController<D> {
    pub fn new(account: &str, requester: BlumRequester, delay: D) -> Self {
        ReferralController {
            account: account.to_owned(),
            requester,
            delay,
        }
    }

    /// Request `/friends/balance` and read the claimable reward.
    ///
    /// This api call returns a json object such as:
    /// ```text
    /// { amountForClaim: "12.5", canClaim: true, referralToken: "abcd1234", usedInvitation: 3 }
    /// ```
    ///
    /// # Returns
    ///
    /// The claimable amount and whether it can be claimed now.
    pub async fn friend_balance(&self) -> Result<(Option<f64>, Option<bool>), ApiError> {
        let state = self.referral_state().await?;
        Ok((state.amount_for_claim, state.can_claim))
    }

    /// Request `/friends/balance` and read the referral code of the account.
    pub async fn referral_code(&self) -> Result<Option<String>, ApiError> {
        let state = self.referral_state().await?;
        Ok(state.referral_token)
    }

    /// Request `/friends/balance` and read the whole [`ReferralState`].
    pub async fn referral_state(&self) -> Result<ReferralState, ApiError> {
        let response = retry_once(&self.delay, "friends balance", || {
            self.requester.get(Host::Gateway, FRIENDS_BALANCE_PATH)
        })
        .await?;

        let Some(balance) = self.decode::<FriendBalanceResponse>(&response) else {
            return Ok(ReferralState::default());
        };
        debug!("{} | friends balance {:?}", self.account, balance);

        Ok(ReferralState {
            referral_token: balance.referral_token,
            amount_for_claim: balance.amount_for_claim.map(|a| a.0),
            can_claim: balance.can_claim,
        })
    }

    /// Request `/friends/claim`.
    ///
    /// # Returns
    ///
    /// The claimed amount, absent when the service did not report it.
    pub async fn friend_claim(&self) -> Result<Option<f64>, ApiError> {
        let response = retry_once(&self.delay, "friends claim", || {
            self.requester.post(Host::Gateway, FRIENDS_CLAIM_PATH)
        })
        .await?;

        let amount = self
            .decode::<FriendClaimResponse>(&response)
            .and_then(|claim| claim.claim_balance)
            .map(|a| a.0);

        if let Some(amount) = amount {
            info!("{} | claimed {} from friends", self.account, amount);
        }

        Ok(amount)
    }

    /// Decodes the final response, `None` when it failed or is not the expected json.
    fn decode<T: serde::de::DeserializeOwned>(&self, response: &RawResponse) -> Option<T> {
        if !response.is_success() {
            warn!(
                "{} | friends request still failing after retry: {} {}",
                self.account, response.status, response.body
            );
        }

        match response.json() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{} | unexpected friends response: {}", self.account, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blum::delay::NoDelay;
    use crate::blum::requester::tests::requester_for;

    fn controller(url: &str) -> ReferralController<NoDelay> {
        ReferralController::new("alice", requester_for(url), NoDelay)
    }

    const BALANCE_BODY: &str =
        r#"{"amountForClaim": "12.5", "canClaim": true, "referralToken": "abcd1234"}"#;

    #[tokio::test]
    async fn test_friend_balance() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", FRIENDS_BALANCE_PATH)
            .with_status(200)
            .with_body(BALANCE_BODY)
            .expect(1)
            .create_async()
            .await;

        let (amount, can_claim) = controller(&server.url()).friend_balance().await.unwrap();

        assert_eq!(amount, Some(12.5));
        assert_eq!(can_claim, Some(true));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_friend_balance_retries_once_and_reads_retried_response() {
        let mut server = mockito::Server::new_async().await;
        let failing = server
            .mock("GET", FRIENDS_BALANCE_PATH)
            .with_status(500)
            .with_body(r#"{"amountForClaim": "999", "canClaim": false}"#)
            .expect(1)
            .create_async()
            .await;
        let retried = server
            .mock("GET", FRIENDS_BALANCE_PATH)
            .with_status(200)
            .with_body(BALANCE_BODY)
            .expect(1)
            .create_async()
            .await;

        let (amount, can_claim) = controller(&server.url()).friend_balance().await.unwrap();

        assert_eq!(amount, Some(12.5));
        assert_eq!(can_claim, Some(true));
        failing.assert_async().await;
        retried.assert_async().await;
    }

    #[tokio::test]
    async fn test_friend_balance_second_failure_gives_partial_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", FRIENDS_BALANCE_PATH)
            .with_status(500)
            .with_body(r#"{"canClaim": false}"#)
            .expect(2)
            .create_async()
            .await;

        let (amount, can_claim) = controller(&server.url()).friend_balance().await.unwrap();

        assert_eq!(amount, None);
        assert_eq!(can_claim, Some(false));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_referral_code() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", FRIENDS_BALANCE_PATH)
            .with_status(200)
            .with_body(BALANCE_BODY)
            .create_async()
            .await;

        let code = controller(&server.url()).referral_code().await.unwrap();
        assert_eq!(code.as_deref(), Some("abcd1234"));
    }

    #[tokio::test]
    async fn test_referral_code_non_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", FRIENDS_BALANCE_PATH)
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .expect(2)
            .create_async()
            .await;

        let code = controller(&server.url()).referral_code().await.unwrap();

        assert!(code.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_friend_claim() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", FRIENDS_CLAIM_PATH)
            .with_status(200)
            .with_body(r#"{"claimBalance": "12.5"}"#)
            .create_async()
            .await;

        let amount = controller(&server.url()).friend_claim().await.unwrap();
        assert_eq!(amount, Some(12.5));
    }

    #[tokio::test]
    async fn test_friend_claim_retries_exactly_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", FRIENDS_CLAIM_PATH)
            .with_status(429)
            .with_body(r#"{"message": "too many requests"}"#)
            .expect(2)
            .create_async()
            .await;

        let amount = controller(&server.url()).friend_claim().await.unwrap();

        assert!(amount.is_none());
        mock.assert_async().await;
    }
}
