//! Read-only account queries.

use log::debug;

use crate::blum::{
    ApiError,
    requester::{BlumRequester, Host},
    response_structs::BalanceResponse,
    structs::{Balance, FarmingWindow},
};
use crate::utils::ms_to_secs;

/// Fetches the balance, farming window and play passes of the account.
pub struct ResourceQueries {
    account: String,
    requester: BlumRequester,
}

impl ResourceQueries {
    pub fn new(account: &str, requester: BlumRequester) -> Self {
        ResourceQueries {
            account: account.to_owned(),
            requester,
        }
    }

    /// Request `/user/balance`.
    ///
    /// This api call returns a json object such as:
    /// ```text
    /// {
    ///   availableBalance: "1234.5",
    ///   playPasses: 3,
    ///   timestamp: 1700000000123,
    ///   farming: { startTime: 1699990000000, endTime: 1700018800000, balance: "12.3" }
    /// }
    /// ```
    /// Timestamps are converted to seconds. `farming` is absent when farming is
    /// not active, and so are the window bounds of the returned [`Balance`].
    ///
    /// # Errors
    ///
    /// A non-success status is returned as [`ApiError::Status`]; this endpoint
    /// is not retried.
    pub async fn balance(&self) -> Result<Balance, ApiError> {
        let response = self
            .requester
            .get(Host::Game, "/user/balance")
            .await?
            .error_for_status()?;
        let balance: BalanceResponse = response.json()?;

        debug!("{} | balance {:?}", self.account, balance);

        let (start_time, end_time) = match balance.farming {
            Some(farming) => (
                farming.start_time.map(ms_to_secs),
                farming.end_time.map(ms_to_secs),
            ),
            None => (None, None),
        };

        Ok(Balance {
            now: balance.timestamp.map(ms_to_secs),
            window: FarmingWindow {
                start_time,
                end_time,
                available_balance: balance.available_balance.map(|a| a.0),
            },
            play_passes: balance.play_passes.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blum::requester::tests::requester_for;

    async fn balance_for(body: &str) -> Balance {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/user/balance")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let queries = ResourceQueries::new("alice", requester_for(&server.url()));
        queries.balance().await.unwrap()
    }

    #[tokio::test]
    async fn test_balance_with_farming() {
        let balance = balance_for(
            r#"{"availableBalance": "1234.5", "playPasses": 3, "timestamp": 1700000000999,
                "farming": {"startTime": 1699990000500, "endTime": 1700018800000, "balance": "12.3"}}"#,
        )
        .await;

        assert_eq!(balance.now, Some(1_700_000_000));
        assert_eq!(balance.window.start_time, Some(1_699_990_000));
        assert_eq!(balance.window.end_time, Some(1_700_018_800));
        assert_eq!(balance.window.available_balance, Some(1234.5));
        assert_eq!(balance.play_passes, 3);
    }

    #[tokio::test]
    async fn test_balance_without_farming() {
        let balance =
            balance_for(r#"{"availableBalance": "10", "playPasses": 0, "timestamp": 1700000000000}"#)
                .await;

        assert_eq!(balance.now, Some(1_700_000_000));
        assert!(balance.window.start_time.is_none());
        assert!(balance.window.end_time.is_none());
        assert!(!balance.window.is_active());
        assert_eq!(balance.play_passes, 0);
    }

    #[tokio::test]
    async fn test_balance_window_at_epoch_is_not_absent() {
        let balance =
            balance_for(r#"{"timestamp": 5000, "farming": {"startTime": 0, "endTime": 999}}"#).await;

        assert_eq!(balance.window.start_time, Some(0));
        assert_eq!(balance.window.end_time, Some(0));
        assert!(balance.window.is_active());
    }

    #[tokio::test]
    async fn test_balance_error_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/user/balance")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let queries = ResourceQueries::new("alice", requester_for(&server.url()));
        let result = queries.balance().await;

        assert!(matches!(result, Err(ApiError::Status { .. })));
        mock.assert_async().await;
    }
}
