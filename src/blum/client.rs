use crate::blum::{
    ApiError,
    auth::AuthSession,
    delay::TokioDelay,
    farming::FarmingController,
    game::{GameClient, GamePlaySession, PlaySettings},
    queries::ResourceQueries,
    referral::ReferralController,
    requester::BlumRequester,
    tasks::TaskClient,
    token::AuthContext,
};
use crate::config::Config;

/// Session of one account.
///
/// Every component shares the same [`BlumRequester`], hence the same
/// connection pool and [`AuthContext`]. `auth` has to log in before the other
/// components are used.
pub struct BlumClient {
    pub auth: AuthSession,
    pub queries: ResourceQueries,
    pub farming: FarmingController<TokioDelay>,
    pub referral: ReferralController<TokioDelay>,
    pub tasks: TaskClient,
    pub game: GamePlaySession<GameClient<TokioDelay>, TokioDelay>,
}

impl BlumClient {
    /// Create the session of an account.
    ///
    /// # Arguments
    ///
    /// * `config` - The bot configuration.
    /// * `account` - Account name used in the logs.
    pub fn new(config: &Config, account: &str) -> Result<Self, ApiError> {
        let requester = BlumRequester::new(&config.service, AuthContext::new())?;

        Ok(BlumClient {
            auth: AuthSession::new(account, requester.clone()),
            queries: ResourceQueries::new(account, requester.clone()),
            farming: FarmingController::new(account, requester.clone(), TokioDelay),
            referral: ReferralController::new(account, requester.clone(), TokioDelay),
            tasks: TaskClient::new(account, requester.clone()),
            game: GamePlaySession::new(
                account,
                GameClient::new(requester, TokioDelay, config.points),
                TokioDelay,
                PlaySettings::from(config),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blum::game::PlayState;

    #[tokio::test]
    async fn test_components_share_the_auth_context() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/provider/PROVIDER_TELEGRAM_MINI_APP")
            .with_status(200)
            .with_body(r#"{"token": {"access": "acc", "refresh": "ref"}}"#)
            .create_async()
            .await;
        let balance = server
            .mock("GET", "/user/balance")
            .match_header("authorization", "Bearer acc")
            .with_status(200)
            .with_body(r#"{"availableBalance": "1", "playPasses": 2, "timestamp": 1000}"#)
            .expect(1)
            .create_async()
            .await;

        let mut config = Config::default();
        config.service.game_url = server.url();
        config.service.gateway_url = server.url();

        let client = BlumClient::new(&config, "alice").unwrap();
        assert_eq!(client.game.state(), &PlayState::Idle);
        assert!(client.auth.login("query_id=AAA").await);

        let result = client.queries.balance().await.unwrap();

        assert_eq!(result.play_passes, 2);
        balance.assert_async().await;
    }
}
