//! Login, registration and token refresh against the Blum gateway.
//!
//! The [`AuthSession`] is the only writer of the session's
//! [`AuthContext`](crate::blum::token::AuthContext). It must succeed before any
//! other component issues requests.

use log::{debug, error, info};
use serde_json::json;

use crate::blum::{
    ApiError, RegisterError,
    requester::{BlumRequester, Host, RawResponse},
    response_structs::{AuthResponse, ErrorResponse, TokenPair},
    structs::AuthToken,
};

const PROVIDER_PATH: &str = "/auth/provider/PROVIDER_TELEGRAM_MINI_APP";
const REFRESH_PATH: &str = "/auth/refresh";

/// Body fragment sent when the referral code reached its usage cap.
const REFERRAL_LIMIT_MARKER: &str = "limit";
/// Body fragment sent when the identity is bound to another account.
const ALREADY_LINKED_MARKER: &str = "already connected";

/// Authenticates one account and keeps its token current.
pub struct AuthSession {
    /// Account name for the logs
    account: String,
    /// Requester shared with the other components
    requester: BlumRequester,
}

impl AuthSession {
    /// Create a new [AuthSession].
    ///
    /// # Arguments
    ///
    /// * `account` - Account name used in the logs.
    /// * `requester` - The requester shared by the whole session.
    pub fn new(account: &str, requester: BlumRequester) -> Self {
        AuthSession {
            account: account.to_owned(),
            requester,
        }
    }

    /// Exchanges an identity payload for a token.
    ///
    /// Returns `false` on any failure (network, status, malformed body, missing
    /// token); the failure is logged and the caller decides whether to retry.
    ///
    /// # Arguments
    ///
    /// * `identity_payload` - Opaque signed payload from the identity provider.
    pub async fn login(&self, identity_payload: &str) -> bool {
        match self.try_login(identity_payload).await {
            Ok(()) => {
                info!("{} | logged in", self.account);
                true
            }
            Err(e) => {
                error!("{} | login failed: {}", self.account, e);
                false
            }
        }
    }

    /// Registers the identity with a referral code, then installs the token.
    ///
    /// # Errors
    ///
    /// * [`RegisterError::ReferralLimit`] when the response mentions the referral limit
    /// * [`RegisterError::AccountAlreadyLinked`] when the identity is already connected
    /// * [`RegisterError::Api`] for any other failure
    ///
    /// Both business errors are reported whatever the HTTP status is.
    pub async fn register(
        &self,
        referral_code: &str,
        username: &str,
        identity_payload: &str,
    ) -> Result<(), RegisterError> {
        let body = json!({
            "query": identity_payload,
            "referralToken": referral_code,
            "username": username,
        });

        let response = self
            .requester
            .post_json(Host::Gateway, PROVIDER_PATH, &body)
            .await?;

        if let Some(err) = registration_failure(&response.body) {
            return Err(err);
        }

        self.install_from_auth_response(response).await?;
        info!("{} | registered as {}", self.account, username);

        Ok(())
    }

    /// Exchanges the stored refresh token for a new token.
    ///
    /// No retry: on failure the caller is expected to log in again.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let Some(refresh) = self.requester.auth().refresh_token().await else {
            return Err(ApiError::NotAuthenticated);
        };

        let response = self
            .requester
            .post_json(Host::Gateway, REFRESH_PATH, &json!({ "refresh": refresh }))
            .await?
            .error_for_status()?;

        let pair: TokenPair = response.json()?;
        self.install(pair).await?;
        debug!("{} | token refreshed", self.account);

        Ok(())
    }

    async fn try_login(&self, identity_payload: &str) -> Result<(), ApiError> {
        let body = json!({ "query": identity_payload });
        let response = self
            .requester
            .post_json(Host::Gateway, PROVIDER_PATH, &body)
            .await?;
        self.install_from_auth_response(response).await
    }

    async fn install_from_auth_response(&self, response: RawResponse) -> Result<(), ApiError> {
        let response = response.error_for_status()?;
        let auth: AuthResponse = response.json()?;
        let pair = auth.token.ok_or(ApiError::MissingField("token"))?;
        self.install(pair).await
    }

    async fn install(&self, pair: TokenPair) -> Result<(), ApiError> {
        let token = AuthToken {
            access: pair.access.ok_or(ApiError::MissingField("access"))?,
            refresh: pair.refresh.ok_or(ApiError::MissingField("refresh"))?,
        };
        self.requester.auth().install(token).await;
        Ok(())
    }
}

/// Recognizes the registration business errors in a response body.
///
/// The `message` field of a JSON error body is checked first, the raw body is
/// the fallback for answers without one. Both rely on wording the gateway may
/// change.
fn registration_failure(body: &str) -> Option<RegisterError> {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.message);

    [message.as_deref(), Some(body)]
        .into_iter()
        .flatten()
        .find_map(|text| {
            if text.contains(REFERRAL_LIMIT_MARKER) {
                Some(RegisterError::ReferralLimit)
            } else if text.contains(ALREADY_LINKED_MARKER) {
                Some(RegisterError::AccountAlreadyLinked)
            } else {
                None
            }
        })
}
