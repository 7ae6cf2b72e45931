//! HTTP client for the Blum service.
//!
//! This module provides the [`BlumRequester`] shared by every component of a
//! session. It owns the reqwest client and reads the bearer header from the
//! session's [`AuthContext`] on every request.

use std::time::Duration;

use log::debug;
use reqwest::{
    Client, RequestBuilder, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::blum::{ApiError, token::AuthContext};
use crate::config::Service;
use crate::utils::random_user_agent;

/// Host an endpoint lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    /// Game host: tasks, farming, game, balance
    Game,
    /// Gateway host: auth and friends
    Gateway,
}

/// Status and body of a response.
///
/// The body is kept as text because several endpoints answer with a plain
/// `OK` and registration errors are recognized from the raw body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Turns a non-success status into [`ApiError::Status`].
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// HTTP client shared by the components of one session.
///
/// Cloning is cheap and keeps the same connection pool and [`AuthContext`].
///
/// # Examples
///
/// ```no_run
/// # use blumbot::blum::requester::{BlumRequester, Host};
/// # use blumbot::blum::token::AuthContext;
/// # async fn example(service: &blumbot::config::Service) -> Result<(), blumbot::blum::ApiError> {
/// let requester = BlumRequester::new(service, AuthContext::new())?;
/// let response = requester.get(Host::Game, "/user/balance").await?;
/// println!("{}", response.body);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BlumRequester {
    /// Base URL of the game host
    game_url: String,
    /// Base URL of the gateway host
    gateway_url: String,
    /// Token store of the session
    auth: AuthContext,
    /// HTTP client
    client: Client,
}

impl BlumRequester {
    /// Create a new [BlumRequester].
    ///
    /// # Arguments
    ///
    /// * `service` - Base URLs, TLS and timeout settings.
    /// * `auth` - The token store of the session.
    pub fn new(service: &Service, auth: AuthContext) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        let user_agent = service.user_agent.clone().unwrap_or_else(random_user_agent);
        if let Ok(user_agent) = HeaderValue::from_str(&user_agent) {
            headers.insert(USER_AGENT, user_agent);
        }

        let client = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(service.accept_invalid_certs)
            .timeout(Duration::from_secs(service.timeout_secs))
            .build()?;

        Ok(BlumRequester {
            game_url: service.game_url.clone(),
            gateway_url: service.gateway_url.clone(),
            auth,
            client,
        })
    }

    /// The token store read by every request.
    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn url(&self, host: Host, path: &str) -> String {
        match host {
            Host::Game => format!("{}{}", self.game_url, path),
            Host::Gateway => format!("{}{}", self.gateway_url, path),
        }
    }

    pub async fn get(&self, host: Host, path: &str) -> Result<RawResponse, ApiError> {
        let url = self.url(host, path);
        self.send(self.client.get(&url), &url).await
    }

    /// Issues a POST without body.
    pub async fn post(&self, host: Host, path: &str) -> Result<RawResponse, ApiError> {
        let url = self.url(host, path);
        self.send(self.client.post(&url), &url).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        host: Host,
        path: &str,
        body: &B,
    ) -> Result<RawResponse, ApiError> {
        let url = self.url(host, path);
        self.send(self.client.post(&url).json(body), &url).await
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<RawResponse, ApiError> {
        debug!("request {}", url);

        // Read at call time so a refresh applies to the very next request
        let request = match self.auth.bearer().await {
            Some(bearer) => request.header(AUTHORIZATION, bearer),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!("response from {} -> {} {}", url, status, body);

        Ok(RawResponse { status, body })
    }
}
