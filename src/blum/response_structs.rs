//! Response structures for Blum API endpoints.
//!
//! This module contains structures for deserializing JSON responses from
//! the game and gateway hosts. Every field the service may omit is optional.

use serde::{Deserialize, Deserializer, de};

/// Numeric amount sent either as a JSON number or as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amount(pub f64);

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Amount(value)),
            Raw::Text(text) => text.trim().parse().map(Amount).map_err(de::Error::custom),
        }
    }
}

/// Token pair from the auth provider and `/auth/refresh`.
#[derive(Deserialize, Debug)]
pub struct TokenPair {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

/// Response from `/auth/provider/PROVIDER_TELEGRAM_MINI_APP`.
#[derive(Deserialize, Debug)]
pub struct AuthResponse {
    pub token: Option<TokenPair>,
}

/// Error body of the gateway, `{"message": "..."}`.
#[derive(Deserialize, Debug)]
pub struct ErrorResponse {
    pub message: Option<String>,
}

/// Response from `/game/play`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StartGameResponse {
    pub game_id: Option<String>,
    pub message: Option<String>,
}

/// Response from `/user/balance`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub available_balance: Option<Amount>,
    pub play_passes: Option<u32>,
    pub timestamp: Option<i64>,
    pub farming: Option<FarmingResponse>,
}

/// Farming object nested in `/user/balance`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FarmingResponse {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

/// Response from `/farming/claim`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FarmingClaimResponse {
    pub timestamp: Option<i64>,
    pub available_balance: Option<Amount>,
}

/// Response from `/friends/balance`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FriendBalanceResponse {
    pub amount_for_claim: Option<Amount>,
    pub can_claim: Option<bool>,
    pub referral_token: Option<String>,
}

/// Response from `/friends/claim`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FriendClaimResponse {
    pub claim_balance: Option<Amount>,
}

/// Entry of the `/tasks` list.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub status: Option<String>,
    pub title: Option<String>,
    pub reward: Option<Amount>,
}

/// Response from `/tasks/{id}/claim`.
#[derive(Deserialize, Debug)]
pub struct TaskClaimResponse {
    pub status: Option<String>,
}
