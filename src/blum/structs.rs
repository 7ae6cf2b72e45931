//! Public data structures exposed by the Blum components.
//!
//! These are the internal representations built from the raw API responses
//! found in `response_structs`.

use std::fmt;

/// Access and refresh credentials of one session.
///
/// Created by login or registration, replaced wholesale by refresh.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    /// Sent as a bearer token on every request
    pub access: String,
    /// Kept in memory only, exchanged for a new token on refresh
    pub refresh: String,
}

// Tokens never end up in logs
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

/// Progress of a task on the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Not started yet
    Unclaimed,
    /// Started, waiting to be claimed
    Started,
    /// Reward already collected
    Claimed,
    /// Status string unknown to this client
    Unknown(String),
}

impl From<&str> for TaskStatus {
    fn from(status: &str) -> Self {
        match status {
            "NOT_STARTED" => TaskStatus::Unclaimed,
            "STARTED" | "READY_FOR_CLAIM" => TaskStatus::Started,
            "CLAIMED" | "FINISHED" => TaskStatus::Claimed,
            other => TaskStatus::Unknown(other.to_owned()),
        }
    }
}

/// A promotional task owned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique identifier of the task
    pub id: String,
    /// Current status on the account
    pub status: TaskStatus,
    /// Human readable title, used for logging
    pub title: String,
    /// Reward granted on claim
    pub reward: Option<f64>,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "id={}, title={}, status={:?}",
            self.id, self.title, self.status
        )
    }
}

/// One game round, alive for the duration of a single play pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    /// Identifier returned by the start request
    pub game_id: String,
    /// Points submitted on claim, zero until claimed
    pub points_claimed: u32,
}

/// Farming state of the account.
///
/// Absent timestamps mean farming is not currently active.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FarmingWindow {
    /// Start of the window, in seconds
    pub start_time: Option<i64>,
    /// End of the window, in seconds
    pub end_time: Option<i64>,
    /// Balance available on the account
    pub available_balance: Option<f64>,
}

impl FarmingWindow {
    /// Whether a farming window is currently open.
    pub fn is_active(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_some()
    }

    /// Whether the window has ended at `now` (seconds) and can be claimed.
    pub fn is_mature(&self, now: i64) -> bool {
        self.end_time.is_some_and(|end| now >= end)
    }
}

/// Snapshot returned by the balance query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Balance {
    /// Server time, in seconds
    pub now: Option<i64>,
    /// Farming window of the account
    pub window: FarmingWindow,
    /// Remaining play passes
    pub play_passes: u32,
}

/// Referral side of the account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferralState {
    /// Code other accounts register with
    pub referral_token: Option<String>,
    /// Reward accrued from invited accounts
    pub amount_for_claim: Option<f64>,
    /// Whether the reward can be claimed now
    pub can_claim: Option<bool>,
}

/// Result of the daily reward claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DailyReward {
    /// The service answered with the success marker
    Claimed,
    /// Raw answer of the service, usually "already claimed"
    NotClaimed(String),
}

/// Result of a game start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new game was started
    Started(String),
    /// The service refused to start a game, with its message
    Unavailable(String),
}

/// Result of a game claim request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The body was the literal success marker
    Claimed,
    /// Any other body, kept verbatim
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_token_debug_is_redacted() {
        let token = AuthToken {
            access: "secret-access".to_owned(),
            refresh: "secret-refresh".to_owned(),
        };

        let debug = format!("{:?}", token);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_task_status_from_str() {
        assert_eq!(TaskStatus::from("NOT_STARTED"), TaskStatus::Unclaimed);
        assert_eq!(TaskStatus::from("READY_FOR_CLAIM"), TaskStatus::Started);
        assert_eq!(TaskStatus::from("FINISHED"), TaskStatus::Claimed);
        assert_eq!(
            TaskStatus::from("LOCKED"),
            TaskStatus::Unknown("LOCKED".to_owned())
        );
    }

    #[test]
    fn test_farming_window() {
        let idle = FarmingWindow::default();
        assert!(!idle.is_active());
        assert!(!idle.is_mature(100));

        let window = FarmingWindow {
            start_time: Some(100),
            end_time: Some(200),
            available_balance: None,
        };
        assert!(window.is_active());
        assert!(!window.is_mature(199));
        assert!(window.is_mature(200));
    }
}
