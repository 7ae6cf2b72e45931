//! Game rounds and the play-pass loop.
//!
//! This module provides the [`GameClient`] issuing the start and claim
//! requests, and the [`GamePlaySession`] state machine that consumes play
//! passes with them.
//!
//! # Play pass lifecycle
//!
//! ```text
//! Idle ──► Starting ──► AwaitingResolution ──► Claiming ──► Idle (next pass)
//!             │                                   │
//!             └──── unavailable / rejected ───────┴──► Terminated
//! ```
//!
//! A failed request inside a pass is a retryable failure: the pass starts
//! over after a backoff, for as long as the configured retry bound allows
//! (unbounded by default). A service refusal is terminal and abandons the
//! remaining passes.

use log::{debug, error, info};
use mockall::automock;
use serde_json::json;

use crate::blum::{
    ApiError,
    delay::Delay,
    requester::{BlumRequester, Host},
    response_structs::StartGameResponse,
    retry::retry_once,
    structs::{ClaimOutcome, GameSession, StartOutcome},
};
use crate::config::{Config, DelayRange, PointsRange};
use crate::utils::{random_duration, random_points};

/// Literal body of a successful claim.
const OK_MARKER: &str = "OK";

/// Trait for starting and claiming game rounds.
///
/// This trait abstracts the HTTP operations for easier testing with mocks.
#[automock]
pub trait GameApi {
    /// Starts a new game round.
    async fn start_game(&self) -> Result<StartOutcome, ApiError>;
    /// Claims a finished round, returning the outcome and the points submitted.
    async fn claim_game(&self, game_id: &str) -> Result<(ClaimOutcome, u32), ApiError>;
}

/// Issues the game requests of one account.
pub struct GameClient<D: Delay> {
    requester: BlumRequester,
    delay: D,
    /// Range the submitted points are drawn from
    points: PointsRange,
}

impl<D: Delay> GameClient<D> {
    pub fn new(requester: BlumRequester, delay: D, points: PointsRange) -> Self {
        GameClient {
            requester,
            delay,
            points,
        }
    }
}

impl<D: Delay> GameApi for GameClient<D> {
    /// Request `/game/play`.
    ///
    /// The service returns `{ gameId: "..." }`, or `{ message: "..." }` when no
    /// game can be started (no pass left, maintenance). The latter, or a body
    /// without a non-empty game id, is [`StartOutcome::Unavailable`].
    async fn start_game(&self) -> Result<StartOutcome, ApiError> {
        let response = self.requester.post(Host::Game, "/game/play").await?;
        let start: StartGameResponse = response.json()?;
        let game_id = start.game_id.filter(|id| !id.is_empty());

        Ok(match (game_id, start.message) {
            (Some(game_id), _) => StartOutcome::Started(game_id),
            (None, Some(message)) => StartOutcome::Unavailable(message),
            (None, None) => StartOutcome::Unavailable(response.body),
        })
    }

    /// Request `/game/claim` with `{ gameId, points }`.
    ///
    /// The points are drawn locally from the configured range; the service
    /// validates them. A non-success status is retried once after a second.
    async fn claim_game(&self, game_id: &str) -> Result<(ClaimOutcome, u32), ApiError> {
        let points = random_points(&self.points);
        let body = json!({ "gameId": game_id, "points": points });

        let response = retry_once(&self.delay, "game claim", || {
            self.requester.post_json(Host::Game, "/game/claim", &body)
        })
        .await?;

        let outcome = if response.body == OK_MARKER {
            ClaimOutcome::Claimed
        } else {
            ClaimOutcome::Rejected(response.body)
        };

        Ok((outcome, points))
    }
}

/// Pacing and retry settings of the play loop.
#[derive(Debug, Clone)]
pub struct PlaySettings {
    /// Pause before each start
    pub play_delay: DelayRange,
    /// Simulated duration of a round
    pub game_duration: DelayRange,
    /// Pause after a claimed round
    pub claim_delay: DelayRange,
    /// Backoff after a failed pass
    pub error_delay: DelayRange,
    /// Consecutive failures tolerated before giving up, unbounded when `None`
    pub max_retries: Option<u32>,
}

impl From<&Config> for PlaySettings {
    fn from(config: &Config) -> Self {
        PlaySettings {
            play_delay: config.delays.play,
            game_duration: config.delays.game_duration,
            claim_delay: config.delays.claim,
            error_delay: config.delays.error_play,
            max_retries: config.play.max_retries,
        }
    }
}

/// State of the play loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayState {
    /// Between two passes
    Idle,
    /// Waiting for a game id
    Starting,
    /// Round in progress
    AwaitingResolution(GameSession),
    /// Submitting the points of the round
    Claiming(GameSession),
    /// Loop stopped before consuming every pass
    Terminated(StopReason),
}

/// Why the play loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Every pass was consumed
    Exhausted,
    /// The service refused to start a game
    SessionUnavailable(String),
    /// The claim body was not the success marker
    ClaimRejected(String),
    /// The retry bound was reached on the same pass
    RetriesExhausted(u32),
}

/// Outcome of one play pass.
enum PassOutcome {
    Completed(GameSession),
    TerminalFailure(StopReason),
    RetryableFailure(ApiError),
}

/// Summary of a play loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayReport {
    /// Passes fully started and claimed
    pub completed: u32,
    /// Passes left when the loop stopped
    pub remaining: u32,
    /// Total points claimed
    pub points: u64,
    /// Why the loop stopped
    pub stop: StopReason,
}

/// Consumes play passes: start, wait, claim, repeat.
///
/// # Examples
///
/// ```no_run
/// # use blumbot::blum::game::{GameClient, GamePlaySession, PlaySettings};
/// # async fn example(client: GameClient<blumbot::blum::TokioDelay>, settings: PlaySettings) {
/// let mut session = GamePlaySession::new("alice", client, blumbot::blum::TokioDelay, settings);
/// let report = session.play(3).await;
/// println!("claimed {} points", report.points);
/// # }
/// ```
pub struct GamePlaySession<G: GameApi, D: Delay> {
    account: String,
    api: G,
    delay: D,
    settings: PlaySettings,
    state: PlayState,
}

impl<G: GameApi, D: Delay> GamePlaySession<G, D> {
    pub fn new(account: &str, api: G, delay: D, settings: PlaySettings) -> Self {
        GamePlaySession {
            account: account.to_owned(),
            api,
            delay,
            settings,
            state: PlayState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &PlayState {
        &self.state
    }

    fn transition(&mut self, state: PlayState) {
        debug!("{} | play state {:?} -> {:?}", self.account, self.state, state);
        self.state = state;
    }

    /// Plays until `play_passes` rounds are claimed or the service stops the loop.
    ///
    /// A pass is only consumed once its claim succeeded. A failed request
    /// restarts the same pass after the error backoff. Dropping the returned
    /// future cancels the loop at its current await point.
    pub async fn play(&mut self, play_passes: u32) -> PlayReport {
        let mut remaining = play_passes;
        let mut completed = 0;
        let mut points = 0u64;
        let mut retries = 0;

        let stop = loop {
            if remaining == 0 {
                break StopReason::Exhausted;
            }

            match self.play_pass().await {
                PassOutcome::Completed(session) => {
                    info!(
                        "{} | finish play in game! reward: {}",
                        self.account, session.points_claimed
                    );
                    points += u64::from(session.points_claimed);
                    completed += 1;
                    remaining -= 1;
                    retries = 0;
                }
                PassOutcome::TerminalFailure(reason) => {
                    info!(
                        "{} | couldn't play game ({:?}), play_passes: {}",
                        self.account, reason, remaining
                    );
                    break reason;
                }
                PassOutcome::RetryableFailure(e) => {
                    error!("{} | error occurred during play_game: {}", self.account, e);
                    retries += 1;
                    match self.settings.max_retries {
                        Some(max_retries) if retries > max_retries => {
                            break StopReason::RetriesExhausted(max_retries);
                        }
                        _ => {}
                    }
                    self.transition(PlayState::Idle);
                    self.delay
                        .sleep(random_duration(&self.settings.error_delay))
                        .await;
                }
            }
        };

        self.transition(match stop {
            StopReason::Exhausted => PlayState::Idle,
            ref reason => PlayState::Terminated(reason.clone()),
        });

        PlayReport {
            completed,
            remaining,
            points,
            stop,
        }
    }

    async fn play_pass(&mut self) -> PassOutcome {
        self.transition(PlayState::Idle);
        self.delay
            .sleep(random_duration(&self.settings.play_delay))
            .await;

        self.transition(PlayState::Starting);
        let game_id = match self.api.start_game().await {
            Ok(StartOutcome::Started(game_id)) => game_id,
            Ok(StartOutcome::Unavailable(message)) => {
                return PassOutcome::TerminalFailure(StopReason::SessionUnavailable(message));
            }
            Err(e) => return PassOutcome::RetryableFailure(e),
        };

        let mut session = GameSession {
            game_id,
            points_claimed: 0,
        };
        self.transition(PlayState::AwaitingResolution(session.clone()));
        self.delay
            .sleep(random_duration(&self.settings.game_duration))
            .await;

        self.transition(PlayState::Claiming(session.clone()));
        match self.api.claim_game(&session.game_id).await {
            Ok((ClaimOutcome::Claimed, points)) => session.points_claimed = points,
            Ok((ClaimOutcome::Rejected(body), _)) => {
                return PassOutcome::TerminalFailure(StopReason::ClaimRejected(body));
            }
            Err(e) => return PassOutcome::RetryableFailure(e),
        }

        self.delay
            .sleep(random_duration(&self.settings.claim_delay))
            .await;
        self.transition(PlayState::Idle);

        PassOutcome::Completed(session)
    }
}
