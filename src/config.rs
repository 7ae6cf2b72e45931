//! Configuration file structures for the Blum bot.
//!
//! The configuration is read from a YAML file and can be overridden with
//! environment variables prefixed with `BLUMBOT_`, using `__` to reach nested
//! keys (`BLUMBOT_PLAY__MAX_RETRIES=5`).
//!
//! # Configuration File Format
//!
//! ```yaml
//! service:
//!   # Base URLs, without trailing slash
//!   game_url: "https://game-domain.blum.codes/api/v1"
//!   gateway_url: "https://gateway.blum.codes/v1"
//!   # The service certificates are not verified by default
//!   accept_invalid_certs: true
//!   timeout_secs: 60
//!   # Random Android Chrome user agent per session when absent
//!   user_agent: "Mozilla/5.0 (Linux; Android 14; Pixel 8) ..."
//!
//! # Random delay ranges in seconds, as [min, max]
//! delays:
//!   account: [5, 15]
//!   play: [5, 15]
//!   game_duration: [30, 40]
//!   claim: [30, 40]
//!   error_play: [60, 120]
//!   task: [2, 5]
//!
//! # Points submitted per game, as [min, max]
//! points: [190, 230]
//!
//! play:
//!   enabled: true
//!   # Consecutive failures tolerated per pass, unbounded when absent
//!   max_retries: 10
//!
//! tasks:
//!   enabled: true
//!
//! accounts:
//!   - name: "alice"
//!     query: "query_id=...&user=...&hash=..."
//!     referral_code: "xyz123"
//! ```

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;
use std::path::Path;

/// Errors raised while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("config file not found: {0}")]
    NotFound(String),

    /// The file could not be parsed.
    #[error(transparent)]
    Load(#[from] figment::Error),

    /// A `[min, max]` range is inverted, negative or not finite.
    #[error("invalid range for `{name}`: [{min}, {max}]")]
    InvalidRange { name: String, min: f64, max: f64 },
}

/// Root configuration structure for the Blum bot.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    /// Blum service connection settings
    #[serde(default)]
    pub service: Service,
    /// Pacing delays
    #[serde(default)]
    pub delays: Delays,
    /// Points submitted per game
    #[serde(default = "default_points")]
    pub points: PointsRange,
    /// Game-play settings
    #[serde(default)]
    pub play: Play,
    /// Task settings
    #[serde(default)]
    pub tasks: Tasks,
    /// Accounts to run, in order
    #[serde(default)]
    pub accounts: Vec<Account>,
}

/// Blum service connection settings.
#[derive(Deserialize, Debug, Clone)]
pub struct Service {
    /// Base URL of the game host
    #[serde(default = "default_game_url")]
    pub game_url: String,

    /// Base URL of the gateway host (auth and friends)
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Skip TLS certificate verification.
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,

    /// Total timeout of one request, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with every request, a random Android Chrome one per session when absent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for Service {
    fn default() -> Self {
        Service {
            game_url: default_game_url(),
            gateway_url: default_gateway_url(),
            accept_invalid_certs: default_accept_invalid_certs(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

/// A `[min, max]` range of seconds.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DelayRange(pub f64, pub f64);

/// A `[min, max]` range of game points.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsRange(pub u32, pub u32);

impl Default for PointsRange {
    fn default() -> Self {
        default_points()
    }
}

/// Pacing delays, in seconds.
#[derive(Deserialize, Debug, Clone)]
pub struct Delays {
    /// Pause between two accounts
    #[serde(default = "default_account_delay")]
    pub account: DelayRange,
    /// Pause before starting each game
    #[serde(default = "default_play_delay")]
    pub play: DelayRange,
    /// Simulated duration of a game
    #[serde(default = "default_game_duration")]
    pub game_duration: DelayRange,
    /// Pause after a claimed game
    #[serde(default = "default_game_duration")]
    pub claim: DelayRange,
    /// Backoff after a failed pass
    #[serde(default = "default_error_play_delay")]
    pub error_play: DelayRange,
    /// Pause between two task requests
    #[serde(default = "default_task_delay")]
    pub task: DelayRange,
}

impl Default for Delays {
    fn default() -> Self {
        Delays {
            account: default_account_delay(),
            play: default_play_delay(),
            game_duration: default_game_duration(),
            claim: default_game_duration(),
            error_play: default_error_play_delay(),
            task: default_task_delay(),
        }
    }
}

/// Game-play settings.
#[derive(Deserialize, Debug, Clone)]
pub struct Play {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Consecutive failed attempts tolerated for one pass.
    ///
    /// Unbounded when absent.
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl Default for Play {
    fn default() -> Self {
        Play {
            enabled: true,
            max_retries: None,
        }
    }
}

/// Task settings.
#[derive(Deserialize, Debug, Clone)]
pub struct Tasks {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for Tasks {
    fn default() -> Self {
        Tasks { enabled: true }
    }
}

/// An account to run.
#[derive(Deserialize, Debug, Clone)]
pub struct Account {
    /// Name used in logs
    pub name: String,

    /// Identity payload (Telegram mini-app init data) used for login.
    pub query: String,

    /// Fallback referral code used by `register` when the requested one is exhausted
    #[serde(default)]
    pub referral_code: Option<String>,
}

impl Config {
    /// Load the configuration from a YAML file, then apply `BLUMBOT_` environment overrides.
    ///
    /// Trailing slashes of the service URLs are removed and every range is
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file is missing, [`ConfigError::Load`]
    /// if it is malformed, and
    /// [`ConfigError::InvalidRange`] if a range has `min > max` or a bound that is
    /// negative or not finite.
    pub fn load(path: &str) -> Result<Config, ConfigError> {
        // A missing file is not an error for figment
        if !Path::new(path).is_file() {
            return Err(ConfigError::NotFound(path.to_owned()));
        }

        let mut config: Config = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("BLUMBOT_").split("__"))
            .extract()?;

        trim_trailing_slash(&mut config.service.game_url);
        trim_trailing_slash(&mut config.service.gateway_url);
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let delays = [
            ("delays.account", self.delays.account),
            ("delays.play", self.delays.play),
            ("delays.game_duration", self.delays.game_duration),
            ("delays.claim", self.delays.claim),
            ("delays.error_play", self.delays.error_play),
            ("delays.task", self.delays.task),
        ];
        for (name, DelayRange(min, max)) in delays {
            if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
                return Err(ConfigError::InvalidRange {
                    name: name.to_owned(),
                    min,
                    max,
                });
            }
        }

        let PointsRange(min, max) = self.points;
        if min > max {
            return Err(ConfigError::InvalidRange {
                name: "points".to_owned(),
                min: min.into(),
                max: max.into(),
            });
        }

        Ok(())
    }
}

fn trim_trailing_slash(url: &mut String) {
    while url.ends_with('/') {
        url.pop();
    }
}

fn default_game_url() -> String {
    "https://game-domain.blum.codes/api/v1".to_owned()
}

fn default_gateway_url() -> String {
    "https://gateway.blum.codes/v1".to_owned()
}

fn default_accept_invalid_certs() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_points() -> PointsRange {
    PointsRange(190, 230)
}

fn default_account_delay() -> DelayRange {
    DelayRange(5.0, 15.0)
}

fn default_play_delay() -> DelayRange {
    DelayRange(5.0, 15.0)
}

fn default_game_duration() -> DelayRange {
    DelayRange(30.0, 40.0)
}

fn default_error_play_delay() -> DelayRange {
    DelayRange(60.0, 120.0)
}

fn default_task_delay() -> DelayRange {
    DelayRange(2.0, 5.0)
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_load_minimal_config_uses_defaults() {
        let file = write_config(
            r#"
accounts:
  - name: "alice"
    query: "query_id=abc"
"#,
        );

        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.service.game_url, "https://game-domain.blum.codes/api/v1");
        assert_eq!(config.service.gateway_url, "https://gateway.blum.codes/v1");
        assert!(config.service.accept_invalid_certs);
        assert!(config.service.user_agent.is_none());
        assert_eq!(config.delays.game_duration, DelayRange(30.0, 40.0));
        assert_eq!(config.points, PointsRange(190, 230));
        assert!(config.play.enabled);
        assert!(config.play.max_retries.is_none());
        assert_eq!(config.accounts.len(), 1);
        assert_eq!(config.accounts[0].name, "alice");
        assert!(config.accounts[0].referral_code.is_none());
    }

    #[test]
    #[serial]
    fn test_load_full_config() {
        let file = write_config(
            r#"
service:
  game_url: "http://localhost:8080/api/v1/"
  gateway_url: "http://localhost:8081/v1"
  accept_invalid_certs: false
  timeout_secs: 10
  user_agent: "blumbot-test"
delays:
  play: [1, 2]
  error_play: [3.5, 4.5]
points: [100, 120]
play:
  enabled: false
  max_retries: 3
tasks:
  enabled: false
accounts:
  - name: "bob"
    query: "query_id=def"
    referral_code: "ref123"
"#,
        );

        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.service.game_url, "http://localhost:8080/api/v1");
        assert!(!config.service.accept_invalid_certs);
        assert_eq!(config.service.timeout_secs, 10);
        assert_eq!(config.service.user_agent.as_deref(), Some("blumbot-test"));
        assert_eq!(config.delays.play, DelayRange(1.0, 2.0));
        assert_eq!(config.delays.error_play, DelayRange(3.5, 4.5));
        assert_eq!(config.delays.claim, DelayRange(30.0, 40.0));
        assert_eq!(config.points, PointsRange(100, 120));
        assert!(!config.play.enabled);
        assert_eq!(config.play.max_retries, Some(3));
        assert!(!config.tasks.enabled);
        assert_eq!(config.accounts[0].referral_code.as_deref(), Some("ref123"));
    }

    #[test]
    #[serial]
    fn test_load_rejects_inverted_range() {
        let file = write_config("points: [300, 100]\n");

        let result = Config::load(file.path().to_str().unwrap());
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRange { ref name, .. }) if name == "points"
        ));
    }

    #[test]
    #[serial]
    fn test_load_rejects_infinite_delay() {
        let file = write_config("delays:\n  play: [.inf, .inf]\n");

        let result = Config::load(file.path().to_str().unwrap());
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRange { ref name, .. }) if name == "delays.play"
        ));
    }

    #[test]
    #[serial]
    fn test_load_rejects_negative_delay() {
        let file = write_config("delays:\n  task: [-1, 2]\n");

        let result = Config::load(file.path().to_str().unwrap());
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRange { ref name, .. }) if name == "delays.task"
        ));
    }

    #[test]
    #[serial]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/blumbot.yaml");
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let file = write_config("play:\n  max_retries: 3\n");

        unsafe { std::env::set_var("BLUMBOT_PLAY__MAX_RETRIES", "7") };
        let result = Config::load(file.path().to_str().unwrap());
        unsafe { std::env::remove_var("BLUMBOT_PLAY__MAX_RETRIES") };

        assert_eq!(result.unwrap().play.max_retries, Some(7));
    }
}
