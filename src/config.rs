//! Server and simulator configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_GEN_MIN_DELAY_MS: u64 = 2000;
pub const DEFAULT_GEN_MAX_DELAY_MS: u64 = 4000;
pub const DEFAULT_REGEN_DELAY_MS: u64 = 3000;
pub const DEFAULT_GEN_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_PLACEHOLDER_BASE_URL: &str = "https://images.unsplash.com";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid delay range: GEN_MAX_DELAY_MS ({max_ms}) must exceed GEN_MIN_DELAY_MS ({min_ms})")]
    InvalidDelayRange { min_ms: u64, max_ms: u64 },
    #[error("GEN_TIMEOUT_MS ({timeout_ms}) is shorter than the slowest simulated request ({needed_ms}ms)")]
    TimeoutTooShort { timeout_ms: u64, needed_ms: u64 },
}

/// Latency and timeout knobs for the generation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorTimings {
    /// Inclusive lower bound of a run panel's latency.
    pub min_delay: Duration,
    /// Exclusive upper bound of a run panel's latency.
    pub max_delay: Duration,
    /// Fixed latency of a single-panel regeneration.
    pub regen_delay: Duration,
    /// Upper bound on any one generator request.
    pub request_timeout: Duration,
}

impl Default for SimulatorTimings {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(DEFAULT_GEN_MIN_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_GEN_MAX_DELAY_MS),
            regen_delay: Duration::from_millis(DEFAULT_REGEN_DELAY_MS),
            request_timeout: Duration::from_millis(DEFAULT_GEN_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub website_dir: PathBuf,
    pub placeholder_base_url: String,
    pub timings: SimulatorTimings,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// All variables are optional:
    /// - `PORT`: default 3000
    /// - `WEBSITE_DIR`: default `website/` next to `Cargo.toml`
    /// - `GEN_MIN_DELAY_MS` / `GEN_MAX_DELAY_MS`: default 2000 / 4000
    /// - `REGEN_DELAY_MS`: default 3000
    /// - `GEN_TIMEOUT_MS`: default 30000
    /// - `PLACEHOLDER_BASE_URL`: default `https://images.unsplash.com`
    ///
    /// # Errors
    ///
    /// Returns an error if the run delay range is empty, or if the request
    /// timeout would cut off a placeholder request before its latency ends.
    pub fn from_env() -> Result<Self, ConfigError> {
        let min_ms = env_parse("GEN_MIN_DELAY_MS", DEFAULT_GEN_MIN_DELAY_MS);
        let max_ms = env_parse("GEN_MAX_DELAY_MS", DEFAULT_GEN_MAX_DELAY_MS);
        if max_ms <= min_ms {
            return Err(ConfigError::InvalidDelayRange { min_ms, max_ms });
        }

        let regen_ms = env_parse("REGEN_DELAY_MS", DEFAULT_REGEN_DELAY_MS);
        let timeout_ms = env_parse("GEN_TIMEOUT_MS", DEFAULT_GEN_TIMEOUT_MS);
        // Run latency is below max_ms; regeneration sleeps exactly regen_ms.
        let needed_ms = max_ms.max(regen_ms.saturating_add(1));
        if timeout_ms < needed_ms {
            return Err(ConfigError::TimeoutTooShort { timeout_ms, needed_ms });
        }

        let timings = SimulatorTimings {
            min_delay: Duration::from_millis(min_ms),
            max_delay: Duration::from_millis(max_ms),
            regen_delay: Duration::from_millis(regen_ms),
            request_timeout: Duration::from_millis(timeout_ms),
        };

        let placeholder_base_url = std::env::var("PLACEHOLDER_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_PLACEHOLDER_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            port: env_parse("PORT", DEFAULT_PORT),
            website_dir: website_dir(),
            placeholder_base_url,
            timings,
        })
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Resolve the path to the static website directory.
fn website_dir() -> PathBuf {
    std::env::var("WEBSITE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("website"))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
