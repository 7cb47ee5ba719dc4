//! Image generation seam.
//!
//! DESIGN
//! ======
//! `ImageGenerator` is the boundary where a real image backend would plug in:
//! one async call per panel that takes variable latency and yields either an
//! image reference or an error. `PlaceholderGenerator` is the only backend
//! shipped; it sleeps for a sampled latency and fabricates a stock-photo URL
//! from a random seed, so it never fails.

use std::time::Duration;

use rand::Rng;

use super::panel::PanelId;
use crate::config::SimulatorTimings;

/// Lowest photo number a placeholder URL can reference.
pub const PLACEHOLDER_SEED_BASE: u64 = 1_500_000_000_000;

/// Size of the placeholder seed space.
pub const PLACEHOLDER_SEED_SPAN: u64 = 100_000_000;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// First generation of a panel inside a run.
    Panel,
    /// Replacement of an already completed panel.
    Regeneration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub panel: PanelId,
    pub prompt: String,
    pub kind: RequestKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("image generation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("image backend failed: {0}")]
    Backend(String),
}

impl crate::frame::ErrorCode for GenerateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "E_GENERATE_TIMEOUT",
            Self::Backend(_) => "E_GENERATE_BACKEND",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

/// Backend that turns a panel prompt into an image reference.
#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, GenerateError>;
}

// =============================================================================
// PROMPTS AND URLS
// =============================================================================

/// Prompt attached to a completed panel: input text plus 1-based ordinal.
#[must_use]
pub fn derive_prompt(input_text: &str, panel: PanelId) -> String {
    format!("{input_text} - 第{}格", panel.ordinal())
}

/// Stock-photo URL for a seed in `0..PLACEHOLDER_SEED_SPAN`.
#[must_use]
pub fn placeholder_url(base_url: &str, seed: u64) -> String {
    let photo = PLACEHOLDER_SEED_BASE + seed;
    format!("{base_url}/photo-{photo}?w=300&h=300&fit=crop&crop=entropy")
}

// =============================================================================
// LATENCY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Latency {
    /// Uniform in `[min, max)`.
    Uniform { min: Duration, max: Duration },
    Fixed(Duration),
}

impl Latency {
    #[must_use]
    pub fn sample(&self) -> Duration {
        match *self {
            Self::Uniform { min, max } if max > min => rand::rng().random_range(min..max),
            Self::Uniform { min, .. } => min,
            Self::Fixed(d) => d,
        }
    }
}

// =============================================================================
// PLACEHOLDER BACKEND
// =============================================================================

pub struct PlaceholderGenerator {
    base_url: String,
    panel_latency: Latency,
    regen_latency: Latency,
}

impl PlaceholderGenerator {
    #[must_use]
    pub fn new(base_url: impl Into<String>, timings: &SimulatorTimings) -> Self {
        Self {
            base_url: base_url.into(),
            panel_latency: Latency::Uniform { min: timings.min_delay, max: timings.max_delay },
            regen_latency: Latency::Fixed(timings.regen_delay),
        }
    }

    fn latency(&self, kind: RequestKind) -> Latency {
        match kind {
            RequestKind::Panel => self.panel_latency,
            RequestKind::Regeneration => self.regen_latency,
        }
    }
}

#[async_trait::async_trait]
impl ImageGenerator for PlaceholderGenerator {
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, GenerateError> {
        let delay = self.latency(request.kind).sample();
        tokio::time::sleep(delay).await;

        let seed = rand::rng().random_range(0..PLACEHOLDER_SEED_SPAN);
        Ok(GeneratedImage { url: placeholder_url(&self.base_url, seed) })
    }
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod tests;
