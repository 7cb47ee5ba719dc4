//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds only process-wide, read-only pieces: the parsed config and the image
//! backend. Boards are not shared; each generator session builds its own
//! simulator from this state and drops it when the socket closes.

use std::sync::Arc;

use crate::comic::generator::{ImageGenerator, PlaceholderGenerator};
use crate::comic::notify::NotificationSink;
use crate::comic::simulator::GenerationSimulator;
use crate::config::AppConfig;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub generator: Arc<dyn ImageGenerator>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, generator: Arc<dyn ImageGenerator>) -> Self {
        Self { config: Arc::new(config), generator }
    }

    /// State backed by the placeholder image backend.
    #[must_use]
    pub fn with_placeholder(config: AppConfig) -> Self {
        let generator = PlaceholderGenerator::new(config.placeholder_base_url.clone(), &config.timings);
        Self::new(config, Arc::new(generator))
    }

    /// Fresh simulator for one generator session.
    #[must_use]
    pub fn new_simulator(&self, notifier: Arc<dyn NotificationSink>) -> Arc<GenerationSimulator> {
        Arc::new(GenerationSimulator::new(
            Arc::clone(&self.generator),
            notifier,
            self.config.timings.request_timeout,
        ))
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
