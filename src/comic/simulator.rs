//! Generation simulator — drives four panels through their lifecycle.
//!
//! DESIGN
//! ======
//! The simulator owns the session's `ComicBoard` behind a `watch` channel.
//! Every mutation is a single `send_if_modified` call, so each published
//! snapshot is internally consistent and views never see a half-applied step.
//!
//! Starting work is split in two: `begin_*` validates and claims the board
//! synchronously, returning a pending handle whose `drive()` future performs
//! the slow part. Callers that need an immediate accept/reject answer (the
//! websocket session) spawn `drive()`; `start_run` / `regenerate_panel`
//! simply do both in sequence.
//!
//! ORDERING
//! ========
//! - A run generates panels strictly in order; panel N is completed and
//!   published before panel N+1 enters `generating`.
//! - A run rejects new runs and regenerations until it finishes, so at most
//!   one panel is generating while a run is active.
//! - Regenerations of different panels are independent and may overlap.
//! - Every late write checks `run_id`; results for a replaced run are dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::board::{ComicBoard, progress_for};
use super::generator::{GenerateError, GeneratedImage, ImageGenerator, ImageRequest, RequestKind, derive_prompt};
use super::notify::{Notice, NotificationSink};
use super::panel::{Artwork, PanelId, PanelIdOutOfRange};
use crate::frame::ErrorCode;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("input text is empty")]
    EmptyInput,
}

#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a run is already in progress")]
    RunInProgress,
    #[error("no run has started")]
    NoRun,
    #[error("unknown panel: {0}")]
    UnknownPanel(u64),
    #[error("panel {0} is not completed")]
    PanelNotCompleted(PanelId),
    #[error("run was replaced by a newer run")]
    Superseded,
    #[error("panel {panel} generation failed: {source}")]
    Generation { panel: PanelId, source: GenerateError },
}

impl From<PanelIdOutOfRange> for SimulatorError {
    fn from(e: PanelIdOutOfRange) -> Self {
        Self::UnknownPanel(e.0)
    }
}

impl ErrorCode for SimulatorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(ValidationError::EmptyInput) => "E_EMPTY_INPUT",
            Self::RunInProgress => "E_RUN_IN_PROGRESS",
            Self::NoRun => "E_NO_RUN",
            Self::UnknownPanel(_) => "E_UNKNOWN_PANEL",
            Self::PanelNotCompleted(_) => "E_PANEL_NOT_COMPLETED",
            Self::Superseded => "E_SUPERSEDED",
            Self::Generation { .. } => "E_GENERATION_FAILED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::RunInProgress)
            || matches!(self, Self::Generation { source, .. } if source.retryable())
    }
}

// =============================================================================
// SIMULATOR
// =============================================================================

pub struct GenerationSimulator {
    board: watch::Sender<ComicBoard>,
    generator: Arc<dyn ImageGenerator>,
    notifier: Arc<dyn NotificationSink>,
    request_timeout: Duration,
}

impl GenerationSimulator {
    #[must_use]
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        notifier: Arc<dyn NotificationSink>,
        request_timeout: Duration,
    ) -> Self {
        let (board, _) = watch::channel(ComicBoard::default());
        Self { board, generator, notifier, request_timeout }
    }

    /// Subscribe to board snapshots. The receiver starts at the current board.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ComicBoard> {
        self.board.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> ComicBoard {
        self.board.borrow().clone()
    }

    /// Validate input and reset the board for a new run.
    ///
    /// # Errors
    ///
    /// `Validation` for empty/whitespace input (also reported to the sink),
    /// `RunInProgress` if a run is still active.
    pub fn begin_run(self: &Arc<Self>, input_text: &str) -> Result<PendingRun, SimulatorError> {
        if input_text.trim().is_empty() {
            self.notifier.notify(Notice::EmptyInput);
            return Err(ValidationError::EmptyInput.into());
        }

        let run_id = Uuid::new_v4();
        let mut busy = false;
        self.board.send_if_modified(|board| {
            if board.is_running {
                busy = true;
                return false;
            }
            *board = ComicBoard::started(run_id, input_text);
            true
        });
        if busy {
            return Err(SimulatorError::RunInProgress);
        }

        info!(%run_id, input_chars = input_text.chars().count(), "comic: run started");
        Ok(PendingRun { simulator: Arc::clone(self), run_id, input_text: input_text.to_string() })
    }

    /// Run the whole pipeline for `input_text`, returning once every panel is
    /// completed.
    ///
    /// # Errors
    ///
    /// See [`GenerationSimulator::begin_run`] and [`PendingRun::drive`].
    pub async fn start_run(self: &Arc<Self>, input_text: &str) -> Result<Uuid, SimulatorError> {
        self.begin_run(input_text)?.drive().await
    }

    /// Move one completed panel back to `generating`.
    ///
    /// # Errors
    ///
    /// `NoRun`, `RunInProgress`, `UnknownPanel` or `PanelNotCompleted`. None
    /// of these notify the user.
    pub fn begin_regeneration(self: &Arc<Self>, panel: PanelId) -> Result<PendingRegeneration, SimulatorError> {
        let mut claim = Err(SimulatorError::NoRun);
        self.board.send_if_modified(|board| {
            claim = claim_for_regeneration(board, panel);
            claim.is_ok()
        });
        let (run_id, previous, input_text) = claim?;

        debug!(%run_id, %panel, "comic: panel regenerating");
        Ok(PendingRegeneration { simulator: Arc::clone(self), run_id, panel, previous, input_text })
    }

    /// Regenerate one completed panel and wait for the new image.
    ///
    /// # Errors
    ///
    /// See [`GenerationSimulator::begin_regeneration`] and
    /// [`PendingRegeneration::drive`].
    pub async fn regenerate_panel(self: &Arc<Self>, panel: PanelId) -> Result<(), SimulatorError> {
        self.begin_regeneration(panel)?.drive().await
    }

    /// Apply `f` if `run_id` is still the board's run. Returns whether it was applied.
    fn update_run(&self, run_id: Uuid, f: impl FnOnce(&mut ComicBoard)) -> bool {
        self.board.send_if_modified(|board| {
            if !board.is_current(run_id) {
                return false;
            }
            f(board);
            true
        })
    }

    async fn request_image(&self, request: &ImageRequest) -> Result<GeneratedImage, GenerateError> {
        match tokio::time::timeout(self.request_timeout, self.generator.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(GenerateError::Timeout(self.request_timeout)),
        }
    }
}

fn claim_for_regeneration(board: &mut ComicBoard, panel: PanelId) -> Result<(Uuid, Artwork, String), SimulatorError> {
    let Some(run_id) = board.run_id else {
        return Err(SimulatorError::NoRun);
    };
    if board.is_running {
        return Err(SimulatorError::RunInProgress);
    }
    let input_text = board.input_text.clone();
    let Some(state) = board.panel_mut(panel) else {
        return Err(SimulatorError::UnknownPanel(u64::from(panel.ordinal())));
    };
    let Some(previous) = state.artwork() else {
        return Err(SimulatorError::PanelNotCompleted(panel));
    };
    state.begin_generating();
    Ok((run_id, previous, input_text))
}

// =============================================================================
// PENDING RUN
// =============================================================================

/// A run whose board has been reset but whose panels have not been generated.
#[must_use = "a pending run does nothing until driven"]
pub struct PendingRun {
    simulator: Arc<GenerationSimulator>,
    run_id: Uuid,
    input_text: String,
}

impl PendingRun {
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Generate panels 1..=4 in order, publishing each transition.
    ///
    /// # Errors
    ///
    /// `Generation` if the backend fails or times out; the failing panel goes
    /// back to `pending` and the run stops. `Superseded` if the board was
    /// replaced underneath the run.
    pub async fn drive(self) -> Result<Uuid, SimulatorError> {
        let Self { simulator, run_id, input_text } = self;

        for panel in PanelId::all() {
            let started = simulator.update_run(run_id, |board| {
                if let Some(state) = board.panel_mut(panel) {
                    state.begin_generating();
                }
            });
            if !started {
                return Err(SimulatorError::Superseded);
            }
            debug!(%run_id, %panel, "comic: panel generating");

            let prompt = derive_prompt(&input_text, panel);
            let request = ImageRequest { panel, prompt: prompt.clone(), kind: RequestKind::Panel };
            let image = match simulator.request_image(&request).await {
                Ok(image) => image,
                Err(source) => {
                    simulator.update_run(run_id, |board| {
                        if let Some(state) = board.panel_mut(panel) {
                            state.reset_pending();
                        }
                        board.is_running = false;
                    });
                    warn!(%run_id, %panel, error = %source, "comic: run failed");
                    simulator.notifier.notify(Notice::GenerationFailed { panel });
                    return Err(SimulatorError::Generation { panel, source });
                }
            };

            let progress = progress_for(panel.index() + 1);
            let completed = simulator.update_run(run_id, |board| {
                if let Some(state) = board.panel_mut(panel) {
                    state.complete(Artwork { image_url: image.url, prompt });
                }
                board.progress_percent = progress;
            });
            if !completed {
                return Err(SimulatorError::Superseded);
            }
            info!(%run_id, %panel, progress, "comic: panel completed");
        }

        simulator.update_run(run_id, |board| board.is_running = false);
        simulator.notifier.notify(Notice::Completed);
        info!(%run_id, "comic: run completed");
        Ok(run_id)
    }
}

// =============================================================================
// PENDING REGENERATION
// =============================================================================

/// A panel already moved to `generating`, waiting for its new image.
#[must_use = "a pending regeneration does nothing until driven"]
pub struct PendingRegeneration {
    simulator: Arc<GenerationSimulator>,
    run_id: Uuid,
    panel: PanelId,
    previous: Artwork,
    input_text: String,
}

impl PendingRegeneration {
    /// Fetch a new image and complete the panel with a re-derived prompt.
    ///
    /// # Errors
    ///
    /// `Generation` if the backend fails or times out; the panel's previous
    /// artwork is restored. `Superseded` if a newer run replaced the board.
    pub async fn drive(self) -> Result<(), SimulatorError> {
        let Self { simulator, run_id, panel, previous, input_text } = self;

        let prompt = derive_prompt(&input_text, panel);
        let request = ImageRequest { panel, prompt: prompt.clone(), kind: RequestKind::Regeneration };

        match simulator.request_image(&request).await {
            Ok(image) => {
                let applied = simulator.update_run(run_id, |board| {
                    if let Some(state) = board.panel_mut(panel) {
                        state.complete(Artwork { image_url: image.url, prompt });
                    }
                });
                if !applied {
                    debug!(%run_id, %panel, "comic: stale regeneration dropped");
                    return Err(SimulatorError::Superseded);
                }
                info!(%run_id, %panel, "comic: panel regenerated");
                Ok(())
            }
            Err(source) => {
                let restored = simulator.update_run(run_id, |board| {
                    if let Some(state) = board.panel_mut(panel) {
                        state.complete(previous);
                    }
                });
                warn!(%run_id, %panel, error = %source, "comic: regeneration failed");
                if restored {
                    simulator.notifier.notify(Notice::GenerationFailed { panel });
                }
                Err(SimulatorError::Generation { panel, source })
            }
        }
    }
}

#[cfg(test)]
#[path = "simulator_test.rs"]
mod tests;
