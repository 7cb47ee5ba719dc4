//! Comic board view — what the generator page renders.
//!
//! The view never mutates the board. It turns snapshots into render-ready
//! `BoardView`s, forwards the regenerate action to the simulator, and owns the
//! download/share stubs, which only notify.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use super::board::ComicBoard;
use super::notify::{Notice, NotificationSink};
use super::panel::{PanelId, PanelState, PanelStatus};
use super::simulator::{GenerationSimulator, PendingRegeneration, SimulatorError};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("download and share need all four panels completed")]
    ActionsDisabled,
}

impl crate::frame::ErrorCode for ViewError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ActionsDisabled => "E_ACTIONS_DISABLED",
        }
    }
}

// =============================================================================
// RENDER MODEL
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelView {
    pub id: PanelId,
    pub status: PanelStatus,
    /// Caption shown in place of the image while it is not ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub alt: String,
    pub can_regenerate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    /// No run has started yet; the page shows its intro placeholder.
    pub empty: bool,
    pub is_running: bool,
    pub progress_percent: u8,
    pub panels: Vec<PanelView>,
    /// Download and share are available.
    pub actions_enabled: bool,
}

impl BoardView {
    #[must_use]
    pub fn render(board: &ComicBoard) -> Self {
        Self {
            empty: board.panels.is_empty(),
            is_running: board.is_running,
            progress_percent: board.progress_percent,
            panels: board
                .panels
                .iter()
                .map(|p| render_panel(p, board.is_running))
                .collect(),
            actions_enabled: board.all_completed(),
        }
    }
}

fn render_panel(panel: &PanelState, run_active: bool) -> PanelView {
    let caption = match panel.status() {
        PanelStatus::Pending => Some("等待生成"),
        PanelStatus::Generating => Some("正在生成..."),
        PanelStatus::Completed => None,
    };
    PanelView {
        id: panel.id(),
        status: panel.status(),
        caption,
        image_url: panel.image_url().map(str::to_string),
        alt: format!("漫画第{}格", panel.id()),
        can_regenerate: panel.is_completed() && !run_active,
    }
}

// =============================================================================
// VIEW
// =============================================================================

pub struct ComicBoardView {
    simulator: Arc<GenerationSimulator>,
    notifier: Arc<dyn NotificationSink>,
    board: watch::Receiver<ComicBoard>,
}

impl ComicBoardView {
    #[must_use]
    pub fn new(simulator: Arc<GenerationSimulator>, notifier: Arc<dyn NotificationSink>) -> Self {
        let board = simulator.subscribe();
        Self { simulator, notifier, board }
    }

    /// Render the latest snapshot and mark it seen.
    pub fn render(&mut self) -> BoardView {
        BoardView::render(&self.board.borrow_and_update())
    }

    /// Wait for the board to change, then render it. `None` once the
    /// simulator is gone.
    pub async fn changed(&mut self) -> Option<BoardView> {
        self.board.changed().await.ok()?;
        Some(self.render())
    }

    /// Regenerate action of a completed panel. The panel is `generating` as
    /// soon as this returns; drive the handle to finish it.
    ///
    /// # Errors
    ///
    /// Whatever [`GenerationSimulator::begin_regeneration`] reports.
    pub fn regenerate(&self, panel: PanelId) -> Result<PendingRegeneration, SimulatorError> {
        self.simulator.begin_regeneration(panel)
    }

    /// Download stub.
    ///
    /// # Errors
    ///
    /// `ActionsDisabled` unless all four panels are completed.
    pub fn download(&self) -> Result<(), ViewError> {
        self.ensure_actions_enabled()?;
        self.notifier.notify(Notice::DownloadStarted);
        Ok(())
    }

    /// Share stub.
    ///
    /// # Errors
    ///
    /// `ActionsDisabled` unless all four panels are completed.
    pub fn share(&self) -> Result<(), ViewError> {
        self.ensure_actions_enabled()?;
        self.notifier.notify(Notice::ShareComingSoon);
        Ok(())
    }

    fn ensure_actions_enabled(&self) -> Result<(), ViewError> {
        if self.board.borrow().all_completed() {
            Ok(())
        } else {
            Err(ViewError::ActionsDisabled)
        }
    }
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
