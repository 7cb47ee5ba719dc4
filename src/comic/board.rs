//! Comic board — the run state plus its four panels.
//!
//! A board is the single owned store of a generator session. The simulator
//! publishes it through a `watch` channel; views only ever see snapshots.

use serde::Serialize;
use uuid::Uuid;

use super::panel::{PANEL_COUNT, PanelId, PanelState, PanelStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComicBoard {
    /// Identity of the current run. `None` until the first run starts.
    pub run_id: Option<Uuid>,
    pub input_text: String,
    pub is_running: bool,
    /// Completed share of the run, 0..=100.
    pub progress_percent: u8,
    pub panels: Vec<PanelState>,
}

impl ComicBoard {
    /// Fresh board for a new run: all panels pending, progress zero.
    #[must_use]
    pub fn started(run_id: Uuid, input_text: &str) -> Self {
        Self {
            run_id: Some(run_id),
            input_text: input_text.to_string(),
            is_running: true,
            progress_percent: 0,
            panels: PanelId::all().map(PanelState::pending).collect(),
        }
    }

    #[must_use]
    pub fn panel(&self, id: PanelId) -> Option<&PanelState> {
        self.panels.get(id.index())
    }

    pub fn panel_mut(&mut self, id: PanelId) -> Option<&mut PanelState> {
        self.panels.get_mut(id.index())
    }

    #[must_use]
    pub fn is_current(&self, run_id: Uuid) -> bool {
        self.run_id == Some(run_id)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.panels.iter().filter(|p| p.is_completed()).count()
    }

    #[must_use]
    pub fn generating_count(&self) -> usize {
        self.panels
            .iter()
            .filter(|p| p.status() == PanelStatus::Generating)
            .count()
    }

    /// True once a full set of panels exists and every one is completed.
    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.panels.len() == PANEL_COUNT && self.panels.iter().all(PanelState::is_completed)
    }
}

/// Progress after `completed` of `PANEL_COUNT` panels, as a whole percentage.
#[must_use]
pub fn progress_for(completed: usize) -> u8 {
    let pct = completed.min(PANEL_COUNT) * 100 / PANEL_COUNT;
    u8::try_from(pct).unwrap_or(100)
}

#[cfg(test)]
#[path = "board_test.rs"]
mod tests;
