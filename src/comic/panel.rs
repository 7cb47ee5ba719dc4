//! Panel state — one quadrant of the four-panel comic.
//!
//! DESIGN
//! ======
//! `image_url` and `prompt` exist only while a panel is completed. The fields
//! are private so the transition methods below are the only writers; no
//! caller can build a half-populated panel.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of panels in every run.
pub const PANEL_COUNT: usize = 4;

// =============================================================================
// PANEL ID
// =============================================================================

/// 1-based panel identity, always within `1..=PANEL_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PanelId(u8);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("panel id out of range: {0} (expected 1..={max})", max = PANEL_COUNT)]
pub struct PanelIdOutOfRange(pub u64);

impl PanelId {
    /// Panel id for a 0-based position in the run.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        if index < PANEL_COUNT {
            u8::try_from(index + 1).ok().map(Self)
        } else {
            None
        }
    }

    /// 0-based position in the run.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0) - 1
    }

    /// 1-based ordinal, as shown to the user.
    #[must_use]
    pub fn ordinal(self) -> u8 {
        self.0
    }

    /// All panel ids in run order.
    pub fn all() -> impl Iterator<Item = PanelId> {
        (0..PANEL_COUNT).filter_map(Self::from_index)
    }
}

impl TryFrom<u64> for PanelId {
    type Error = PanelIdOutOfRange;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        match usize::try_from(raw) {
            Ok(n) if (1..=PANEL_COUNT).contains(&n) => Self::from_index(n - 1).ok_or(PanelIdOutOfRange(raw)),
            _ => Err(PanelIdOutOfRange(raw)),
        }
    }
}

impl TryFrom<u8> for PanelId {
    type Error = PanelIdOutOfRange;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::try_from(u64::from(raw))
    }
}

impl From<PanelId> for u8 {
    fn from(id: PanelId) -> Self {
        id.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// STATUS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelStatus {
    Pending,
    Generating,
    Completed,
}

// =============================================================================
// PANEL STATE
// =============================================================================

/// Artwork attached to a completed panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub image_url: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelState {
    id: PanelId,
    status: PanelStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
}

impl PanelState {
    #[must_use]
    pub fn pending(id: PanelId) -> Self {
        Self { id, status: PanelStatus::Pending, image_url: None, prompt: None }
    }

    #[must_use]
    pub fn id(&self) -> PanelId {
        self.id
    }

    #[must_use]
    pub fn status(&self) -> PanelStatus {
        self.status
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == PanelStatus::Completed
    }

    /// Current artwork, if the panel is completed.
    #[must_use]
    pub fn artwork(&self) -> Option<Artwork> {
        match (&self.image_url, &self.prompt) {
            (Some(image_url), Some(prompt)) => Some(Artwork { image_url: image_url.clone(), prompt: prompt.clone() }),
            _ => None,
        }
    }

    /// Enter `generating`. Drops any previous artwork.
    pub fn begin_generating(&mut self) {
        self.status = PanelStatus::Generating;
        self.image_url = None;
        self.prompt = None;
    }

    /// Enter `completed` with the given artwork.
    pub fn complete(&mut self, artwork: Artwork) {
        self.status = PanelStatus::Completed;
        self.image_url = Some(artwork.image_url);
        self.prompt = Some(artwork.prompt);
    }

    /// Return to `pending` after a failed first generation.
    pub fn reset_pending(&mut self) {
        self.status = PanelStatus::Pending;
        self.image_url = None;
        self.prompt = None;
    }
}

#[cfg(test)]
#[path = "panel_test.rs"]
mod tests;
