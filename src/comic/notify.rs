//! User-facing notices and the sink they are delivered to.
//!
//! The generator page shows these as dismissible toasts. The simulator and
//! the view only ever push notices; how they reach the user is up to the sink.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;

use super::panel::PanelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Run requested with empty or whitespace-only text.
    EmptyInput,
    /// All four panels finished.
    Completed,
    /// The image backend failed for a panel.
    GenerationFailed { panel: PanelId },
    DownloadStarted,
    ShareComingSoon,
}

impl Notice {
    /// Stable machine-readable name.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::Completed => "completed",
            Self::GenerationFailed { .. } => "generation_failed",
            Self::DownloadStarted => "download_started",
            Self::ShareComingSoon => "share_coming_soon",
        }
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::EmptyInput => "请输入文字",
            Self::Completed => "生成完成！",
            Self::GenerationFailed { .. } => "生成失败",
            Self::DownloadStarted => "开始下载",
            Self::ShareComingSoon => "分享功能",
        }
    }

    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::EmptyInput => "请先输入您想要转换为漫画的文字内容".into(),
            Self::Completed => "您的四格漫画已成功生成".into(),
            Self::GenerationFailed { panel } => format!("第{panel}格生成失败，请稍后重试"),
            Self::DownloadStarted => "正在准备下载您的漫画...".into(),
            Self::ShareComingSoon => "分享功能即将推出！".into(),
        }
    }

    #[must_use]
    pub fn variant(&self) -> NoticeVariant {
        match self {
            Self::EmptyInput | Self::GenerationFailed { .. } => NoticeVariant::Destructive,
            Self::Completed | Self::DownloadStarted | Self::ShareComingSoon => NoticeVariant::Default,
        }
    }
}

/// Receiver of user-facing notices.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Session sink: queue the notice for the websocket loop.
impl NotificationSink for mpsc::Sender<Notice> {
    fn notify(&self, notice: Notice) {
        let kind = notice.kind();
        if let Err(e) = self.try_send(notice) {
            warn!(kind, error = %e, "notify: notice dropped");
        }
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
