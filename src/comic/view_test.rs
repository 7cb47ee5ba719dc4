use std::time::Duration;

use super::*;
use crate::state::test_helpers::{MockGenerator, RecordingSink};

fn id(n: u8) -> PanelId {
    PanelId::try_from(n).unwrap()
}

fn test_view() -> (ComicBoardView, Arc<GenerationSimulator>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let generator = Arc::new(MockGenerator::new(Duration::from_millis(100)));
    let sim = Arc::new(GenerationSimulator::new(generator, sink.clone(), Duration::from_secs(30)));
    let view = ComicBoardView::new(sim.clone(), sink.clone());
    (view, sim, sink)
}

// =============================================================================
// BoardView::render
// =============================================================================

#[test]
fn empty_board_renders_intro() {
    let view = BoardView::render(&ComicBoard::default());
    assert!(view.empty);
    assert!(view.panels.is_empty());
    assert!(!view.actions_enabled);
    assert_eq!(view.progress_percent, 0);
}

#[test]
fn pending_panels_render_waiting_caption() {
    let board = ComicBoard::started(uuid::Uuid::new_v4(), "story");
    let view = BoardView::render(&board);

    assert!(!view.empty);
    assert!(view.is_running);
    assert_eq!(view.panels.len(), 4);
    for panel in &view.panels {
        assert_eq!(panel.caption, Some("等待生成"));
        assert!(panel.image_url.is_none());
        assert!(!panel.can_regenerate);
    }
    assert_eq!(view.panels[2].alt, "漫画第3格");
}

#[test]
fn panel_view_serializes_for_the_page() {
    let board = ComicBoard::started(uuid::Uuid::new_v4(), "story");
    let json = serde_json::to_value(BoardView::render(&board)).unwrap();

    assert_eq!(json["panels"][0]["id"], 1);
    assert_eq!(json["panels"][0]["status"], "pending");
    assert_eq!(json["panels"][0]["caption"], "等待生成");
    assert!(json["panels"][0].get("image_url").is_none());
    assert_eq!(json["actions_enabled"], false);
}

// =============================================================================
// ComicBoardView
// =============================================================================

#[tokio::test(start_paused = true)]
async fn completed_run_enables_actions_and_regeneration() {
    let (mut view, sim, _) = test_view();

    sim.start_run("story").await.unwrap();
    let rendered = view.render();

    assert!(!rendered.is_running);
    assert_eq!(rendered.progress_percent, 100);
    assert!(rendered.actions_enabled);
    for panel in &rendered.panels {
        assert_eq!(panel.status, PanelStatus::Completed);
        assert!(panel.caption.is_none());
        assert!(panel.image_url.is_some());
        assert!(panel.can_regenerate);
    }
}

#[tokio::test(start_paused = true)]
async fn changed_renders_generating_state() {
    let (mut view, sim, _) = test_view();
    view.render();

    let pending = sim.begin_run("story").unwrap();
    let run = tokio::spawn(pending.drive());

    let mut saw_generating = false;
    while let Some(rendered) = view.changed().await {
        if rendered
            .panels
            .iter()
            .any(|p| p.status == PanelStatus::Generating && p.caption == Some("正在生成..."))
        {
            saw_generating = true;
        }
        if !rendered.is_running {
            break;
        }
    }

    run.await.unwrap().unwrap();
    assert!(saw_generating);
}

#[tokio::test(start_paused = true)]
async fn actions_disabled_until_complete() {
    let (view, sim, sink) = test_view();

    assert_eq!(view.download(), Err(ViewError::ActionsDisabled));
    assert_eq!(view.share(), Err(ViewError::ActionsDisabled));

    let pending = sim.begin_run("story").unwrap();
    assert_eq!(view.download(), Err(ViewError::ActionsDisabled));
    pending.drive().await.unwrap();

    assert!(sink.notices().iter().all(|n| *n == Notice::Completed));
}

#[tokio::test(start_paused = true)]
async fn download_and_share_only_notify() {
    let (view, sim, sink) = test_view();
    sim.start_run("story").await.unwrap();
    let before = sim.snapshot();

    view.download().unwrap();
    view.share().unwrap();

    assert_eq!(sim.snapshot(), before);
    assert_eq!(sink.notices(), vec![Notice::Completed, Notice::DownloadStarted, Notice::ShareComingSoon]);
}

#[tokio::test(start_paused = true)]
async fn regenerate_disables_actions_until_done() {
    let (mut view, sim, _) = test_view();
    sim.start_run("story").await.unwrap();

    let pending = view.regenerate(id(1)).unwrap();
    let during = view.render();
    assert!(!during.actions_enabled);
    assert_eq!(during.panels[0].status, PanelStatus::Generating);
    assert!(during.panels[1].can_regenerate);
    assert_eq!(view.share(), Err(ViewError::ActionsDisabled));

    pending.drive().await.unwrap();
    assert!(view.render().actions_enabled);
}
