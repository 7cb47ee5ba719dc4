//! WebSocket handler — one generator session per connection.
//!
//! DESIGN
//! ======
//! Each connection owns a private simulator, its board, and a notice channel.
//! The connection loop `select!`s over:
//! - Incoming client frames → parse + dispatch by syscall
//! - Board changes → push a rendered `comic:board` frame
//! - Notices → push a `comic:notice` frame
//! - Finished background tasks (runs, regenerations) → reap
//!
//! The select is biased so a pending board change is always sent before a
//! pending notice.
//!
//! Handlers answer immediately: they validate and claim the board, spawn the
//! slow `drive()` onto the session's `JoinSet`, and return an `Outcome`.
//! Progress then reaches the client through board frames.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with `client_id`, then the board
//! 2. Client sends `comic:*` frames → dispatch → handler returns Outcome
//! 3. Close → abort in-flight tasks → board and simulator are dropped

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::comic::notify::{Notice, NotificationSink};
use crate::comic::panel::PanelId;
use crate::comic::simulator::{GenerationSimulator, SimulatorError};
use crate::comic::view::{BoardView, ComicBoardView};
use crate::frame::{Data, Frame, Status};
use crate::state::AppState;

/// Notices queued per session before new ones are dropped.
const NOTICE_BUFFER: usize = 32;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. The dispatch layer turns it into
/// the reply frame; handlers never send frames directly.
enum Outcome {
    /// Send done+data to sender.
    Reply(Data),
    /// Send empty done to sender.
    Done,
}

// =============================================================================
// SESSION
// =============================================================================

struct Session {
    client_id: Uuid,
    simulator: Arc<GenerationSimulator>,
    view: ComicBoardView,
    notices: mpsc::Receiver<Notice>,
    tasks: JoinSet<()>,
}

impl Session {
    fn new(state: &AppState) -> Self {
        let (notice_tx, notices) = mpsc::channel::<Notice>(NOTICE_BUFFER);
        let notifier: Arc<dyn NotificationSink> = Arc::new(notice_tx);
        let simulator = state.new_simulator(Arc::clone(&notifier));
        let view = ComicBoardView::new(Arc::clone(&simulator), notifier);
        Self { client_id: Uuid::new_v4(), simulator, view, notices, tasks: JoinSet::new() }
    }
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let mut session = Session::new(&state);
    let client_id = session.client_id;

    let welcome = Frame::request("session:connected", Data::new()).with_data("client_id", client_id.to_string());
    if send_frame(&mut socket, &welcome).await.is_err() {
        return;
    }
    let initial = board_frame(&session.view.render());
    if send_frame(&mut socket, &initial).await.is_err() {
        return;
    }

    info!(%client_id, "ws: session opened");

    'session: loop {
        // Board before notices; a notice is queued only after its board update.
        tokio::select! {
            biased;

            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        for frame in process_inbound_text(&mut session, text.as_str()) {
                            if send_frame(&mut socket, &frame).await.is_err() {
                                break 'session;
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(view) = session.view.changed() => {
                if send_frame(&mut socket, &board_frame(&view)).await.is_err() {
                    break;
                }
            }
            Some(notice) = session.notices.recv() => {
                if send_frame(&mut socket, &notice_frame(&notice)).await.is_err() {
                    break;
                }
            }
            Some(joined) = session.tasks.join_next() => {
                if let Err(e) = joined {
                    warn!(%client_id, error = %e, "ws: session task failed");
                }
            }
        }
    }

    session.tasks.abort_all();
    info!(%client_id, "ws: session closed");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and process one inbound text frame and return frames for the sender.
///
/// Kept free of socket I/O so tests can drive a session directly.
fn process_inbound_text(session: &mut Session, text: &str) -> Vec<Frame> {
    let req: Frame = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(client_id = %session.client_id, error = %e, "ws: invalid inbound frame");
            let err = Frame::request("gateway:error", Data::new()).with_data("message", format!("invalid json: {e}"));
            return vec![err];
        }
    };

    info!(client_id = %session.client_id, id = %req.id, syscall = %req.syscall, "ws: recv frame");

    let result = match req.prefix() {
        "comic" => handle_comic(session, &req),
        prefix => Err(req.error(format!("unknown prefix: {prefix}"))),
    };

    match result {
        Ok(Outcome::Reply(data)) => vec![req.done_with(data)],
        Ok(Outcome::Done) => vec![req.done()],
        Err(err_frame) => vec![err_frame],
    }
}

// =============================================================================
// COMIC HANDLERS
// =============================================================================

fn handle_comic(session: &mut Session, req: &Frame) -> Result<Outcome, Frame> {
    match req.op() {
        "start" => {
            let text = req
                .data
                .get("text")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            let run = session
                .simulator
                .begin_run(text)
                .map_err(|e| req.error_from(&e))?;

            let run_id = run.run_id();
            let client_id = session.client_id;
            session.tasks.spawn(async move {
                if let Err(e) = run.drive().await {
                    warn!(%client_id, %run_id, error = %e, "ws: run ended early");
                }
            });

            let mut data = Data::new();
            data.insert("run_id".into(), serde_json::json!(run_id));
            Ok(Outcome::Reply(data))
        }
        "regenerate" => {
            let Some(raw) = req.data.get("panel_id").and_then(serde_json::Value::as_u64) else {
                return Err(req.error("panel_id required"));
            };
            let panel = PanelId::try_from(raw).map_err(|e| req.error_from(&SimulatorError::from(e)))?;
            let pending = session
                .view
                .regenerate(panel)
                .map_err(|e| req.error_from(&e))?;

            let client_id = session.client_id;
            session.tasks.spawn(async move {
                if let Err(e) = pending.drive().await {
                    warn!(%client_id, %panel, error = %e, "ws: regeneration ended early");
                }
            });

            let mut data = Data::new();
            data.insert("panel_id".into(), serde_json::json!(panel));
            Ok(Outcome::Reply(data))
        }
        "download" => session
            .view
            .download()
            .map(|()| Outcome::Done)
            .map_err(|e| req.error_from(&e)),
        "share" => session
            .view
            .share()
            .map(|()| Outcome::Done)
            .map_err(|e| req.error_from(&e)),
        op => Err(req.error(format!("unknown comic op: {op}"))),
    }
}

// =============================================================================
// OUTBOUND
// =============================================================================

fn board_frame(view: &BoardView) -> Frame {
    Frame::request("comic:board", Data::new()).with_data("board", serde_json::to_value(view).unwrap_or_default())
}

fn notice_frame(notice: &Notice) -> Frame {
    Frame::request("comic:notice", Data::new())
        .with_data("kind", notice.kind())
        .with_data("title", notice.title())
        .with_data("description", notice.description())
        .with_data("variant", serde_json::json!(notice.variant()))
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    if frame.status == Status::Error {
        let code = frame
            .data
            .get("code")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        let message = frame
            .data
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    }
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
