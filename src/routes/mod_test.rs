use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::*;
use crate::frame::{Data, Frame, Status};
use crate::state::test_helpers::{MockGenerator, test_config};

#[tokio::test]
async fn healthz_returns_ok() {
    assert_eq!(healthz().await, StatusCode::OK);
}

#[tokio::test]
async fn examples_lists_three_prompts() {
    let Json(body) = examples().await;
    let prompts = body["prompts"].as_array().unwrap();

    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].as_str().unwrap().contains("小猫咪"));
}

// =============================================================================
// LIVE SOCKET
// =============================================================================

type Client = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn serve() -> String {
    let state = AppState::new(test_config(), Arc::new(MockGenerator::new(Duration::from_millis(10))));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });
    format!("ws://{addr}/api/ws")
}

async fn next_frame(client: &mut Client) -> Frame {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for frame")
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn socket_session_runs_a_comic_end_to_end() {
    let url = serve().await;
    let (mut client, _) = connect_async(url).await.unwrap();

    let welcome = next_frame(&mut client).await;
    assert_eq!(welcome.syscall, "session:connected");
    assert!(welcome.data.contains_key("client_id"));

    let initial = next_frame(&mut client).await;
    assert_eq!(initial.syscall, "comic:board");
    assert_eq!(initial.data["board"]["empty"], true);

    let mut data = Data::new();
    data.insert("text".into(), json!("一只小猫追蝴蝶"));
    let start = Frame::request("comic:start", data);
    client
        .send(Message::Text(serde_json::to_string(&start).unwrap().into()))
        .await
        .unwrap();

    let mut replied = false;
    let mut completed_notice = false;
    let mut last_board = None;
    while !(replied && completed_notice) {
        let frame = next_frame(&mut client).await;
        match frame.syscall.as_str() {
            "comic:start" => {
                assert_eq!(frame.parent_id, Some(start.id));
                assert_eq!(frame.status, Status::Done);
                replied = true;
            }
            "comic:board" => last_board = Some(frame.data["board"].clone()),
            "comic:notice" => {
                assert_eq!(frame.data["kind"], "completed");
                let board = last_board.as_ref().expect("board pushed before notice");
                assert_eq!(board["is_running"], false);
                assert_eq!(board["actions_enabled"], true);
                completed_notice = true;
            }
            other => panic!("unexpected frame {other}"),
        }
    }

    let board = last_board.unwrap();
    assert_eq!(board["progress_percent"], 100);
    assert_eq!(board["actions_enabled"], true);
    assert_eq!(board["panels"].as_array().unwrap().len(), 4);
}
