//! `/ws` sessions over a real socket.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{protocol::frame::coding::CloseCode, Message},
};

use edgebin::config::EdgebinConfig;

mod common;

#[tokio::test]
async fn test_echo_ping_date_close() {
    let server = common::spawn_edgebin(EdgebinConfig::default()).await;
    let (mut ws, response) = connect_async(server.ws_url("/ws")).await.unwrap();
    assert_eq!(response.status().as_u16(), 101);

    ws.send(Message::text("hello")).await.unwrap();
    let reply = ws.next().await.unwrap().unwrap();
    assert_eq!(reply.into_text().unwrap().as_str(), "hello");

    ws.send(Message::binary(vec![9u8, 8, 7])).await.unwrap();
    let reply = ws.next().await.unwrap().unwrap();
    assert_eq!(reply.into_data().as_ref(), &[9u8, 8, 7]);

    ws.send(Message::text("ping")).await.unwrap();
    let reply = ws.next().await.unwrap().unwrap();
    assert_eq!(reply.into_text().unwrap().as_str(), "pong");

    ws.send(Message::text("date")).await.unwrap();
    let reply = ws.next().await.unwrap().unwrap();
    let date = reply.into_text().unwrap();
    assert!(!date.is_empty());
    assert_ne!(date.as_str(), "date");

    ws.send(Message::text("close")).await.unwrap();
    match ws.next().await.unwrap().unwrap() {
        Message::Close(Some(frame)) => {
            assert_eq!(frame.code, CloseCode::Normal);
            assert_eq!(frame.reason.as_str(), "Normal Closure");
        }
        other => panic!("expected close frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let server = common::spawn_edgebin(EdgebinConfig::default()).await;
    let (mut a, _) = connect_async(server.ws_url("/ws")).await.unwrap();
    let (mut b, _) = connect_async(server.ws_url("/ws")).await.unwrap();

    a.send(Message::text("from a")).await.unwrap();
    b.send(Message::text("from b")).await.unwrap();

    let reply_b = b.next().await.unwrap().unwrap();
    let reply_a = a.next().await.unwrap().unwrap();
    assert_eq!(reply_a.into_text().unwrap().as_str(), "from a");
    assert_eq!(reply_b.into_text().unwrap().as_str(), "from b");
}

#[tokio::test]
async fn test_plain_get_is_rejected() {
    let server = common::spawn_edgebin(EdgebinConfig::default()).await;
    let res = common::client().get(server.url("/ws")).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
}
