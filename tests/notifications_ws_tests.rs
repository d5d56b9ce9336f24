mod common;

use std::time::Duration;

use ecosteps_backend::handlers;
use ecosteps_backend::models::notification::NotificationType;
use ecosteps_backend::repositories::NewNotification;
use ecosteps_backend::services::notifications;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

use crate::common::TestApp;

type Socket = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for a message")
            .expect("stream ended")
            .expect("websocket error");

        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn spawn_server(app: &TestApp) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = handlers::router(app.state.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn connect(addr: std::net::SocketAddr, user: Option<Uuid>) -> Result<Socket, tokio_tungstenite::tungstenite::Error> {
    let mut request = format!("ws://{addr}/api/notifications/ws")
        .into_client_request()
        .unwrap();
    if let Some(user) = user {
        request
            .headers_mut()
            .insert("x-user-id", user.to_string().parse().unwrap());
    }
    tokio_tungstenite::connect_async(request).await.map(|(socket, _)| socket)
}

fn notification(user_id: Uuid, title: &str) -> NewNotification {
    NewNotification {
        user_id,
        title: title.to_string(),
        message: "test".to_string(),
        notification_type: NotificationType::Info,
        related_id: None,
    }
}

#[tokio::test]
async fn test_stream_requires_session() {
    let app = TestApp::new();
    let addr = spawn_server(&app).await;

    assert!(connect(addr, None).await.is_err());
}

#[tokio::test]
async fn test_stream_delivers_only_own_notifications() {
    let app = TestApp::new();
    let addr = spawn_server(&app).await;
    let user = Uuid::new_v4();
    let other = Uuid::new_v4();
    let store = app.state.store.as_ref();

    notifications::notify(store, &app.state.notifier, notification(user, "Earlier"))
        .await
        .unwrap();

    let mut socket = connect(addr, Some(user)).await.unwrap();

    let msg = next_json(&mut socket).await;
    assert_eq!(msg["type"], "subscribed");
    assert_eq!(msg["user_id"], user.to_string());

    let msg = next_json(&mut socket).await;
    assert_eq!(msg["type"], "initial");
    assert_eq!(msg["unread_count"], 1);
    assert_eq!(msg["notifications"][0]["title"], "Earlier");

    notifications::notify(store, &app.state.notifier, notification(other, "Not yours"))
        .await
        .unwrap();
    notifications::notify(store, &app.state.notifier, notification(user, "Yours"))
        .await
        .unwrap();

    let msg = next_json(&mut socket).await;
    assert_eq!(msg["type"], "notification");
    assert_eq!(msg["notification"]["title"], "Yours");
}

#[tokio::test]
async fn test_ping_and_unsubscribe() {
    let app = TestApp::new();
    let addr = spawn_server(&app).await;
    let mut socket = connect(addr, Some(Uuid::new_v4())).await.unwrap();

    next_json(&mut socket).await;
    next_json(&mut socket).await;

    socket
        .send(Message::Text(r#"{"action":"ping"}"#.into()))
        .await
        .unwrap();
    let msg = next_json(&mut socket).await;
    assert_eq!(msg["type"], "pong");

    socket
        .send(Message::Text(r#"{"action":"dance"}"#.into()))
        .await
        .unwrap();
    let msg = next_json(&mut socket).await;
    assert_eq!(msg["type"], "error");

    socket
        .send(Message::Text(r#"{"action":"unsubscribe"}"#.into()))
        .await
        .unwrap();

    // The server drops the connection after an unsubscribe
    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match socket.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok());
}
