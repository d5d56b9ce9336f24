//! Realtime notification stream.
//!
//! `/api/notifications/ws` pushes every notification inserted for the
//! session's user as soon as it is committed. The identity comes from the
//! upgrade request's `x-user-id` header, so a socket never sees another
//! user's events.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::SessionId;
use crate::models::notification::NotificationResponse;
use crate::services::notifications;
use crate::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Control message from the client
#[derive(Debug, Clone, Deserialize)]
pub struct WsClientRequest {
    /// `ping` or `unsubscribe`
    pub action: String,
}

/// Message to the client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    #[serde(rename = "subscribed")]
    Subscribed { user_id: Uuid },
    /// Latest notifications and the unread count at subscription time
    #[serde(rename = "initial")]
    Initial {
        notifications: Vec<NotificationResponse>,
        unread_count: u64,
    },
    #[serde(rename = "notification")]
    Notification { notification: NotificationResponse },
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(rename = "pong")]
    Pong,
}

pub async fn notifications_websocket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    SessionId(user_id): SessionId,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &WsMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(text) => sender.send(Message::Text(text.into())).await,
        Err(e) => {
            error!("Failed to encode WebSocket message: {}", e);
            Ok(())
        }
    }
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: Uuid) {
    let (mut sender, mut receiver) = socket.split();

    info!("Notifications WebSocket opened for {}", user_id);

    // Subscribe before reading the initial state so nothing inserted in
    // between is lost.
    let mut broadcast_rx = state.notifier.subscribe();

    if send_message(&mut sender, &WsMessage::Subscribed { user_id })
        .await
        .is_err()
    {
        return;
    }

    let store = state.store.as_ref();
    let initial = match (
        notifications::list_notifications(store, user_id, None).await,
        notifications::unread_count(store, user_id).await,
    ) {
        (Ok(list), Ok(unread_count)) => WsMessage::Initial {
            notifications: list.into_iter().map(Into::into).collect(),
            unread_count,
        },
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to load notifications for {}: {}", user_id, e);
            WsMessage::Error {
                message: "failed to load notifications".to_string(),
            }
        }
    };
    if send_message(&mut sender, &initial).await.is_err() {
        return;
    }

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    // The first tick completes immediately
    heartbeat.tick().await;

    loop {
        tokio::select! {
            result = broadcast_rx.recv() => {
                match result {
                    Ok(notification) => {
                        if notification.user_id != user_id {
                            continue;
                        }
                        if let Err(e) = send_message(&mut sender, &WsMessage::Notification { notification }).await {
                            debug!("WebSocket send error: {}", e);
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Notification stream for {} missed {} events", user_id, n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Notification channel closed");
                        break;
                    }
                }
            }

            _ = heartbeat.tick() => {
                if let Err(e) = sender.send(Message::Ping(axum::body::Bytes::new())).await {
                    debug!("Heartbeat failed: {}", e);
                    break;
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<WsClientRequest>(&text) {
                            Ok(req) if req.action == "ping" => {
                                if send_message(&mut sender, &WsMessage::Pong).await.is_err() {
                                    break;
                                }
                            }
                            Ok(req) if req.action == "unsubscribe" => {
                                info!("Client {} unsubscribed", user_id);
                                break;
                            }
                            _ => {
                                let err = WsMessage::Error {
                                    message: "unknown action".to_string(),
                                };
                                if send_message(&mut sender, &err).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("WebSocket closed by client");
                        break;
                    }
                    Some(Err(e)) => {
                        error!("WebSocket receive error: {}", e);
                        break;
                    }
                    None => {
                        debug!("WebSocket stream ended");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("Notifications WebSocket closed for {}", user_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_ws_message_tags() {
        let user_id = Uuid::new_v4();
        let json = serde_json::to_value(WsMessage::Subscribed { user_id }).unwrap();
        assert_eq!(json["type"], "subscribed");
        assert_eq!(json["user_id"], user_id.to_string());

        let json = serde_json::to_value(WsMessage::Pong).unwrap();
        assert_eq!(json["type"], "pong");
    }

    #[test]
    fn test_notification_message_keeps_its_own_type() {
        let notification = NotificationResponse {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Payment Received".to_string(),
            message: "Your carbon credits have been sold!".to_string(),
            notification_type: "success".to_string(),
            related_id: None,
            read_at: None,
            created_at: Utc::now().into(),
        };

        let json = serde_json::to_value(WsMessage::Notification { notification }).unwrap();
        assert_eq!(json["type"], "notification");
        assert_eq!(json["notification"]["type"], "success");
        assert_eq!(json["notification"]["title"], "Payment Received");
    }
}
