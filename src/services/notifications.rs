//! Notification inbox and realtime fan-out.
//!
//! Rows are written by the store (often inside another operation's
//! transaction); the broadcaster only sees them after they are committed.

use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::entities::notifications;
use crate::error::{AppError, AppResult};
use crate::models::notification::NotificationResponse;
use crate::repositories::{NewNotification, Store};

pub const DEFAULT_LIST_LIMIT: u64 = 20;
pub const MAX_LIST_LIMIT: u64 = 100;

const CHANNEL_CAPACITY: usize = 1000;

/// Fan-out of freshly inserted notifications to WebSocket subscribers
#[derive(Clone)]
pub struct NotificationBroadcaster {
    tx: broadcast::Sender<NotificationResponse>,
}

impl NotificationBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn broadcast(&self, notification: &notifications::Model) {
        // Ignore errors if no subscribers
        let _ = self.tx.send(notification.clone().into());
    }

    pub fn broadcast_all<'a>(&self, notifications: impl IntoIterator<Item = &'a notifications::Model>) {
        for notification in notifications {
            self.broadcast(notification);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationResponse> {
        self.tx.subscribe()
    }
}

impl Default for NotificationBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Stores a standalone notification and pushes it to live subscribers
pub async fn notify(
    store: &dyn Store,
    broadcaster: &NotificationBroadcaster,
    notification: NewNotification,
) -> AppResult<notifications::Model> {
    let created = store.create_notification(notification).await?;
    broadcaster.broadcast(&created);

    tracing::debug!(
        "Notification {} ({}) sent to user {}",
        created.id,
        created.title,
        created.user_id
    );
    Ok(created)
}

pub fn clamp_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

pub async fn list_notifications(
    store: &dyn Store,
    user_id: Uuid,
    limit: Option<u64>,
) -> AppResult<Vec<notifications::Model>> {
    Ok(store.list_notifications(user_id, clamp_limit(limit)).await?)
}

pub async fn unread_count(store: &dyn Store, user_id: Uuid) -> AppResult<u64> {
    Ok(store.unread_count(user_id).await?)
}

/// Notifications of other users are reported as missing
async fn find_owned(
    store: &dyn Store,
    user_id: Uuid,
    id: Uuid,
) -> AppResult<notifications::Model> {
    match store.find_notification(id).await? {
        Some(n) if n.user_id == user_id => Ok(n),
        _ => Err(AppError::NotFound("notification".to_string())),
    }
}

pub async fn mark_read(
    store: &dyn Store,
    user_id: Uuid,
    id: Uuid,
) -> AppResult<notifications::Model> {
    let notification = find_owned(store, user_id, id).await?;
    if notification.read_at.is_some() {
        return Ok(notification);
    }
    Ok(store.mark_read(id, Utc::now().into()).await?)
}

pub async fn mark_all_read(store: &dyn Store, user_id: Uuid) -> AppResult<u64> {
    let updated = store.mark_all_read(user_id, Utc::now().into()).await?;
    tracing::debug!("Marked {} notifications read for user {}", updated, user_id);
    Ok(updated)
}

pub async fn delete_notification(store: &dyn Store, user_id: Uuid, id: Uuid) -> AppResult<()> {
    find_owned(store, user_id, id).await?;
    if !store.delete_notification(id).await? {
        return Err(AppError::NotFound("notification".to_string()));
    }
    Ok(())
}
