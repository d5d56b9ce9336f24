use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::notifications;

db_enum! {
    pub enum NotificationType {
        Success => "success",
        Warning => "warning",
        Info => "info",
        Error => "error",
    }
}

/// Query parameters for GET /api/notifications
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationsQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub related_id: Option<Uuid>,
    pub read_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
}

impl From<notifications::Model> for NotificationResponse {
    fn from(model: notifications::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            message: model.message,
            notification_type: model.notification_type,
            related_id: model.related_id,
            read_at: model.read_at,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}
