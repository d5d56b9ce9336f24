// src/lib.rs

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use config::Config;
use repositories::Store;
use services::{notifications::NotificationBroadcaster, storage::ObjectStorage};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub notifier: NotificationBroadcaster,
    pub storage: ObjectStorage,
    pub reviewers: Arc<HashSet<Uuid>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        Self {
            store,
            notifier: NotificationBroadcaster::new(),
            storage: ObjectStorage::new(config.storage_root.clone()),
            reviewers: Arc::new(config.reviewer_ids.clone()),
        }
    }
}

pub mod entities {
    pub mod prelude;
    pub mod users;
    pub mod gardens;
    pub mod submissions;
    pub mod carbon_credits;
    pub mod transactions;
    pub mod notifications;
}

pub mod services {
    pub mod credit_estimator;
    pub mod credit_issuer;
    pub mod submission_lifecycle;
    pub mod settlement;
    pub mod notifications;
    pub mod users;
    pub mod gardens;
    pub mod storage;
}

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
