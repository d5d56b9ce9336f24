//! HTTP surface of the marketplace.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::services::storage::MAX_OBJECT_BYTES;
use crate::AppState;

pub mod credits;
pub mod estimates;
pub mod gardens;
pub mod health;
pub mod notifications;
pub mod notifications_ws;
pub mod storage;
pub mod submissions;
pub mod transactions;
pub mod users;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        // Users
        .route("/api/users", post(users::create_user))
        .route("/api/users/me", get(users::get_me).patch(users::update_me))
        .route(
            "/api/users/{id}/verification",
            put(users::update_verification),
        )
        // Gardens
        .route(
            "/api/gardens",
            post(gardens::create_garden).get(gardens::list_gardens),
        )
        .route("/api/gardens/search", get(gardens::search_gardens))
        .route(
            "/api/gardens/{id}",
            get(gardens::get_garden)
                .patch(gardens::update_garden)
                .delete(gardens::delete_garden),
        )
        // Estimates and submissions
        .route("/api/estimates", post(estimates::estimate))
        .route(
            "/api/submissions",
            post(submissions::create_submission).get(submissions::list_submissions),
        )
        .route(
            "/api/submissions/pending",
            get(submissions::list_pending_submissions),
        )
        .route("/api/submissions/{id}", get(submissions::get_submission))
        .route(
            "/api/submissions/{id}/status",
            post(submissions::update_submission_status),
        )
        // Credits
        .route("/api/credits", get(credits::list_credits))
        .route("/api/credits/marketplace", get(credits::list_marketplace))
        .route("/api/credits/{id}/purchase", post(credits::purchase_credit))
        // Transactions
        .route("/api/transactions", get(transactions::list_transactions))
        .route("/api/transactions/balance", get(transactions::get_balance))
        .route("/api/transactions/stats", get(transactions::get_stats))
        .route("/api/transactions/{id}", get(transactions::get_transaction))
        .route(
            "/api/transactions/{id}/complete",
            post(transactions::complete_transaction),
        )
        .route(
            "/api/transactions/{id}/fail",
            post(transactions::fail_transaction),
        )
        .route("/api/withdrawals", post(transactions::request_withdrawal))
        // Notifications
        .route(
            "/api/notifications",
            get(notifications::list_notifications),
        )
        .route(
            "/api/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route(
            "/api/notifications/read-all",
            post(notifications::mark_all_read),
        )
        .route(
            "/api/notifications/ws",
            get(notifications_ws::notifications_websocket),
        )
        .route(
            "/api/notifications/{id}/read",
            post(notifications::mark_read),
        )
        .route(
            "/api/notifications/{id}",
            delete(notifications::delete_notification),
        )
        // Storage
        .route(
            "/api/storage/{bucket}/{*path}",
            put(storage::put_object)
                .get(storage::get_object)
                .layer(DefaultBodyLimit::max(MAX_OBJECT_BYTES)),
        )
        .with_state(state)
}
