use axum::{
    Router,
    routing::{get, patch},
};

use super::controller::{get_notifications, mark_read, unread_count};
use crate::state::AppState;

pub fn init_notifications_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_notifications))
        .route("/unread-count", get(unread_count))
        .route("/{id}/read", patch(mark_read))
}
