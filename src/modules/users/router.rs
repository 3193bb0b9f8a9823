use axum::{
    Router,
    routing::{get, patch},
};

use super::controller::{deactivate_user, get_user, get_users};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users))
        .route("/{id}", get(get_user))
        .route("/{id}/deactivate", patch(deactivate_user))
}
