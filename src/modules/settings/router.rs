use axum::{Router, routing::get};

use super::controller::{get_setting, get_settings, upsert_setting};
use crate::state::AppState;

pub fn init_settings_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_settings))
        .route("/{key}", get(get_setting).put(upsert_setting))
}
