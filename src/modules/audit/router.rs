use axum::{Router, routing::get};

use super::controller::get_audit_logs;
use crate::state::AppState;

pub fn init_audit_router() -> Router<AppState> {
    Router::new().route("/", get(get_audit_logs))
}
