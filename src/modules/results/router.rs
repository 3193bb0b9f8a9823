use axum::{
    Router,
    routing::{get, patch, post},
};

use super::controller::{
    approve_result, delete_result, enter_marks, get_result, get_results, update_result,
};
use crate::state::AppState;

pub fn init_results_router() -> Router<AppState> {
    Router::new()
        .route("/enter-marks", post(enter_marks))
        .route("/", get(get_results))
        .route(
            "/{id}",
            get(get_result).put(update_result).delete(delete_result),
        )
        .route("/{id}/approve", patch(approve_result))
}
