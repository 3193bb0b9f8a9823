use axum::{Router, routing::get};

use super::controller::{get_performance_trends, get_subject_distribution, get_top_performers};
use crate::state::AppState;

pub fn init_analytics_router() -> Router<AppState> {
    Router::new()
        .route("/class/{class_id}/top-performers", get(get_top_performers))
        .route(
            "/subject/{subject_id}/distribution",
            get(get_subject_distribution),
        )
        .route("/trends", get(get_performance_trends))
}
