use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{get_attendance, get_attendance_summary, mark_attendance};
use crate::state::AppState;

pub fn init_attendance_router() -> Router<AppState> {
    Router::new()
        .route("/", post(mark_attendance).get(get_attendance))
        .route("/summary/{student_id}", get(get_attendance_summary))
}
