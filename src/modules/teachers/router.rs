use axum::{
    Router,
    routing::{get, post, put},
};

use super::controller::{
    assign_subjects, create_teacher, delete_teacher, get_teacher, get_teachers, update_teacher,
};
use crate::state::AppState;

pub fn init_teachers_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_teacher).get(get_teachers))
        .route(
            "/{id}",
            get(get_teacher).put(update_teacher).delete(delete_teacher),
        )
        .route("/{id}/subjects", put(assign_subjects))
}
