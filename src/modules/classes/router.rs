use axum::{
    Router,
    routing::{delete, get, post},
};

use super::controller::{
    assign_student, create_class, delete_class, get_class, get_class_roster, get_classes,
    remove_student, update_class,
};
use crate::state::AppState;

pub fn init_classes_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_class).get(get_classes))
        .route(
            "/{id}",
            get(get_class).put(update_class).delete(delete_class),
        )
        .route("/{id}/students", get(get_class_roster).post(assign_student))
        .route("/{id}/students/{student_id}", delete(remove_student))
}
