use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde_json::json;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::role::{require_admin, require_staff};
use crate::modules::analytics::router::init_analytics_router;
use crate::modules::attendance::router::init_attendance_router;
use crate::modules::audit::router::init_audit_router;
use crate::modules::auth::router::init_auth_router;
use crate::modules::classes::router::init_classes_router;
use crate::modules::notifications::router::init_notifications_router;
use crate::modules::reports::router::init_reports_router;
use crate::modules::results::router::init_results_router;
use crate::modules::settings::router::init_settings_router;
use crate::modules::students::router::init_students_router;
use crate::modules::subjects::router::init_subjects_router;
use crate::modules::teachers::router::init_teachers_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Server is running",
    }))
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest(
            "/api/v1",
            Router::new()
                .nest("/auth", init_auth_router())
                .nest(
                    "/users",
                    init_users_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest("/students", init_students_router())
                .nest("/teachers", init_teachers_router())
                .nest("/classes", init_classes_router())
                .nest("/subjects", init_subjects_router())
                .nest("/results", init_results_router())
                .nest("/attendance", init_attendance_router())
                .nest("/reports", init_reports_router())
                .nest(
                    "/analytics",
                    init_analytics_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_staff,
                    )),
                )
                .nest("/notifications", init_notifications_router())
                .nest(
                    "/audit",
                    init_audit_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_admin,
                    )),
                )
                .nest(
                    "/settings",
                    init_settings_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_admin,
                    )),
                ),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}
