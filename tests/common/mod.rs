use axum::Router;
use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use sqlx::PgPool;
use uuid::Uuid;

use scorebook::config::cors::CorsConfig;
use scorebook::config::jwt::JwtConfig;
use scorebook::modules::users::model::UserRole;
use scorebook::router::init_router;
use scorebook::state::AppState;
use scorebook::utils::jwt::create_access_token;
use scorebook::utils::password::hash_password;

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "test-access-secret".to_string(),
        refresh_secret: "test-refresh-secret".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
    }
}

pub fn setup_test_app(pool: PgPool) -> Router {
    let state = AppState {
        db: pool,
        jwt_config: test_jwt_config(),
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:4200".to_string()],
        },
    };
    init_router(state)
}

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

pub async fn create_test_user(
    pool: &PgPool,
    email: &str,
    password: &str,
    role: UserRole,
) -> TestUser {
    let hashed = hash_password(password).unwrap();

    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO users (first_name, last_name, email, password, role) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .bind("Test")
    .bind("User")
    .bind(email)
    .bind(hashed)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        email: email.to_string(),
        password: password.to_string(),
        role,
    }
}

#[allow(dead_code)]
pub struct TestStudent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub roll_no: String,
}

#[allow(dead_code)]
pub async fn create_test_student(
    pool: &PgPool,
    roll_no: &str,
    class_id: Option<Uuid>,
) -> TestStudent {
    let user = create_test_user(
        pool,
        &generate_unique_email(),
        "studentpass123",
        UserRole::Student,
    )
    .await;

    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO students (user_id, roll_no, department, batch, semester, class_id) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id",
    )
    .bind(user.id)
    .bind(roll_no)
    .bind("Computer Science")
    .bind("2024")
    .bind(1)
    .bind(class_id)
    .fetch_one(pool)
    .await
    .unwrap();

    TestStudent {
        id,
        user_id: user.id,
        roll_no: roll_no.to_string(),
    }
}

#[allow(dead_code)]
pub async fn create_test_subject(
    pool: &PgPool,
    code: &str,
    max_marks: f64,
    pass_marks: f64,
) -> Uuid {
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO subjects (code, name, max_marks, pass_marks) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(code)
    .bind(format!("Subject {}", code))
    .bind(max_marks)
    .bind(pass_marks)
    .fetch_one(pool)
    .await
    .unwrap();

    id
}

#[allow(dead_code)]
pub async fn create_test_class(pool: &PgPool, code: &str) -> Uuid {
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO classes (name, code, year, semester) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(format!("Class {}", code))
    .bind(code)
    .bind(2025)
    .bind(1)
    .fetch_one(pool)
    .await
    .unwrap();

    id
}

/// Mints a valid access token for a user at token version 0.
#[allow(dead_code)]
pub fn token_for(user_id: Uuid, role: UserRole) -> String {
    create_access_token(user_id, &role, 0, &test_jwt_config()).unwrap()
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[allow(dead_code)]
pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    builder.body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
