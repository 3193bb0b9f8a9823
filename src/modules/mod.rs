pub mod analytics;
pub mod attendance;
pub mod audit;
pub mod auth;
pub mod classes;
pub mod notifications;
pub mod reports;
pub mod results;
pub mod settings;
pub mod students;
pub mod subjects;
pub mod teachers;
pub mod users;

pub use self::auth::model::LoginRequest;
pub use self::users::model::User;
