use scorebook::config::jwt::JwtConfig;
use scorebook::modules::users::model::UserRole;
use scorebook::utils::jwt::{
    create_access_token, create_refresh_token, issue_token_pair, verify_access_token,
    verify_refresh_token,
};
use uuid::Uuid;

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "test_access_secret_key".to_string(),
        refresh_secret: "test_refresh_secret_key".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
    }
}

#[test]
fn test_access_token_round_trip() {
    let jwt_config = get_test_jwt_config();
    let user_id = Uuid::new_v4();

    let token = create_access_token(user_id, &UserRole::Student, 3, &jwt_config).unwrap();
    let claims = verify_access_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.role, "student");
    assert_eq!(claims.token_version, 3);
}

#[test]
fn test_access_token_all_roles() {
    let jwt_config = get_test_jwt_config();
    let user_id = Uuid::new_v4();

    for (role, expected) in [
        (UserRole::Admin, "admin"),
        (UserRole::Teacher, "teacher"),
        (UserRole::Student, "student"),
    ] {
        let token = create_access_token(user_id, &role, 0, &jwt_config).unwrap();
        let claims = verify_access_token(&token, &jwt_config).unwrap();
        assert_eq!(claims.role, expected);
    }
}

#[test]
fn test_token_pair_embeds_same_version() {
    let jwt_config = get_test_jwt_config();
    let user_id = Uuid::new_v4();

    let pair = issue_token_pair(user_id, &UserRole::Teacher, 7, &jwt_config).unwrap();

    let access = verify_access_token(&pair.access_token, &jwt_config).unwrap();
    let refresh = verify_refresh_token(&pair.refresh_token, &jwt_config).unwrap();

    assert_eq!(access.token_version, 7);
    assert_eq!(refresh.token_version, 7);
    assert_eq!(access.sub, refresh.sub);
}

#[test]
fn test_verify_rejects_garbage() {
    let jwt_config = get_test_jwt_config();

    for token in [
        "invalid.token.here",
        "",
        "not.enough",
        "too.many.parts.here.extra",
        "header.payload.",
    ] {
        assert!(verify_access_token(token, &jwt_config).is_err());
        assert!(verify_refresh_token(token, &jwt_config).is_err());
    }
}

#[test]
fn test_verify_rejects_wrong_secret() {
    let jwt_config = get_test_jwt_config();
    let user_id = Uuid::new_v4();

    let token = create_access_token(user_id, &UserRole::Student, 0, &jwt_config).unwrap();

    let other_config = JwtConfig {
        access_secret: "completely_different_secret".to_string(),
        ..get_test_jwt_config()
    };

    assert!(verify_access_token(&token, &other_config).is_err());
}

#[test]
fn test_access_and_refresh_secrets_are_not_interchangeable() {
    let jwt_config = get_test_jwt_config();
    let user_id = Uuid::new_v4();

    let access = create_access_token(user_id, &UserRole::Student, 0, &jwt_config).unwrap();
    let refresh = create_refresh_token(user_id, 0, &jwt_config).unwrap();

    // An access token does not verify as a refresh token and vice versa.
    assert!(verify_refresh_token(&access, &jwt_config).is_err());
    assert!(verify_access_token(&refresh, &jwt_config).is_err());
}

#[test]
fn test_token_expiry_matches_config() {
    let jwt_config = get_test_jwt_config();
    let user_id = Uuid::new_v4();

    let token = create_access_token(user_id, &UserRole::Student, 0, &jwt_config).unwrap();
    let claims = verify_access_token(&token, &jwt_config).unwrap();

    assert_eq!(
        claims.exp - claims.iat,
        jwt_config.access_token_expiry as usize
    );

    let refresh = create_refresh_token(user_id, 0, &jwt_config).unwrap();
    let claims = verify_refresh_token(&refresh, &jwt_config).unwrap();

    assert_eq!(
        claims.exp - claims.iat,
        jwt_config.refresh_token_expiry as usize
    );
}

#[test]
fn test_expired_access_token_is_rejected() {
    let jwt_config = JwtConfig {
        access_token_expiry: -3600,
        ..get_test_jwt_config()
    };
    let user_id = Uuid::new_v4();

    let token = create_access_token(user_id, &UserRole::Student, 0, &jwt_config).unwrap();

    assert!(verify_access_token(&token, &get_test_jwt_config()).is_err());
}

#[test]
fn test_different_users_get_different_tokens() {
    let jwt_config = get_test_jwt_config();

    let token1 = create_access_token(Uuid::new_v4(), &UserRole::Student, 0, &jwt_config).unwrap();
    let token2 = create_access_token(Uuid::new_v4(), &UserRole::Student, 0, &jwt_config).unwrap();

    assert_ne!(token1, token2);
}
