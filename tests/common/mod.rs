//! Shared test infrastructure: in-memory database plus wired services.

// Not every suite uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use unigate::auth::{
    AuthService, Gender, LoginRequest, ProfileService, RegisterRequest, TokenIssuer,
};
use unigate::config::{AuthConfig, DatabaseConfig};
use unigate::domain::UserId;
use unigate::storage::{
    create_pool, run_migrations, DbPool, SqlxUserRepository, UserRepository,
};

pub const TEACHER_ROLE_ID: i64 = 2;
pub const STUDENT_ROLE_ID: i64 = 3;

pub const DEFAULT_PASSWORD: &str = "strongPa$$word123";

/// Fresh in-memory database with migrations applied.
///
/// The pool is pinned to a single connection: a pooled `:memory:` SQLite
/// database is otherwise per-connection.
pub async fn test_pool() -> DbPool {
    let config = DatabaseConfig {
        url: "sqlite://:memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        idle_timeout_seconds: None,
        ..Default::default()
    };
    let pool = create_pool(&config).await.expect("in-memory pool should connect");
    run_migrations(&pool).await.expect("migrations should apply");
    pool
}

pub fn test_token_issuer() -> Arc<TokenIssuer> {
    let config = AuthConfig {
        issuer: "TestIssuer".to_string(),
        audience: "TestAudience".to_string(),
        signing_key: "143ba536-9d4b-45c5-b2ff-3f04e0ca1157".to_string(),
        token_ttl_minutes: 60,
    };
    Arc::new(TokenIssuer::from_config(&config).expect("test token config should be valid"))
}

pub struct TestHarness {
    pub pool: DbPool,
    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub token_issuer: Arc<TokenIssuer>,
}

pub async fn harness() -> TestHarness {
    let pool = test_pool().await;
    let token_issuer = test_token_issuer();
    let auth_service = AuthService::with_sqlx(pool.clone(), token_issuer.clone());
    let profile_service = ProfileService::with_sqlx(pool.clone());
    TestHarness { pool, auth_service, profile_service, token_issuer }
}

pub fn register_request(email: &str, role_id: i64) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        middle_name: None,
        gender: Gender::Female,
        birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
        phone_number: "+12025550143".to_string(),
        password: DEFAULT_PASSWORD.to_string(),
        role_id,
    }
}

pub fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest { login: email.to_string(), password: password.to_string() }
}

impl TestHarness {
    /// Register a user with the default password and return its id.
    pub async fn register_user(&self, email: &str, role_id: i64) -> UserId {
        let result = self
            .auth_service
            .register(&register_request(email, role_id))
            .await
            .expect("register should not hit a storage fault");
        assert!(result.is_success(), "registration failed: {:?}", result.errors);
        self.user_id_by_email(email).await
    }

    pub async fn user_id_by_email(&self, email: &str) -> UserId {
        let repository = SqlxUserRepository::new(self.pool.clone());
        repository
            .get_user_by_email(email)
            .await
            .expect("user lookup should not fail")
            .expect("user should exist")
            .id
    }

    pub async fn failed_attempts(&self, email: &str) -> u32 {
        let repository = SqlxUserRepository::new(self.pool.clone());
        repository
            .get_user_by_email(email)
            .await
            .expect("user lookup should not fail")
            .expect("user should exist")
            .failed_login_attempts
    }

    pub async fn is_active(&self, email: &str) -> bool {
        let repository = SqlxUserRepository::new(self.pool.clone());
        repository
            .get_user_by_email(email)
            .await
            .expect("user lookup should not fail")
            .expect("user should exist")
            .active
    }
}
