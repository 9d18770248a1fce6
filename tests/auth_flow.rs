//! End-to-end suites for login, lockout, registration, role granting,
//! password change, and administrative unlock.

mod common;

use common::{
    harness, login_request, register_request, DEFAULT_PASSWORD, STUDENT_ROLE_ID, TEACHER_ROLE_ID,
};
use unigate::auth::{GrantUserRolesRequest, MAX_FAILED_LOGIN_ATTEMPTS};
use unigate::storage::{SqlxUserRoleRepository, UserRoleRepository};

#[tokio::test]
async fn login_with_correct_credentials_returns_token() {
    let h = harness().await;
    h.register_user("admin@admin.com", TEACHER_ROLE_ID).await;

    let result = h
        .auth_service
        .login(&login_request("admin@admin.com", DEFAULT_PASSWORD))
        .await
        .unwrap();

    assert!(result.is_success());
    assert!(result.errors.is_empty());
    let token = result.result.expect("successful login carries a token");
    assert!(!token.is_empty());

    let claims = h.token_issuer.verify(&token).unwrap();
    assert_eq!(claims.name, "admin@admin.com");
    assert_eq!(claims.roles, vec!["Teacher"]);
}

#[tokio::test]
async fn login_for_unknown_user_reports_not_found() {
    let h = harness().await;

    let result = h
        .auth_service
        .login(&login_request("someuser@somemail.com", DEFAULT_PASSWORD))
        .await
        .unwrap();

    assert!(!result.is_success());
    assert!(result.result.is_none());
    assert_eq!(result.errors, vec!["User was not found."]);
}

#[tokio::test]
async fn login_with_invalid_password_counts_down_attempts() {
    let h = harness().await;
    h.register_user("jane@uni.edu", TEACHER_ROLE_ID).await;

    let result =
        h.auth_service.login(&login_request("jane@uni.edu", "strongPa$$word")).await.unwrap();

    assert!(!result.is_success());
    assert_eq!(result.errors, vec!["Invalid password. You have 4 login attempt(s) left."]);
    assert_eq!(h.failed_attempts("jane@uni.edu").await, 1);
    assert!(h.is_active("jane@uni.edu").await);
}

#[tokio::test]
async fn repeated_failures_leave_account_active_below_threshold() {
    let h = harness().await;
    h.register_user("jane@uni.edu", TEACHER_ROLE_ID).await;

    for expected_remaining in [4u32, 3, 2, 1] {
        let result = h
            .auth_service
            .login(&login_request("jane@uni.edu", "wrongPa$$word"))
            .await
            .unwrap();
        assert_eq!(
            result.errors,
            vec![format!(
                "Invalid password. You have {} login attempt(s) left.",
                expected_remaining
            )]
        );
    }

    assert_eq!(h.failed_attempts("jane@uni.edu").await, MAX_FAILED_LOGIN_ATTEMPTS - 1);
    assert!(h.is_active("jane@uni.edu").await);

    // A correct password still works below the threshold.
    let result =
        h.auth_service.login(&login_request("jane@uni.edu", DEFAULT_PASSWORD)).await.unwrap();
    assert!(result.is_success());
}

#[tokio::test]
async fn fifth_failure_locks_the_account() {
    let h = harness().await;
    h.register_user("jane@uni.edu", TEACHER_ROLE_ID).await;

    for _ in 0..MAX_FAILED_LOGIN_ATTEMPTS {
        let result = h
            .auth_service
            .login(&login_request("jane@uni.edu", "wrongPa$$word"))
            .await
            .unwrap();
        assert!(!result.is_success());
    }

    assert!(!h.is_active("jane@uni.edu").await);
    assert_eq!(h.failed_attempts("jane@uni.edu").await, MAX_FAILED_LOGIN_ATTEMPTS);

    // The sixth attempt reports the blocked message even with the correct
    // password, and the counter stays put.
    let result =
        h.auth_service.login(&login_request("jane@uni.edu", DEFAULT_PASSWORD)).await.unwrap();
    assert!(!result.is_success());
    assert_eq!(
        result.errors,
        vec!["User is blocked. Please contact the administrator team."]
    );
    assert_eq!(h.failed_attempts("jane@uni.edu").await, MAX_FAILED_LOGIN_ATTEMPTS);
}

#[tokio::test]
async fn login_rejects_malformed_input_before_lookup() {
    let h = harness().await;

    let result = h.auth_service.login(&login_request("jane@uni.edu", "short")).await.unwrap();
    assert!(!result.is_success());
    assert_eq!(result.errors, vec!["Password must be between 8 and 30 characters long."]);
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let h = harness().await;
    h.register_user("jane@uni.edu", TEACHER_ROLE_ID).await;

    let result =
        h.auth_service.register(&register_request("jane@uni.edu", TEACHER_ROLE_ID)).await.unwrap();

    assert!(!result.is_success());
    assert_eq!(result.errors, vec!["User with such email already exists."]);
}

#[tokio::test]
async fn register_with_unknown_role_compensates_the_user_row() {
    let h = harness().await;

    let result = h.auth_service.register(&register_request("jane@uni.edu", 99)).await.unwrap();

    assert!(!result.is_success());
    assert_eq!(result.errors, vec!["Failed to create a user and assign it to the role."]);

    // The partially created user row was removed, so the email is free again.
    let retry =
        h.auth_service.register(&register_request("jane@uni.edu", TEACHER_ROLE_ID)).await.unwrap();
    assert!(retry.is_success());
}

#[tokio::test]
async fn grant_roles_is_all_or_nothing() {
    let h = harness().await;
    let user_id = h.register_user("jane@uni.edu", TEACHER_ROLE_ID).await;

    // One of the requested roles is already held: nothing may be granted.
    let result = h
        .auth_service
        .grant_user_roles(&GrantUserRolesRequest {
            user_id: user_id.to_string(),
            role_ids: vec![TEACHER_ROLE_ID, STUDENT_ROLE_ID],
        })
        .await
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.errors, vec!["The user already has some of the roles."]);

    let user_roles = SqlxUserRoleRepository::new(h.pool.clone());
    let granted = user_roles.list_role_ids_for_user(&user_id).await.unwrap();
    assert_eq!(granted, vec![TEACHER_ROLE_ID]);
}

#[tokio::test]
async fn grant_roles_rejects_unknown_user_and_roles() {
    let h = harness().await;
    let user_id = h.register_user("jane@uni.edu", TEACHER_ROLE_ID).await;

    let unknown_user = h
        .auth_service
        .grant_user_roles(&GrantUserRolesRequest {
            user_id: "no-such-user".to_string(),
            role_ids: vec![STUDENT_ROLE_ID],
        })
        .await
        .unwrap();
    assert_eq!(unknown_user.errors, vec!["User does not exist."]);

    let unknown_role = h
        .auth_service
        .grant_user_roles(&GrantUserRolesRequest {
            user_id: user_id.to_string(),
            role_ids: vec![STUDENT_ROLE_ID, 42],
        })
        .await
        .unwrap();
    assert_eq!(
        unknown_role.errors,
        vec!["You have specified not existing role(s). Please review the list."]
    );

    let empty_roles = h
        .auth_service
        .grant_user_roles(&GrantUserRolesRequest {
            user_id: user_id.to_string(),
            role_ids: vec![],
        })
        .await
        .unwrap();
    assert_eq!(empty_roles.errors, vec!["At least one role must be specified."]);
}

#[tokio::test]
async fn granted_roles_appear_in_the_next_token() {
    let h = harness().await;
    let user_id = h.register_user("jane@uni.edu", TEACHER_ROLE_ID).await;

    let first_login =
        h.auth_service.login(&login_request("jane@uni.edu", DEFAULT_PASSWORD)).await.unwrap();
    let claims = h.token_issuer.verify(&first_login.result.unwrap()).unwrap();
    assert_eq!(claims.roles, vec!["Teacher"]);

    let grant = h
        .auth_service
        .grant_user_roles(&GrantUserRolesRequest {
            user_id: user_id.to_string(),
            role_ids: vec![STUDENT_ROLE_ID],
        })
        .await
        .unwrap();
    assert!(grant.is_success());

    let second_login =
        h.auth_service.login(&login_request("jane@uni.edu", DEFAULT_PASSWORD)).await.unwrap();
    let claims = h.token_issuer.verify(&second_login.result.unwrap()).unwrap();
    assert_eq!(claims.roles, vec!["Teacher", "Student"]);
    assert_eq!(claims.sub, user_id.to_string());
}
