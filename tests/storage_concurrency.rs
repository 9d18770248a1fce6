//! Repository-level guarantees the auth core leans on under concurrency:
//! compare-and-swap on the failed-login counter, uniqueness backstops, and
//! the guarded unlock.

mod common;

use chrono::NaiveDate;
use common::{harness, STUDENT_ROLE_ID, TEACHER_ROLE_ID};
use unigate::auth::hashing;
use unigate::auth::user::{Gender, NewUser, UserRole};
use unigate::domain::UserId;
use unigate::errors::Error;
use unigate::storage::{
    SqlxUserRepository, SqlxUserRoleRepository, UserRepository, UserRoleRepository,
};

fn new_user(email: &str) -> NewUser {
    let credential = hashing::hash_password("strongPa$$word123", None).unwrap();
    NewUser {
        id: UserId::new(),
        email: email.to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        middle_name: None,
        gender: Gender::Female,
        birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
        phone_number: "+12025550143".to_string(),
        password_hash: credential.hash,
        password_salt: credential.salt,
    }
}

#[tokio::test]
async fn failed_login_cas_rejects_stale_counters() {
    let h = harness().await;
    let repository = SqlxUserRepository::new(h.pool.clone());
    let user = repository.create_user(new_user("jane@uni.edu")).await.unwrap();

    // First writer wins.
    assert!(repository.record_failed_login(&user.id, 0, 1, true).await.unwrap());

    // A concurrent writer that read the counter at 0 must lose.
    assert!(!repository.record_failed_login(&user.id, 0, 1, true).await.unwrap());

    let reloaded = repository.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.failed_login_attempts, 1);
    assert!(reloaded.active);
}

#[tokio::test]
async fn lockout_transition_lands_exactly_once() {
    let h = harness().await;
    let repository = SqlxUserRepository::new(h.pool.clone());
    let user = repository.create_user(new_user("jane@uni.edu")).await.unwrap();

    assert!(repository.record_failed_login(&user.id, 0, 4, true).await.unwrap());

    // Two writers both saw 4 failures and both decided to lock; only one
    // update may land.
    let first = repository.record_failed_login(&user.id, 4, 5, false).await.unwrap();
    let second = repository.record_failed_login(&user.id, 4, 5, false).await.unwrap();
    assert!(first);
    assert!(!second);

    // Once locked, the guard blocks any further counter movement.
    assert!(!repository.record_failed_login(&user.id, 5, 6, false).await.unwrap());

    let reloaded = repository.get_user(&user.id).await.unwrap().unwrap();
    assert!(!reloaded.active);
    assert_eq!(reloaded.failed_login_attempts, 5);
    assert!(reloaded.attempts_in_bounds());
}

#[tokio::test]
async fn duplicate_email_insert_is_a_conflict() {
    let h = harness().await;
    let repository = SqlxUserRepository::new(h.pool.clone());
    repository.create_user(new_user("jane@uni.edu")).await.unwrap();

    let err = repository.create_user(new_user("jane@uni.edu")).await.unwrap_err();
    assert!(matches!(err, Error::Conflict { .. }));
}

#[tokio::test]
async fn email_lookup_is_case_sensitive() {
    let h = harness().await;
    let repository = SqlxUserRepository::new(h.pool.clone());
    repository.create_user(new_user("Jane@uni.edu")).await.unwrap();

    assert!(repository.get_user_by_email("Jane@uni.edu").await.unwrap().is_some());
    assert!(repository.get_user_by_email("jane@uni.edu").await.unwrap().is_none());
}

#[tokio::test]
async fn role_batch_rolls_back_on_duplicate() {
    let h = harness().await;
    let user_id = h.register_user("jane@uni.edu", TEACHER_ROLE_ID).await;
    let user_roles = SqlxUserRoleRepository::new(h.pool.clone());

    // Second row collides with the registration grant; the whole batch must
    // roll back, including the first row.
    let granted = user_roles
        .insert_batch(vec![
            UserRole { user_id: user_id.clone(), role_id: STUDENT_ROLE_ID },
            UserRole { user_id: user_id.clone(), role_id: TEACHER_ROLE_ID },
        ])
        .await
        .unwrap();

    assert!(!granted);
    let remaining = user_roles.list_role_ids_for_user(&user_id).await.unwrap();
    assert_eq!(remaining, vec![TEACHER_ROLE_ID]);
}

#[tokio::test]
async fn duplicate_single_grant_is_soft() {
    let h = harness().await;
    let user_id = h.register_user("jane@uni.edu", TEACHER_ROLE_ID).await;
    let user_roles = SqlxUserRoleRepository::new(h.pool.clone());

    let inserted = user_roles
        .insert(UserRole { user_id: user_id.clone(), role_id: TEACHER_ROLE_ID })
        .await
        .unwrap();
    assert!(!inserted);
}

#[tokio::test]
async fn unlock_only_flips_locked_rows() {
    let h = harness().await;
    let repository = SqlxUserRepository::new(h.pool.clone());
    let user = repository.create_user(new_user("jane@uni.edu")).await.unwrap();

    // Active row: the guarded update touches nothing.
    assert!(!repository.unlock_user(&user.id).await.unwrap());

    repository.record_failed_login(&user.id, 0, 5, false).await.unwrap();
    assert!(repository.unlock_user(&user.id).await.unwrap());

    let reloaded = repository.get_user(&user.id).await.unwrap().unwrap();
    assert!(reloaded.active);
    assert_eq!(reloaded.failed_login_attempts, 0);
}

#[tokio::test]
async fn password_update_keeps_the_salt() {
    let h = harness().await;
    let repository = SqlxUserRepository::new(h.pool.clone());
    let user = repository.create_user(new_user("jane@uni.edu")).await.unwrap();
    let original_salt = user.password_salt.clone();

    let credential =
        hashing::hash_password("strongPa$$word345", Some(&original_salt)).unwrap();
    assert!(repository.update_password(&user.id, credential.hash).await.unwrap());

    let reloaded = repository.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.password_salt, original_salt);
    assert!(hashing::verify_password(
        "strongPa$$word345",
        &reloaded.password_salt,
        &reloaded.password_hash
    )
    .unwrap());
}
