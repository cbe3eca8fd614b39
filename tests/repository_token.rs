use bizval::domain::Tier;
use bizval::domain::entities::NewUser;
use bizval::domain::repositories::{TokenRepository, UserRepository};
use bizval::infrastructure::persistence::{PgTokenRepository, PgUserRepository};
use sqlx::PgPool;
use std::sync::Arc;

async fn owner(pool: &PgPool) -> i64 {
    PgUserRepository::new(Arc::new(pool.clone()))
        .create(NewUser {
            external_id: "test|token-owner".to_string(),
            email: "token-owner@example.com".to_string(),
            name: None,
            tier: Tier::Basic,
        })
        .await
        .unwrap()
        .id
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_token(pool: PgPool) {
    let user_id = owner(&pool).await;
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo.create_token(user_id, "test-token", "hash123").await.unwrap();

    assert_eq!(token.user_id, user_id);
    assert_eq!(token.name, "test-token");
    assert_eq!(token.token_hash, "hash123");
    assert!(token.revoked_at.is_none());
    assert!(token.last_used_at.is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_hash_conflicts(pool: PgPool) {
    let user_id = owner(&pool).await;
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create_token(user_id, "a", "samehash").await.unwrap();
    let err = repo.create_token(user_id, "b", "samehash").await.unwrap_err();

    assert_eq!(err.code(), "conflict");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_find_user_id(pool: PgPool) {
    let user_id = owner(&pool).await;
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create_token(user_id, "valid-token", "validhash").await.unwrap();

    assert_eq!(repo.find_user_id("validhash").await.unwrap(), Some(user_id));
    assert_eq!(repo.find_user_id("nonexistent").await.unwrap(), None);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_revoked_token_is_not_resolved(pool: PgPool) {
    let user_id = owner(&pool).await;
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo
        .create_token(user_id, "revoked-token", "revokedhash")
        .await
        .unwrap();
    repo.revoke_token(token.id).await.unwrap();

    assert_eq!(repo.find_user_id("revokedhash").await.unwrap(), None);

    // Revoking twice keeps the first timestamp.
    let first = repo.find_by_id(token.id).await.unwrap().unwrap().revoked_at;
    repo.revoke_token(token.id).await.unwrap();
    let second = repo.find_by_id(token.id).await.unwrap().unwrap().revoked_at;
    assert_eq!(first, second);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_revoke_missing_token(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let err = repo.revoke_token(999).await.unwrap_err();
    assert_eq!(err.code(), "not_found");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_last_used(pool: PgPool) {
    let user_id = owner(&pool).await;
    let repo = PgTokenRepository::new(Arc::new(pool.clone()));

    let token = repo
        .create_token(user_id, "update-token", "updatehash")
        .await
        .unwrap();

    repo.update_last_used("updatehash").await.unwrap();

    let last_used = repo.find_by_id(token.id).await.unwrap().unwrap().last_used_at;
    assert!(last_used.is_some());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_and_find_by_name(pool: PgPool) {
    let user_id = owner(&pool).await;
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create_token(user_id, "token1", "hash1").await.unwrap();
    repo.create_token(user_id, "token2", "hash2").await.unwrap();

    assert_eq!(repo.list_tokens().await.unwrap().len(), 2);

    let found = repo.find_by_name("token2").await.unwrap().unwrap();
    assert_eq!(found.token_hash, "hash2");
    assert!(repo.find_by_name("missing").await.unwrap().is_none());
}
