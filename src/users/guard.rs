//! Application-level uniqueness checks for usernames and emails.
//!
//! These run before every write so callers always get the same
//! `ValidationError`. They are check-then-act and therefore racy; the unique
//! indexes on `LOWER(username)` / `LOWER(email)` catch what slips through.

use tracing::warn;

use crate::error::AppError;
use crate::users::store::UserStore;

pub async fn ensure_username_available(store: &dyn UserStore, username: &str) -> Result<(), AppError> {
    if store.count_by_username(username).await? > 0 {
        warn!(username = %username, "username already taken");
        return Err(AppError::duplicate_identity());
    }
    Ok(())
}

pub async fn ensure_email_available(store: &dyn UserStore, email: &str) -> Result<(), AppError> {
    if store.count_by_email(email).await? > 0 {
        warn!(email = %email, "email already taken");
        return Err(AppError::duplicate_identity());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::{memory::MemoryUserStore, model::NewUser};

    async fn seeded() -> MemoryUserStore {
        let store = MemoryUserStore::new();
        store
            .insert(&NewUser {
                username: "user1".into(),
                email: "a@x.com".into(),
                password: "$2b$04$hash".into(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn free_identities_pass() {
        let store = seeded().await;
        ensure_username_available(&store, "user2").await.unwrap();
        ensure_email_available(&store, "b@x.com").await.unwrap();
    }

    #[tokio::test]
    async fn taken_username_fails_in_any_case() {
        let store = seeded().await;
        for candidate in ["user1", "User1", "USER1"] {
            let err = ensure_username_available(&store, candidate).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "{candidate}");
        }
    }

    #[tokio::test]
    async fn taken_email_fails_in_any_case() {
        let store = seeded().await;
        let err = ensure_email_available(&store, "A@x.com").await.unwrap_err();
        assert_eq!(err.name(), "ValidationError");
        assert_eq!(err.action(), "Use a different email or username for this operation.");
    }
}
