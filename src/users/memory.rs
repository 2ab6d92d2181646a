use std::sync::Arc;

use axum::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::users::model::{NewUser, User};
use crate::users::store::UserStore;

/// In-process store with the same case-insensitive unique indexes as the
/// postgres schema. Used for tests and for running without a database.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<Vec<User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

fn same(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn violates_unique(users: &[User], id: Option<Uuid>, username: &str, email: &str) -> bool {
    users
        .iter()
        .filter(|u| Some(u.id) != id)
        .any(|u| same(&u.username, username) || same(&u.email, email))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn count_by_username(&self, username: &str) -> Result<i64, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| same(&u.username, username)).count() as i64)
    }

    async fn count_by_email(&self, email: &str) -> Result<i64, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| same(&u.email, email)).count() as i64)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| same(&u.username, username)).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| same(&u.email, email)).cloned())
    }

    async fn insert(&self, new_user: &NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if violates_unique(&users, None, &new_user.username, &new_user.email) {
            return Err(AppError::duplicate_identity());
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password: new_user.password.clone(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if violates_unique(&users, Some(user.id), &user.username, &user.email) {
            return Err(AppError::duplicate_identity());
        }

        let stored = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::Internal(format!("user {} vanished during update", user.id)))?;

        // Postgres keeps microseconds; stay strictly after the previous stamp.
        let floor = stored.updated_at.max(stored.created_at) + Duration::microseconds(1);
        stored.username = user.username.clone();
        stored.email = user.email.clone();
        stored.password = user.password.clone();
        stored.updated_at = OffsetDateTime::now_utc().max(floor);
        Ok(stored.clone())
    }
}
