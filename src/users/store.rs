use axum::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::users::model::{NewUser, User};

/// Persistence the user core needs. Lookups are case-insensitive.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn count_by_username(&self, username: &str) -> Result<i64, AppError>;
    async fn count_by_email(&self, email: &str) -> Result<i64, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// `new_user.password` must already be hashed.
    async fn insert(&self, new_user: &NewUser) -> Result<User, AppError>;
    /// Writes every mutable column and stamps `updated_at`.
    async fn update(&self, user: &User) -> Result<User, AppError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Unique-index violations become the same error the pre-checks raise.
fn classify(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::duplicate_identity(),
        _ => AppError::Database(e),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn count_by_username(&self, username: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE LOWER(username) = LOWER($1)
            "#,
        )
        .bind(username)
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }

    async fn count_by_email(&self, email: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, created_at, updated_at
            FROM users
            WHERE LOWER(username) = LOWER($1)
            LIMIT 1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, new_user: &NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password, created_at, updated_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .fetch_one(&self.db)
        .await
        .map_err(classify)
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2,
                email = $3,
                password = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING id, username, email, password, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .fetch_one(&self.db)
        .await
        .map_err(classify)
    }
}
