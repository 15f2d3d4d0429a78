use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{User, UserRole};

/// Insert a new user account. Fails with a unique violation when the email
/// is already registered.
pub async fn insert_user<'e, E>(
    executor: E,
    username: &str,
    email: &str,
    password_hash: &str,
    role: UserRole,
) -> Result<User, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, role, created_at
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(executor)
    .await
}

pub async fn fetch_user<'e, E>(executor: E, user_id: Uuid) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn fetch_user_by_email<'e, E>(
    executor: E,
    email: &str,
) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(executor)
    .await
}
