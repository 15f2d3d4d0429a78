use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::Enrollment;

const ENROLLMENT_COLUMNS: &str =
    "id, user_id, course_id, status, progress_percentage, enrolled_at, completed_at";

/// Insert a new enrollment. The unique (user_id, course_id) constraint
/// rejects a duplicate; the caller maps that violation to its conflict
/// error.
pub async fn insert_enrollment<'e, E>(
    executor: E,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<Enrollment, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO enrollments (user_id, course_id)
            VALUES ($1, $2)
            RETURNING id, user_id, course_id, status, progress_percentage, enrolled_at, completed_at
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(executor)
    .await
}

pub async fn fetch_enrollment<'e, E>(
    executor: E,
    enrollment_id: Uuid,
) -> Result<Option<Enrollment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1"
    ))
    .bind(enrollment_id)
    .fetch_optional(executor)
    .await
}

pub async fn fetch_enrollment_for_course<'e, E>(
    executor: E,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<Option<Enrollment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE user_id = $1 AND course_id = $2"
    ))
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

pub async fn list_enrollments_for_user<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<Enrollment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE user_id = $1 ORDER BY enrolled_at DESC"
    ))
    .bind(user_id)
    .fetch_all(executor)
    .await
}

/// Refresh the stored percentage without touching the status.
pub async fn store_progress<'e, E>(
    executor: E,
    enrollment_id: Uuid,
    percentage: f64,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE enrollments
            SET progress_percentage = $2
            WHERE id = $1
        "#,
    )
    .bind(enrollment_id)
    .bind(percentage)
    .execute(executor)
    .await?;
    Ok(())
}

/// Record partial progress: percentage plus the in_progress status.
pub async fn start_progress<'e, E>(
    executor: E,
    enrollment_id: Uuid,
    percentage: f64,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE enrollments
            SET progress_percentage = $2, status = 'in_progress'
            WHERE id = $1
        "#,
    )
    .bind(enrollment_id)
    .bind(percentage)
    .execute(executor)
    .await?;
    Ok(())
}

/// Record full completion: percentage, completed status and the completion
/// timestamp. `completed_at` is only stamped once.
pub async fn complete_enrollment<'e, E>(
    executor: E,
    enrollment_id: Uuid,
    percentage: f64,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE enrollments
            SET progress_percentage = $2,
                status = 'completed',
                completed_at = COALESCE(completed_at, NOW())
            WHERE id = $1
        "#,
    )
    .bind(enrollment_id)
    .bind(percentage)
    .execute(executor)
    .await?;
    Ok(())
}

/// Remove an enrollment; cascades to its progress and attempts.
pub async fn delete_enrollment<'e, E>(
    executor: E,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM enrollments WHERE user_id = $1 AND course_id = $2
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
