use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::CourseRating;

/// Upsert a learner's rating for a course. One rating per (course, user);
/// a second call overwrites the stars and review.
pub async fn upsert_rating<'e, E>(
    executor: E,
    course_id: Uuid,
    user_id: Uuid,
    rating: i32,
    review: Option<&str>,
) -> Result<CourseRating, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO course_ratings (course_id, user_id, rating, review)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (course_id, user_id)
            DO UPDATE SET rating = $3, review = $4, updated_at = NOW()
            RETURNING id, course_id, user_id, rating, review, created_at, updated_at
        "#,
    )
    .bind(course_id)
    .bind(user_id)
    .bind(rating)
    .bind(review)
    .fetch_one(executor)
    .await
}

pub async fn list_ratings_for_course<'e, E>(
    executor: E,
    course_id: Uuid,
) -> Result<Vec<CourseRating>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, course_id, user_id, rating, review, created_at, updated_at
            FROM course_ratings
            WHERE course_id = $1
            ORDER BY updated_at DESC
        "#,
    )
    .bind(course_id)
    .fetch_all(executor)
    .await
}
