use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::ModuleProgressRow;

// The module_progress table holds module-level rows (checklist_item_id IS
// NULL) and per-item rows side by side; each upsert below targets the
// partial unique index matching its representation.

/// Mark a module's text as read on the module-level progress row.
pub async fn mark_text_read<'e, E>(
    executor: E,
    enrollment_id: Uuid,
    module_id: Uuid,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO module_progress (enrollment_id, module_id, is_text_read)
            VALUES ($1, $2, true)
            ON CONFLICT (enrollment_id, module_id) WHERE checklist_item_id IS NULL
            DO UPDATE SET is_text_read = true, updated_at = NOW()
        "#,
    )
    .bind(enrollment_id)
    .bind(module_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Mark a module's video as watched on the module-level progress row.
pub async fn mark_video_watched<'e, E>(
    executor: E,
    enrollment_id: Uuid,
    module_id: Uuid,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO module_progress (enrollment_id, module_id, is_video_watched)
            VALUES ($1, $2, true)
            ON CONFLICT (enrollment_id, module_id) WHERE checklist_item_id IS NULL
            DO UPDATE SET is_video_watched = true, updated_at = NOW()
        "#,
    )
    .bind(enrollment_id)
    .bind(module_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Record a passing quiz attempt against the module-level row. Keeps the
/// best score seen so far.
pub async fn mark_module_quiz_passed<'e, E>(
    executor: E,
    enrollment_id: Uuid,
    module_id: Uuid,
    score: f64,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO module_progress (enrollment_id, module_id, is_quiz_passed, highest_quiz_score)
            VALUES ($1, $2, true, $3)
            ON CONFLICT (enrollment_id, module_id) WHERE checklist_item_id IS NULL
            DO UPDATE SET
                is_quiz_passed = true,
                highest_quiz_score = GREATEST(COALESCE(module_progress.highest_quiz_score, 0), $3),
                updated_at = NOW()
        "#,
    )
    .bind(enrollment_id)
    .bind(module_id)
    .bind(score)
    .execute(executor)
    .await?;
    Ok(())
}

/// Mark one checklist item completed. Idempotent: a second call leaves the
/// row as it was, `completed_at` keeps its first value.
pub async fn mark_checklist_item_completed<'e, E>(
    executor: E,
    enrollment_id: Uuid,
    module_id: Uuid,
    checklist_item_id: Uuid,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO module_progress
                (enrollment_id, module_id, checklist_item_id, is_completed, completed_at)
            VALUES ($1, $2, $3, true, NOW())
            ON CONFLICT (enrollment_id, checklist_item_id) WHERE checklist_item_id IS NOT NULL
            DO UPDATE SET
                is_completed = true,
                completed_at = COALESCE(module_progress.completed_at, NOW()),
                updated_at = NOW()
        "#,
    )
    .bind(enrollment_id)
    .bind(module_id)
    .bind(checklist_item_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Record a scored quiz result against a quiz-kind checklist item. The item
/// completes only on a passing score; the best score is kept either way.
pub async fn record_checklist_quiz_score<'e, E>(
    executor: E,
    enrollment_id: Uuid,
    module_id: Uuid,
    checklist_item_id: Uuid,
    score: f64,
    passed: bool,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO module_progress
                (enrollment_id, module_id, checklist_item_id, is_quiz_passed, highest_quiz_score,
                 is_completed, completed_at)
            VALUES ($1, $2, $3, $5, $4, $5, CASE WHEN $5 THEN NOW() ELSE NULL END)
            ON CONFLICT (enrollment_id, checklist_item_id) WHERE checklist_item_id IS NOT NULL
            DO UPDATE SET
                is_quiz_passed = module_progress.is_quiz_passed OR $5,
                highest_quiz_score = GREATEST(COALESCE(module_progress.highest_quiz_score, 0), $4),
                is_completed = module_progress.is_completed OR $5,
                completed_at = COALESCE(module_progress.completed_at,
                                        CASE WHEN $5 THEN NOW() ELSE NULL END),
                updated_at = NOW()
        "#,
    )
    .bind(enrollment_id)
    .bind(module_id)
    .bind(checklist_item_id)
    .bind(score)
    .bind(passed)
    .execute(executor)
    .await?;
    Ok(())
}

/// All progress rows for an enrollment, both representations.
pub async fn fetch_progress_rows<'e, E>(
    executor: E,
    enrollment_id: Uuid,
) -> Result<Vec<ModuleProgressRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, enrollment_id, module_id, checklist_item_id, is_text_read,
                   is_video_watched, is_quiz_passed, highest_quiz_score, is_completed,
                   completed_at, updated_at
            FROM module_progress
            WHERE enrollment_id = $1
        "#,
    )
    .bind(enrollment_id)
    .fetch_all(executor)
    .await
}
