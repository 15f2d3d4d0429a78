use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{ChecklistItem, ChecklistItemKind, Course, CourseStatus, Module};

const COURSE_COLUMNS: &str =
    "id, title, description, category, status, created_by, created_at, updated_at";

pub async fn insert_course<'e, E>(
    executor: E,
    title: &str,
    description: Option<&str>,
    category: Option<&str>,
    created_by: Uuid,
) -> Result<Course, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO courses (title, description, category, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, category, status, created_by, created_at, updated_at
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(category)
    .bind(created_by)
    .fetch_one(executor)
    .await
}

pub async fn fetch_course<'e, E>(executor: E, course_id: Uuid) -> Result<Option<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
    ))
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

pub async fn update_course<'e, E>(
    executor: E,
    course_id: Uuid,
    title: &str,
    description: Option<&str>,
    category: Option<&str>,
) -> Result<Option<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE courses
            SET title = $2, description = $3, category = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, category, status, created_by, created_at, updated_at
        "#,
    )
    .bind(course_id)
    .bind(title)
    .bind(description)
    .bind(category)
    .fetch_optional(executor)
    .await
}

pub async fn set_course_status<'e, E>(
    executor: E,
    course_id: Uuid,
    status: CourseStatus,
) -> Result<Option<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE courses
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, category, status, created_by, created_at, updated_at
        "#,
    )
    .bind(course_id)
    .bind(status)
    .fetch_optional(executor)
    .await
}

pub async fn delete_course<'e, E>(executor: E, course_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM courses WHERE id = $1
        "#,
    )
    .bind(course_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_published_courses<'e, E>(executor: E) -> Result<Vec<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE status = 'published' ORDER BY created_at DESC"
    ))
    .fetch_all(executor)
    .await
}

pub async fn list_courses_by_owner<'e, E>(
    executor: E,
    owner_id: Uuid,
) -> Result<Vec<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE created_by = $1 ORDER BY created_at DESC"
    ))
    .bind(owner_id)
    .fetch_all(executor)
    .await
}

const MODULE_COLUMNS: &str =
    "id, course_id, title, video_url, doc_url, content_text, order_sequence, created_at, updated_at";

pub async fn insert_module<'e, E>(
    executor: E,
    course_id: Uuid,
    title: &str,
    video_url: Option<&str>,
    doc_url: Option<&str>,
    content_text: Option<&str>,
    order_sequence: i32,
) -> Result<Module, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO modules (course_id, title, video_url, doc_url, content_text, order_sequence)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, course_id, title, video_url, doc_url, content_text, order_sequence,
                      created_at, updated_at
        "#,
    )
    .bind(course_id)
    .bind(title)
    .bind(video_url)
    .bind(doc_url)
    .bind(content_text)
    .bind(order_sequence)
    .fetch_one(executor)
    .await
}

pub async fn fetch_module<'e, E>(executor: E, module_id: Uuid) -> Result<Option<Module>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {MODULE_COLUMNS} FROM modules WHERE id = $1"
    ))
    .bind(module_id)
    .fetch_optional(executor)
    .await
}

pub async fn update_module<'e, E>(
    executor: E,
    module_id: Uuid,
    title: &str,
    video_url: Option<&str>,
    doc_url: Option<&str>,
    content_text: Option<&str>,
    order_sequence: i32,
) -> Result<Option<Module>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE modules
            SET title = $2, video_url = $3, doc_url = $4, content_text = $5,
                order_sequence = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING id, course_id, title, video_url, doc_url, content_text, order_sequence,
                      created_at, updated_at
        "#,
    )
    .bind(module_id)
    .bind(title)
    .bind(video_url)
    .bind(doc_url)
    .bind(content_text)
    .bind(order_sequence)
    .fetch_optional(executor)
    .await
}

pub async fn delete_module<'e, E>(executor: E, module_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM modules WHERE id = $1
        "#,
    )
    .bind(module_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_modules<'e, E>(executor: E, course_id: Uuid) -> Result<Vec<Module>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {MODULE_COLUMNS} FROM modules WHERE course_id = $1 ORDER BY order_sequence"
    ))
    .bind(course_id)
    .fetch_all(executor)
    .await
}

const ITEM_COLUMNS: &str = "id, module_id, title, kind, order_sequence, xp_reward, created_at";

pub async fn insert_checklist_item<'e, E>(
    executor: E,
    module_id: Uuid,
    title: &str,
    kind: ChecklistItemKind,
    order_sequence: i32,
    xp_reward: i32,
) -> Result<ChecklistItem, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO checklist_items (module_id, title, kind, order_sequence, xp_reward)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, module_id, title, kind, order_sequence, xp_reward, created_at
        "#,
    )
    .bind(module_id)
    .bind(title)
    .bind(kind)
    .bind(order_sequence)
    .bind(xp_reward)
    .fetch_one(executor)
    .await
}

pub async fn fetch_checklist_item<'e, E>(
    executor: E,
    item_id: Uuid,
) -> Result<Option<ChecklistItem>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM checklist_items WHERE id = $1"
    ))
    .bind(item_id)
    .fetch_optional(executor)
    .await
}

pub async fn delete_checklist_item<'e, E>(executor: E, item_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM checklist_items WHERE id = $1
        "#,
    )
    .bind(item_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_checklist_items<'e, E>(
    executor: E,
    module_id: Uuid,
) -> Result<Vec<ChecklistItem>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM checklist_items WHERE module_id = $1 ORDER BY order_sequence"
    ))
    .bind(module_id)
    .fetch_all(executor)
    .await
}

/// All checklist items across a course's modules, for the aggregator.
pub async fn list_course_checklist_items<'e, E>(
    executor: E,
    course_id: Uuid,
) -> Result<Vec<ChecklistItem>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT ci.id, ci.module_id, ci.title, ci.kind, ci.order_sequence, ci.xp_reward,
                   ci.created_at
            FROM checklist_items ci
            JOIN modules m ON m.id = ci.module_id
            WHERE m.course_id = $1
            ORDER BY m.order_sequence, ci.order_sequence
        "#,
    )
    .bind(course_id)
    .fetch_all(executor)
    .await
}
