use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Answer, Question, Quiz, UserAnswer, UserQuizAttempt};

const QUIZ_COLUMNS: &str = "id, course_id, module_id, title, passing_score, min_score, is_timed, \
                            time_limit_second, xp_bonus, created_at, updated_at";

#[expect(clippy::too_many_arguments, reason = "one column each")]
pub async fn insert_quiz<'e, E>(
    executor: E,
    course_id: Uuid,
    module_id: Option<Uuid>,
    title: &str,
    passing_score: f64,
    min_score: f64,
    is_timed: bool,
    time_limit_second: Option<i32>,
    xp_bonus: i32,
) -> Result<Quiz, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO quizzes (course_id, module_id, title, passing_score, min_score,
                                 is_timed, time_limit_second, xp_bonus)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, course_id, module_id, title, passing_score, min_score, is_timed,
                      time_limit_second, xp_bonus, created_at, updated_at
        "#,
    )
    .bind(course_id)
    .bind(module_id)
    .bind(title)
    .bind(passing_score)
    .bind(min_score)
    .bind(is_timed)
    .bind(time_limit_second)
    .bind(xp_bonus)
    .fetch_one(executor)
    .await
}

pub async fn fetch_quiz<'e, E>(executor: E, quiz_id: Uuid) -> Result<Option<Quiz>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
        .bind(quiz_id)
        .fetch_optional(executor)
        .await
}

pub async fn list_quizzes_for_course<'e, E>(
    executor: E,
    course_id: Uuid,
) -> Result<Vec<Quiz>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE course_id = $1 ORDER BY created_at"
    ))
    .bind(course_id)
    .fetch_all(executor)
    .await
}

pub async fn delete_quiz<'e, E>(executor: E, quiz_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM quizzes WHERE id = $1
        "#,
    )
    .bind(quiz_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn insert_question<'e, E>(
    executor: E,
    quiz_id: Uuid,
    question_text: &str,
    explanation: Option<&str>,
    point: f64,
    order_sequence: i32,
) -> Result<Question, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO questions (quiz_id, question_text, explanation, point, order_sequence)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, quiz_id, question_text, explanation, point, order_sequence, created_at
        "#,
    )
    .bind(quiz_id)
    .bind(question_text)
    .bind(explanation)
    .bind(point)
    .bind(order_sequence)
    .fetch_one(executor)
    .await
}

pub async fn insert_answer<'e, E>(
    executor: E,
    question_id: Uuid,
    answer_text: &str,
    is_correct: bool,
) -> Result<Answer, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO answers (question_id, answer_text, is_correct)
            VALUES ($1, $2, $3)
            RETURNING id, question_id, answer_text, is_correct
        "#,
    )
    .bind(question_id)
    .bind(answer_text)
    .bind(is_correct)
    .fetch_one(executor)
    .await
}

/// Drop a quiz's whole question tree; answers cascade. Used by the batch
/// replace operation before reinserting.
pub async fn delete_quiz_questions<'e, E>(executor: E, quiz_id: Uuid) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM questions WHERE quiz_id = $1
        "#,
    )
    .bind(quiz_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn fetch_questions<'e, E>(
    executor: E,
    quiz_id: Uuid,
) -> Result<Vec<Question>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, quiz_id, question_text, explanation, point, order_sequence, created_at
            FROM questions
            WHERE quiz_id = $1
            ORDER BY order_sequence
        "#,
    )
    .bind(quiz_id)
    .fetch_all(executor)
    .await
}

/// Every answer of every question of the quiz, correctness included.
pub async fn fetch_answer_key<'e, E>(
    executor: E,
    quiz_id: Uuid,
) -> Result<Vec<Answer>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT a.id, a.question_id, a.answer_text, a.is_correct
            FROM answers a
            JOIN questions q ON q.id = a.question_id
            WHERE q.quiz_id = $1
        "#,
    )
    .bind(quiz_id)
    .fetch_all(executor)
    .await
}

pub async fn has_passed_attempt<'e, E>(
    executor: E,
    user_id: Uuid,
    quiz_id: Uuid,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT EXISTS(
                SELECT 1 FROM user_quiz_attempts
                WHERE user_id = $1 AND quiz_id = $2 AND is_passed
            )
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_one(executor)
    .await
}

pub async fn count_failed_attempts<'e, E>(
    executor: E,
    user_id: Uuid,
    quiz_id: Uuid,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*) FROM user_quiz_attempts
            WHERE user_id = $1 AND quiz_id = $2 AND NOT is_passed
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_one(executor)
    .await
}

/// Create the attempt shell before grading: score 0, not passed. The same
/// transaction finalizes it once every answer row is in.
pub async fn insert_attempt<'e, E>(
    executor: E,
    user_id: Uuid,
    quiz_id: Uuid,
    course_id: Uuid,
) -> Result<UserQuizAttempt, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO user_quiz_attempts (user_id, quiz_id, course_id)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, quiz_id, course_id, score, is_passed, submitted_at
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .bind(course_id)
    .fetch_one(executor)
    .await
}

pub async fn insert_user_answer<'e, E>(
    executor: E,
    attempt_id: Uuid,
    question_id: Uuid,
    answer_id: Uuid,
    is_correct: bool,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO user_answers (attempt_id, question_id, answer_id, is_correct)
            VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(attempt_id)
    .bind(question_id)
    .bind(answer_id)
    .bind(is_correct)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn finalize_attempt<'e, E>(
    executor: E,
    attempt_id: Uuid,
    score: f64,
    is_passed: bool,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE user_quiz_attempts
            SET score = $2, is_passed = $3
            WHERE id = $1
        "#,
    )
    .bind(attempt_id)
    .bind(score)
    .bind(is_passed)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn fetch_attempt<'e, E>(
    executor: E,
    attempt_id: Uuid,
) -> Result<Option<UserQuizAttempt>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, user_id, quiz_id, course_id, score, is_passed, submitted_at
            FROM user_quiz_attempts
            WHERE id = $1
        "#,
    )
    .bind(attempt_id)
    .fetch_optional(executor)
    .await
}

pub async fn fetch_attempt_answers<'e, E>(
    executor: E,
    attempt_id: Uuid,
) -> Result<Vec<UserAnswer>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT ua.id, ua.attempt_id, ua.question_id, ua.answer_id, ua.is_correct
            FROM user_answers ua
            JOIN questions q ON q.id = ua.question_id
            WHERE ua.attempt_id = $1
            ORDER BY q.order_sequence
        "#,
    )
    .bind(attempt_id)
    .fetch_all(executor)
    .await
}
