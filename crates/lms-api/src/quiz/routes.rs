use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use lms_core::{
    AnswerKey, AttemptGate, EmptyCourseRule, QuizQuestion, SubmittedAnswer, attempt_gate,
    grade_submission,
};
use lms_db::{
    models::Quiz,
    repositories::{
        course as course_repo, enrollment as enrollment_repo, progress as progress_repo,
        quiz as quiz_repo,
    },
};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use super::model::{
    AttemptDetail, AttemptResponse, QuestionRequest, QuizRequest, QuizView, QuestionView,
    ReplaceQuestionsRequest, SubmitQuizRequest,
};
use crate::{
    ApiState,
    auth::AuthUser,
    course::routes::{require_course_access, require_course_owner},
    error::ApiError,
    progress::service as progress_service,
    validation,
};

/// Create the quiz authoring and attempt routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/courses/{course_id}/quizzes", post(create_quiz))
        .route("/courses/{course_id}/quizzes", get(list_course_quizzes))
        .route("/quizzes/{quiz_id}", get(get_quiz))
        .route("/quizzes/{quiz_id}", delete(delete_quiz))
        .route("/quizzes/{quiz_id}/questions", put(replace_questions))
        .route("/quizzes/{quiz_id}/submit", post(submit_quiz))
        .route("/attempts/{attempt_id}", get(get_attempt))
}

/// Validate the question batch shape: positive weights, 2-4 answers per
/// question with exactly one marked correct.
fn validate_questions(questions: &[QuestionRequest]) -> Result<(), ApiError> {
    for question in questions {
        validation::validate_point(question.point)?;
        let correct = question.answers.iter().filter(|a| a.is_correct).count();
        validation::validate_answer_set(question.answers.len(), correct)?;
    }
    Ok(())
}

/// Insert a question batch under a quiz, preserving payload order.
async fn insert_questions(
    tx: &mut Transaction<'_, Postgres>,
    quiz_id: Uuid,
    questions: &[QuestionRequest],
) -> Result<(), ApiError> {
    for (index, question) in questions.iter().enumerate() {
        let inserted = quiz_repo::insert_question(
            &mut **tx,
            quiz_id,
            &question.question_text,
            question.explanation.as_deref(),
            question.point,
            index as i32 + 1,
        )
        .await?;
        for answer in &question.answers {
            quiz_repo::insert_answer(&mut **tx, inserted.id, &answer.answer_text, answer.is_correct)
                .await?;
        }
    }
    Ok(())
}

async fn create_quiz(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<QuizRequest>,
) -> Result<(StatusCode, Json<Quiz>), ApiError> {
    require_course_owner(&state.pool, course_id, auth_user.user_id).await?;
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    validation::validate_percentage("passing_score", payload.passing_score)?;
    validate_questions(&payload.questions)?;

    if let Some(module_id) = payload.module_id {
        let module = course_repo::fetch_module(&state.pool, module_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;
        if module.course_id != course_id {
            return Err(ApiError::Validation(
                "Module does not belong to this course".to_string(),
            ));
        }
    }

    // The quiz and its whole question tree land in one transaction.
    let mut tx = state.pool.begin().await?;
    let quiz = quiz_repo::insert_quiz(
        &mut *tx,
        course_id,
        payload.module_id,
        &payload.title,
        payload.passing_score,
        payload.min_score,
        payload.is_timed,
        payload.time_limit_second,
        payload.xp_bonus,
    )
    .await?;
    insert_questions(&mut tx, quiz.id, &payload.questions).await?;
    tx.commit().await?;

    tracing::info!(quiz_id = %quiz.id, course_id = %course_id, "created quiz");
    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Replace a quiz's full question set in one transaction.
async fn replace_questions(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<ReplaceQuestionsRequest>,
) -> Result<StatusCode, ApiError> {
    let quiz = quiz_repo::fetch_quiz(&state.pool, quiz_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;
    require_course_owner(&state.pool, quiz.course_id, auth_user.user_id).await?;
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    validate_questions(&payload.questions)?;

    let mut tx = state.pool.begin().await?;
    quiz_repo::delete_quiz_questions(&mut *tx, quiz_id).await?;
    insert_questions(&mut tx, quiz_id, &payload.questions).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn list_course_quizzes(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Quiz>>, ApiError> {
    require_course_access(&state.pool, course_id, auth_user.user_id).await?;
    let quizzes = quiz_repo::list_quizzes_for_course(&state.pool, course_id).await?;
    Ok(Json(quizzes))
}

async fn get_quiz(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<QuizView>, ApiError> {
    let quiz = quiz_repo::fetch_quiz(&state.pool, quiz_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;
    require_course_access(&state.pool, quiz.course_id, auth_user.user_id).await?;

    let questions = quiz_repo::fetch_questions(&state.pool, quiz_id).await?;
    let answers = quiz_repo::fetch_answer_key(&state.pool, quiz_id).await?;

    let mut answers_by_question: HashMap<Uuid, Vec<_>> = HashMap::new();
    for answer in answers {
        answers_by_question
            .entry(answer.question_id)
            .or_default()
            .push(answer);
    }

    let questions = questions
        .into_iter()
        .map(|question| {
            let answers = answers_by_question.remove(&question.id).unwrap_or_default();
            QuestionView::new(question, answers)
        })
        .collect();

    Ok(Json(QuizView { quiz, questions }))
}

async fn delete_quiz(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let quiz = quiz_repo::fetch_quiz(&state.pool, quiz_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;
    require_course_owner(&state.pool, quiz.course_id, auth_user.user_id).await?;

    quiz_repo::delete_quiz(&state.pool, quiz_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit_quiz(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<(StatusCode, Json<AttemptResponse>), ApiError> {
    let quiz = quiz_repo::fetch_quiz(&state.pool, quiz_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;
    let enrollment =
        enrollment_repo::fetch_enrollment_for_course(&state.pool, auth_user.user_id, quiz.course_id)
            .await?
            .ok_or_else(|| {
                ApiError::Forbidden("You are not enrolled in this course".to_string())
            })?;

    // Gate check, grading and persistence share one transaction: a failure
    // anywhere below rolls back the attempt shell and every answer row.
    let mut tx = state.pool.begin().await?;

    let already_passed =
        quiz_repo::has_passed_attempt(&mut *tx, auth_user.user_id, quiz_id).await?;
    let failed_attempts =
        quiz_repo::count_failed_attempts(&mut *tx, auth_user.user_id, quiz_id).await?;
    match attempt_gate(already_passed, failed_attempts) {
        AttemptGate::AlreadyPassed => {
            return Err(ApiError::Conflict(
                "You have already passed this quiz".to_string(),
            ));
        }
        AttemptGate::AttemptsExhausted => {
            return Err(ApiError::Conflict(
                "No attempts remaining for this quiz".to_string(),
            ));
        }
        AttemptGate::Allowed => {}
    }

    let questions: Vec<QuizQuestion> = quiz_repo::fetch_questions(&mut *tx, quiz_id)
        .await?
        .into_iter()
        .map(|q| QuizQuestion {
            id: q.id,
            points: q.point,
        })
        .collect();
    let answer_key: Vec<AnswerKey> = quiz_repo::fetch_answer_key(&mut *tx, quiz_id)
        .await?
        .into_iter()
        .map(|a| AnswerKey {
            id: a.id,
            question_id: a.question_id,
            is_correct: a.is_correct,
        })
        .collect();
    let submission: Vec<SubmittedAnswer> = payload
        .answers
        .iter()
        .map(|pair| SubmittedAnswer {
            question_id: pair.question_id,
            answer_id: pair.answer_id,
        })
        .collect();

    let outcome = grade_submission(&questions, &answer_key, &submission, quiz.passing_score)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let attempt =
        quiz_repo::insert_attempt(&mut *tx, auth_user.user_id, quiz_id, quiz.course_id).await?;
    for verdict in &outcome.verdicts {
        quiz_repo::insert_user_answer(
            &mut *tx,
            attempt.id,
            verdict.question_id,
            verdict.answer_id,
            verdict.is_correct,
        )
        .await?;
    }
    quiz_repo::finalize_attempt(&mut *tx, attempt.id, outcome.score, outcome.is_passed).await?;

    // A pass counts toward the quiz's module, when it has one.
    if outcome.is_passed {
        if let Some(module_id) = quiz.module_id {
            progress_repo::mark_module_quiz_passed(
                &mut *tx,
                enrollment.id,
                module_id,
                outcome.score,
            )
            .await?;
            progress_service::recompute(&mut tx, &enrollment, EmptyCourseRule::FullyComplete)
                .await?;
        }
    }

    tx.commit().await?;

    tracing::info!(
        attempt_id = %attempt.id,
        quiz_id = %quiz_id,
        score = outcome.score,
        is_passed = outcome.is_passed,
        "graded quiz attempt"
    );

    Ok((
        StatusCode::CREATED,
        Json(AttemptResponse {
            attempt_id: attempt.id,
            score: outcome.score,
            is_passed: outcome.is_passed,
            passing_score: quiz.passing_score,
        }),
    ))
}

async fn get_attempt(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(attempt_id): Path<Uuid>,
) -> Result<Json<AttemptDetail>, ApiError> {
    let attempt = quiz_repo::fetch_attempt(&state.pool, attempt_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Attempt not found".to_string()))?;
    if attempt.user_id != auth_user.user_id {
        return Err(ApiError::Forbidden(
            "You may only view your own attempts".to_string(),
        ));
    }

    let answers = quiz_repo::fetch_attempt_answers(&state.pool, attempt_id).await?;
    Ok(Json(AttemptDetail { attempt, answers }))
}
