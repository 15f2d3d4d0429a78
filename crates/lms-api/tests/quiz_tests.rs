use crate::common::{TestClient, TestStateBuilder, db, jwt, test_data};
use axum::http::StatusCode;
use lms_db::models::UserRole;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

struct QuizFixture {
    learner_id: Uuid,
    email: String,
    quiz: db::TestQuiz,
}

/// Published course, enrolled learner, two-question quiz at passing_score 70.
async fn setup_quiz_fixture(pool: &PgPool) -> QuizFixture {
    let trainer_id = db::create_test_user(
        pool,
        &test_data::unique_email("trainer"),
        &test_data::unique_username("trainer"),
        "trainer",
    )
    .await
    .expect("Failed to create trainer");
    let course_id = db::create_course(pool, trainer_id, "Quiz course", "published")
        .await
        .expect("Failed to create course");
    let quiz = db::create_two_question_quiz(pool, course_id, 70.0)
        .await
        .expect("Failed to create quiz");

    let email = test_data::unique_email("learner");
    let learner_id = db::create_test_user(
        pool,
        &email,
        &test_data::unique_username("learner"),
        "learner",
    )
    .await
    .expect("Failed to create learner");
    db::enroll(pool, learner_id, course_id)
        .await
        .expect("Failed to enroll");

    QuizFixture {
        learner_id,
        email,
        quiz,
    }
}

#[tokio::test]
async fn test_submit_all_correct_scores_100() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let client = TestClient::new(lms_api::router::router().with_state(state.clone()));

    let fixture = setup_quiz_fixture(&state.pool).await;
    let token =
        jwt::create_test_token(fixture.learner_id, &fixture.email, UserRole::Learner, &state.auth.jwt_secret);

    let response = client
        .post_json_with_auth(
            &format!("/quizzes/{}/submit", fixture.quiz.quiz_id),
            &json!({ "answers": [
                { "question_id": fixture.quiz.question1_id, "answer_id": fixture.quiz.question1_correct },
                { "question_id": fixture.quiz.question2_id, "answer_id": fixture.quiz.question2_correct }
            ]}),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::CREATED);

    let attempt: serde_json::Value = response.json();
    assert_eq!(attempt["score"].as_f64().unwrap(), 100.0);
    assert!(attempt["is_passed"].as_bool().unwrap());
}

#[tokio::test]
async fn test_submit_half_correct_scores_50_and_fails() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let client = TestClient::new(lms_api::router::router().with_state(state.clone()));

    let fixture = setup_quiz_fixture(&state.pool).await;
    let token =
        jwt::create_test_token(fixture.learner_id, &fixture.email, UserRole::Learner, &state.auth.jwt_secret);

    let response = client
        .post_json_with_auth(
            &format!("/quizzes/{}/submit", fixture.quiz.quiz_id),
            &json!({ "answers": [
                { "question_id": fixture.quiz.question1_id, "answer_id": fixture.quiz.question1_correct },
                { "question_id": fixture.quiz.question2_id, "answer_id": fixture.quiz.question2_wrong }
            ]}),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::CREATED);

    let attempt: serde_json::Value = response.json();
    assert_eq!(attempt["score"].as_f64().unwrap(), 50.0);
    assert!(!attempt["is_passed"].as_bool().unwrap());

    // Both answer rows were recorded with their verdicts
    let attempt_id = attempt["attempt_id"].as_str().unwrap();
    let detail: serde_json::Value = client
        .get_with_auth(&format!("/attempts/{attempt_id}"), &token, &state.cookie_key)
        .await
        .json();
    let answers = detail["answers"].as_array().unwrap();
    assert_eq!(answers.len(), 2);
    assert_eq!(
        answers.iter().filter(|a| a["is_correct"].as_bool().unwrap()).count(),
        1
    );
}

#[tokio::test]
async fn test_omitted_question_forfeits_its_points() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let client = TestClient::new(lms_api::router::router().with_state(state.clone()));

    let fixture = setup_quiz_fixture(&state.pool).await;
    let token =
        jwt::create_test_token(fixture.learner_id, &fixture.email, UserRole::Learner, &state.auth.jwt_secret);

    let response = client
        .post_json_with_auth(
            &format!("/quizzes/{}/submit", fixture.quiz.quiz_id),
            &json!({ "answers": [
                { "question_id": fixture.quiz.question1_id, "answer_id": fixture.quiz.question1_correct }
            ]}),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::CREATED);

    let attempt: serde_json::Value = response.json();
    // The omitted question still counts toward the total
    assert_eq!(attempt["score"].as_f64().unwrap(), 50.0);
}

#[tokio::test]
async fn test_foreign_question_rejects_whole_submission() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let client = TestClient::new(lms_api::router::router().with_state(state.clone()));

    let fixture = setup_quiz_fixture(&state.pool).await;
    let token =
        jwt::create_test_token(fixture.learner_id, &fixture.email, UserRole::Learner, &state.auth.jwt_secret);

    let response = client
        .post_json_with_auth(
            &format!("/quizzes/{}/submit", fixture.quiz.quiz_id),
            &json!({ "answers": [
                { "question_id": Uuid::new_v4(), "answer_id": fixture.quiz.question1_correct }
            ]}),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // No partial attempt was persisted
    let attempts: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM user_quiz_attempts WHERE user_id = $1")
            .bind(fixture.learner_id)
            .fetch_one(&state.pool)
            .await
            .expect("Failed to count attempts");
    assert_eq!(attempts, 0);
}

#[tokio::test]
async fn test_attempt_cap_blocks_fourth_submission() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let client = TestClient::new(lms_api::router::router().with_state(state.clone()));

    let fixture = setup_quiz_fixture(&state.pool).await;
    let token =
        jwt::create_test_token(fixture.learner_id, &fixture.email, UserRole::Learner, &state.auth.jwt_secret);

    let failing = json!({ "answers": [
        { "question_id": fixture.quiz.question1_id, "answer_id": fixture.quiz.question1_wrong },
        { "question_id": fixture.quiz.question2_id, "answer_id": fixture.quiz.question2_wrong }
    ]});

    for _ in 0..3 {
        let response = client
            .post_json_with_auth(
                &format!("/quizzes/{}/submit", fixture.quiz.quiz_id),
                &failing,
                &token,
                &state.cookie_key,
            )
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    let response = client
        .post_json_with_auth(
            &format!("/quizzes/{}/submit", fixture.quiz.quiz_id),
            &failing,
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert!(response.text().contains("No attempts remaining"));
}

#[tokio::test]
async fn test_passing_blocks_any_resubmission() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let client = TestClient::new(lms_api::router::router().with_state(state.clone()));

    let fixture = setup_quiz_fixture(&state.pool).await;
    let token =
        jwt::create_test_token(fixture.learner_id, &fixture.email, UserRole::Learner, &state.auth.jwt_secret);

    let passing = json!({ "answers": [
        { "question_id": fixture.quiz.question1_id, "answer_id": fixture.quiz.question1_correct },
        { "question_id": fixture.quiz.question2_id, "answer_id": fixture.quiz.question2_correct }
    ]});
    client
        .post_json_with_auth(
            &format!("/quizzes/{}/submit", fixture.quiz.quiz_id),
            &passing,
            &token,
            &state.cookie_key,
        )
        .await
        .assert_status(StatusCode::CREATED);

    // "already passed" wins the messaging over the attempt cap
    let response = client
        .post_json_with_auth(
            &format!("/quizzes/{}/submit", fixture.quiz.quiz_id),
            &passing,
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert!(response.text().contains("already passed"));
}

#[tokio::test]
async fn test_submit_requires_enrollment() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let client = TestClient::new(lms_api::router::router().with_state(state.clone()));

    let fixture = setup_quiz_fixture(&state.pool).await;
    let email = test_data::unique_email("outsider");
    let outsider_id = db::create_test_user(
        &state.pool,
        &email,
        &test_data::unique_username("outsider"),
        "learner",
    )
    .await
    .expect("Failed to create user");
    let token = jwt::create_test_token(outsider_id, &email, UserRole::Learner, &state.auth.jwt_secret);

    let response = client
        .post_json_with_auth(
            &format!("/quizzes/{}/submit", fixture.quiz.quiz_id),
            &json!({ "answers": [] }),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_attempt_result_is_owner_only() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let client = TestClient::new(lms_api::router::router().with_state(state.clone()));

    let fixture = setup_quiz_fixture(&state.pool).await;
    let token =
        jwt::create_test_token(fixture.learner_id, &fixture.email, UserRole::Learner, &state.auth.jwt_secret);

    let attempt: serde_json::Value = client
        .post_json_with_auth(
            &format!("/quizzes/{}/submit", fixture.quiz.quiz_id),
            &json!({ "answers": [
                { "question_id": fixture.quiz.question1_id, "answer_id": fixture.quiz.question1_correct }
            ]}),
            &token,
            &state.cookie_key,
        )
        .await
        .json();
    let attempt_id = attempt["attempt_id"].as_str().unwrap().to_string();

    // Another user is rejected
    let email = test_data::unique_email("snoop");
    let snoop_id = db::create_test_user(
        &state.pool,
        &email,
        &test_data::unique_username("snoop"),
        "learner",
    )
    .await
    .expect("Failed to create user");
    let snoop_token = jwt::create_test_token(snoop_id, &email, UserRole::Learner, &state.auth.jwt_secret);
    let response = client
        .get_with_auth(&format!("/attempts/{attempt_id}"), &snoop_token, &state.cookie_key)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    // The owner reads it back
    let response = client
        .get_with_auth(&format!("/attempts/{attempt_id}"), &token, &state.cookie_key)
        .await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_learner_quiz_view_hides_answer_key() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let client = TestClient::new(lms_api::router::router().with_state(state.clone()));

    let fixture = setup_quiz_fixture(&state.pool).await;
    let token =
        jwt::create_test_token(fixture.learner_id, &fixture.email, UserRole::Learner, &state.auth.jwt_secret);

    let response = client
        .get_with_auth(
            &format!("/quizzes/{}", fixture.quiz.quiz_id),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::OK);

    let quiz: serde_json::Value = response.json();
    let questions = quiz["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    for question in questions {
        for answer in question["answers"].as_array().unwrap() {
            assert!(
                answer.get("is_correct").is_none(),
                "Learner view must not leak the answer key"
            );
        }
    }
}
