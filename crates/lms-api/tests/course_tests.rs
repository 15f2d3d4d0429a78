use crate::common::{TestClient, TestStateBuilder, db, jwt, test_data};
use axum::http::StatusCode;
use lms_db::models::UserRole;
use serde_json::json;

#[tokio::test]
async fn test_create_course_requires_trainer_role() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let client = TestClient::new(lms_api::router::router().with_state(state.clone()));

    let email = test_data::unique_email("learner");
    let learner_id = db::create_test_user(
        &state.pool,
        &email,
        &test_data::unique_username("learner"),
        "learner",
    )
    .await
    .expect("Failed to create user");
    let token = jwt::create_test_token(learner_id, &email, UserRole::Learner, &state.auth.jwt_secret);

    let response = client
        .post_json_with_auth(
            "/courses",
            &json!({ "title": "Rust for beginners" }),
            &token,
            &state.cookie_key,
        )
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_and_publish_course() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let client = TestClient::new(lms_api::router::router().with_state(state.clone()));

    let email = test_data::unique_email("trainer");
    let trainer_id = db::create_test_user(
        &state.pool,
        &email,
        &test_data::unique_username("trainer"),
        "trainer",
    )
    .await
    .expect("Failed to create user");
    let token = jwt::create_test_token(trainer_id, &email, UserRole::Trainer, &state.auth.jwt_secret);

    // Create a draft course
    let response = client
        .post_json_with_auth(
            "/courses",
            &json!({ "title": "Rust for beginners", "category": "programming" }),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::CREATED);

    let course: serde_json::Value = response.json();
    assert_eq!(course["status"].as_str().unwrap(), "draft");
    let course_id = course["id"].as_str().unwrap().to_string();

    // Publish it
    let response = client
        .put_json_with_auth(
            &format!("/courses/{course_id}/status"),
            &json!({ "status": "published" }),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::OK);

    let course: serde_json::Value = response.json();
    assert_eq!(course["status"].as_str().unwrap(), "published");

    // It now shows up in the catalog
    let response = client.get_with_auth("/courses", &token, &state.cookie_key).await;
    response.assert_status(StatusCode::OK);
    let catalog: serde_json::Value = response.json();
    assert!(
        catalog
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c["id"].as_str().unwrap() == course_id),
        "Published course should appear in the catalog"
    );
}

#[tokio::test]
async fn test_module_position_conflict() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let client = TestClient::new(lms_api::router::router().with_state(state.clone()));

    let email = test_data::unique_email("trainer");
    let trainer_id = db::create_test_user(
        &state.pool,
        &email,
        &test_data::unique_username("trainer"),
        "trainer",
    )
    .await
    .expect("Failed to create user");
    let token = jwt::create_test_token(trainer_id, &email, UserRole::Trainer, &state.auth.jwt_secret);
    let course_id = db::create_course(&state.pool, trainer_id, "Course", "draft")
        .await
        .expect("Failed to create course");

    let module = json!({ "title": "Intro", "order_sequence": 1 });
    let response = client
        .post_json_with_auth(
            &format!("/courses/{course_id}/modules"),
            &module,
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::CREATED);

    // Same position again: rejected as a conflict, not a 500
    let response = client
        .post_json_with_auth(
            &format!("/courses/{course_id}/modules"),
            &module,
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_quiz_authoring_rejects_bad_answer_sets() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let client = TestClient::new(lms_api::router::router().with_state(state.clone()));

    let email = test_data::unique_email("trainer");
    let trainer_id = db::create_test_user(
        &state.pool,
        &email,
        &test_data::unique_username("trainer"),
        "trainer",
    )
    .await
    .expect("Failed to create user");
    let token = jwt::create_test_token(trainer_id, &email, UserRole::Trainer, &state.auth.jwt_secret);
    let course_id = db::create_course(&state.pool, trainer_id, "Course", "draft")
        .await
        .expect("Failed to create course");

    // Two correct answers
    let response = client
        .post_json_with_auth(
            &format!("/courses/{course_id}/quizzes"),
            &json!({
                "title": "Quiz",
                "passing_score": 70.0,
                "questions": [{
                    "question_text": "Pick one",
                    "point": 10.0,
                    "answers": [
                        { "answer_text": "a", "is_correct": true },
                        { "answer_text": "b", "is_correct": true }
                    ]
                }]
            }),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // No correct answer
    let response = client
        .post_json_with_auth(
            &format!("/courses/{course_id}/quizzes"),
            &json!({
                "title": "Quiz",
                "passing_score": 70.0,
                "questions": [{
                    "question_text": "Pick one",
                    "point": 10.0,
                    "answers": [
                        { "answer_text": "a" },
                        { "answer_text": "b" }
                    ]
                }]
            }),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // Five answers
    let response = client
        .post_json_with_auth(
            &format!("/courses/{course_id}/quizzes"),
            &json!({
                "title": "Quiz",
                "passing_score": 70.0,
                "questions": [{
                    "question_text": "Pick one",
                    "point": 10.0,
                    "answers": [
                        { "answer_text": "a", "is_correct": true },
                        { "answer_text": "b" },
                        { "answer_text": "c" },
                        { "answer_text": "d" },
                        { "answer_text": "e" }
                    ]
                }]
            }),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_draft_course_hidden_from_other_users() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");
    let client = TestClient::new(lms_api::router::router().with_state(state.clone()));

    let trainer_email = test_data::unique_email("trainer");
    let trainer_id = db::create_test_user(
        &state.pool,
        &trainer_email,
        &test_data::unique_username("trainer"),
        "trainer",
    )
    .await
    .expect("Failed to create user");
    let course_id = db::create_course(&state.pool, trainer_id, "Hidden draft", "draft")
        .await
        .expect("Failed to create course");

    let learner_email = test_data::unique_email("learner");
    let learner_id = db::create_test_user(
        &state.pool,
        &learner_email,
        &test_data::unique_username("learner"),
        "learner",
    )
    .await
    .expect("Failed to create user");
    let learner_token =
        jwt::create_test_token(learner_id, &learner_email, UserRole::Learner, &state.auth.jwt_secret);

    // Another user sees 404, not 403: drafts are invisible
    let response = client
        .get_with_auth(&format!("/courses/{course_id}"), &learner_token, &state.cookie_key)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    // The owner still sees it
    let trainer_token =
        jwt::create_test_token(trainer_id, &trainer_email, UserRole::Trainer, &state.auth.jwt_secret);
    let response = client
        .get_with_auth(&format!("/courses/{course_id}"), &trainer_token, &state.cookie_key)
        .await;
    response.assert_status(StatusCode::OK);
}
