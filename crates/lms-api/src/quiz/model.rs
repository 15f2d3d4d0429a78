use lms_db::models::{Answer, Question, Quiz, UserAnswer, UserQuizAttempt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct QuizRequest {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,
    pub module_id: Option<Uuid>,
    pub passing_score: f64,
    #[serde(default)]
    pub min_score: f64,
    #[serde(default)]
    pub is_timed: bool,
    pub time_limit_second: Option<i32>,
    #[serde(default)]
    pub xp_bonus: i32,
    #[validate(length(min = 1, message = "a quiz needs at least one question"))]
    pub questions: Vec<QuestionRequest>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuestionRequest {
    pub question_text: String,
    pub explanation: Option<String>,
    pub point: f64,
    pub answers: Vec<AnswerRequest>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AnswerRequest {
    pub answer_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReplaceQuestionsRequest {
    #[validate(length(min = 1, message = "a quiz needs at least one question"))]
    pub questions: Vec<QuestionRequest>,
}

/// Answer option as served to learners: the correctness flag stays behind.
#[derive(Debug, Serialize)]
pub struct AnswerView {
    pub id: Uuid,
    pub answer_text: String,
}

impl From<Answer> for AnswerView {
    fn from(answer: Answer) -> Self {
        Self {
            id: answer.id,
            answer_text: answer.answer_text,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: Uuid,
    pub question_text: String,
    pub point: f64,
    pub order_sequence: i32,
    pub answers: Vec<AnswerView>,
}

impl QuestionView {
    pub fn new(question: Question, answers: Vec<Answer>) -> Self {
        Self {
            id: question.id,
            question_text: question.question_text,
            point: question.point,
            order_sequence: question.order_sequence,
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }
}

/// Learner-facing quiz view with its questions but no answer key.
#[derive(Debug, Serialize)]
pub struct QuizView {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub answers: Vec<SubmittedPair>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SubmittedPair {
    pub question_id: Uuid,
    pub answer_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub attempt_id: Uuid,
    pub score: f64,
    pub is_passed: bool,
    pub passing_score: f64,
}

/// Owner-only attempt result with the recorded answers.
#[derive(Debug, Serialize)]
pub struct AttemptDetail {
    #[serde(flatten)]
    pub attempt: UserQuizAttempt,
    pub answers: Vec<UserAnswer>,
}
