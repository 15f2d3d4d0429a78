//! Core learning-domain algorithms for LearnHub.
//!
//! This crate holds the two deterministic computations the rest of the
//! application is built around: course progress aggregation and quiz
//! grading. Both are pure functions over plain data so they can be unit
//! tested without a database; the API layer feeds them rows and persists
//! whatever they decide.

pub mod grading;
pub mod progress;

pub use grading::{
    AnswerKey, AnswerVerdict, AttemptGate, GradeError, GradeOutcome, LEGACY_PASSING_SCORE,
    MAX_FAILED_ATTEMPTS, QuizQuestion, SubmittedAnswer, attempt_gate, grade_submission,
    legacy_quiz_passed,
};
pub use progress::{
    EmptyCourseRule, ModuleSnapshot, StatusChange, course_percentage, status_change,
};

/// Round a percentage to two decimal places.
///
/// Enrollment progress and attempt scores are stored with two-decimal
/// precision; every computed percentage goes through this before being
/// persisted or compared against a threshold.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
