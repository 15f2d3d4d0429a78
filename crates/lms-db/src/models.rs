//! Typed rows for the LearnHub schema.
//!
//! Each struct maps one-to-one onto a table; the enums map onto the
//! PostgreSQL enum types created by the initial migration. The one
//! deliberate deviation from the raw schema is [`ProgressRecord`]: the
//! `module_progress` table stores two kinds of row behind a nullable
//! `checklist_item_id`, and the accessor converts that into a tagged
//! variant so callers branch on a type instead of a null check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account role. Trainers author courses; learners enroll in them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// May create and manage courses.
    Trainer,
    /// May enroll, consume content and attempt quizzes.
    Learner,
}

/// Course lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "course_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    /// Visible to its owner only.
    Draft,
    /// Open for enrollment.
    Published,
    /// Closed; existing enrollments keep their data.
    Archived,
}

/// Enrollment lifecycle status, mutated by the progress aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "enrollment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Enrolled, no progress recorded yet.
    Enrolled,
    /// Partial progress.
    InProgress,
    /// Progress reached 100%.
    Completed,
    /// Learner left the course.
    Dropped,
}

/// Kind of action a checklist item asks of the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "checklist_item_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChecklistItemKind {
    /// Watch a video.
    Video,
    /// Read a text section.
    Text,
    /// Pass a quiz (legacy fixed-threshold path).
    Quiz,
    /// Complete a task.
    Task,
    /// Work through an exercise.
    Exercise,
}

/// User account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name.
    pub username: String,
    /// Login email, unique.
    pub email: String,
    /// Bcrypt hash; never serialized out of the db crate callers' control.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role.
    pub role: UserRole,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Course authored by a trainer. Owns modules and quizzes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    /// Unique course identifier.
    pub id: Uuid,
    /// Course title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Free-form category label.
    pub category: Option<String>,
    /// Lifecycle status.
    pub status: CourseStatus,
    /// Owning trainer.
    pub created_by: Uuid,
    /// When the course was created.
    pub created_at: DateTime<Utc>,
    /// When the course was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Content module within a course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Module {
    /// Unique module identifier.
    pub id: Uuid,
    /// Course this module belongs to.
    pub course_id: Uuid,
    /// Module title.
    pub title: String,
    /// Optional video URL.
    pub video_url: Option<String>,
    /// Optional document URL.
    pub doc_url: Option<String>,
    /// Optional inline text content.
    pub content_text: Option<String>,
    /// Position within the course, positive and unique per course.
    pub order_sequence: i32,
    /// When the module was created.
    pub created_at: DateTime<Utc>,
    /// When the module was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Module {
    /// Whether the module carries readable text content.
    pub fn has_text(&self) -> bool {
        self.content_text.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Whether the module carries a watchable video.
    pub fn has_video(&self) -> bool {
        self.video_url.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Fine-grained unit of required learner action within a module.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChecklistItem {
    /// Unique item identifier.
    pub id: Uuid,
    /// Module this item belongs to.
    pub module_id: Uuid,
    /// Item title.
    pub title: String,
    /// Kind of required action.
    pub kind: ChecklistItemKind,
    /// Position within the module, positive and unique per module.
    pub order_sequence: i32,
    /// XP awarded on completion.
    pub xp_reward: i32,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
}

/// Quiz belonging to a course, optionally linked to one module.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    /// Unique quiz identifier.
    pub id: Uuid,
    /// Course this quiz belongs to.
    pub course_id: Uuid,
    /// Module the quiz is attached to, if any.
    pub module_id: Option<Uuid>,
    /// Quiz title.
    pub title: String,
    /// Percentage required to pass (0-100).
    pub passing_score: f64,
    /// Minimum score floor reported to clients.
    pub min_score: f64,
    /// Whether the client should run a countdown.
    pub is_timed: bool,
    /// Countdown length in seconds; enforced client-side only.
    pub time_limit_second: Option<i32>,
    /// XP awarded on a passing attempt.
    pub xp_bonus: i32,
    /// When the quiz was created.
    pub created_at: DateTime<Utc>,
    /// When the quiz was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Weighted question within a quiz. Owns 2-4 answers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    /// Unique question identifier.
    pub id: Uuid,
    /// Quiz this question belongs to.
    pub quiz_id: Uuid,
    /// Question text.
    pub question_text: String,
    /// Explanation shown after grading.
    pub explanation: Option<String>,
    /// Positive point weight.
    pub point: f64,
    /// Position within the quiz.
    pub order_sequence: i32,
    /// When the question was created.
    pub created_at: DateTime<Utc>,
}

/// Answer option for a question. Exactly one per question is correct.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Answer {
    /// Unique answer identifier.
    pub id: Uuid,
    /// Question this answer belongs to.
    pub question_id: Uuid,
    /// Answer text.
    pub answer_text: String,
    /// Whether this is the correct answer.
    pub is_correct: bool,
}

/// A learner's registration in a course, carrying aggregate progress state.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    /// Unique enrollment identifier.
    pub id: Uuid,
    /// Enrolled learner.
    pub user_id: Uuid,
    /// Course enrolled in.
    pub course_id: Uuid,
    /// Lifecycle status.
    pub status: EnrollmentStatus,
    /// Aggregate completion percentage, two decimals.
    pub progress_percentage: f64,
    /// When the learner enrolled.
    pub enrolled_at: DateTime<Utc>,
    /// When progress first reached 100%, if it has.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Raw `module_progress` row. Two representations share this table,
/// distinguished by whether `checklist_item_id` is null; call
/// [`ModuleProgressRow::into_record`] to get the explicit variant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ModuleProgressRow {
    /// Unique row identifier.
    pub id: Uuid,
    /// Enrollment this progress belongs to.
    pub enrollment_id: Uuid,
    /// Module the progress is recorded against.
    pub module_id: Uuid,
    /// Checklist item, when this row tracks a single item.
    pub checklist_item_id: Option<Uuid>,
    /// Module-level flag: text marked read.
    pub is_text_read: bool,
    /// Module-level flag: video marked watched.
    pub is_video_watched: bool,
    /// Whether an associated quiz was passed.
    pub is_quiz_passed: bool,
    /// Best quiz score recorded against this row.
    pub highest_quiz_score: Option<f64>,
    /// Whether the tracked unit is complete.
    pub is_completed: bool,
    /// When the tracked unit completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Last write to this row.
    pub updated_at: DateTime<Utc>,
}

/// Progress for a single checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItemProgress {
    /// The checklist item being tracked.
    pub checklist_item_id: Uuid,
    /// Module the item belongs to.
    pub module_id: Uuid,
    /// Whether the item is complete.
    pub is_completed: bool,
    /// Whether the item's quiz was passed (quiz-kind items).
    pub is_quiz_passed: bool,
    /// Best quiz score recorded for the item.
    pub highest_quiz_score: Option<f64>,
}

/// Whole-module flag set for modules without checklist items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleLevelProgress {
    /// The module being tracked.
    pub module_id: Uuid,
    /// Text marked read.
    pub is_text_read: bool,
    /// Video marked watched.
    pub is_video_watched: bool,
    /// Whether a quiz attached to the module was passed.
    pub is_quiz_passed: bool,
}

/// Tagged view over a `module_progress` row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProgressRecord {
    /// Row tracking one checklist item.
    ChecklistItem(ChecklistItemProgress),
    /// Row tracking whole-module flags.
    ModuleLevel(ModuleLevelProgress),
}

impl ModuleProgressRow {
    /// Split the ragged row into its explicit representation.
    pub fn into_record(self) -> ProgressRecord {
        match self.checklist_item_id {
            Some(checklist_item_id) => ProgressRecord::ChecklistItem(ChecklistItemProgress {
                checklist_item_id,
                module_id: self.module_id,
                is_completed: self.is_completed,
                is_quiz_passed: self.is_quiz_passed,
                highest_quiz_score: self.highest_quiz_score,
            }),
            None => ProgressRecord::ModuleLevel(ModuleLevelProgress {
                module_id: self.module_id,
                is_text_read: self.is_text_read,
                is_video_watched: self.is_video_watched,
                is_quiz_passed: self.is_quiz_passed,
            }),
        }
    }
}

/// One scored submission of a quiz by a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserQuizAttempt {
    /// Unique attempt identifier.
    pub id: Uuid,
    /// Submitting learner.
    pub user_id: Uuid,
    /// Quiz attempted.
    pub quiz_id: Uuid,
    /// Course the quiz belongs to (denormalized).
    pub course_id: Uuid,
    /// Final percentage score, two decimals.
    pub score: f64,
    /// Whether the score met the quiz's passing score.
    pub is_passed: bool,
    /// When the attempt was submitted.
    pub submitted_at: DateTime<Utc>,
}

/// Recorded answer within an attempt; unique per (attempt, question).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAnswer {
    /// Unique row identifier.
    pub id: Uuid,
    /// Attempt this answer belongs to.
    pub attempt_id: Uuid,
    /// Question answered.
    pub question_id: Uuid,
    /// Answer selected.
    pub answer_id: Uuid,
    /// Denormalized correctness of the selection.
    pub is_correct: bool,
}

/// A learner's rating of a course; one per (course, user), overwritable.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseRating {
    /// Unique rating identifier.
    pub id: Uuid,
    /// Rated course.
    pub course_id: Uuid,
    /// Rating learner.
    pub user_id: Uuid,
    /// Stars, 1-5.
    pub rating: i32,
    /// Optional review text.
    pub review: Option<String>,
    /// When the rating was first created.
    pub created_at: DateTime<Utc>,
    /// When the rating was last overwritten.
    pub updated_at: DateTime<Utc>,
}
