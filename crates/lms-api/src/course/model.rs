use lms_db::models::{ChecklistItem, ChecklistItemKind, Course, CourseStatus, Module};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CourseRequest {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(max = 100, message = "category must be at most 100 characters"))]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetCourseStatusRequest {
    pub status: CourseStatus,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ModuleRequest {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,
    pub video_url: Option<String>,
    pub doc_url: Option<String>,
    pub content_text: Option<String>,
    pub order_sequence: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChecklistItemRequest {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,
    pub kind: ChecklistItemKind,
    pub order_sequence: i32,
    #[serde(default)]
    pub xp_reward: i32,
}

/// A module together with its checklist items, as rendered to clients.
#[derive(Debug, Serialize)]
pub struct ModuleWithItems {
    #[serde(flatten)]
    pub module: Module,
    pub checklist_items: Vec<ChecklistItem>,
}

/// Full course view: the course row plus its ordered modules.
#[derive(Debug, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<ModuleWithItems>,
}
