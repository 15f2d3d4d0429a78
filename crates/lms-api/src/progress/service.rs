//! Progress aggregation over an enrollment's recorded learner actions.
//!
//! Invoked after every action that can change completion (text read, video
//! watched, checklist item done, quiz passed), inside the same transaction
//! as the triggering upsert so a concurrent reader never sees the flag
//! without the recomputed aggregate.

use std::collections::{HashMap, HashSet};

use lms_core::{
    EmptyCourseRule, ModuleSnapshot, StatusChange, course_percentage, status_change,
};
use lms_db::{
    models::{Enrollment, EnrollmentStatus, ModuleLevelProgress, ProgressRecord},
    repositories::{course as course_repo, enrollment as enrollment_repo, progress as progress_repo},
};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::error::ApiError;

/// Recompute and persist an enrollment's progress percentage and status.
///
/// The percentage is rebuilt from the full set of progress rows rather than
/// incremented, so the operation is idempotent and monotone. `empty_rule`
/// carries the zero-unit convention of the triggering path.
pub async fn recompute(
    tx: &mut Transaction<'_, Postgres>,
    enrollment: &Enrollment,
    empty_rule: EmptyCourseRule,
) -> Result<f64, ApiError> {
    let modules = course_repo::list_modules(&mut **tx, enrollment.course_id).await?;
    let items = course_repo::list_course_checklist_items(&mut **tx, enrollment.course_id).await?;
    let rows = progress_repo::fetch_progress_rows(&mut **tx, enrollment.id).await?;

    let mut items_by_module: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for item in &items {
        items_by_module.entry(item.module_id).or_default().push(item.id);
    }

    let mut completed_items: HashSet<Uuid> = HashSet::new();
    let mut module_flags: HashMap<Uuid, ModuleLevelProgress> = HashMap::new();
    for row in rows {
        match row.into_record() {
            ProgressRecord::ChecklistItem(p) => {
                if p.is_completed {
                    completed_items.insert(p.checklist_item_id);
                }
            }
            ProgressRecord::ModuleLevel(p) => {
                module_flags.insert(p.module_id, p);
            }
        }
    }

    let snapshots: Vec<ModuleSnapshot> = modules
        .iter()
        .map(|module| match items_by_module.get(&module.id) {
            Some(item_ids) if !item_ids.is_empty() => ModuleSnapshot::Checklist {
                total_items: item_ids.len(),
                completed_items: item_ids
                    .iter()
                    .filter(|id| completed_items.contains(*id))
                    .count(),
            },
            // No checklist items: virtual two-unit model over the
            // module-level flag row.
            _ => {
                let flags = module_flags.get(&module.id);
                ModuleSnapshot::Standalone {
                    has_text: module.has_text(),
                    has_video: module.has_video(),
                    text_read: flags.is_some_and(|f| f.is_text_read),
                    video_watched: flags.is_some_and(|f| f.is_video_watched),
                }
            }
        })
        .collect();

    let percentage = course_percentage(&snapshots, empty_rule);
    let already_completed = enrollment.status == EnrollmentStatus::Completed;
    match status_change(percentage, already_completed) {
        StatusChange::Completed => {
            tracing::info!(enrollment_id = %enrollment.id, "enrollment completed");
            enrollment_repo::complete_enrollment(&mut **tx, enrollment.id, percentage).await?;
        }
        StatusChange::InProgress => {
            enrollment_repo::start_progress(&mut **tx, enrollment.id, percentage).await?;
        }
        StatusChange::Unchanged => {
            enrollment_repo::store_progress(&mut **tx, enrollment.id, percentage).await?;
        }
    }

    Ok(percentage)
}
