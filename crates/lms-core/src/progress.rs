//! Enrollment progress aggregation.
//!
//! Progress is recomputed from scratch on every learner action rather than
//! incremented, which makes the operation idempotent: re-marking an already
//! completed unit cannot double count. The aggregator never un-counts a
//! unit, so repeated runs over a non-decreasing set of completed items never
//! lower the percentage.

use crate::round2;

/// A module's completion state, reduced to countable units.
///
/// A module contributes units to the course total in one of two ways. When
/// the trainer authored explicit checklist items, each item is one unit.
/// Older modules without checklist items fall back to a virtual two-unit
/// model: one text unit (present iff the module carries content text) and
/// one video unit (present iff it carries a video URL), each satisfied by
/// the corresponding flag on the module-level progress record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleSnapshot {
    /// Module with explicit checklist items.
    Checklist {
        /// Number of checklist items the module owns.
        total_items: usize,
        /// Number of those items the learner has completed.
        completed_items: usize,
    },
    /// Module without checklist items, tracked by whole-module flags.
    Standalone {
        /// Whether the module has non-empty content text.
        has_text: bool,
        /// Whether the module has a video URL.
        has_video: bool,
        /// Whether the learner has marked the text read.
        text_read: bool,
        /// Whether the learner has marked the video watched.
        video_watched: bool,
    },
}

impl ModuleSnapshot {
    /// Units this module contributes to the course total.
    pub const fn total_units(&self) -> usize {
        match *self {
            Self::Checklist { total_items, .. } => total_items,
            Self::Standalone {
                has_text,
                has_video,
                ..
            } => has_text as usize + has_video as usize,
        }
    }

    /// Units the learner has completed in this module.
    pub const fn completed_units(&self) -> usize {
        match *self {
            Self::Checklist {
                total_items,
                completed_items,
            } => {
                // A stale progress row cannot push a module past its own size.
                if completed_items > total_items {
                    total_items
                } else {
                    completed_items
                }
            }
            Self::Standalone {
                has_text,
                has_video,
                text_read,
                video_watched,
            } => (has_text && text_read) as usize + (has_video && video_watched) as usize,
        }
    }
}

/// Convention for a course whose modules contribute zero countable units.
///
/// The two triggering paths historically disagree on what an empty course
/// means, and both conventions are kept behind their respective entry
/// points rather than silently unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyCourseRule {
    /// Checklist-item path: nothing countable means nothing done, 0%.
    ZeroPercent,
    /// Module-flag path: nothing countable means nothing left to do, 100%.
    FullyComplete,
}

/// Compute an enrollment's progress percentage from its module snapshots.
///
/// Returns a value in `0.0..=100.0`, rounded to two decimals. When the
/// course contributes zero countable units the result is decided by
/// `empty_rule`.
pub fn course_percentage(modules: &[ModuleSnapshot], empty_rule: EmptyCourseRule) -> f64 {
    let total: usize = modules.iter().map(ModuleSnapshot::total_units).sum();
    if total == 0 {
        return match empty_rule {
            EmptyCourseRule::ZeroPercent => 0.0,
            EmptyCourseRule::FullyComplete => 100.0,
        };
    }

    let completed: usize = modules.iter().map(ModuleSnapshot::completed_units).sum();
    round2(100.0 * completed as f64 / total as f64)
}

/// Status transition decided by a freshly computed percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// Percentage reached 100 for the first time: mark the enrollment
    /// completed and stamp `completed_at`.
    Completed,
    /// Partial progress: the enrollment is in progress.
    InProgress,
    /// No status change; only the stored percentage is refreshed. A zero
    /// percentage deliberately leaves the current status alone so it never
    /// reverts a completed or dropped enrollment.
    Unchanged,
}

/// Decide the enrollment status transition for a recomputed percentage.
pub fn status_change(percentage: f64, already_completed: bool) -> StatusChange {
    if percentage >= 100.0 {
        if already_completed {
            StatusChange::Unchanged
        } else {
            StatusChange::Completed
        }
    } else if percentage > 0.0 {
        StatusChange::InProgress
    } else {
        StatusChange::Unchanged
    }
}
