//! Selection lifecycle for recommended variations.
//!
//! A user selects the variations they want to run. Toggling a selection is a
//! membership change; the lifecycle status (`draft`, `active`, `completed`,
//! `archived`) is only changed through an explicit status update. Toggling the
//! same recommendation twice always leaves the row as it was.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Lifecycle status of a selected recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStatus {
    Draft,
    Active,
    Completed,
    Archived,
}

/// Every status name as stored in `selected_recommendations.status`.
pub const VALID_STATUSES: &[&str] = &["draft", "active", "completed", "archived"];

impl SelectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionStatus::Draft => "draft",
            SelectionStatus::Active => "active",
            SelectionStatus::Completed => "completed",
            SelectionStatus::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "draft" => Ok(SelectionStatus::Draft),
            "active" => Ok(SelectionStatus::Active),
            "completed" => Ok(SelectionStatus::Completed),
            "archived" => Ok(SelectionStatus::Archived),
            other => Err(CoreError::Validation(format!(
                "Invalid selection status '{other}'. Must be one of: {VALID_STATUSES:?}"
            ))),
        }
    }

    /// Statuses reachable from this one through an explicit update.
    pub fn next_statuses(self) -> &'static [SelectionStatus] {
        use SelectionStatus::*;
        match self {
            Draft => &[Active, Archived],
            Active => &[Completed, Archived],
            Completed => &[Archived],
            Archived => &[Draft],
        }
    }
}

impl std::fmt::Display for SelectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of a stored selection row that drive a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub status: SelectionStatus,
    pub deselected_at: Option<Timestamp>,
}

impl SelectionSnapshot {
    pub fn is_selected(&self) -> bool {
        self.deselected_at.is_none()
    }
}

/// What a toggle does to the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    /// No row exists: insert one with this status.
    Insert(SelectionStatus),
    /// A selected draft carries no history: remove the row.
    Delete,
    /// A selected non-draft row is soft-deselected, keeping its status.
    Deselect,
    /// A deselected row is selected again with its previous status.
    Reselect,
}

impl ToggleAction {
    /// Whether the recommendation is selected after the action is applied.
    pub fn selects(self) -> bool {
        matches!(self, ToggleAction::Insert(_) | ToggleAction::Reselect)
    }
}

/// Decide what toggling a recommendation does, given its current row.
pub fn plan_toggle(current: Option<&SelectionSnapshot>) -> ToggleAction {
    match current {
        None => ToggleAction::Insert(SelectionStatus::Draft),
        Some(row) if !row.is_selected() => ToggleAction::Reselect,
        Some(row) if row.status == SelectionStatus::Draft => ToggleAction::Delete,
        Some(_) => ToggleAction::Deselect,
    }
}

/// Validate an explicit lifecycle update.
pub fn validate_status_transition(
    from: SelectionStatus,
    to: SelectionStatus,
) -> Result<(), CoreError> {
    if from.next_statuses().contains(&to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot change selection status from '{from}' to '{to}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    /// Apply a toggle to an in-memory row, mirroring what the repository does.
    fn apply(row: Option<SelectionSnapshot>) -> Option<SelectionSnapshot> {
        match plan_toggle(row.as_ref()) {
            ToggleAction::Insert(status) => Some(SelectionSnapshot {
                status,
                deselected_at: None,
            }),
            ToggleAction::Delete => None,
            ToggleAction::Deselect => row.map(|r| SelectionSnapshot {
                deselected_at: Some(Utc::now()),
                ..r
            }),
            ToggleAction::Reselect => row.map(|r| SelectionSnapshot {
                deselected_at: None,
                ..r
            }),
        }
    }

    fn selected(status: SelectionStatus) -> Option<SelectionSnapshot> {
        Some(SelectionSnapshot {
            status,
            deselected_at: None,
        })
    }

    #[test]
    fn first_toggle_inserts_a_draft() {
        assert_eq!(plan_toggle(None), ToggleAction::Insert(SelectionStatus::Draft));
        assert!(plan_toggle(None).selects());
    }

    #[test]
    fn toggling_twice_restores_membership_and_status() {
        use SelectionStatus::*;
        let starts = [
            None,
            selected(Draft),
            selected(Active),
            selected(Completed),
            selected(Archived),
        ];
        for start in starts {
            let twice = apply(apply(start));
            assert_eq!(
                twice.map(|r| (r.status, r.is_selected())),
                start.map(|r| (r.status, r.is_selected())),
                "start = {start:?}"
            );
        }
    }

    #[test]
    fn deselected_active_row_keeps_its_status() {
        let after = apply(selected(SelectionStatus::Active)).unwrap();
        assert!(!after.is_selected());
        assert_eq!(after.status, SelectionStatus::Active);
        assert_eq!(plan_toggle(Some(&after)), ToggleAction::Reselect);
    }

    #[test]
    fn selected_draft_is_deleted() {
        assert_eq!(
            plan_toggle(selected(SelectionStatus::Draft).as_ref()),
            ToggleAction::Delete
        );
    }

    #[test]
    fn lifecycle_transitions() {
        use SelectionStatus::*;
        assert!(validate_status_transition(Draft, Active).is_ok());
        assert!(validate_status_transition(Active, Completed).is_ok());
        assert!(validate_status_transition(Completed, Archived).is_ok());
        assert!(validate_status_transition(Archived, Draft).is_ok());
        assert!(validate_status_transition(Completed, Active).is_err());
        assert!(validate_status_transition(Draft, Draft).is_err());
    }

    #[test]
    fn status_names_round_trip() {
        for name in VALID_STATUSES {
            assert_eq!(SelectionStatus::parse(name).unwrap().as_str(), *name);
        }
        assert!(SelectionStatus::parse("paused").is_err());
    }
}
