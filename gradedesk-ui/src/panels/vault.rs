//! Vault panel
//!
//! A read-only dashboard behind a password re-check. Opening the panel
//! always starts from the locked state.

use crate::error::{ActionError, ActionResult};
use crate::grader::value_or_na;
use gradedesk_common::api::types::{Dashboard, StudentInfo};

pub const REFERENCE_ANSWERS_MARKER: &str = "(with reference answers)";

/// Rendered dashboard sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultView {
    pub assignments: Vec<String>,
    /// Class label plus its nested roster labels
    pub classes: Vec<(String, Vec<String>)>,
    pub submissions: Vec<String>,
}

impl VaultView {
    pub fn from_dashboard(dashboard: &Dashboard) -> Self {
        let assignments = dashboard
            .assignments
            .iter()
            .map(|a| match &a.reference_answers_path {
                Some(path) if !path.is_empty() => {
                    format!("{} {}", a.name, REFERENCE_ANSWERS_MARKER)
                }
                _ => a.name.clone(),
            })
            .collect();

        let classes = dashboard
            .classes
            .iter()
            .map(|c| (c.label(), c.students.iter().map(StudentInfo::label).collect()))
            .collect();

        let submissions = dashboard
            .submissions
            .iter()
            .map(|s| {
                let line = format!(
                    "{} - {}/{}",
                    s.assignment_name,
                    value_or_na(s.score.as_ref()),
                    value_or_na(s.max_score.as_ref())
                );
                match s.remarks.as_deref().filter(|r| !r.is_empty()) {
                    Some(remarks) => format!("{} - {}", line, remarks),
                    None => line,
                }
            })
            .collect();

        Self {
            assignments,
            classes,
            submissions,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec!["Assignments:".to_string()];
        lines.extend(self.assignments.iter().map(|a| format!("  {}", a)));
        lines.push("Classes:".to_string());
        for (class, students) in &self.classes {
            lines.push(format!("  {}", class));
            lines.extend(students.iter().map(|s| format!("    {}", s)));
        }
        lines.push("Submissions:".to_string());
        lines.extend(self.submissions.iter().map(|s| format!("  {}", s)));
        lines
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VaultPanel {
    #[default]
    Closed,
    Locked,
    Unlocked(VaultView),
}

impl VaultPanel {
    /// Show the panel in its locked state, dropping any earlier contents
    pub fn open(&mut self) {
        *self = VaultPanel::Locked;
    }

    pub fn close(&mut self) {
        *self = VaultPanel::Closed;
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, VaultPanel::Unlocked(_))
    }

    /// Password check before any request
    pub fn validate_password(password: &str) -> ActionResult<()> {
        if password.is_empty() {
            return Err(ActionError::validation("Enter your password."));
        }
        Ok(())
    }

    pub fn unlock(&mut self, dashboard: &Dashboard) {
        *self = VaultPanel::Unlocked(VaultView::from_dashboard(dashboard));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dashboard() -> Dashboard {
        serde_json::from_value(json!({
            "assignments": [
                { "name": "Quiz 1", "reference_answers_path": "/data/q1.pdf" },
                { "name": "Quiz 2" }
            ],
            "classes": [
                { "name": "Grade 7", "section": "A",
                  "students": [{ "id": 1, "name": "Ana", "roll_number": "01" }] }
            ],
            "submissions": [
                { "assignment_name": "Quiz 1", "score": 8, "max_score": 10, "remarks": "late" },
                { "assignment_name": "Quiz 2", "score": null }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_dashboard_rendering() {
        let view = VaultView::from_dashboard(&dashboard());
        assert_eq!(
            view.assignments,
            vec!["Quiz 1 (with reference answers)", "Quiz 2"]
        );
        assert_eq!(
            view.classes,
            vec![("Grade 7 - A".to_string(), vec!["01 - Ana".to_string()])]
        );
        assert_eq!(
            view.submissions,
            vec!["Quiz 1 - 8/10 - late", "Quiz 2 - N/A/N/A"]
        );
    }

    #[test]
    fn test_open_resets_to_locked() {
        let mut vault = VaultPanel::default();
        vault.unlock(&dashboard());
        assert!(vault.is_unlocked());

        vault.open();
        assert_eq!(vault, VaultPanel::Locked);
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(
            VaultPanel::validate_password(""),
            Err(ActionError::Validation(_))
        ));
        assert!(VaultPanel::validate_password("secret").is_ok());
    }
}
