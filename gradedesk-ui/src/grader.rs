//! Grader view model
//!
//! Holds the assignment selector, the class/student roster selectors, the
//! remarks field and the last grading report. The student selector is a
//! value derived from the class selection: changing the class resets it
//! synchronously, and a roster response is only applied if it belongs to
//! the class that is still selected.

use crate::capture::UploadSlot;
use crate::error::{ActionError, ActionResult};
use crate::slots::UploadSlots;
use gradedesk_common::api::types::{display_value, ClassInfo, GradeResponse, StudentInfo};
use gradedesk_common::api::GradeSubmission;
use serde_json::Value;
use tracing::debug;

pub const SELECT_CLASS: &str = "-- Select a Class --";
pub const NO_CLASSES: &str = "-- No classes found --";
pub const CLASSES_ERROR: &str = "-- Error loading classes --";
pub const SELECT_STUDENT: &str = "-- Select a Student --";
pub const NO_STUDENTS: &str = "-- No students found --";
pub const STUDENTS_ERROR: &str = "-- Error loading students --";

/// Fallback text for any missing report field
pub const NOT_AVAILABLE: &str = "N/A";

/// A fetched list, or the reason there is none
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Listing<T> {
    #[default]
    NotLoaded,
    Loaded(Vec<T>),
    Failed(String),
}

impl<T> Listing<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Listing::Loaded(items) => items,
            _ => &[],
        }
    }
}

/// One entry of a rendered selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// None for placeholder entries
    pub value: Option<i64>,
    pub label: String,
}

impl SelectOption {
    fn placeholder(label: &str) -> Self {
        Self {
            value: None,
            label: label.to_string(),
        }
    }
}

/// Student selector state, keyed on the class it was loaded for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RosterState {
    /// No class chosen
    #[default]
    Unselected,
    Loading { class_id: i64 },
    Loaded { class_id: i64, students: Vec<StudentInfo> },
    Failed { class_id: i64 },
}

// ========================================
// Grading Report
// ========================================

/// Rendered result of one grading request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeReport {
    pub legibility_report: String,
    pub fairness_check: String,
    pub ocr_text: String,
    pub score: String,
    pub rationale: String,
    pub feedback: String,
    pub key_concepts_missed: String,
}

impl GradeReport {
    pub fn from_response(response: &GradeResponse) -> Self {
        let evaluation = response.evaluation.clone().unwrap_or_default();
        let rationale = evaluation
            .details
            .as_ref()
            .and_then(|d| d.rationale.as_ref());

        Self {
            legibility_report: text_or_na(response.legibility_report.as_deref()),
            fairness_check: text_or_na(response.fairness_check.as_deref()),
            ocr_text: response.ocr_text.clone().unwrap_or_default(),
            score: format!(
                "Score: {} / {}",
                value_or_na(evaluation.marks.as_ref()),
                value_or_na(evaluation.max_marks.as_ref())
            ),
            rationale: value_or_na(rationale),
            feedback: value_or_na(evaluation.feedback.as_ref()),
            key_concepts_missed: value_or_na(evaluation.key_concepts_missed.as_ref()),
        }
    }

    /// Score summary block
    pub fn summary(&self) -> String {
        format!(
            "{}\nAI Rationale: {}\nFeedback: {}\nKey Concepts Missed: {}",
            self.score, self.rationale, self.feedback, self.key_concepts_missed
        )
    }
}

fn text_or_na(text: Option<&str>) -> String {
    match text {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub(crate) fn value_or_na(value: Option<&Value>) -> String {
    value
        .and_then(display_value)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

// ========================================
// Grader State
// ========================================

#[derive(Debug, Clone, Default)]
pub struct GraderState {
    assignments: Listing<String>,
    selected_assignment: Option<String>,
    classes: Listing<ClassInfo>,
    selected_class: Option<i64>,
    roster: RosterState,
    selected_student: Option<i64>,
    pub remarks: String,
    pub report: Option<GradeReport>,
}

impl GraderState {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- assignments -----

    /// Replace the assignment list, keeping the selection if still listed
    pub fn set_assignments(&mut self, result: Result<Vec<String>, String>) {
        match result {
            Ok(names) => {
                if let Some(selected) = &self.selected_assignment {
                    if !names.contains(selected) {
                        self.selected_assignment = None;
                    }
                }
                self.assignments = Listing::Loaded(names);
            }
            Err(message) => {
                self.assignments = Listing::Failed(message);
                self.selected_assignment = None;
            }
        }
    }

    pub fn assignments(&self) -> &Listing<String> {
        &self.assignments
    }

    pub fn select_assignment(&mut self, name: &str) -> ActionResult<()> {
        if !self.assignments.items().iter().any(|a| a == name) {
            return Err(ActionError::validation(format!(
                "Unknown assignment: {}",
                name
            )));
        }
        self.selected_assignment = Some(name.to_string());
        Ok(())
    }

    pub fn selected_assignment(&self) -> Option<&str> {
        self.selected_assignment.as_deref()
    }

    // ----- classes -----

    /// Replace the class list; a vanished class resets the roster
    pub fn set_classes(&mut self, result: Result<Vec<ClassInfo>, String>) {
        match result {
            Ok(classes) => {
                if let Some(id) = self.selected_class {
                    if !classes.iter().any(|c| c.id == id) {
                        self.clear_class();
                    }
                }
                self.classes = Listing::Loaded(classes);
            }
            Err(message) => {
                self.classes = Listing::Failed(message);
                self.clear_class();
            }
        }
    }

    pub fn classes(&self) -> &Listing<ClassInfo> {
        &self.classes
    }

    /// Select a class (None for the placeholder)
    ///
    /// Always resets the student selector. Returns the class whose roster
    /// must now be fetched.
    pub fn select_class(&mut self, class_id: Option<i64>) -> ActionResult<Option<i64>> {
        let Some(id) = class_id else {
            self.clear_class();
            return Ok(None);
        };
        if !self.classes.items().iter().any(|c| c.id == id) {
            return Err(ActionError::validation(format!("Unknown class id: {}", id)));
        }
        self.selected_class = Some(id);
        self.selected_student = None;
        self.roster = RosterState::Loading { class_id: id };
        Ok(Some(id))
    }

    fn clear_class(&mut self) {
        self.selected_class = None;
        self.selected_student = None;
        self.roster = RosterState::Unselected;
    }

    pub fn selected_class(&self) -> Option<i64> {
        self.selected_class
    }

    /// Apply a roster response; stale responses are ignored
    ///
    /// Returns false when `class_id` is no longer the selected class.
    pub fn set_roster(&mut self, class_id: i64, result: Result<Vec<StudentInfo>, String>) -> bool {
        if self.selected_class != Some(class_id) {
            debug!("Dropping roster for class {} (no longer selected)", class_id);
            return false;
        }
        self.selected_student = None;
        self.roster = match result {
            Ok(students) => RosterState::Loaded { class_id, students },
            Err(_) => RosterState::Failed { class_id },
        };
        true
    }

    pub fn roster(&self) -> &RosterState {
        &self.roster
    }

    // ----- students -----

    pub fn select_student(&mut self, student_id: Option<i64>) -> ActionResult<()> {
        let Some(id) = student_id else {
            self.selected_student = None;
            return Ok(());
        };
        match &self.roster {
            RosterState::Loaded { students, .. } if students.iter().any(|s| s.id == id) => {
                self.selected_student = Some(id);
                Ok(())
            }
            _ => Err(ActionError::validation(format!(
                "Unknown student id: {}",
                id
            ))),
        }
    }

    pub fn selected_student(&self) -> Option<i64> {
        self.selected_student
    }

    /// Student selector accepts input only once a roster has loaded
    pub fn student_selector_enabled(&self) -> bool {
        matches!(&self.roster, RosterState::Loaded { students, .. } if !students.is_empty())
    }

    // ----- rendered selectors -----

    pub fn class_options(&self) -> Vec<SelectOption> {
        match &self.classes {
            Listing::Failed(_) => vec![SelectOption::placeholder(CLASSES_ERROR)],
            Listing::Loaded(classes) if !classes.is_empty() => {
                std::iter::once(SelectOption::placeholder(SELECT_CLASS))
                    .chain(classes.iter().map(|c| SelectOption {
                        value: Some(c.id),
                        label: c.label(),
                    }))
                    .collect()
            }
            Listing::Loaded(_) => vec![SelectOption::placeholder(NO_CLASSES)],
            Listing::NotLoaded => vec![SelectOption::placeholder(SELECT_CLASS)],
        }
    }

    pub fn student_options(&self) -> Vec<SelectOption> {
        match &self.roster {
            RosterState::Unselected | RosterState::Loading { .. } => {
                vec![SelectOption::placeholder(SELECT_STUDENT)]
            }
            RosterState::Failed { .. } => vec![SelectOption::placeholder(STUDENTS_ERROR)],
            RosterState::Loaded { students, .. } if students.is_empty() => {
                vec![SelectOption::placeholder(NO_STUDENTS)]
            }
            RosterState::Loaded { students, .. } => {
                std::iter::once(SelectOption::placeholder(SELECT_STUDENT))
                    .chain(students.iter().map(|s| SelectOption {
                        value: Some(s.id),
                        label: s.label(),
                    }))
                    .collect()
            }
        }
    }

    // ----- submission -----

    /// Validate the form and package it for `/grade-submission`
    pub fn plan_submission(&self, slots: &UploadSlots) -> ActionResult<GradeSubmission> {
        let assignment_name = self
            .selected_assignment
            .clone()
            .ok_or_else(|| ActionError::validation("Please select an assignment."))?;
        let student_sheet = slots.submission(UploadSlot::StudentSheet).ok_or_else(|| {
            ActionError::validation("Please upload or scan a student sheet.")
        })?;
        let remarks = self.remarks.trim();

        Ok(GradeSubmission {
            assignment_name,
            student_sheet,
            class_id: self.selected_class,
            student_id: self.selected_student,
            remarks: (!remarks.is_empty()).then(|| remarks.to_string()),
        })
    }
}
