//! Class and roster manager

use crate::error::{ActionError, ActionResult};
use gradedesk_common::api::types::{ClassInfo, NewClass, NewStudent, StudentInfo};

pub const NO_STUDENTS_YET: &str = "No students yet.";

/// Parse bulk roster text, one `name, email, roll_number` per line
///
/// Blank lines are skipped, missing trailing fields become None and rows
/// without a name are dropped.
pub fn parse_bulk_students(text: &str) -> Vec<NewStudent> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut parts = line.split(',').map(str::trim);
            let name = parts.next().unwrap_or("");
            if name.is_empty() {
                return None;
            }
            let mut field = || parts.next().filter(|p| !p.is_empty()).map(str::to_string);
            let email = field();
            let roll_number = field();
            Some(NewStudent {
                name: name.to_string(),
                email,
                roll_number,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct ClassesPanel {
    pub classes: Vec<ClassInfo>,
    selected_class: Option<i64>,
    roster: Option<Vec<StudentInfo>>,
    pub new_class_name: String,
    pub new_class_section: String,
    pub bulk_text: String,
}

impl ClassesPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the class list; the roster view is emptied
    pub fn set_classes(&mut self, classes: Vec<ClassInfo>) {
        if let Some(id) = self.selected_class {
            if !classes.iter().any(|c| c.id == id) {
                self.selected_class = None;
            }
        }
        self.classes = classes;
        self.roster = None;
    }

    pub fn select_class(&mut self, class_id: Option<i64>) {
        self.selected_class = class_id;
        self.roster = None;
    }

    pub fn selected_class(&self) -> Option<i64> {
        self.selected_class
    }

    /// Store a roster if it belongs to the selected class
    pub fn set_roster(&mut self, class_id: i64, students: Vec<StudentInfo>) {
        if self.selected_class == Some(class_id) {
            self.roster = Some(students);
        }
    }

    /// Validate the new-class inputs; an empty section is sent as null
    pub fn plan_create(&self) -> ActionResult<NewClass> {
        let name = self.new_class_name.trim();
        if name.is_empty() {
            return Err(ActionError::validation("Please provide a class name."));
        }
        let section = self.new_class_section.trim();
        Ok(NewClass {
            name: name.to_string(),
            section: (!section.is_empty()).then(|| section.to_string()),
        })
    }

    pub fn after_create(&mut self) {
        self.new_class_name.clear();
        self.new_class_section.clear();
    }

    /// Validate the bulk-add inputs
    pub fn plan_add_students(&self) -> ActionResult<(i64, Vec<NewStudent>)> {
        let class_id = self
            .selected_class
            .ok_or_else(|| ActionError::validation("Select a class first."))?;
        if self.bulk_text.lines().all(|l| l.trim().is_empty()) {
            return Err(ActionError::validation(
                "Provide at least one student line.",
            ));
        }
        Ok((class_id, parse_bulk_students(&self.bulk_text)))
    }

    pub fn class_lines(&self) -> Vec<String> {
        self.classes
            .iter()
            .map(|c| format!("[{}] {}", c.id, c.label()))
            .collect()
    }

    pub fn roster_lines(&self) -> Vec<String> {
        match &self.roster {
            None => Vec::new(),
            Some(students) if students.is_empty() => vec![NO_STUDENTS_YET.to_string()],
            Some(students) => students.iter().map(StudentInfo::label).collect(),
        }
    }
}
