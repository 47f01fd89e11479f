//! API request/response types
//!
//! Mirrors the JSON shapes exchanged with the grading API. Response types
//! are lenient: optional or missing fields default rather than fail, since
//! the client renders whatever the server returns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ========================================
// Authentication Types
// ========================================

/// `POST /token` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// `POST /users/` request body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
}

/// `POST /users/` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserAccount {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
}

// ========================================
// Assignments
// ========================================

/// `GET /assignments` response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AssignmentList {
    #[serde(default)]
    pub assignments: Vec<String>,
}

/// Questions/answers pair produced by the generation and refine endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneratedContent {
    #[serde(default)]
    pub questions: String,
    #[serde(default)]
    pub answers: String,
}

/// `POST /refine-content` request body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RefineRequest {
    pub previous_questions: String,
    pub previous_answers: String,
    pub feedback: String,
}

/// Body shared by `POST /save-assignment` and `POST /assignments`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SaveAssignmentRequest {
    pub assignment_name: String,
    pub questions: String,
    pub answers: String,
}

/// Generic confirmation body (`{status, message}`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ========================================
// Classes and Students
// ========================================

/// Class as returned by `GET /classes`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub section: Option<String>,
}

impl ClassInfo {
    /// Selector label: `name - section` when a section exists
    pub fn label(&self) -> String {
        match self.section.as_deref().filter(|s| !s.is_empty()) {
            Some(section) => format!("{} - {}", self.name, section),
            None => self.name.clone(),
        }
    }
}

/// `POST /classes` request body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewClass {
    pub name: String,
    pub section: Option<String>,
}

/// Student as returned by `GET /classes/{id}/students`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StudentInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roll_number: Option<String>,
}

impl StudentInfo {
    /// Selector label: `roll - name` when a roll number exists
    pub fn label(&self) -> String {
        match self.roll_number.as_deref().filter(|r| !r.is_empty()) {
            Some(roll) => format!("{} - {}", roll, self.name),
            None => self.name.clone(),
        }
    }
}

/// Element of the `POST /classes/{id}/students` request array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewStudent {
    pub name: String,
    pub email: Option<String>,
    pub roll_number: Option<String>,
}

// ========================================
// Profile and Dashboard
// ========================================

/// Editable profile fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
}

/// `GET /me` response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile: UserProfile,
    #[serde(default)]
    pub assignments: Vec<String>,
    #[serde(default)]
    pub submissions: Vec<SubmissionRecord>,
}

/// `GET /me/dashboard` response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Dashboard {
    #[serde(default)]
    pub assignments: Vec<DashboardAssignment>,
    #[serde(default)]
    pub classes: Vec<DashboardClass>,
    #[serde(default)]
    pub submissions: Vec<SubmissionRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardAssignment {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub source_file_path: Option<String>,
    #[serde(default)]
    pub reference_answers_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardClass {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub students: Vec<StudentInfo>,
}

impl DashboardClass {
    pub fn label(&self) -> String {
        match self.section.as_deref().filter(|s| !s.is_empty()) {
            Some(section) => format!("{} - {}", self.name, section),
            None => self.name.clone(),
        }
    }
}

/// A graded submission as recorded by the server
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmissionRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub assignment_name: String,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub score: Option<Value>,
    #[serde(default)]
    pub max_score: Option<Value>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub student_id: Option<i64>,
}

// ========================================
// Grading
// ========================================

/// `POST /grade-submission` response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GradeResponse {
    #[serde(default)]
    pub legibility_report: Option<String>,
    #[serde(default)]
    pub fairness_check: Option<String>,
    #[serde(default)]
    pub ocr_text: Option<String>,
    #[serde(default)]
    pub evaluation: Option<Evaluation>,
}

/// AI evaluation block of a grade response
///
/// Values stay as raw JSON because the model may return numbers, strings
/// or lists for any of them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Evaluation {
    #[serde(default)]
    pub marks: Option<Value>,
    #[serde(default)]
    pub max_marks: Option<Value>,
    #[serde(default)]
    pub feedback: Option<Value>,
    #[serde(default)]
    pub key_concepts_missed: Option<Value>,
    #[serde(default)]
    pub details: Option<EvaluationDetails>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EvaluationDetails {
    #[serde(default, rename = "Rationale", alias = "rationale")]
    pub rationale: Option<Value>,
}

/// Render a loosely-typed JSON value as display text
///
/// Returns None for null, empty strings and empty lists so callers can
/// substitute their own fallback.
///
/// # Examples
///
/// ```
/// use gradedesk_common::api::types::display_value;
/// use serde_json::json;
///
/// assert_eq!(display_value(&json!(72)).as_deref(), Some("72"));
/// assert_eq!(display_value(&json!(["a", "b"])).as_deref(), Some("a, b"));
/// assert_eq!(display_value(&json!(null)), None);
/// ```
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(display_value).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(_) => Some(value.to_string()),
    }
}
