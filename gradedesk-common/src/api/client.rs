//! Typed client for the grading API
//!
//! Each method builds one [`ApiRequest`], sends it through the configured
//! [`Transport`] and decodes the JSON response.

use super::request::{ApiRequest, FileUpload, MultipartBody};
use super::transport::Transport;
use super::types::*;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// A grading submission ready to be sent as multipart
#[derive(Debug, Clone)]
pub struct GradeSubmission {
    pub assignment_name: String,
    pub student_sheet: FileUpload,
    pub class_id: Option<i64>,
    pub student_id: Option<i64>,
    pub remarks: Option<String>,
}

impl GradeSubmission {
    pub fn to_multipart(&self) -> MultipartBody {
        MultipartBody::new()
            .text("assignment_name", self.assignment_name.clone())
            .optional_text("class_id", self.class_id.map(|id| id.to_string()))
            .optional_text("student_id", self.student_id.map(|id| id.to_string()))
            .optional_text("remarks", self.remarks.clone())
            .file("student_sheet", self.student_sheet.clone())
    }
}

/// Grading API client
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send a raw request and return the parsed JSON body
    pub async fn call(&self, request: ApiRequest) -> Result<Value> {
        self.transport.send(request).await
    }

    async fn call_as<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let value = self.transport.send(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    // ========================================
    // Authentication
    // ========================================

    /// `POST /token` with form-encoded credentials
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let request = ApiRequest::post_form(
            "/token",
            vec![
                ("username".to_string(), username.to_string()),
                ("password".to_string(), password.to_string()),
            ],
        );
        self.call_as(request).await
    }

    /// `POST /users/`
    pub async fn register(&self, user: &NewUser) -> Result<UserAccount> {
        self.call_as(ApiRequest::post_json("/users/", user)?).await
    }

    /// `POST /verify-password` (multipart), gate for the vault panel
    ///
    /// A wrong password comes back as 401; that rejects the password,
    /// not the session, so it is reported as a plain request failure.
    pub async fn verify_password(&self, password: &str) -> Result<()> {
        let body = MultipartBody::new().text("password", password);
        match self
            .call(ApiRequest::post_multipart("/verify-password", body))
            .await
        {
            Ok(_) => Ok(()),
            Err(Error::Unauthorized(message)) => Err(Error::Request {
                status: 401,
                message,
            }),
            Err(e) => Err(e),
        }
    }

    // ========================================
    // Assignments and Workbench
    // ========================================

    /// `GET /assignments`, returning assignment names
    pub async fn list_assignments(&self) -> Result<Vec<String>> {
        let list: AssignmentList = self.call_as(ApiRequest::get("/assignments")).await?;
        Ok(list.assignments)
    }

    /// `POST /generate-assignment`
    pub async fn generate_assignment(&self, source_file: FileUpload) -> Result<GeneratedContent> {
        let body = MultipartBody::new().file("source_file", source_file);
        self.call_as(ApiRequest::post_multipart("/generate-assignment", body))
            .await
    }

    /// `POST /refine-content`
    pub async fn refine_content(&self, request: &RefineRequest) -> Result<GeneratedContent> {
        self.call_as(ApiRequest::post_json("/refine-content", request)?)
            .await
    }

    /// `POST /save-assignment`
    pub async fn save_assignment(
        &self,
        request: &SaveAssignmentRequest,
    ) -> Result<MessageResponse> {
        self.call_as(ApiRequest::post_json("/save-assignment", request)?)
            .await
    }

    /// `POST /upload-assignment-assets`
    pub async fn upload_assignment_assets(
        &self,
        assignment_name: &str,
        question_paper: FileUpload,
        reference_answers: Option<FileUpload>,
    ) -> Result<MessageResponse> {
        let body = MultipartBody::new()
            .text("assignment_name", assignment_name)
            .file("question_paper", question_paper)
            .optional_file("reference_answers", reference_answers);
        self.call_as(ApiRequest::post_multipart("/upload-assignment-assets", body))
            .await
    }

    /// `POST /generate-answers-from-upload`
    pub async fn generate_answers_from_upload(
        &self,
        question_paper: FileUpload,
        source_material: Option<FileUpload>,
    ) -> Result<GeneratedContent> {
        let body = MultipartBody::new()
            .file("question_paper", question_paper)
            .optional_file("source_material", source_material);
        self.call_as(ApiRequest::post_multipart(
            "/generate-answers-from-upload",
            body,
        ))
        .await
    }

    /// `POST /refine-answers-from-upload`
    pub async fn refine_answers_from_upload(
        &self,
        question_paper: FileUpload,
        feedback: &str,
        source_material: Option<FileUpload>,
    ) -> Result<GeneratedContent> {
        let body = MultipartBody::new()
            .file("question_paper", question_paper)
            .text("feedback", feedback)
            .optional_file("source_material", source_material);
        self.call_as(ApiRequest::post_multipart(
            "/refine-answers-from-upload",
            body,
        ))
        .await
    }

    /// `POST /assignments`
    pub async fn create_assignment(
        &self,
        request: &SaveAssignmentRequest,
    ) -> Result<MessageResponse> {
        self.call_as(ApiRequest::post_json("/assignments", request)?)
            .await
    }

    // ========================================
    // Grading
    // ========================================

    /// `POST /grade-submission`
    pub async fn grade_submission(&self, submission: &GradeSubmission) -> Result<GradeResponse> {
        self.call_as(ApiRequest::post_multipart(
            "/grade-submission",
            submission.to_multipart(),
        ))
        .await
    }

    // ========================================
    // Classes and Students
    // ========================================

    /// `GET /classes`
    pub async fn list_classes(&self) -> Result<Vec<ClassInfo>> {
        self.call_as(ApiRequest::get("/classes")).await
    }

    /// `POST /classes`
    pub async fn create_class(&self, class: &NewClass) -> Result<ClassInfo> {
        self.call_as(ApiRequest::post_json("/classes", class)?).await
    }

    /// `GET /classes/{id}/students`
    pub async fn list_students(&self, class_id: i64) -> Result<Vec<StudentInfo>> {
        self.call_as(ApiRequest::get(format!("/classes/{}/students", class_id)))
            .await
    }

    /// `POST /classes/{id}/students` with a JSON array
    pub async fn add_students(
        &self,
        class_id: i64,
        students: &[NewStudent],
    ) -> Result<Vec<StudentInfo>> {
        self.call_as(ApiRequest::post_json(
            format!("/classes/{}/students", class_id),
            &students,
        )?)
        .await
    }

    // ========================================
    // Profile and Dashboard
    // ========================================

    /// `GET /me`
    pub async fn profile(&self) -> Result<ProfileResponse> {
        self.call_as(ApiRequest::get("/me")).await
    }

    /// `POST /me`
    pub async fn update_profile(&self, profile: &UserProfile) -> Result<UserProfile> {
        self.call_as(ApiRequest::post_json("/me", profile)?).await
    }

    /// `GET /me/dashboard`
    pub async fn dashboard(&self) -> Result<Dashboard> {
        self.call_as(ApiRequest::get("/me/dashboard")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_submission_multipart_omits_absent_tags() {
        let submission = GradeSubmission {
            assignment_name: "Quiz 1".to_string(),
            student_sheet: FileUpload::new("s.jpg", "image/jpeg", vec![9]),
            class_id: Some(4),
            student_id: None,
            remarks: None,
        };

        let body = submission.to_multipart();
        assert_eq!(body.get_text("assignment_name"), Some("Quiz 1"));
        assert_eq!(body.get_text("class_id"), Some("4"));
        assert!(!body.contains("student_id"));
        assert!(!body.contains("remarks"));
        assert_eq!(body.get_file("student_sheet").unwrap().file_name, "s.jpg");
    }
}
