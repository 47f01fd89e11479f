//! Application controller
//!
//! [`App`] owns the view model, the camera controller and the API client.
//! Every user action is a method here: it validates against the view
//! model, sets the status line, awaits the API and writes the response
//! back. Errors stop at this boundary as a status message; the only
//! error that changes more than the status line is a rejected credential,
//! which clears it and navigates to the login view.
//!
//! The view model lock is a std mutex held only between awaits.

use crate::capture::{CameraDevice, CaptureController, CaptureState, UploadSlot};
use crate::error::{ActionError, ActionResult};
use crate::grader::GradeReport;
use crate::panels::VaultPanel;
use crate::status::StatusLine;
use crate::tabs::{TabTransition, View};
use crate::view::{render, Navigation, Screen, ViewModel};
use crate::workbench::{WorkbenchAction, WorkbenchMode, WorkbenchState};
use gradedesk_common::api::types::GeneratedContent;
use gradedesk_common::api::{ApiClient, FileUpload, HttpTransport, Transport};
use gradedesk_common::{CredentialStore, Session};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

const SESSION_EXPIRED: &str = "Session expired. Please log in again.";

pub struct App {
    api: ApiClient,
    credentials: Arc<CredentialStore>,
    model: Mutex<ViewModel>,
    capture: Mutex<CaptureController>,
}

/// Lowers the grading flag on every exit path of a grading request
struct InFlight<'a> {
    app: &'a App,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.app.model().tabs.finish_grading();
    }
}

impl App {
    /// Build an app talking HTTP to `base_url`
    pub fn connect(
        session: Session,
        base_url: &str,
        camera: Arc<dyn CameraDevice>,
    ) -> ActionResult<Self> {
        let transport = HttpTransport::new(base_url, Arc::clone(session.credentials()))?;
        Ok(Self::with_transport(session, Arc::new(transport), camera))
    }

    /// Build an app over any transport
    pub fn with_transport(
        session: Session,
        transport: Arc<dyn Transport>,
        camera: Arc<dyn CameraDevice>,
    ) -> Self {
        Self {
            api: ApiClient::new(transport),
            credentials: Arc::clone(session.credentials()),
            model: Mutex::new(ViewModel::new()),
            capture: Mutex::new(CaptureController::new(camera)),
        }
    }

    fn model(&self) -> MutexGuard<'_, ViewModel> {
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn camera(&self) -> MutexGuard<'_, CaptureController> {
        self.capture.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the view model
    pub fn with_model<T>(&self, f: impl FnOnce(&mut ViewModel) -> T) -> T {
        f(&mut self.model())
    }

    /// Current projection of the view model
    pub fn screen(&self) -> Screen {
        let capture = self.camera().state();
        render(&self.model(), capture)
    }

    pub fn status(&self) -> StatusLine {
        self.model().status.clone()
    }

    pub fn navigation(&self) -> Navigation {
        self.model().navigation
    }

    fn set_status(&self, status: StatusLine) {
        self.model().status = status;
    }

    /// Turn a failed action into a status message
    ///
    /// Validation messages are shown as-is; other failures get the
    /// action's prefix. A rejected credential is cleared and the view
    /// navigates to login.
    fn fail<T>(&self, prefix: &str, error: ActionError) -> ActionResult<T> {
        let message = match &error {
            ActionError::Validation(message) => {
                debug!("{} rejected: {}", prefix, message);
                message.clone()
            }
            e if e.is_unauthorized() => {
                warn!("Credential rejected by server: {}", e);
                if let Err(clear_err) = self.credentials.clear() {
                    warn!("Failed to clear credential: {}", clear_err);
                }
                self.model().navigation = Navigation::Login;
                SESSION_EXPIRED.to_string()
            }
            e => {
                warn!("{}: {}", prefix, e);
                format!("{}: {}", prefix, e)
            }
        };
        self.set_status(StatusLine::error(message));
        Err(error)
    }

    // ========================================
    // Navigation
    // ========================================

    /// Initial state: workbench visible, generate mode selected
    pub async fn initialize(&self) {
        self.model().workbench.select_mode(WorkbenchMode::Generate);
        self.switch_to(View::Workbench).await;
    }

    /// Request a tab switch; entering the grader refreshes its lists
    pub async fn switch_to(&self, target: View) -> TabTransition {
        let transition = self.model().tabs.switch_to(target);
        if let TabTransition::Applied {
            refresh_grader_lists: true,
            ..
        } = transition
        {
            self.refresh_grader_lists().await;
        }
        transition
    }

    /// Fetch assignments and classes concurrently
    pub async fn refresh_grader_lists(&self) {
        let (assignments, classes) = tokio::join!(
            self.refresh_assignments(),
            self.refresh_classes()
        );
        if let (Err(e), _) | (_, Err(e)) = (&assignments, &classes) {
            debug!("Grader list refresh incomplete: {}", e);
        }
    }

    pub async fn refresh_assignments(&self) -> ActionResult<usize> {
        match self.api.list_assignments().await {
            Ok(names) => {
                let count = names.len();
                self.model().grader.set_assignments(Ok(names));
                debug!("Loaded {} assignments", count);
                Ok(count)
            }
            Err(e) => {
                self.model().grader.set_assignments(Err(e.to_string()));
                self.fail("Failed to load assignments", e.into())
            }
        }
    }

    pub async fn refresh_classes(&self) -> ActionResult<usize> {
        self.set_status(StatusLine::loading("Loading classes..."));
        match self.api.list_classes().await {
            Ok(classes) => {
                let count = classes.len();
                self.with_model(|model| {
                    model.grader.set_classes(Ok(classes.clone()));
                    model.classes.set_classes(classes);
                    model.status = if count > 0 {
                        StatusLine::info(format!("Loaded {} classes.", count))
                    } else {
                        StatusLine::info("No classes found. Create one in Manage Classes.")
                    };
                });
                Ok(count)
            }
            Err(e) => {
                self.model().grader.set_classes(Err(e.to_string()));
                self.fail("Failed to load classes", e.into())
            }
        }
    }

    // ========================================
    // Upload Slots and Camera
    // ========================================

    pub fn select_mode(&self, mode: WorkbenchMode) {
        self.model().workbench.select_mode(mode);
    }

    /// Read a local file for upload
    pub fn read_upload(&self, path: &Path) -> ActionResult<FileUpload> {
        match FileUpload::from_path(path) {
            Ok(file) => Ok(file),
            Err(e) => self.fail(&format!("Could not read {}", path.display()), e.into()),
        }
    }

    /// Show a failure from outside the app's own actions, such as a
    /// malformed input file, on the status line
    pub fn report_failure<T>(&self, prefix: &str, error: ActionError) -> ActionResult<T> {
        self.fail(prefix, error)
    }

    /// Attach a chosen file to a slot
    pub fn choose_file(&self, slot: UploadSlot, file: FileUpload) {
        debug!("File {} chosen for {}", file.file_name, slot);
        self.model().slots.choose_file(slot, file);
    }

    /// Open the capture dialog for `slot`
    ///
    /// A new session discards any capture still pending.
    pub fn start_capture(&self, slot: UploadSlot) -> ActionResult<()> {
        self.model().slots.discard_capture();
        let started = self.camera().start(slot);
        match started {
            Ok(()) => Ok(()),
            Err(e) => self.fail("Camera unavailable", e.into()),
        }
    }

    /// Capture the current frame into the previewed slot
    pub fn capture(&self) -> ActionResult<UploadSlot> {
        let captured = self.camera().capture();
        match captured {
            Ok(captured) => {
                let slot = captured.slot;
                self.with_model(|model| {
                    model.slots.attach_capture(captured);
                    model.status = StatusLine::info("Image captured.");
                });
                Ok(slot)
            }
            Err(e) => self.fail("Capture failed", e.into()),
        }
    }

    pub fn cancel_capture(&self) {
        self.camera().cancel();
    }

    pub fn capture_state(&self) -> CaptureState {
        self.camera().state()
    }

    // ========================================
    // Workbench
    // ========================================

    pub fn edit_workbench(&self, f: impl FnOnce(&mut WorkbenchState)) {
        f(&mut self.model().workbench);
    }

    /// Generate (or upload, in upload-both mode) for the selected mode
    pub async fn generate(&self) -> ActionResult<()> {
        let planned = self.with_model(|m| m.workbench.plan_generate(&m.slots));
        self.run_workbench(planned, "Generation failed").await
    }

    /// Refine the current draft
    pub async fn refine(&self) -> ActionResult<()> {
        let planned = self.with_model(|m| m.workbench.plan_refine(&m.slots));
        self.run_workbench(planned, "Refinement failed").await
    }

    /// Save the current draft under the mode's assignment name
    pub async fn save(&self) -> ActionResult<()> {
        let planned = self.with_model(|m| m.workbench.plan_save(&m.slots));
        self.run_workbench(planned, "Save failed").await
    }

    async fn run_workbench(
        &self,
        planned: ActionResult<WorkbenchAction>,
        prefix: &str,
    ) -> ActionResult<()> {
        let action = match planned {
            Ok(action) => action,
            Err(e) => return self.fail(prefix, e),
        };

        self.set_status(StatusLine::loading(action.progress_message()));
        info!("Workbench action: {}", action.progress_message());

        match self.send_workbench(&action).await {
            Ok(outcome) => {
                self.with_model(|model| {
                    if let Some(content) = outcome.content {
                        model.workbench.apply_generated(&action, content);
                    }
                    model.workbench.after_save(&action);
                    model.status = StatusLine::info(outcome.message);
                });
                if action.creates_assignment() {
                    // Failure is already on the status line
                    let _ = self.refresh_assignments().await;
                }
                Ok(())
            }
            Err(e) => self.fail(action.failure_prefix(), e.into()),
        }
    }

    async fn send_workbench(
        &self,
        action: &WorkbenchAction,
    ) -> gradedesk_common::Result<WorkbenchOutcome> {
        let outcome = match action {
            WorkbenchAction::GenerateFromSource { source_file } => {
                let content = self.api.generate_assignment(source_file.clone()).await?;
                WorkbenchOutcome::content(content, "Content generated successfully!")
            }
            WorkbenchAction::GenerateAnswers {
                question_paper,
                source_material,
            } => {
                let content = self
                    .api
                    .generate_answers_from_upload(question_paper.clone(), source_material.clone())
                    .await?;
                WorkbenchOutcome::content(content, "Answers generated successfully!")
            }
            WorkbenchAction::UploadAssets {
                assignment_name,
                question_paper,
                reference_answers,
            } => {
                self.api
                    .upload_assignment_assets(
                        assignment_name,
                        question_paper.clone(),
                        reference_answers.clone(),
                    )
                    .await?;
                WorkbenchOutcome::message("Files uploaded and assignment recorded.")
            }
            WorkbenchAction::RefineDraft(request) => {
                let content = self.api.refine_content(request).await?;
                WorkbenchOutcome::content(content, "Content refined successfully!")
            }
            WorkbenchAction::RefineAnswers {
                question_paper,
                feedback,
                source_material,
            } => {
                let content = self
                    .api
                    .refine_answers_from_upload(
                        question_paper.clone(),
                        feedback,
                        source_material.clone(),
                    )
                    .await?;
                WorkbenchOutcome::content(content, "Answers refined successfully!")
            }
            WorkbenchAction::SaveDraft(request) => {
                let response = self.api.save_assignment(request).await?;
                WorkbenchOutcome::message(
                    response
                        .message
                        .unwrap_or_else(|| "Assignment saved.".to_string()),
                )
            }
            WorkbenchAction::CreateAssignment(request) => {
                self.api.create_assignment(request).await?;
                WorkbenchOutcome::message("Assignment saved successfully!")
            }
        };
        Ok(outcome)
    }

    // ========================================
    // Grader
    // ========================================

    pub fn select_assignment(&self, name: &str) -> ActionResult<()> {
        let selected = self.model().grader.select_assignment(name);
        match selected {
            Ok(()) => Ok(()),
            Err(e) => self.fail("Select assignment", e),
        }
    }

    /// Select a class and load its roster
    ///
    /// The student selector is reset before the request goes out, and a
    /// roster that arrives after the class changed again is dropped.
    pub async fn select_class(&self, class_id: Option<i64>) -> ActionResult<()> {
        let selected = self.model().grader.select_class(class_id);
        let class_id = match selected {
            Ok(Some(id)) => id,
            Ok(None) => return Ok(()),
            Err(e) => return self.fail("Select class", e),
        };

        self.set_status(StatusLine::loading("Loading students..."));
        match self.api.list_students(class_id).await {
            Ok(students) => {
                let count = students.len();
                self.with_model(|model| {
                    if model.grader.set_roster(class_id, Ok(students)) {
                        model.status = if count > 0 {
                            StatusLine::info(format!("Loaded {} students.", count))
                        } else {
                            StatusLine::info("No students found for this class.")
                        };
                    }
                });
                Ok(())
            }
            Err(e) => {
                self.model()
                    .grader
                    .set_roster(class_id, Err(e.to_string()));
                self.fail("Failed to load students", e.into())
            }
        }
    }

    pub fn select_student(&self, student_id: Option<i64>) -> ActionResult<()> {
        let selected = self.model().grader.select_student(student_id);
        match selected {
            Ok(()) => Ok(()),
            Err(e) => self.fail("Select student", e),
        }
    }

    pub fn set_remarks(&self, remarks: &str) {
        self.model().grader.remarks = remarks.to_string();
    }

    /// Grade the student sheet against the selected assignment
    ///
    /// The grader view is pinned and the workbench tab disabled until the
    /// request settles. Invalid input is reported without taking the pin
    /// or sending anything.
    pub async fn submit_grading(&self) -> ActionResult<GradeReport> {
        let submission = {
            let mut model = self.model();
            if model.tabs.grading_in_flight() {
                drop(model);
                return self.fail(
                    "Grading failed",
                    ActionError::validation("A grading request is already in progress."),
                );
            }
            let planned = model.grader.plan_submission(&model.slots);
            match planned {
                Ok(submission) => {
                    model.tabs.begin_grading();
                    model.grader.report = None;
                    model.status = StatusLine::loading("Grading student paper...");
                    submission
                }
                Err(e) => {
                    drop(model);
                    return self.fail("Grading failed", e);
                }
            }
        };
        let _in_flight = InFlight { app: self };

        info!(
            "Grading submission for '{}' ({} bytes)",
            submission.assignment_name,
            submission.student_sheet.bytes.len()
        );

        match self.api.grade_submission(&submission).await {
            Ok(response) => {
                let report = GradeReport::from_response(&response);
                self.with_model(|model| {
                    model.grader.report = Some(report.clone());
                    model.slots.consume_capture(UploadSlot::StudentSheet);
                    model.status =
                        StatusLine::info("Grading complete! Results displayed below.");
                });
                Ok(report)
            }
            Err(e) => self.fail("Grading failed", e.into()),
        }
    }

    // ========================================
    // Profile
    // ========================================

    pub async fn load_profile(&self) -> ActionResult<()> {
        self.set_status(StatusLine::loading("Loading profile..."));
        match self.api.profile().await {
            Ok(response) => {
                self.with_model(|model| {
                    model.profile.apply(&response);
                    model.status = StatusLine::info("Profile loaded.");
                });
                Ok(())
            }
            Err(e) => self.fail("Failed to load profile", e.into()),
        }
    }

    /// Save the profile inputs, then reload
    pub async fn save_profile(&self) -> ActionResult<()> {
        self.set_status(StatusLine::loading("Saving profile..."));
        let update = self.model().profile.to_update();
        match self.api.update_profile(&update).await {
            Ok(_) => {
                self.set_status(StatusLine::info("Profile saved."));
                self.load_profile().await
            }
            Err(e) => self.fail("Failed to save profile", e.into()),
        }
    }

    pub fn edit_profile(&self, full_name: Option<&str>, class_name: Option<&str>) {
        let mut model = self.model();
        if let Some(full_name) = full_name {
            model.profile.full_name = full_name.to_string();
        }
        if let Some(class_name) = class_name {
            model.profile.class_name = class_name.to_string();
        }
    }

    // ========================================
    // Class Manager
    // ========================================

    pub async fn create_class(&self, name: &str, section: &str) -> ActionResult<()> {
        let planned = self.with_model(|model| {
            model.classes.new_class_name = name.to_string();
            model.classes.new_class_section = section.to_string();
            model.classes.plan_create()
        });
        let new_class = match planned {
            Ok(new_class) => new_class,
            Err(e) => return self.fail("Failed to create class", e),
        };

        match self.api.create_class(&new_class).await {
            Ok(created) => {
                info!("Created class {} ({})", created.label(), created.id);
                self.model().classes.after_create();
                // Manager and grader class lists share one fetch; a failed
                // refresh keeps its error status
                if self.refresh_classes().await.is_ok() {
                    self.set_status(StatusLine::info("Class created."));
                }
                Ok(())
            }
            Err(e) => self.fail("Failed to create class", e.into()),
        }
    }

    /// Show a class roster in the manager
    pub async fn show_roster(&self, class_id: i64) -> ActionResult<Vec<String>> {
        self.model().classes.select_class(Some(class_id));
        match self.api.list_students(class_id).await {
            Ok(students) => {
                let mut model = self.model();
                model.classes.set_roster(class_id, students);
                Ok(model.classes.roster_lines())
            }
            Err(e) => self.fail("Failed to load students", e.into()),
        }
    }

    /// Bulk-add students from `name, email, roll_number` lines
    pub async fn add_students(&self, class_id: i64, bulk_text: &str) -> ActionResult<usize> {
        let planned = self.with_model(|model| {
            model.classes.select_class(Some(class_id));
            model.classes.bulk_text = bulk_text.to_string();
            model.classes.plan_add_students()
        });
        let (class_id, students) = match planned {
            Ok(planned) => planned,
            Err(e) => return self.fail("Failed to add students", e),
        };

        match self.api.add_students(class_id, &students).await {
            Ok(_) => {
                self.model().classes.bulk_text.clear();
                // First failed refresh wins the status line
                let mut failed = self.show_roster(class_id).await.is_err().then(|| self.status());
                let grader_class = self.model().grader.selected_class();
                if grader_class == Some(class_id)
                    && self.select_class(grader_class).await.is_err()
                    && failed.is_none()
                {
                    failed = Some(self.status());
                }
                self.set_status(failed.unwrap_or_else(|| StatusLine::info("Students added.")));
                Ok(students.len())
            }
            Err(e) => self.fail("Failed to add students", e.into()),
        }
    }

    // ========================================
    // Vault
    // ========================================

    pub fn open_vault(&self) {
        self.model().vault.open();
    }

    pub fn close_vault(&self) {
        self.model().vault.close();
    }

    /// Re-check the password, then load the dashboard
    pub async fn unlock_vault(&self, password: &str) -> ActionResult<()> {
        if let Err(e) = VaultPanel::validate_password(password) {
            return self.fail("Unlock failed", e);
        }

        let unlocked = match self.api.verify_password(password).await {
            Ok(()) => self.api.dashboard().await,
            Err(e) => Err(e),
        };

        match unlocked {
            Ok(dashboard) => {
                self.with_model(|model| {
                    model.vault.unlock(&dashboard);
                    model.status = StatusLine::info("Vault unlocked.");
                });
                Ok(())
            }
            Err(e) => self.fail("Unlock failed", e.into()),
        }
    }

    pub fn vault(&self) -> VaultPanel {
        self.model().vault.clone()
    }

    // ========================================
    // Session
    // ========================================

    /// Drop the credential and go to the login view
    pub fn logout(&self) -> ActionResult<()> {
        self.credentials.clear()?;
        self.with_model(|model| {
            model.navigation = Navigation::Login;
            model.status = StatusLine::info("Logged out.");
        });
        Ok(())
    }
}

struct WorkbenchOutcome {
    content: Option<GeneratedContent>,
    message: String,
}

impl WorkbenchOutcome {
    fn content(content: GeneratedContent, message: &str) -> Self {
        Self {
            content: Some(content),
            message: message.to_string(),
        }
    }

    fn message(message: impl Into<String>) -> Self {
        Self {
            content: None,
            message: message.into(),
        }
    }
}
