//! Workbench view model
//!
//! Three mutually exclusive authoring modes feed one shared draft
//! (questions + answers). The selected mode is a single enum value, so
//! exactly one mode's fields are visible by construction and selecting the
//! same mode again is a no-op.
//!
//! Actions are planned here as plain data ([`WorkbenchAction`]): planning
//! validates the form and fails with a validation error before anything
//! is sent. `App` executes the plan and feeds the response back through
//! [`WorkbenchState::apply_generated`].

use crate::capture::UploadSlot;
use crate::error::{ActionError, ActionResult};
use crate::slots::UploadSlots;
use gradedesk_common::api::types::{GeneratedContent, RefineRequest, SaveAssignmentRequest};
use gradedesk_common::api::FileUpload;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Authoring modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkbenchMode {
    /// Source file in, AI-generated questions and answers out
    #[default]
    Generate,
    /// Question paper (+ optional source material) in, AI answers out
    UploadThenGenerate,
    /// Question paper and reference answers uploaded as-is
    UploadBoth,
}

impl WorkbenchMode {
    pub const ALL: [WorkbenchMode; 3] = [
        WorkbenchMode::Generate,
        WorkbenchMode::UploadThenGenerate,
        WorkbenchMode::UploadBoth,
    ];
}

impl std::fmt::Display for WorkbenchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkbenchMode::Generate => write!(f, "generate"),
            WorkbenchMode::UploadThenGenerate => write!(f, "upload-then-generate"),
            WorkbenchMode::UploadBoth => write!(f, "upload-both"),
        }
    }
}

/// In-progress questions/answers pair
///
/// Serializable so a draft can be carried between CLI invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub questions: String,
    pub answers: String,
}

impl Draft {
    pub fn is_empty(&self) -> bool {
        self.questions.trim().is_empty() && self.answers.trim().is_empty()
    }
}

impl From<GeneratedContent> for Draft {
    fn from(content: GeneratedContent) -> Self {
        Self {
            questions: content.questions,
            answers: content.answers,
        }
    }
}

/// A validated workbench request, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkbenchAction {
    /// `POST /generate-assignment`
    GenerateFromSource { source_file: FileUpload },
    /// `POST /generate-answers-from-upload`
    GenerateAnswers {
        question_paper: FileUpload,
        source_material: Option<FileUpload>,
    },
    /// `POST /upload-assignment-assets`
    UploadAssets {
        assignment_name: String,
        question_paper: FileUpload,
        reference_answers: Option<FileUpload>,
    },
    /// `POST /refine-content`
    RefineDraft(RefineRequest),
    /// `POST /refine-answers-from-upload`
    RefineAnswers {
        question_paper: FileUpload,
        feedback: String,
        source_material: Option<FileUpload>,
    },
    /// `POST /save-assignment`
    SaveDraft(SaveAssignmentRequest),
    /// `POST /assignments`
    CreateAssignment(SaveAssignmentRequest),
}

impl WorkbenchAction {
    /// Status shown while the request runs
    pub fn progress_message(&self) -> &'static str {
        match self {
            WorkbenchAction::GenerateFromSource { .. } => "Generating content...",
            WorkbenchAction::GenerateAnswers {
                source_material: Some(_),
                ..
            } => "Generating answers with source material...",
            WorkbenchAction::GenerateAnswers { .. } => "Generating answers from question paper...",
            WorkbenchAction::UploadAssets { .. } => "Uploading assignment files...",
            WorkbenchAction::RefineDraft(_) => "Refining content...",
            WorkbenchAction::RefineAnswers { .. } => "Refining answers with your feedback...",
            WorkbenchAction::SaveDraft(_) | WorkbenchAction::CreateAssignment(_) => {
                "Saving assignment..."
            }
        }
    }

    /// Prefix for a failure message
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            WorkbenchAction::GenerateFromSource { .. } | WorkbenchAction::GenerateAnswers { .. } => {
                "Generation failed"
            }
            WorkbenchAction::UploadAssets { .. } => "Upload failed",
            WorkbenchAction::RefineDraft(_) | WorkbenchAction::RefineAnswers { .. } => {
                "Refinement failed"
            }
            WorkbenchAction::SaveDraft(_) => "Save failed",
            WorkbenchAction::CreateAssignment(_) => "Failed to save assignment",
        }
    }

    /// Whether a success creates an assignment the grader should list
    pub fn creates_assignment(&self) -> bool {
        matches!(
            self,
            WorkbenchAction::UploadAssets { .. }
                | WorkbenchAction::SaveDraft(_)
                | WorkbenchAction::CreateAssignment(_)
        )
    }
}

/// Form state of the workbench
#[derive(Debug, Clone, Default)]
pub struct WorkbenchState {
    mode: WorkbenchMode,
    pub draft: Draft,

    // Generate mode
    pub source_file: Option<FileUpload>,
    pub feedback: String,
    pub assignment_name: String,

    // Upload-then-generate mode (question paper lives in the upload slots)
    pub source_material: Option<FileUpload>,
    pub upload_feedback: String,
    pub final_assignment_name: String,

    // Upload-both mode (question paper and reference answers in the slots)
    pub upload_assignment_name: String,
}

impl WorkbenchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> WorkbenchMode {
        self.mode
    }

    /// Select a mode; re-selecting the current one changes nothing
    pub fn select_mode(&mut self, mode: WorkbenchMode) {
        if self.mode != mode {
            info!("Workbench mode: {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Whether `mode`'s fields are shown
    pub fn is_section_visible(&self, mode: WorkbenchMode) -> bool {
        self.mode == mode
    }

    // ========================================
    // Planning
    // ========================================

    /// Plan the mode's generate/upload action
    pub fn plan_generate(&self, slots: &UploadSlots) -> ActionResult<WorkbenchAction> {
        match self.mode {
            WorkbenchMode::Generate => {
                let source_file = self
                    .source_file
                    .clone()
                    .ok_or_else(|| ActionError::validation("Please upload a source file."))?;
                Ok(WorkbenchAction::GenerateFromSource { source_file })
            }
            WorkbenchMode::UploadThenGenerate => {
                let question_paper = slots
                    .submission(UploadSlot::QuestionPaper)
                    .ok_or_else(|| ActionError::validation("Select a question paper file first."))?;
                Ok(WorkbenchAction::GenerateAnswers {
                    question_paper,
                    source_material: self.source_material.clone(),
                })
            }
            WorkbenchMode::UploadBoth => self.plan_upload_assets(slots),
        }
    }

    /// Plan the mode's refine action; needs an existing draft
    pub fn plan_refine(&self, slots: &UploadSlots) -> ActionResult<WorkbenchAction> {
        match self.mode {
            WorkbenchMode::Generate | WorkbenchMode::UploadBoth => {
                if self.draft.questions.trim().is_empty() {
                    return Err(ActionError::validation("Nothing to refine."));
                }
                Ok(WorkbenchAction::RefineDraft(RefineRequest {
                    previous_questions: self.draft.questions.clone(),
                    previous_answers: self.draft.answers.clone(),
                    feedback: self.feedback.clone(),
                }))
            }
            WorkbenchMode::UploadThenGenerate => {
                if self.draft.is_empty() {
                    return Err(ActionError::validation("Nothing to refine."));
                }
                let feedback = self.upload_feedback.trim();
                if feedback.is_empty() {
                    return Err(ActionError::validation(
                        "Please provide refinement feedback.",
                    ));
                }
                let question_paper = slots.submission(UploadSlot::QuestionPaper).ok_or_else(|| {
                    ActionError::validation("Question paper is required for refinement.")
                })?;
                Ok(WorkbenchAction::RefineAnswers {
                    question_paper,
                    feedback: feedback.to_string(),
                    source_material: self.source_material.clone(),
                })
            }
        }
    }

    /// Plan the mode's save action
    pub fn plan_save(&self, slots: &UploadSlots) -> ActionResult<WorkbenchAction> {
        match self.mode {
            WorkbenchMode::Generate => {
                let assignment_name = self.assignment_name.trim();
                if assignment_name.is_empty()
                    || self.draft.questions.is_empty()
                    || self.draft.answers.is_empty()
                {
                    return Err(ActionError::validation("Cannot save empty content."));
                }
                Ok(WorkbenchAction::SaveDraft(SaveAssignmentRequest {
                    assignment_name: assignment_name.to_string(),
                    questions: self.draft.questions.clone(),
                    answers: self.draft.answers.clone(),
                }))
            }
            WorkbenchMode::UploadThenGenerate => {
                let assignment_name = self.final_assignment_name.trim();
                if assignment_name.is_empty() {
                    return Err(ActionError::validation("Please enter an assignment name."));
                }
                if self.draft.is_empty() {
                    return Err(ActionError::validation(
                        "No content to save. Please generate answers first.",
                    ));
                }
                Ok(WorkbenchAction::CreateAssignment(SaveAssignmentRequest {
                    assignment_name: assignment_name.to_string(),
                    questions: self.draft.questions.trim().to_string(),
                    answers: self.draft.answers.trim().to_string(),
                }))
            }
            WorkbenchMode::UploadBoth => self.plan_upload_assets(slots),
        }
    }

    fn plan_upload_assets(&self, slots: &UploadSlots) -> ActionResult<WorkbenchAction> {
        let assignment_name = self.upload_assignment_name.trim();
        let question_paper = slots.submission(UploadSlot::QuestionPaperBoth);
        match (assignment_name.is_empty(), question_paper) {
            (false, Some(question_paper)) => Ok(WorkbenchAction::UploadAssets {
                assignment_name: assignment_name.to_string(),
                question_paper,
                reference_answers: slots.submission(UploadSlot::ReferenceAnswers),
            }),
            _ => Err(ActionError::validation(
                "Assignment name and question paper are required.",
            )),
        }
    }

    // ========================================
    // Applying responses
    // ========================================

    /// Merge a generation/refine response into the draft
    ///
    /// Full generation and draft refinement replace both fields. Answer
    /// generation from an uploaded paper replaces the answers and only
    /// fills the questions when the draft has none.
    pub fn apply_generated(&mut self, action: &WorkbenchAction, content: GeneratedContent) {
        match action {
            WorkbenchAction::GenerateFromSource { .. } | WorkbenchAction::RefineDraft(_) => {
                self.draft = content.into();
            }
            WorkbenchAction::GenerateAnswers { .. } | WorkbenchAction::RefineAnswers { .. } => {
                self.draft.answers = content.answers;
                if self.draft.questions.is_empty() {
                    self.draft.questions = content.questions;
                }
            }
            _ => {}
        }
    }

    /// Reset fields consumed by a successful save
    pub fn after_save(&mut self, action: &WorkbenchAction) {
        if let WorkbenchAction::CreateAssignment(_) = action {
            self.final_assignment_name.clear();
            self.upload_feedback.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper() -> FileUpload {
        FileUpload::new("paper.pdf", "application/pdf", vec![1, 2])
    }

    fn visible_count(state: &WorkbenchState) -> usize {
        WorkbenchMode::ALL
            .iter()
            .filter(|m| state.is_section_visible(**m))
            .count()
    }

    #[test]
    fn test_exactly_one_section_visible_for_all_mode_sequences() {
        // Every sequence of three selections, repeats included
        for a in WorkbenchMode::ALL {
            for b in WorkbenchMode::ALL {
                for c in WorkbenchMode::ALL {
                    let mut state = WorkbenchState::new();
                    assert_eq!(visible_count(&state), 1);
                    for mode in [a, b, c] {
                        state.select_mode(mode);
                        assert_eq!(visible_count(&state), 1);
                        assert!(state.is_section_visible(mode));
                    }
                }
            }
        }
    }

    #[test]
    fn test_upload_both_save_without_name_rejected() {
        let mut state = WorkbenchState::new();
        state.select_mode(WorkbenchMode::UploadBoth);

        let mut slots = UploadSlots::new();
        slots.choose_file(UploadSlot::QuestionPaperBoth, paper());
        slots.choose_file(
            UploadSlot::ReferenceAnswers,
            FileUpload::new("ref.pdf", "application/pdf", vec![3]),
        );

        let err = state.plan_save(&slots).unwrap_err();
        assert!(matches!(err, ActionError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Assignment name and question paper are required."
        );

        state.upload_assignment_name = "Unit 3".to_string();
        match state.plan_save(&slots).unwrap() {
            WorkbenchAction::UploadAssets {
                assignment_name,
                reference_answers,
                ..
            } => {
                assert_eq!(assignment_name, "Unit 3");
                assert_eq!(reference_answers.unwrap().file_name, "ref.pdf");
            }
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn test_generate_requires_source_file() {
        let state = WorkbenchState::new();
        let err = state.plan_generate(&UploadSlots::new()).unwrap_err();
        assert_eq!(err.to_string(), "Please upload a source file.");
    }

    #[test]
    fn test_refine_requires_prior_draft() {
        let mut state = WorkbenchState::new();
        let slots = UploadSlots::new();
        assert_eq!(
            state.plan_refine(&slots).unwrap_err().to_string(),
            "Nothing to refine."
        );

        state.draft = Draft {
            questions: "Q".to_string(),
            answers: "A".to_string(),
        };
        state.feedback = "harder".to_string();
        assert_eq!(
            state.plan_refine(&slots).unwrap(),
            WorkbenchAction::RefineDraft(RefineRequest {
                previous_questions: "Q".to_string(),
                previous_answers: "A".to_string(),
                feedback: "harder".to_string(),
            })
        );
    }

    #[test]
    fn test_upload_refine_checks_feedback_then_paper() {
        let mut state = WorkbenchState::new();
        state.select_mode(WorkbenchMode::UploadThenGenerate);
        state.draft.answers = "A".to_string();
        let mut slots = UploadSlots::new();

        assert_eq!(
            state.plan_refine(&slots).unwrap_err().to_string(),
            "Please provide refinement feedback."
        );

        state.upload_feedback = "  more detail ".to_string();
        assert_eq!(
            state.plan_refine(&slots).unwrap_err().to_string(),
            "Question paper is required for refinement."
        );

        slots.choose_file(UploadSlot::QuestionPaper, paper());
        match state.plan_refine(&slots).unwrap() {
            WorkbenchAction::RefineAnswers { feedback, .. } => assert_eq!(feedback, "more detail"),
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn test_generate_save_rejects_partial_content() {
        let mut state = WorkbenchState::new();
        state.assignment_name = "Quiz".to_string();
        state.draft.questions = "Q".to_string();

        let err = state.plan_save(&UploadSlots::new()).unwrap_err();
        assert_eq!(err.to_string(), "Cannot save empty content.");
    }

    #[test]
    fn test_upload_generate_save_allows_answers_only() {
        let mut state = WorkbenchState::new();
        state.select_mode(WorkbenchMode::UploadThenGenerate);
        state.final_assignment_name = "Quiz".to_string();
        state.draft.answers = " A1 ".to_string();

        match state.plan_save(&UploadSlots::new()).unwrap() {
            WorkbenchAction::CreateAssignment(request) => {
                assert_eq!(request.questions, "");
                assert_eq!(request.answers, "A1");
            }
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn test_answer_generation_keeps_existing_questions() {
        let mut state = WorkbenchState::new();
        state.draft.questions = "Mine".to_string();
        let action = WorkbenchAction::GenerateAnswers {
            question_paper: paper(),
            source_material: None,
        };

        state.apply_generated(
            &action,
            GeneratedContent {
                questions: "Theirs".to_string(),
                answers: "A".to_string(),
            },
        );
        assert_eq!(state.draft.questions, "Mine");
        assert_eq!(state.draft.answers, "A");

        state.apply_generated(
            &WorkbenchAction::GenerateFromSource {
                source_file: paper(),
            },
            GeneratedContent {
                questions: "New Q".to_string(),
                answers: "New A".to_string(),
            },
        );
        assert_eq!(state.draft.questions, "New Q");
    }

    #[test]
    fn test_captured_question_paper_used_for_generation() {
        let mut state = WorkbenchState::new();
        state.select_mode(WorkbenchMode::UploadThenGenerate);

        let mut slots = UploadSlots::new();
        slots.attach_capture(crate::capture::CapturedImage {
            slot: UploadSlot::QuestionPaper,
            image: FileUpload::new("webcam_capture.jpg", "image/jpeg", vec![0xFF]),
        });

        match state.plan_generate(&slots).unwrap() {
            WorkbenchAction::GenerateAnswers { question_paper, .. } => {
                assert_eq!(question_paper.file_name, "webcam_capture.jpg")
            }
            other => panic!("unexpected plan {other:?}"),
        }
    }
}
