//! View model and its projection
//!
//! [`ViewModel`] is the single source of truth for everything on screen.
//! [`render`] is a pure function of it: which tab is active, which
//! workbench section is shown and which controls accept input are all
//! computed, never stored.

use crate::capture::{CaptureState, UploadSlot};
use crate::grader::{GradeReport, GraderState, Listing, SelectOption};
use crate::panels::{ClassesPanel, ProfilePanel, VaultPanel};
use crate::slots::UploadSlots;
use crate::status::StatusLine;
use crate::tabs::{TabController, View};
use crate::workbench::{Draft, WorkbenchMode, WorkbenchState};

/// Where the front end should be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Navigation {
    #[default]
    App,
    /// Credential missing or rejected
    Login,
}

/// All client-side state of one session
#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    pub tabs: TabController,
    pub workbench: WorkbenchState,
    pub grader: GraderState,
    pub slots: UploadSlots,
    pub profile: ProfilePanel,
    pub classes: ClassesPanel,
    pub vault: VaultPanel,
    pub status: StatusLine,
    pub navigation: Navigation,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Projection of a [`ViewModel`] for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub active_view: View,
    pub workbench_tab_enabled: bool,
    pub grader_tab_enabled: bool,
    /// Workbench sections in display order with their visibility
    pub workbench_sections: Vec<(WorkbenchMode, bool)>,
    pub draft: Draft,
    pub slot_labels: Vec<(UploadSlot, String)>,
    /// Title of the open capture dialog
    pub capture_dialog: Option<&'static str>,
    pub assignment_options: Vec<String>,
    pub selected_assignment: Option<String>,
    pub class_options: Vec<SelectOption>,
    pub student_options: Vec<SelectOption>,
    pub student_selector_enabled: bool,
    pub grade_button_enabled: bool,
    pub report: Option<GradeReport>,
    pub status: StatusLine,
    pub navigation: Navigation,
}

impl Screen {
    /// The one workbench mode whose fields are shown
    pub fn visible_section(&self) -> Option<WorkbenchMode> {
        self.workbench_sections
            .iter()
            .find(|(_, visible)| *visible)
            .map(|(mode, _)| *mode)
    }

    /// Text of the results panel for the active view
    pub fn results_lines(&self) -> Vec<String> {
        match self.active_view {
            View::Workbench => vec![
                "Questions:".to_string(),
                self.draft.questions.clone(),
                "Answers:".to_string(),
                self.draft.answers.clone(),
            ],
            View::Grader => match &self.report {
                Some(report) => vec![
                    format!("Legibility: {}", report.legibility_report),
                    format!("Fairness: {}", report.fairness_check),
                    "Extracted text:".to_string(),
                    report.ocr_text.clone(),
                    report.summary(),
                ],
                None => Vec::new(),
            },
        }
    }
}

/// Project the view model onto a screen
pub fn render(model: &ViewModel, capture: CaptureState) -> Screen {
    let grading = model.tabs.grading_in_flight();

    Screen {
        active_view: model.tabs.active(),
        workbench_tab_enabled: model.tabs.tab_enabled(View::Workbench),
        grader_tab_enabled: model.tabs.tab_enabled(View::Grader),
        workbench_sections: WorkbenchMode::ALL
            .iter()
            .map(|mode| (*mode, model.workbench.is_section_visible(*mode)))
            .collect(),
        draft: model.workbench.draft.clone(),
        slot_labels: UploadSlot::ALL
            .iter()
            .map(|slot| (*slot, model.slots.display_name(*slot)))
            .collect(),
        capture_dialog: match capture {
            CaptureState::Previewing { slot } => Some(slot.dialog_title()),
            CaptureState::Idle => None,
        },
        assignment_options: match model.grader.assignments() {
            Listing::Loaded(names) => names.clone(),
            _ => Vec::new(),
        },
        selected_assignment: model.grader.selected_assignment().map(str::to_string),
        class_options: model.grader.class_options(),
        student_options: model.grader.student_options(),
        student_selector_enabled: model.grader.student_selector_enabled() && !grading,
        grade_button_enabled: !grading,
        report: model.grader.report.clone(),
        status: model.status.clone(),
        navigation: model.navigation,
    }
}
