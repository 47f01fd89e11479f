//! Upload slot contents
//!
//! Each slot holds at most one submission image: either a chosen file or a
//! camera capture, never both. Choosing one clears the other. Only one
//! capture is pending at any time across all slots.

use crate::capture::{CapturedImage, UploadSlot, CAPTURE_FILE_NAME};
use gradedesk_common::api::FileUpload;
use std::collections::BTreeMap;

/// Shown for a slot with nothing attached
pub const NO_FILE_LABEL: &str = "No file chosen";

#[derive(Debug, Clone, Default)]
pub struct UploadSlots {
    files: BTreeMap<UploadSlot, FileUpload>,
    capture: Option<CapturedImage>,
}

impl UploadSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a chosen file, dropping any capture pending for the same slot
    pub fn choose_file(&mut self, slot: UploadSlot, file: FileUpload) {
        if self.capture.as_ref().is_some_and(|c| c.slot == slot) {
            self.capture = None;
        }
        self.files.insert(slot, file);
    }

    /// Attach a capture, clearing the file input of its slot
    pub fn attach_capture(&mut self, captured: CapturedImage) {
        self.files.remove(&captured.slot);
        self.capture = Some(captured);
    }

    /// Drop the pending capture, whichever slot it targets
    pub fn discard_capture(&mut self) {
        self.capture = None;
    }

    /// Drop the capture if it belongs to `slot` (after a successful submit)
    pub fn consume_capture(&mut self, slot: UploadSlot) {
        if self.capture.as_ref().is_some_and(|c| c.slot == slot) {
            self.capture = None;
        }
    }

    /// Empty a slot entirely
    pub fn clear(&mut self, slot: UploadSlot) {
        self.files.remove(&slot);
        self.consume_capture(slot);
    }

    pub fn pending_capture(&self) -> Option<&CapturedImage> {
        self.capture.as_ref()
    }

    pub fn chosen_file(&self, slot: UploadSlot) -> Option<&FileUpload> {
        self.files.get(&slot)
    }

    /// The image to send for `slot`
    pub fn submission(&self, slot: UploadSlot) -> Option<FileUpload> {
        match &self.capture {
            Some(captured) if captured.slot == slot => Some(captured.image.clone()),
            _ => self.files.get(&slot).cloned(),
        }
    }

    pub fn is_filled(&self, slot: UploadSlot) -> bool {
        self.submission(slot).is_some()
    }

    /// Name displayed next to the slot's file input
    pub fn display_name(&self, slot: UploadSlot) -> String {
        match &self.capture {
            Some(captured) if captured.slot == slot => CAPTURE_FILE_NAME.to_string(),
            _ => self
                .files
                .get(&slot)
                .map(|f| f.file_name.clone())
                .unwrap_or_else(|| NO_FILE_LABEL.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CAPTURE_MIME;

    fn file(name: &str) -> FileUpload {
        FileUpload::new(name, "image/png", vec![1])
    }

    fn captured(slot: UploadSlot) -> CapturedImage {
        CapturedImage {
            slot,
            image: FileUpload::new(CAPTURE_FILE_NAME, CAPTURE_MIME, vec![0xFF, 0xD8]),
        }
    }

    #[test]
    fn test_capture_clears_file_for_same_slot() {
        let mut slots = UploadSlots::new();
        slots.choose_file(UploadSlot::StudentSheet, file("sheet.png"));
        slots.attach_capture(captured(UploadSlot::StudentSheet));

        assert!(slots.chosen_file(UploadSlot::StudentSheet).is_none());
        assert_eq!(
            slots.submission(UploadSlot::StudentSheet).unwrap().file_name,
            CAPTURE_FILE_NAME
        );
        assert_eq!(slots.display_name(UploadSlot::StudentSheet), CAPTURE_FILE_NAME);
    }

    #[test]
    fn test_file_clears_capture_for_same_slot() {
        let mut slots = UploadSlots::new();
        slots.attach_capture(captured(UploadSlot::StudentSheet));
        slots.choose_file(UploadSlot::StudentSheet, file("sheet.png"));

        assert!(slots.pending_capture().is_none());
        assert_eq!(
            slots.submission(UploadSlot::StudentSheet).unwrap().file_name,
            "sheet.png"
        );
    }

    #[test]
    fn test_other_slots_untouched() {
        let mut slots = UploadSlots::new();
        slots.choose_file(UploadSlot::QuestionPaper, file("qp.png"));
        slots.attach_capture(captured(UploadSlot::StudentSheet));
        slots.choose_file(UploadSlot::ReferenceAnswers, file("ref.png"));

        assert_eq!(slots.display_name(UploadSlot::QuestionPaper), "qp.png");
        assert_eq!(slots.display_name(UploadSlot::StudentSheet), CAPTURE_FILE_NAME);
        assert_eq!(slots.display_name(UploadSlot::QuestionPaperBoth), NO_FILE_LABEL);
    }

    #[test]
    fn test_new_capture_replaces_pending_one() {
        let mut slots = UploadSlots::new();
        slots.attach_capture(captured(UploadSlot::QuestionPaper));
        slots.attach_capture(captured(UploadSlot::StudentSheet));

        assert!(!slots.is_filled(UploadSlot::QuestionPaper));
        assert!(slots.is_filled(UploadSlot::StudentSheet));
    }

    #[test]
    fn test_consume_only_matching_slot() {
        let mut slots = UploadSlots::new();
        slots.attach_capture(captured(UploadSlot::ReferenceAnswers));

        slots.consume_capture(UploadSlot::StudentSheet);
        assert!(slots.pending_capture().is_some());

        slots.consume_capture(UploadSlot::ReferenceAnswers);
        assert!(slots.pending_capture().is_none());
    }
}
