//! Camera capture controller
//!
//! Acquires a camera stream, keeps it open while the user frames the page,
//! grabs one still frame as a JPEG and releases the stream.
//!
//! # State Machine
//!
//! ```text
//!   Idle ──start(slot)──> Previewing(slot) ──capture()──> Idle  (yields image)
//!     ▲                        │
//!     └───────cancel()─────────┘                                (no image)
//! ```
//!
//! At most one stream is open at a time. Every path that ends a session
//! (capture, cancel, a new `start`, dropping the controller) stops the
//! stream so device access is never leaked.

use gradedesk_common::api::FileUpload;
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// File name given to captured images
pub const CAPTURE_FILE_NAME: &str = "webcam_capture.jpg";

/// MIME type of captured images
pub const CAPTURE_MIME: &str = "image/jpeg";

/// Surface size used when the stream does not report one
pub const FALLBACK_FRAME_SIZE: (u32, u32) = (1280, 720);

const JPEG_QUALITY: u8 = 90;

/// Camera errors, reported separately from network failures
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Webcam access is not supported on this system.")]
    Unsupported,

    #[error("Could not access webcam. Please grant permission. ({0})")]
    PermissionDenied(String),

    #[error("No camera preview is active.")]
    NotPreviewing,

    #[error("Could not read a frame from the camera: {0}")]
    Frame(String),

    #[error("Could not encode the captured image: {0}")]
    Encode(String),
}

// ========================================
// Upload Slots
// ========================================

/// File inputs that can be filled from the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UploadSlot {
    /// Grader: the student's answer sheet
    StudentSheet,
    /// Workbench upload-then-generate: question paper
    QuestionPaper,
    /// Workbench upload-both: question paper
    QuestionPaperBoth,
    /// Workbench upload-both: reference answers
    ReferenceAnswers,
}

impl UploadSlot {
    pub const ALL: [UploadSlot; 4] = [
        UploadSlot::StudentSheet,
        UploadSlot::QuestionPaper,
        UploadSlot::QuestionPaperBoth,
        UploadSlot::ReferenceAnswers,
    ];

    /// Title of the capture dialog for this slot
    pub fn dialog_title(&self) -> &'static str {
        match self {
            UploadSlot::StudentSheet => "Scan Student Answer Sheet",
            UploadSlot::QuestionPaper | UploadSlot::QuestionPaperBoth => "Scan Question Paper",
            UploadSlot::ReferenceAnswers => "Scan Reference Answers",
        }
    }
}

impl std::fmt::Display for UploadSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UploadSlot::StudentSheet => "student-sheet",
            UploadSlot::QuestionPaper => "question-paper",
            UploadSlot::QuestionPaperBoth => "question-paper-both",
            UploadSlot::ReferenceAnswers => "reference-answers",
        };
        write!(f, "{}", name)
    }
}

/// A still frame tagged with the slot it was captured for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub slot: UploadSlot,
    pub image: FileUpload,
}

// ========================================
// Camera Devices
// ========================================

/// An open camera stream
pub trait VideoStream: Send {
    /// Native frame size, if the device reports one
    fn frame_size(&self) -> Option<(u32, u32)>;

    /// Current frame
    fn grab_frame(&mut self) -> Result<RgbImage, CaptureError>;

    /// Release the device; must be idempotent
    fn stop(&mut self);
}

/// Source of camera streams
pub trait CameraDevice: Send + Sync {
    fn open(&self) -> Result<Box<dyn VideoStream>, CaptureError>;
}

/// Device for hosts without a camera
pub struct UnavailableCamera;

impl CameraDevice for UnavailableCamera {
    fn open(&self) -> Result<Box<dyn VideoStream>, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}

/// Camera that serves a fixed frame loaded from an image file
///
/// Stands in for a document camera whose exports land on disk.
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CameraDevice for StillImageCamera {
    fn open(&self) -> Result<Box<dyn VideoStream>, CaptureError> {
        let frame = image::open(&self.path)
            .map_err(|e| CaptureError::PermissionDenied(format!("{}: {}", self.path.display(), e)))?
            .to_rgb8();
        debug!(
            "Opened still-image camera {} ({}x{})",
            self.path.display(),
            frame.width(),
            frame.height()
        );
        Ok(Box::new(StillImageStream {
            frame,
            stopped: false,
        }))
    }
}

struct StillImageStream {
    frame: RgbImage,
    stopped: bool,
}

impl VideoStream for StillImageStream {
    fn frame_size(&self) -> Option<(u32, u32)> {
        Some(self.frame.dimensions())
    }

    fn grab_frame(&mut self) -> Result<RgbImage, CaptureError> {
        if self.stopped {
            return Err(CaptureError::Frame("stream stopped".to_string()));
        }
        Ok(self.frame.clone())
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

// ========================================
// Controller
// ========================================

/// Observable controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Previewing { slot: UploadSlot },
}

struct ActiveSession {
    slot: UploadSlot,
    stream: Box<dyn VideoStream>,
}

/// Owns the (single) camera stream
pub struct CaptureController {
    camera: Arc<dyn CameraDevice>,
    session: Option<ActiveSession>,
}

impl CaptureController {
    pub fn new(camera: Arc<dyn CameraDevice>) -> Self {
        Self {
            camera,
            session: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        match &self.session {
            Some(session) => CaptureState::Previewing { slot: session.slot },
            None => CaptureState::Idle,
        }
    }

    /// Open the camera for `slot`
    ///
    /// Any session already open is released first. On failure the
    /// controller stays idle.
    pub fn start(&mut self, slot: UploadSlot) -> Result<(), CaptureError> {
        self.release();

        match self.camera.open() {
            Ok(stream) => {
                info!("Camera preview started for {}", slot);
                self.session = Some(ActiveSession { slot, stream });
                Ok(())
            }
            Err(e) => {
                warn!("Camera unavailable for {}: {}", slot, e);
                Err(e)
            }
        }
    }

    /// Grab the current frame as a JPEG and end the session
    pub fn capture(&mut self) -> Result<CapturedImage, CaptureError> {
        let mut session = self.session.take().ok_or(CaptureError::NotPreviewing)?;

        let (width, height) = session
            .stream
            .frame_size()
            .filter(|(w, h)| *w > 0 && *h > 0)
            .unwrap_or(FALLBACK_FRAME_SIZE);
        let frame = session.stream.grab_frame();
        session.stream.stop();

        let surface = draw_to_surface(frame?, width, height);
        let bytes = encode_jpeg(&surface)?;

        info!(
            "Captured {}x{} frame for {} ({} bytes)",
            width,
            height,
            session.slot,
            bytes.len()
        );

        Ok(CapturedImage {
            slot: session.slot,
            image: FileUpload::new(CAPTURE_FILE_NAME, CAPTURE_MIME, bytes),
        })
    }

    /// Close the dialog without capturing
    pub fn cancel(&mut self) {
        if self.session.is_some() {
            debug!("Camera preview cancelled");
        }
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stream.stop();
        }
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.release();
    }
}

/// Scale the frame onto a `width` x `height` surface
fn draw_to_surface(frame: RgbImage, width: u32, height: u32) -> RgbImage {
    if frame.dimensions() == (width, height) {
        frame
    } else {
        image::imageops::resize(&frame, width, height, image::imageops::FilterType::Triangle)
    }
}

fn encode_jpeg(surface: &RgbImage) -> Result<Vec<u8>, CaptureError> {
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode_image(surface)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;
    Ok(bytes)
}
