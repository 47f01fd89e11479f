//! # Gradedesk UI
//!
//! Client-side state and actions for the gradedesk assignment workbench
//! and grader:
//! - Tab controller with the grading-in-flight lock
//! - Workbench mode state machine and draft handling
//! - Grader selectors and result rendering
//! - Camera capture into upload slots
//! - Profile, class manager and vault panels
//!
//! [`App`] ties these to the API client; [`view::render`] projects the
//! state for display.

pub mod app;
pub mod capture;
pub mod error;
pub mod grader;
pub mod panels;
pub mod session;
pub mod slots;
pub mod status;
pub mod tabs;
pub mod view;
pub mod workbench;

pub use app::App;
pub use error::{ActionError, ActionResult};
pub use tabs::{TabController, TabTransition, View};
pub use view::{render, Navigation, Screen, ViewModel};
