//! # Gradedesk Common Library
//!
//! Shared code for the gradedesk client including:
//! - Configuration loading (TOML bootstrap + environment + defaults)
//! - Error types
//! - Credential storage and the session guard
//! - API request/response types
//! - HTTP transport and the typed API client

pub mod api;
pub mod config;
pub mod credential;
pub mod error;

pub use credential::{CredentialStore, LoginRedirect, Session, SessionGuard};
pub use error::{Error, Result};
