//! API module for talking to the grading server
//!
//! # Architecture
//!
//! - [`request`]: plain-data description of a request (method, path, body)
//! - [`transport`]: the [`Transport`] seam and its reqwest implementation
//! - [`client`]: typed endpoint methods on top of a transport
//! - [`types`]: request/response DTOs
//!
//! Every error body is expected to carry `detail` (or `message`); that text
//! is surfaced verbatim to the user.

pub mod client;
pub mod request;
pub mod transport;
pub mod types;

pub use client::{ApiClient, GradeSubmission};
pub use request::{ApiRequest, FileUpload, HttpMethod, MultipartBody, PartValue, RequestBody};
pub use transport::{error_message, HttpTransport, Transport};
