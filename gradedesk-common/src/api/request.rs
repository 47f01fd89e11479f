//! Outbound request description
//!
//! Requests are plain data until a [`Transport`](super::Transport) sends
//! them, which keeps multipart assembly inspectable in tests.

use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// HTTP method subset used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// A file (or captured image) to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::Config(format!("not a file: {}", path.display())))?;
        let mime = mime_for_extension(path.extension().and_then(|e| e.to_str()));
        Ok(Self::new(file_name, mime, bytes))
    }
}

fn mime_for_extension(extension: Option<&str>) -> &'static str {
    match extension.map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// One named part of a multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File(FileUpload),
}

/// Ordered multipart form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    parts: Vec<(String, PartValue)>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parts
            .push((name.to_string(), PartValue::Text(value.into())));
        self
    }

    pub fn file(mut self, name: &str, file: FileUpload) -> Self {
        self.parts.push((name.to_string(), PartValue::File(file)));
        self
    }

    /// Append a file part only when one is given
    pub fn optional_file(self, name: &str, file: Option<FileUpload>) -> Self {
        match file {
            Some(file) => self.file(name, file),
            None => self,
        }
    }

    /// Append a text part only when one is given
    pub fn optional_text(self, name: &str, value: Option<String>) -> Self {
        match value {
            Some(value) => self.text(name, value),
            None => self,
        }
    }

    pub fn parts(&self) -> &[(String, PartValue)] {
        &self.parts
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(n, v)| match v {
            PartValue::Text(t) if n == name => Some(t.as_str()),
            _ => None,
        })
    }

    pub fn get_file(&self, name: &str) -> Option<&FileUpload> {
        self.parts.iter().find_map(|(n, v)| match v {
            PartValue::File(f) if n == name => Some(f),
            _ => None,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|(n, _)| n == name)
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// Serialized with `Content-Type: application/json`
    Json(Value),
    /// URL-encoded form (`application/x-www-form-urlencoded`)
    Form(Vec<(String, String)>),
    /// Passed through untouched; the HTTP library sets the boundary
    Multipart(MultipartBody),
}

/// A request relative to the configured API base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    /// POST with a plain object serialized as JSON
    pub fn post_json<T: Serialize>(path: impl Into<String>, body: &T) -> Result<Self> {
        Ok(Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: RequestBody::Json(serde_json::to_value(body)?),
        })
    }

    pub fn post_form(path: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: RequestBody::Form(fields),
        }
    }

    pub fn post_multipart(path: impl Into<String>, body: MultipartBody) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: RequestBody::Multipart(body),
        }
    }

    /// Multipart body, if this request carries one
    pub fn multipart(&self) -> Option<&MultipartBody> {
        match &self.body {
            RequestBody::Multipart(body) => Some(body),
            _ => None,
        }
    }

    /// JSON body, if this request carries one
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }
}
