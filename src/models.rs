//! Backend Payloads
//!
//! Typed views of what the proposal service sends and accepts.
//!
//! The client itself passes JSON through untouched; these types are for
//! display and for building requests. They are deliberately lenient: unknown
//! fields are ignored and everything the UI can live without has a default,
//! because the backend schema is owned by the server.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque project identifier.
///
/// The backend issues string ids, but numeric ids are accepted on the wire
/// and normalised to their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for ProjectId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for ProjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Int(i64),
            Uint(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Str(s) => ProjectId(s),
            Raw::Int(n) => ProjectId(n.to_string()),
            Raw::Uint(n) => ProjectId(n.to_string()),
        })
    }
}

/// Which model the backend should use to write the proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    #[default]
    Default,
    Lite,
    Pro,
    Reader,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Default => "default",
            ModelType::Lite => "lite",
            ModelType::Pro => "pro",
            ModelType::Reader => "reader",
        }
    }
}

impl std::str::FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(ModelType::Default),
            "lite" => Ok(ModelType::Lite),
            "pro" => Ok(ModelType::Pro),
            "reader" => Ok(ModelType::Reader),
            other => Err(format!(
                "unknown model type '{}', expected default, lite, pro or reader",
                other
            )),
        }
    }
}

/// Payload for `POST /projects`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub title: String,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub model_type: ModelType,
    #[serde(default = "default_max_papers")]
    pub max_papers: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

/// The backend accepts between 1 and 10 papers per project
pub const MAX_PAPERS_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

fn default_max_papers() -> u8 {
    5
}

impl ProjectRequest {
    pub fn new(title: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            topic: topic.into(),
            description: None,
            model_type: ModelType::default(),
            max_papers: default_max_papers(),
            custom_keywords: None,
            params: HashMap::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }

    /// Clamped to the range the backend accepts
    pub fn max_papers(mut self, max_papers: u8) -> Self {
        self.max_papers = max_papers.clamp(*MAX_PAPERS_RANGE.start(), *MAX_PAPERS_RANGE.end());
        self
    }

    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.custom_keywords = if keywords.is_empty() {
            None
        } else {
            Some(keywords)
        };
        self
    }
}

/// Lifecycle of a project on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProjectStatus {
    /// Whether the backend is done with the project, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Failed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::Processing => "processing",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Failed => "failed",
        }
    }
}

/// A project as returned by `GET /projects/{id}` and `GET /projects`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub result: Option<ProjectResult>,
}

/// The generated proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectResult {
    #[serde(default)]
    pub technical_proposal: String,
    #[serde(default)]
    pub architecture_diagram: Option<String>,
    #[serde(default)]
    pub implementation_steps: Vec<HashMap<String, String>>,
    #[serde(default)]
    pub resources_needed: Vec<HashMap<String, String>>,
    #[serde(default)]
    pub references: Vec<PaperInfo>,
    #[serde(default)]
    pub translated_topic: Option<String>,
}

/// A paper the proposal cites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperInfo {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub published: String,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub local_path: Option<String>,
    #[serde(default)]
    pub content_extracted: bool,
}

/// Response to `POST /projects`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    pub project_id: ProjectId,
    #[serde(default)]
    pub task_id: Option<String>,
}

/// Response to `POST /upload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Response to `POST /analyze-url`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeUrlResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

/// Response to `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// FastAPI error body: `{"detail": ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub detail: serde_json::Value,
}

impl ErrorDetail {
    /// Extract a human readable message from an error response body.
    ///
    /// Falls back to the raw body when it is not a FastAPI error.
    pub fn message_from_body(body: &str) -> String {
        match serde_json::from_str::<ErrorDetail>(body) {
            Ok(ErrorDetail {
                detail: serde_json::Value::String(s),
            }) => s,
            Ok(ErrorDetail { detail }) => detail.to_string(),
            Err(_) => body.trim().to_string(),
        }
    }
}
