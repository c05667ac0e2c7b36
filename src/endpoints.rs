//! API Endpoints
//!
//! Wire shapes of the proposal service, shared by the native client and the
//! browser client so that both speak exactly the same protocol.
//!
//! # Endpoints
//!
//! - `POST /projects` - Create a project (JSON body)
//! - `GET /projects/{id}` - Get a project
//! - `GET /projects?limit={n}` - List recent projects
//! - `POST /upload` - Upload a file (multipart: `file`, optional `project_id`)
//! - `POST /analyze-url` - Analyze a web page (multipart: `url`)
//! - `GET /health` - Health check
//!
//! Paths are relative to the API base, which defaults to [`DEFAULT_API_BASE`].

use thiserror::Error;

use crate::models::ProjectId;

/// API base used when nothing overrides it (proxied by the dev server)
pub const DEFAULT_API_BASE: &str = "/api";

/// Environment variable overriding the API base
pub const API_URL_ENV: &str = "TECHPLAN_API_URL";

/// Request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Page size for `GET /projects` when the caller gives none
pub const DEFAULT_LIST_LIMIT: u32 = 10;

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "file";
/// Multipart field associating an upload with a project
pub const PROJECT_ID_FIELD: &str = "project_id";
/// Multipart field carrying the URL to analyze
pub const URL_FIELD: &str = "url";

/// HTTP verb of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// How the request body is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Empty,
    Json,
    Multipart,
}

/// Errors raised while building a request, before anything hits the network
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Project id must not be empty")]
    EmptyProjectId,

    #[error("List limit must be a positive integer, got {0}")]
    InvalidLimit(u32),

    #[error("URL to analyze must not be empty")]
    EmptyUrl,
}

/// One resolved API call: verb, path, query and body encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: BodyKind,
}

impl Endpoint {
    fn new(method: Method, path: impl Into<String>, body: BodyKind) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body,
        }
    }

    /// `POST /projects`
    pub fn create_project() -> Self {
        Self::new(Method::Post, "/projects", BodyKind::Json)
    }

    /// `GET /projects/{id}`
    pub fn get_project(id: &ProjectId) -> Result<Self, EndpointError> {
        if id.is_empty() {
            return Err(EndpointError::EmptyProjectId);
        }
        Ok(Self::new(
            Method::Get,
            format!("/projects/{}", urlencoding::encode(id.as_str())),
            BodyKind::Empty,
        ))
    }

    /// `GET /projects?limit={n}`, `n` defaulting to [`DEFAULT_LIST_LIMIT`]
    pub fn list_projects(limit: Option<u32>) -> Result<Self, EndpointError> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        if limit == 0 {
            return Err(EndpointError::InvalidLimit(limit));
        }
        let mut endpoint = Self::new(Method::Get, "/projects", BodyKind::Empty);
        endpoint.query.push(("limit", limit.to_string()));
        Ok(endpoint)
    }

    /// `POST /upload`
    pub fn upload() -> Self {
        Self::new(Method::Post, "/upload", BodyKind::Multipart)
    }

    /// `POST /analyze-url`
    pub fn analyze_url() -> Self {
        Self::new(Method::Post, "/analyze-url", BodyKind::Multipart)
    }

    /// `GET /health`
    pub fn health() -> Self {
        Self::new(Method::Get, "/health", BodyKind::Empty)
    }

    /// Path plus encoded query string
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }

    /// Full URL against an API base (absolute or relative)
    pub fn url(&self, base: &str) -> String {
        format!("{}{}", normalize_base(base), self.path_and_query())
    }
}

/// Remove trailing slashes so paths can be appended verbatim
pub fn normalize_base(base: &str) -> &str {
    base.trim_end_matches('/')
}

/// A multipart form field
#[derive(Debug, Clone, PartialEq)]
pub enum FormField<F> {
    File { name: &'static str, file: F },
    Text { name: &'static str, value: String },
}

impl<F> FormField<F> {
    pub fn name(&self) -> &'static str {
        match self {
            FormField::File { name, .. } | FormField::Text { name, .. } => name,
        }
    }
}

/// Transport-independent description of a multipart body.
///
/// `F` is whatever handle the transport uploads: file bytes natively, a
/// browser `File` in WASM.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartForm<F> {
    fields: Vec<FormField<F>>,
}

impl<F> MultipartForm<F> {
    /// Body of `POST /upload`.
    ///
    /// Always carries `file`; carries `project_id` only for a non-empty id.
    pub fn upload(file: F, project_id: Option<&ProjectId>) -> Self {
        let mut fields = vec![FormField::File {
            name: FILE_FIELD,
            file,
        }];
        if let Some(id) = project_id.filter(|id| !id.is_empty()) {
            fields.push(FormField::Text {
                name: PROJECT_ID_FIELD,
                value: id.to_string(),
            });
        }
        Self { fields }
    }

    /// Body of `POST /analyze-url`
    pub fn analyze_url(url: &str) -> Result<Self, EndpointError> {
        if url.trim().is_empty() {
            return Err(EndpointError::EmptyUrl);
        }
        Ok(Self {
            fields: vec![FormField::Text {
                name: URL_FIELD,
                value: url.to_string(),
            }],
        })
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(FormField::name).collect()
    }

    /// Value of a text field, if present
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|field| match field {
            FormField::Text { name: n, value } if *n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn into_fields(self) -> Vec<FormField<F>> {
        self.fields
    }
}
