//! HTTP API Client
//!
//! Browser client for the proposal service, built on gloo-net. Paths, query
//! parameters and multipart layouts come from `techplan::endpoints`, so the
//! wire format is the same as the native client's.

use gloo_net::http::{Request, RequestBuilder};
use gloo_timers::callback::Timeout;
use serde::Serialize;
use serde_json::Value;

use techplan::endpoints::{
    normalize_base, Endpoint, FormField, Method, MultipartForm, DEFAULT_API_BASE,
    DEFAULT_TIMEOUT_MS,
};
use techplan::models::{ErrorDetail, ProjectId};

/// API base baked in at build time (`TECHPLAN_API_URL=... trunk build`)
pub fn api_base() -> String {
    base_from(option_env!("TECHPLAN_API_URL"))
}

fn base_from(configured: Option<&str>) -> String {
    let base = configured
        .filter(|url| !url.trim().is_empty())
        .unwrap_or(DEFAULT_API_BASE);
    normalize_base(base).to_string()
}

enum RequestBody {
    Empty,
    Json(Value),
    Form(web_sys::FormData),
}

/// Client for the proposal service
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout_ms: u64,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(api_base())
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base(&base_url.into()).to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn projects(&self) -> Projects<'_> {
        Projects { client: self }
    }

    pub fn upload(&self) -> Upload<'_> {
        Upload { client: self }
    }

    pub fn url(&self) -> UrlAnalysis<'_> {
        UrlAnalysis { client: self }
    }

    pub async fn health(&self) -> Result<Value, String> {
        self.call("health", Ok((Endpoint::health(), RequestBody::Empty)))
            .await
    }

    /// Every failure is written to the console exactly once, here
    async fn call(
        &self,
        operation: &str,
        prepared: Result<(Endpoint, RequestBody), String>,
    ) -> Result<Value, String> {
        let result = match prepared {
            Ok((endpoint, body)) => self.execute(endpoint, body).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            web_sys::console::error_1(&format!("API {} failed: {}", operation, e).into());
        }
        result
    }

    async fn execute(&self, endpoint: Endpoint, body: RequestBody) -> Result<Value, String> {
        let url = endpoint.url(&self.base_url);

        let controller = web_sys::AbortController::new()
            .map_err(|_| "Failed to create abort controller".to_string())?;
        let signal = controller.signal();
        let timeout_ms = self.timeout_ms;
        // Dropping the timer cancels it
        let _timer = Timeout::new(timeout_ms as u32, move || controller.abort());

        let builder: RequestBuilder = match endpoint.method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url),
        }
        .header("Accept", "application/json")
        .abort_signal(Some(&signal));

        let request = match body {
            RequestBody::Empty => builder.build(),
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Form(form) => builder.body(form),
        }
        .map_err(|e| format!("Request build error: {}", e))?;

        let response = request.send().await.map_err(|e| {
            if signal.aborted() {
                format!("Request timed out after {} ms", timeout_ms)
            } else {
                format!("Network error: {}", e)
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {}", e))?;

        if !response.ok() {
            return Err(format!(
                "API error {}: {}",
                status,
                ErrorDetail::message_from_body(&text)
            ));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        // Bodies that are not JSON come back as text
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

/// `/projects` operations
pub struct Projects<'a> {
    client: &'a ApiClient,
}

impl Projects<'_> {
    /// `POST /projects`, payload passed through unchanged
    pub async fn create<T>(&self, data: &T) -> Result<Value, String>
    where
        T: Serialize + ?Sized,
    {
        let prepared = serde_json::to_value(data)
            .map(|value| (Endpoint::create_project(), RequestBody::Json(value)))
            .map_err(|e| format!("Failed to encode project: {}", e));
        self.client.call("projects.create", prepared).await
    }

    /// `GET /projects/{id}`
    pub async fn get(&self, id: impl Into<ProjectId>) -> Result<Value, String> {
        let prepared = Endpoint::get_project(&id.into())
            .map(|endpoint| (endpoint, RequestBody::Empty))
            .map_err(|e| e.to_string());
        self.client.call("projects.get", prepared).await
    }

    /// `GET /projects?limit=N`, 10 when no limit is given
    pub async fn list(&self, limit: Option<u32>) -> Result<Value, String> {
        let prepared = Endpoint::list_projects(limit)
            .map(|endpoint| (endpoint, RequestBody::Empty))
            .map_err(|e| e.to_string());
        self.client.call("projects.list", prepared).await
    }
}

/// `POST /upload`
pub struct Upload<'a> {
    client: &'a ApiClient,
}

impl Upload<'_> {
    /// Send `file`, plus `project_id` when one is given
    pub async fn file(
        &self,
        file: web_sys::File,
        project_id: Option<&ProjectId>,
    ) -> Result<Value, String> {
        let prepared = to_form_data(MultipartForm::upload(file, project_id))
            .map(|form| (Endpoint::upload(), RequestBody::Form(form)));
        self.client.call("upload.file", prepared).await
    }
}

/// `POST /analyze-url`
pub struct UrlAnalysis<'a> {
    client: &'a ApiClient,
}

impl UrlAnalysis<'_> {
    /// The URL goes out as a form field, not JSON
    pub async fn analyze(&self, url: &str) -> Result<Value, String> {
        let prepared = MultipartForm::analyze_url(url)
            .map_err(|e| e.to_string())
            .and_then(to_form_data)
            .map(|form| (Endpoint::analyze_url(), RequestBody::Form(form)));
        self.client.call("url.analyze", prepared).await
    }
}

fn to_form_data(form: MultipartForm<web_sys::File>) -> Result<web_sys::FormData, String> {
    let data = web_sys::FormData::new().map_err(|_| "Failed to create form data".to_string())?;

    for field in form.into_fields() {
        let appended = match field {
            FormField::File { name, file } => {
                data.append_with_blob_and_filename(name, &file, &file.name())
            }
            FormField::Text { name, value } => data.append_with_str(name, &value),
        };
        appended.map_err(|_| "Failed to build form data".to_string())?;
    }

    Ok(data)
}
