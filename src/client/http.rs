//! Proposal Service REST Client
//!
//! HTTP client for the proposal service API.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::error::{ClientError, ClientResult};
use super::upload::FileUpload;
use crate::config::ApiConfig;
use crate::endpoints::{Endpoint, FormField, Method, MultipartForm};
use crate::models::{ErrorDetail, ProjectId};

/// Proposal service API client.
///
/// Stateless apart from its configuration; clones share the connection pool.
/// Responses are returned as the backend sent them.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout_ms: u64,
}

enum RequestBody {
    Empty,
    Json(Value),
    Form(Form),
}

impl ApiClient {
    /// Create a client from configuration
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        Self::with_base_url(config.resolved_base_url(), config.request_timeout_ms)
    }

    /// Create a client for an absolute base URL
    pub fn with_base_url(base_url: impl Into<String>, timeout_ms: u64) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Project operations
    pub fn projects(&self) -> Projects<'_> {
        Projects { api: self }
    }

    /// File upload operations
    pub fn upload(&self) -> Upload<'_> {
        Upload { api: self }
    }

    /// URL analysis operations
    pub fn url(&self) -> UrlAnalysis<'_> {
        UrlAnalysis { api: self }
    }

    /// `GET /health`
    pub async fn health(&self) -> ClientResult<Value> {
        self.call("health", Ok((Endpoint::health(), RequestBody::Empty)))
            .await
    }

    /// Run a request and log its failure, exactly once, before returning it
    async fn call(
        &self,
        operation: &'static str,
        request: ClientResult<(Endpoint, RequestBody)>,
    ) -> ClientResult<Value> {
        let result = match request {
            Ok((endpoint, body)) => self.execute(&endpoint, body).await,
            Err(e) => Err(e),
        };

        if let Err(error) = &result {
            tracing::error!(operation, error = %error, "API request failed");
        }

        result
    }

    async fn execute(&self, endpoint: &Endpoint, body: RequestBody) -> ClientResult<Value> {
        let url = endpoint.url(&self.base_url);
        let method = match endpoint.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        tracing::debug!(method = endpoint.method.as_str(), url = %url, "Sending API request");

        let request = self.client.request(method, &url);
        let request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Form(form) => request.multipart(form),
        };

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.text().await {
                Ok(text) => ErrorDetail::message_from_body(&text),
                Err(e) => format!("error body unreadable: {}", e),
            };
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout_ms))?;

        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        // Bodies that are not JSON come back as text
        Ok(serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())))
    }
}

/// `POST /projects`, `GET /projects/{id}`, `GET /projects?limit=N`
pub struct Projects<'a> {
    api: &'a ApiClient,
}

impl Projects<'_> {
    /// Create a project from any serializable mapping of fields
    pub async fn create<T>(&self, data: &T) -> ClientResult<Value>
    where
        T: Serialize + ?Sized,
    {
        let request = serde_json::to_value(data)
            .map_err(|e| ClientError::Decode(e.to_string()))
            .map(|body| (Endpoint::create_project(), RequestBody::Json(body)));

        self.api.call("projects.create", request).await
    }

    pub async fn get(&self, id: impl Into<ProjectId>) -> ClientResult<Value> {
        let request = Endpoint::get_project(&id.into())
            .map(|endpoint| (endpoint, RequestBody::Empty))
            .map_err(ClientError::from);

        self.api.call("projects.get", request).await
    }

    /// Most recent projects; `None` asks for the default page of 10
    pub async fn list(&self, limit: Option<u32>) -> ClientResult<Value> {
        let request = Endpoint::list_projects(limit)
            .map(|endpoint| (endpoint, RequestBody::Empty))
            .map_err(ClientError::from);

        self.api.call("projects.list", request).await
    }
}

/// `POST /upload`
pub struct Upload<'a> {
    api: &'a ApiClient,
}

impl Upload<'_> {
    /// Upload a file, optionally attaching it to a project
    pub async fn file(
        &self,
        file: FileUpload,
        project_id: Option<&ProjectId>,
    ) -> ClientResult<Value> {
        let request = to_form(MultipartForm::upload(file, project_id))
            .map(|form| (Endpoint::upload(), RequestBody::Form(form)));

        self.api.call("upload.file", request).await
    }
}

/// `POST /analyze-url`
pub struct UrlAnalysis<'a> {
    api: &'a ApiClient,
}

impl UrlAnalysis<'_> {
    /// Ask the backend to analyze a web page. Whether the URL is well formed
    /// is the backend's call.
    pub async fn analyze(&self, url: &str) -> ClientResult<Value> {
        let request = MultipartForm::analyze_url(url)
            .map_err(ClientError::from)
            .and_then(to_form)
            .map(|form| (Endpoint::analyze_url(), RequestBody::Form(form)));

        self.api.call("url.analyze", request).await
    }
}

fn to_form(form: MultipartForm<FileUpload>) -> ClientResult<Form> {
    let mut multipart = Form::new();
    for field in form.into_fields() {
        multipart = match field {
            FormField::File { name, file } => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)?;
                multipart.part(name, part)
            }
            FormField::Text { name, value } => multipart.text(name, value),
        };
    }
    Ok(multipart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Multipart, Path, Query, State},
        http::{header, HeaderMap as AxumHeaders, StatusCode},
        response::IntoResponse,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::{Context, SubscriberExt};

    /// What the mock backend saw for `POST /api/projects`
    #[derive(Debug, Clone, Default)]
    struct SeenCreate {
        path: String,
        content_type: Option<String>,
        accept: Option<String>,
        body: String,
    }

    type Seen = Arc<Mutex<Option<SeenCreate>>>;

    fn header_str(headers: &AxumHeaders, name: header::HeaderName) -> Option<String> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    async fn create_project(
        State(seen): State<Seen>,
        headers: AxumHeaders,
        body: String,
    ) -> impl IntoResponse {
        *seen.lock().unwrap() = Some(SeenCreate {
            path: "/api/projects".to_string(),
            content_type: header_str(&headers, header::CONTENT_TYPE),
            accept: header_str(&headers, header::ACCEPT),
            body,
        });
        (StatusCode::CREATED, Json(json!({"id": 7, "name": "Bridge Plan"})))
    }

    async fn list_projects(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
        Json(json!({ "limit": query.get("limit") }))
    }

    async fn get_project(Path(id): Path<String>) -> impl IntoResponse {
        if id == "missing" {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"detail": "Project not found: missing"})),
            )
        } else {
            (StatusCode::OK, Json(json!({"id": id, "status": "completed"})))
        }
    }

    /// Echo the multipart fields back: name -> text value or file name
    async fn echo_multipart(headers: AxumHeaders, mut multipart: Multipart) -> Json<Value> {
        let mut fields = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await.unwrap();
            let value = match file_name {
                Some(file_name) => format!("file:{}:{}", file_name, data.len()),
                None => String::from_utf8_lossy(&data).into_owned(),
            };
            fields.push(json!([name, value]));
        }
        Json(json!({
            "content_type": header_str(&headers, header::CONTENT_TYPE),
            "fields": fields,
        }))
    }

    async fn health() -> Json<Value> {
        Json(json!({"status": "ok", "message": "running"}))
    }

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    async fn mock_backend() -> (ApiClient, Seen) {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route("/api/projects", post(create_project).get(list_projects))
            .route("/api/projects/:id", get(get_project))
            .route("/api/upload", post(echo_multipart))
            .route("/api/analyze-url", post(echo_multipart))
            .route("/api/health", get(health))
            .with_state(Arc::clone(&seen));

        let base = spawn_backend(router).await;
        (ApiClient::with_base_url(base, 5_000).unwrap(), seen)
    }

    /// Counts ERROR events emitted by this crate
    struct ErrorCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ErrorCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let meta = event.metadata();
            if *meta.level() == tracing::Level::ERROR && meta.target().starts_with("techplan") {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_errors() -> (Arc<AtomicUsize>, tracing::subscriber::DefaultGuard) {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ErrorCounter(Arc::clone(&count)));
        (count, tracing::subscriber::set_default(subscriber))
    }

    #[tokio::test]
    async fn test_create_passes_json_through() {
        let (client, seen) = mock_backend().await;

        let created = client
            .projects()
            .create(&json!({"name": "Bridge Plan"}))
            .await
            .unwrap();

        assert_eq!(created, json!({"id": 7, "name": "Bridge Plan"}));

        let seen = seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.path, "/api/projects");
        assert_eq!(seen.content_type.as_deref(), Some("application/json"));
        assert_eq!(seen.accept.as_deref(), Some("application/json"));
        assert_eq!(seen.body, r#"{"name":"Bridge Plan"}"#);
    }

    #[tokio::test]
    async fn test_list_limit() {
        let (client, _) = mock_backend().await;

        let page = client.projects().list(None).await.unwrap();
        assert_eq!(page["limit"], "10");

        let page = client.projects().list(Some(5)).await.unwrap();
        assert_eq!(page["limit"], "5");
    }

    #[tokio::test]
    async fn test_get_project() {
        let (client, _) = mock_backend().await;

        let project = client.projects().get("p-1").await.unwrap();
        assert_eq!(project["id"], "p-1");

        let project = client.projects().get(42u64).await.unwrap();
        assert_eq!(project["id"], "42");
    }

    #[tokio::test]
    async fn test_get_missing_project_is_404() {
        let (client, _) = mock_backend().await;
        let (errors, _guard) = count_errors();

        let err = client.projects().get("missing").await.unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("Project not found: missing"));
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_upload_without_project_id() {
        let (client, _) = mock_backend().await;

        let file = FileUpload::new("brief.pdf", b"%PDF-1.4".to_vec());
        let echo = client.upload().file(file, None).await.unwrap();

        assert_eq!(echo["fields"], json!([["file", "file:brief.pdf:8"]]));
        assert!(echo["content_type"]
            .as_str()
            .unwrap()
            .starts_with("multipart/form-data"));
    }

    #[tokio::test]
    async fn test_upload_with_project_id() {
        let (client, _) = mock_backend().await;

        let file = FileUpload::new("brief.pdf", b"%PDF-1.4".to_vec());
        let id = ProjectId::from("42");
        let echo = client.upload().file(file, Some(&id)).await.unwrap();

        assert_eq!(
            echo["fields"],
            json!([["file", "file:brief.pdf:8"], ["project_id", "42"]])
        );
    }

    #[tokio::test]
    async fn test_analyze_url_is_multipart() {
        let (client, _) = mock_backend().await;

        let echo = client.url().analyze("http://example.com").await.unwrap();

        assert_eq!(echo["fields"], json!([["url", "http://example.com"]]));
        assert!(echo["content_type"]
            .as_str()
            .unwrap()
            .starts_with("multipart/form-data"));
    }

    #[tokio::test]
    async fn test_health() {
        let (client, _) = mock_backend().await;
        let health = client.health().await.unwrap();
        assert_eq!(health["status"], "ok");
    }

    #[tokio::test]
    async fn test_server_error_rejects_and_logs_once() {
        let router = Router::new().route(
            "/api/projects",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"detail": "generation failed"})),
                )
            }),
        );
        let client = ApiClient::with_base_url(spawn_backend(router).await, 5_000).unwrap();
        let (errors, _guard) = count_errors();

        let err = client
            .projects()
            .create(&json!({"title": "x"}))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_rejects_and_logs_once() {
        let router = Router::new().route(
            "/api/health",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        );
        let client = ApiClient::with_base_url(spawn_backend(router).await, 100).unwrap();
        let (errors, _guard) = count_errors();

        let err = client.health().await.unwrap_err();

        assert!(matches!(err, ClientError::Timeout(100)));
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::with_base_url(format!("http://{}/api", addr), 1_000).unwrap();
        let (errors, _guard) = count_errors();

        let err = client.health().await.unwrap_err();

        assert!(matches!(err, ClientError::Unavailable(_)));
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_is_logged_and_not_sent() {
        let (client, _) = mock_backend().await;
        let (errors, _guard) = count_errors();

        let err = client.projects().list(Some(0)).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));

        let err = client.url().analyze("").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));

        assert_eq!(errors.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_plain_text_body_is_returned_as_string() {
        let router = Router::new().route("/api/health", get(|| async { "ok" }));
        let client = ApiClient::with_base_url(spawn_backend(router).await, 5_000).unwrap();

        let health = client.health().await.unwrap();
        assert_eq!(health, Value::String("ok".to_string()));
    }

    #[tokio::test]
    async fn test_truncated_error_body_keeps_read_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            // Promise 100 bytes, send 7, hang up
            socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\npartial")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let client = ApiClient::with_base_url(format!("http://{}/api", addr), 5_000).unwrap();
        let (errors, _guard) = count_errors();

        let err = client.health().await.unwrap_err();

        match err {
            ClientError::Status { status, message } => {
                assert_eq!(status, 500);
                assert!(message.starts_with("error body unreadable"), "{}", message);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_base_url_from_config() {
        let client = ApiClient::new(&ApiConfig::default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
    }
}
