//! Proposal Service Client
//!
//! Native HTTP client for the proposal service, built on reqwest.
//!
//! ## Operations
//!
//! - `projects().create(data)` - `POST /projects`
//! - `projects().get(id)` - `GET /projects/{id}`
//! - `projects().list(limit)` - `GET /projects?limit=N`
//! - `upload().file(file, project_id)` - `POST /upload`
//! - `url().analyze(url)` - `POST /analyze-url`
//! - `health()` - `GET /health`
//!
//! Every failure is logged once and returned unchanged. There are no retries:
//! resubmitting is up to the caller.

mod http;
mod error;
mod upload;

pub use http::{ApiClient, Projects, Upload, UrlAnalysis};
pub use error::{ClientError, ClientResult};
pub use upload::{guess_content_type, FileUpload};
