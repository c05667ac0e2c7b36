//! # Techplan
//!
//! Client side of the Technical Proposal AI service: a typed HTTP client for
//! the proposal backend, a client-side router, an application bootstrap and a
//! development server that serves the frontend and proxies `/api`.
//!
//! ## Modules
//!
//! - [`models`]: Request and response types of the proposal API
//! - [`endpoints`]: Paths, query parameters and multipart layouts per operation
//! - [`router`]: Route table, navigation guards and view registry
//! - [`app`]: Application bootstrap (client, router, error handler, mount)
//! - `client`: reqwest-based API client (native only)
//! - `config`: TOML configuration with environment overrides (native only)
//! - `devserver`: Static files and `/api` proxy, built with Axum (native only)
//! - `dist`: Production bundle checks (native only)
//! - `logging`: tracing-subscriber setup (native only)
//!
//! The `native` feature is on by default. The browser UI depends on this
//! crate with `default-features = false` and gets the shared modules only.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "native")]
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use techplan::client::ApiClient;
//! use techplan::config::Config;
//! use techplan::models::ProjectRequest;
//!
//! let config = Config::from_env()?;
//! let client = ApiClient::new(&config.api)?;
//!
//! let request = ProjectRequest::new("Bridge Plan", "Structural health monitoring")
//!     .max_papers(3);
//! let created = client.projects().create(&request).await?;
//! println!("Created: {}", created);
//!
//! let recent = client.projects().list(None).await?;
//! println!("Recent: {}", recent);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod endpoints;
pub mod models;
pub mod router;

#[cfg(feature = "native")]
pub mod client;
#[cfg(feature = "native")]
pub mod config;
#[cfg(feature = "native")]
pub mod devserver;
#[cfg(feature = "native")]
pub mod dist;
#[cfg(feature = "native")]
pub mod logging;

// Re-export top-level types for convenience
pub use app::{create_app, AppContext, AppError, ErrorHandler, LogErrorHandler, MOUNT_ANCHOR};

pub use endpoints::{Endpoint, EndpointError, MultipartForm, DEFAULT_API_BASE, DEFAULT_LIST_LIMIT};

pub use models::{
    HealthStatus, ModelType, Project, ProjectId, ProjectRequest, ProjectStatus, UploadResponse,
};

pub use router::{RouteMatch, RouteName, RouteTable, Router, RouterError, TitleGuard, ViewRegistry};

#[cfg(feature = "native")]
pub use client::{ApiClient, ClientError, ClientResult, FileUpload};

#[cfg(feature = "native")]
pub use config::{Config, ConfigError};

#[cfg(feature = "native")]
pub use devserver::{build_router, serve, DevServerError, DevServerState};
