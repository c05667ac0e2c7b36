//! Pages
//!
//! Top-level page components for each route.

pub mod history;
pub mod home;
pub mod project;

pub use history::History;
pub use home::Home;
pub use project::ProjectDetails;
