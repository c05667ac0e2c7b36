//! UI Components
//!
//! Reusable Leptos components shared by the pages.

pub mod nav;
pub mod notices;
pub mod spinner;
pub mod status;
pub mod upload;

pub use nav::Nav;
pub use notices::NoticeStack;
pub use spinner::{HistorySkeleton, Spinner, SpinnerSize};
pub use status::StatusBadge;
pub use upload::UploadForm;
