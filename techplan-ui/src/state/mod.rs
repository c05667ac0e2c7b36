//! State Management
//!
//! Global UI state shared by the pages.

pub mod global;

pub use global::{provide_global_state, GlobalState, Notice, NoticeKind};
