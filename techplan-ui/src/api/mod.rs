//! API Module
//!
//! HTTP client for the proposal service.

pub mod client;

pub use client::{api_base, ApiClient};
