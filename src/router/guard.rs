//! Navigation Guards
//!
//! Hooks run before every navigation. Guards observe the transition; they
//! never block or redirect it.

use std::sync::{Arc, Mutex};

use super::RouteMatch;

/// Runs before the target view is built
pub trait NavigationGuard {
    fn before_each(&self, to: &RouteMatch, from: Option<&RouteMatch>);
}

impl<F> NavigationGuard for F
where
    F: Fn(&RouteMatch, Option<&RouteMatch>),
{
    fn before_each(&self, to: &RouteMatch, from: Option<&RouteMatch>) {
        self(to, from)
    }
}

/// Wherever the page title lives (`document.title` in the browser)
pub trait TitleSink {
    fn set_title(&self, title: &str);
}

/// Applies the target route's title, if it declares one
pub struct TitleGuard<S> {
    sink: S,
}

impl<S: TitleSink> TitleGuard<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }
}

impl<S: TitleSink> NavigationGuard for TitleGuard<S> {
    fn before_each(&self, to: &RouteMatch, _from: Option<&RouteMatch>) {
        if let Some(title) = &to.title {
            self.sink.set_title(title);
        }
    }
}

/// In-memory title, for the CLI and tests. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryTitle {
    title: Arc<Mutex<Option<String>>>,
}

impl MemoryTitle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.title.lock().ok().and_then(|t| t.clone())
    }
}

impl TitleSink for MemoryTitle {
    fn set_title(&self, title: &str) {
        if let Ok(mut slot) = self.title.lock() {
            *slot = Some(title.to_string());
        }
    }
}
