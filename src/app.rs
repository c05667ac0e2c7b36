//! Application Bootstrap
//!
//! Wires the pieces together once per page load (or once per CLI run):
//!
//! 1. create the runtime around an API client
//! 2. install the router
//! 3. install the global error handler
//! 4. mount on the `#app` anchor
//!
//! Each step returns a new builder type, so the steps cannot be skipped or
//! reordered. The result is an [`AppContext`] handed to whoever needs the
//! client, the router or the error handler.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt::Display;
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;

use crate::router::Router;

/// DOM anchor the application mounts on
pub const MOUNT_ANCHOR: &str = "#app";

/// Receives errors nobody else handled. Logs them; never re-throws.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, error: &dyn Display, info: &str);
}

/// Logs through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn handle(&self, error: &dyn Display, info: &str) {
        tracing::error!(error = %error, info = %info, "Application error");
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Failed to mount on '{anchor}': {reason}")]
    Mount { anchor: String, reason: String },
}

/// Step 1: runtime created, nothing installed yet
pub struct AppBuilder<C> {
    client: C,
}

/// Step 2: router installed
pub struct WithRouter<C, V> {
    client: C,
    router: Router<V>,
}

/// Step 3: error handler installed, ready to mount
pub struct ReadyToMount<C, V> {
    client: C,
    router: Router<V>,
    errors: Arc<dyn ErrorHandler>,
}

/// Create the application runtime around an API client
pub fn create_app<C>(client: C) -> AppBuilder<C> {
    AppBuilder { client }
}

impl<C> AppBuilder<C> {
    pub fn use_router<V>(self, router: Router<V>) -> WithRouter<C, V> {
        WithRouter {
            client: self.client,
            router,
        }
    }
}

impl<C, V> WithRouter<C, V> {
    pub fn error_handler<H>(self, handler: H) -> ReadyToMount<C, V>
    where
        H: ErrorHandler + 'static,
    {
        ReadyToMount {
            client: self.client,
            router: self.router,
            errors: Arc::new(handler),
        }
    }
}

impl<C, V> ReadyToMount<C, V> {
    /// Mount the application. `mount` renders into the anchor; its failure
    /// aborts startup.
    pub fn mount<F, E>(self, anchor: &str, mount: F) -> Result<AppContext<C, V>, AppError>
    where
        F: FnOnce(&AppContext<C, V>, &str) -> Result<(), E>,
        E: Display,
    {
        let context = AppContext {
            inner: Rc::new(Inner {
                client: self.client,
                router: RefCell::new(self.router),
                errors: self.errors,
                anchor: anchor.to_string(),
            }),
        };

        mount(&context, anchor).map_err(|e| AppError::Mount {
            anchor: anchor.to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!(anchor = %anchor, "Application mounted");
        Ok(context)
    }
}

struct Inner<C, V> {
    client: C,
    router: RefCell<Router<V>>,
    errors: Arc<dyn ErrorHandler>,
    anchor: String,
}

/// Everything the views need, passed explicitly instead of living in globals.
/// Cheap to clone; clones share the same router.
pub struct AppContext<C, V> {
    inner: Rc<Inner<C, V>>,
}

impl<C, V> Clone for AppContext<C, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C, V> AppContext<C, V> {
    pub fn client(&self) -> &C {
        &self.inner.client
    }

    pub fn router(&self) -> Ref<'_, Router<V>> {
        self.inner.router.borrow()
    }

    pub fn router_mut(&self) -> RefMut<'_, Router<V>> {
        self.inner.router.borrow_mut()
    }

    pub fn anchor(&self) -> &str {
        &self.inner.anchor
    }

    /// Route an error to the global handler. The error is logged and dropped.
    pub fn report_error(&self, error: &dyn Display, info: &str) {
        self.inner.errors.handle(error, info);
    }

    /// Also send panics to the error handler, then to the previous hook
    pub fn install_panic_hook(&self) {
        let handler = Arc::clone(&self.inner.errors);
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            handler.handle(info, "panic");
            previous(info);
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{MemoryTitle, RouteName, RouteTable, TitleGuard, ViewRegistry};
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct RecordingHandler {
        seen: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl ErrorHandler for RecordingHandler {
        fn handle(&self, error: &dyn Display, info: &str) {
            self.seen
                .lock()
                .unwrap()
                .push((error.to_string(), info.to_string()));
        }
    }

    fn router() -> (Router<&'static str>, MemoryTitle) {
        let registry = ViewRegistry::new()
            .register(RouteName::Home, |_| "home")
            .register(RouteName::Project, |_| "project")
            .register(RouteName::History, |_| "history")
            .register(RouteName::NotFound, |_| "not-found");
        let title = MemoryTitle::new();
        let mut router = Router::new(RouteTable::standard().unwrap(), registry).unwrap();
        router.before_each(TitleGuard::new(title.clone()));
        (router, title)
    }

    #[test]
    fn test_bootstrap_and_navigate() {
        let (router, title) = router();
        let handler = RecordingHandler::default();

        let app = create_app("client")
            .use_router(router)
            .error_handler(handler.clone())
            .mount(MOUNT_ANCHOR, |app, anchor| {
                assert_eq!(anchor, "#app");
                app.router_mut().navigate("/").map(|_| ())
            })
            .unwrap();

        assert_eq!(*app.client(), "client");
        assert_eq!(app.anchor(), "#app");
        assert_eq!(title.get().as_deref(), Some("Home - Tech Proposal AI"));

        let other = app.clone();
        other.router_mut().navigate("/history").unwrap();
        assert_eq!(
            app.router().current().map(|a| a.view),
            Some("history")
        );
    }

    #[test]
    fn test_errors_are_reported_and_swallowed() {
        let (router, _) = router();
        let handler = RecordingHandler::default();

        let app = create_app(())
            .use_router(router)
            .error_handler(handler.clone())
            .mount(MOUNT_ANCHOR, |_, _| Ok::<(), String>(()))
            .unwrap();

        app.report_error(&"render failed", "HistoryView");

        let seen = handler.seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            &[("render failed".to_string(), "HistoryView".to_string())]
        );
    }

    #[test]
    fn test_mount_failure() {
        let (router, _) = router();

        let result = create_app(())
            .use_router(router)
            .error_handler(LogErrorHandler)
            .mount("#missing", |_, _| Err("anchor not found"));

        assert_eq!(
            result.err(),
            Some(AppError::Mount {
                anchor: "#missing".to_string(),
                reason: "anchor not found".to_string(),
            })
        );
    }
}
