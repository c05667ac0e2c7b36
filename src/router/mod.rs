//! Client-Side Router
//!
//! Resolves locations against the route table, runs navigation guards and
//! builds the matching view.
//!
//! ## Navigation
//!
//! 1. Strip the history base and resolve the path (unmatched paths land on
//!    the `not-found` route)
//! 2. Run every guard in registration order; the title guard applies the
//!    route's title here, before the view exists
//! 3. Build the view through the registry and make it the active view,
//!    dropping the previous one
//!
//! ## Example
//!
//! ```rust
//! use techplan::router::{MemoryTitle, RouteName, RouteTable, Router, TitleGuard, ViewRegistry};
//!
//! let registry = ViewRegistry::new()
//!     .register(RouteName::Home, |_| "home")
//!     .register(RouteName::Project, |_| "project")
//!     .register(RouteName::History, |_| "history")
//!     .register(RouteName::NotFound, |_| "not found");
//!
//! let title = MemoryTitle::new();
//! let mut router = Router::new(RouteTable::standard().unwrap(), registry).unwrap();
//! router.before_each(TitleGuard::new(title.clone()));
//!
//! let active = router.navigate("/history").unwrap();
//! assert_eq!(active.view, "history");
//! assert_eq!(title.get().as_deref(), Some("History - Tech Proposal AI"));
//! ```

mod guard;
mod pattern;
mod registry;
mod table;

pub use guard::{MemoryTitle, NavigationGuard, TitleGuard, TitleSink};
pub use pattern::{path_only, PathPattern};
pub use registry::{ViewFactory, ViewRegistry};
pub use table::{RouteDef, RouteMatch, RouteName, RouteTable, APP_NAME};

use thiserror::Error;

/// Router construction and navigation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Route table must end with a catch-all route")]
    MissingCatchAll,

    #[error("Route '{0}' is declared twice")]
    DuplicateRoute(RouteName),

    #[error("No view registered for route '{0}'")]
    MissingView(RouteName),
}

/// The route currently shown, together with the view built for it
pub struct ActiveRoute<V> {
    pub route: RouteMatch,
    pub view: V,
}

pub struct Router<V> {
    table: RouteTable,
    registry: ViewRegistry<V>,
    guards: Vec<Box<dyn NavigationGuard>>,
    base: String,
    current: Option<ActiveRoute<V>>,
}

impl<V> Router<V> {
    /// Create a router. Every route in the table needs a registered view.
    pub fn new(table: RouteTable, registry: ViewRegistry<V>) -> Result<Self, RouterError> {
        if let Some(route) = table.routes().iter().find(|r| !registry.contains(r.name)) {
            return Err(RouterError::MissingView(route.name));
        }

        Ok(Self {
            table,
            registry,
            guards: Vec::new(),
            base: String::new(),
            current: None,
        })
    }

    /// Serve the application under a path prefix, e.g. `/app`
    pub fn with_base(mut self, base: &str) -> Self {
        self.base = base.trim_end_matches('/').to_string();
        self
    }

    /// Register a guard run before every navigation
    pub fn before_each<G>(&mut self, guard: G)
    where
        G: NavigationGuard + 'static,
    {
        self.guards.push(Box::new(guard));
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolve a location without navigating
    pub fn resolve(&self, location: &str) -> RouteMatch {
        self.table.resolve(self.strip_base(location))
    }

    /// Navigate to a location and return the new active route
    pub fn navigate(&mut self, location: &str) -> Result<&ActiveRoute<V>, RouterError> {
        let to = self.resolve(location);
        let from = self.current.as_ref().map(|active| &active.route);

        tracing::debug!(
            to = %to.name,
            from = from.map(|r| r.name.as_str()).unwrap_or("-"),
            path = %to.path,
            "Navigating"
        );

        for guard in &self.guards {
            guard.before_each(&to, from);
        }

        let view = self.registry.build(&to)?;
        let active = self.current.insert(ActiveRoute { route: to, view });
        Ok(active)
    }

    pub fn current(&self) -> Option<&ActiveRoute<V>> {
        self.current.as_ref()
    }

    fn strip_base<'a>(&self, location: &'a str) -> &'a str {
        if self.base.is_empty() {
            return location;
        }
        match location.strip_prefix(self.base.as_str()) {
            Some(rest) if rest.is_empty() => "/",
            Some(rest) if rest.starts_with(['/', '?', '#']) => rest,
            _ => location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Registry whose views record the title visible when they were built
    fn recording_registry(title: MemoryTitle) -> ViewRegistry<(RouteName, Option<String>)> {
        let mut registry = ViewRegistry::new();
        for name in [
            RouteName::Home,
            RouteName::Project,
            RouteName::History,
            RouteName::NotFound,
        ] {
            let title = title.clone();
            registry = registry.register(name, move |route| (route.name, title.get()));
        }
        registry
    }

    fn router_with_title() -> (Router<(RouteName, Option<String>)>, MemoryTitle) {
        let title = MemoryTitle::new();
        let mut router = Router::new(
            RouteTable::standard().unwrap(),
            recording_registry(title.clone()),
        )
        .unwrap();
        router.before_each(TitleGuard::new(title.clone()));
        (router, title)
    }

    #[test]
    fn test_title_applied_before_view_is_built() {
        let (mut router, title) = router_with_title();

        for (path, expected) in [
            ("/", "Home - Tech Proposal AI"),
            ("/project/42", "Project Details - Tech Proposal AI"),
            ("/history", "History - Tech Proposal AI"),
            ("/missing", "Page Not Found - Tech Proposal AI"),
        ] {
            let active = router.navigate(path).unwrap();
            // The view saw the new title while it was being built
            assert_eq!(active.view.1.as_deref(), Some(expected), "path {}", path);
            assert_eq!(title.get().as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_unmatched_navigation_lands_on_not_found() {
        let (mut router, _) = router_with_title();
        let active = router.navigate("/does/not/exist").unwrap();
        assert_eq!(active.route.name, RouteName::NotFound);
        assert_eq!(active.route.param("pathMatch"), Some("does/not/exist"));
    }

    #[test]
    fn test_guards_see_previous_route() {
        let (mut router, _) = router_with_title();
        let seen: Rc<RefCell<Vec<(RouteName, Option<RouteName>)>>> = Rc::default();

        let log = Rc::clone(&seen);
        router.before_each(move |to: &RouteMatch, from: Option<&RouteMatch>| {
            log.borrow_mut().push((to.name, from.map(|r| r.name)));
        });

        router.navigate("/").unwrap();
        router.navigate("/project/1").unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                (RouteName::Home, None),
                (RouteName::Project, Some(RouteName::Home)),
            ]
        );
        assert_eq!(router.current().map(|a| a.route.name), Some(RouteName::Project));
    }

    #[test]
    fn test_base_is_stripped() {
        let (router, _) = router_with_title();
        let router = router.with_base("/app/");

        assert_eq!(router.resolve("/app").name, RouteName::Home);
        assert_eq!(router.resolve("/app/history").name, RouteName::History);
        assert_eq!(router.resolve("/application").name, RouteName::NotFound);
    }

    #[test]
    fn test_router_requires_every_view() {
        let registry = ViewRegistry::new().register(RouteName::Home, |_| ());
        assert!(matches!(
            Router::new(RouteTable::standard().unwrap(), registry),
            Err(RouterError::MissingView(RouteName::Project))
        ));
    }
}
