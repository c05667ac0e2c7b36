//! Route Table
//!
//! The static list of routes: pattern, name and page title.

use std::collections::HashMap;
use std::fmt;

use super::pattern::{path_only, PathPattern};
use super::RouterError;

/// Application name appended to every page title
pub const APP_NAME: &str = "Tech Proposal AI";

/// Identifier of each view the application can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Home,
    Project,
    History,
    NotFound,
}

impl RouteName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteName::Home => "home",
            RouteName::Project => "project",
            RouteName::History => "history",
            RouteName::NotFound => "not-found",
        }
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the route table
#[derive(Debug, Clone)]
pub struct RouteDef {
    pub name: RouteName,
    pub pattern: PathPattern,
    pub title: Option<String>,
}

impl RouteDef {
    pub fn new(name: RouteName, pattern: &str) -> Result<Self, RouterError> {
        Ok(Self {
            name,
            pattern: PathPattern::parse(pattern)?,
            title: None,
        })
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Result of resolving a location against the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub name: RouteName,
    /// Matched path, without query or fragment
    pub path: String,
    pub params: HashMap<String, String>,
    pub title: Option<String>,
}

impl RouteMatch {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Ordered, immutable route table. First match wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
}

impl RouteTable {
    /// Build a table. It must end in a catch-all route so that every path
    /// resolves, and names must be unique.
    pub fn new(routes: Vec<RouteDef>) -> Result<Self, RouterError> {
        let mut seen = Vec::with_capacity(routes.len());
        for route in &routes {
            if seen.contains(&route.name) {
                return Err(RouterError::DuplicateRoute(route.name));
            }
            seen.push(route.name);
        }

        match routes.last() {
            Some(last) if last.pattern.is_catch_all() => Ok(Self { routes }),
            _ => Err(RouterError::MissingCatchAll),
        }
    }

    /// The application's routes
    pub fn standard() -> Result<Self, RouterError> {
        Self::new(vec![
            RouteDef::new(RouteName::Home, "/")?.title(page_title("Home")),
            RouteDef::new(RouteName::Project, "/project/:id")?.title(page_title("Project Details")),
            RouteDef::new(RouteName::History, "/history")?.title(page_title("History")),
            RouteDef::new(RouteName::NotFound, "/:pathMatch(.*)*")?.title(page_title("Page Not Found")),
        ])
    }

    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    pub fn get(&self, name: RouteName) -> Option<&RouteDef> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Resolve a location. Always succeeds thanks to the catch-all.
    pub fn resolve(&self, location: &str) -> RouteMatch {
        let path = path_only(location);

        for route in &self.routes {
            if let Some(params) = route.pattern.matches(path) {
                return RouteMatch {
                    name: route.name,
                    path: path.to_string(),
                    params,
                    title: route.title.clone(),
                };
            }
        }

        // Unreachable for tables built through `new`, kept total anyway
        RouteMatch {
            name: RouteName::NotFound,
            path: path.to_string(),
            params: HashMap::new(),
            title: None,
        }
    }

    /// Build a link to a named route
    pub fn href(&self, name: RouteName, params: &[(&str, &str)]) -> Option<String> {
        let params: HashMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.get(name)?.pattern.build(&params)
    }
}

fn page_title(page: &str) -> String {
    format!("{} - {}", page, APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_routes_resolve() {
        let table = RouteTable::standard().unwrap();

        assert_eq!(table.resolve("/").name, RouteName::Home);
        assert_eq!(table.resolve("/history").name, RouteName::History);
        assert_eq!(table.resolve("/history/").name, RouteName::History);

        let project = table.resolve("/project/7?tab=result");
        assert_eq!(project.name, RouteName::Project);
        assert_eq!(project.param("id"), Some("7"));
        assert_eq!(project.path, "/project/7");
    }

    #[test]
    fn test_unmatched_paths_are_not_found() {
        let table = RouteTable::standard().unwrap();

        for path in ["/nope", "/project", "/project/1/extra", "/history/old", "/a/b/c"] {
            let route = table.resolve(path);
            assert_eq!(route.name, RouteName::NotFound, "path {}", path);
            assert_eq!(
                route.title.as_deref(),
                Some("Page Not Found - Tech Proposal AI")
            );
        }
    }

    #[test]
    fn test_doubled_slashes_are_not_found() {
        let table = RouteTable::standard().unwrap();

        for path in ["/project//7", "//history", "///", "/history//"] {
            assert_eq!(table.resolve(path).name, RouteName::NotFound, "path {}", path);
        }
        assert_eq!(table.resolve("/project/7/").name, RouteName::Project);
    }

    #[test]
    fn test_table_requires_catch_all() {
        let routes = vec![RouteDef::new(RouteName::Home, "/").unwrap()];
        assert!(matches!(
            RouteTable::new(routes),
            Err(RouterError::MissingCatchAll)
        ));
    }

    #[test]
    fn test_table_rejects_duplicates() {
        let routes = vec![
            RouteDef::new(RouteName::Home, "/").unwrap(),
            RouteDef::new(RouteName::Home, "/home").unwrap(),
            RouteDef::new(RouteName::NotFound, "/:rest(.*)*").unwrap(),
        ];
        assert!(matches!(
            RouteTable::new(routes),
            Err(RouterError::DuplicateRoute(RouteName::Home))
        ));
    }

    #[test]
    fn test_href() {
        let table = RouteTable::standard().unwrap();
        assert_eq!(
            table.href(RouteName::Project, &[("id", "p-9")]).as_deref(),
            Some("/project/p-9")
        );
        assert_eq!(table.href(RouteName::History, &[]).as_deref(), Some("/history"));
        assert_eq!(table.href(RouteName::Project, &[]), None);
    }
}
