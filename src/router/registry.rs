//! View Registry
//!
//! Maps route names to factories that build view instances on demand. The
//! registry owns the factories; the router owns whatever they produce.

use std::collections::HashMap;

use super::{RouteMatch, RouteName, RouterError};

/// Builds a view for a resolved route
pub type ViewFactory<V> = Box<dyn Fn(&RouteMatch) -> V>;

pub struct ViewRegistry<V> {
    factories: HashMap<RouteName, ViewFactory<V>>,
}

impl<V> Default for ViewRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ViewRegistry<V> {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register (or replace) the factory for a route
    pub fn register<F>(mut self, name: RouteName, factory: F) -> Self
    where
        F: Fn(&RouteMatch) -> V + 'static,
    {
        self.factories.insert(name, Box::new(factory));
        self
    }

    pub fn contains(&self, name: RouteName) -> bool {
        self.factories.contains_key(&name)
    }

    pub fn build(&self, route: &RouteMatch) -> Result<V, RouterError> {
        let factory = self
            .factories
            .get(&route.name)
            .ok_or(RouterError::MissingView(route.name))?;
        Ok(factory(route))
    }
}
