//! App Root Component
//!
//! Main application component. Leptos' `<Router>` owns browser history; the
//! shared `techplan` router resolves each location, sets the document title
//! and builds the page.

use leptos::*;
use leptos_router::*;

use techplan::app::{AppContext, ErrorHandler};
use techplan::router::{RouteName, RouteTable, Router as RouteRouter, RouterError, TitleGuard, TitleSink, ViewRegistry};

use crate::api::ApiClient;
use crate::components::{Nav, NoticeStack};
use crate::pages::{History, Home, ProjectDetails};
use crate::state::global::provide_global_state;

/// Application context handed to every component
pub type UiApp = AppContext<ApiClient, View>;

/// Writes `document.title`
pub struct DocumentTitle;

impl TitleSink for DocumentTitle {
    fn set_title(&self, title: &str) {
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            document.set_title(title);
        }
    }
}

/// Sends unhandled errors to the browser console
pub struct ConsoleErrorHandler;

impl ErrorHandler for ConsoleErrorHandler {
    fn handle(&self, error: &dyn std::fmt::Display, info: &str) {
        web_sys::console::error_1(&format!("Unhandled error in {}: {}", info, error).into());
    }
}

/// The page for each route
pub fn build_router() -> Result<RouteRouter<View>, RouterError> {
    let registry = ViewRegistry::new()
        .register(RouteName::Home, |_| view! { <Home /> }.into_view())
        .register(RouteName::Project, |route| {
            let id = route.param("id").unwrap_or_default().to_string();
            view! { <ProjectDetails id=id /> }.into_view()
        })
        .register(RouteName::History, |_| view! { <History /> }.into_view())
        .register(RouteName::NotFound, |_| view! { <NotFound /> }.into_view());

    let mut router = RouteRouter::new(RouteTable::standard()?, registry)?;
    router.before_each(TitleGuard::new(DocumentTitle));
    Ok(router)
}

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    // Provide global state to all components
    provide_global_state();

    // Pages build links from the table; they must not borrow the router,
    // which is busy building them
    let app = use_context::<UiApp>().expect("application context not found");
    provide_context(app.router().table().clone());

    view! {
        <Router>
            <div class="min-h-screen bg-gray-900 text-white flex flex-col">
                // Navigation header
                <Nav />

                // Main content area
                <main class="flex-1 container mx-auto px-4 py-8 pb-24">
                    <RouterView />
                </main>

                <NoticeStack />
            </div>
        </Router>
    }
}

/// Renders the page for the current location
#[component]
fn RouterView() -> impl IntoView {
    let app = use_context::<UiApp>().expect("application context not found");
    let location = use_location();

    move || {
        // Query and fragment never affect matching
        let target = location.pathname.get();

        let mut router = app.router_mut();
        match router.navigate(&target) {
            Ok(active) => active.view.clone(),
            Err(e) => {
                app.report_error(&e, "navigation");
                view! { <NotFound /> }.into_view()
            }
        }
    }
}

/// 404 Not Found page
#[component]
fn NotFound() -> impl IntoView {
    let table = use_context::<RouteTable>().expect("RouteTable not found");
    let home = table.href(RouteName::Home, &[]).unwrap_or_else(|| "/".to_string());

    view! {
        <div class="flex flex-col items-center justify-center min-h-[60vh] text-center">
            <div class="text-6xl mb-4">"🔍"</div>
            <h1 class="text-3xl font-bold mb-2">"Page Not Found"</h1>
            <p class="text-gray-400 mb-6">"The page you're looking for doesn't exist."</p>
            <A
                href=home
                class="px-6 py-3 bg-blue-600 hover:bg-blue-700 rounded-lg font-medium transition-colors"
            >
                "Back to Home"
            </A>
        </div>
    }
}
