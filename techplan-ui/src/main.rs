//! Tech Proposal AI
//!
//! Frontend for the proposal generation service built with Leptos (WASM).
//!
//! # Features
//!
//! - Create proposal projects from a topic
//! - Upload reference documents and analyze web pages
//! - Follow generation progress and read the finished proposal
//! - Browse recent projects
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. Startup goes through `techplan::app::create_app`: API client,
//! router, error handler, then mount on `#app`.

use leptos::*;
use wasm_bindgen::JsCast;

use techplan::app::{create_app, MOUNT_ANCHOR};

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    if let Err(e) = start() {
        web_sys::console::error_1(&format!("Failed to start application: {}", e).into());
    }
}

fn start() -> Result<(), Box<dyn std::error::Error>> {
    let router = app::build_router()?;

    let context = create_app(api::ApiClient::default())
        .use_router(router)
        .error_handler(app::ConsoleErrorHandler)
        .mount(MOUNT_ANCHOR, |context, anchor| {
            let element = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.query_selector(anchor).ok().flatten())
                .ok_or_else(|| "element not found".to_string())?;
            let element = element
                .dyn_into::<web_sys::HtmlElement>()
                .map_err(|_| "not an HTML element".to_string())?;

            let context = context.clone();
            mount_to(element, move || {
                provide_context(context.clone());
                view! { <app::App /> }
            });
            Ok::<(), String>(())
        })?;

    context.install_panic_hook();
    Ok(())
}
