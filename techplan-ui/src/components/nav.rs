//! Navigation Component
//!
//! Header navigation bar with logo and links.

use leptos::*;
use leptos_router::*;

use techplan::router::{RouteName, RouteTable};

use crate::components::Spinner;
use crate::state::global::GlobalState;

/// Navigation header component
#[component]
pub fn Nav() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let table = use_context::<RouteTable>().expect("RouteTable not found");
    let link = move |name| table.href(name, &[]).unwrap_or_else(|| "/".to_string());

    view! {
        <nav class="bg-gray-800 border-b border-gray-700">
            <div class="container mx-auto px-4">
                <div class="flex items-center justify-between h-16">
                    // Logo and brand
                    <A href=link(RouteName::Home) class="flex items-center space-x-3">
                        <span class="text-2xl">"📐"</span>
                        <span class="text-xl font-bold text-white">"Tech Proposal AI"</span>
                    </A>

                    // Navigation links
                    <div class="flex items-center space-x-1">
                        {move || state.busy().then(|| view! { <Spinner /> })}
                        <NavLink href=link(RouteName::Home) label="New Project" />
                        <NavLink href=link(RouteName::History) label="History" />
                    </div>
                </div>
            </div>
        </nav>
    }
}

/// Individual navigation link
#[component]
fn NavLink(
    href: String,
    label: &'static str,
) -> impl IntoView {
    view! {
        <A
            href=href
            exact=true
            class="px-4 py-2 rounded-lg text-gray-300 hover:text-white hover:bg-gray-700 transition-colors"
            active_class="bg-gray-700 text-white"
        >
            {label}
        </A>
    }
}
