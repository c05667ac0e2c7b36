//! History Page
//!
//! Recent projects, newest first.

use leptos::*;
use leptos_router::*;
use std::cell::Cell;
use std::rc::Rc;

use techplan::endpoints::DEFAULT_LIST_LIMIT;
use techplan::models::Project;
use techplan::router::{RouteName, RouteTable};

use crate::app::UiApp;
use crate::components::{HistorySkeleton, StatusBadge};
use crate::state::global::GlobalState;

/// Page sizes offered in the selector
const LIMITS: [u32; 3] = [DEFAULT_LIST_LIMIT, 20, 50];

/// Tickets for overlapping fetches. A response counts only if its ticket
/// is still the newest one issued.
#[derive(Clone, Default)]
struct LatestRequest(Rc<Cell<u64>>);

impl LatestRequest {
    fn issue(&self) -> u64 {
        let ticket = self.0.get() + 1;
        self.0.set(ticket);
        ticket
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.0.get() == ticket
    }
}

/// History page component
#[component]
pub fn History() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let app = use_context::<UiApp>().expect("application context not found");

    let (limit, set_limit) = create_signal(DEFAULT_LIST_LIMIT);
    let (projects, set_projects) = create_signal(None::<Vec<Project>>);

    // Refetch whenever the limit changes; only the newest request may land
    let client = app.client().clone();
    let latest = LatestRequest::default();
    create_effect(move |_| {
        let limit = limit.get();
        let ticket = latest.issue();
        let latest = latest.clone();
        let client = client.clone();
        spawn_local(async move {
            let response = state.track(client.projects().list(Some(limit))).await;
            if !latest.is_current(ticket) {
                return;
            }

            let list = match response {
                Ok(value) => serde_json::from_value::<Vec<Project>>(value).unwrap_or_else(|e| {
                    web_sys::console::error_1(&format!("Unexpected project list: {}", e).into());
                    state.report("The server sent an unexpected project list");
                    Vec::new()
                }),
                Err(e) => {
                    state.report(&e);
                    Vec::new()
                }
            };
            set_projects.set(Some(list));
        });
    });

    view! {
        <div class="space-y-8">
            <div class="flex items-center justify-between">
                <div>
                    <h1 class="text-3xl font-bold">"History"</h1>
                    <p class="text-gray-400 mt-1">"Your recent proposal projects"</p>
                </div>

                <select
                    on:change=move |ev| {
                        if let Ok(n) = event_target_value(&ev).parse::<u32>() {
                            set_limit.set(n);
                        }
                    }
                    prop:value=move || limit.get().to_string()
                    class="bg-gray-700 rounded-lg px-3 py-2 text-white border border-gray-600"
                >
                    {LIMITS.iter().map(|n| view! {
                        <option value=n.to_string()>{format!("Last {}", n)}</option>
                    }).collect_view()}
                </select>
            </div>

            {move || match projects.get() {
                None => view! { <HistorySkeleton rows=5 /> }.into_view(),
                Some(list) if list.is_empty() => view! { <EmptyHistory /> }.into_view(),
                Some(list) => view! { <ProjectTable projects=list /> }.into_view(),
            }}
        </div>
    }
}

#[component]
fn ProjectTable(projects: Vec<Project>) -> impl IntoView {
    let table = use_context::<RouteTable>().expect("RouteTable not found");

    view! {
        <div class="bg-gray-800 rounded-xl overflow-hidden">
            <table class="w-full text-left">
                <thead class="bg-gray-700 text-sm text-gray-300">
                    <tr>
                        <th class="px-4 py-3">"Title"</th>
                        <th class="px-4 py-3">"Topic"</th>
                        <th class="px-4 py-3">"Status"</th>
                        <th class="px-4 py-3">"Created"</th>
                    </tr>
                </thead>
                <tbody>
                    {projects.into_iter().map(|project| {
                        let href = table
                            .href(RouteName::Project, &[("id", project.id.as_str())])
                            .unwrap_or_default();
                        let title = if project.title.is_empty() {
                            project.id.to_string()
                        } else {
                            project.title.clone()
                        };
                        view! {
                            <tr class="border-t border-gray-700 hover:bg-gray-750">
                                <td class="px-4 py-3">
                                    <A href=href class="text-blue-400 hover:underline">{title}</A>
                                </td>
                                <td class="px-4 py-3 text-gray-300">{project.topic.clone()}</td>
                                <td class="px-4 py-3"><StatusBadge status=project.status /></td>
                                <td class="px-4 py-3 text-gray-400 text-sm">{project.created_at.clone()}</td>
                            </tr>
                        }
                    }).collect_view()}
                </tbody>
            </table>
        </div>
    }
}

#[component]
fn EmptyHistory() -> impl IntoView {
    let table = use_context::<RouteTable>().expect("RouteTable not found");
    let home = table.href(RouteName::Home, &[]).unwrap_or_else(|| "/".to_string());

    view! {
        <div class="bg-gray-800 rounded-xl p-12 text-center">
            <p class="text-gray-400 mb-6">"No projects yet."</p>
            <A
                href=home
                class="px-6 py-3 bg-blue-600 hover:bg-blue-700 rounded-lg font-medium transition-colors"
            >
                "Create your first proposal"
            </A>
        </div>
    }
}
