//! Project Details Page
//!
//! Shows a project and polls it until generation finishes.

use leptos::*;
use leptos_router::*;
use serde_json::Value;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use techplan::models::{PaperInfo, Project, ProjectResult};
use techplan::router::{RouteName, RouteTable};

use crate::api::ApiClient;
use crate::app::UiApp;
use crate::components::{Spinner, SpinnerSize, StatusBadge, UploadForm};
use crate::state::global::GlobalState;

/// How often an unfinished project is refreshed
const POLL_INTERVAL_MS: u32 = 5000;

/// What the last fetch returned
#[derive(Clone)]
enum Loaded {
    Project(Box<Project>),
    /// A body the typed model could not read, shown as JSON
    Raw(Value),
}

/// Fetch once. Returns whether polling should stop.
async fn refresh(client: &ApiClient, id: &str, state: GlobalState, set: WriteSignal<Option<Loaded>>) -> bool {
    match client.projects().get(id).await {
        Ok(value) => match serde_json::from_value::<Project>(value.clone()) {
            Ok(project) => {
                let done = project.status.is_terminal();
                set.set(Some(Loaded::Project(Box::new(project))));
                done
            }
            Err(_) => {
                set.set(Some(Loaded::Raw(value)));
                true
            }
        },
        Err(e) => {
            state.report(&e);
            true
        }
    }
}

/// Project details page component
#[component]
pub fn ProjectDetails(id: String) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let app = use_context::<UiApp>().expect("application context not found");

    let (loaded, set_loaded) = create_signal(None::<Loaded>);
    let (polling, set_polling) = create_signal(false);

    // Stop polling once the page is gone
    let alive = Rc::new(Cell::new(true));
    let alive_for_cleanup = Rc::clone(&alive);
    on_cleanup(move || alive_for_cleanup.set(false));

    let start_polling = {
        let client = app.client().clone();
        let id = id.clone();
        move || {
            if polling.get_untracked() {
                return;
            }
            set_polling.set(true);

            let client = client.clone();
            let id = id.clone();
            let alive = Rc::clone(&alive);
            spawn_local(async move {
                loop {
                    if !alive.get() {
                        return;
                    }
                    if refresh(&client, &id, state, set_loaded).await {
                        break;
                    }
                    gloo_timers::future::TimeoutFuture::new(POLL_INTERVAL_MS).await;
                }
                if alive.get() {
                    set_polling.set(false);
                }
            });
        }
    };

    start_polling();
    let on_refresh = move |_| start_polling();

    view! {
        <div class="space-y-8">
            <div class="flex items-center justify-between">
                <div>
                    <h1 class="text-3xl font-bold">"Project Details"</h1>
                    <p class="text-gray-400 mt-1 font-mono text-sm">{id.clone()}</p>
                </div>
                <button
                    on:click=on_refresh
                    disabled=move || polling.get()
                    class="px-4 py-2 bg-gray-700 hover:bg-gray-600 disabled:opacity-50 rounded-lg text-sm"
                >
                    {move || if polling.get() { "Refreshing..." } else { "Refresh" }}
                </button>
            </div>

            {move || match loaded.get() {
                None => view! {
                    <div class="flex justify-center py-12">
                        <Spinner size=SpinnerSize::Large caption="Loading project" />
                    </div>
                }.into_view(),
                Some(Loaded::Project(project)) => view! { <ProjectView project=*project /> }.into_view(),
                Some(Loaded::Raw(value)) => view! {
                    <pre class="bg-gray-800 rounded-xl p-6 text-xs text-gray-300 overflow-x-auto">
                        {serde_json::to_string_pretty(&value).unwrap_or_default()}
                    </pre>
                }.into_view(),
            }}

            <section class="bg-gray-800 rounded-xl p-6">
                <h2 class="text-xl font-semibold mb-4">"Attach a Document"</h2>
                <UploadForm project_id=id />
            </section>

            <BackToHistory />
        </div>
    }
}

#[component]
fn ProjectView(project: Project) -> impl IntoView {
    let created = format_timestamp(&project.created_at);

    view! {
        <section class="bg-gray-800 rounded-xl p-6 space-y-3">
            <div class="flex items-center justify-between">
                <h2 class="text-2xl font-semibold">{project.title.clone()}</h2>
                <StatusBadge status=project.status />
            </div>
            <p class="text-gray-300">{project.topic.clone()}</p>
            {project.description.clone().map(|d| view! { <p class="text-gray-400">{d}</p> })}
            <p class="text-sm text-gray-500">{format!("Created {}", created)}</p>
            {project.status_message.clone().map(|m| view! {
                <p class="text-sm text-yellow-400">{m}</p>
            })}
            {project.error.clone().map(|e| view! {
                <p class="text-sm text-red-400">{e}</p>
            })}
        </section>

        {match project.result {
            Some(result) => view! { <ResultView result=result /> }.into_view(),
            None if !project.status.is_terminal() => view! {
                <section class="bg-gray-800 rounded-xl p-6 text-gray-400">
                    "The proposal is being generated. This page refreshes on its own."
                </section>
            }.into_view(),
            None => view! {}.into_view(),
        }}
    }
}

#[component]
fn ResultView(result: ProjectResult) -> impl IntoView {
    view! {
        <section class="bg-gray-800 rounded-xl p-6">
            <h2 class="text-xl font-semibold mb-4">"Technical Proposal"</h2>
            {result.translated_topic.clone().map(|t| view! {
                <p class="text-sm text-gray-400 mb-4">{format!("Search topic: {}", t)}</p>
            })}
            <div class="proposal text-gray-200">{result.technical_proposal.clone()}</div>
        </section>

        {result.architecture_diagram.clone().map(|diagram| view! {
            <section class="bg-gray-800 rounded-xl p-6">
                <h2 class="text-xl font-semibold mb-4">"Architecture"</h2>
                <pre class="text-xs text-gray-300 overflow-x-auto">{diagram}</pre>
            </section>
        })}

        <div class="grid md:grid-cols-2 gap-8">
            <EntryList title="Implementation Steps" entries=result.implementation_steps.clone() />
            <EntryList title="Resources Needed" entries=result.resources_needed.clone() />
        </div>

        <section class="bg-gray-800 rounded-xl p-6">
            <h2 class="text-xl font-semibold mb-4">"References"</h2>
            {if result.references.is_empty() {
                view! { <p class="text-gray-400">"No papers were cited."</p> }.into_view()
            } else {
                view! {
                    <ul class="space-y-4">
                        {result.references.into_iter().map(|paper| view! { <PaperItem paper=paper /> }).collect_view()}
                    </ul>
                }.into_view()
            }}
        </section>
    }
}

#[component]
fn EntryList(title: &'static str, entries: Vec<HashMap<String, String>>) -> impl IntoView {
    view! {
        <section class="bg-gray-800 rounded-xl p-6">
            <h2 class="text-xl font-semibold mb-4">{title}</h2>
            <ol class="list-decimal list-inside space-y-2 text-gray-300">
                {entries.into_iter().map(|entry| view! { <li>{describe_entry(&entry)}</li> }).collect_view()}
            </ol>
        </section>
    }
}

#[component]
fn PaperItem(paper: PaperInfo) -> impl IntoView {
    let authors = paper.authors.join(", ");

    view! {
        <li>
            <div class="font-medium">
                {match paper.pdf_url.clone() {
                    Some(url) => view! {
                        <a href=url target="_blank" rel="noopener" class="text-blue-400 hover:underline">
                            {paper.title.clone()}
                        </a>
                    }.into_view(),
                    None => paper.title.clone().into_view(),
                }}
            </div>
            <div class="text-sm text-gray-400">{authors}</div>
            <div class="text-sm text-gray-500">{paper.published.clone()}</div>
        </li>
    }
}

#[component]
fn BackToHistory() -> impl IntoView {
    let table = use_context::<RouteTable>().expect("RouteTable not found");
    let href = table.href(RouteName::History, &[]).unwrap_or_else(|| "/history".to_string());

    view! {
        <A href=href class="text-blue-400 hover:underline">"← All projects"</A>
    }
}

/// Steps and resources come as loose maps; show the usual keys first
fn describe_entry(entry: &HashMap<String, String>) -> String {
    let primary = ["step", "name", "title", "resource"]
        .iter()
        .find_map(|key| entry.get(*key));
    let detail = ["description", "details", "detail"]
        .iter()
        .find_map(|key| entry.get(*key));

    match (primary, detail) {
        (Some(p), Some(d)) => format!("{}: {}", p, d),
        (Some(p), None) => p.clone(),
        (None, Some(d)) => d.clone(),
        (None, None) => {
            let mut pairs: Vec<_> = entry.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
            pairs.sort();
            pairs.join(", ")
        }
    }
}

/// The backend sends naive ISO timestamps without an offset
fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    match chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}
