//! Home Page
//!
//! Start a proposal: create a project, attach documents, analyze a page.

use leptos::*;
use leptos_router::*;
use serde_json::Value;

use techplan::models::{CreateProjectResponse, ModelType, ProjectRequest, MAX_PAPERS_RANGE};
use techplan::router::{RouteName, RouteTable};

use crate::app::UiApp;
use crate::components::{Spinner, UploadForm};
use crate::state::global::GlobalState;

/// Home page component
#[component]
pub fn Home() -> impl IntoView {
    view! {
        <div class="space-y-8">
            // Page header
            <div>
                <h1 class="text-3xl font-bold">"New Proposal"</h1>
                <p class="text-gray-400 mt-1">
                    "Describe a topic and get a technical proposal grounded in recent papers"
                </p>
            </div>

            <section class="bg-gray-800 rounded-xl p-6">
                <h2 class="text-xl font-semibold mb-4">"Project"</h2>
                <CreateProjectForm />
            </section>

            // Two column layout for documents and web pages
            <div class="grid md:grid-cols-2 gap-8">
                <section class="bg-gray-800 rounded-xl p-6">
                    <h2 class="text-xl font-semibold mb-4">"Reference Document"</h2>
                    <UploadForm />
                </section>

                <section class="bg-gray-800 rounded-xl p-6">
                    <h2 class="text-xl font-semibold mb-4">"Analyze a Web Page"</h2>
                    <UrlAnalysisForm />
                </section>
            </div>
        </div>
    }
}

/// Parse comma separated keywords, dropping blanks
fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[component]
fn CreateProjectForm() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let app = use_context::<UiApp>().expect("application context not found");
    let table = use_context::<RouteTable>().expect("RouteTable not found");
    let navigate = use_navigate();

    let (title, set_title) = create_signal(String::new());
    let (topic, set_topic) = create_signal(String::new());
    let (description, set_description) = create_signal(String::new());
    let (model, set_model) = create_signal(ModelType::default());
    let (max_papers, set_max_papers) = create_signal(5u8);
    let (keywords, set_keywords) = create_signal(String::new());
    let (submitting, set_submitting) = create_signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        if title.get().trim().is_empty() || topic.get().trim().is_empty() {
            state.report("Title and topic are required");
            return;
        }

        let mut request = ProjectRequest::new(title.get(), topic.get())
            .model_type(model.get())
            .max_papers(max_papers.get());
        if !description.get().trim().is_empty() {
            request = request.description(description.get());
        }
        let keywords = parse_keywords(&keywords.get());
        if !keywords.is_empty() {
            request = request.keywords(keywords);
        }

        let client = app.client().clone();
        let table = table.clone();
        let navigate = navigate.clone();
        set_submitting.set(true);

        spawn_local(async move {
            match state.track(client.projects().create(&request)).await {
                Ok(response) => {
                    match serde_json::from_value::<CreateProjectResponse>(response) {
                        Ok(created) => {
                            state.notify("Project created, generating proposal");
                            if let Some(href) = table.href(
                                RouteName::Project,
                                &[("id", created.project_id.as_str())],
                            ) {
                                navigate(&href, Default::default());
                            }
                        }
                        Err(_) => state.notify("Project created"),
                    }
                }
                Err(e) => state.report(&e),
            }
            set_submitting.set(false);
        });
    };

    let input_class = "w-full bg-gray-700 rounded-lg px-4 py-3 text-white \
                       border border-gray-600 focus:border-blue-500 focus:outline-none";

    view! {
        <form on:submit=on_submit class="space-y-4">
            <div class="grid md:grid-cols-2 gap-4">
                <div>
                    <label class="block text-sm text-gray-400 mb-2">"Title"</label>
                    <input
                        type="text"
                        placeholder="Bridge Plan"
                        prop:value=move || title.get()
                        on:input=move |ev| set_title.set(event_target_value(&ev))
                        class=input_class
                    />
                </div>
                <div>
                    <label class="block text-sm text-gray-400 mb-2">"Topic"</label>
                    <input
                        type="text"
                        placeholder="Structural health monitoring"
                        prop:value=move || topic.get()
                        on:input=move |ev| set_topic.set(event_target_value(&ev))
                        class=input_class
                    />
                </div>
            </div>

            <div>
                <label class="block text-sm text-gray-400 mb-2">"Description"</label>
                <textarea
                    rows="4"
                    prop:value=move || description.get()
                    on:input=move |ev| set_description.set(event_target_value(&ev))
                    class=input_class
                />
            </div>

            <div class="grid md:grid-cols-3 gap-4">
                <div>
                    <label class="block text-sm text-gray-400 mb-2">"Model"</label>
                    <select
                        on:change=move |ev| {
                            if let Ok(m) = event_target_value(&ev).parse::<ModelType>() {
                                set_model.set(m);
                            }
                        }
                        prop:value=move || model.get().as_str()
                        class=input_class
                    >
                        <option value="default">"Default"</option>
                        <option value="lite">"Lite"</option>
                        <option value="pro">"Pro"</option>
                        <option value="reader">"Reader"</option>
                    </select>
                </div>
                <div>
                    <label class="block text-sm text-gray-400 mb-2">
                        {move || format!("Papers: {}", max_papers.get())}
                    </label>
                    <input
                        type="range"
                        min=MAX_PAPERS_RANGE.start().to_string()
                        max=MAX_PAPERS_RANGE.end().to_string()
                        prop:value=move || max_papers.get().to_string()
                        on:input=move |ev| {
                            if let Ok(n) = event_target_value(&ev).parse::<u8>() {
                                set_max_papers.set(n);
                            }
                        }
                        class="w-full"
                    />
                </div>
                <div>
                    <label class="block text-sm text-gray-400 mb-2">"Keywords"</label>
                    <input
                        type="text"
                        placeholder="comma, separated"
                        prop:value=move || keywords.get()
                        on:input=move |ev| set_keywords.set(event_target_value(&ev))
                        class=input_class
                    />
                </div>
            </div>

            <button
                type="submit"
                disabled=move || submitting.get()
                class="w-full bg-blue-600 hover:bg-blue-700 disabled:bg-gray-600
                       disabled:cursor-not-allowed rounded-lg py-3 font-semibold
                       transition-colors flex items-center justify-center space-x-2"
            >
                {move || if submitting.get() {
                    view! {
                        <Spinner />
                        <span>"Creating..."</span>
                    }.into_view()
                } else {
                    view! {
                        <span>"Generate Proposal"</span>
                    }.into_view()
                }}
            </button>
        </form>
    }
}

#[component]
fn UrlAnalysisForm() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let app = use_context::<UiApp>().expect("application context not found");

    let (url, set_url) = create_signal(String::new());
    let (result, set_result) = create_signal(None::<Value>);
    let (submitting, set_submitting) = create_signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let target = url.get();
        let client = app.client().clone();
        set_submitting.set(true);
        set_result.set(None);

        spawn_local(async move {
            match state.track(client.url().analyze(&target)).await {
                Ok(analysis) => {
                    let shown = analysis.get("result").cloned().unwrap_or(analysis);
                    set_result.set(Some(shown));
                }
                Err(e) => state.report(&e),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <form on:submit=on_submit class="space-y-4">
            <input
                type="url"
                placeholder="https://example.com/article"
                prop:value=move || url.get()
                on:input=move |ev| set_url.set(event_target_value(&ev))
                class="w-full bg-gray-700 rounded-lg px-4 py-3 text-white
                       border border-gray-600 focus:border-blue-500 focus:outline-none"
            />
            <button
                type="submit"
                disabled=move || submitting.get()
                class="w-full bg-blue-600 hover:bg-blue-700 disabled:bg-gray-600
                       disabled:cursor-not-allowed rounded-lg py-3 font-semibold transition-colors"
            >
                {move || if submitting.get() { "Analyzing..." } else { "Analyze" }}
            </button>
        </form>

        {move || result.get().map(|value| view! {
            <pre class="mt-4 bg-gray-900 rounded-lg p-4 text-xs text-gray-300 overflow-x-auto">
                {serde_json::to_string_pretty(&value).unwrap_or_default()}
            </pre>
        })}
    }
}
