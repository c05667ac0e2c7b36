//! Upload Component
//!
//! Form for attaching a reference document, optionally to a project.

use leptos::*;

use techplan::models::{ProjectId, UploadResponse};

use crate::app::UiApp;
use crate::state::global::GlobalState;

/// File upload form. With `project_id` the field is prefilled and hidden.
#[component]
pub fn UploadForm(
    #[prop(optional, into)]
    project_id: Option<String>,
) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let app = use_context::<UiApp>().expect("application context not found");

    let fixed_project = project_id.is_some();
    let (project, set_project) = create_signal(project_id.unwrap_or_default());
    let (submitting, set_submitting) = create_signal(false);
    let file_input = create_node_ref::<html::Input>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let Some(file) = file_input
            .get()
            .and_then(|input| input.files())
            .and_then(|files| files.get(0))
        else {
            state.report("Choose a file to upload");
            return;
        };

        let project_id = ProjectId::from(project.get());
        let client = app.client().clone();
        set_submitting.set(true);

        spawn_local(async move {
            match state.track(client.upload().file(file, Some(&project_id))).await {
                Ok(response) => {
                    let name = serde_json::from_value::<UploadResponse>(response)
                        .map(|r| r.filename)
                        .unwrap_or_else(|_| "file".to_string());
                    state.notify(&format!("Uploaded {}", name));
                    if let Some(input) = file_input.get() {
                        input.set_value("");
                    }
                }
                Err(e) => state.report(&e),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <form on:submit=on_submit class="space-y-4">
            <div>
                <label class="block text-sm text-gray-400 mb-2">"Document"</label>
                <input
                    type="file"
                    node_ref=file_input
                    accept=".pdf,.txt,.md,.doc,.docx,.ppt,.pptx,.html"
                    class="w-full text-sm text-gray-300 file:mr-4 file:py-2 file:px-4
                           file:rounded-lg file:border-0 file:bg-gray-700 file:text-white"
                />
            </div>

            {(!fixed_project).then(|| view! {
                <div>
                    <label class="block text-sm text-gray-400 mb-2">"Project ID (optional)"</label>
                    <input
                        type="text"
                        prop:value=move || project.get()
                        on:input=move |ev| set_project.set(event_target_value(&ev))
                        class="w-full bg-gray-700 rounded-lg px-4 py-3 text-white
                               border border-gray-600 focus:border-blue-500 focus:outline-none"
                    />
                </div>
            })}

            <button
                type="submit"
                disabled=move || submitting.get()
                class="w-full bg-blue-600 hover:bg-blue-700 disabled:bg-gray-600
                       disabled:cursor-not-allowed rounded-lg py-3 font-semibold transition-colors"
            >
                {move || if submitting.get() { "Uploading..." } else { "Upload" }}
            </button>
        </form>
    }
}
