//! Notice Stack
//!
//! Renders the queued notices; clicking one dismisses it.

use leptos::*;

use crate::state::global::{GlobalState, Notice, NoticeKind};

#[component]
pub fn NoticeStack() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    view! {
        <div class="fixed bottom-6 right-4 z-50 flex flex-col gap-2 w-80">
            <For
                each=move || state.notices()
                key=|notice| notice.id
                children=move |notice: Notice| {
                    let id = notice.id;
                    let (label, class) = match notice.kind {
                        NoticeKind::Info => ("Done", "bg-emerald-700"),
                        NoticeKind::Error => ("Failed", "bg-red-700"),
                    };
                    view! {
                        <button
                            type="button"
                            title="Dismiss"
                            on:click=move |_| state.dismiss(id)
                            class=format!("{} text-left text-white text-sm px-4 py-3 rounded-lg shadow-lg", class)
                        >
                            <span class="font-semibold mr-2">{label}</span>
                            <span>{notice.text}</span>
                        </button>
                    }
                }
            />
        </div>
    }
}
