//! Progress Indicators

use leptos::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpinnerSize {
    #[default]
    Small,
    Large,
}

impl SpinnerSize {
    fn class(self) -> &'static str {
        match self {
            SpinnerSize::Small => "loading-spinner inline-block w-4 h-4",
            SpinnerSize::Large => "loading-spinner inline-block w-10 h-10",
        }
    }
}

/// Spinner with an optional caption next to it
#[component]
pub fn Spinner(
    #[prop(optional)]
    size: SpinnerSize,
    #[prop(optional, into)]
    caption: Option<String>,
) -> impl IntoView {
    view! {
        <span class="inline-flex items-center gap-2 text-gray-400">
            <span class=size.class() />
            {caption.map(|text| view! { <span class="text-sm">{text}</span> })}
        </span>
    }
}

/// Placeholder for the project table while history loads
#[component]
pub fn HistorySkeleton(rows: u32) -> impl IntoView {
    view! {
        <div class="bg-gray-800 rounded-xl overflow-hidden animate-pulse">
            <div class="bg-gray-700 h-11" />
            {(0..rows).map(|_| view! {
                <div class="grid grid-cols-4 gap-4 px-4 py-4 border-t border-gray-700">
                    <div class="bg-gray-700 rounded h-4 col-span-1" />
                    <div class="bg-gray-700 rounded h-4 col-span-1" />
                    <div class="bg-gray-700 rounded-full h-4 w-20" />
                    <div class="bg-gray-700 rounded h-4 w-28" />
                </div>
            }).collect_view()}
        </div>
    }
}
