//! Status Badge Component

use leptos::*;

use techplan::models::ProjectStatus;

/// Colored badge for a project's status
#[component]
pub fn StatusBadge(status: ProjectStatus) -> impl IntoView {
    let color = match status {
        ProjectStatus::Pending => "bg-gray-600",
        ProjectStatus::Processing => "bg-yellow-600",
        ProjectStatus::Completed => "bg-green-600",
        ProjectStatus::Failed => "bg-red-600",
    };

    view! {
        <span class=format!("px-2 py-1 rounded text-xs font-semibold uppercase {}", color)>
            {status.label()}
        </span>
    }
}
