use leptos::prelude::*;

use crate::app::CurrentView;

/// Map legend: the selected view's known data range as static min/max labels
/// around a gradient strip. The bounds are baked constants, never computed
/// from data.
#[component]
pub fn Legend() -> impl IntoView {
    let CurrentView(view) = expect_context();

    view! {
        <div style="position: absolute; left: 16px; bottom: 24px; z-index: 10; background: #13161f; border: 1px solid #282c3e; border-radius: 6px; padding: 10px 12px; display: flex; flex-direction: column; align-items: flex-start; gap: 6px; font-family: 'JetBrains Mono', monospace; font-size: 0.68rem; color: #9a9590;">
            <div>{move || view.get().legend_bounds().0}</div>
            <div style="width: 100%; height: 56px; border-radius: 3px; align-self: stretch; background: linear-gradient(to bottom, #7a1f1f, #b56727, #f5e9c8);" />
            <div>{move || view.get().legend_bounds().1}</div>
        </div>
    }
}
