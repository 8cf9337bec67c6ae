mod app;
mod charts;
mod colors;
mod config;
mod counties;
mod legend;
mod map;
mod render_loop;
mod spatial;
mod stats;
mod style;
mod tiles;
mod viewport;

use std::any::Any;
use std::cell::RefCell;

use leptos::mount::mount_to;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::app::App;
use crate::config::MapConfig;

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let mount_target = document
        .get_element_by_id("app")
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .or_else(|| document.body());
    let Some(target) = mount_target else {
        return;
    };

    // The map access credential is the one fatal startup condition.
    let Some(config) = MapConfig::from_mount_element(&target) else {
        web_sys::console::error_1(
            &"Missing data-foodmap-token on the mount element; refusing to start".into(),
        );
        target.set_text_content(Some("Map access credential is not configured."));
        return;
    };

    APP_MOUNT_HANDLE.with(move |slot| {
        // If main() is re-entered (e.g. dev/hot-reload runtime quirks), drop the old mount
        // so stale effects/signals can't keep mutating app state.
        let _old = slot.borrow_mut().take();
        let handle = mount_to(target, move || view! { <App config=config /> });
        *slot.borrow_mut() = Some(Box::new(handle));
    });
}
