use leptos::prelude::*;
use wasm_bindgen::JsCast;

use foodmap_shared::{
    CountyProperties, FilteredCountyStats, ViewSelection, filter_stats, format_number,
};
use gloo_storage::Storage;

use crate::config::MapConfig;
use crate::counties::{self, CountyIndex};
use crate::legend::Legend;
use crate::map::MapCanvas;
use crate::stats::StatsPanel;
use crate::style::{self, MapStyle};
use crate::tiles::{self, LoadedTile};
use crate::viewport::Viewport;

/// Vertical rise of the hover tooltip above the pointer, in pixels.
const TOOLTIP_RISE_PX: f64 = 75.0;

/// Hover state. Pointer position and the hovered county's properties are a
/// single value so they are always set and cleared together.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverState {
    pub pointer: (f64, f64),
    pub properties: CountyProperties,
}

#[derive(Clone, Copy)]
pub(crate) struct CurrentView(pub RwSignal<ViewSelection>);
#[derive(Clone, Copy)]
pub(crate) struct HoveredCounty(pub RwSignal<Option<HoverState>>);
#[derive(Clone, Copy)]
pub(crate) struct CountyStats(pub Memo<Option<FilteredCountyStats>>);

#[derive(Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct Settings {
    map_view: ViewSelection,
}

/// Root application component. Provides global reactive signals via context.
#[component]
pub fn App(config: MapConfig) -> impl IntoView {
    let saved: Settings = gloo_storage::LocalStorage::get("foodmap_settings").unwrap_or_default();

    // Global signals
    let view: RwSignal<ViewSelection> = RwSignal::new(saved.map_view);
    let hovered: RwSignal<Option<HoverState>> = RwSignal::new(None);
    let viewport: RwSignal<Viewport> = RwSignal::new(Viewport::default());
    let map_style: RwSignal<MapStyle> = RwSignal::new(MapStyle::new());
    let loaded_tiles: RwSignal<Vec<LoadedTile>> = RwSignal::new(Vec::new());
    let county_index: RwSignal<CountyIndex> = RwSignal::new(CountyIndex::default());
    let style_fetch_started: RwSignal<bool> = RwSignal::new(false);

    // Chart projection of the hovered county, recomputed whole per hover
    let county_stats: Memo<Option<FilteredCountyStats>> = Memo::new(move |_| {
        hovered.with(|state| filter_stats(state.as_ref().map(|s| &s.properties)))
    });

    // Provide via context so children can access
    provide_context(viewport);
    provide_context(map_style);
    provide_context(loaded_tiles);
    provide_context(county_index);
    provide_context(CurrentView(view));
    provide_context(HoveredCounty(hovered));
    provide_context(CountyStats(county_stats));

    // Persist the selected view to localStorage on any change
    Effect::new(move || {
        let settings = Settings {
            map_view: view.get(),
        };
        let _ = gloo_storage::LocalStorage::set("foodmap_settings", &settings);
    });

    // Raise the selected view's layer whenever the selection changes. While
    // the style is still loading the request parks in the pending slot and
    // is applied once on load.
    Effect::new(move || {
        let view = view.get();
        map_style.update(|style| style.request_raise(view));
    });

    // Fetch the style document once on mount, then start tile and county
    // index loading against it.
    Effect::new({
        let config = config.clone();
        move || {
            if style_fetch_started.get_untracked() {
                return;
            }
            style_fetch_started.set(true);
            let config = config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match style::fetch_style(&config).await {
                    Ok(doc) => {
                        web_sys::console::info_1(
                            &format!("style loaded: {} layers", doc.layers.len()).into(),
                        );
                        tiles::fetch_tiles(loaded_tiles, &doc, &config);
                        counties::load_county_index(county_index, &config);
                        map_style.update(|style| style.complete_load(doc));
                    }
                    Err(e) => {
                        web_sys::console::warn_1(&format!("Style fetch failed: {e}").into());
                    }
                }
            });
        }
    });

    let on_view_change = move |e: leptos::ev::Event| {
        let Some(target) = e.target() else {
            return;
        };
        let Ok(select) = target.dyn_into::<web_sys::HtmlSelectElement>() else {
            return;
        };
        if let Some(next) = ViewSelection::from_layer_id(&select.value()) {
            view.set(next);
        }
    };

    view! {
        <div style="width: 100%; height: 100%; display: flex; flex-direction: column; background: #0c0e17; color: #e2e0d8; font-family: 'Inter', system-ui, sans-serif;">
            <div style="display: flex; align-items: center; justify-content: space-between; gap: 16px; padding: 12px 20px; border-bottom: 1px solid #282c3e; flex-wrap: wrap;">
                <h1 style="margin: 0; font-size: 1.15rem;">"U.S. Food Consumption and Production"</h1>
                <div style="display: flex; align-items: center; gap: 8px;">
                    <label style="font-size: 0.82rem; color: #9a9590;">
                        <b>"Map Visualization: "</b>
                    </label>
                    <select
                        id="data-type"
                        style="background: #1a1d2a; color: #e2e0d8; border: 1px solid #282c3e; border-radius: 6px; padding: 6px 10px; font-size: 0.82rem; outline: none;"
                        prop:value=move || view.get().layer_id()
                        on:change=on_view_change
                    >
                        {ViewSelection::ALL
                            .into_iter()
                            .map(|option_view| {
                                view! {
                                    <option value=option_view.layer_id()>
                                        {option_view.option_label()}
                                    </option>
                                }
                            })
                            .collect_view()}
                    </select>
                </div>
            </div>
            <div style="flex: 1; display: flex; overflow: hidden;">
                <div style="position: relative; flex: 1; overflow: hidden;">
                    <MapCanvas />
                    <Legend />
                </div>
                <StatsPanel />
            </div>
        </div>
        <HoverTooltip />
    }
}

/// Tooltip that follows the pointer while a county is hovered. Visible iff
/// hover state exists; missing statistic fields render as empty strings.
#[component]
fn HoverTooltip() -> impl IntoView {
    let HoveredCounty(hovered) = expect_context();
    let CurrentView(view) = expect_context();

    let tooltip_info = Memo::new(move |_| {
        let state = hovered.get()?;
        let view = view.get();
        let value = state
            .properties
            .number(view.stat_field())
            .map(format_number)
            .unwrap_or_default();
        Some((
            state.pointer,
            state.properties.display_name().to_string(),
            view.hover_label(),
            value,
            view.unit(),
        ))
    });

    view! {
        {move || {
            let Some((pointer, name, label, value, unit)) = tooltip_info.get() else {
                return view! { <div style="display:none;" /> }.into_any();
            };
            let (x, y) = pointer;
            view! {
                <div
                    style:left=format!("{x}px")
                    style:top=format!("{}px", y - TOOLTIP_RISE_PX)
                    style="position: fixed; pointer-events: none; z-index: 100; background: #161921; border: 1px solid #282c3e; border-radius: 6px; padding: 8px 10px; box-shadow: 0 4px 16px rgba(0,0,0,0.5); max-width: 260px;"
                >
                    <h3 style="margin: 0 0 4px; font-size: 0.85rem; color: #e2e0d8;">{name}</h3>
                    <p style="margin: 0; font-size: 0.75rem; color: #9a9590;">
                        <b style="color: #e2e0d8;">{label}": "</b>
                        {value}
                        " "
                        {unit}
                    </p>
                </div>
            }
            .into_any()
        }}
    }
}
