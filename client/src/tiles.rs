use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use js_sys::Reflect;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

use foodmap_shared::StyleDoc;

use crate::config::MapConfig;

const TILE_CONCURRENCY: usize = 6;
const ONLOAD_HANDLE_KEY: &str = "__foodmapTileOnload";
const ONERROR_HANDLE_KEY: &str = "__foodmapTileOnerror";

type IdleCallback = Rc<dyn Fn()>;

/// A loaded choropleth tile image with its layer and world rect.
#[derive(Clone)]
pub struct LoadedTile {
    pub id: usize,
    pub layer: String,
    pub image: HtmlImageElement,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct LoadJob {
    id: usize,
    layer: String,
    url: String,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

/// Fetch every layer's pre-baked tiles named by the style document.
/// A failed tile is skipped; the rest of the layer still renders.
pub fn fetch_tiles(tiles_signal: RwSignal<Vec<LoadedTile>>, doc: &StyleDoc, config: &MapConfig) {
    tiles_signal.set(Vec::new());

    let jobs = make_jobs(doc, config);
    if jobs.is_empty() {
        return;
    }

    let queue = Rc::new(RefCell::new(jobs));
    let in_flight = Rc::new(Cell::new(0usize));
    pump_queue(tiles_signal, queue, in_flight);
}

/// Build the load queue: one job per tile across all layers, nearest to the
/// style's world center first so the initial view fills in early.
fn make_jobs(doc: &StyleDoc, config: &MapConfig) -> VecDeque<LoadJob> {
    let center = doc
        .world_bounds()
        .map(|(min_x, min_y, max_x, max_y)| ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0))
        .unwrap_or((0.0, 0.0));

    let mut jobs: Vec<LoadJob> = doc
        .layers
        .iter()
        .flat_map(|layer| layer.tiles.iter().map(move |tile| (layer, tile)))
        .enumerate()
        .map(|(id, (layer, tile))| LoadJob {
            id,
            layer: layer.id.clone(),
            url: config.tile_url(&tile.url),
            x1: tile.x1,
            y1: tile.y1,
            x2: tile.x2,
            y2: tile.y2,
        })
        .collect();

    jobs.sort_by(|a, b| {
        distance_sq_to(a, center)
            .total_cmp(&distance_sq_to(b, center))
            .then_with(|| a.id.cmp(&b.id))
    });

    jobs.into()
}

fn distance_sq_to(job: &LoadJob, center: (f64, f64)) -> f64 {
    let dx = (job.x1 + job.x2) * 0.5 - center.0;
    let dy = (job.y1 + job.y2) * 0.5 - center.1;
    dx * dx + dy * dy
}

fn pump_queue(
    tiles_signal: RwSignal<Vec<LoadedTile>>,
    queue: Rc<RefCell<VecDeque<LoadJob>>>,
    in_flight: Rc<Cell<usize>>,
) {
    while in_flight.get() < TILE_CONCURRENCY {
        let Some(job) = queue.borrow_mut().pop_front() else {
            break;
        };
        in_flight.set(in_flight.get() + 1);

        let queue_next = queue.clone();
        let in_flight_next = in_flight.clone();
        let on_done: IdleCallback = Rc::new(move || {
            in_flight_next.set(in_flight_next.get().saturating_sub(1));
            pump_queue(tiles_signal, queue_next.clone(), in_flight_next.clone());
        });

        load_tile_job(tiles_signal, job, on_done);
    }
}

fn load_tile_job(tiles_signal: RwSignal<Vec<LoadedTile>>, job: LoadJob, on_done: Rc<dyn Fn()>) {
    let img = match HtmlImageElement::new() {
        Ok(img) => img,
        Err(_) => {
            on_done();
            return;
        }
    };

    let src = job.url.clone();
    let img_for_load = img.clone();
    let on_done_load = on_done.clone();
    let onload = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_load);

        let img_for_decode = img_for_load.clone();
        let on_done_load = on_done_load.clone();
        let job = job.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let _ = JsFuture::from(img_for_decode.decode()).await;
            upsert_tile(
                tiles_signal,
                LoadedTile {
                    id: job.id,
                    layer: job.layer,
                    image: img_for_decode,
                    x1: job.x1,
                    y1: job.y1,
                    x2: job.x2,
                    y2: job.y2,
                },
            );
            on_done_load();
        });
    });

    let img_for_error = img.clone();
    let on_done_error = on_done.clone();
    let onerror = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_error);
        on_done_error();
    });

    let onload_js = onload.into_js_value();
    let onerror_js = onerror.into_js_value();
    img.set_onload(Some(onload_js.unchecked_ref()));
    img.set_onerror(Some(onerror_js.unchecked_ref()));
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONLOAD_HANDLE_KEY),
        &onload_js,
    );
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONERROR_HANDLE_KEY),
        &onerror_js,
    );
    img.set_src(&src);
}

fn clear_image_handlers(img: &HtmlImageElement) {
    img.set_onload(None);
    img.set_onerror(None);
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY));
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY));
}

fn upsert_tile(tiles_signal: RwSignal<Vec<LoadedTile>>, incoming: LoadedTile) {
    tiles_signal.update(|loaded| {
        if let Some(existing) = loaded.iter_mut().find(|tile| tile.id == incoming.id) {
            *existing = incoming;
            return;
        }

        loaded.push(incoming);
        loaded.sort_by_key(|tile| tile.id);
    });
}

#[cfg(test)]
mod tests {
    use super::make_jobs;
    use crate::config::MapConfig;
    use foodmap_shared::StyleDoc;

    fn style_doc() -> StyleDoc {
        serde_json::from_str(
            r#"{
                "layers": [
                    {
                        "id": "per-capita-consumption",
                        "tiles": [
                            { "url": "/tiles/pcc/west.webp", "x1": 0.0, "y1": 0.0, "x2": 1024.0, "y2": 1024.0 },
                            { "url": "/tiles/pcc/east.webp", "x1": 1024.0, "y1": 0.0, "x2": 2048.0, "y2": 1024.0 }
                        ]
                    },
                    {
                        "id": "total-production",
                        "tiles": [
                            { "url": "/tiles/tp/center.webp", "x1": 512.0, "y1": 0.0, "x2": 1536.0, "y2": 1024.0 }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn jobs_carry_layer_and_token_qualified_urls() {
        let config = MapConfig::new("tok").unwrap();
        let jobs = make_jobs(&style_doc(), &config);
        assert_eq!(jobs.len(), 3);
        assert!(jobs.iter().any(|job| {
            job.layer == "total-production" && job.url == "/tiles/tp/center.webp?access_token=tok"
        }));
    }

    #[test]
    fn jobs_are_ordered_nearest_to_world_center_first() {
        let config = MapConfig::new("tok").unwrap();
        let jobs = make_jobs(&style_doc(), &config);
        // The centered tile loads first; the two flanking tiles tie and keep
        // manifest order.
        assert_eq!(jobs[0].url, "/tiles/tp/center.webp?access_token=tok");
        assert_eq!(jobs[1].url, "/tiles/pcc/west.webp?access_token=tok");
        assert_eq!(jobs[2].url, "/tiles/pcc/east.webp?access_token=tok");
    }
}
