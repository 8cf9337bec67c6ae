use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, PointerEvent, WheelEvent};

use crate::app::{HoverState, HoveredCounty};
use crate::counties::CountyIndex;
use crate::render_loop::RenderScheduler;
use crate::spatial::SpatialGrid;
use crate::style::MapStyle;
use crate::tiles::LoadedTile;
use crate::viewport::Viewport;

/// Render scale for supersampling: at least 2x for crisp output, or native
/// DPR if higher.
pub(crate) fn render_scale() -> f64 {
    let dpr = web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0);
    dpr.max(2.0)
}

struct ResizeBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

fn clamp_viewport(vp: &mut Viewport, style: &MapStyle, canvas: &HtmlCanvasElement) {
    if let Some((min_x, min_y, max_x, max_y)) = style.world_bounds() {
        let rect = canvas.get_bounding_client_rect();
        vp.clamp_to_bounds(min_x, min_y, max_x, max_y, rect.width(), rect.height());
    }
}

/// Choropleth map canvas. Draws the style's layers back-to-front (the
/// selected view's layer sits on top) and feeds hover state to the rest of
/// the app; it does not render the tooltip itself.
#[component]
pub fn MapCanvas() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let HoveredCounty(hovered) = expect_context();
    let style: RwSignal<MapStyle> = expect_context();
    let loaded_tiles: RwSignal<Vec<LoadedTile>> = expect_context();
    let counties: RwSignal<CountyIndex> = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    // Drag state
    let is_dragging = Rc::new(Cell::new(false));
    let last_x = Rc::new(Cell::new(0.0f64));
    let last_y = Rc::new(Cell::new(0.0f64));

    // Spatial grid for O(1) hover hit-testing, rebuilt when the index loads
    let spatial_grid: Rc<RefCell<SpatialGrid>> = Rc::new(RefCell::new(SpatialGrid::build(
        &CountyIndex::default(),
    )));
    Effect::new({
        let grid = spatial_grid.clone();
        move || {
            counties.with(|index| {
                *grid.borrow_mut() = SpatialGrid::build(index);
            });
        }
    });

    // Fit the viewport to the tiled extent once, when the style arrives
    let fitted = Rc::new(Cell::new(false));

    let fitted_render = fitted.clone();
    let scheduler = Rc::new(RenderScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let canvas: &HtmlCanvasElement = &canvas;
        let Some(parent) = canvas.parent_element() else {
            return;
        };
        let w = parent.client_width().max(0) as f64;
        let h = parent.client_height().max(0) as f64;
        if w == 0.0 || h == 0.0 {
            return;
        }

        let scale = render_scale();
        let pw = (w * scale).round() as u32;
        let ph = (h * scale).round() as u32;
        if canvas.width() != pw || canvas.height() != ph {
            canvas.set_width(pw);
            canvas.set_height(ph);
        }

        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            return;
        };
        ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0).ok();

        if !fitted_render.get()
            && let Some((min_x, min_y, max_x, max_y)) = style.with_untracked(MapStyle::world_bounds)
        {
            fitted_render.set(true);
            viewport.update(|vp| {
                vp.fit_bounds(min_x, min_y, max_x, max_y, w, h);
            });
            // The viewport change schedules the actual paint.
            return;
        }

        let vp = viewport.get_untracked();

        ctx.set_fill_style_str("#0c0e17");
        ctx.fill_rect(0.0, 0.0, w, h);

        style.with_untracked(|style| {
            loaded_tiles.with_untracked(|tiles| {
                for layer in style.draw_order() {
                    for tile in tiles.iter().filter(|tile| &tile.layer == layer) {
                        let (sx, sy) =
                            vp.world_to_screen(tile.x1.min(tile.x2), tile.y1.min(tile.y2));
                        let sw = (tile.x2 - tile.x1).abs() * vp.scale;
                        let sh = (tile.y2 - tile.y1).abs() * vp.scale;
                        if sx + sw < 0.0 || sy + sh < 0.0 || sx > w || sy > h {
                            continue;
                        }
                        ctx.draw_image_with_html_image_element_and_dw_and_dh(
                            &tile.image,
                            sx,
                            sy,
                            sw,
                            sh,
                        )
                        .ok();
                    }
                }
            });
        });
    }));

    // Repaint whenever the viewport, tiles, or layer order change
    Effect::new({
        let scheduler = scheduler.clone();
        move || {
            viewport.track();
            loaded_tiles.track();
            style.track();
            scheduler.mark_dirty();
        }
    });

    // Repaint on window resize so the canvas tracks its container
    Effect::new({
        let scheduler = scheduler.clone();
        move || {
            let Some(window) = web_sys::window() else {
                return;
            };

            RESIZE_BINDING.with(|slot| {
                if let Some(old) = slot.borrow_mut().take() {
                    let _ = old.window.remove_event_listener_with_callback(
                        "resize",
                        old._handler.as_ref().unchecked_ref(),
                    );
                }
            });

            let handler = Closure::<dyn Fn()>::new({
                let scheduler = scheduler.clone();
                move || scheduler.mark_dirty()
            });
            if window
                .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
                .is_ok()
            {
                RESIZE_BINDING.with(|slot| {
                    *slot.borrow_mut() = Some(ResizeBinding {
                        window: window.clone(),
                        _handler: handler,
                    });
                });
            }
        }
    });

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            is_dragging.set(true);
            last_x.set(e.client_x() as f64);
            last_y.set(e.client_y() as f64);
            if let Some(el) = e
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            {
                el.set_pointer_capture(e.pointer_id()).ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        let grid = spatial_grid.clone();
        move |e: PointerEvent| {
            let x = e.client_x() as f64;
            let y = e.client_y() as f64;

            if is_dragging.get() {
                let dx = x - last_x.get();
                let dy = y - last_y.get();
                last_x.set(x);
                last_y.set(y);
                if let Some(canvas) = canvas_ref.get_untracked() {
                    viewport.update(|vp| {
                        vp.pan(dx, dy);
                        style.with_untracked(|style| clamp_viewport(vp, style, &canvas));
                    });
                }
                return;
            }

            // Hover hit test. Pointer position and county properties are
            // replaced together as one value (or cleared together).
            let Some(canvas) = canvas_ref.get_untracked() else {
                return;
            };
            let rect = canvas.get_bounding_client_rect();
            let vp = viewport.get_untracked();
            let (wx, wy) = vp.screen_to_world(x - rect.left(), y - rect.top());
            let feature = grid
                .borrow()
                .find_at(wx, wy)
                .and_then(|idx| counties.with_untracked(|index| index.get(idx).cloned()));
            match feature {
                Some(feature) => hovered.set(Some(HoverState {
                    pointer: (x, y),
                    properties: feature.properties,
                })),
                None => {
                    if hovered.with_untracked(Option::is_some) {
                        hovered.set(None);
                    }
                }
            }
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        move |_e: PointerEvent| {
            is_dragging.set(false);
        }
    };

    let on_pointer_leave = {
        let is_dragging = is_dragging.clone();
        move |_e: PointerEvent| {
            is_dragging.set(false);
            hovered.set(None);
        }
    };

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let rect = canvas.get_bounding_client_rect();
        let cx = e.client_x() as f64 - rect.left();
        let cy = e.client_y() as f64 - rect.top();
        viewport.update(|vp| {
            vp.zoom_at(e.delta_y(), cx, cy);
            style.with_untracked(|style| clamp_viewport(vp, style, &canvas));
        });
    };

    view! {
        <canvas
            node_ref=canvas_ref
            style="position: absolute; inset: 0; width: 100%; height: 100%; display: block; cursor: crosshair; touch-action: none;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointerleave=on_pointer_leave
        />
    }
}
