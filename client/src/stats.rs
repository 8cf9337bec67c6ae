use std::f64::consts::FRAC_PI_2;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use foodmap_shared::FilteredCountyStats;

use crate::app::CountyStats;
use crate::charts::{
    BAR_AXIS_TITLE, BAR_CANVAS_H, BAR_CANVAS_W, BAR_MARGIN_LEFT, BAR_MARGIN_TOP, BAR_PLOT_H,
    BAR_PLOT_W, INCOME_CANVAS_H, INCOME_LABEL_RADIUS, INCOME_SLOTS, LEGEND_SWATCH, PIE_CANVAS_W,
    PIE_CENTER_X, PIE_CENTER_Y, PIE_RADIUS, PieSlot, RACE_CANVAS_H, RACE_LABEL_RADIUS, RACE_SLOTS,
    bar_layout, legend_rows, linear_ticks, pie_layout,
};
use crate::colors::rgba_css;
use crate::map::render_scale;

const TEXT_COLOR: &str = "#e2e0d8";
const AXIS_COLOR: &str = "#5a5860";
const TICK_FONT: &str = "11px 'JetBrains Mono', monospace";
const LABEL_FONT: &str = "12px 'Inter', system-ui, sans-serif";
const AXIS_TITLE_FONT: &str = "10px 'Inter', system-ui, sans-serif";

/// Statistics panel: one bar chart and two pie charts for the hovered
/// county, fully redrawn from scratch on every hover change.
#[component]
pub fn StatsPanel() -> impl IntoView {
    let CountyStats(stats) = expect_context();

    let bar_ref = NodeRef::<leptos::html::Canvas>::new();
    let race_ref = NodeRef::<leptos::html::Canvas>::new();
    let income_ref = NodeRef::<leptos::html::Canvas>::new();

    // Full-redraw pass: clears all three surfaces before drawing, so
    // repeated renders with the same input are idempotent.
    Effect::new(move || {
        let Some(stats) = stats.get() else {
            return;
        };
        let (Some(bar), Some(race), Some(income)) =
            (bar_ref.get(), race_ref.get(), income_ref.get())
        else {
            return;
        };
        if let Some(ctx) = prepare_surface(&bar, BAR_CANVAS_W, BAR_CANVAS_H) {
            draw_bar_chart(&ctx, &stats);
        }
        if let Some(ctx) = prepare_surface(&race, PIE_CANVAS_W, RACE_CANVAS_H) {
            draw_pie_chart(&ctx, &RACE_SLOTS, &stats, RACE_LABEL_RADIUS);
        }
        if let Some(ctx) = prepare_surface(&income, PIE_CANVAS_W, INCOME_CANVAS_H) {
            draw_pie_chart(&ctx, &INCOME_SLOTS, &stats, INCOME_LABEL_RADIUS);
        }
    });

    view! {
        <div style="width: 440px; flex-shrink: 0; padding: 16px 20px; background: #13161f; border-left: 1px solid #282c3e; overflow-y: auto; font-family: 'Inter', system-ui, sans-serif; color: #e2e0d8;">
            {move || {
                if let Some(stats) = stats.get() {
                    view! {
                        <div>
                            <h3 style="margin: 0 0 8px; font-size: 1.05rem;">{stats.display_name().to_string()}</h3>
                            <h4 style="margin: 0 0 6px; color: #9a9590;">"Food Sources:"</h4>
                            <canvas node_ref=bar_ref width="400" height="300" style="width: 400px; height: 300px;" />
                            <h4 style="margin: 10px 0 6px; color: #9a9590;">"Racial Demographics:"</h4>
                            <canvas node_ref=race_ref width="400" height="200" style="width: 400px; height: 200px;" />
                            <h4 style="margin: 10px 0 6px; color: #9a9590;">"Income Disparity:"</h4>
                            <canvas node_ref=income_ref width="400" height="300" style="width: 400px; height: 300px;" />
                        </div>
                    }
                    .into_any()
                } else {
                    view! {
                        <div style="padding-top: 32px; color: #5a5860;">
                            <i>"Hover over a county to view its stats"</i>
                        </div>
                    }
                    .into_any()
                }
            }}
        </div>
    }
}

/// Resize the canvas for the device pixel ratio and clear it. Resetting the
/// bitmap width also drops all prior drawn content.
fn prepare_surface(
    canvas: &HtmlCanvasElement,
    css_w: f64,
    css_h: f64,
) -> Option<CanvasRenderingContext2d> {
    let scale = render_scale();
    canvas.set_width((css_w * scale) as u32);
    canvas.set_height((css_h * scale) as u32);
    let ctx = canvas
        .get_context("2d")
        .ok()??
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()?;
    ctx.scale(scale, scale).ok()?;
    ctx.clear_rect(0.0, 0.0, css_w, css_h);
    Some(ctx)
}

fn draw_bar_chart(ctx: &CanvasRenderingContext2d, stats: &FilteredCountyStats) {
    let bars = bar_layout(stats);
    let max = bars.iter().map(|bar| bar.value).fold(0.0_f64, f64::max);

    ctx.save();
    let _ = ctx.translate(BAR_MARGIN_LEFT, BAR_MARGIN_TOP);

    for bar in &bars {
        let (r, g, b) = bar.color;
        ctx.set_fill_style_str(&rgba_css(r, g, b, 1.0));
        ctx.fill_rect(bar.x, bar.y, bar.width, bar.height);
    }

    // Axis lines
    ctx.set_stroke_style_str(AXIS_COLOR);
    ctx.begin_path();
    ctx.move_to(0.0, 0.0);
    ctx.line_to(0.0, BAR_PLOT_H);
    ctx.line_to(BAR_PLOT_W, BAR_PLOT_H);
    ctx.stroke();

    // Category tick labels under each bar
    ctx.set_fill_style_str(TEXT_COLOR);
    ctx.set_font(TICK_FONT);
    ctx.set_text_align("center");
    for bar in &bars {
        ctx.fill_text(bar.label, bar.x + bar.width / 2.0, BAR_PLOT_H + 14.0)
            .ok();
    }

    // Value ticks on the left axis
    ctx.set_text_align("right");
    for tick in linear_ticks(max, 10) {
        let y = if max > 0.0 {
            BAR_PLOT_H - tick / max * BAR_PLOT_H
        } else {
            BAR_PLOT_H
        };
        ctx.begin_path();
        ctx.move_to(-6.0, y);
        ctx.line_to(0.0, y);
        ctx.stroke();
        ctx.fill_text(&tick_label(tick), -9.0, y + 3.0).ok();
    }

    // Rotated axis title along the left edge
    ctx.save();
    ctx.rotate(-FRAC_PI_2).ok();
    ctx.set_font(AXIS_TITLE_FONT);
    ctx.set_text_align("right");
    ctx.fill_text(BAR_AXIS_TITLE, 0.0, -35.0).ok();
    ctx.restore();

    ctx.restore();
}

fn draw_pie_chart(
    ctx: &CanvasRenderingContext2d,
    slots: &[PieSlot],
    stats: &FilteredCountyStats,
    label_radius: crate::charts::LabelRadius,
) {
    let wedges = pie_layout(slots, stats, PIE_RADIUS, label_radius);

    // Canvas angles start at 3 o'clock; wedge angles at 12 o'clock.
    for wedge in &wedges {
        let (r, g, b) = wedge.color;
        ctx.set_fill_style_str(&rgba_css(r, g, b, 1.0));
        ctx.begin_path();
        ctx.move_to(PIE_CENTER_X, PIE_CENTER_Y);
        ctx.arc(
            PIE_CENTER_X,
            PIE_CENTER_Y,
            PIE_RADIUS,
            wedge.start_angle - FRAC_PI_2,
            wedge.end_angle - FRAC_PI_2,
        )
        .ok();
        ctx.close_path();
        ctx.fill();
    }

    ctx.set_fill_style_str(TEXT_COLOR);
    ctx.set_font(LABEL_FONT);
    ctx.set_text_align("center");
    for wedge in &wedges {
        ctx.fill_text(
            &wedge.pct_label,
            PIE_CENTER_X + wedge.label_x,
            PIE_CENTER_Y + wedge.label_y + 4.0,
        )
        .ok();
    }

    // Legend always draws, wedges or not (zero-sum input renders no
    // geometry but keeps the key visible).
    ctx.set_text_align("left");
    for row in legend_rows(slots) {
        let (r, g, b) = row.color;
        ctx.set_fill_style_str(&rgba_css(r, g, b, 1.0));
        ctx.fill_rect(row.x, row.y, LEGEND_SWATCH, LEGEND_SWATCH);
        ctx.set_fill_style_str(TEXT_COLOR);
        ctx.fill_text(row.label, row.x + 11.0, row.y + 10.0).ok();
    }
}

fn tick_label(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
