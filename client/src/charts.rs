use std::f64::consts::TAU;

use foodmap_shared::FilteredCountyStats;
use foodmap_shared::county::{FOOD_FIELDS, INCOME_FIELDS, RACE_FIELDS};

pub type Rgb = (u8, u8, u8);

// Bar chart surface: 400x300 canvas with fixed margins.
pub const BAR_CANVAS_W: f64 = 400.0;
pub const BAR_CANVAS_H: f64 = 300.0;
pub const BAR_MARGIN_TOP: f64 = 20.0;
pub const BAR_MARGIN_RIGHT: f64 = 20.0;
pub const BAR_MARGIN_BOTTOM: f64 = 30.0;
pub const BAR_MARGIN_LEFT: f64 = 50.0;
pub const BAR_PLOT_W: f64 = BAR_CANVAS_W - BAR_MARGIN_LEFT - BAR_MARGIN_RIGHT;
pub const BAR_PLOT_H: f64 = BAR_CANVAS_H - BAR_MARGIN_TOP - BAR_MARGIN_BOTTOM;
const BAR_BAND_PADDING: f64 = 0.1;

pub const BAR_AXIS_TITLE: &str = "KCal / person / day";

// Pie surfaces: both pies share a 300x150 plot box inside their canvas.
pub const PIE_CANVAS_W: f64 = 400.0;
pub const RACE_CANVAS_H: f64 = 200.0;
pub const INCOME_CANVAS_H: f64 = 300.0;
pub const PIE_MARGIN_LEFT: f64 = 50.0;
pub const PIE_PLOT_W: f64 = 300.0 - PIE_MARGIN_LEFT - 20.0;
pub const PIE_PLOT_H: f64 = 150.0;
pub const PIE_RADIUS: f64 = PIE_PLOT_H / 2.0;
pub const PIE_CENTER_X: f64 = PIE_PLOT_W / 2.0;
pub const PIE_CENTER_Y: f64 = PIE_PLOT_H / 2.0 + 20.0;

const LEGEND_ROW_PITCH: f64 = 15.0;
const LEGEND_TOP: f64 = 20.0;
pub const LEGEND_SWATCH: f64 = 10.0;

/// Fixed food-category palette for the bar chart.
const FOOD_COLORS: [Rgb; 5] = [
    (0x8B, 0x49, 0x6E), // fruit
    (0xE3, 0xD3, 0x7C), // grain
    (0xD9, 0x8A, 0x5D), // nuts
    (0xBD, 0x40, 0x44), // potatoes
    (0x1A, 0x54, 0x41), // vegetables
];

/// Category → axis display name; unknown keys fall back to the raw key.
const FOOD_DISPLAY: [&str; 5] = ["Fruits", "Grains", "Nuts", "Potatoes", "Vegetables"];

pub fn food_display_name(field: &str) -> &str {
    FOOD_FIELDS
        .iter()
        .position(|&f| f == field)
        .map_or(field, |idx| FOOD_DISPLAY[idx])
}

fn food_color(field: &str) -> Rgb {
    FOOD_FIELDS
        .iter()
        .position(|&f| f == field)
        .map_or((0, 0, 0), |idx| FOOD_COLORS[idx])
}

/// One pie input slot: county property, legend display name, wedge color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieSlot {
    pub field: &'static str,
    pub label: &'static str,
    pub color: Rgb,
}

pub const RACE_SLOTS: [PieSlot; 3] = [
    PieSlot {
        field: RACE_FIELDS[0],
        label: "Black",
        color: (0x22, 0x28, 0x36),
    },
    PieSlot {
        field: RACE_FIELDS[1],
        label: "Hispanic / Latino",
        color: (0x8B, 0x49, 0x6E),
    },
    PieSlot {
        field: RACE_FIELDS[2],
        label: "White",
        color: (0x63, 0x9C, 0xA1),
    },
];

pub const INCOME_SLOTS: [PieSlot; 2] = [
    PieSlot {
        field: INCOME_FIELDS[0],
        label: "Low Income",
        color: (0xE3, 0xD3, 0x7C),
    },
    PieSlot {
        field: INCOME_FIELDS[1],
        label: "High Income",
        color: (0x1A, 0x54, 0x41),
    },
];

/// Percentage-label distance from the pie center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelRadius {
    /// `radius + offset + value`: the race pie nudges labels out
    /// proportionally to the wedge's value.
    ValueOffset(f64),
    /// `radius + offset`, value-independent (income pie).
    Fixed(f64),
}

pub const RACE_LABEL_RADIUS: LabelRadius = LabelRadius::ValueOffset(16.0);
pub const INCOME_LABEL_RADIUS: LabelRadius = LabelRadius::Fixed(18.0);

/// One laid-out bar, positioned relative to the plot origin (inside margins).
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub field: &'static str,
    pub label: &'static str,
    pub value: f64,
    pub color: Rgb,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Lay out the food-source bar chart: five fixed categories sorted
/// descending by value, band-scaled horizontally, linear from 0 to the max
/// value vertically. All-zero input yields five zero-height bars.
pub fn bar_layout(stats: &FilteredCountyStats) -> Vec<Bar> {
    let mut categories: Vec<(&'static str, f64)> = FOOD_FIELDS
        .iter()
        .map(|&field| (field, stats.number(field)))
        .collect();
    categories.sort_by(|a, b| b.1.total_cmp(&a.1));

    let max = categories
        .iter()
        .map(|&(_, value)| value)
        .fold(0.0_f64, f64::max);

    let n = categories.len() as f64;
    let step = BAR_PLOT_W / (n + BAR_BAND_PADDING);
    let bandwidth = step * (1.0 - BAR_BAND_PADDING);

    categories
        .into_iter()
        .enumerate()
        .map(|(i, (field, value))| {
            let height = if max > 0.0 {
                value / max * BAR_PLOT_H
            } else {
                0.0
            };
            Bar {
                field,
                label: food_display_name(field),
                value,
                color: food_color(field),
                x: step * BAR_BAND_PADDING + i as f64 * step,
                y: BAR_PLOT_H - height,
                width: bandwidth,
                height,
            }
        })
        .collect()
}

/// Tick values for a linear axis from 0 to `max`, stepping by a nice
/// 1/2/5 multiple so roughly `target` ticks fit.
pub fn linear_ticks(max: f64, target: usize) -> Vec<f64> {
    if max <= 0.0 || target == 0 {
        return vec![0.0];
    }
    let raw = max / target as f64;
    let magnitude = 10.0_f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let step = magnitude
        * if residual > 5.0 {
            10.0
        } else if residual > 2.0 {
            5.0
        } else if residual > 1.0 {
            2.0
        } else {
            1.0
        };

    let mut ticks = Vec::new();
    let mut tick = 0.0;
    while tick <= max * (1.0 + 1e-9) {
        ticks.push(tick);
        tick += step;
    }
    ticks
}

/// One laid-out pie wedge. Angles are radians clockwise from 12 o'clock;
/// label coordinates are relative to the pie center.
#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
    pub field: &'static str,
    pub label: &'static str,
    pub value: f64,
    pub color: Rgb,
    pub start_angle: f64,
    pub end_angle: f64,
    pub pct_label: String,
    pub label_x: f64,
    pub label_y: f64,
}

/// Lay out a pie: wedges ordered descending by value starting at 12 o'clock
/// clockwise, percentage label on each wedge's bisecting angle. Zero-sum
/// input yields no wedges (the legend is still drawn by the caller).
pub fn pie_layout(
    slots: &[PieSlot],
    stats: &FilteredCountyStats,
    radius: f64,
    label_radius: LabelRadius,
) -> Vec<Wedge> {
    let mut values: Vec<(PieSlot, f64)> = slots
        .iter()
        .map(|&slot| (slot, stats.number(slot.field)))
        .collect();
    values.sort_by(|a, b| b.1.total_cmp(&a.1));

    let total: f64 = values.iter().map(|&(_, value)| value).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut angle = 0.0;
    values
        .into_iter()
        .map(|(slot, value)| {
            let start_angle = angle;
            let end_angle = angle + value / total * TAU;
            angle = end_angle;

            let distance = match label_radius {
                LabelRadius::ValueOffset(offset) => radius + offset + value,
                LabelRadius::Fixed(offset) => radius + offset,
            };
            let bisect = (start_angle + end_angle) / 2.0;

            Wedge {
                field: slot.field,
                label: slot.label,
                value,
                color: slot.color,
                start_angle,
                end_angle,
                pct_label: format!("{:.2}%", value * 100.0),
                label_x: distance * bisect.sin(),
                label_y: -distance * bisect.cos(),
            }
        })
        .collect()
}

/// One legend row, positioned relative to the pie canvas origin. Rows keep
/// slot order (not wedge order) so swatch colors line up with the palette.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendRow {
    pub label: &'static str,
    pub color: Rgb,
    pub x: f64,
    pub y: f64,
}

pub fn legend_rows(slots: &[PieSlot]) -> Vec<LegendRow> {
    slots
        .iter()
        .enumerate()
        .map(|(i, slot)| LegendRow {
            label: slot.label,
            color: slot.color,
            x: PIE_PLOT_W,
            y: i as f64 * LEGEND_ROW_PITCH + LEGEND_TOP,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        BAR_PLOT_H, INCOME_LABEL_RADIUS, INCOME_SLOTS, LabelRadius, PIE_RADIUS, RACE_LABEL_RADIUS,
        RACE_SLOTS, bar_layout, legend_rows, linear_ticks, pie_layout,
    };
    use foodmap_shared::{FilteredCountyStats, filter_stats};
    use serde_json::json;
    use std::f64::consts::TAU;

    fn stats(pairs: &[(&str, f64)]) -> FilteredCountyStats {
        let props = pairs
            .iter()
            .map(|&(field, value)| (field.to_string(), json!(value)))
            .collect();
        filter_stats(Some(&props)).unwrap()
    }

    fn food_stats() -> FilteredCountyStats {
        stats(&[
            ("kcal_consumed_fruit", 10.0),
            ("kcal_consumed_grain", 30.0),
            ("kcal_consumed_nuts", 5.0),
            ("kcal_consumed_potatoes", 20.0),
            ("kcal_consumed_vegetables", 15.0),
        ])
    }

    #[test]
    fn bars_are_sorted_descending_by_value() {
        let labels: Vec<&str> = bar_layout(&food_stats())
            .iter()
            .map(|bar| bar.label)
            .collect();
        assert_eq!(
            labels,
            vec!["Grains", "Potatoes", "Vegetables", "Fruits", "Nuts"]
        );
    }

    #[test]
    fn tallest_bar_reaches_the_plot_top() {
        let bars = bar_layout(&food_stats());
        assert!((bars[0].y).abs() < 1e-9);
        assert!((bars[0].height - BAR_PLOT_H).abs() < 1e-9);
        // Half the max value gives half the height.
        assert!((bars[2].height - BAR_PLOT_H / 2.0).abs() < 1e-9);
    }

    #[test]
    fn bars_do_not_overlap_and_stay_in_the_plot() {
        let bars = bar_layout(&food_stats());
        for pair in bars.windows(2) {
            assert!(pair[0].x + pair[0].width < pair[1].x);
        }
        let last = bars.last().unwrap();
        assert!(last.x + last.width <= super::BAR_PLOT_W + 1e-9);
    }

    #[test]
    fn missing_categories_lay_out_as_zero_height_bars() {
        let bars = bar_layout(&stats(&[("kcal_consumed_grain", 30.0)]));
        assert_eq!(bars.len(), 5);
        assert_eq!(bars[0].label, "Grains");
        for bar in &bars[1..] {
            assert_eq!(bar.height, 0.0);
        }
    }

    #[test]
    fn all_zero_bars_do_not_divide_by_zero() {
        let bars = bar_layout(&stats(&[]));
        for bar in bars {
            assert_eq!(bar.height, 0.0);
            assert_eq!(bar.y, BAR_PLOT_H);
        }
    }

    #[test]
    fn layout_is_idempotent() {
        assert_eq!(bar_layout(&food_stats()), bar_layout(&food_stats()));
        let wedges = |s: &FilteredCountyStats| {
            pie_layout(&RACE_SLOTS, s, PIE_RADIUS, RACE_LABEL_RADIUS)
        };
        let race = stats(&[("pct_black", 0.2), ("pct_hispanic_latino", 0.3), ("pct_white", 0.5)]);
        assert_eq!(wedges(&race), wedges(&race));
    }

    #[test]
    fn race_wedge_labels_sum_to_one_hundred_percent() {
        let race = stats(&[
            ("pct_black", 0.2),
            ("pct_hispanic_latino", 0.3),
            ("pct_white", 0.5),
        ]);
        let wedges = pie_layout(&RACE_SLOTS, &race, PIE_RADIUS, RACE_LABEL_RADIUS);
        let sum: f64 = wedges
            .iter()
            .map(|w| w.pct_label.trim_end_matches('%').parse::<f64>().unwrap())
            .sum();
        assert!((sum - 100.0).abs() < 0.01);
    }

    #[test]
    fn wedges_are_descending_and_cover_the_full_turn() {
        let race = stats(&[
            ("pct_black", 0.2),
            ("pct_hispanic_latino", 0.3),
            ("pct_white", 0.5),
        ]);
        let wedges = pie_layout(&RACE_SLOTS, &race, PIE_RADIUS, RACE_LABEL_RADIUS);
        assert_eq!(wedges[0].label, "White");
        assert_eq!(wedges[1].label, "Hispanic / Latino");
        assert_eq!(wedges[2].label, "Black");
        assert!((wedges[0].start_angle).abs() < 1e-9);
        assert!((wedges[2].end_angle - TAU).abs() < 1e-9);
        for pair in wedges.windows(2) {
            assert!((pair[0].end_angle - pair[1].start_angle).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_sum_pie_renders_no_wedges() {
        let empty = stats(&[]);
        assert!(pie_layout(&RACE_SLOTS, &empty, PIE_RADIUS, RACE_LABEL_RADIUS).is_empty());
        let zeros = stats(&[("pct_low_income", 0.0), ("pct_high_income", 0.0)]);
        assert!(pie_layout(&INCOME_SLOTS, &zeros, PIE_RADIUS, INCOME_LABEL_RADIUS).is_empty());
    }

    #[test]
    fn label_distance_is_value_proportional_only_for_the_race_pie() {
        let race = stats(&[
            ("pct_black", 0.2),
            ("pct_hispanic_latino", 0.3),
            ("pct_white", 0.5),
        ]);
        let wedges = pie_layout(&RACE_SLOTS, &race, PIE_RADIUS, RACE_LABEL_RADIUS);
        let white = &wedges[0];
        let distance = (white.label_x * white.label_x + white.label_y * white.label_y).sqrt();
        assert!((distance - (PIE_RADIUS + 16.0 + 0.5)).abs() < 1e-9);

        let income = stats(&[("pct_low_income", 0.6), ("pct_high_income", 0.4)]);
        let wedges = pie_layout(&INCOME_SLOTS, &income, PIE_RADIUS, INCOME_LABEL_RADIUS);
        for wedge in &wedges {
            let distance = (wedge.label_x * wedge.label_x + wedge.label_y * wedge.label_y).sqrt();
            assert!((distance - (PIE_RADIUS + 18.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn single_nonzero_wedge_takes_the_whole_pie() {
        let income = stats(&[("pct_low_income", 1.0)]);
        let wedges = pie_layout(&INCOME_SLOTS, &income, PIE_RADIUS, INCOME_LABEL_RADIUS);
        assert_eq!(wedges.len(), 2);
        assert!((wedges[0].end_angle - TAU).abs() < 1e-9);
        assert_eq!(wedges[1].pct_label, "0.00%");
    }

    #[test]
    fn legend_rows_keep_slot_order_with_fixed_pitch() {
        let rows = legend_rows(&RACE_SLOTS);
        assert_eq!(rows[0].label, "Black");
        assert_eq!(rows[1].label, "Hispanic / Latino");
        assert_eq!(rows[2].label, "White");
        assert_eq!(rows[0].y, 20.0);
        assert_eq!(rows[1].y, 35.0);
        assert_eq!(rows[2].y, 50.0);
    }

    #[test]
    fn linear_ticks_use_nice_steps_and_cover_zero_to_max() {
        assert_eq!(
            linear_ticks(30.0, 10),
            vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0]
        );
        assert_eq!(linear_ticks(0.0, 10), vec![0.0]);
        let ticks = linear_ticks(847.0, 10);
        assert_eq!(ticks.first(), Some(&0.0));
        assert!(*ticks.last().unwrap() <= 847.0);
        assert!(ticks.len() > 4);
    }

    #[test]
    fn label_radius_variants_compare_by_value() {
        assert_eq!(RACE_LABEL_RADIUS, LabelRadius::ValueOffset(16.0));
        assert_eq!(INCOME_LABEL_RADIUS, LabelRadius::Fixed(18.0));
    }
}
