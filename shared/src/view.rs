use serde::{Deserialize, Serialize};

/// The statistic currently driving map coloring and tooltip/legend content.
/// Wire names double as the layer identifiers in the tile service's style
/// document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewSelection {
    TotalProduction,
    TotalConsumption,
    PerCapitaProduction,
    #[default]
    PerCapitaConsumption,
}

impl ViewSelection {
    pub const ALL: [ViewSelection; 4] = [
        ViewSelection::TotalProduction,
        ViewSelection::TotalConsumption,
        ViewSelection::PerCapitaProduction,
        ViewSelection::PerCapitaConsumption,
    ];

    /// Layer identifier in the style document (also the select-control value).
    pub const fn layer_id(self) -> &'static str {
        match self {
            ViewSelection::TotalProduction => "total-production",
            ViewSelection::TotalConsumption => "total-consumption",
            ViewSelection::PerCapitaProduction => "per-capita-production",
            ViewSelection::PerCapitaConsumption => "per-capita-consumption",
        }
    }

    /// County property holding this view's statistic value.
    pub const fn stat_field(self) -> &'static str {
        match self {
            ViewSelection::TotalProduction => "total_kcal_produced",
            ViewSelection::TotalConsumption => "total_kcal_consumed",
            ViewSelection::PerCapitaProduction => "kcal_produced_per_capita_per_day",
            ViewSelection::PerCapitaConsumption => "kcal_consumed_per_capita_per_day",
        }
    }

    pub const fn hover_label(self) -> &'static str {
        match self {
            ViewSelection::TotalProduction => "Total Production",
            ViewSelection::TotalConsumption => "Total Consumption",
            ViewSelection::PerCapitaProduction => "Per Capita Production",
            ViewSelection::PerCapitaConsumption => "Per Capita Consumption",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            ViewSelection::TotalProduction | ViewSelection::TotalConsumption => "Kcal/year",
            ViewSelection::PerCapitaProduction | ViewSelection::PerCapitaConsumption => {
                "Kcal/person/day"
            }
        }
    }

    /// Label shown in the view select control.
    pub const fn option_label(self) -> &'static str {
        match self {
            ViewSelection::TotalProduction => "Total Production (kcal/year)",
            ViewSelection::TotalConsumption => "Total Consumption (kcal/year)",
            ViewSelection::PerCapitaProduction => "Per Capita Production (kcal/person/day)",
            ViewSelection::PerCapitaConsumption => "Per Capita Consumption (kcal/person/day)",
        }
    }

    /// Static (max, min) legend labels for this view's known data range.
    /// Baked constants, not computed from data.
    pub const fn legend_bounds(self) -> (&'static str, &'static str) {
        match self {
            ViewSelection::TotalProduction => ("1.04T Kcal/year", "0 Kcal/year"),
            ViewSelection::TotalConsumption => ("3.01T Kcal/year", "25.63M Kcal/year"),
            ViewSelection::PerCapitaProduction => {
                ("660069.70 Kcal/person/day", "0 Kcal/person/day")
            }
            ViewSelection::PerCapitaConsumption => {
                ("846.03 KCal/person/day", "782.01 KCal/person/day")
            }
        }
    }

    pub fn from_layer_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.layer_id() == id)
    }
}

/// Resolved display metadata for a view identifier string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewMetadata {
    pub field: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
}

/// Resolve a view identifier to its stat field, hover label, and unit.
/// Unknown identifiers resolve to all-empty fields, not an error.
pub fn resolve_view_metadata(id: &str) -> ViewMetadata {
    match ViewSelection::from_layer_id(id) {
        Some(view) => ViewMetadata {
            field: view.stat_field(),
            label: view.hover_label(),
            unit: view.unit(),
        },
        None => ViewMetadata::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ViewMetadata, ViewSelection, resolve_view_metadata};

    #[test]
    fn every_view_resolves_to_non_empty_metadata() {
        for view in ViewSelection::ALL {
            let meta = resolve_view_metadata(view.layer_id());
            assert!(!meta.field.is_empty(), "{}", view.layer_id());
            assert!(!meta.label.is_empty(), "{}", view.layer_id());
            assert!(!meta.unit.is_empty(), "{}", view.layer_id());
        }
    }

    #[test]
    fn unknown_identifier_resolves_to_empty_metadata() {
        assert_eq!(resolve_view_metadata("population"), ViewMetadata::default());
        assert_eq!(resolve_view_metadata(""), ViewMetadata::default());
    }

    #[test]
    fn layer_ids_round_trip() {
        for view in ViewSelection::ALL {
            assert_eq!(ViewSelection::from_layer_id(view.layer_id()), Some(view));
        }
        assert_eq!(ViewSelection::from_layer_id("per-capita"), None);
    }

    #[test]
    fn default_view_is_per_capita_consumption() {
        assert_eq!(
            ViewSelection::default(),
            ViewSelection::PerCapitaConsumption
        );
    }

    #[test]
    fn every_view_has_legend_bounds() {
        for view in ViewSelection::ALL {
            let (max, min) = view.legend_bounds();
            assert!(!max.is_empty());
            assert!(!min.is_empty());
        }
    }
}
