use serde::Deserialize;
use serde_json::Value;

/// Property carrying the county display name.
pub const DISPLAY_NAME_FIELD: &str = "geographic_area_name";

/// Food-category kcal fields driving the bar chart.
pub const FOOD_FIELDS: [&str; 5] = [
    "kcal_consumed_fruit",
    "kcal_consumed_grain",
    "kcal_consumed_nuts",
    "kcal_consumed_potatoes",
    "kcal_consumed_vegetables",
];

/// Racial demographic percentage fields driving the first pie chart.
pub const RACE_FIELDS: [&str; 3] = ["pct_black", "pct_hispanic_latino", "pct_white"];

/// Income percentage fields driving the second pie chart.
pub const INCOME_FIELDS: [&str; 2] = ["pct_low_income", "pct_high_income"];

/// Allow-list of properties the stats panel consumes.
pub const STATS_FIELDS: [&str; 11] = [
    "kcal_consumed_fruit",
    "kcal_consumed_grain",
    "kcal_consumed_nuts",
    "kcal_consumed_potatoes",
    "kcal_consumed_vegetables",
    DISPLAY_NAME_FIELD,
    "pct_black",
    "pct_hispanic_latino",
    "pct_white",
    "pct_low_income",
    "pct_high_income",
];

/// One county's feature properties as supplied by the tile service: a flat
/// field-name → JSON-scalar mapping. Absent fields are never an error;
/// accessors return `Option` and callers degrade to empty output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct CountyProperties(serde_json::Map<String, Value>);

impl CountyProperties {
    pub fn number(&self, field: &str) -> Option<f64> {
        self.0.get(field).and_then(Value::as_f64)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn display_name(&self) -> &str {
        self.text(DISPLAY_NAME_FIELD).unwrap_or("")
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for CountyProperties {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Projection of [`CountyProperties`] restricted to [`STATS_FIELDS`].
/// Purely derived; recomputed whole on every hover change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredCountyStats(serde_json::Map<String, Value>);

impl FilteredCountyStats {
    /// Numeric field value, defaulting to 0 when absent or non-numeric.
    pub fn number(&self, field: &str) -> f64 {
        self.0.get(field).and_then(Value::as_f64).unwrap_or(0.0)
    }

    pub fn display_name(&self) -> &str {
        self.0
            .get(DISPLAY_NAME_FIELD)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Derive the chart projection from the hovered county's properties.
/// `None` exactly when no county is hovered; otherwise the key set is the
/// allow-list intersected with the keys actually present.
pub fn filter_stats(props: Option<&CountyProperties>) -> Option<FilteredCountyStats> {
    let props = props?;
    Some(FilteredCountyStats(
        STATS_FIELDS
            .iter()
            .filter_map(|&field| {
                props
                    .0
                    .get(field)
                    .map(|value| (field.to_string(), value.clone()))
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::{CountyProperties, STATS_FIELDS, filter_stats};
    use serde_json::{Value, json};

    fn props(pairs: &[(&str, Value)]) -> CountyProperties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn filter_is_none_iff_props_are_none() {
        assert!(filter_stats(None).is_none());
        assert!(filter_stats(Some(&CountyProperties::default())).is_some());
    }

    #[test]
    fn filter_keeps_exactly_the_allow_list_intersection() {
        let county = props(&[
            ("kcal_consumed_grain", json!(30.0)),
            ("pct_white", json!(0.5)),
            ("geographic_area_name", json!("Lancaster County, Nebraska")),
            ("total_kcal_produced", json!(1.0e9)),
            ("county_fips", json!("31109")),
        ]);

        let stats = filter_stats(Some(&county)).unwrap();
        let mut keys: Vec<&str> = stats.keys().collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "geographic_area_name",
                "kcal_consumed_grain",
                "pct_white",
            ]
        );
        for key in stats.keys() {
            assert!(STATS_FIELDS.contains(&key));
        }
    }

    #[test]
    fn missing_fields_degrade_to_defaults() {
        let stats = filter_stats(Some(&CountyProperties::default())).unwrap();
        assert_eq!(stats.number("kcal_consumed_fruit"), 0.0);
        assert_eq!(stats.display_name(), "");
    }

    #[test]
    fn accessors_ignore_wrongly_typed_values() {
        let county = props(&[
            ("kcal_consumed_fruit", json!("lots")),
            ("geographic_area_name", json!(42)),
        ]);
        assert_eq!(county.number("kcal_consumed_fruit"), None);
        assert_eq!(county.display_name(), "");
    }

    #[test]
    fn deserializes_from_flat_json_object() {
        let county: CountyProperties = serde_json::from_value(json!({
            "geographic_area_name": "Adams County, Colorado",
            "kcal_consumed_per_capita_per_day": 801.5,
        }))
        .unwrap();
        assert_eq!(county.display_name(), "Adams County, Colorado");
        assert_eq!(county.number("kcal_consumed_per_capita_per_day"), Some(801.5));
    }
}
