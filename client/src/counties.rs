use foodmap_shared::CountyProperties;
use leptos::prelude::*;
use serde::Deserialize;
use wasm_bindgen_futures::spawn_local;

use crate::config::MapConfig;

/// One county feature from the tile service's index: a world-space bounding
/// rect plus the full property set used for hover hit-testing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CountyFeature {
    /// `[x1, y1, x2, y2]` world rect, corner order not guaranteed.
    pub bounds: [f64; 4],
    pub properties: CountyProperties,
}

impl CountyFeature {
    pub fn left(&self) -> f64 {
        self.bounds[0].min(self.bounds[2])
    }

    pub fn right(&self) -> f64 {
        self.bounds[0].max(self.bounds[2])
    }

    pub fn top(&self) -> f64 {
        self.bounds[1].min(self.bounds[3])
    }

    pub fn bottom(&self) -> f64 {
        self.bounds[1].max(self.bounds[3])
    }
}

/// The full county feature index, fetched once at startup.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct CountyIndex(Vec<CountyFeature>);

impl CountyIndex {
    pub fn features(&self) -> &[CountyFeature] {
        &self.0
    }

    pub fn get(&self, idx: usize) -> Option<&CountyFeature> {
        self.0.get(idx)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub async fn fetch_county_index(url: &str) -> Result<CountyIndex, String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    resp.json::<CountyIndex>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

/// Fetch the county index in the background; a failure leaves the map alive
/// with hover disabled.
pub fn load_county_index(index_signal: RwSignal<CountyIndex>, config: &MapConfig) {
    let url = config.county_index_url();
    spawn_local(async move {
        match fetch_county_index(&url).await {
            Ok(index) => {
                web_sys::console::info_1(&format!("county index: {} features", index.len()).into());
                index_signal.set(index);
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("County index fetch failed: {e}").into());
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::CountyIndex;

    #[test]
    fn deserializes_features_and_normalizes_rect_corners() {
        let index: CountyIndex = serde_json::from_str(
            r#"[
                {
                    "bounds": [820.0, 510.0, 790.0, 480.0],
                    "properties": { "geographic_area_name": "Boone County, Iowa" }
                }
            ]"#,
        )
        .unwrap();

        assert_eq!(index.len(), 1);
        let feature = index.get(0).unwrap();
        assert_eq!(feature.left(), 790.0);
        assert_eq!(feature.right(), 820.0);
        assert_eq!(feature.top(), 480.0);
        assert_eq!(feature.bottom(), 510.0);
        assert_eq!(feature.properties.display_name(), "Boone County, Iowa");
    }
}
