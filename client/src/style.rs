use foodmap_shared::{StyleDoc, ViewSelection};

use crate::config::MapConfig;

/// One-shot style load state. The `Loading` → `Ready` transition happens
/// exactly once, when the style document fetch resolves.
#[derive(Debug, Clone, Default, PartialEq)]
enum StyleLoad {
    #[default]
    Loading,
    Ready(StyleDoc),
}

/// Layer-order state machine over the tile service's style document.
///
/// A raise requested while the style is still loading is parked in a pending
/// slot of size one (a newer request replaces an older one) and applied
/// exactly once when the load completes. Raising an already-topmost layer is
/// a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapStyle {
    load: StyleLoad,
    /// Draw order, back to front; the last entry renders topmost.
    order: Vec<String>,
    pending_raise: Option<ViewSelection>,
}

impl MapStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.load, StyleLoad::Ready(_))
    }

    pub fn doc(&self) -> Option<&StyleDoc> {
        match &self.load {
            StyleLoad::Ready(doc) => Some(doc),
            StyleLoad::Loading => None,
        }
    }

    /// Complete the one-shot load transition. Repeated completions are
    /// no-ops. Applies the pending raise, if any.
    pub fn complete_load(&mut self, doc: StyleDoc) {
        if self.is_ready() {
            return;
        }
        self.order = doc.layers.iter().map(|layer| layer.id.clone()).collect();
        self.load = StyleLoad::Ready(doc);
        if let Some(view) = self.pending_raise.take() {
            self.raise(view.layer_id());
        }
    }

    /// Move the view's layer to the top of the draw order, deferring until
    /// the style has loaded.
    pub fn request_raise(&mut self, view: ViewSelection) {
        if self.is_ready() {
            self.raise(view.layer_id());
        } else {
            self.pending_raise = Some(view);
        }
    }

    pub fn draw_order(&self) -> &[String] {
        &self.order
    }

    pub fn world_bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.doc().and_then(StyleDoc::world_bounds)
    }

    fn raise(&mut self, id: &str) {
        if let Some(pos) = self.order.iter().position(|layer| layer == id)
            && pos + 1 != self.order.len()
        {
            let layer = self.order.remove(pos);
            self.order.push(layer);
        }
    }
}

pub async fn fetch_style(config: &MapConfig) -> Result<StyleDoc, String> {
    let resp = gloo_net::http::Request::get(&config.style_url())
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    resp.json::<StyleDoc>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::MapStyle;
    use foodmap_shared::{StyleDoc, ViewSelection};

    fn style_doc() -> StyleDoc {
        serde_json::from_str(
            r#"{
                "layers": [
                    { "id": "total-production", "tiles": [] },
                    { "id": "total-consumption", "tiles": [] },
                    { "id": "per-capita-production", "tiles": [] },
                    { "id": "per-capita-consumption", "tiles": [] }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn raise_before_load_is_applied_exactly_once_after_load() {
        let mut style = MapStyle::new();
        style.request_raise(ViewSelection::TotalConsumption);
        assert!(style.draw_order().is_empty());

        style.complete_load(style_doc());
        assert_eq!(style.draw_order().last().unwrap(), "total-consumption");

        // Completing again neither reloads nor reapplies the raise.
        let after_load = style.clone();
        style.complete_load(style_doc());
        assert_eq!(style, after_load);
    }

    #[test]
    fn newer_pending_raise_replaces_the_older_one() {
        let mut style = MapStyle::new();
        style.request_raise(ViewSelection::TotalConsumption);
        style.request_raise(ViewSelection::PerCapitaProduction);
        style.complete_load(style_doc());

        let order = style.draw_order();
        assert_eq!(order.last().unwrap(), "per-capita-production");
        // The replaced request must not have been queued behind.
        assert_eq!(order[1], "total-consumption");
    }

    #[test]
    fn raising_the_topmost_layer_is_a_no_op() {
        let mut style = MapStyle::new();
        style.complete_load(style_doc());
        style.request_raise(ViewSelection::TotalProduction);
        let raised = style.clone();
        style.request_raise(ViewSelection::TotalProduction);
        assert_eq!(style, raised);
    }

    #[test]
    fn raise_preserves_the_relative_order_of_other_layers() {
        let mut style = MapStyle::new();
        style.complete_load(style_doc());
        style.request_raise(ViewSelection::TotalConsumption);
        assert_eq!(
            style.draw_order(),
            [
                "total-production",
                "per-capita-production",
                "per-capita-consumption",
                "total-consumption",
            ]
        );
    }

    #[test]
    fn unknown_layer_raise_is_ignored() {
        let mut style = MapStyle::new();
        let mut doc = style_doc();
        doc.layers.truncate(2);
        style.complete_load(doc);
        style.request_raise(ViewSelection::PerCapitaConsumption);
        assert_eq!(style.draw_order(), ["total-production", "total-consumption"]);
    }
}
