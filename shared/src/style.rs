use serde::Deserialize;

/// Style document served by the tile service: the ordered layer manifest.
/// Layer order is back-to-front; the client raises the selected view's layer
/// to the end of the order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StyleDoc {
    pub layers: Vec<LayerDef>,
}

/// One choropleth layer: pre-baked tiles colored by one view's statistic.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerDef {
    pub id: String,
    pub tiles: Vec<TileDef>,
}

/// One raster tile with its world-space rect.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TileDef {
    pub url: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl StyleDoc {
    pub fn layer(&self, id: &str) -> Option<&LayerDef> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// World-space bounding box over every tile of every layer, or `None`
    /// when the style carries no tiles.
    pub fn world_bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for layer in &self.layers {
            for tile in &layer.tiles {
                let (tx1, tx2) = (tile.x1.min(tile.x2), tile.x1.max(tile.x2));
                let (ty1, ty2) = (tile.y1.min(tile.y2), tile.y1.max(tile.y2));
                bounds = Some(match bounds {
                    None => (tx1, ty1, tx2, ty2),
                    Some((min_x, min_y, max_x, max_y)) => (
                        min_x.min(tx1),
                        min_y.min(ty1),
                        max_x.max(tx2),
                        max_y.max(ty2),
                    ),
                });
            }
        }
        bounds
    }
}
