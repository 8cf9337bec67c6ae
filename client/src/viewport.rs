/// Viewport manages the pan/zoom transformation from world coordinates
/// (the tile service's pixel space) to screen coordinates.
#[derive(Debug, Clone)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

const MIN_SCALE: f64 = 0.05;
const MAX_SCALE: f64 = 8.0;
const ZOOM_SENSITIVITY: f64 = 0.001;

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 0.3,
        }
    }
}

impl Viewport {
    /// Convert world coordinates to screen coordinates.
    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (
            wx * self.scale + self.offset_x,
            wy * self.scale + self.offset_y,
        )
    }

    /// Convert screen coordinates to world coordinates.
    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            (sx - self.offset_x) / self.scale,
            (sy - self.offset_y) / self.scale,
        )
    }

    /// Zoom toward a focus point (screen coordinates).
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        let factor = (-delta * ZOOM_SENSITIVITY).exp();
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = new_scale / self.scale;

        // Adjust offset so the point under the cursor stays fixed
        self.offset_x = screen_x - (screen_x - self.offset_x) * ratio;
        self.offset_y = screen_y - (screen_y - self.offset_y) * ratio;
        self.scale = new_scale;
    }

    /// Pan by screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Fit the viewport to show the given world-coordinate bounds with padding.
    pub fn fit_bounds(
        &mut self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        canvas_w: f64,
        canvas_h: f64,
    ) {
        let world_w = max_x - min_x;
        let world_h = max_y - min_y;

        if world_w <= 0.0 || world_h <= 0.0 || canvas_w <= 0.0 || canvas_h <= 0.0 {
            return;
        }

        let padding = 0.05;
        let scale_x = canvas_w / (world_w * (1.0 + padding * 2.0));
        let scale_y = canvas_h / (world_h * (1.0 + padding * 2.0));
        self.scale = scale_x.min(scale_y).clamp(MIN_SCALE, MAX_SCALE);

        let center_x = (min_x + max_x) / 2.0;
        let center_y = (min_y + max_y) / 2.0;
        self.offset_x = canvas_w / 2.0 - center_x * self.scale;
        self.offset_y = canvas_h / 2.0 - center_y * self.scale;
    }

    /// Clamp panning to the world rect so the map cannot be dragged off the
    /// tiled extent. An axis whose scaled extent fits inside the canvas is
    /// centered instead.
    pub fn clamp_to_bounds(
        &mut self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        canvas_w: f64,
        canvas_h: f64,
    ) {
        self.offset_x = clamp_axis(self.offset_x, min_x, max_x, self.scale, canvas_w);
        self.offset_y = clamp_axis(self.offset_y, min_y, max_y, self.scale, canvas_h);
    }
}

fn clamp_axis(offset: f64, world_min: f64, world_max: f64, scale: f64, canvas: f64) -> f64 {
    let extent = (world_max - world_min) * scale;
    if extent <= canvas {
        canvas / 2.0 - (world_min + world_max) / 2.0 * scale
    } else {
        // offset such that world_min maps at or left of 0 and world_max at or right of canvas
        offset.clamp(canvas - world_max * scale, -world_min * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::Viewport;

    #[test]
    fn screen_world_round_trip() {
        let vp = Viewport {
            offset_x: 120.0,
            offset_y: -40.0,
            scale: 0.5,
        };
        let (sx, sy) = vp.world_to_screen(800.0, 600.0);
        let (wx, wy) = vp.screen_to_world(sx, sy);
        assert!((wx - 800.0).abs() < 1e-9);
        assert!((wy - 600.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_keeps_cursor_anchored_point_fixed() {
        let mut vp = Viewport::default();
        let (focus_x, focus_y) = (320.0, 240.0);
        let (wx, wy) = vp.screen_to_world(focus_x, focus_y);
        vp.zoom_at(-240.0, focus_x, focus_y);
        let (wx2, wy2) = vp.screen_to_world(focus_x, focus_y);
        assert!((wx - wx2).abs() < 1e-6);
        assert!((wy - wy2).abs() < 1e-6);
    }

    #[test]
    fn fit_bounds_centers_the_extent() {
        let mut vp = Viewport::default();
        vp.fit_bounds(0.0, 0.0, 2048.0, 1024.0, 1200.0, 800.0);
        let (sx, sy) = vp.world_to_screen(1024.0, 512.0);
        assert!((sx - 600.0).abs() < 1e-6);
        assert!((sy - 400.0).abs() < 1e-6);
    }

    #[test]
    fn clamp_centers_when_world_fits_in_view() {
        let mut vp = Viewport {
            offset_x: 5000.0,
            offset_y: -5000.0,
            scale: 0.1,
        };
        vp.clamp_to_bounds(0.0, 0.0, 2048.0, 1024.0, 1200.0, 800.0);
        let (sx, sy) = vp.world_to_screen(1024.0, 512.0);
        assert!((sx - 600.0).abs() < 1e-6);
        assert!((sy - 400.0).abs() < 1e-6);
    }

    #[test]
    fn clamp_never_exposes_space_outside_the_world() {
        let mut vp = Viewport {
            offset_x: 400.0,
            offset_y: -9000.0,
            scale: 1.0,
        };
        vp.clamp_to_bounds(0.0, 0.0, 2048.0, 1024.0, 1200.0, 800.0);
        let (left, top) = vp.world_to_screen(0.0, 0.0);
        let (right, bottom) = vp.world_to_screen(2048.0, 1024.0);
        assert!(left <= 1e-9);
        assert!(top <= 1e-9);
        assert!(right >= 1200.0 - 1e-9);
        assert!(bottom >= 800.0 - 1e-9);
    }
}
