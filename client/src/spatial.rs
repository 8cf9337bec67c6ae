use crate::counties::CountyIndex;

const GRID_COLS: usize = 50;
const GRID_ROWS: usize = 50;

/// A flat 2D spatial grid over world space for O(1) county hit-testing.
/// Rebuilt only when the county index loads.
pub struct SpatialGrid {
    cells: Vec<Vec<usize>>,
    lefts: Vec<f64>,
    rights: Vec<f64>,
    tops: Vec<f64>,
    bottoms: Vec<f64>,
    min_x: f64,
    min_y: f64,
    cell_w: f64,
    cell_h: f64,
}

impl SpatialGrid {
    pub fn build(counties: &CountyIndex) -> Self {
        if counties.is_empty() {
            return Self {
                cells: Vec::new(),
                lefts: Vec::new(),
                rights: Vec::new(),
                tops: Vec::new(),
                bottoms: Vec::new(),
                min_x: 0.0,
                min_y: 0.0,
                cell_w: 1.0,
                cell_h: 1.0,
            };
        }

        // Compute world bounds
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for feature in counties.features() {
            min_x = min_x.min(feature.left());
            min_y = min_y.min(feature.top());
            max_x = max_x.max(feature.right());
            max_y = max_y.max(feature.bottom());
        }

        // Add small padding to avoid edge issues
        min_x -= 1.0;
        min_y -= 1.0;
        max_x += 1.0;
        max_y += 1.0;

        let cell_w = (max_x - min_x) / GRID_COLS as f64;
        let cell_h = (max_y - min_y) / GRID_ROWS as f64;

        let mut cells = vec![Vec::new(); GRID_COLS * GRID_ROWS];
        let mut lefts = Vec::with_capacity(counties.len());
        let mut rights = Vec::with_capacity(counties.len());
        let mut tops = Vec::with_capacity(counties.len());
        let mut bottoms = Vec::with_capacity(counties.len());

        for (idx, feature) in counties.features().iter().enumerate() {
            let l = feature.left();
            let r = feature.right();
            let t = feature.top();
            let b = feature.bottom();

            lefts.push(l);
            rights.push(r);
            tops.push(t);
            bottoms.push(b);

            // Insert into all overlapping grid cells
            let col_start = ((l - min_x) / cell_w).floor().max(0.0) as usize;
            let col_end = ((r - min_x) / cell_w).ceil().min(GRID_COLS as f64) as usize;
            let row_start = ((t - min_y) / cell_h).floor().max(0.0) as usize;
            let row_end = ((b - min_y) / cell_h).ceil().min(GRID_ROWS as f64) as usize;

            for row in row_start..row_end {
                for col in col_start..col_end {
                    cells[row * GRID_COLS + col].push(idx);
                }
            }
        }

        Self {
            cells,
            lefts,
            rights,
            tops,
            bottoms,
            min_x,
            min_y,
            cell_w,
            cell_h,
        }
    }

    /// Find the topmost county at a world coordinate. Returns the feature's
    /// index into the county index, or `None` when nothing is under the point.
    pub fn find_at(&self, wx: f64, wy: f64) -> Option<usize> {
        if self.cells.is_empty() {
            return None;
        }

        let col = ((wx - self.min_x) / self.cell_w).floor() as isize;
        let row = ((wy - self.min_y) / self.cell_h).floor() as isize;

        if col < 0 || row < 0 || col >= GRID_COLS as isize || row >= GRID_ROWS as isize {
            return None;
        }

        let cell = &self.cells[row as usize * GRID_COLS + col as usize];
        for &idx in cell.iter().rev() {
            if wx >= self.lefts[idx]
                && wx <= self.rights[idx]
                && wy >= self.tops[idx]
                && wy <= self.bottoms[idx]
            {
                return Some(idx);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::SpatialGrid;
    use crate::counties::CountyIndex;

    fn index() -> CountyIndex {
        serde_json::from_str(
            r#"[
                { "bounds": [0.0, 0.0, 100.0, 80.0], "properties": {} },
                { "bounds": [100.0, 0.0, 220.0, 80.0], "properties": {} },
                { "bounds": [0.0, 80.0, 220.0, 200.0], "properties": {} }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn finds_the_county_containing_a_point() {
        let grid = SpatialGrid::build(&index());
        assert_eq!(grid.find_at(50.0, 40.0), Some(0));
        assert_eq!(grid.find_at(150.0, 40.0), Some(1));
        assert_eq!(grid.find_at(110.0, 150.0), Some(2));
    }

    #[test]
    fn misses_outside_every_rect() {
        let grid = SpatialGrid::build(&index());
        assert_eq!(grid.find_at(-50.0, 40.0), None);
        assert_eq!(grid.find_at(500.0, 500.0), None);
    }

    #[test]
    fn empty_index_never_matches() {
        let grid = SpatialGrid::build(&CountyIndex::default());
        assert_eq!(grid.find_at(0.0, 0.0), None);
    }
}
