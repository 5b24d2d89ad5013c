//! Axial-offset hex layout ("odd-row-right" shove, flat-top hexes).
//!
//! Maps grid coordinates to canvas pixel coordinates. The layout is a pure
//! function of the canvas and grid dimensions and is recomputed every frame;
//! the viewport can change between polls, so nothing here is cached.

/// Side margins around the drawn grid.
pub const PAD_LEFT: f64 = 24.0;
pub const PAD_RIGHT: f64 = 24.0;
/// Top margin is taller: the status overlay draws over this strip.
pub const PAD_TOP: f64 = 48.0;
pub const PAD_BOTTOM: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLayout {
    /// Hex circumradius in pixels.
    pub size: f64,
}

impl HexLayout {
    /// Largest circumradius at which the whole grid fits inside the padded
    /// canvas, whatever the aspect ratio. Degenerate canvases clamp the
    /// usable area to 1 px so the size stays finite and positive.
    pub fn fit(canvas_w: f64, canvas_h: f64, grid_w: u32, grid_h: u32) -> Self {
        let usable_w = (canvas_w - PAD_LEFT - PAD_RIGHT).max(1.0);
        let usable_h = (canvas_h - PAD_TOP - PAD_BOTTOM).max(1.0);
        let cols = grid_w.max(1) as f64;
        let rows = grid_h.max(1) as f64;
        let size = (usable_w / (3.0_f64.sqrt() * (cols + 0.5))).min(usable_h / (1.5 * rows));
        Self { size }
    }

    /// Pixel center of a grid coordinate. Odd rows shove right by half a
    /// cell width, producing the brick-like hex tiling. Fractional
    /// coordinates are allowed (units mid-move); row parity comes from the
    /// truncated integer part of `y`.
    pub fn center(&self, x: f64, y: f64) -> (f64, f64) {
        let parity = (y.trunc() as i64).rem_euclid(2) as f64;
        let cx = PAD_LEFT + self.size * 3.0_f64.sqrt() * (x + 0.5 * parity);
        let cy = PAD_TOP + self.size * 1.5 * y;
        (cx, cy)
    }

    /// Six outline vertices of the flat-top hex centered at `(cx, cy)`,
    /// at angles `60·i + 30` degrees.
    pub fn corners(&self, cx: f64, cy: f64) -> [(f64, f64); 6] {
        let mut points = [(0.0, 0.0); 6];
        for (i, point) in points.iter_mut().enumerate() {
            let angle = (60.0 * i as f64 + 30.0).to_radians();
            *point = (cx + self.size * angle.cos(), cy + self.size * angle.sin());
        }
        points
    }
}
