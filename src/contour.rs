//! Iso-line extraction with marching squares.
//!
//! Every grid cell is handled on its own: the four corners are compared to the
//! threshold, the resulting 4-bit code selects which cell edges the level set
//! crosses, and each crossing is placed by linear interpolation along its edge.
//! Segments are emitted unjoined; neighbouring cells share endpoints because
//! they interpolate the same edge.

use crate::config::{ContourConfig, Rgb};

/// Edge deltas smaller than this place the crossing at the edge midpoint.
const FLAT_EDGE_EPSILON: f64 = 1e-10;

/// Value ranges narrower than this produce no contour levels.
const FLAT_RANGE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// Side of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Corner bits of the case code.
pub const TL: u8 = 8;
pub const TR: u8 = 4;
pub const BR: u8 = 2;
pub const BL: u8 = 1;

/// Edge pairs to join for each case code. Saddles (5 and 10) always split
/// along the same diagonal instead of sampling the cell centre.
pub const CASES: [&[(Edge, Edge)]; 16] = {
    use Edge::*;
    [
        &[],
        &[(Left, Bottom)],
        &[(Bottom, Right)],
        &[(Left, Right)],
        &[(Top, Right)],
        &[(Top, Left), (Right, Bottom)],
        &[(Top, Bottom)],
        &[(Top, Left)],
        &[(Top, Left)],
        &[(Top, Bottom)],
        &[(Top, Right), (Bottom, Left)],
        &[(Top, Right)],
        &[(Right, Left)],
        &[(Right, Bottom)],
        &[(Bottom, Left)],
        &[],
    ]
};

/// Corner values of one cell.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    pub tl: f64,
    pub tr: f64,
    pub br: f64,
    pub bl: f64,
}

impl Cell {
    /// 4-bit code with a bit set for every corner at or above `threshold`.
    pub fn case_code(&self, threshold: f64) -> u8 {
        let mut code = 0;
        if self.tl >= threshold {
            code |= TL;
        }
        if self.tr >= threshold {
            code |= TR;
        }
        if self.br >= threshold {
            code |= BR;
        }
        if self.bl >= threshold {
            code |= BL;
        }
        code
    }

    /// Threshold crossing on `edge` for a cell whose top-left corner is at
    /// `origin` and whose sides are `size` long.
    pub fn edge_point(&self, edge: Edge, origin: Point, size: f64, threshold: f64) -> Point {
        let Point { x, y } = origin;
        match edge {
            Edge::Top => Point::new(x + crossing(self.tl, self.tr, threshold) * size, y),
            Edge::Right => Point::new(x + size, y + crossing(self.tr, self.br, threshold) * size),
            Edge::Bottom => Point::new(x + crossing(self.bl, self.br, threshold) * size, y + size),
            Edge::Left => Point::new(x, y + crossing(self.tl, self.bl, threshold) * size),
        }
    }

    /// Append this cell's segments for `threshold` to `out`.
    pub fn segments(&self, origin: Point, size: f64, threshold: f64, out: &mut Vec<Segment>) {
        for &(a, b) in CASES[self.case_code(threshold) as usize] {
            out.push(Segment {
                start: self.edge_point(a, origin, size, threshold),
                end: self.edge_point(b, origin, size, threshold),
            });
        }
    }
}

/// Fraction along an edge from `from` to `to` where `threshold` is crossed.
fn crossing(from: f64, to: f64, threshold: f64) -> f64 {
    let delta = to - from;
    if delta.abs() < FLAT_EDGE_EPSILON {
        0.5
    } else {
        (threshold - from) / delta
    }
}

/// Extract the level set of `threshold` from a row-major `cols` x `rows` grid
/// spaced `cell_size` apart. Segments are appended to `out`.
pub fn march(
    values: &[f64],
    cols: usize,
    rows: usize,
    cell_size: f64,
    threshold: f64,
    out: &mut Vec<Segment>,
) {
    if cols < 2 || rows < 2 || values.len() < cols * rows {
        return;
    }

    for r in 0..rows - 1 {
        let top = r * cols;
        let bottom = top + cols;
        for c in 0..cols - 1 {
            let cell = Cell {
                tl: values[top + c],
                tr: values[top + c + 1],
                br: values[bottom + c + 1],
                bl: values[bottom + c],
            };
            let origin = Point::new(c as f64 * cell_size, r as f64 * cell_size);
            cell.segments(origin, cell_size, threshold, out);
        }
    }
}

/// `levels` thresholds evenly spaced strictly inside `[min, max]`.
///
/// Returns nothing when the range is degenerate, which suppresses drawing for
/// a flat field.
pub fn contour_thresholds(min: f64, max: f64, levels: usize) -> Vec<f64> {
    let range = max - min;
    if !(range >= FLAT_RANGE_EPSILON) {
        return Vec::new();
    }
    let step = range / (levels + 1) as f64;
    (0..levels).map(|k| min + (k + 1) as f64 * step).collect()
}

/// How a single contour level is stroked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelStyle {
    pub color: Rgb,
    pub alpha: f64,
    pub width: f64,
    pub major: bool,
}

impl LevelStyle {
    /// Style of level `index` out of `levels`. Opacity rises linearly from
    /// the lowest level to the highest.
    pub fn for_level(index: usize, levels: usize, config: &ContourConfig) -> Self {
        let frac = if levels > 1 {
            index as f64 / (levels - 1) as f64
        } else {
            0.0
        };
        let major = config.major_every > 0 && (index + 1) % config.major_every == 0;
        Self {
            color: config.color,
            alpha: config.alpha_min + frac * (config.alpha_max - config.alpha_min),
            width: if major { config.major_width } else { config.line_width },
            major,
        }
    }

    /// CSS colour string, e.g. `rgba(208,159,166,0.200)`.
    pub fn css_color(&self) -> String {
        format!(
            "rgba({},{},{},{:.3})",
            self.color.r, self.color.g, self.color.b, self.alpha
        )
    }
}
