//! Grid-sampled elevation field: a static noise `base` plus a `displayed`
//! copy that carries the pointer bump.

use crate::config::ContourConfig;
use crate::noise::GradientNoise;

/// Intensities at or below this leave the displayed field equal to the base.
const MIN_BUMP_STRENGTH: f64 = 0.001;

/// Two equally sized row-major grids of elevation samples.
///
/// Sample `(col, row)` sits at pixel `(col * cell_size, row * cell_size)`;
/// the grid extends one cell past the right and bottom edges of the viewport
/// so contours reaching the border are still closed off correctly.
#[derive(Debug, Clone, Default)]
pub struct ScalarField {
    width: f64,
    height: f64,
    cols: usize,
    rows: usize,
    cell_size: f64,
    bump_radius: f64,
    base: Vec<f64>,
    displayed: Vec<f64>,
    min: f64,
    max: f64,
}

impl ScalarField {
    /// Build a field covering a `width` x `height` viewport.
    pub fn new(width: f64, height: f64, noise: &GradientNoise, config: &ContourConfig) -> Self {
        let mut field = Self::default();
        field.rebuild(width, height, noise, config);
        field
    }

    /// Build a field whose base sample at `(col, row)` is `sample(col, row)`
    /// instead of noise. Grid layout and bump radius follow `config` as usual.
    pub fn from_fn<F>(width: f64, height: f64, config: &ContourConfig, sample: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut field = Self::default();
        field.fill(width, height, config, sample);
        field
    }

    /// Resample the base grid for a new viewport size. The displayed grid is
    /// reset to the base.
    pub fn rebuild(&mut self, width: f64, height: f64, noise: &GradientNoise, config: &ContourConfig) {
        let cell = config.cell_size;
        let scale = config.noise_scale;
        let (ox, oy) = config.noise_offset;
        self.fill(width, height, config, |c, r| {
            noise.fbm(
                c as f64 * cell * scale + ox,
                r as f64 * cell * scale + oy,
                config.octaves,
            )
        });
    }

    fn fill<F>(&mut self, width: f64, height: f64, config: &ContourConfig, mut sample: F)
    where
        F: FnMut(usize, usize) -> f64,
    {
        let cell = config.cell_size;
        let width = width.max(0.0);
        let height = height.max(0.0);
        self.width = width;
        self.height = height;
        self.cols = (width / cell).ceil() as usize + 2;
        self.rows = (height / cell).ceil() as usize + 2;
        self.cell_size = cell;
        self.bump_radius = config.bump_radius(width, height);

        let len = self.cols * self.rows;
        self.base.clear();
        self.base.reserve(len);

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for r in 0..self.rows {
            for c in 0..self.cols {
                let v = sample(c, r);
                min = min.min(v);
                max = max.max(v);
                self.base.push(v);
            }
        }
        self.min = min;
        self.max = max;

        self.displayed.clear();
        self.displayed.extend_from_slice(&self.base);
    }

    /// Recompute the displayed grid as base plus a smoothstep hill of height
    /// `intensity * bump_height` centred on `pointer`.
    pub fn refresh(&mut self, pointer: (f64, f64), intensity: f64, bump_height: f64) {
        let strength = intensity * bump_height;
        if strength <= MIN_BUMP_STRENGTH {
            self.displayed.copy_from_slice(&self.base);
            return;
        }

        let radius = self.bump_radius;
        let radius_sq = radius * radius;
        let (px, py) = pointer;
        for r in 0..self.rows {
            let row = r * self.cols;
            let dy = r as f64 * self.cell_size - py;
            for c in 0..self.cols {
                let idx = row + c;
                let dx = c as f64 * self.cell_size - px;
                let dist_sq = dx * dx + dy * dy;
                let mut v = self.base[idx];
                if dist_sq < radius_sq {
                    let t = 1.0 - dist_sq.sqrt() / radius;
                    v += t * t * (3.0 - 2.0 * t) * strength;
                }
                self.displayed[idx] = v;
            }
        }
    }

    /// Viewport size the grid was laid out for.
    pub fn viewport(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn bump_radius(&self) -> f64 {
        self.bump_radius
    }

    pub fn base(&self) -> &[f64] {
        &self.base
    }

    pub fn displayed(&self) -> &[f64] {
        &self.displayed
    }

    /// Smallest base sample seen by the last rebuild.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest base sample seen by the last rebuild.
    pub fn max(&self) -> f64 {
        self.max
    }
}
