//! Tunable parameters for the contour background.

/// An sRGB colour without alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// All constants that shape the field, the contours and the animation.
///
/// Easing rates are expressed per 1/60 s frame; the driver rescales them for
/// other frame durations.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourConfig {
    /// Grid spacing in CSS pixels.
    pub cell_size: f64,
    /// Number of iso-levels drawn per frame.
    pub levels: usize,
    /// Spatial frequency applied to pixel coordinates before sampling noise.
    pub noise_scale: f64,
    /// Fractal octaves summed per sample.
    pub octaves: u32,
    /// Constant offset into noise space so the origin is not a lattice point.
    pub noise_offset: (f64, f64),
    /// Elevation added at the pointer centre at full intensity.
    pub bump_height: f64,
    /// Lower bound on the bump radius in pixels.
    pub min_bump_radius: f64,
    /// Bump radius as a fraction of the smaller viewport side.
    pub bump_radius_fraction: f64,
    pub line_width: f64,
    pub major_width: f64,
    /// Every n-th level (1-based) is drawn as a major contour.
    pub major_every: usize,
    pub color: Rgb,
    /// Opacity of the lowest level.
    pub alpha_min: f64,
    /// Opacity of the highest level.
    pub alpha_max: f64,
    /// Fraction of the remaining pointer distance covered per frame.
    pub pointer_lerp: f64,
    pub fade_in: f64,
    pub fade_out: f64,
    /// Below this intensity a new pointer position is adopted without easing.
    pub snap_threshold: f64,
    /// Upper bound on the device pixel ratio used for the backing store.
    pub max_pixel_ratio: f64,
    /// Quiet period after the last resize event before the grid is rebuilt.
    pub resize_debounce_ms: i32,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            cell_size: 10.0,
            levels: 14,
            noise_scale: 0.004,
            octaves: 4,
            noise_offset: (73.1, 41.7),
            bump_height: 0.55,
            min_bump_radius: 120.0,
            bump_radius_fraction: 0.25,
            line_width: 1.0,
            major_width: 1.6,
            major_every: 4,
            color: Rgb::new(208, 159, 166),
            alpha_min: 0.20,
            alpha_max: 0.60,
            pointer_lerp: 0.10,
            fade_in: 0.10,
            fade_out: 0.04,
            snap_threshold: 0.001,
            max_pixel_ratio: 2.0,
            resize_debounce_ms: 150,
        }
    }
}

impl ContourConfig {
    /// Bump radius for a viewport of the given size.
    pub fn bump_radius(&self, width: f64, height: f64) -> f64 {
        (width.min(height) * self.bump_radius_fraction).max(self.min_bump_radius)
    }

    /// Device pixel ratio clamped to `max_pixel_ratio`.
    pub fn pixel_ratio(&self, device_ratio: f64) -> f64 {
        let ratio = if device_ratio > 0.0 { device_ratio } else { 1.0 };
        ratio.min(self.max_pixel_ratio)
    }
}
