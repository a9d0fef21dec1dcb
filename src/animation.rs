//! Frame driver for the contour background.
//!
//! [`ContourBackground`] owns the noise tables, the field and the pointer
//! state. A host calls the input methods from its event handlers and
//! [`ContourBackground::tick`] once per animation frame; when `tick` reports a
//! change the host follows up with [`ContourBackground::render`].

use crate::config::ContourConfig;
use crate::contour::{self, LevelStyle, Segment};
use crate::field::ScalarField;
use crate::noise::GradientNoise;
use crate::surface::Surface;

/// Pointer differences at or below this (px, per axis) are considered settled.
const POSITION_EPSILON: f64 = 0.3;
/// Intensity gaps at or below this are considered settled.
const INTENSITY_EPSILON: f64 = 0.001;
/// Frame duration the per-frame easing rates are expressed in.
const REFERENCE_FRAME: f64 = 1.0 / 60.0;

/// Converts a per-reference-frame easing rate into the fraction to cover over
/// `dt` seconds. Never exceeds 1, so easing cannot overshoot.
fn ease_factor(rate: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        return 0.0;
    }
    let frames = dt / REFERENCE_FRAME;
    (1.0 - (1.0 - rate).powf(frames)).clamp(0.0, 1.0)
}

/// Raw and smoothed pointer state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    /// Last position reported by the host.
    pub target: (f64, f64),
    /// Lagged position the bump is drawn at.
    pub smoothed: (f64, f64),
    /// 1 while the pointer is over the page, 0 after it leaves.
    pub target_intensity: f64,
    /// Eased bump intensity in `[0, 1]`.
    pub intensity: f64,
}

impl Default for PointerState {
    fn default() -> Self {
        // Far off-screen so a stray refresh never shows a bump.
        let away = (-9999.0, -9999.0);
        Self {
            target: away,
            smoothed: away,
            target_intensity: 0.0,
            intensity: 0.0,
        }
    }
}

impl PointerState {
    /// Advance both eased quantities by `dt` seconds. Returns whether either moved.
    pub fn step(&mut self, dt: f64, config: &ContourConfig) -> bool {
        // Repeated or backwards host timestamps move nothing.
        if dt <= 0.0 {
            return false;
        }
        let mut changed = false;

        let dx = self.target.0 - self.smoothed.0;
        let dy = self.target.1 - self.smoothed.1;
        if dx.abs() > POSITION_EPSILON || dy.abs() > POSITION_EPSILON {
            let k = ease_factor(config.pointer_lerp, dt);
            self.smoothed.0 += dx * k;
            self.smoothed.1 += dy * k;
            changed = true;
        }

        let da = self.target_intensity - self.intensity;
        if da.abs() > INTENSITY_EPSILON {
            let rate = if da > 0.0 { config.fade_in } else { config.fade_out };
            self.intensity += da * ease_factor(rate, dt);
            if self.intensity < INTENSITY_EPSILON {
                self.intensity = 0.0;
            }
            if self.intensity > 1.0 - INTENSITY_EPSILON {
                self.intensity = 1.0;
            }
            changed = true;
        }

        changed
    }
}

/// The whole background: tables, grids, pointer state and scratch space.
pub struct ContourBackground {
    config: ContourConfig,
    noise: GradientNoise,
    field: ScalarField,
    pointer: PointerState,
    width: f64,
    height: f64,
    visible: bool,
    segments: Vec<Segment>,
}

impl ContourBackground {
    /// Build tables from `seed` and lay out the field for a viewport.
    pub fn new(config: ContourConfig, seed: u64, width: f64, height: f64) -> Self {
        let noise = GradientNoise::new(seed);
        let field = ScalarField::new(width, height, &noise, &config);
        Self {
            config,
            noise,
            field,
            pointer: PointerState::default(),
            width,
            height,
            visible: true,
            segments: Vec::new(),
        }
    }

    /// Use a precomputed field instead of sampling noise. The noise tables
    /// built from `seed` take over again on the next `resize`.
    pub fn with_field(config: ContourConfig, seed: u64, field: ScalarField) -> Self {
        let (width, height) = field.viewport();
        Self {
            config,
            noise: GradientNoise::new(seed),
            field,
            pointer: PointerState::default(),
            width,
            height,
            visible: true,
            segments: Vec::new(),
        }
    }

    pub fn config(&self) -> &ContourConfig {
        &self.config
    }

    pub fn field(&self) -> &ScalarField {
        &self.field
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Pointer or touch moved to `(x, y)` in viewport coordinates.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.pointer.target = (x, y);
        // A faded bump reappears where the pointer is now rather than sliding
        // over from where it was last seen.
        if self.pointer.intensity < self.config.snap_threshold {
            self.pointer.smoothed = (x, y);
        }
        self.pointer.target_intensity = 1.0;
    }

    /// Pointer left the document or the touch ended.
    pub fn pointer_leave(&mut self) {
        self.pointer.target_intensity = 0.0;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Lay the grid out for a new viewport and reapply the current bump.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.field.rebuild(width, height, &self.noise, &self.config);
        self.refresh_field();
    }

    /// Advance the animation by `dt` seconds. Returns `true` when the field
    /// was refreshed and the frame needs to be redrawn.
    pub fn tick(&mut self, dt: f64) -> bool {
        if !self.visible {
            return false;
        }
        if !self.pointer.step(dt, &self.config) {
            return false;
        }
        self.refresh_field();
        true
    }

    fn refresh_field(&mut self) {
        self.field.refresh(
            self.pointer.smoothed,
            self.pointer.intensity,
            self.config.bump_height,
        );
    }

    /// Thresholds for the current field, spread over the base range widened
    /// by the largest possible bump.
    pub fn thresholds(&self) -> Vec<f64> {
        contour::contour_thresholds(
            self.field.min(),
            self.field.max() + self.config.bump_height,
            self.config.levels,
        )
    }

    /// Clear `surface` and stroke every contour level of the displayed field.
    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        surface.clear(self.width, self.height);

        let thresholds = self.thresholds();
        let levels = thresholds.len();
        for (k, &threshold) in thresholds.iter().enumerate() {
            self.segments.clear();
            contour::march(
                self.field.displayed(),
                self.field.cols(),
                self.field.rows(),
                self.field.cell_size(),
                threshold,
                &mut self.segments,
            );
            let style = LevelStyle::for_level(k, levels, &self.config);
            surface.stroke_segments(&style, &self.segments);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    const FRAME: f64 = 1.0 / 60.0;

    fn background() -> ContourBackground {
        ContourBackground::new(ContourConfig::default(), 7, 400.0, 300.0)
    }

    #[test]
    fn ease_factor_matches_rate_at_sixty_hz() {
        assert!((ease_factor(0.1, FRAME) - 0.1).abs() < 1e-12);
        assert_eq!(ease_factor(0.1, 0.0), 0.0);
        assert!(ease_factor(0.1, 100.0) <= 1.0);
        // Two half frames cover the same ground as one full frame.
        let half = ease_factor(0.1, FRAME / 2.0);
        assert!((1.0 - (1.0 - half) * (1.0 - half) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn idle_frames_do_nothing() {
        let mut bg = background();
        assert!(!bg.tick(FRAME));
        assert_eq!(bg.field().displayed(), bg.field().base());
    }

    #[test]
    fn intensity_rises_monotonically_to_one() {
        let mut bg = background();
        bg.pointer_move(200.0, 150.0);
        let mut last = bg.pointer().intensity;
        for _ in 0..600 {
            bg.tick(FRAME);
            let now = bg.pointer().intensity;
            assert!(now >= last && now <= 1.0);
            last = now;
        }
        assert!((1.0 - last).abs() < 0.001);
    }

    #[test]
    fn intensity_decays_to_exactly_zero() {
        let mut bg = background();
        bg.pointer_move(200.0, 150.0);
        for _ in 0..300 {
            bg.tick(FRAME);
        }
        bg.pointer_leave();
        let mut last = bg.pointer().intensity;
        for _ in 0..2000 {
            bg.tick(FRAME);
            let now = bg.pointer().intensity;
            assert!(now <= last && now >= 0.0);
            last = now;
        }
        assert_eq!(last, 0.0);
        assert!(!bg.tick(FRAME));
        assert_eq!(bg.field().displayed(), bg.field().base());
    }

    #[test]
    fn pointer_eases_without_overshoot() {
        let mut bg = background();
        bg.pointer_move(100.0, 100.0);
        bg.tick(FRAME);
        bg.pointer_move(300.0, 200.0);
        let mut last = bg.pointer().smoothed;
        for _ in 0..200 {
            bg.tick(FRAME);
            let now = bg.pointer().smoothed;
            assert!(now.0 >= last.0 && now.0 <= 300.0);
            assert!(now.1 >= last.1 && now.1 <= 200.0);
            last = now;
        }
        assert!((300.0 - last.0).abs() <= POSITION_EPSILON);
        assert!((200.0 - last.1).abs() <= POSITION_EPSILON);
    }

    #[test]
    fn faded_bump_snaps_to_new_pointer() {
        let mut bg = background();
        bg.pointer.smoothed = (100.0, 100.0);
        bg.pointer.target = (100.0, 100.0);
        bg.pointer.intensity = 0.0005;
        bg.pointer_move(500.0, 500.0);
        bg.tick(FRAME);
        assert_eq!(bg.pointer().smoothed, (500.0, 500.0));
    }

    #[test]
    fn visible_bump_does_not_snap() {
        let mut bg = background();
        bg.pointer.smoothed = (100.0, 100.0);
        bg.pointer.intensity = 0.5;
        bg.pointer_move(500.0, 500.0);
        bg.tick(FRAME);
        let (x, y) = bg.pointer().smoothed;
        assert!(x > 100.0 && x < 500.0);
        assert!(y > 100.0 && y < 500.0);
    }

    #[test]
    fn zero_length_frame_is_a_no_op() {
        let mut bg = background();
        bg.pointer_move(200.0, 150.0);
        bg.pointer.smoothed = (100.0, 100.0);
        let before = *bg.pointer();
        assert!(!bg.tick(0.0));
        assert!(!bg.tick(-0.005));
        assert_eq!(*bg.pointer(), before);
        assert_eq!(bg.field().displayed(), bg.field().base());
        assert!(bg.tick(FRAME));
    }

    #[test]
    fn hidden_page_skips_work() {
        let mut bg = background();
        assert!(bg.is_visible());
        bg.set_visible(false);
        assert!(!bg.is_visible());
        bg.pointer_move(200.0, 150.0);
        assert!(!bg.tick(FRAME));
        assert_eq!(bg.pointer().intensity, 0.0);
        bg.set_visible(true);
        assert!(bg.tick(FRAME));
        assert!(bg.pointer().intensity > 0.0);
    }

    #[test]
    fn active_frame_raises_field_under_pointer() {
        let mut bg = background();
        bg.pointer_move(200.0, 150.0);
        assert!(bg.tick(FRAME));
        let f = bg.field();
        let centre = 15 * f.cols() + 20;
        assert!(f.displayed()[centre] > f.base()[centre]);
    }

    #[test]
    fn resize_relayouts_and_keeps_bump() {
        let mut bg = background();
        bg.pointer_move(50.0, 50.0);
        for _ in 0..30 {
            bg.tick(FRAME);
        }
        bg.resize(800.0, 600.0);
        assert_eq!(bg.size(), (800.0, 600.0));
        assert_eq!((bg.field().cols(), bg.field().rows()), (82, 62));
        let f = bg.field();
        let at_pointer = 5 * f.cols() + 5;
        assert!(f.displayed()[at_pointer] > f.base()[at_pointer]);
    }

    #[test]
    fn render_clears_then_strokes_each_level() {
        let mut bg = background();
        let mut surface = RecordingSurface::new();
        bg.render(&mut surface);
        assert_eq!(
            surface.calls.first(),
            Some(&crate::surface::DrawCall::Clear { width: 400.0, height: 300.0 })
        );
        let frame = surface.last_frame();
        assert_eq!(frame.len(), bg.config().levels);
        assert!(frame.iter().any(|(_, segs)| !segs.is_empty()));
    }
}
