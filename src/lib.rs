//! Animated contour-map background.
//!
//! A fractal noise field is sampled on a coarse grid, iso-lines are extracted
//! with marching squares and stroked onto a full-viewport canvas. Moving the
//! pointer raises a smooth hill in the field so the contours bend around it.
//!
//! Everything except the `wasm` binding is plain Rust and runs headless.

pub mod animation;
pub mod config;
pub mod contour;
pub mod field;
pub mod noise;
pub mod surface;

pub use animation::{ContourBackground, PointerState};
pub use config::{ContourConfig, Rgb};
pub use contour::{LevelStyle, Point, Segment};
pub use field::ScalarField;
pub use noise::GradientNoise;
pub use surface::{RecordingSurface, Surface, SvgSurface};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use wasm_bindgen::prelude::*;
    use web_sys::console;

    mod events;
    mod render;

    pub use render::{attach, attach_with, Attached, Motion};

    /// Id of the canvas element the background draws into.
    pub const CANVAS_ID: &str = "contour-bg";

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let Some(element) = document.get_element_by_id(CANVAS_ID) else {
            console::log_1(&JsValue::from_str("contour-bg: no canvas on this page"));
            return Ok(());
        };
        let canvas = element.dyn_into::<web_sys::HtmlCanvasElement>()?;

        attach(canvas)?;
        Ok(())
    }
}
