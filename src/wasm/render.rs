use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{console, window, CanvasRenderingContext2d, HtmlCanvasElement, Window};

use super::events;
use crate::animation::{ContourBackground, PointerState};
use crate::config::ContourConfig;
use crate::contour::{LevelStyle, Segment};
use crate::surface::Surface;

/// Longest frame step fed to the easing; longer gaps (tab switches, debugger
/// pauses) are treated as this.
const MAX_FRAME_SECONDS: f64 = 0.1;

/// `Surface` backed by a 2-D canvas context.
pub(super) struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn stroke_segments(&mut self, style: &LevelStyle, segments: &[Segment]) {
        if segments.is_empty() {
            return;
        }
        self.ctx.set_line_width(style.width);
        self.ctx.set_stroke_style_str(&style.css_color());
        self.ctx.begin_path();
        for s in segments {
            self.ctx.move_to(s.start.x, s.start.y);
            self.ctx.line_to(s.end.x, s.end.y);
        }
        self.ctx.stroke();
    }
}

/// Everything the browser callbacks share.
pub(super) struct App {
    pub(super) background: ContourBackground,
    surface: CanvasSurface,
    canvas: HtmlCanvasElement,
    last_frame: Option<f64>,
    relayouts: u32,
    frames: u32,
}

impl App {
    /// Resize the backing store to the viewport, rebuild the grid and redraw.
    pub(super) fn relayout(&mut self) -> Result<(), JsValue> {
        let window = window().ok_or("no window")?;
        let (width, height) =
            fit_canvas(&window, &self.canvas, &self.surface.ctx, self.background.config())?;
        self.background.resize(width, height);
        self.relayouts += 1;
        self.draw();
        Ok(())
    }

    fn draw(&mut self) {
        self.background.render(&mut self.surface);
    }

    /// One animation frame at host timestamp `now` (milliseconds).
    fn frame(&mut self, now: f64) {
        let dt = match self.last_frame {
            Some(prev) => ((now - prev) / 1000.0).clamp(0.0, MAX_FRAME_SECONDS),
            None => 1.0 / 60.0,
        };
        self.last_frame = Some(now);
        self.frames = self.frames.wrapping_add(1);
        if self.background.tick(dt) {
            self.draw();
        }
    }
}

/// Size `canvas` to the viewport times the capped device pixel ratio and
/// scale the context so drawing stays in CSS pixels. Returns the viewport size.
fn fit_canvas(
    window: &Window,
    canvas: &HtmlCanvasElement,
    ctx: &CanvasRenderingContext2d,
    config: &ContourConfig,
) -> Result<(f64, f64), JsValue> {
    let width = window.inner_width()?.as_f64().unwrap_or(0.0);
    let height = window.inner_height()?.as_f64().unwrap_or(0.0);
    let ratio = config.pixel_ratio(window.device_pixel_ratio());

    canvas.set_width((width * ratio) as u32);
    canvas.set_height((height * ratio) as u32);
    // Resizing the canvas resets its context state.
    ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0)?;
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
    Ok((width, height))
}

fn session_seed() -> u64 {
    let word = || (js_sys::Math::random() * 4_294_967_296.0) as u64;
    (word() << 32) | word()
}

fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    window()
        .ok_or("no window")?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

/// Whether the background animates or draws a single static frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Animated,
    /// No frame loop and no pointer tracking; resizes still redraw.
    Reduced,
}

impl Motion {
    /// Read the `prefers-reduced-motion` media preference.
    pub fn preferred(window: &Window) -> Result<Self, JsValue> {
        let reduced = window
            .match_media("(prefers-reduced-motion: reduce)")?
            .map(|query| query.matches())
            .unwrap_or(false);
        Ok(if reduced { Motion::Reduced } else { Motion::Animated })
    }
}

/// Read-only view of an attached background.
#[derive(Clone)]
pub struct Attached {
    app: Rc<RefCell<App>>,
}

impl Attached {
    /// Completed grid rebuilds triggered by window resizes.
    pub fn relayouts(&self) -> u32 {
        self.app.borrow().relayouts
    }

    /// Animation frames delivered so far.
    pub fn frames(&self) -> u32 {
        self.app.borrow().frames
    }

    pub fn pointer(&self) -> PointerState {
        *self.app.borrow().background.pointer()
    }
}

/// Attach the contour background to `canvas` honouring the user's motion
/// preference. `None` when the canvas has no 2-D context.
pub fn attach(canvas: HtmlCanvasElement) -> Result<Option<Attached>, JsValue> {
    let window = window().ok_or("no window")?;
    attach_with(canvas, Motion::preferred(&window)?)
}

/// Draw once, then either keep animating or stay static per `motion`.
pub fn attach_with(canvas: HtmlCanvasElement, motion: Motion) -> Result<Option<Attached>, JsValue> {
    let window = window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let Some(ctx) = canvas.get_context("2d")? else {
        console::warn_1(&JsValue::from_str("contour-bg: 2d context unavailable"));
        return Ok(None);
    };
    let ctx: CanvasRenderingContext2d = ctx.dyn_into()?;

    let config = ContourConfig::default();
    let (width, height) = fit_canvas(&window, &canvas, &ctx, &config)?;
    let app = Rc::new(RefCell::new(App {
        background: ContourBackground::new(config, session_seed(), width, height),
        surface: CanvasSurface { ctx },
        canvas,
        last_frame: None,
        relayouts: 0,
        frames: 0,
    }));
    app.borrow_mut().draw();
    let handle = Attached { app: app.clone() };

    events::on_resize(&window, app.clone())?;

    if motion == Motion::Reduced {
        console::log_1(&JsValue::from_str("contour-bg: reduced motion, static render"));
        return Ok(Some(handle));
    }

    events::on_pointer(&document, app.clone())?;
    events::on_visibility(&document, app.clone())?;

    // `f` holds the animation-frame closure so it can keep re-requesting
    // itself; it is created first and filled in afterwards.
    let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
        app.borrow_mut().frame(now);

        // schedule next
        if let Some(callback) = f.borrow().as_ref() {
            if let Err(err) = request_frame(callback) {
                console::error_1(&err);
            }
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(callback) = g.borrow().as_ref() {
        request_frame(callback)?;
    }

    Ok(Some(handle))
}
