//! Drawing targets for the contour renderer.
//!
//! The renderer only ever clears the surface and strokes batches of straight
//! segments, so that is all a backend has to provide. The browser canvas
//! implementation lives in the wasm module; the two here are headless.

use std::fmt::Write as _;

use crate::contour::{LevelStyle, Segment};

/// A 2-D surface that can be cleared and stroked.
pub trait Surface {
    /// Erase everything inside `width` x `height` (CSS pixels).
    fn clear(&mut self, width: f64, height: f64);

    /// Stroke every segment as one path with `style`.
    fn stroke_segments(&mut self, style: &LevelStyle, segments: &[Segment]);
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear { width: f64, height: f64 },
    Stroke { style: LevelStyle, segments: Vec<Segment> },
}

/// Keeps every call it receives. Used for headless tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stroke calls since the most recent clear.
    pub fn last_frame(&self) -> Vec<(&LevelStyle, &[Segment])> {
        let start = self
            .calls
            .iter()
            .rposition(|c| matches!(c, DrawCall::Clear { .. }))
            .map_or(0, |i| i + 1);
        self.calls[start..]
            .iter()
            .filter_map(|c| match c {
                DrawCall::Stroke { style, segments } => Some((style, segments.as_slice())),
                DrawCall::Clear { .. } => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.calls.push(DrawCall::Clear { width, height });
    }

    fn stroke_segments(&mut self, style: &LevelStyle, segments: &[Segment]) {
        self.calls.push(DrawCall::Stroke {
            style: *style,
            segments: segments.to_vec(),
        });
    }
}

/// Serialises a single frame as an SVG document, one `<path>` per level.
#[derive(Debug, Default)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    paths: String,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished document.
    pub fn finish(&self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{paths}</svg>\n",
            w = self.width,
            h = self.height,
            paths = self.paths,
        )
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.paths.clear();
    }

    fn stroke_segments(&mut self, style: &LevelStyle, segments: &[Segment]) {
        if segments.is_empty() {
            return;
        }
        let mut d = String::with_capacity(segments.len() * 32);
        for s in segments {
            let _ = write!(
                d,
                "M{:.2} {:.2}L{:.2} {:.2}",
                s.start.x, s.start.y, s.end.x, s.end.y
            );
        }
        let _ = writeln!(
            self.paths,
            "<path d=\"{d}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"/>",
            style.css_color(),
            style.width,
        );
    }
}
