//! End-to-end behaviour of the headless contour pipeline.

use contour_wasm::contour::Segment;
use contour_wasm::surface::DrawCall;
use contour_wasm::{ContourBackground, ContourConfig, RecordingSurface, ScalarField, SvgSurface};

const FRAME: f64 = 1.0 / 60.0;

fn cross(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Proper intersection of two segments (shared endpoints and touching do not count).
fn properly_intersect(s: &Segment, t: &Segment) -> bool {
    let p = (s.start.x, s.start.y);
    let q = (s.end.x, s.end.y);
    let r = (t.start.x, t.start.y);
    let u = (t.end.x, t.end.y);
    let d1 = cross(p, q, r);
    let d2 = cross(p, q, u);
    let d3 = cross(r, u, p);
    let d4 = cross(r, u, q);
    let eps = 1e-9;
    ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps))
        && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps))
}

fn assert_no_crossings(surface: &RecordingSurface) {
    for (_, segments) in surface.last_frame() {
        for (i, s) in segments.iter().enumerate() {
            for t in &segments[i + 1..] {
                assert!(!properly_intersect(s, t));
            }
        }
    }
}

#[test]
fn viewport_800_by_600_with_fourteen_levels() {
    let config = ContourConfig {
        bump_height: 0.0,
        ..ContourConfig::default()
    };
    // A tilted plane running from -1 in the top-left sample to 1 in the
    // bottom-right one.
    let span = (81 + 61) as f64;
    let field = ScalarField::from_fn(800.0, 600.0, &config, |c, r| {
        -1.0 + 2.0 * (c + r) as f64 / span
    });
    let mut bg = ContourBackground::with_field(config, 2024, field);
    assert_eq!(bg.size(), (800.0, 600.0));
    assert_eq!((bg.field().cols(), bg.field().rows()), (82, 62));
    assert_eq!((bg.field().min(), bg.field().max()), (-1.0, 1.0));

    let thresholds = bg.thresholds();
    assert_eq!(thresholds.len(), 14);
    let step = 2.0 / 15.0;
    for (k, &t) in thresholds.iter().enumerate() {
        assert!(t > -1.0 && t < 1.0);
        assert!((t - (-1.0 + (k + 1) as f64 * step)).abs() < 1e-12);
    }

    let mut surface = RecordingSurface::new();
    bg.render(&mut surface);
    let frame = surface.last_frame();
    assert_eq!(frame.len(), 14);
    assert!(frame.iter().all(|(_, segments)| !segments.is_empty()));
    assert_no_crossings(&surface);
}

#[test]
fn noise_field_contours_never_cross() {
    let mut bg = ContourBackground::new(ContourConfig::default(), 2024, 800.0, 600.0);
    assert_eq!((bg.field().cols(), bg.field().rows()), (82, 62));

    let live = bg.thresholds();
    assert_eq!(live.len(), 14);
    assert!(live[0] > bg.field().min());

    let mut surface = RecordingSurface::new();
    bg.render(&mut surface);
    assert_no_crossings(&surface);
}

#[test]
fn bump_never_lowers_the_field() {
    let mut bg = ContourBackground::new(ContourConfig::default(), 5, 640.0, 480.0);
    bg.pointer_move(320.0, 240.0);
    for _ in 0..20 {
        bg.tick(FRAME);
    }
    let field = bg.field();
    let radius = field.bump_radius();
    let (px, py) = bg.pointer().smoothed;
    for r in 0..field.rows() {
        for c in 0..field.cols() {
            let i = r * field.cols() + c;
            let dx = c as f64 * field.cell_size() - px;
            let dy = r as f64 * field.cell_size() - py;
            assert!(field.displayed()[i] >= field.base()[i]);
            if (dx * dx + dy * dy).sqrt() > radius {
                assert_eq!(field.displayed()[i], field.base()[i]);
            }
        }
    }
}

#[test]
fn snap_after_fade_out() {
    let mut bg = ContourBackground::new(ContourConfig::default(), 9, 800.0, 600.0);
    bg.pointer_move(100.0, 100.0);
    for _ in 0..120 {
        bg.tick(FRAME);
    }
    bg.pointer_leave();
    while bg.pointer().intensity > 0.0 {
        bg.tick(FRAME);
    }
    assert_eq!(bg.pointer().smoothed, (100.0, 100.0));

    bg.pointer_move(500.0, 500.0);
    assert!(bg.tick(FRAME));
    assert_eq!(bg.pointer().smoothed, (500.0, 500.0));
}

#[test]
fn flat_field_draws_nothing() {
    let config = ContourConfig {
        octaves: 0,
        bump_height: 0.0,
        ..ContourConfig::default()
    };
    let mut bg = ContourBackground::new(config, 1, 300.0, 200.0);
    assert!(bg.thresholds().is_empty());

    let mut surface = RecordingSurface::new();
    bg.render(&mut surface);
    assert_eq!(surface.calls, vec![DrawCall::Clear { width: 300.0, height: 200.0 }]);
}

#[test]
fn redraw_only_when_something_moves() {
    let mut bg = ContourBackground::new(ContourConfig::default(), 3, 400.0, 400.0);
    let mut frames_drawn = 0;
    bg.pointer_move(200.0, 200.0);
    for _ in 0..600 {
        if bg.tick(FRAME) {
            frames_drawn += 1;
        }
    }
    // The fade-in settles well before ten seconds of frames.
    assert!(frames_drawn > 0 && frames_drawn < 600);
    assert!(!bg.tick(FRAME));
}

#[test]
fn same_seed_renders_the_same_svg() {
    let render = |seed| {
        let mut bg = ContourBackground::new(ContourConfig::default(), seed, 320.0, 240.0);
        let mut svg = SvgSurface::new();
        bg.render(&mut svg);
        svg.finish()
    };
    let a = render(77);
    assert_eq!(a, render(77));
    assert_ne!(a, render(78));
    assert!(a.matches("<path").count() > 0);
}
