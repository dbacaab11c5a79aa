//! Turning kurbo paths into TrueType contours.

use kurbo::{BezPath, CubicBez, PathEl, Point};
use write_fonts::{
    read::tables::glyf::CurvePoint,
    tables::glyf::{Contour, SimpleGlyph},
};

/// Maximum distance, in font units, between a cubic and its quadratic
/// approximation.
const CUBIC_TOLERANCE: f64 = 0.5;

/// A point rounded to font units.
type Pt = (i16, i16, bool);

/// Build a glyph from `path`, which is already in font units with y up.
///
/// Contours are reversed so that outer contours run clockwise, as TrueType
/// expects. Degenerate contours are dropped.
pub(crate) fn simple_glyph(path: &BezPath) -> SimpleGlyph {
    let mut glyph = SimpleGlyph {
        contours: contours(path)
            .into_iter()
            .filter_map(cleanup)
            .map(|points| {
                points
                    .into_iter()
                    .map(|(x, y, on_curve)| CurvePoint { x, y, on_curve })
                    .collect::<Vec<_>>()
                    .into()
            })
            .collect::<Vec<Contour>>(),
        ..Default::default()
    };
    glyph.recompute_bounding_box();
    glyph
}

fn contours(path: &BezPath) -> Vec<Vec<Pt>> {
    let mut contours = Vec::new();
    let mut current = Vec::new();
    let mut last = Point::ZERO;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                if !current.is_empty() {
                    contours.push(std::mem::take(&mut current));
                }
                current.push(on(p));
                last = p;
            }
            PathEl::LineTo(p) => {
                current.push(on(p));
                last = p;
            }
            PathEl::QuadTo(c, p) => {
                current.extend([off(c), on(p)]);
                last = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                for (_, _, quad) in CubicBez::new(last, c1, c2, p).to_quads(CUBIC_TOLERANCE) {
                    current.extend([off(quad.p1), on(quad.p2)]);
                }
                last = p;
            }
            PathEl::ClosePath => {
                if !current.is_empty() {
                    contours.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        contours.push(current);
    }
    contours
}

/// Drop repeated points and an explicit closing point, then reverse the
/// direction while keeping the starting point.
fn cleanup(mut points: Vec<Pt>) -> Option<Vec<Pt>> {
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return None;
    }
    points[1..].reverse();
    Some(points)
}

fn on(p: Point) -> Pt {
    (round(p.x), round(p.y), true)
}

fn off(p: Point) -> Pt {
    (round(p.x), round(p.y), false)
}

fn round(v: f64) -> i16 {
    v.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}
