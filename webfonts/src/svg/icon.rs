//! Flattening an SVG icon into a single outline.

use kurbo::{Affine, BezPath, Circle, Ellipse, Point, Rect, Shape};
use roxmltree::{Document, Node, ParsingOptions};

/// Tolerance, in icon units, when approximating circles and ellipses.
const SHAPE_TOLERANCE: f64 = 0.01;

/// Elements whose content is never painted directly.
const NON_RENDERED: &[&str] = &[
    "defs",
    "clipPath",
    "mask",
    "symbol",
    "pattern",
    "marker",
    "title",
    "desc",
    "metadata",
    "style",
    "script",
];

/// One parsed icon, in icon coordinates: origin at the top left of the
/// view box, y pointing down.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Icon {
    pub outline: BezPath,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub(crate) enum IconError {
    #[error("not valid UTF-8")]
    Encoding,
    #[error("invalid XML: {0}")]
    Xml(String),
    #[error("root element is <{0}>, not <svg>")]
    NotSvg(String),
    #[error("no usable viewBox, width or height")]
    NoDimensions,
    #[error("invalid path data in <{element}>: {reason}")]
    BadPath { element: String, reason: String },
    #[error("invalid transform '{0}'")]
    BadTransform(String),
}

impl Icon {
    pub(crate) fn parse(data: &[u8]) -> Result<Icon, IconError> {
        let text = std::str::from_utf8(data).map_err(|_| IconError::Encoding)?;
        let doc = Document::parse_with_options(
            text,
            ParsingOptions {
                allow_dtd: true,
                ..Default::default()
            },
        )
        .map_err(|e| IconError::Xml(e.to_string()))?;

        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(IconError::NotSvg(root.tag_name().name().to_owned()));
        }
        let view_box = view_box(root).ok_or(IconError::NoDimensions)?;

        let mut outline = BezPath::new();
        let origin = Affine::translate((-view_box.x0, -view_box.y0));
        for child in root.children().filter(Node::is_element) {
            flatten(child, origin, &mut outline)?;
        }
        Ok(Icon {
            outline,
            width: view_box.width(),
            height: view_box.height(),
        })
    }
}

fn view_box(root: Node) -> Option<Rect> {
    let rect = match root.attribute("viewBox") {
        Some(value) => {
            let [x, y, w, h]: [f64; 4] = numbers(value).ok()?.try_into().ok()?;
            Rect::new(x, y, x + w, y + h)
        }
        None => {
            let width = root.attribute("width").and_then(length)?;
            let height = root.attribute("height").and_then(length)?;
            Rect::new(0.0, 0.0, width, height)
        }
    };
    (rect.width() > 0.0 && rect.height() > 0.0 && rect.is_finite()).then_some(rect)
}

/// A length in user units; `px` is the only unit understood.
fn length(value: &str) -> Option<f64> {
    let value = value.trim();
    value
        .strip_suffix("px")
        .unwrap_or(value)
        .trim()
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
}

fn numbers(value: &str) -> Result<Vec<f64>, std::num::ParseFloatError> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

fn is_hidden(node: Node) -> bool {
    if node.attribute("display").map(str::trim) == Some("none") {
        return true;
    }
    node.attribute("style").is_some_and(|style| {
        style.split(';').any(|decl| {
            decl.split_once(':')
                .is_some_and(|(k, v)| k.trim() == "display" && v.trim() == "none")
        })
    })
}

fn flatten(node: Node, parent: Affine, out: &mut BezPath) -> Result<(), IconError> {
    let name = node.tag_name().name();
    if NON_RENDERED.contains(&name) || is_hidden(node) {
        return Ok(());
    }
    let mut transform = parent;
    if let Some(value) = node.attribute("transform") {
        transform *= parse_transform(value)?;
    }

    let attr = |name: &str| node.attribute(name).and_then(length).unwrap_or(0.0);
    let shape = match name {
        "g" | "a" | "switch" => None,
        "svg" => {
            transform *= Affine::translate((attr("x"), attr("y")));
            None
        }
        "path" => {
            let data = node.attribute("d").unwrap_or_default();
            Some(BezPath::from_svg(data).map_err(|e| IconError::BadPath {
                element: name.to_owned(),
                reason: e.to_string(),
            })?)
        }
        "rect" => rect(node),
        "circle" => {
            let r = attr("r");
            (r > 0.0).then(|| Circle::new((attr("cx"), attr("cy")), r).to_path(SHAPE_TOLERANCE))
        }
        "ellipse" => {
            let (rx, ry) = (attr("rx"), attr("ry"));
            (rx > 0.0 && ry > 0.0).then(|| {
                Ellipse::new((attr("cx"), attr("cy")), (rx, ry), 0.0).to_path(SHAPE_TOLERANCE)
            })
        }
        "line" => {
            let mut path = BezPath::new();
            path.move_to((attr("x1"), attr("y1")));
            path.line_to((attr("x2"), attr("y2")));
            Some(path)
        }
        "polyline" | "polygon" => {
            let points = node.attribute("points").unwrap_or_default();
            let coords = numbers(points).map_err(|e| IconError::BadPath {
                element: name.to_owned(),
                reason: e.to_string(),
            })?;
            let mut path = BezPath::new();
            for (i, pair) in coords.chunks_exact(2).enumerate() {
                let point = Point::new(pair[0], pair[1]);
                if i == 0 {
                    path.move_to(point);
                } else {
                    path.line_to(point);
                }
            }
            if name == "polygon" && !path.is_empty() {
                path.close_path();
            }
            Some(path)
        }
        other => {
            log::warn!("ignoring unsupported SVG element <{other}>");
            return Ok(());
        }
    };

    match shape {
        Some(mut path) => {
            path.apply_affine(transform);
            out.extend(path);
        }
        None => {
            for child in node.children().filter(Node::is_element) {
                flatten(child, transform, out)?;
            }
        }
    }
    Ok(())
}

fn rect(node: Node) -> Option<BezPath> {
    let attr = |name: &str| node.attribute(name).and_then(length);
    let (x, y) = (attr("x").unwrap_or(0.0), attr("y").unwrap_or(0.0));
    let (w, h) = (attr("width")?, attr("height")?);
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let (rx, ry) = match (attr("rx"), attr("ry")) {
        (Some(rx), Some(ry)) => (rx, ry),
        (Some(r), None) | (None, Some(r)) => (r, r),
        (None, None) => (0.0, 0.0),
    };
    let (rx, ry) = (rx.clamp(0.0, w / 2.0), ry.clamp(0.0, h / 2.0));
    if rx == 0.0 || ry == 0.0 {
        return Some(Rect::new(x, y, x + w, y + h).to_path(SHAPE_TOLERANCE));
    }

    // quarter ellipse arcs as cubics
    const KAPPA: f64 = 0.552_284_749_831;
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    let (right, bottom) = (x + w, y + h);
    let mut path = BezPath::new();
    path.move_to((x + rx, y));
    path.line_to((right - rx, y));
    path.curve_to((right - rx + kx, y), (right, y + ry - ky), (right, y + ry));
    path.line_to((right, bottom - ry));
    path.curve_to((right, bottom - ry + ky), (right - rx + kx, bottom), (right - rx, bottom));
    path.line_to((x + rx, bottom));
    path.curve_to((x + rx - kx, bottom), (x, bottom - ry + ky), (x, bottom - ry));
    path.line_to((x, y + ry));
    path.curve_to((x, y + ry - ky), (x + rx - kx, y), (x + rx, y));
    path.close_path();
    Some(path)
}

/// Parse an SVG transform list, e.g. `translate(10 20) rotate(45)`.
fn parse_transform(value: &str) -> Result<Affine, IconError> {
    let bad = || IconError::BadTransform(value.to_owned());
    let mut result = Affine::IDENTITY;
    let mut rest = value.trim();
    while !rest.is_empty() {
        let open = rest.find('(').ok_or_else(bad)?;
        let close = rest.find(')').ok_or_else(bad)?;
        if close < open {
            return Err(bad());
        }
        let name = rest[..open].trim().trim_start_matches(',').trim();
        let args = numbers(&rest[open + 1..close]).map_err(|_| bad())?;
        let step = match (name, args.as_slice()) {
            ("matrix", &[a, b, c, d, e, f]) => Affine::new([a, b, c, d, e, f]),
            ("translate", &[tx]) => Affine::translate((tx, 0.0)),
            ("translate", &[tx, ty]) => Affine::translate((tx, ty)),
            ("scale", &[s]) => Affine::scale(s),
            ("scale", &[sx, sy]) => Affine::scale_non_uniform(sx, sy),
            ("rotate", &[deg]) => Affine::rotate(deg.to_radians()),
            ("rotate", &[deg, cx, cy]) => Affine::rotate_about(deg.to_radians(), Point::new(cx, cy)),
            ("skewX", &[deg]) => Affine::skew(deg.to_radians().tan(), 0.0),
            ("skewY", &[deg]) => Affine::skew(0.0, deg.to_radians().tan()),
            _ => return Err(bad()),
        };
        result *= step;
        rest = rest[close + 1..].trim_start();
    }
    Ok(result)
}
