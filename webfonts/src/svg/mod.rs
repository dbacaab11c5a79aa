//! Composing an SVG font from a stream of icons.
//!
//! Every icon is flattened into one outline, scaled into font units and
//! flipped so y points up. The font has one `<glyph>` per codepoint and one
//! per ligature string, both sharing the icon's outline.

mod icon;

use std::fmt::Write;

use kurbo::{Affine, BezPath, PathEl, Point, Shape};

use crate::{
    error::{Error, Result},
    format::Format,
    glyph::GlyphSource,
    options::SvgOptions,
};

use icon::Icon;

/// Compose an SVG font from `glyphs`, in the given order.
pub fn compose(glyphs: &[GlyphSource], options: &SvgOptions) -> Result<String> {
    let icons = glyphs
        .iter()
        .map(|glyph| {
            let data = glyph.read()?;
            Icon::parse(&data).map_err(|e| Error::malformed(&glyph.name, e))
        })
        .collect::<Result<Vec<_>>>()?;

    let metrics = Metrics::new(&icons, options);
    let mut placed: Vec<_> = icons.iter().map(|icon| metrics.place(icon)).collect();
    let max_advance = placed.iter().map(|g| g.advance).fold(0.0, f64::max);
    if options.fixed_width {
        for glyph in &mut placed {
            glyph.advance = max_advance;
        }
    }
    if options.center_horizontally {
        for glyph in &mut placed {
            glyph.center();
        }
    }

    let font_name = options.font_name.as_deref().unwrap_or("iconfont");
    let font_id = options.font_id.as_deref().unwrap_or(font_name);
    let mut out = String::new();
    write_header(&mut out, font_id, font_name, &metrics, max_advance, options)
        .and_then(|_| write_glyphs(&mut out, glyphs, &placed, &metrics))
        .map_err(|e| Error::conversion(Format::Svg, e))?;
    out.push_str("  </font>\n</defs>\n</svg>\n");
    log::debug!("composed SVG font '{font_name}' with {} glyphs", glyphs.len());
    Ok(out)
}

/// One `<glyph>` for the codepoint of each icon and one for its ligature.
fn write_glyphs(
    out: &mut String,
    glyphs: &[GlyphSource],
    placed: &[PlacedGlyph],
    metrics: &Metrics,
) -> std::fmt::Result {
    let num = |v: f64| metrics.format_number(v);
    for (glyph, placed) in glyphs.iter().zip(placed) {
        let d = path_data(&placed.outline, &num);
        let advance = num(placed.advance);
        let ligature: String = glyph.ligature().into_iter().collect();
        for unicode in [
            format!("&#x{:X};", glyph.codepoint as u32),
            escape_text(&ligature),
        ] {
            writeln!(
                out,
                "    <glyph glyph-name=\"{}\"\n      unicode=\"{unicode}\"\n      horiz-adv-x=\"{advance}\" d=\"{d}\" />",
                escape_text(&glyph.name),
            )?;
        }
    }
    Ok(())
}

fn write_header(
    out: &mut String,
    font_id: &str,
    font_name: &str,
    metrics: &Metrics,
    max_advance: f64,
    options: &SvgOptions,
) -> std::fmt::Result {
    let num = |v: f64| metrics.format_number(v);
    writeln!(out, "<?xml version=\"1.0\" standalone=\"no\"?>")?;
    writeln!(
        out,
        "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\" >"
    )?;
    writeln!(out, "<svg xmlns=\"http://www.w3.org/2000/svg\">")?;
    writeln!(out, "<defs>")?;
    writeln!(
        out,
        "  <font id=\"{}\" horiz-adv-x=\"{}\">",
        escape_text(font_id),
        num(max_advance)
    )?;
    write!(
        out,
        "    <font-face font-family=\"{}\"\n      units-per-em=\"{}\" ascent=\"{}\"\n      descent=\"{}\"",
        escape_text(font_name),
        num(metrics.font_height),
        num(metrics.ascent),
        num(-metrics.descent),
    )?;
    if let Some(weight) = &options.font_weight {
        write!(out, "\n      font-weight=\"{}\"", escape_text(weight))?;
    }
    if let Some(style) = &options.font_style {
        write!(out, "\n      font-style=\"{}\"", escape_text(style))?;
    }
    writeln!(out, " />")?;
    writeln!(out, "    <missing-glyph horiz-adv-x=\"0\" />")
}

/// Vertical metrics shared by every glyph, and the scale policy.
struct Metrics {
    font_height: f64,
    ascent: f64,
    descent: f64,
    /// The tallest icon, used for the uniform scale when not normalizing.
    max_height: f64,
    normalize: bool,
    round: f64,
}

/// An icon placed in font units.
struct PlacedGlyph {
    outline: BezPath,
    advance: f64,
}

impl Metrics {
    fn new(icons: &[Icon], options: &SvgOptions) -> Self {
        let max_height = icons.iter().map(|icon| icon.height).fold(0.0, f64::max);
        let font_height = options
            .font_height
            .filter(|h| *h > 0.0)
            .unwrap_or(max_height);
        let descent = options.descent.unwrap_or(0.0);
        Metrics {
            font_height,
            ascent: options.ascent.unwrap_or(font_height - descent),
            descent,
            max_height,
            normalize: options.normalize.unwrap_or(false),
            round: options.round.filter(|r| *r > 0.0).unwrap_or(1e4),
        }
    }

    fn place(&self, icon: &Icon) -> PlacedGlyph {
        let scale = if self.normalize {
            self.font_height / icon.height
        } else {
            self.font_height / self.max_height
        };
        // flip y, move the baseline up by `descent`
        let transform = Affine::new([
            scale,
            0.0,
            0.0,
            -scale,
            0.0,
            icon.height * scale - self.descent,
        ]);
        let mut outline = icon.outline.clone();
        outline.apply_affine(transform);
        PlacedGlyph {
            outline: round_path(&outline, self.round),
            advance: round_to(icon.width * scale, self.round),
        }
    }

    fn format_number(&self, value: f64) -> String {
        let value = round_to(value, self.round);
        // avoid "-0"
        if value == 0.0 {
            "0".to_owned()
        } else {
            value.to_string()
        }
    }
}

impl PlacedGlyph {
    fn center(&mut self) {
        if self.outline.is_empty() {
            return;
        }
        let bounds = self.outline.bounding_box();
        let shift = (self.advance - bounds.width()) / 2.0 - bounds.x0;
        self.outline.apply_affine(Affine::translate((shift, 0.0)));
    }
}

fn round_to(value: f64, factor: f64) -> f64 {
    (value * factor).round() / factor
}

fn round_path(path: &BezPath, factor: f64) -> BezPath {
    let r = |p: Point| Point::new(round_to(p.x, factor), round_to(p.y, factor));
    path.elements()
        .iter()
        .map(|el| match *el {
            PathEl::MoveTo(p) => PathEl::MoveTo(r(p)),
            PathEl::LineTo(p) => PathEl::LineTo(r(p)),
            PathEl::QuadTo(c, p) => PathEl::QuadTo(r(c), r(p)),
            PathEl::CurveTo(c1, c2, p) => PathEl::CurveTo(r(c1), r(c2), r(p)),
            PathEl::ClosePath => PathEl::ClosePath,
        })
        .collect()
}

fn path_data(path: &BezPath, num: &impl Fn(f64) -> String) -> String {
    let pt = |p: Point| format!("{} {}", num(p.x), num(p.y));
    let mut d = String::new();
    for el in path.elements() {
        let part = match *el {
            PathEl::MoveTo(p) => format!("M{}", pt(p)),
            PathEl::LineTo(p) => format!("L{}", pt(p)),
            PathEl::QuadTo(c, p) => format!("Q{} {}", pt(c), pt(p)),
            PathEl::CurveTo(c1, c2, p) => format!("C{} {} {}", pt(c1), pt(c2), pt(p)),
            PathEl::ClosePath => "Z".to_owned(),
        };
        d.push_str(&part);
    }
    d
}

/// Escape text for use in an XML attribute; non-ASCII becomes a character reference.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c => out.push_str(&format!("&#x{:X};", c as u32)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn glyphs() -> Vec<GlyphSource> {
        vec![
            GlyphSource::new(webfonts_test_data::CLOSE, "close", '\u{F101}'),
            GlyphSource::new(webfonts_test_data::DOT, "dot", '\u{F102}'),
        ]
    }

    fn parse(svg: &str) -> Vec<(String, String, String)> {
        let doc = roxmltree::Document::parse_with_options(
            svg,
            roxmltree::ParsingOptions {
                allow_dtd: true,
                ..Default::default()
            },
        )
        .unwrap();
        doc.descendants()
            .filter(|n| n.has_tag_name("glyph"))
            .map(|n| {
                (
                    n.attribute("glyph-name").unwrap().to_owned(),
                    n.attribute("unicode").unwrap().to_owned(),
                    n.attribute("horiz-adv-x").unwrap().to_owned(),
                )
            })
            .collect()
    }

    #[test]
    fn one_glyph_per_codepoint_and_ligature() {
        let svg = compose(&glyphs(), &SvgOptions::default()).unwrap();
        assert!(svg.contains("unicode=\"&#xF101;\""), "{svg}");
        let parsed = parse(&svg);
        let names: Vec<_> = parsed.iter().map(|(n, u, _)| (n.as_str(), u.as_str())).collect();
        assert_eq!(
            names,
            [
                ("close", "\u{F101}"),
                ("close", "close"),
                ("dot", "\u{F102}"),
                ("dot", "dot"),
            ]
        );
    }

    #[test]
    fn uniform_scale_without_normalize() {
        // the 16 unit dot is scaled by the same factor as the 24 unit close icon
        let svg = compose(&glyphs(), &SvgOptions::default()).unwrap();
        let advances: Vec<_> = parse(&svg).into_iter().map(|(_, _, adv)| adv).collect();
        assert_eq!(advances, ["24", "24", "16", "16"]);
        assert!(svg.contains("units-per-em=\"24\""));
    }

    #[test]
    fn normalize_scales_each_icon() {
        let options = SvgOptions {
            font_height: Some(1000.0),
            normalize: Some(true),
            ..Default::default()
        };
        let svg = compose(&glyphs(), &options).unwrap();
        let advances: Vec<_> = parse(&svg).into_iter().map(|(_, _, adv)| adv).collect();
        assert_eq!(advances, ["1000", "1000", "1000", "1000"]);
    }

    #[test]
    fn fixed_width_and_font_face() {
        let options = SvgOptions {
            font_name: Some("glyphs".into()),
            fixed_width: true,
            center_horizontally: true,
            descent: Some(2.0),
            font_weight: Some("bold".into()),
            ..Default::default()
        };
        let svg = compose(&glyphs(), &options).unwrap();
        assert!(svg.contains("<font id=\"glyphs\" horiz-adv-x=\"24\">"), "{svg}");
        assert!(svg.contains("font-family=\"glyphs\""));
        assert!(svg.contains("ascent=\"22\""));
        assert!(svg.contains("descent=\"-2\""));
        assert!(svg.contains("font-weight=\"bold\""));
        assert!(parse(&svg).iter().all(|(_, _, adv)| adv == "24"));
    }

    #[test]
    fn outline_is_flipped() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10">
            <rect x="0" y="0" width="10" height="2"/>
        </svg>"#;
        let glyphs = [GlyphSource::new(svg, "bar", 'a')];
        let font = compose(&glyphs, &SvgOptions::default()).unwrap();
        // the bar at the top of the icon ends up at the top of the em
        assert!(font.contains("d=\"M0 10L10 10L10 8L0 8Z\""), "{font}");
    }

    #[test]
    fn malformed_icon_names_the_glyph() {
        let glyphs = [GlyphSource::new(
            webfonts_test_data::malformed::BAD_PATH,
            "broken",
            'a',
        )];
        let err = compose(&glyphs, &SvgOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedGlyph { name, .. } if name == "broken"));
    }

    #[test]
    fn names_and_font_face_are_escaped() {
        let glyphs = [GlyphSource::new(webfonts_test_data::CLOSE, "café", '\u{F101}')];
        let options = SvgOptions {
            font_name: Some("a&b".into()),
            font_style: Some("italic".into()),
            ..Default::default()
        };
        let svg = compose(&glyphs, &options).unwrap();
        assert!(svg.contains("glyph-name=\"caf&#xE9;\""), "{svg}");
        assert!(svg.contains("font-family=\"a&amp;b\""), "{svg}");
        assert!(svg.contains("font-style=\"italic\""), "{svg}");
        let names: Vec<_> = parse(&svg).into_iter().map(|(name, ..)| name).collect();
        assert_eq!(names, ["café", "café"]);
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_text("a<\"é\">"), "a&lt;&quot;&#xE9;&quot;&gt;");
    }
}
