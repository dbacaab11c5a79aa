//! Reading an SVG font document back into glyph outlines.

use kurbo::BezPath;

const DEFAULT_UNITS_PER_EM: f64 = 1000.0;

/// The parts of an SVG font that end up in the TrueType font.
#[derive(Clone, Debug)]
pub(crate) struct SvgFont {
    pub family: String,
    pub units_per_em: f64,
    pub ascent: f64,
    /// Distance below the baseline, as a negative number.
    pub descent: f64,
    pub weight: Option<String>,
    pub missing_glyph: Option<SvgGlyph>,
    pub glyphs: Vec<SvgGlyph>,
}

#[derive(Clone, Debug)]
pub(crate) struct SvgGlyph {
    pub name: Option<String>,
    pub unicode: Vec<char>,
    pub advance: f64,
    pub outline: BezPath,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub(crate) enum SvgFontError {
    #[error("SVG font is not UTF-8")]
    Encoding,
    #[error("SVG font is not well formed: {0}")]
    Xml(String),
    #[error("no <font> element")]
    NoFont,
    #[error("bad value '{value}' for {attribute}")]
    BadNumber { attribute: &'static str, value: String },
    #[error("glyph {glyph}: bad path data: {reason}")]
    BadPath { glyph: String, reason: String },
}

impl SvgFont {
    pub fn parse(data: &[u8]) -> Result<Self, SvgFontError> {
        let text = std::str::from_utf8(data).map_err(|_| SvgFontError::Encoding)?;
        let doc = roxmltree::Document::parse_with_options(
            text,
            roxmltree::ParsingOptions {
                allow_dtd: true,
                ..Default::default()
            },
        )
        .map_err(|e| SvgFontError::Xml(e.to_string()))?;

        let font = doc
            .descendants()
            .find(|node| node.has_tag_name("font"))
            .ok_or(SvgFontError::NoFont)?;
        let face = font.children().find(|node| node.has_tag_name("font-face"));
        let face_attr = |name: &str| face.and_then(|face| face.attribute(name));

        let units_per_em = number(face_attr("units-per-em"), "units-per-em")?
            .unwrap_or(DEFAULT_UNITS_PER_EM);
        let descent = -number(face_attr("descent"), "descent")?
            .unwrap_or(0.0)
            .abs();
        let ascent = number(face_attr("ascent"), "ascent")?.unwrap_or(units_per_em + descent);
        let default_advance = number(font.attribute("horiz-adv-x"), "horiz-adv-x")?.unwrap_or(0.0);
        let family = face_attr("font-family")
            .or_else(|| font.attribute("id"))
            .unwrap_or("iconfont")
            .to_string();

        let parse_glyph = |node: roxmltree::Node| -> Result<SvgGlyph, SvgFontError> {
            let name = node.attribute("glyph-name").map(str::to_string);
            let advance =
                number(node.attribute("horiz-adv-x"), "horiz-adv-x")?.unwrap_or(default_advance);
            let outline = match node.attribute("d").map(str::trim) {
                Some(d) if !d.is_empty() => {
                    BezPath::from_svg(d).map_err(|e| SvgFontError::BadPath {
                        glyph: name.clone().unwrap_or_default(),
                        reason: e.to_string(),
                    })?
                }
                _ => BezPath::new(),
            };
            Ok(SvgGlyph {
                unicode: node.attribute("unicode").unwrap_or_default().chars().collect(),
                name,
                advance,
                outline,
            })
        };

        let missing_glyph = font
            .children()
            .find(|node| node.has_tag_name("missing-glyph"))
            .map(parse_glyph)
            .transpose()?;
        let glyphs = font
            .children()
            .filter(|node| node.has_tag_name("glyph"))
            .map(parse_glyph)
            .collect::<Result<_, _>>()?;

        Ok(SvgFont {
            family,
            units_per_em,
            ascent,
            descent,
            weight: face_attr("font-weight").map(str::to_string),
            missing_glyph,
            glyphs,
        })
    }
}

fn number(value: Option<&str>, attribute: &'static str) -> Result<Option<f64>, SvgFontError> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| SvgFontError::BadNumber {
                    attribute,
                    value: raw.to_string(),
                })
        })
        .transpose()
}
