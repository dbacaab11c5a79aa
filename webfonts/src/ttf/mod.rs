//! Compiling an SVG font into a TrueType font.
//!
//! Glyphs that share a `glyph-name` in the SVG font become one TrueType
//! glyph. Single-character `unicode` values go into `cmap`; longer ones
//! become ligatures in a `GSUB` `liga` feature.

mod outline;
mod svg_font;

use std::collections::HashMap;

use indexmap::IndexMap;
use kurbo::{Affine, BezPath};
use write_fonts::{
    tables::{
        cmap::Cmap,
        glyf::{Bbox, Glyf, GlyfLocaBuilder, SimpleGlyph},
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::{Loca, LocaFormat},
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::Os2,
        post::Post,
    },
    types::{FWord, Fixed, GlyphId, NameId, UfWord},
    FontBuilder,
};

use crate::{
    error::{Error, Result},
    format::Format,
    gsub::{self, Ligature},
    options::TtfOptions,
    sfnt,
};

use svg_font::{SvgFont, SvgGlyph};

/// Fonts with a smaller em are scaled up to this.
const MIN_UNITS_PER_EM: f64 = 1000.0;
const MAX_UNITS_PER_EM: f64 = 16384.0;
const DEFAULT_DESCRIPTION: &str = "Generated by webfonts";
const DEFAULT_VERSION: &str = "1.0";

const WINDOWS: u16 = 3;
const UNICODE_BMP: u16 = 1;
const ENGLISH_US: u16 = 0x409;

/// Compile the SVG font in `svg` to TrueType.
pub fn compile(svg: &[u8], options: &TtfOptions) -> Result<Vec<u8>> {
    let font = SvgFont::parse(svg).map_err(|e| Error::conversion(Format::Ttf, e))?;
    if !(font.units_per_em > 0.0 && font.units_per_em <= MAX_UNITS_PER_EM) {
        return Err(Error::conversion(
            Format::Ttf,
            format!("units-per-em {} out of range", font.units_per_em),
        ));
    }
    let units_per_em = font.units_per_em.round().max(MIN_UNITS_PER_EM);
    let scale = units_per_em / font.units_per_em;
    if scale != 1.0 {
        log::debug!(
            "ttf: scaling em of {} up to {units_per_em}",
            font.units_per_em
        );
    }

    let glyphs = GlyphSet::new(&font, scale)?;
    let mut builder = FontBuilder::new();
    let tables = Tables::new(&font, &glyphs, units_per_em, options)?;
    tables.add_to(&mut builder)?;
    if !glyphs.ligatures.is_empty() {
        let gsub = gsub::build(&glyphs.ligatures).map_err(|e| Error::conversion(Format::Ttf, e))?;
        builder
            .add_table(&gsub)
            .map_err(|e| Error::conversion(Format::Ttf, e))?;
    }
    let mut data = builder.build();
    sfnt::set_checksum_adjustment(&mut data).map_err(|e| Error::conversion(Format::Ttf, e))?;
    log::debug!(
        "ttf: {} glyphs, {} ligatures, {} bytes",
        glyphs.glyphs.len(),
        glyphs.ligatures.len(),
        data.len()
    );
    Ok(data)
}

/// One TrueType glyph.
struct Glyph {
    name: String,
    advance: u16,
    outline: SimpleGlyph,
}

impl Glyph {
    fn new(name: String, source: &SvgGlyph, scale: f64) -> Self {
        let outline = source.outline.clone();
        Glyph {
            name,
            advance: scaled_advance(source.advance, scale),
            outline: outline::simple_glyph(&scaled(outline, scale)),
        }
    }

    fn empty(name: String) -> Self {
        Glyph {
            name,
            advance: 0,
            outline: SimpleGlyph::default(),
        }
    }

    fn is_empty(&self) -> bool {
        self.outline.contours.is_empty()
    }

    fn lsb(&self) -> i16 {
        if self.is_empty() {
            0
        } else {
            self.outline.bbox.x_min
        }
    }

    fn num_points(&self) -> usize {
        self.outline.contours.iter().map(|c| c.len()).sum()
    }
}

/// Glyphs in font order, with their character mappings and ligatures.
struct GlyphSet {
    glyphs: Vec<Glyph>,
    mappings: IndexMap<char, GlyphId>,
    ligatures: Vec<Ligature>,
}

impl GlyphSet {
    fn new(font: &SvgFont, scale: f64) -> Result<Self> {
        let notdef = match &font.missing_glyph {
            Some(missing) => Glyph::new(".notdef".into(), missing, scale),
            None => Glyph::empty(".notdef".into()),
        };
        let mut glyphs = vec![notdef];
        let mut by_name: HashMap<String, GlyphId> = HashMap::new();
        let mut mappings = IndexMap::new();
        let mut ligature_sources: Vec<(Vec<char>, GlyphId)> = Vec::new();

        for (i, source) in font.glyphs.iter().enumerate() {
            let name = source
                .name
                .clone()
                .unwrap_or_else(|| format!("glyph{i}"));
            let gid = match by_name.get(&name) {
                Some(gid) => *gid,
                None => {
                    let gid = glyph_id(glyphs.len())?;
                    by_name.insert(name.clone(), gid);
                    glyphs.push(Glyph::new(name, source, scale));
                    gid
                }
            };
            match source.unicode.as_slice() {
                [] => (),
                [c] => {
                    mappings.entry(*c).or_insert(gid);
                }
                chars => ligature_sources.push((chars.to_vec(), gid)),
            }
        }

        // every ligature component needs a glyph of its own
        for c in ligature_sources.iter().flat_map(|(chars, _)| chars) {
            if !mappings.contains_key(c) {
                let gid = glyph_id(glyphs.len())?;
                glyphs.push(Glyph::empty(component_name(*c)));
                mappings.insert(*c, gid);
            }
        }
        let ligatures = ligature_sources
            .into_iter()
            .map(|(chars, glyph)| Ligature {
                components: chars.iter().map(|c| mappings[c]).collect(),
                glyph,
            })
            .collect();

        Ok(GlyphSet {
            glyphs,
            mappings,
            ligatures,
        })
    }

    fn bbox(&self) -> Bbox {
        self.glyphs
            .iter()
            .filter(|g| !g.is_empty())
            .map(|g| g.outline.bbox)
            .reduce(Bbox::union)
            .unwrap_or_default()
    }

    fn max_context(&self) -> u16 {
        self.ligatures
            .iter()
            .map(|lig| lig.components.len() as u16)
            .max()
            .unwrap_or(0)
    }
}

/// The `post` name for a glyph that only exists as a ligature component.
fn component_name(c: char) -> String {
    match c as u32 {
        cp @ 0..=0xFFFF => format!("uni{cp:04X}"),
        cp => format!("u{cp:05X}"),
    }
}

fn glyph_id(index: usize) -> Result<GlyphId> {
    u16::try_from(index)
        .map(|gid| GlyphId::new(gid as u32))
        .map_err(|_| Error::conversion(Format::Ttf, "too many glyphs"))
}

fn scaled(mut path: BezPath, scale: f64) -> BezPath {
    if scale != 1.0 {
        path.apply_affine(Affine::scale(scale));
    }
    path
}

fn scaled_advance(advance: f64, scale: f64) -> u16 {
    (advance * scale).round().clamp(0.0, u16::MAX as f64) as u16
}

fn scaled_metric(value: f64, scale: f64) -> i16 {
    (value * scale)
        .round()
        .clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// The tables compiled with `write-fonts`.
struct Tables {
    head: Head,
    hhea: Hhea,
    maxp: Maxp,
    os2: Os2,
    hmtx: Hmtx,
    cmap: Cmap,
    glyf: Glyf,
    loca: Loca,
    name: Name,
    post: Post,
}

impl Tables {
    fn new(
        font: &SvgFont,
        glyphs: &GlyphSet,
        units_per_em: f64,
        options: &TtfOptions,
    ) -> Result<Self> {
        let scale = units_per_em / font.units_per_em;
        let ascender = scaled_metric(font.ascent, scale);
        let descender = scaled_metric(font.descent, scale);
        let bbox = glyphs.bbox();
        let inked = || glyphs.glyphs.iter().filter(|g| !g.is_empty());

        let mut glyf_loca = GlyfLocaBuilder::new();
        for glyph in &glyphs.glyphs {
            glyf_loca
                .add_glyph(&glyph.outline)
                .map_err(|e| Error::conversion(Format::Ttf, format!("glyph {}: {e}", glyph.name)))?;
        }
        let (glyf, loca, loca_format) = glyf_loca.build();

        let version = options.version.as_deref().unwrap_or(DEFAULT_VERSION);
        let head = Head {
            font_revision: Fixed::from_f64(revision(version)),
            units_per_em: units_per_em as u16,
            x_min: bbox.x_min,
            y_min: bbox.y_min,
            x_max: bbox.x_max,
            y_max: bbox.y_max,
            lowest_rec_ppem: 8,
            index_to_loc_format: match loca_format {
                LocaFormat::Short => 0,
                LocaFormat::Long => 1,
            },
            ..Default::default()
        };

        let num_glyphs = u16::try_from(glyphs.glyphs.len())
            .map_err(|_| Error::conversion(Format::Ttf, "too many glyphs"))?;
        let advance_max = glyphs.glyphs.iter().map(|g| g.advance).max().unwrap_or(0);
        let hhea = Hhea {
            ascender: FWord::new(ascender),
            descender: FWord::new(descender),
            line_gap: FWord::new(0),
            advance_width_max: UfWord::new(advance_max),
            min_left_side_bearing: FWord::new(inked().map(Glyph::lsb).min().unwrap_or(0)),
            min_right_side_bearing: FWord::new(
                inked()
                    .map(|g| (g.advance as i32 - g.outline.bbox.x_max as i32) as i16)
                    .min()
                    .unwrap_or(0),
            ),
            x_max_extent: FWord::new(inked().map(|g| g.outline.bbox.x_max).max().unwrap_or(0)),
            caret_slope_rise: 1,
            number_of_h_metrics: num_glyphs,
            ..Default::default()
        };

        let hmtx = Hmtx {
            h_metrics: glyphs
                .glyphs
                .iter()
                .map(|g| LongMetric {
                    advance: g.advance,
                    side_bearing: g.lsb(),
                })
                .collect(),
            left_side_bearings: Vec::new(),
        };

        let maxp = Maxp {
            num_glyphs,
            max_points: Some(
                glyphs.glyphs.iter().map(Glyph::num_points).max().unwrap_or(0) as u16,
            ),
            max_contours: Some(
                glyphs
                    .glyphs
                    .iter()
                    .map(|g| g.outline.contours.len())
                    .max()
                    .unwrap_or(0) as u16,
            ),
            max_composite_points: Some(0),
            max_composite_contours: Some(0),
            max_zones: Some(2),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(0),
            max_component_depth: Some(0),
        };

        let codepoints = || glyphs.mappings.keys().map(|c| *c as u32);
        let advances: Vec<_> = inked().map(|g| g.advance as u32).collect();
        let os2 = Os2 {
            x_avg_char_width: advances
                .iter()
                .sum::<u32>()
                .checked_div(advances.len() as u32)
                .unwrap_or(0) as i16,
            us_weight_class: weight_class(font.weight.as_deref()),
            us_width_class: 5,
            ul_unicode_range_2: if codepoints().any(is_private_use) {
                1 << 28
            } else {
                0
            },
            us_first_char_index: codepoints().min().unwrap_or(0).min(0xFFFF) as u16,
            us_last_char_index: codepoints().max().unwrap_or(0).min(0xFFFF) as u16,
            s_typo_ascender: ascender,
            s_typo_descender: descender,
            s_typo_line_gap: 0,
            us_win_ascent: ascender.max(bbox.y_max).max(0) as u16,
            us_win_descent: descender.min(bbox.y_min).min(0).unsigned_abs(),
            ul_code_page_range_1: Some(1),
            ul_code_page_range_2: Some(0),
            sx_height: Some(0),
            s_cap_height: Some(0),
            us_default_char: Some(0),
            us_break_char: Some(32),
            us_max_context: Some(glyphs.max_context()),
            ..Default::default()
        };

        let cmap = Cmap::from_mappings(glyphs.mappings.iter().map(|(c, gid)| (*c, *gid)))
            .map_err(|e| Error::conversion(Format::Ttf, e))?;

        let post = Post::new_v2(glyphs.glyphs.iter().map(|g| g.name.as_str()));

        let mut name = Name::default();
        name.name_record
            .extend(name_records(&font.family, version, options));

        Ok(Tables {
            head,
            hhea,
            maxp,
            os2,
            hmtx,
            cmap,
            glyf,
            loca,
            name,
            post,
        })
    }

    fn add_to(&self, builder: &mut FontBuilder) -> Result<()> {
        let convert = |e| Error::conversion(Format::Ttf, e);
        builder
            .add_table(&self.head)
            .and_then(|b| b.add_table(&self.hhea))
            .and_then(|b| b.add_table(&self.maxp))
            .and_then(|b| b.add_table(&self.os2))
            .and_then(|b| b.add_table(&self.hmtx))
            .and_then(|b| b.add_table(&self.cmap))
            .and_then(|b| b.add_table(&self.glyf))
            .and_then(|b| b.add_table(&self.loca))
            .and_then(|b| b.add_table(&self.name))
            .and_then(|b| b.add_table(&self.post))
            .map_err(convert)?;
        Ok(())
    }
}

fn is_private_use(cp: u32) -> bool {
    matches!(cp, 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD)
}

/// `"bold"` is 700; other keywords and unparseable values are 400.
fn weight_class(weight: Option<&str>) -> u16 {
    match weight.map(str::trim) {
        Some("bold") => 700,
        Some(value) => value
            .parse::<u16>()
            .ok()
            .filter(|w| (1..=1000).contains(w))
            .unwrap_or(400),
        None => 400,
    }
}

/// The numeric part of a version string such as `"Version 1.2"` or `"2.0"`.
fn revision(version: &str) -> f64 {
    let number = version.trim().trim_start_matches("Version").trim();
    let end = number
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(number.len());
    number[..end].parse().unwrap_or(1.0)
}

fn name_records(family: &str, version: &str, options: &TtfOptions) -> Vec<NameRecord> {
    let version = if version.starts_with("Version ") {
        version.to_string()
    } else {
        format!("Version {version}")
    };
    let unique = format!("{family}:{version}");
    let postscript: String = family.chars().filter(|c| !c.is_whitespace()).collect();
    let description = options
        .description
        .clone()
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    let mut records = vec![
        (NameId::FAMILY_NAME, family.to_string()),
        (NameId::SUBFAMILY_NAME, "Regular".to_string()),
        (NameId::UNIQUE_ID, unique),
        (NameId::FULL_NAME, family.to_string()),
        (NameId::VERSION_STRING, version),
        (NameId::POSTSCRIPT_NAME, postscript),
        (NameId::DESCRIPTION, description),
    ];
    if let Some(copyright) = &options.copyright {
        records.push((NameId::COPYRIGHT_NOTICE, copyright.clone()));
    }
    if let Some(url) = &options.url {
        records.push((NameId::VENDOR_URL, url.clone()));
    }
    records.sort_by_key(|(id, _)| *id);
    records
        .into_iter()
        .map(|(id, value)| NameRecord::new(WINDOWS, UNICODE_BMP, ENGLISH_US, id, value.into()))
        .collect()
}
