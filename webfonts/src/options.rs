//! Run configuration.
//!
//! Every option has a default, so a JSON configuration file only needs to list
//! what it changes. Field names are camelCase in serialized form.

use std::{
    borrow::Cow,
    fmt,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    codepoints::{CodepointTable, DEFAULT_START_CODEPOINT},
    error::{Error, Result},
    format::Format,
    templates,
};

/// Options for one generation run.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// The SVG icons, one glyph each.
    pub files: Vec<PathBuf>,
    /// The directory fonts are written to.
    pub dest: Option<PathBuf>,
    /// Whether to write fonts, stylesheet and markup to disk.
    pub write_files: bool,
    pub font_name: String,
    /// Whether to write a stylesheet.
    pub css: bool,
    /// Stylesheet location; `<dest>/<fontName>.css` if unset.
    pub css_dest: Option<PathBuf>,
    pub css_template: TemplateRef,
    /// Base URL the stylesheet uses to reference fonts.
    pub css_fonts_url: Option<String>,
    /// Deprecated alias of `cssFontsUrl`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_fonts_path: Option<String>,
    /// Whether to write a preview page.
    pub html: bool,
    /// Preview page location; `<dest>/<fontName>.html` if unset.
    pub html_dest: Option<PathBuf>,
    pub html_template: TemplateRef,
    /// The formats to generate.
    pub types: Vec<Format>,
    /// The order of `src` entries in the stylesheet.
    pub order: Vec<Format>,
    /// Explicit codepoints. After a run, the completed table.
    pub codepoints: CodepointTable,
    pub start_codepoint: u32,
    /// Scale every icon to the font height.
    pub normalize: bool,
    pub font_height: Option<f64>,
    pub descent: Option<f64>,
    pub round: Option<f64>,
    pub template_options: TemplateOptions,
    pub format_options: FormatOptions,
    /// Derives a glyph name from a file path.
    #[serde(skip, default = "default_rename")]
    pub rename: fn(&Path) -> String,
}

/// Values made available to the stylesheet and markup templates.
///
/// Besides the two known keys, any other key in the configuration is passed
/// through to the templates unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateOptions {
    pub base_selector: String,
    pub class_prefix: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// Per-format conversion parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    pub svg: SvgOptions,
    pub ttf: TtfOptions,
    pub woff: WoffOptions,
    pub woff2: Woff2Options,
}

/// Parameters for composing the SVG font.
///
/// Unset values fall back to the run's top level options, then to defaults
/// derived from the icons themselves.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SvgOptions {
    pub font_name: Option<String>,
    pub font_id: Option<String>,
    pub font_style: Option<String>,
    pub font_weight: Option<String>,
    /// Units per em; the height of the tallest icon if unset.
    pub font_height: Option<f64>,
    pub descent: Option<f64>,
    /// `fontHeight - descent` if unset.
    pub ascent: Option<f64>,
    pub normalize: Option<bool>,
    /// Give every glyph the advance of the widest one.
    pub fixed_width: bool,
    pub center_horizontally: bool,
    /// Coordinates are rounded to multiples of `1 / round`.
    pub round: Option<f64>,
}

/// Parameters for the TrueType font.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtfOptions {
    pub copyright: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub version: Option<String>,
}

/// Parameters for the WOFF font.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WoffOptions {
    /// Extended metadata, an XML document.
    pub metadata: Option<String>,
}

/// Parameters for the WOFF2 font. There are none yet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Woff2Options {}

/// A template, either built in or read from a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateRef {
    Css,
    Scss,
    Html,
    Path(PathBuf),
}

/// The default naming function: the file name without its extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn default_rename() -> fn(&Path) -> String {
    file_stem
}

impl Default for Options {
    fn default() -> Self {
        Options {
            files: Vec::new(),
            dest: None,
            write_files: true,
            font_name: "iconfont".into(),
            css: true,
            css_dest: None,
            css_template: TemplateRef::Css,
            css_fonts_url: None,
            css_fonts_path: None,
            html: false,
            html_dest: None,
            html_template: TemplateRef::Html,
            types: vec![Format::Woff, Format::Woff2],
            order: vec![Format::Woff2, Format::Woff, Format::Ttf, Format::Svg],
            codepoints: CodepointTable::new(),
            start_codepoint: DEFAULT_START_CODEPOINT,
            normalize: true,
            font_height: None,
            descent: None,
            round: None,
            template_options: TemplateOptions::default(),
            format_options: FormatOptions::default(),
            rename: file_stem,
        }
    }
}

impl Default for TemplateOptions {
    fn default() -> Self {
        TemplateOptions {
            base_selector: ".icon".into(),
            class_prefix: "icon-".into(),
            extra: IndexMap::new(),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `rename` is a function pointer and has nothing useful to print
        f.debug_struct("Options")
            .field("files", &self.files)
            .field("dest", &self.dest)
            .field("write_files", &self.write_files)
            .field("font_name", &self.font_name)
            .field("css", &self.css)
            .field("css_dest", &self.css_dest)
            .field("css_template", &self.css_template)
            .field("css_fonts_url", &self.css_fonts_url)
            .field("html", &self.html)
            .field("html_dest", &self.html_dest)
            .field("html_template", &self.html_template)
            .field("types", &self.types)
            .field("order", &self.order)
            .field("codepoints", &self.codepoints)
            .field("start_codepoint", &self.start_codepoint)
            .field("normalize", &self.normalize)
            .field("template_options", &self.template_options)
            .field("format_options", &self.format_options)
            .finish_non_exhaustive()
    }
}

impl Options {
    /// Default options for the given icons and output directory.
    pub fn new(files: impl IntoIterator<Item = impl Into<PathBuf>>, dest: impl Into<PathBuf>) -> Self {
        Options {
            files: files.into_iter().map(Into::into).collect(),
            dest: Some(dest.into()),
            ..Default::default()
        }
    }

    /// Parse options from a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidOption(e.to_string()))
    }

    /// Fold the deprecated `cssFontsPath` into `cssFontsUrl`.
    pub(crate) fn resolve_aliases(&mut self) {
        if let Some(path) = self.css_fonts_path.take() {
            log::warn!("option \"cssFontsPath\" is deprecated, use \"cssFontsUrl\" instead");
            self.css_fonts_url = Some(path);
        }
    }

    /// The format options for a pipeline run, with the SVG options completed
    /// from the top level ones.
    pub(crate) fn resolved_format_options(&self) -> FormatOptions {
        let svg = &self.format_options.svg;
        FormatOptions {
            svg: SvgOptions {
                font_name: svg.font_name.clone().or_else(|| Some(self.font_name.clone())),
                font_height: svg.font_height.or(self.font_height),
                descent: svg.descent.or(self.descent),
                normalize: svg.normalize.or(Some(self.normalize)),
                round: svg.round.or(self.round),
                ..svg.clone()
            },
            ..self.format_options.clone()
        }
    }

    pub(crate) fn css_dest_or_default(&self, dest: &Path) -> PathBuf {
        self.css_dest
            .clone()
            .unwrap_or_else(|| dest.join(format!("{}.css", self.font_name)))
    }

    pub(crate) fn html_dest_or_default(&self, dest: &Path) -> PathBuf {
        self.html_dest
            .clone()
            .unwrap_or_else(|| dest.join(format!("{}.html", self.font_name)))
    }
}

impl TemplateRef {
    /// The template source text.
    pub fn source(&self) -> Result<Cow<'static, str>> {
        match self {
            TemplateRef::Css => Ok(Cow::Borrowed(templates::CSS)),
            TemplateRef::Scss => Ok(Cow::Borrowed(templates::SCSS)),
            TemplateRef::Html => Ok(Cow::Borrowed(templates::HTML)),
            TemplateRef::Path(path) => std::fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|e| Error::io(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults() {
        let options = Options::default();
        assert!(options.write_files && options.css && !options.html);
        assert_eq!(options.font_name, "iconfont");
        assert_eq!(options.types, [Format::Woff, Format::Woff2]);
        assert_eq!(options.start_codepoint, 0xF101);
        assert_eq!(options.template_options.base_selector, ".icon");
        assert_eq!(options.template_options.class_prefix, "icon-");
        assert_eq!((options.rename)(Path::new("a/b/close.svg")), "close");
    }

    #[test]
    fn json_fills_defaults() {
        let options = Options::from_json(
            r#"{
                "files": ["a.svg"],
                "dest": "out",
                "fontName": "glyphs",
                "types": ["ttf", "svg"],
                "codepoints": { "a": 64 },
                "templateOptions": { "classPrefix": "gl-", "color": "red" },
                "formatOptions": { "svg": { "fixedWidth": true }, "ttf": { "version": "2.0" } }
            }"#,
        )
        .unwrap();
        assert_eq!(options.font_name, "glyphs");
        assert_eq!(options.types, [Format::Ttf, Format::Svg]);
        assert_eq!(options.codepoints["a"], 64);
        assert_eq!(options.template_options.base_selector, ".icon");
        assert_eq!(options.template_options.class_prefix, "gl-");
        assert_eq!(options.template_options.extra["color"], "red");
        assert!(options.format_options.svg.fixed_width);
        assert_eq!(options.format_options.ttf.version.as_deref(), Some("2.0"));
        assert!(options.write_files);
    }

    #[test]
    fn unknown_format_is_invalid() {
        let err = Options::from_json(r#"{ "types": ["otf"] }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidOption(_)));
    }

    #[test]
    fn template_ref_serde() {
        let css: TemplateRef = serde_json::from_str(r#""scss""#).unwrap();
        assert_eq!(css, TemplateRef::Scss);
        let path: TemplateRef = serde_json::from_str(r#"{ "path": "my.hbs" }"#).unwrap();
        assert_eq!(path, TemplateRef::Path("my.hbs".into()));
    }

    #[test]
    fn deprecated_alias() {
        let mut options = Options {
            css_fonts_path: Some("/fonts/".into()),
            ..Default::default()
        };
        options.resolve_aliases();
        assert_eq!(options.css_fonts_url.as_deref(), Some("/fonts/"));
        assert!(options.css_fonts_path.is_none());
    }

    #[test]
    fn svg_options_fall_back_to_top_level() {
        let mut options = Options {
            font_height: Some(1000.0),
            round: Some(10.0),
            ..Default::default()
        };
        options.format_options.svg.round = Some(100.0);
        let resolved = options.resolved_format_options().svg;
        assert_eq!(resolved.font_name.as_deref(), Some("iconfont"));
        assert_eq!(resolved.font_height, Some(1000.0));
        assert_eq!(resolved.normalize, Some(true));
        assert_eq!(resolved.round, Some(100.0));
    }
}
