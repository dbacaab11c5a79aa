//! Generating a complete icon font bundle from a set of options.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;

use crate::{
    cache_key::{self, asset_urls},
    codepoints::{allocate_codepoints, CodepointTable},
    css::render_css,
    error::{Error, Result},
    format::Format,
    glyph::GlyphSource,
    html::render_html,
    options::Options,
    pipeline::{run_pipeline, Compiler, DefaultCompiler, Fonts, PipelineInput},
};

/// The result of [`generate`]: the fonts, and everything needed to reference
/// them.
#[derive(Clone, Debug)]
pub struct GeneratedFonts {
    fonts: Fonts,
    options: Options,
    names: Vec<String>,
}

/// Generate fonts (and, if requested, write them along with a stylesheet and
/// preview page) with the built-in encoders.
///
/// ```no_run
/// use webfonts::{generate, Format, Options};
///
/// let mut options = Options::new(["icons/close.svg", "icons/open.svg"], "dist");
/// options.types = vec![Format::Woff2, Format::Woff];
/// let result = generate(options)?;
/// assert!(result.get(Format::Woff2).is_some());
/// # Ok::<_, webfonts::Error>(())
/// ```
pub fn generate(options: Options) -> Result<GeneratedFonts> {
    generate_with(options, &DefaultCompiler)
}

/// Like [`generate`], with the conversions provided by `compiler`.
pub fn generate_with<C: Compiler + ?Sized>(
    mut options: Options,
    compiler: &C,
) -> Result<GeneratedFonts> {
    options.resolve_aliases();
    let dest = options.dest.clone().ok_or(Error::MissingOption("dest"))?;
    if options.files.is_empty() {
        return Err(Error::NoGlyphs);
    }

    let names: Vec<String> = options.files.iter().map(|file| (options.rename)(file)).collect();
    let seen = unique_names(&names)?;
    for name in options.codepoints.keys().filter(|name| !seen.contains(name.as_str())) {
        log::warn!("codepoint given for '{name}', which is not a glyph in this run");
    }

    options.codepoints = allocate_codepoints(&names, &options.codepoints, options.start_codepoint)?;
    let glyphs = glyph_sources(&options.files, &names, &options.codepoints)?;
    let input = PipelineInput {
        glyphs,
        format_options: options.resolved_format_options(),
    };
    let fonts = run_pipeline(&options.types, &input, compiler)?;
    log::info!(
        "generated {} font format(s) for {} glyphs",
        fonts.len(),
        names.len()
    );

    let result = GeneratedFonts {
        fonts,
        options,
        names,
    };
    if result.options.write_files {
        result.write(&dest)?;
    }
    Ok(result)
}

/// The set of `names`, failing on the first name that repeats.
fn unique_names(names: &[String]) -> Result<HashSet<&str>> {
    let mut seen = HashSet::with_capacity(names.len());
    match names.iter().find(|name| !seen.insert(name.as_str())) {
        Some(name) => Err(Error::DuplicateName(name.clone())),
        None => Ok(seen),
    }
}

fn glyph_sources(
    files: &[PathBuf],
    names: &[String],
    codepoints: &CodepointTable,
) -> Result<Vec<GlyphSource>> {
    files
        .iter()
        .zip(names)
        .map(|(file, name)| {
            let value = codepoints.get(name).copied().unwrap_or_default();
            let codepoint = char::from_u32(value).ok_or_else(|| Error::InvalidCodepoint {
                name: name.clone(),
                codepoint: value,
            })?;
            Ok(GlyphSource::new(file.as_path(), name.clone(), codepoint))
        })
        .collect()
}

impl GeneratedFonts {
    /// The generated fonts, in the order they were requested.
    pub fn fonts(&self) -> &Fonts {
        &self.fonts
    }

    pub fn get(&self, format: Format) -> Option<&[u8]> {
        self.fonts.get(format)
    }

    /// The options of the run, with the completed codepoint table.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Glyph names, in glyph order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Every glyph's codepoint, including the ones allocated in this run.
    pub fn codepoints(&self) -> &CodepointTable {
        &self.options.codepoints
    }

    /// Render the stylesheet.
    ///
    /// With `urls`, fonts are referenced by those URLs; formats missing from
    /// the map are left out. Otherwise the URLs carry a digest of the icons
    /// and options, joined onto `cssFontsUrl` if it is set.
    pub fn generate_css(&self, urls: Option<&IndexMap<Format, String>>) -> Result<String> {
        match urls {
            Some(urls) => render_css(&self.options, &self.names, urls),
            None => {
                let urls = cache_key::build_asset_urls(
                    &self.options,
                    self.options.css_fonts_url.as_deref(),
                )?;
                render_css(&self.options, &self.names, &urls)
            }
        }
    }

    /// Render the preview page for fonts written to `dest`.
    pub fn generate_html(&self) -> Result<String> {
        let dest = self.dest()?;
        let key = cache_key::cache_key(&self.options)?;
        render_html(
            &self.options,
            &self.names,
            &key,
            dest,
            &self.options.html_dest_or_default(dest),
        )
    }

    fn dest(&self) -> Result<&Path> {
        self.options
            .dest
            .as_deref()
            .ok_or(Error::MissingOption("dest"))
    }

    /// Write fonts, stylesheet and preview page. Everything is rendered
    /// before the first file is written.
    fn write(&self, dest: &Path) -> Result<()> {
        let options = &self.options;
        let key = if options.css || options.html {
            cache_key::cache_key(options)?
        } else {
            String::new()
        };
        let css = if options.css {
            let urls = asset_urls(options, &key, options.css_fonts_url.as_deref());
            Some(render_css(options, &self.names, &urls)?)
        } else {
            None
        };
        let html_dest = options.html_dest_or_default(dest);
        let html = if options.html {
            Some(render_html(options, &self.names, &key, dest, &html_dest)?)
        } else {
            None
        };

        let mut outputs: Vec<(PathBuf, &[u8])> = self
            .fonts
            .iter()
            .map(|(format, data)| {
                let file = format!("{}.{}", options.font_name, format.extension());
                (dest.join(file), data)
            })
            .collect();
        if let Some(css) = &css {
            outputs.push((options.css_dest_or_default(dest), css.as_bytes()));
        }
        if let Some(html) = &html {
            outputs.push((html_dest, html.as_bytes()));
        }
        for (path, data) in outputs {
            write_file(&path, data)?;
        }
        Ok(())
    }
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, data).map_err(|e| Error::io(path, e))?;
    log::debug!("wrote {} ({} bytes)", path.display(), data.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::options::{SvgOptions, TtfOptions, Woff2Options, WoffOptions};

    /// Produces tiny placeholder fonts and counts SVG compositions.
    #[derive(Default)]
    struct StubCompiler {
        composed: AtomicUsize,
    }

    impl Compiler for StubCompiler {
        fn compose_svg(&self, glyphs: &[GlyphSource], _: &SvgOptions) -> Result<Vec<u8>> {
            self.composed.fetch_add(1, Ordering::SeqCst);
            Ok(glyphs
                .iter()
                .map(|g| format!("{}={:X};", g.name, g.codepoint as u32))
                .collect::<String>()
                .into_bytes())
        }

        fn encode_ttf(&self, svg: &[u8], _: &TtfOptions) -> Result<Vec<u8>> {
            Ok([b"ttf:".as_slice(), svg].concat())
        }

        fn encode_woff(&self, ttf: &[u8], _: &WoffOptions) -> Result<Vec<u8>> {
            Ok([b"woff:".as_slice(), ttf].concat())
        }

        fn encode_woff2(&self, ttf: &[u8], _: &Woff2Options) -> Result<Vec<u8>> {
            Ok([b"woff2:".as_slice(), ttf].concat())
        }
    }

    fn options(dir: &Path) -> Options {
        let files =
            webfonts_test_data::write_icons(&dir.join("src"), &["close.svg", "open.svg"]).unwrap();
        Options::new(files, dir.join("dest"))
    }

    #[test]
    fn validates_before_converting() {
        let compiler = StubCompiler::default();
        let err = generate_with(
            Options {
                files: vec!["a.svg".into()],
                ..Default::default()
            },
            &compiler,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingOption("dest")));

        let err = generate_with(Options::new(Vec::<PathBuf>::new(), "out"), &compiler).unwrap_err();
        assert!(matches!(err, Error::NoGlyphs));

        let err = generate_with(Options::new(["a/x.svg", "b/x.svg"], "out"), &compiler).unwrap_err();
        assert!(matches!(err, Error::DuplicateName(name) if name == "x"));
        assert_eq!(compiler.composed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn duplicate_names() {
        let names: Vec<String> = ["a", "b", "c"].map(String::from).to_vec();
        let seen = unique_names(&names).unwrap();
        assert!(seen.contains("b") && !seen.contains("d"));
        let names: Vec<String> = ["a", "b", "a", "b"].map(String::from).to_vec();
        assert!(matches!(unique_names(&names), Err(Error::DuplicateName(name)) if name == "a"));
    }

    #[test]
    fn overrides_without_glyphs_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(dir.path());
        options.write_files = false;
        options.codepoints.insert("retired".into(), 0xF101);
        let result = generate_with(options, &StubCompiler::default()).unwrap();
        assert_eq!(result.codepoints()["retired"], 0xF101);
        assert_eq!(result.codepoints()["close"], 0xF102);
        assert_eq!(result.names(), ["close", "open"]);
    }

    #[test]
    fn codepoints_are_completed() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(dir.path());
        options.write_files = false;
        options.codepoints.insert("open".into(), 0xF101);
        let result = generate_with(options, &StubCompiler::default()).unwrap();
        assert_eq!(result.names(), ["close", "open"]);
        assert_eq!(
            result.codepoints().iter().collect::<Vec<_>>(),
            vec![(&"open".to_string(), &0xF101), (&"close".to_string(), &0xF102)]
        );
        assert!(!dir.path().join("dest").exists());
    }

    #[test]
    fn writes_fonts_and_css() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(dir.path());
        options.types = vec![Format::Svg, Format::Ttf, Format::Woff];
        let result = generate_with(options, &StubCompiler::default()).unwrap();

        let dest = dir.path().join("dest");
        let svg = fs::read_to_string(dest.join("iconfont.svg")).unwrap();
        assert_eq!(svg, "close=F101;open=F102;");
        assert_eq!(
            fs::read(dest.join("iconfont.woff")).unwrap(),
            b"woff:ttf:close=F101;open=F102;"
        );
        let css = fs::read_to_string(dest.join("iconfont.css")).unwrap();
        assert_eq!(css, result.generate_css(None).unwrap());
        assert!(css.contains("url(\"iconfont.woff?"), "{css}");
        assert!(css.contains(".icon-open:before"), "{css}");
        assert!(!dest.join("iconfont.html").exists());
    }

    #[test]
    fn css_with_custom_urls() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(dir.path());
        options.write_files = false;
        options.types = vec![Format::Svg, Format::Ttf, Format::Woff, Format::Woff2];
        let result = generate_with(options, &StubCompiler::default()).unwrap();
        let urls: IndexMap<_, _> = [
            (Format::Svg, "AAA".to_string()),
            (Format::Ttf, "BBB".to_string()),
            (Format::Woff, "CCC".to_string()),
        ]
        .into_iter()
        .collect();
        let css = result.generate_css(Some(&urls)).unwrap();
        assert!(css.contains("url(\"AAA#iconfont\") format(\"svg\")"), "{css}");
        assert!(css.contains("url(\"CCC\") format(\"woff\")"), "{css}");
        assert!(!css.contains("woff2"), "{css}");
    }

    #[test]
    fn html_and_custom_destinations() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(dir.path());
        options.html = true;
        options.css_dest = Some(dir.path().join("styles/icons.css"));
        options.html_dest = Some(dir.path().join("pages/icons.html"));
        options.css_fonts_url = Some("/static/fonts/".into());
        generate_with(options, &StubCompiler::default()).unwrap();

        let css = fs::read_to_string(dir.path().join("styles/icons.css")).unwrap();
        assert!(css.contains("url(\"/static/fonts/iconfont.woff2?"), "{css}");
        let html = fs::read_to_string(dir.path().join("pages/icons.html")).unwrap();
        assert!(html.contains("url(\"../dest/iconfont.woff2?"), "{html}");
        assert!(html.contains("icon icon-close"), "{html}");
    }

    #[test]
    fn failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(dir.path());
        options.files.push(dir.path().join("src/missing.svg"));
        let err = generate(options).unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "{err:?}");
        assert!(!dir.path().join("dest").exists());
    }

    #[test]
    fn deprecated_fonts_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(dir.path());
        options.write_files = false;
        options.css_fonts_path = Some("https://cdn.example/".into());
        let result = generate_with(options, &StubCompiler::default()).unwrap();
        assert_eq!(
            result.options().css_fonts_url.as_deref(),
            Some("https://cdn.example/")
        );
        let css = result.generate_css(None).unwrap();
        assert!(css.contains("https://cdn.example/iconfont.woff2?"), "{css}");
    }
}
