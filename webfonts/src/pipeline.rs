//! Executing the format dependency graph.
//!
//! A run resolves each requested [`Format`] by first resolving its dependency,
//! then handing the dependency's output to the format's conversion. Every
//! format has one single-assignment cell per run; whichever branch reaches a
//! cell first computes it while any other branch needing the same format waits
//! for that result. Sibling formats are resolved in parallel.

use std::sync::{Arc, OnceLock};

use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;

use crate::{
    error::{Error, Result},
    format::Format,
    glyph::GlyphSource,
    options::{FormatOptions, SvgOptions, TtfOptions, Woff2Options, WoffOptions},
};

/// The conversions behind each format.
///
/// The pipeline only decides *when* each of these runs; [`DefaultCompiler`]
/// provides the built-in encoders.
pub trait Compiler: Sync {
    /// Compose an SVG font from the glyph sources, in order.
    fn compose_svg(&self, glyphs: &[GlyphSource], options: &SvgOptions) -> Result<Vec<u8>>;

    /// Compile a TrueType font from an SVG font.
    fn encode_ttf(&self, svg: &[u8], options: &TtfOptions) -> Result<Vec<u8>>;

    /// Wrap a TrueType font as WOFF.
    fn encode_woff(&self, ttf: &[u8], options: &WoffOptions) -> Result<Vec<u8>>;

    /// Wrap a TrueType font as WOFF2.
    fn encode_woff2(&self, ttf: &[u8], options: &Woff2Options) -> Result<Vec<u8>>;
}

/// The built-in encoders.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCompiler;

impl Compiler for DefaultCompiler {
    fn compose_svg(&self, glyphs: &[GlyphSource], options: &SvgOptions) -> Result<Vec<u8>> {
        crate::svg::compose(glyphs, options).map(String::into_bytes)
    }

    fn encode_ttf(&self, svg: &[u8], options: &TtfOptions) -> Result<Vec<u8>> {
        crate::ttf::compile(svg, options)
    }

    fn encode_woff(&self, ttf: &[u8], options: &WoffOptions) -> Result<Vec<u8>> {
        crate::woff::encode(ttf, options)
    }

    fn encode_woff2(&self, ttf: &[u8], options: &Woff2Options) -> Result<Vec<u8>> {
        crate::woff2::encode(ttf, options)
    }
}

/// Everything a pipeline run converts.
#[derive(Clone, Debug, Default)]
pub struct PipelineInput {
    pub glyphs: Vec<GlyphSource>,
    pub format_options: FormatOptions,
}

/// The output of a run: one entry per requested format, in request order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fonts(IndexMap<Format, Arc<[u8]>>);

impl Fonts {
    pub fn get(&self, format: Format) -> Option<&[u8]> {
        self.0.get(&format).map(AsRef::as_ref)
    }

    pub fn contains(&self, format: Format) -> bool {
        self.0.contains_key(&format)
    }

    pub fn formats(&self) -> impl Iterator<Item = Format> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Format, &[u8])> + '_ {
        self.0.iter().map(|(format, data)| (*format, data.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct PipelineRun<'a, C: ?Sized> {
    input: &'a PipelineInput,
    compiler: &'a C,
    cells: [OnceLock<Result<Arc<[u8]>>>; Format::COUNT],
}

/// Produce every format in `requested`.
///
/// Duplicate requests are ignored. If any conversion fails, the run fails
/// with the first error in request order and no output is returned.
pub fn run_pipeline<C>(requested: &[Format], input: &PipelineInput, compiler: &C) -> Result<Fonts>
where
    C: Compiler + ?Sized,
{
    let requested: Vec<Format> = requested
        .iter()
        .copied()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();
    let run = PipelineRun {
        input,
        compiler,
        cells: std::array::from_fn(|_| OnceLock::new()),
    };

    let results: Vec<_> = requested
        .par_iter()
        .map(|format| run.resolve(*format))
        .collect();

    requested
        .into_iter()
        .zip(results)
        .map(|(format, result)| result.map(|data| (format, data)))
        .collect::<Result<IndexMap<_, _>>>()
        .map(Fonts)
}

impl<C: Compiler + ?Sized> PipelineRun<'_, C> {
    fn resolve(&self, format: Format) -> Result<Arc<[u8]>> {
        self.cells[format.index()]
            .get_or_init(|| {
                let dependency = format.dependency().map(|dep| self.resolve(dep)).transpose()?;
                log::debug!("generating {format} font");
                let data = self.convert(format, dependency.as_deref().unwrap_or_default())?;
                log::debug!("generated {format} font ({} bytes)", data.len());
                Ok(data.into())
            })
            .clone()
    }

    fn convert(&self, format: Format, dependency: &[u8]) -> Result<Vec<u8>> {
        let options = &self.input.format_options;
        let data = match format {
            Format::Svg => self.compiler.compose_svg(&self.input.glyphs, &options.svg)?,
            Format::Ttf => self.compiler.encode_ttf(dependency, &options.ttf)?,
            Format::Woff => self.compiler.encode_woff(dependency, &options.woff)?,
            Format::Woff2 => self.compiler.encode_woff2(dependency, &options.woff2)?,
        };
        if data.is_empty() {
            return Err(Error::conversion(format, "encoder produced no data"));
        }
        Ok(data)
    }
}
