//! Generate icon webfonts from a set of SVG icons.
//!
//! Each icon becomes one glyph, addressed by a codepoint (allocated from the
//! Private Use Area unless pinned) and by a ligature of its name. From the
//! icons this crate produces:
//! - an SVG font, composed from the icon outlines;
//! - a TrueType font, compiled from the SVG font with [`write-fonts`];
//! - WOFF and WOFF2 wrappers of the TrueType font;
//! - a stylesheet (CSS or SCSS) with one class per icon, and optionally an HTML
//!   preview page.
//!
//! Formats are produced on demand: requesting WOFF and WOFF2 compiles the SVG
//! and TrueType fonts exactly once, and the two wrappers in parallel.
//!
//! ```no_run
//! let options = webfonts::Options::new(["icons/close.svg", "icons/open.svg"], "dist");
//! let result = webfonts::generate(options)?;
//! println!("{}", result.generate_css(None)?);
//! # Ok::<_, webfonts::Error>(())
//! ```
//!
//! [`write-fonts`]: https://docs.rs/write-fonts

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]

pub mod cache_key;
pub mod codepoints;
pub mod css;
mod error;
pub mod format;
mod generate;
pub mod glyph;
mod gsub;
pub mod html;
pub mod options;
pub mod pipeline;
mod sfnt;
pub mod svg;
pub mod template;
pub mod templates;
pub mod ttf;
pub mod woff;
pub mod woff2;

pub use codepoints::{allocate_codepoints, CodepointAllocator, CodepointTable};
pub use error::{Error, Result};
pub use format::Format;
pub use generate::{generate, generate_with, GeneratedFonts};
pub use glyph::{GlyphSource, SourceRef};
pub use options::{Options, TemplateOptions, TemplateRef};
pub use pipeline::{run_pipeline, Compiler, DefaultCompiler, Fonts, PipelineInput};
