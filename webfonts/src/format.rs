//! The output formats and the dependency graph between them.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// One output font format.
///
/// Each variant is a node in a fixed dependency graph: the SVG font is
/// composed directly from the glyph sources, the TrueType font is compiled
/// from the SVG font, and both WOFF flavours wrap the TrueType font.
///
/// ```text
/// svg ──▶ ttf ──┬──▶ woff
///               └──▶ woff2
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Svg,
    Ttf,
    Woff,
    Woff2,
}

/// A format name that is not one of the supported formats.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl Format {
    /// Every format, in dependency order (a format never precedes its dependency).
    pub const ALL: [Format; 4] = [Format::Svg, Format::Ttf, Format::Woff, Format::Woff2];

    /// The number of formats.
    pub const COUNT: usize = Format::ALL.len();

    /// The format whose output this format is converted from, if any.
    pub const fn dependency(self) -> Option<Format> {
        match self {
            Format::Svg => None,
            Format::Ttf => Some(Format::Svg),
            Format::Woff | Format::Woff2 => Some(Format::Ttf),
        }
    }

    /// The identifier of this format, which is also its file extension.
    pub const fn extension(self) -> &'static str {
        match self {
            Format::Svg => "svg",
            Format::Ttf => "ttf",
            Format::Woff => "woff",
            Format::Woff2 => "woff2",
        }
    }

    /// The hint used in a CSS `src` descriptor, as in `format("truetype")`.
    pub const fn css_format(self) -> &'static str {
        match self {
            Format::Svg => "svg",
            Format::Ttf => "truetype",
            Format::Woff => "woff",
            Format::Woff2 => "woff2",
        }
    }

    /// `true` if the produced content is text rather than binary.
    pub const fn is_text(self) -> bool {
        matches!(self, Format::Svg)
    }

    /// A dense index, used to address per-format storage.
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFormat(s.to_owned()))
    }
}

impl Display for UnknownFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown font format '{}' (expected one of svg, ttf, woff, woff2)",
            self.0
        )
    }
}

impl std::error::Error for UnknownFormat {}
