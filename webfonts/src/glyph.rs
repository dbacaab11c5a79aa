//! One input icon and the metadata attached to it for a run.

use std::{
    borrow::Cow,
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::error::{Error, Result};

/// Where the outline data of a glyph comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// An SVG file on disk, read when the glyph is composed.
    Path(PathBuf),
    /// SVG data already in memory.
    Memory(Arc<[u8]>),
}

/// A glyph source together with its name and allocated codepoint.
///
/// Constructed once per run, immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphSource {
    pub source: SourceRef,
    pub name: String,
    pub codepoint: char,
}

impl SourceRef {
    /// Read the raw bytes of this source.
    pub fn read(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            SourceRef::Path(path) => std::fs::read(path)
                .map(Cow::Owned)
                .map_err(|e| Error::io(path, e)),
            SourceRef::Memory(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }

    /// The file path, if this source lives on disk.
    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceRef::Path(path) => Some(path),
            SourceRef::Memory(_) => None,
        }
    }
}

impl From<PathBuf> for SourceRef {
    fn from(src: PathBuf) -> Self {
        SourceRef::Path(src)
    }
}

impl From<&Path> for SourceRef {
    fn from(src: &Path) -> Self {
        SourceRef::Path(src.to_owned())
    }
}

impl From<Vec<u8>> for SourceRef {
    fn from(src: Vec<u8>) -> Self {
        SourceRef::Memory(src.into())
    }
}

impl From<&str> for SourceRef {
    fn from(src: &str) -> Self {
        SourceRef::Memory(src.as_bytes().into())
    }
}

impl fmt::Debug for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Path(path) => f.debug_tuple("Path").field(path).finish(),
            SourceRef::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
        }
    }
}

impl GlyphSource {
    pub fn new(source: impl Into<SourceRef>, name: impl Into<String>, codepoint: char) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
            codepoint,
        }
    }

    /// Read this glyph's SVG data.
    pub fn read(&self) -> Result<Cow<'_, [u8]>> {
        self.source.read()
    }

    /// The ligature sequence for this glyph: one entry per character of the name.
    ///
    /// Typing the name in a ligature-aware context renders the icon.
    pub fn ligature(&self) -> Vec<char> {
        self.name.chars().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ligature_is_name_chars() {
        let glyph = GlyphSource::new("<svg/>", "arrow-left", '\u{F101}');
        assert_eq!(glyph.ligature().into_iter().collect::<String>(), "arrow-left");
        assert_eq!(glyph.ligature().len(), 10);
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let glyph = GlyphSource::new(
            PathBuf::from("/definitely/not/here.svg"),
            "here",
            '\u{F101}',
        );
        assert!(matches!(glyph.read(), Err(Error::Io { path, .. }) if path.ends_with("here.svg")));
    }

    #[test]
    fn read_memory() {
        let glyph = GlyphSource::new("<svg/>", "x", 'x');
        assert_eq!(glyph.read().unwrap().as_ref(), b"<svg/>");
        assert!(glyph.source.path().is_none());
    }
}
