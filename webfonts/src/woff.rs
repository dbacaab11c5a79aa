//! Wrapping a TrueType font as WOFF 1.0.
//!
//! See <https://www.w3.org/TR/WOFF/>. Each table is zlib-compressed on its
//! own, and stored uncompressed whenever compression would not make it smaller.

use std::io::Write;

use flate2::{write::ZlibEncoder, Compression};
use write_fonts::read::FontRef;

use crate::{
    error::{Error, Result},
    format::Format,
    options::WoffOptions,
    sfnt::{self, pad_to_four},
};

const SIGNATURE: &[u8; 4] = b"wOFF";
const HEADER_LEN: usize = 44;
const TABLE_ENTRY_LEN: usize = 20;

/// Encode `ttf` as a WOFF file.
pub fn encode(ttf: &[u8], options: &WoffOptions) -> Result<Vec<u8>> {
    let convert = |e| Error::conversion(Format::Woff, e);
    let font = FontRef::new(ttf).map_err(convert)?;
    let tables = sfnt::tables(&font).map_err(convert)?;
    let (major, minor) = sfnt::font_version(&font);

    let mut body = Vec::new();
    let mut directory = Vec::with_capacity(tables.len() * TABLE_ENTRY_LEN);
    let data_start = HEADER_LEN + tables.len() * TABLE_ENTRY_LEN;
    for table in &tables {
        let compressed = compress(table.data)?;
        let stored = if compressed.len() < table.data.len() {
            compressed.as_slice()
        } else {
            table.data
        };
        directory.extend_from_slice(&table.tag.to_be_bytes());
        directory.extend_from_slice(&offset(data_start + body.len())?.to_be_bytes());
        directory.extend_from_slice(&offset(stored.len())?.to_be_bytes());
        directory.extend_from_slice(&offset(table.data.len())?.to_be_bytes());
        directory.extend_from_slice(&table.checksum.to_be_bytes());
        body.extend_from_slice(stored);
        pad_to_four(&mut body);
    }

    let (mut meta_offset, mut meta_len, mut meta_orig_len) = (0, 0, 0);
    if let Some(metadata) = options.metadata.as_deref().filter(|m| !m.is_empty()) {
        let compressed = compress(metadata.as_bytes())?;
        meta_offset = offset(data_start + body.len())?;
        meta_len = offset(compressed.len())?;
        meta_orig_len = offset(metadata.len())?;
        body.extend_from_slice(&compressed);
        pad_to_four(&mut body);
    }

    let total_len = data_start + body.len();
    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(SIGNATURE);
    out.extend_from_slice(&font.table_directory.sfnt_version().to_be_bytes());
    out.extend_from_slice(&offset(total_len)?.to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // reserved
    out.extend_from_slice(&offset(sfnt::padded_len(&tables))?.to_be_bytes());
    out.extend_from_slice(&major.to_be_bytes());
    out.extend_from_slice(&minor.to_be_bytes());
    out.extend_from_slice(&meta_offset.to_be_bytes());
    out.extend_from_slice(&meta_len.to_be_bytes());
    out.extend_from_slice(&meta_orig_len.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes()); // private data offset
    out.extend_from_slice(&0u32.to_be_bytes()); // private data length
    out.extend_from_slice(&directory);
    out.extend_from_slice(&body);
    log::debug!(
        "woff: {} tables, {} -> {} bytes",
        tables.len(),
        ttf.len(),
        out.len()
    );
    Ok(out)
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| Error::conversion(Format::Woff, e))
}

fn offset(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::conversion(Format::Woff, "font too large"))
}
