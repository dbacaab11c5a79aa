//! Wrapping a TrueType font as WOFF 2.0.
//!
//! See <https://www.w3.org/TR/WOFF2/>. Tables are stored with the null
//! transform and compressed together as a single Brotli stream.

use std::io::Write;

use brotlic::CompressorWriter;
use write_fonts::{read::FontRef, types::Tag};

use crate::{
    error::{Error, Result},
    format::Format,
    options::Woff2Options,
    sfnt::{self, pad_to_four, Table},
};

const SIGNATURE: &[u8; 4] = b"wOF2";
const HEADER_LEN: usize = 48;

/// Tags with a dedicated index in the table directory flags.
const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];
/// Flag value meaning "an explicit tag follows".
const ARBITRARY_TAG: u8 = 63;
/// For `glyf` and `loca`, transform version 3 is the null transform.
const NULL_TRANSFORM_GLYF: u8 = 3 << 6;

const GLYF: Tag = Tag::new(b"glyf");
const LOCA: Tag = Tag::new(b"loca");

/// Encode `ttf` as a WOFF2 file.
pub fn encode(ttf: &[u8], _options: &Woff2Options) -> Result<Vec<u8>> {
    let convert = |e| Error::conversion(Format::Woff2, e);
    let font = FontRef::new(ttf).map_err(convert)?;
    let tables = directory_order(sfnt::tables(&font).map_err(convert)?);
    let (major, minor) = sfnt::font_version(&font);

    let mut directory = Vec::new();
    let mut stream = Vec::with_capacity(ttf.len());
    for table in &tables {
        write_entry(&mut directory, table.tag, table.data.len())?;
        stream.extend_from_slice(table.data);
    }
    let compressed = compress(&stream)?;

    let mut out = Vec::with_capacity(HEADER_LEN + directory.len() + compressed.len() + 3);
    out.extend_from_slice(SIGNATURE);
    out.extend_from_slice(&font.table_directory.sfnt_version().to_be_bytes());
    out.extend_from_slice(&[0; 4]); // total length, patched below
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // reserved
    out.extend_from_slice(&u32_len(sfnt::padded_len(&tables))?.to_be_bytes());
    out.extend_from_slice(&u32_len(compressed.len())?.to_be_bytes());
    out.extend_from_slice(&major.to_be_bytes());
    out.extend_from_slice(&minor.to_be_bytes());
    // no metadata, no private data
    out.extend_from_slice(&[0; 20]);
    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    pad_to_four(&mut out);

    let total = u32_len(out.len())?;
    out[8..12].copy_from_slice(&total.to_be_bytes());
    log::debug!(
        "woff2: {} tables, {} -> {} bytes",
        tables.len(),
        ttf.len(),
        out.len()
    );
    Ok(out)
}

/// Tables in tag order, except that `loca` immediately follows `glyf`.
fn directory_order(mut tables: Vec<Table>) -> Vec<Table> {
    let loca = tables
        .iter()
        .position(|t| t.tag == LOCA)
        .map(|at| tables.remove(at));
    tables.sort_by_key(|t| t.tag);
    if let Some(loca) = loca {
        let at = tables
            .iter()
            .position(|t| t.tag == GLYF)
            .map_or(tables.len(), |glyf| glyf + 1);
        tables.insert(at, loca);
    }
    tables
}

fn write_entry(out: &mut Vec<u8>, tag: Tag, len: usize) -> Result<()> {
    let bytes = tag.to_be_bytes();
    let index = KNOWN_TAGS.iter().position(|known| **known == bytes);
    let mut flags = index.map_or(ARBITRARY_TAG, |i| i as u8);
    if tag == GLYF || tag == LOCA {
        flags |= NULL_TRANSFORM_GLYF;
    }
    out.push(flags);
    if index.is_none() {
        out.extend_from_slice(&bytes);
    }
    write_base128(out, u32_len(len)?);
    Ok(())
}

/// Append `value` as a `UIntBase128`: big-endian groups of seven bits, high
/// bit set on every byte but the last, no leading zero groups.
fn write_base128(out: &mut Vec<u8>, value: u32) {
    let groups = (1..5).take_while(|i| value >> (7 * i) != 0).count() + 1;
    for i in (0..groups).rev() {
        let mut byte = ((value >> (7 * i)) & 0x7F) as u8;
        if i != 0 {
            byte |= 0x80;
        }
        out.push(byte);
    }
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut compressor = CompressorWriter::new(Vec::new());
    compressor
        .write_all(data)
        .map_err(|e| Error::conversion(Format::Woff2, e))?;
    compressor
        .into_inner()
        .map_err(|e| Error::conversion(Format::Woff2, e))
}

fn u32_len(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::conversion(Format::Woff2, "font too large"))
}
