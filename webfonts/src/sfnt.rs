//! Small helpers over sfnt data shared by the compiler and the WOFF wrappers.

use write_fonts::{
    read::{tables::compute_checksum, FontRef, ReadError, TableProvider},
    types::Tag,
};

pub(crate) const HEAD: Tag = Tag::new(b"head");

const HEADER_LEN: usize = 12;
const TABLE_RECORD_LEN: usize = 16;
/// `0xB1B0AFBA` minus the font checksum gives `head.checkSumAdjustment`.
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;
/// Offset of `checkSumAdjustment` within `head`.
const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

/// One table of a font, borrowed from the font data.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Table<'a> {
    pub tag: Tag,
    pub checksum: u32,
    pub data: &'a [u8],
}

/// The tables of `font`, in directory order.
///
/// Fails if any table lies outside the font data.
pub(crate) fn tables<'a>(font: &FontRef<'a>) -> Result<Vec<Table<'a>>, ReadError> {
    font.table_directory
        .table_records()
        .iter()
        .map(|record| {
            let data = font
                .table_data(record.tag())
                .ok_or(ReadError::OutOfBounds)?;
            Ok(Table {
                tag: record.tag(),
                checksum: record.checksum(),
                data: data.as_bytes(),
            })
        })
        .collect()
}

/// The size of an sfnt holding these tables, each padded to four bytes.
pub(crate) fn padded_len(tables: &[Table]) -> usize {
    HEADER_LEN
        + tables.len() * TABLE_RECORD_LEN
        + tables.iter().map(|t| padded(t.data.len())).sum::<usize>()
}

/// The font revision from `head`, split into major and minor parts.
///
/// Fonts without a readable `head` are version 1.0.
pub(crate) fn font_version(font: &FontRef) -> (u16, u16) {
    font.head()
        .map(|head| {
            let bits = head.font_revision().to_bits() as u32;
            ((bits >> 16) as u16, bits as u16)
        })
        .unwrap_or((1, 0))
}

fn padded(len: usize) -> usize {
    (len + 3) & !3
}

/// Append zeros to `data` until its length is a multiple of four.
pub(crate) fn pad_to_four(data: &mut Vec<u8>) {
    data.resize(padded(data.len()), 0);
}

/// Write `head.checkSumAdjustment` so the whole font sums to the magic value.
pub(crate) fn set_checksum_adjustment(font: &mut [u8]) -> Result<(), ReadError> {
    let head = FontRef::new(font)?
        .table_directory
        .table_records()
        .iter()
        .find(|record| record.tag() == HEAD)
        .map(|record| record.offset() as usize)
        .ok_or(ReadError::TableIsMissing(HEAD))?;
    let field = head + CHECKSUM_ADJUSTMENT_OFFSET;
    let slot = font
        .get_mut(field..field + 4)
        .ok_or(ReadError::OutOfBounds)?;
    slot.copy_from_slice(&[0; 4]);
    let adjustment = CHECKSUM_MAGIC.wrapping_sub(compute_checksum(font));
    font[field..field + 4].copy_from_slice(&adjustment.to_be_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use write_fonts::FontBuilder;

    use super::*;

    fn font() -> Vec<u8> {
        let mut head = vec![0u8; 54];
        head[4..8].copy_from_slice(&[0, 3, 0x40, 0]);
        let mut builder = FontBuilder::new();
        builder.add_raw(HEAD, head);
        builder.add_raw(Tag::new(b"abcd"), b"hello".to_vec());
        builder.build()
    }

    #[test]
    fn directory_tables() {
        let data = font();
        let font = FontRef::new(&data).unwrap();
        let tables = tables(&font).unwrap();
        let tags: Vec<_> = tables.iter().map(|t| t.tag).collect();
        assert_eq!(tags, [Tag::new(b"abcd"), HEAD]);
        assert_eq!(tables[0].data, b"hello");
        assert_eq!(padded_len(&tables), data.len());
        assert_eq!(font_version(&font), (3, 0x4000));
    }

    #[test]
    fn checksum_adjustment() {
        let mut data = font();
        set_checksum_adjustment(&mut data).unwrap();
        assert_eq!(compute_checksum(&data), CHECKSUM_MAGIC);
    }

    #[test]
    fn missing_head_is_an_error() {
        let mut builder = FontBuilder::new();
        builder.add_raw(Tag::new(b"abcd"), b"hello".to_vec());
        let mut data = builder.build();
        assert_eq!(
            set_checksum_adjustment(&mut data),
            Err(ReadError::TableIsMissing(HEAD))
        );
    }

    #[test]
    fn truncated() {
        let data = font();
        assert!(FontRef::new(&data[..8]).is_err());
        let font = FontRef::new(&data[..data.len() - 8]).unwrap();
        assert!(matches!(tables(&font), Err(ReadError::OutOfBounds)));
    }
}
