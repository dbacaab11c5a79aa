//! Assigning codepoints to glyph names.
//!
//! Every glyph needs a codepoint so that stylesheets can reference it. Callers
//! may pin some (or all) glyphs to explicit values; the rest are allocated
//! upwards from a starting value, by default the beginning of the Private Use
//! Area at U+F101.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// The conventional first codepoint for icon fonts, inside the Private Use Area.
pub const DEFAULT_START_CODEPOINT: u32 = 0xF101;

const SURROGATES: std::ops::RangeInclusive<u32> = 0xD800..=0xDFFF;
const MAX_CODEPOINT: u32 = char::MAX as u32;

/// A mapping from glyph name to codepoint.
///
/// Iteration follows insertion order: explicit entries first, in the order
/// the caller supplied them, then allocated entries in glyph order.
pub type CodepointTable = IndexMap<String, u32>;

/// Hands out codepoints that do not collide with any explicit value.
///
/// The set of explicit values is computed once, up front; the candidate
/// counter only ever moves forward, so allocated values are strictly
/// increasing and never repeat within one allocator.
#[derive(Clone, Debug)]
pub struct CodepointAllocator {
    next: u32,
    reserved: HashSet<u32>,
}

impl CodepointAllocator {
    /// Create an allocator starting at `start`, skipping every value in `reserved`.
    pub fn new(start: u32, reserved: impl IntoIterator<Item = u32>) -> Self {
        Self {
            next: start,
            reserved: reserved.into_iter().collect(),
        }
    }

    /// The value the next call to [`allocate`](Self::allocate) will consider first.
    pub fn next_candidate(&self) -> u32 {
        self.next
    }

    /// Return the next free codepoint, or `None` once the Unicode range is exhausted.
    ///
    /// Values in the surrogate block (U+D800..=U+DFFF) are never returned, since
    /// they are not Unicode scalar values and cannot be encoded in a font's cmap.
    pub fn allocate(&mut self) -> Option<u32> {
        loop {
            let candidate = self.next;
            if candidate > MAX_CODEPOINT {
                return None;
            }
            self.next = candidate + 1;
            if SURROGATES.contains(&candidate) {
                self.next = SURROGATES.end() + 1;
                continue;
            }
            if !self.reserved.contains(&candidate) {
                return Some(candidate);
            }
        }
    }
}

/// Complete a codepoint table for `names`.
///
/// Names present in `explicit` keep their value. Every other name receives a
/// fresh value from a [`CodepointAllocator`] seeded with `start`, in the order
/// the names are given, skipping every explicit value anywhere in the table.
///
/// Entries in `explicit` that do not name a glyph are preserved, and their
/// values stay reserved, so a pinned table survives the temporary removal of
/// an icon.
pub fn allocate_codepoints<S: AsRef<str>>(
    names: &[S],
    explicit: &CodepointTable,
    start: u32,
) -> Result<CodepointTable> {
    if let Some((name, &codepoint)) = explicit.iter().find(|(_, cp)| char::from_u32(**cp).is_none())
    {
        return Err(Error::InvalidCodepoint {
            name: name.clone(),
            codepoint,
        });
    }

    let mut allocator = CodepointAllocator::new(start, explicit.values().copied());
    let mut table = explicit.clone();
    for name in names {
        let name = name.as_ref();
        if table.contains_key(name) {
            continue;
        }
        let codepoint = allocator
            .allocate()
            .ok_or_else(|| Error::CodepointsExhausted {
                name: name.to_owned(),
            })?;
        log::trace!("allocated U+{codepoint:04X} for '{name}'");
        table.insert(name.to_owned(), codepoint);
    }
    Ok(table)
}
