//! A minimal `GSUB` table holding a single `liga` ligature lookup.
//!
//! The table is small and fixed in shape: the `DFLT` and `latn` scripts both
//! enable one `liga` feature, which points at one type 4 lookup.

use std::collections::BTreeMap;

use write_fonts::{
    tables::{
        gsub::{self, Gsub, LigatureSet, LigatureSubstFormat1},
        layout::{
            CoverageTable, Feature, FeatureList, FeatureRecord, LangSys, Lookup, LookupFlag,
            LookupList, Script, ScriptList, ScriptRecord,
        },
    },
    types::{GlyphId, GlyphId16, Tag},
};

const SCRIPT_TAGS: [Tag; 2] = [Tag::new(b"DFLT"), Tag::new(b"latn")];
const FEATURE_TAG: Tag = Tag::new(b"liga");

/// One ligature: the component glyphs, in order, and the glyph they become.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Ligature {
    pub components: Vec<GlyphId>,
    pub glyph: GlyphId,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum GsubError {
    #[error("ligature for glyph {0} has no components")]
    Empty(GlyphId),
    #[error("glyph {0} does not fit in a 16-bit glyph id")]
    Overflow(GlyphId),
}

/// Build the `GSUB` table for `ligatures`.
///
/// Ligatures are grouped by first component; within a group, longer sequences
/// come first so that they win over their own prefixes.
pub(crate) fn build(ligatures: &[Ligature]) -> Result<Gsub, GsubError> {
    let scripts = SCRIPT_TAGS
        .iter()
        .map(|tag| ScriptRecord::new(*tag, Script::new(Some(LangSys::new(vec![0])), vec![])))
        .collect();
    let features = vec![FeatureRecord::new(FEATURE_TAG, Feature::new(None, vec![0]))];
    let lookup = Lookup::new(LookupFlag::default(), vec![ligature_subst(ligatures)?]);
    Ok(Gsub::new(
        ScriptList::new(scripts),
        FeatureList::new(features),
        LookupList::new(vec![lookup.into()]),
    ))
}

fn ligature_subst(ligatures: &[Ligature]) -> Result<LigatureSubstFormat1, GsubError> {
    let mut sets: BTreeMap<GlyphId16, Vec<(usize, gsub::Ligature)>> = BTreeMap::new();
    for ligature in ligatures {
        let (first, rest) = ligature
            .components
            .split_first()
            .ok_or(GsubError::Empty(ligature.glyph))?;
        let rest = rest.iter().copied().map(glyph16).collect::<Result<_, _>>()?;
        sets.entry(glyph16(*first)?).or_default().push((
            ligature.components.len(),
            gsub::Ligature::new(glyph16(ligature.glyph)?, rest),
        ));
    }

    let coverage: CoverageTable = sets.keys().copied().collect();
    let sets = sets
        .into_values()
        .map(|mut set| {
            // stable, so equal lengths keep their input order
            set.sort_by_key(|(len, _)| std::cmp::Reverse(*len));
            LigatureSet::new(set.into_iter().map(|(_, lig)| lig).collect())
        })
        .collect();
    Ok(LigatureSubstFormat1::new(coverage, sets))
}

fn glyph16(gid: GlyphId) -> Result<GlyphId16, GsubError> {
    u16::try_from(gid.to_u32())
        .map(GlyphId16::new)
        .map_err(|_| GsubError::Overflow(gid))
}
