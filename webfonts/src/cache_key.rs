//! Content digests and the cache-busting asset URLs built from them.
//!
//! The digest covers the bytes of every glyph source, in order, and the full
//! serialized options of the run. It only tags URLs; it never decides whether
//! anything is regenerated.

use data_encoding::HEXLOWER;
use indexmap::IndexMap;
use sha2::{Digest, Sha256};

use crate::{
    error::{Error, Result},
    format::Format,
    options::Options,
};

/// Number of digest bytes kept; the token is twice as many hex digits.
const DIGEST_BYTES: usize = 16;

/// Compute the digest of `sources` and `options` as lower-case hex.
pub fn digest<'a>(
    sources: impl IntoIterator<Item = &'a [u8]>,
    options: &Options,
) -> Result<String> {
    let mut hasher = Sha256::new();
    for source in sources {
        // length prefix so that moving bytes between sources changes the digest
        hasher.update((source.len() as u64).to_be_bytes());
        hasher.update(source);
    }
    let options = serde_json::to_vec(options).map_err(|e| Error::InvalidOption(e.to_string()))?;
    hasher.update(&options);
    Ok(HEXLOWER.encode(&hasher.finalize()[..DIGEST_BYTES]))
}

/// The digest of the run described by `options`, reading `options.files`.
pub fn cache_key(options: &Options) -> Result<String> {
    let sources = options
        .files
        .iter()
        .map(|path| std::fs::read(path).map_err(|e| Error::io(path, e)))
        .collect::<Result<Vec<_>>>()?;
    digest(sources.iter().map(Vec::as_slice), options)
}

/// One URL per format in `options.types`: `<fontName>.<ext>?<digest>`,
/// joined onto `base_url` when one is given.
pub fn build_asset_urls(
    options: &Options,
    base_url: Option<&str>,
) -> Result<IndexMap<Format, String>> {
    let key = cache_key(options)?;
    Ok(asset_urls(options, &key, base_url))
}

pub(crate) fn asset_urls(
    options: &Options,
    key: &str,
    base_url: Option<&str>,
) -> IndexMap<Format, String> {
    let base = base_url
        .filter(|base| !base.is_empty())
        .map(|base| base.replace('\\', "/"));
    options
        .types
        .iter()
        .map(|format| {
            let locator = format!("{}.{}?{key}", options.font_name, format.extension());
            let url = match &base {
                Some(base) => join_url(base, &locator),
                None => locator,
            };
            (*format, url)
        })
        .collect()
}

/// Join with exactly one `/` between `base` and `path`.
fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
