//! test data shared between the webfonts crates.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub static CLOSE: &str = include_str!("../test_data/svg/close.svg");

pub static OPEN: &str = include_str!("../test_data/svg/open.svg");

/// Two rects inside a translated group, plus an unused path in `<defs>`.
pub static ADD: &str = include_str!("../test_data/svg/add.svg");

pub static ARROW_LEFT: &str = include_str!("../test_data/svg/arrow-left.svg");

/// No `viewBox`; size comes from `width`/`height` with a `px` suffix.
pub static DOT: &str = include_str!("../test_data/svg/dot.svg");

/// All icon fixtures as `(file name, contents)`, sorted by file name.
pub static ICONS: &[(&str, &str)] = &[
    ("add.svg", ADD),
    ("arrow-left.svg", ARROW_LEFT),
    ("close.svg", CLOSE),
    ("dot.svg", DOT),
    ("open.svg", OPEN),
];

pub mod malformed {
    /// Not XML at all.
    pub static NOT_XML: &str = "this is not an svg file";

    /// Well formed, but with no `viewBox`, `width` or `height`.
    pub static NO_DIMENSIONS: &str =
        r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0 0L10 10L0 10Z"/></svg>"#;

    /// A path whose data cannot be parsed.
    pub static BAD_PATH: &str =
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><path d="M0 0 Q"/></svg>"#;
}

/// Write the fixtures named in `names` (file names from [`ICONS`]) into `dir`.
///
/// Returns the written paths in the order they were requested.
pub fn write_icons(dir: &Path, names: &[&str]) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    names
        .iter()
        .map(|name| {
            let (_, contents) = ICONS
                .iter()
                .find(|(file, _)| file == name)
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))?;
            let path = dir.join(name);
            fs::write(&path, contents)?;
            Ok(path)
        })
        .collect()
}

/// Write every fixture in [`ICONS`] into `dir`.
pub fn write_all_icons(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let names: Vec<_> = ICONS.iter().map(|(name, _)| *name).collect();
    write_icons(dir, &names)
}
