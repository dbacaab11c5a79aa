//! Generate icon webfonts from the command line.
//!
//! Options are read from an optional JSON configuration file (using the same
//! camelCase names as the library), then overridden by command line flags.

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use webfonts::{CodepointTable, Format, Options, TemplateRef};

#[derive(Parser, Debug)]
#[command(version, about = "Generate icon webfonts and stylesheets from SVG icons.")]
struct Args {
    /// A JSON file of options. Command line flags take precedence.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// The directory fonts are written to.
    #[arg(short, long)]
    dest: Option<PathBuf>,

    #[arg(short = 'n', long)]
    font_name: Option<String>,

    /// Comma separated list of formats: svg, ttf, woff, woff2.
    #[arg(short, long, value_delimiter = ',')]
    types: Vec<Format>,

    /// Also write an HTML preview page.
    #[arg(long)]
    html: bool,

    /// Do not write a stylesheet.
    #[arg(long)]
    no_css: bool,

    /// Base URL the stylesheet uses to reference fonts.
    #[arg(long)]
    css_fonts_url: Option<String>,

    /// First codepoint to allocate, decimal or 0x-prefixed hex.
    #[arg(long, value_parser = parse_codepoint)]
    start_codepoint: Option<u32>,

    /// A JSON map of glyph name to codepoint. Read if it exists; the completed
    /// table is written back after a successful run.
    #[arg(long)]
    codepoints: Option<PathBuf>,

    /// A stylesheet template file.
    #[arg(long)]
    css_template: Option<PathBuf>,

    /// A preview page template file.
    #[arg(long)]
    html_template: Option<PathBuf>,

    /// The SVG icons.
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = match &args.config {
        Some(path) => Options::from_json(&read_to_string(path)?)?,
        None => Options::default(),
    };
    if let Some(path) = args.codepoints.as_deref().filter(|path| path.exists()) {
        let table: CodepointTable = serde_json::from_str(&read_to_string(path)?)?;
        options.codepoints.extend(table);
    }
    apply_flags(&mut options, &args);

    let result = webfonts::generate(options)?;
    if let Some(path) = &args.codepoints {
        let json = serde_json::to_string_pretty(result.codepoints())?;
        std::fs::write(path, json + "\n").map_err(|e| format!("{}: {e}", path.display()))?;
    }
    for (format, data) in result.fonts().iter() {
        log::info!("{format}: {} bytes", data.len());
    }
    Ok(())
}

fn read_to_string(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))
}

/// Override `options` with every flag that was given.
fn apply_flags(options: &mut Options, args: &Args) {
    if let Some(dest) = &args.dest {
        options.dest = Some(dest.clone());
    }
    if let Some(name) = &args.font_name {
        options.font_name = name.clone();
    }
    if !args.types.is_empty() {
        options.types = args.types.clone();
    }
    options.html |= args.html;
    if args.no_css {
        options.css = false;
    }
    if let Some(url) = &args.css_fonts_url {
        options.css_fonts_url = Some(url.clone());
    }
    if let Some(start) = args.start_codepoint {
        options.start_codepoint = start;
    }
    if let Some(path) = &args.css_template {
        options.css_template = TemplateRef::Path(path.clone());
    }
    if let Some(path) = &args.html_template {
        options.html_template = TemplateRef::Path(path.clone());
    }
    if !args.files.is_empty() {
        options.files = args.files.clone();
    }
}

fn parse_codepoint(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid codepoint '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codepoint_values() {
        assert_eq!(parse_codepoint("0xF101"), Ok(0xF101));
        assert_eq!(parse_codepoint("0Xf101"), Ok(0xF101));
        assert_eq!(parse_codepoint("64"), Ok(64));
        assert!(parse_codepoint("0xZZ").is_err());
    }

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "webfonts",
            "--dest",
            "out",
            "--types",
            "ttf,woff2",
            "--no-css",
            "--start-codepoint",
            "0xE000",
            "a.svg",
            "b.svg",
        ]);
        let mut options = Options::from_json(r#"{ "fontName": "glyphs", "html": true }"#).unwrap();
        apply_flags(&mut options, &args);
        assert_eq!(options.dest, Some(PathBuf::from("out")));
        assert_eq!(options.font_name, "glyphs");
        assert_eq!(options.types, [Format::Ttf, Format::Woff2]);
        assert!(options.html && !options.css);
        assert_eq!(options.start_codepoint, 0xE000);
        assert_eq!(options.files, [PathBuf::from("a.svg"), PathBuf::from("b.svg")]);
    }
}
