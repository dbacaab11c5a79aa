//! End to end runs of `generate` with the built-in encoders.

use std::{fs, path::Path};

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use webfonts::{generate, Error, Format, Options};
use write_fonts::read::{FontRef, TableProvider};

fn options(dir: &Path, icons: &[&str]) -> Options {
    let files = webfonts_test_data::write_icons(&dir.join("icons"), icons).unwrap();
    Options::new(files, dir.join("fonts"))
}

#[test]
fn writes_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options(dir.path(), &["close.svg", "open.svg"]);
    options.types = Format::ALL.to_vec();
    let result = generate(options).unwrap();

    let fonts = dir.path().join("fonts");
    for format in Format::ALL {
        let written = fs::read(fonts.join(format!("iconfont.{format}"))).unwrap();
        assert_eq!(Some(written.as_slice()), result.get(format), "{format}");
    }
    assert!(fonts.join("iconfont.css").exists());
    assert!(!fonts.join("iconfont.html").exists());

    let svg = String::from_utf8(result.get(Format::Svg).unwrap().to_vec()).unwrap();
    assert!(svg.contains("unicode=\"&#xF101;\""), "{svg}");
    assert!(svg.contains("unicode=\"open\""), "{svg}");

    let ttf = result.get(Format::Ttf).unwrap();
    let font = FontRef::new(ttf).unwrap();
    let cmap = font.cmap().unwrap();
    assert!(cmap.map_codepoint('\u{F101}').is_some());
    assert!(cmap.map_codepoint('\u{F102}').is_some());

    assert_eq!(&result.get(Format::Woff).unwrap()[..4], b"wOFF");
    assert_eq!(&result.get(Format::Woff2).unwrap()[..4], b"wOF2");
}

#[test]
fn every_fixture_compiles() {
    let dir = tempfile::tempdir().unwrap();
    let files = webfonts_test_data::write_all_icons(&dir.path().join("icons")).unwrap();
    let mut options = Options::new(files, dir.path().join("fonts"));
    options.types = Format::ALL.to_vec();
    options.write_files = false;
    let result = generate(options).unwrap();

    let names: Vec<_> = webfonts_test_data::ICONS
        .iter()
        .map(|(file, _)| file.trim_end_matches(".svg"))
        .collect();
    assert_eq!(result.names(), names.as_slice());
    let font = FontRef::new(result.get(Format::Ttf).unwrap()).unwrap();
    let cmap = font.cmap().unwrap();
    for name in &names {
        let cp = char::from_u32(result.codepoints()[*name]).unwrap();
        assert!(cmap.map_codepoint(cp).is_some(), "{name} is not mapped");
    }
}

#[test]
fn stylesheet_references_fonts() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options(dir.path(), &["close.svg", "open.svg"]);
    options.types = vec![Format::Svg, Format::Ttf, Format::Woff];
    let result = generate(options).unwrap();

    let css = fs::read_to_string(dir.path().join("fonts/iconfont.css")).unwrap();
    assert!(css.contains("font-family: \"iconfont\";"), "{css}");
    assert!(css.contains(".icon-close:before {\n\tcontent: \"\\f101\";\n}"), "{css}");
    let woff = css.find("iconfont.woff?").unwrap();
    let ttf = css.find("iconfont.ttf?").unwrap();
    let svg = css.find("iconfont.svg?").unwrap();
    assert!(woff < ttf && ttf < svg, "{css}");
    assert_eq!(css, result.generate_css(None).unwrap());
}

#[test]
fn stylesheet_with_custom_urls() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options(dir.path(), &["close.svg"]);
    options.types = vec![Format::Svg, Format::Ttf, Format::Woff];
    options.write_files = false;
    let result = generate(options).unwrap();

    let urls: IndexMap<_, _> = [
        (Format::Svg, "AAA".to_string()),
        (Format::Ttf, "BBB".to_string()),
        (Format::Woff, "CCC".to_string()),
    ]
    .into_iter()
    .collect();
    let css = result.generate_css(Some(&urls)).unwrap();
    assert!(css.contains("url(\"AAA#iconfont\")"), "{css}");
    assert!(css.contains("url(\"BBB\")"), "{css}");
    assert!(css.contains("url(\"CCC\")"), "{css}");
    assert!(!dir.path().join("fonts").exists());
}

#[test]
fn start_codepoint_and_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options(dir.path(), &["add.svg", "close.svg", "open.svg"]);
    options.types = vec![Format::Svg];
    options.write_files = false;
    options.start_codepoint = 0x40;
    options.codepoints.insert("close".into(), 0xFF);
    let result = generate(options).unwrap();

    let expected: IndexMap<String, u32> = [("close", 0xFF), ("add", 0x40), ("open", 0x41)]
        .into_iter()
        .map(|(name, cp)| (name.to_string(), cp))
        .collect();
    assert_eq!(result.codepoints(), &expected);
    let svg = String::from_utf8(result.get(Format::Svg).unwrap().to_vec()).unwrap();
    for cp in ["&#x40;", "&#x41;", "&#xFF;"] {
        assert!(svg.contains(&format!("unicode=\"{cp}\"")), "{cp} missing from {svg}");
    }
}

#[test]
fn pinned_codepoints_survive() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options(dir.path(), &["close.svg", "open.svg"]);
    options.write_files = false;
    options.codepoints.insert("open".into(), 0xF101);
    options.codepoints.insert("retired".into(), 0xF102);
    let result = generate(options).unwrap();
    assert_eq!(result.codepoints()["open"], 0xF101);
    assert_eq!(result.codepoints()["close"], 0xF103);
    assert_eq!(result.codepoints()["retired"], 0xF102);
    let css = result.generate_css(None).unwrap();
    assert!(!css.contains("retired"), "{css}");
}

#[test]
fn preview_page() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options(dir.path(), &["close.svg", "arrow-left.svg"]);
    options.html = true;
    options.font_name = "glyphs".into();
    generate(options).unwrap();

    let html = fs::read_to_string(dir.path().join("fonts/glyphs.html")).unwrap();
    assert!(html.contains("<title>glyphs</title>"), "{html}");
    assert!(html.contains("url(\"glyphs.woff2?"), "{html}");
    assert!(html.contains("<i class=\"icon icon-arrow-left\"></i>"), "{html}");
}

#[test]
fn configuration_file() {
    let dir = tempfile::tempdir().unwrap();
    let files = webfonts_test_data::write_icons(&dir.path().join("icons"), &["dot.svg"]).unwrap();
    let json = serde_json::json!({
        "files": files,
        "dest": dir.path().join("out"),
        "fontName": "dots",
        "types": ["ttf"],
        "css": false,
        "formatOptions": { "ttf": { "version": "3.5" } },
    });
    let options = Options::from_json(&json.to_string()).unwrap();
    generate(options).unwrap();

    let data = fs::read(dir.path().join("out/dots.ttf")).unwrap();
    let font = FontRef::new(&data).unwrap();
    assert_eq!(font.head().unwrap().font_revision().to_f64(), 3.5);
    assert!(!dir.path().join("out/dots.css").exists());
}

#[test]
fn invalid_runs() {
    let err = generate(Options {
        files: vec!["close.svg".into()],
        ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, Error::MissingOption("dest")), "{err}");
    assert_eq!(err.to_string(), "\"options.dest\" is undefined");

    let err = generate(Options::new(Vec::<&str>::new(), "out")).unwrap_err();
    assert!(matches!(err, Error::NoGlyphs), "{err}");
}

#[test]
fn malformed_icon_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options(dir.path(), &["close.svg"]);
    let broken = dir.path().join("icons/broken.svg");
    fs::write(&broken, webfonts_test_data::malformed::NOT_XML).unwrap();
    options.files.push(broken);

    let err = generate(options).unwrap_err();
    assert!(matches!(&err, Error::MalformedGlyph { name, .. } if name == "broken"), "{err}");
    assert!(!dir.path().join("fonts").exists());
}
