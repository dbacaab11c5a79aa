//! Rendering the preview page.

use std::path::{Component, Path, PathBuf};

use serde_json::{Map, Value};

use crate::{
    cache_key,
    css::{css_context, template_values},
    error::Result,
    options::{Options, TemplateRef},
    template,
};

/// Render the preview page for the glyphs `names`.
///
/// The page embeds the default stylesheet, with font URLs relative to
/// `html_dest`'s directory so that the page works when opened from disk.
pub fn render_html(
    options: &Options,
    names: &[String],
    key: &str,
    fonts_dir: &Path,
    html_dest: &Path,
) -> Result<String> {
    let html_dir = html_dest.parent().unwrap_or(Path::new(""));
    let fonts_url = url_path(&relative_path(html_dir, fonts_dir));
    let urls = cache_key::asset_urls(options, key, Some(fonts_url.as_str()));
    let css_source = TemplateRef::Css.source()?;
    let styles = template::render(&css_source, &css_context(options, names, &urls))?;

    let mut context = Map::new();
    context.insert(
        "names".into(),
        Value::Array(names.iter().cloned().map(Value::String).collect()),
    );
    context.insert("fontName".into(), options.font_name.clone().into());
    context.insert("styles".into(), styles.into());
    context.extend(template_values(&options.template_options));

    let source = options.html_template.source()?;
    Ok(template::render(&source, &Value::Object(context))?)
}

/// The path of `to` relative to the directory `from`, lexically.
fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<_> = from.components().filter(|c| *c != Component::CurDir).collect();
    let to: Vec<_> = to.components().filter(|c| *c != Component::CurDir).collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
    from[common..]
        .iter()
        .map(|_| Component::ParentDir)
        .chain(to[common..].iter().copied())
        .collect()
}

/// A relative path as a URL path, with `/` separators.
fn url_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::format::Format;

    #[rstest]
    #[case("out", "out", "")]
    #[case("out/html", "out", "..")]
    #[case("out", "out/fonts", "fonts")]
    #[case("site/pages", "site/assets/fonts", "../assets/fonts")]
    #[case("./out", "out/fonts", "fonts")]
    fn relative(#[case] from: &str, #[case] to: &str, #[case] expected: &str) {
        assert_eq!(url_path(&relative_path(Path::new(from), Path::new(to))), expected);
    }

    fn options() -> Options {
        let mut options = Options {
            types: vec![Format::Woff2],
            ..Default::default()
        };
        options.codepoints.insert("close".into(), 0xF101);
        options
    }

    #[test]
    fn page_lists_icons_with_relative_fonts() {
        let names = vec!["close".to_string()];
        let html = render_html(
            &options(),
            &names,
            "k",
            Path::new("out/fonts"),
            Path::new("out/preview.html"),
        )
        .unwrap();
        assert!(html.contains("<title>iconfont</title>"), "{html}");
        assert!(html.contains("url(\"fonts/iconfont.woff2?k\")"), "{html}");
        assert!(html.contains("<i class=\"icon icon-close\"></i>"), "{html}");
        assert!(html.contains("<span class=\"label\">close</span>"), "{html}");
    }

    #[test]
    fn fonts_next_to_the_page() {
        let html = render_html(
            &options(),
            &["close".into()],
            "k",
            Path::new("out"),
            Path::new("out/iconfont.html"),
        )
        .unwrap();
        assert!(html.contains("url(\"iconfont.woff2?k\")"), "{html}");
    }
}
