//! Rendering the stylesheet.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{
    error::Result,
    format::Format,
    options::{Options, TemplateOptions},
    template,
};

/// Render the stylesheet for the glyphs `names`, referencing fonts by `urls`.
///
/// Formats without an entry in `urls` are left out of `src`.
pub fn render_css(
    options: &Options,
    names: &[String],
    urls: &IndexMap<Format, String>,
) -> Result<String> {
    let source = options.css_template.source()?;
    let context = css_context(options, names, urls);
    Ok(template::render(&source, &context)?)
}

/// The values available to stylesheet templates.
pub(crate) fn css_context(
    options: &Options,
    names: &[String],
    urls: &IndexMap<Format, String>,
) -> Value {
    let codepoints: Map<String, Value> = names
        .iter()
        .filter_map(|name| {
            let codepoint = options.codepoints.get(name)?;
            Some((name.clone(), Value::String(format!("{codepoint:x}"))))
        })
        .collect();

    let mut context = Map::new();
    context.insert("fontName".into(), options.font_name.clone().into());
    context.insert("src".into(), font_src(options, urls).into());
    context.insert("codepoints".into(), Value::Object(codepoints));
    context.extend(template_values(&options.template_options));
    Value::Object(context)
}

/// The template options as context entries, known keys first.
pub(crate) fn template_values(template_options: &TemplateOptions) -> Map<String, Value> {
    match serde_json::to_value(template_options) {
        Ok(Value::Object(map)) => map,
        // a struct of strings and JSON values always serializes to an object
        _ => Map::new(),
    }
}

/// The `src` descriptor of `@font-face`, in `options.order`.
fn font_src(options: &Options, urls: &IndexMap<Format, String>) -> String {
    options
        .order
        .iter()
        .filter(|format| options.types.contains(*format))
        .filter_map(|format| {
            let url = urls.get(format)?;
            Some(match format {
                Format::Svg => format!(
                    "url(\"{url}#{}\") format(\"{}\")",
                    options.font_name,
                    format.css_format()
                ),
                _ => format!("url(\"{url}\") format(\"{}\")", format.css_format()),
            })
        })
        .collect::<Vec<_>>()
        .join(",\n\t\t")
}
