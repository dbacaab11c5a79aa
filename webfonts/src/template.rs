//! Rendering Handlebars templates.
//!
//! Stylesheet and preview page templates are rendered with [`handlebars`] in
//! its default, non-strict mode, so missing values render as nothing. On top
//! of the built-in helpers one more is registered:
//!
//! - `{{removePeriods path}}`: the string at `path` with every `.` removed,
//!   which turns a selector such as `.icon` into a class name.
//!
//! [`handlebars`]: https://docs.rs/handlebars

use handlebars::{handlebars_helper, Handlebars};
use serde_json::Value;
use thiserror::Error;

const TEMPLATE_NAME: &str = "template";

handlebars_helper!(remove_periods: |selector: str| selector.replace('.', ""));

/// An error encountered while parsing or rendering a template.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("template error: {message}")]
pub struct TemplateError {
    /// The line the error was found on, if known.
    pub line: Option<usize>,
    pub message: String,
}

impl From<handlebars::TemplateError> for TemplateError {
    fn from(e: handlebars::TemplateError) -> Self {
        TemplateError {
            line: e.pos().map(|(line, _)| line),
            message: e.reason().to_string(),
        }
    }
}

impl From<handlebars::RenderError> for TemplateError {
    fn from(e: handlebars::RenderError) -> Self {
        TemplateError {
            line: e.line_no,
            message: e.reason().to_string(),
        }
    }
}

fn registry() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.register_helper("removePeriods", Box::new(remove_periods));
    registry
}

/// Check that `source` is a well formed template.
pub fn compile(source: &str) -> Result<(), TemplateError> {
    handlebars::Template::compile(source)?;
    Ok(())
}

/// Parse `source` and render it against `context`.
pub fn render(source: &str, context: &Value) -> Result<String, TemplateError> {
    let mut registry = registry();
    registry.register_template_string(TEMPLATE_NAME, source)?;
    let rendered = registry.render(TEMPLATE_NAME, context)?;
    log::trace!("rendered {} byte template", source.len());
    Ok(rendered)
}
