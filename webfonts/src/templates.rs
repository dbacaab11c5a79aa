//! The built-in stylesheet and preview page templates.

/// A plain CSS stylesheet with one class per icon.
pub const CSS: &str = include_str!("../templates/css.hbs");

/// An SCSS stylesheet with a name to codepoint map.
pub const SCSS: &str = include_str!("../templates/scss.hbs");

/// A preview page showing every icon with its name.
pub const HTML: &str = include_str!("../templates/html.hbs");
