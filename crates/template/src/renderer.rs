//! Dialect-detecting template renderer.
//!
//! A template is treated as rich whenever it contains either reserved
//! marker (`{{` or `{%`); everything else goes through the legacy
//! single-placeholder substitution. Rendering is pure: no I/O, identical
//! inputs produce identical output.

use minijinja::Environment;
use promptdoc_core::{AppError, AppResult};

/// Extra variables exposed to rich templates alongside `document`.
pub type Bindings = serde_json::Map<String, serde_json::Value>;

/// Marker that switches a template into the rich dialect (expressions).
const EXPR_MARKER: &str = "{{";

/// Marker that switches a template into the rich dialect (blocks).
const BLOCK_MARKER: &str = "{%";

/// Placeholder replaced in legacy templates.
const LEGACY_PLACEHOLDER: &str = "{document}";

/// Render a template with a document and optional extra bindings.
///
/// Dialect is auto-detected: templates containing `{{` or `{%` are run
/// through minijinja with `document` and every extra binding exposed as
/// top-level variables; anything else falls back to a literal replacement
/// of `{document}`.
///
/// Rich-dialect failures surface as [`AppError::TemplateSyntax`], a
/// client-input error that is never retried.
///
/// # Examples
/// ```
/// use promptdoc_template::{render, Bindings};
///
/// let out = render("Summarize: {document}", "hi", &Bindings::new()).unwrap();
/// assert_eq!(out, "Summarize: hi");
///
/// let out = render("{{ document | upper }}", "hi", &Bindings::new()).unwrap();
/// assert_eq!(out, "HI");
/// ```
pub fn render(template: &str, document: &str, extra: &Bindings) -> AppResult<String> {
    if template.contains(EXPR_MARKER) || template.contains(BLOCK_MARKER) {
        tracing::debug!("Rendering rich template");
        render_rich(template, document, extra)
    } else {
        tracing::debug!("Rendering legacy template");
        Ok(template.replace(LEGACY_PLACEHOLDER, document))
    }
}

/// Render a rich template with minijinja.
fn render_rich(template: &str, document: &str, extra: &Bindings) -> AppResult<String> {
    let mut env = Environment::new();

    // Plain-text output, so HTML auto-escaping is disabled.
    env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);

    env.add_template("prompt", template)
        .map_err(|e| AppError::TemplateSyntax(e.to_string()))?;

    let tmpl = env
        .get_template("prompt")
        .map_err(|e| AppError::TemplateSyntax(e.to_string()))?;

    // Extra bindings first so `document` always wins on collision.
    let mut context = extra.clone();
    context.insert(
        "document".to_string(),
        serde_json::Value::String(document.to_string()),
    );

    tmpl.render(minijinja::Value::from_serialize(&context))
        .map_err(|e| AppError::TemplateSyntax(e.to_string()))
}
