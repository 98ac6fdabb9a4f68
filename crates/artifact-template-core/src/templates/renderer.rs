//! Handlebars-based renderer used for every templating pass of a projection:
//! request properties, the dependency script, the static directive file and
//! each dynamic file.
//!
//! Wraps the [`handlebars::Handlebars`] engine with **strict mode** enabled.
//! Any `{{variable}}` referenced in a template must be present in the data
//! context, otherwise rendering returns an error. HTML escaping is disabled:
//! the output is source code and configuration, not markup.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::templates::renderer::TemplateRenderer;
//!
//! let renderer = TemplateRenderer::new();
//! let data = serde_json::json!({ "request": { "kind": "create-library" } });
//! let rendered = renderer.render_file("{{#if skip}}{{ignore}}{{/if}}name = {{request.kind}}", &data)?;
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use handlebars::{Handlebars, RenderError};
use serde_json::Value;

use super::control::{
    CreateDir, FileDirective, IgnoreFile, IgnorePath, RelocateFile, RelocatePath,
    StaticDirectiveSet,
};
use super::support;

/// Output of rendering one dynamic file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub content: String,
    pub directive: FileDirective,
}

/// Template renderer with the support helpers registered.
#[derive(Clone)]
pub struct TemplateRenderer {
    hbs: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Create a new renderer with strict mode enabled and escaping disabled.
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(handlebars::no_escape);
        support::register(&mut hbs);
        Self { hbs }
    }

    /// Expose `settings` to templates through the `config` helper.
    pub fn with_settings(mut self, settings: &BTreeMap<String, Value>) -> Self {
        support::register_settings(&mut self.hbs, settings);
        self
    }

    /// Render a template string with the given data context.
    pub fn render(&self, template: &str, data: &Value) -> Result<String, RenderError> {
        self.hbs.render_template(template, data)
    }

    /// Render a dynamic file, collecting the `ignore` / `relocate` directive
    /// the template issued while rendering.
    pub fn render_file(&self, template: &str, data: &Value) -> Result<RenderedFile, RenderError> {
        let directive = Arc::new(Mutex::new(FileDirective::Default));

        let mut hbs = self.hbs.clone();
        hbs.register_helper("ignore", Box::new(IgnoreFile(directive.clone())));
        hbs.register_helper("relocate", Box::new(RelocateFile(directive.clone())));

        let content = hbs.render_template(template, data)?;
        let directive = directive
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        Ok(RenderedFile { content, directive })
    }

    /// Render the static directive template. Its text output is discarded;
    /// only the `create_dir` / `ignore` / `relocate` calls matter.
    pub fn render_static_directives(
        &self,
        template: &str,
        data: &Value,
    ) -> Result<StaticDirectiveSet, RenderError> {
        let directives = Arc::new(Mutex::new(StaticDirectiveSet::default()));

        let mut hbs = self.hbs.clone();
        hbs.register_helper("create_dir", Box::new(CreateDir(directives.clone())));
        hbs.register_helper("ignore", Box::new(IgnorePath(directives.clone())));
        hbs.register_helper("relocate", Box::new(RelocatePath(directives.clone())));

        hbs.render_template(template, data)?;
        let directives = directives
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Ok(directives)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_simple() {
        let renderer = TemplateRenderer::new();
        let out = renderer
            .render("name = {{request.kind}}", &json!({ "request": { "kind": "lib" } }))
            .unwrap();
        assert_eq!(out, "name = lib");
    }

    #[test]
    fn test_strict_mode_rejects_missing_variable() {
        let renderer = TemplateRenderer::new();
        assert!(renderer.render("{{missing}}", &json!({})).is_err());
    }

    #[test]
    fn test_no_html_escaping() {
        let renderer = TemplateRenderer::new();
        let out = renderer
            .render("{{value}}", &json!({ "value": "Vec<&str>" }))
            .unwrap();
        assert_eq!(out, "Vec<&str>");
    }

    #[test]
    fn test_render_file_default_directive() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer.render_file("plain", &json!({})).unwrap();
        assert_eq!(rendered.content, "plain");
        assert_eq!(rendered.directive, FileDirective::Default);
    }

    #[test]
    fn test_render_file_relocate() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer
            .render_file(
                "{{relocate (concat dir \"/lib.rs\")}}body",
                &json!({ "dir": "src" }),
            )
            .unwrap();
        assert_eq!(rendered.content, "body");
        assert_eq!(rendered.directive, FileDirective::Relocate("src/lib.rs".into()));
    }

    #[test]
    fn test_render_file_ignore_wins_over_relocate() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer
            .render_file("{{ignore}}{{relocate \"elsewhere.txt\"}}", &json!({}))
            .unwrap();
        assert_eq!(rendered.directive, FileDirective::Suppress);
    }

    #[test]
    fn test_directives_do_not_leak_between_renders() {
        let renderer = TemplateRenderer::new();
        renderer.render_file("{{ignore}}", &json!({})).unwrap();
        let second = renderer.render_file("kept", &json!({})).unwrap();
        assert_eq!(second.directive, FileDirective::Default);
    }

    #[test]
    fn test_render_static_directives() {
        let renderer = TemplateRenderer::new();
        let set = renderer
            .render_static_directives(
                "{{create_dir \"logs\"}}\n{{ignore \"secret.txt\"}}\n{{relocate \"a.txt\" \"docs/a.txt\"}}",
                &json!({}),
            )
            .unwrap();
        assert_eq!(set.create_dirs, vec!["logs".to_string()]);
        assert_eq!(set.ignored, vec!["secret.txt".to_string()]);
        assert_eq!(set.relocations.get("a.txt").map(String::as_str), Some("docs/a.txt"));
    }

    #[test]
    fn test_control_helpers_require_arguments() {
        let renderer = TemplateRenderer::new();
        assert!(renderer.render_file("{{relocate}}", &json!({})).is_err());
        assert!(renderer.render_static_directives("{{create_dir}}", &json!({})).is_err());
    }
}
