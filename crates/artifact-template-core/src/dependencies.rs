//! Discovery of the sub-templates a template wants projected alongside itself.
//!
//! A template declares its dependencies in [`DEPENDENCIES_SCRIPT`] at its root.
//! The script is evaluated by a [`ScriptEngine`] with the expanded request and
//! the run context in scope, and yields a [`ScriptOutput`]: an ordered list of
//! further [`TemplateRequest`]s projected into the same tree, and requests
//! delegated to runs of their own.
//!
//! The shipped engine, [`YamlScriptEngine`], renders the script with
//! Handlebars and reads the output as a YAML list of requests. Values are
//! embedded with the `json` helper so quotes, colons and newlines survive:
//!
//! ```text
//! - kind: create-model
//!   template: com.example:model-template#1.0
//!   directory_name: {{json (concat request.properties.name "-model")}}
//!   properties:
//!     name: {{json request.properties.name}}
//! {{#if request.properties.with_tests}}
//! - kind: create-test
//!   directory_name: {{json (concat request.properties.name "-test")}}
//! {{/if}}
//! ```
//!
//! A script that also delegates uses the mapping form instead:
//!
//! ```text
//! dependencies:
//!   - kind: create-model
//! delegate:
//!   - kind: create-library
//!     installation_path: {{json (concat request.installation_path "/library")}}
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::artifact::ArtifactCoordinate;
use crate::context::RunContext;
use crate::error::{Result, TemplateError};
use crate::request::TemplateRequest;
use crate::templates::layout::DEPENDENCIES_SCRIPT;
use crate::templates::renderer::TemplateRenderer;

/// What a dependency script can see.
pub struct ScriptScope<'a> {
    pub request: &'a TemplateRequest,
    pub context: &'a RunContext,
}

/// What a dependency script asks for.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptOutput {
    /// Projected into the current tree before the template itself, in order.
    #[serde(default)]
    pub dependencies: Vec<TemplateRequest>,
    /// Each run as a separate projection with its own installation.
    #[serde(default)]
    pub delegate: Vec<TemplateRequest>,
}

impl ScriptOutput {
    pub fn dependencies(dependencies: Vec<TemplateRequest>) -> Self {
        Self {
            dependencies,
            delegate: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.delegate.is_empty()
    }
}

/// The two shapes a YAML script may render to.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptDocument {
    List(Vec<TemplateRequest>),
    Sections(ScriptOutput),
}

/// Evaluates a dependency declaration script.
pub trait ScriptEngine: Send + Sync {
    fn evaluate(&self, source: &str, scope: &ScriptScope<'_>) -> anyhow::Result<ScriptOutput>;
}

/// Handlebars-rendered YAML list of requests.
#[derive(Clone, Default)]
pub struct YamlScriptEngine {
    renderer: TemplateRenderer,
}

impl YamlScriptEngine {
    pub fn new(renderer: TemplateRenderer) -> Self {
        Self { renderer }
    }
}

impl ScriptEngine for YamlScriptEngine {
    fn evaluate(&self, source: &str, scope: &ScriptScope<'_>) -> anyhow::Result<ScriptOutput> {
        let data = scope.context.data_model(scope.request);
        let rendered = self.renderer.render(source, &data)?;
        if rendered.trim().is_empty() {
            return Ok(ScriptOutput::default());
        }
        let document: Option<ScriptDocument> = serde_yaml::from_str(&rendered)?;
        Ok(match document {
            Some(ScriptDocument::List(dependencies)) => ScriptOutput::dependencies(dependencies),
            Some(ScriptDocument::Sections(output)) => output,
            None => ScriptOutput::default(),
        })
    }
}

pub struct DependencyDiscoverer<'a> {
    engine: &'a dyn ScriptEngine,
}

impl<'a> DependencyDiscoverer<'a> {
    pub fn new(engine: &'a dyn ScriptEngine) -> Self {
        Self { engine }
    }

    /// The requests declared by the template unpacked at `template_dir`.
    ///
    /// Without a dependency script the engine is not invoked and the output is empty.
    pub fn discover(
        &self,
        template_dir: &Path,
        coordinate: &ArtifactCoordinate,
        scope: &ScriptScope<'_>,
    ) -> Result<ScriptOutput> {
        let script = template_dir.join(DEPENDENCIES_SCRIPT);
        if !script.is_file() {
            return Ok(ScriptOutput::default());
        }

        let source = std::fs::read_to_string(&script)?;
        let output = self
            .engine
            .evaluate(&source, scope)
            .map_err(|e| TemplateError::DependencyScript {
                script: DEPENDENCIES_SCRIPT.to_string(),
                coordinate: coordinate.to_string(),
                message: format!("{e:#}"),
            })?;

        tracing::debug!(
            "{coordinate} declares {} dependenc{} and {} delegated request(s)",
            output.dependencies.len(),
            if output.dependencies.len() == 1 { "y" } else { "ies" },
            output.delegate.len()
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn coordinate() -> ArtifactCoordinate {
        ArtifactCoordinate {
            group_id: "g".into(),
            artifact_id: "parent".into(),
            version: Version::new(1, 0, 0),
        }
    }

    struct CountingEngine(AtomicUsize);

    impl ScriptEngine for CountingEngine {
        fn evaluate(&self, _: &str, _: &ScriptScope<'_>) -> anyhow::Result<ScriptOutput> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(ScriptOutput::default())
        }
    }

    #[test]
    fn test_no_script_skips_engine() {
        let dir = tempfile::tempdir().unwrap();
        let engine = CountingEngine(AtomicUsize::new(0));
        let request = TemplateRequest::new("k");
        let context = RunContext::new("k");
        let scope = ScriptScope {
            request: &request,
            context: &context,
        };

        let found = DependencyDiscoverer::new(&engine)
            .discover(dir.path(), &coordinate(), &scope)
            .unwrap();
        assert!(found.is_empty());
        assert_eq!(engine.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_yaml_script_yields_ordered_requests() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEPENDENCIES_SCRIPT),
            r#"
- kind: create-model
  template: g:model#1.0
  directory_name: {{json (concat request.properties.name "-model")}}
{{#if request.properties.with_tests}}
- kind: create-test
  template: g:test#1.0
  directory_name: {{json (concat request.properties.name "-test")}}
{{/if}}
"#,
        )
        .unwrap();

        let engine = YamlScriptEngine::default();
        let request = TemplateRequest::new("create-api")
            .with_property("name", "orders")
            .with_property("with_tests", true);
        let context = RunContext::new("create-api");
        let scope = ScriptScope {
            request: &request,
            context: &context,
        };

        let found = DependencyDiscoverer::new(&engine)
            .discover(dir.path(), &coordinate(), &scope)
            .unwrap();
        let names: Vec<_> = found
            .dependencies
            .iter()
            .map(|r| r.directory_name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["orders-model", "orders-test"]);
        assert_eq!(found.dependencies[0].template.as_deref(), Some("g:model#1.0"));
        assert!(found.delegate.is_empty());
    }

    #[test]
    fn test_yaml_script_keeps_awkward_values_intact() {
        let title = "The \"Orders\" service: v2\n# not a comment";
        let engine = YamlScriptEngine::default();
        let request = TemplateRequest::new("create-api").with_property("title", title);
        let context = RunContext::new("create-api");
        let scope = ScriptScope {
            request: &request,
            context: &context,
        };

        let found = engine
            .evaluate(
                "- kind: create-model\n  properties:\n    title: {{json request.properties.title}}\n",
                &scope,
            )
            .unwrap();
        assert_eq!(found.dependencies.len(), 1);
        assert_eq!(found.dependencies[0].properties["title"], title);
    }

    #[test]
    fn test_yaml_script_sections() {
        let engine = YamlScriptEngine::default();
        let request = TemplateRequest::new("create-all");
        let context = RunContext::new("create-all");
        let scope = ScriptScope {
            request: &request,
            context: &context,
        };

        let found = engine
            .evaluate(
                "dependencies:\n  - kind: a\ndelegate:\n  - kind: b\n  - kind: c\n",
                &scope,
            )
            .unwrap();
        let kinds = |list: &[TemplateRequest]| list.iter().map(|r| r.kind.clone()).collect::<Vec<_>>();
        assert_eq!(kinds(&found.dependencies), vec!["a"]);
        assert_eq!(kinds(&found.delegate), vec!["b", "c"]);

        let delegate_only = engine.evaluate("delegate:\n  - kind: b\n", &scope).unwrap();
        assert!(delegate_only.dependencies.is_empty());
        assert_eq!(kinds(&delegate_only.delegate), vec!["b"]);

        assert!(engine.evaluate("delegates:\n  - kind: b\n", &scope).is_err());
    }

    #[test]
    fn test_yaml_script_may_render_empty() {
        let engine = YamlScriptEngine::default();
        let request = TemplateRequest::new("k").with_property("enabled", false);
        let context = RunContext::new("k");
        let scope = ScriptScope {
            request: &request,
            context: &context,
        };
        let found = engine
            .evaluate("{{#if request.properties.enabled}}- kind: x{{/if}}\n", &scope)
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_script_failure_names_script_and_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEPENDENCIES_SCRIPT), "- kind: [unclosed\n").unwrap();

        let engine = YamlScriptEngine::default();
        let request = TemplateRequest::new("k");
        let context = RunContext::new("k");
        let scope = ScriptScope {
            request: &request,
            context: &context,
        };

        let err = DependencyDiscoverer::new(&engine)
            .discover(dir.path(), &coordinate(), &scope)
            .unwrap_err();
        assert!(matches!(
            &err,
            TemplateError::DependencyScript { script, coordinate, .. }
                if script == DEPENDENCIES_SCRIPT && coordinate == "g:parent#1.0.0"
        ));
    }
}
