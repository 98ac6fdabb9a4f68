//! The recursive projection of a template request and its dependencies.
//!
//! ## Per-request flow
//!
//! ```text
//! expand → resolve → unpack → discover → delegated runs
//!   ─┬─ delegating only → (nothing)
//!    └─ children (depth first, in order) → project own content
//! → delete unpack dir
//! ```
//!
//! Every request of one run projects into the same scratch tree, at the offset
//! given by its `directory_name` from the scratch root. Because a template's own
//! content is projected after all of its dependencies, an ancestor overrides
//! files a dependency produced at the same path. The scratch tree is installed
//! into the top-level request's installation path once the recursion finishes.
//!
//! Requests a script delegates are not part of that tree. Each one is a run of
//! its own with its own scratch tree and installation, started as soon as the
//! script has been evaluated. Delegated runs inherit the active template chain
//! so a template cannot delegate to itself forever.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::artifact::ArtifactCoordinate;
use crate::context::RunContext;
use crate::dependencies::{DependencyDiscoverer, ScriptEngine, ScriptScope, YamlScriptEngine};
use crate::error::{Result, TemplateError};
use crate::expander::PropertyExpander;
use crate::fs;
use crate::installer::{self, ProjectionOutcome};
use crate::projector::TreeProjector;
use crate::request::{RequestKinds, TemplateRequest};
use crate::resolver::{ArtifactResolver, TemplateResolver};
use crate::templates::renderer::TemplateRenderer;

/// One entry of the chain of templates currently being processed.
#[derive(Clone)]
struct ActiveTemplate {
    coordinate: ArtifactCoordinate,
    request: String,
}

impl ActiveTemplate {
    /// Keyed by what shapes the projection; the install settings only matter
    /// at the top level.
    fn new(coordinate: ArtifactCoordinate, request: &TemplateRequest) -> Result<Self> {
        let mut key = request.clone();
        key.installation_path = String::new();
        key.overwrite = false;
        Ok(Self {
            coordinate,
            request: serde_json::to_string(&key).map_err(anyhow::Error::from)?,
        })
    }

    fn is_same(&self, other: &Self) -> bool {
        self.coordinate == other.coordinate && self.request == other.request
    }
}

/// Drives projection runs against one artifact source.
pub struct TemplateProcessor {
    resolver: Box<dyn ArtifactResolver>,
    yaml: YamlScriptEngine,
    engine: Option<Box<dyn ScriptEngine>>,
    renderer: TemplateRenderer,
    kinds: RequestKinds,
}

impl TemplateProcessor {
    pub fn new(resolver: impl ArtifactResolver + 'static, kinds: RequestKinds) -> Self {
        let renderer = TemplateRenderer::new();
        Self {
            resolver: Box::new(resolver),
            yaml: YamlScriptEngine::new(renderer.clone()),
            engine: None,
            renderer,
            kinds,
        }
    }

    /// Replace the engine evaluating dependency scripts.
    pub fn with_script_engine(mut self, engine: impl ScriptEngine + 'static) -> Self {
        self.engine = Some(Box::new(engine));
        self
    }

    /// Settings sections templates read with the `config` helper.
    pub fn with_settings(mut self, settings: &BTreeMap<String, Value>) -> Self {
        self.renderer = self.renderer.with_settings(settings);
        self.yaml = YamlScriptEngine::new(self.renderer.clone());
        self
    }

    fn engine(&self) -> &dyn ScriptEngine {
        match &self.engine {
            Some(engine) => engine.as_ref(),
            None => &self.yaml,
        }
    }

    /// Project `request` and everything it depends on, then install the result.
    ///
    /// Any error aborts the run with the installation untouched. A conflict with
    /// existing files is reported as [`ProjectionOutcome::AlreadyExists`].
    pub fn run(&self, request: TemplateRequest) -> Result<ProjectionOutcome> {
        self.run_chained(request, Vec::new())
    }

    fn run_chained(
        &self,
        request: TemplateRequest,
        mut chain: Vec<ActiveTemplate>,
    ) -> Result<ProjectionOutcome> {
        let context = RunContext::new(request.kind.clone());
        let scratch = fs::create_temp_dir("template-projection-")?;
        tracing::debug!("run {} projecting into {}", context.run_id, scratch.path().display());

        let mut request = request;
        if let Err(e) = self.process(&mut request, &context, scratch.path(), &mut chain) {
            fs::close_temp_dir(scratch, "scratch directory");
            return Err(e);
        }

        let target = PathBuf::from(&request.installation_path);
        tracing::info!("installing projection into {}", target.display());
        installer::install(scratch, &target, request.overwrite)
    }

    fn process(
        &self,
        request: &mut TemplateRequest,
        context: &RunContext,
        scratch_root: &Path,
        chain: &mut Vec<ActiveTemplate>,
    ) -> Result<()> {
        tracing::debug!("expanding properties of {}", request.kind);
        PropertyExpander::new(&self.renderer).expand(request, context)?;

        let identifier = request.template_identifier(&self.kinds)?;
        let archive = TemplateResolver::new(self.resolver.as_ref()).resolve(&identifier, &request.kind)?;
        tracing::info!("resolved {identifier} to {}", archive.coordinate);

        let active = ActiveTemplate::new(archive.coordinate.clone(), request)?;
        if chain.iter().any(|a| a.is_same(&active)) {
            let mut cycle: Vec<String> = chain.iter().map(|a| a.coordinate.to_string()).collect();
            cycle.push(active.coordinate.to_string());
            return Err(TemplateError::DependencyCycle { chain: cycle });
        }

        let unpacked = fs::create_temp_dir("template-")?;
        let coordinate = archive.coordinate.clone();
        chain.push(active);
        let result = archive.unpack_into(unpacked.path()).and_then(|()| {
            self.process_unpacked(
                request,
                &identifier,
                &coordinate,
                unpacked.path(),
                context,
                scratch_root,
                chain,
            )
        });
        chain.pop();
        fs::close_temp_dir(unpacked, "template directory");
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn process_unpacked(
        &self,
        request: &TemplateRequest,
        identifier: &str,
        coordinate: &ArtifactCoordinate,
        template_dir: &Path,
        context: &RunContext,
        scratch_root: &Path,
        chain: &mut Vec<ActiveTemplate>,
    ) -> Result<()> {
        let scope = ScriptScope { request, context };
        let output = DependencyDiscoverer::new(self.engine()).discover(template_dir, coordinate, &scope)?;

        for delegated in output.delegate {
            tracing::info!("{coordinate} delegates {} to a separate run", delegated.kind);
            if let ProjectionOutcome::AlreadyExists(conflict) = self.run_chained(delegated, chain.clone())? {
                tracing::warn!(
                    "delegated run from {coordinate} installed nothing: {} path(s) already exist in {}",
                    conflict.paths.len(),
                    conflict.installation_path.display()
                );
            }
        }

        let dependencies = output.dependencies;
        if request.is_delegating_only(&self.kinds) {
            if !dependencies.is_empty() {
                tracing::warn!(
                    "ignoring {} dependenc{} of {} with template {identifier} because it is marked as delegating only",
                    dependencies.len(),
                    if dependencies.len() == 1 { "y" } else { "ies" },
                    request.kind
                );
            }
            return Ok(());
        }

        let child_context = context.descend();
        for mut dependency in dependencies {
            self.process(&mut dependency, &child_context, scratch_root, chain)?;
        }

        let offset = match &request.directory_name {
            Some(name) => fs::clean_relative(name).ok_or_else(|| TemplateError::EscapingPath {
                origin: format!("directory_name of {}", request.kind),
                path: name.clone(),
            })?,
            None => PathBuf::new(),
        };
        let destination = scratch_root.join(&offset);
        tracing::info!("projecting {coordinate} into ./{}", offset.display());

        let data = context.data_model(request);
        TreeProjector::new(&self.renderer).project(template_dir, coordinate, &data, &destination)
    }
}
