//! Projection of one unpacked template into the scratch tree.
//!
//! Two phases, in order:
//!
//! 1. **Static**: the static directive template (if any) is rendered into a
//!    [`StaticDirectiveSet`]; listed directories are created, `content/static/`
//!    is copied except ignored paths and relocation sources, and relocation
//!    sources are copied to their targets.
//! 2. **Dynamic**: every `*.hbs` file under `content/dynamic/` is rendered and
//!    written to its default destination (suffix stripped, relative to
//!    `projected/`), to the target it relocated itself to, or nowhere when it
//!    called `ignore`. Other files there are copied verbatim.

use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::artifact::ArtifactCoordinate;
use crate::error::{Result, TemplateError};
use crate::fs;
use crate::templates::control::{FileDirective, StaticDirectiveSet};
use crate::templates::layout::{
    DYNAMIC_DIR, PROJECTED_DIR, STATIC_DIR, STATIC_TEMPLATE, TEMPLATE_SUFFIX,
};
use crate::templates::renderer::TemplateRenderer;

pub struct TreeProjector<'a> {
    renderer: &'a TemplateRenderer,
}

impl<'a> TreeProjector<'a> {
    pub fn new(renderer: &'a TemplateRenderer) -> Self {
        Self { renderer }
    }

    /// Project the template unpacked at `template_dir` into `destination`.
    pub fn project(
        &self,
        template_dir: &Path,
        coordinate: &ArtifactCoordinate,
        data: &Value,
        destination: &Path,
    ) -> Result<()> {
        fs::ensure_dir(destination)?;
        self.project_static(template_dir, coordinate, data, destination)?;
        self.project_dynamic(template_dir, coordinate, data, destination)
    }

    fn project_static(
        &self,
        template_dir: &Path,
        coordinate: &ArtifactCoordinate,
        data: &Value,
        destination: &Path,
    ) -> Result<()> {
        let directive_file = template_dir.join(DYNAMIC_DIR).join(STATIC_TEMPLATE);
        let directives = if directive_file.is_file() {
            let source = std::fs::read_to_string(&directive_file)?;
            self.renderer
                .render_static_directives(&source, data)
                .map_err(|e| TemplateError::TemplateRender {
                    path: Path::new(DYNAMIC_DIR).join(STATIC_TEMPLATE),
                    coordinate: coordinate.to_string(),
                    message: e.to_string(),
                })?
        } else {
            StaticDirectiveSet::default()
        };

        if !directives.is_empty() {
            tracing::debug!("static directives of {coordinate}: {directives:?}");
        }
        let plan = StaticPlan::new(&directives, coordinate)?;

        for dir in &plan.create_dirs {
            fs::ensure_dir(&destination.join(dir))?;
        }

        let static_dir = template_dir.join(STATIC_DIR);
        if static_dir.is_dir() {
            let walker = WalkDir::new(&static_dir)
                .min_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| {
                    let rel = entry.path().strip_prefix(&static_dir).unwrap_or(entry.path());
                    !plan.is_excluded(rel)
                });

            for entry in walker {
                let entry = entry.map_err(std::io::Error::from)?;
                let rel = entry.path().strip_prefix(&static_dir).unwrap_or(entry.path());
                let target = destination.join(rel);
                if entry.file_type().is_dir() {
                    fs::ensure_dir(&target)?;
                } else {
                    fs::copy_file(entry.path(), &target)?;
                }
            }
        }

        for (source, target) in &plan.relocations {
            let from = static_dir.join(source);
            if !from.exists() {
                return Err(TemplateError::StaticDirective {
                    coordinate: coordinate.to_string(),
                    message: format!("relocation source '{}' does not exist", source.display()),
                });
            }
            tracing::debug!("relocating static {} to {}", source.display(), target.display());
            fs::copy_path(&from, &destination.join(target))?;
        }

        Ok(())
    }

    fn project_dynamic(
        &self,
        template_dir: &Path,
        coordinate: &ArtifactCoordinate,
        data: &Value,
        destination: &Path,
    ) -> Result<()> {
        let dynamic_dir = template_dir.join(DYNAMIC_DIR);
        if !dynamic_dir.is_dir() {
            return Ok(());
        }

        for entry in WalkDir::new(&dynamic_dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_dir() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&dynamic_dir)
                .unwrap_or(entry.path())
                .to_path_buf();
            if rel == Path::new(STATIC_TEMPLATE) {
                continue;
            }

            let natural = rel.strip_prefix(PROJECTED_DIR).unwrap_or(&rel).to_path_buf();
            let Some(default_target) = strip_template_suffix(&natural) else {
                fs::copy_file(entry.path(), &destination.join(&natural))?;
                continue;
            };

            let source = std::fs::read_to_string(entry.path())?;
            let rendered = self.renderer.render_file(&source, data).map_err(|e| {
                TemplateError::TemplateRender {
                    path: Path::new(DYNAMIC_DIR).join(&rel),
                    coordinate: coordinate.to_string(),
                    message: e.to_string(),
                }
            })?;

            let target = match rendered.directive {
                FileDirective::Default => default_target,
                FileDirective::Relocate(target) => {
                    fs::clean_relative(&target).ok_or_else(|| TemplateError::EscapingPath {
                        origin: format!(
                            "relocate in {} of {coordinate}",
                            Path::new(DYNAMIC_DIR).join(&rel).display()
                        ),
                        path: target.clone(),
                    })?
                }
                FileDirective::Suppress => {
                    tracing::debug!("{} ignored itself", rel.display());
                    continue;
                }
            };
            fs::write_file(&destination.join(target), &rendered.content)?;
        }

        Ok(())
    }
}

/// `a/b.txt.hbs` → `a/b.txt`; `None` when the file is not a template.
fn strip_template_suffix(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stripped = name.strip_suffix(TEMPLATE_SUFFIX)?;
    if stripped.is_empty() {
        return None;
    }
    Some(path.with_file_name(stripped))
}

/// Static directives with every path validated and normalized.
struct StaticPlan {
    create_dirs: Vec<PathBuf>,
    excluded: Vec<PathBuf>,
    relocations: Vec<(PathBuf, PathBuf)>,
}

impl StaticPlan {
    fn new(directives: &StaticDirectiveSet, coordinate: &ArtifactCoordinate) -> Result<Self> {
        let clean = |path: &str, directive: &str| {
            fs::clean_relative(path).ok_or_else(|| TemplateError::EscapingPath {
                origin: format!("static {directive} of {coordinate}"),
                path: path.to_string(),
            })
        };

        let create_dirs = directives
            .create_dirs
            .iter()
            .map(|d| clean(d, "create_dir"))
            .collect::<Result<Vec<_>>>()?;

        let relocations = directives
            .relocations
            .iter()
            .map(|(from, to)| -> Result<(PathBuf, PathBuf)> {
                Ok((clean(from, "relocate")?, clean(to, "relocate")?))
            })
            .collect::<Result<Vec<_>>>()?;

        // Relocation sources are not copied to their natural location.
        let mut excluded = directives
            .ignored
            .iter()
            .map(|p| clean(p, "ignore"))
            .collect::<Result<Vec<_>>>()?;
        excluded.extend(relocations.iter().map(|(from, _)| from.clone()));

        Ok(Self {
            create_dirs,
            excluded,
            relocations,
        })
    }

    /// Excluding a directory excludes everything beneath it.
    fn is_excluded(&self, rel: &Path) -> bool {
        self.excluded
            .iter()
            .any(|p| !p.as_os_str().is_empty() && rel.starts_with(p))
    }
}
