//! Local, maven-style artifact repositories.
//!
//! ## Directory layout
//!
//! ```text
//! <root>/
//! └── com/example/templates/          # groupId, dots as slashes
//!     └── library-template/           # artifactId
//!         ├── 1.0.3/
//!         │   └── library-template-1.0.3-archive.zip
//!         └── 1.1.0/
//!             └── library-template-1.1.0-archive.zip
//! ```
//!
//! Resolution picks the highest version inside the requested range across all
//! roots; on equal versions the earlier root wins.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::artifact::{ArtifactCoordinate, PartKind, TemplateIdentifier};
use crate::error::Result;
use crate::resolver::{ArtifactResolver, PartData};
use crate::version::Version;

#[derive(Debug, Clone, Default)]
pub struct LocalRepository {
    roots: Vec<PathBuf>,
}

impl LocalRepository {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn artifact_dir(root: &Path, group_id: &str, artifact_id: &str) -> PathBuf {
        let mut dir = root.to_path_buf();
        dir.extend(group_id.split('.'));
        dir.push(artifact_id);
        dir
    }

    /// Version directories of one artifact under one root, with their parsed version.
    fn versions(dir: &Path) -> Result<Vec<(Version, String)>> {
        let mut versions = Vec::new();
        if !dir.is_dir() {
            return Ok(versions);
        }
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match Version::parse(&name) {
                Some(version) => versions.push((version, name)),
                None => tracing::debug!("skipping non-version directory {}", entry.path().display()),
            }
        }
        Ok(versions)
    }
}

impl ArtifactResolver for LocalRepository {
    fn resolve(&self, identifier: &TemplateIdentifier) -> Result<Option<ArtifactCoordinate>> {
        let mut best: Option<Version> = None;
        for root in &self.roots {
            let dir = Self::artifact_dir(root, &identifier.group_id, &identifier.artifact_id);
            for (version, _) in Self::versions(&dir)? {
                if identifier.range.contains(&version)
                    && best.as_ref().is_none_or(|b| version > *b)
                {
                    best = Some(version);
                }
            }
        }

        Ok(best.map(|version| ArtifactCoordinate {
            group_id: identifier.group_id.clone(),
            artifact_id: identifier.artifact_id.clone(),
            version,
        }))
    }

    fn resolve_part(
        &self,
        coordinate: &ArtifactCoordinate,
        part: &PartKind,
    ) -> Result<Option<PartData>> {
        for root in &self.roots {
            let dir = Self::artifact_dir(root, &coordinate.group_id, &coordinate.artifact_id);
            let Some((_, raw)) = Self::versions(&dir)?
                .into_iter()
                .find(|(v, _)| *v == coordinate.version)
            else {
                continue;
            };

            let file_name = match &part.classifier {
                Some(classifier) => format!(
                    "{}-{raw}-{classifier}.{}",
                    coordinate.artifact_id, part.extension
                ),
                None => format!("{}-{raw}.{}", coordinate.artifact_id, part.extension),
            };
            let path = dir.join(&raw).join(file_name);
            if path.is_file() {
                tracing::debug!("resolved part {part} of {coordinate} at {}", path.display());
                let data: PartData = Box::new(File::open(path)?);
                return Ok(Some(data));
            }
        }
        Ok(None)
    }
}
