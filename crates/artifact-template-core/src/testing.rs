//! Test fixtures: in-memory template archives and an in-memory repository.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use crate::artifact::{ArtifactCoordinate, PartKind, TemplateIdentifier};
use crate::error::Result;
use crate::resolver::{ArtifactResolver, PartData};
use crate::version::{Version, VersionRange};

/// Builder for the zip package of one template.
#[derive(Default)]
pub struct TemplateArchive {
    files: Vec<(String, String)>,
}

impl TemplateArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: &str, contents: &str) -> Self {
        self.files.push((path.to_string(), contents.to_string()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (path, contents) in &self.files {
            writer
                .start_file(path.as_str(), zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}

/// Artifact resolver over archives held in memory, keyed by `g:a#x.y.z`.
#[derive(Default)]
pub struct MemoryRepository {
    artifacts: BTreeMap<(String, String), BTreeMap<Version, Option<Vec<u8>>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(self, coordinate: &str, archive: TemplateArchive) -> Self {
        let bytes = archive.build();
        self.with_raw(coordinate, bytes)
    }

    pub fn with_raw(mut self, coordinate: &str, bytes: Vec<u8>) -> Self {
        self.insert(coordinate, Some(bytes));
        self
    }

    /// An artifact that resolves but carries no `archive:zip` part.
    pub fn without_archive(mut self, coordinate: &str) -> Self {
        self.insert(coordinate, None);
        self
    }

    fn insert(&mut self, coordinate: &str, bytes: Option<Vec<u8>>) {
        let identifier = TemplateIdentifier::parse(coordinate).unwrap();
        let VersionRange::Exact(version) = identifier.range else {
            panic!("fixture coordinate needs an exact version: {coordinate}");
        };
        self.artifacts
            .entry((identifier.group_id, identifier.artifact_id))
            .or_default()
            .insert(version, bytes);
    }
}

impl ArtifactResolver for MemoryRepository {
    fn resolve(&self, identifier: &TemplateIdentifier) -> Result<Option<ArtifactCoordinate>> {
        let key = (identifier.group_id.clone(), identifier.artifact_id.clone());
        let version = self.artifacts.get(&key).and_then(|versions| {
            versions
                .keys()
                .rev()
                .find(|v| identifier.range.contains(v))
                .cloned()
        });
        Ok(version.map(|version| ArtifactCoordinate {
            group_id: key.0,
            artifact_id: key.1,
            version,
        }))
    }

    fn resolve_part(
        &self,
        coordinate: &ArtifactCoordinate,
        part: &PartKind,
    ) -> Result<Option<PartData>> {
        if *part != PartKind::archive_zip() {
            return Ok(None);
        }
        let key = (coordinate.group_id.clone(), coordinate.artifact_id.clone());
        let bytes = self
            .artifacts
            .get(&key)
            .and_then(|versions| versions.get(&coordinate.version))
            .cloned()
            .flatten();
        Ok(bytes.map(|b| -> PartData { Box::new(Cursor::new(b)) }))
    }
}
