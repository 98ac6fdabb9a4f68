//! Template resolution: identifier → concrete artifact → packaged content.
//!
//! The artifact lookup itself is behind the [`ArtifactResolver`] trait;
//! [`LocalRepository`](crate::repository::LocalRepository) is the shipped
//! implementation. [`TemplateResolver`] is the thin facade the projection uses:
//! it parses the identifier, resolves it and fetches the `archive:zip` part,
//! turning each miss into the matching fatal error.

use std::io::{Read, Seek};
use std::path::Path;

use crate::artifact::{ArtifactCoordinate, PartKind, TemplateIdentifier};
use crate::error::{Result, TemplateError};
use crate::fs;

/// A seekable byte stream, as needed to read a zip archive.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Handle to the bytes of one artifact part.
pub type PartData = Box<dyn ReadSeek + Send>;

/// Every artifact source must implement this trait.
pub trait ArtifactResolver: Send + Sync {
    /// Pick the concrete artifact matching `identifier`, if any.
    fn resolve(&self, identifier: &TemplateIdentifier) -> Result<Option<ArtifactCoordinate>>;

    /// Open one packaged part of a resolved artifact, if the artifact has it.
    fn resolve_part(
        &self,
        coordinate: &ArtifactCoordinate,
        part: &PartKind,
    ) -> Result<Option<PartData>>;
}

/// A resolved template together with its zip package.
pub struct ResolvedArchive {
    pub coordinate: ArtifactCoordinate,
    pub data: PartData,
}

impl ResolvedArchive {
    /// Unzip the package into `dir`.
    pub fn unpack_into(self, dir: &Path) -> Result<()> {
        let coordinate = self.coordinate.to_string();
        fs::unzip(self.data, dir).map_err(|source| TemplateError::Archive { coordinate, source })
    }
}

pub struct TemplateResolver<'a> {
    resolver: &'a dyn ArtifactResolver,
}

impl<'a> TemplateResolver<'a> {
    pub fn new(resolver: &'a dyn ArtifactResolver) -> Self {
        Self { resolver }
    }

    /// Resolve `identifier` on behalf of a request of kind `requester`.
    pub fn resolve(&self, identifier: &str, requester: &str) -> Result<ResolvedArchive> {
        let parsed = TemplateIdentifier::parse(identifier)?;

        let coordinate = self.resolver.resolve(&parsed)?.ok_or_else(|| {
            TemplateError::UnresolvedTemplate {
                identifier: identifier.to_string(),
                requester: requester.to_string(),
            }
        })?;

        let part = PartKind::archive_zip();
        let data = self
            .resolver
            .resolve_part(&coordinate, &part)?
            .ok_or_else(|| TemplateError::PartMissing {
                coordinate: coordinate.to_string(),
                part: part.to_string(),
            })?;

        Ok(ResolvedArchive { coordinate, data })
    }
}
