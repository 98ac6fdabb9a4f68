//! Template identifiers and concrete artifact coordinates.
//!
//! A template identifier is what a request asks for:
//! `com.example.templates:library-template#2.0`. Resolution turns it into an
//! [`ArtifactCoordinate`] naming one concrete version.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::version::{Version, VersionRange};

/// `groupId:artifactId#versionRange`, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateIdentifier {
    pub group_id: String,
    pub artifact_id: String,
    pub range: VersionRange,
}

impl TemplateIdentifier {
    pub fn parse(identifier: &str) -> Result<Self, TemplateError> {
        let invalid = |reason: &str| TemplateError::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason: reason.to_string(),
        };

        let (name, range) = match identifier.trim().split_once('#') {
            Some((name, range)) => (name, range),
            None => (identifier.trim(), ""),
        };

        let (group_id, artifact_id) = name
            .split_once(':')
            .ok_or_else(|| invalid("expected groupId:artifactId"))?;
        if group_id.is_empty() || artifact_id.is_empty() || artifact_id.contains(':') {
            return Err(invalid("expected groupId:artifactId"));
        }

        let range = VersionRange::parse(range).map_err(|reason| invalid(&reason))?;

        Ok(Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            range,
        })
    }
}

impl FromStr for TemplateIdentifier {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TemplateIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if self.range != VersionRange::Any {
            write!(f, "#{}", self.range)?;
        }
        Ok(())
    }
}

/// One concrete, resolved artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(with = "version_string")]
    pub version: Version,
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}#{}", self.group_id, self.artifact_id, self.version)
    }
}

/// A named packaged part of an artifact: `classifier:extension`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartKind {
    pub classifier: Option<String>,
    pub extension: String,
}

impl PartKind {
    /// The zip package holding a template's content tree.
    pub fn archive_zip() -> Self {
        Self {
            classifier: Some("archive".into()),
            extension: "zip".into(),
        }
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.classifier {
            Some(c) => write!(f, "{c}:{}", self.extension),
            None => write!(f, "{}", self.extension),
        }
    }
}

mod version_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::version::Version;

    pub fn serialize<S: Serializer>(version: &Version, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(version)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Version, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifier_with_range() {
        let id = TemplateIdentifier::parse("com.example:lib-template#2.0").unwrap();
        assert_eq!(id.group_id, "com.example");
        assert_eq!(id.artifact_id, "lib-template");
        assert_eq!(
            id.range,
            VersionRange::Fuzzy {
                major: 2,
                minor: Some(0)
            }
        );
        assert_eq!(id.to_string(), "com.example:lib-template#2.0");
    }

    #[test]
    fn test_parse_identifier_without_range() {
        let id = TemplateIdentifier::parse("com.example:lib-template").unwrap();
        assert_eq!(id.range, VersionRange::Any);
        assert_eq!(id.to_string(), "com.example:lib-template");
    }

    #[test]
    fn test_parse_identifier_invalid() {
        for bad in ["", "no-colon#1.0", ":artifact#1.0", "group:#1.0", "a:b:c#1.0", "a:b#x"] {
            assert!(
                matches!(
                    TemplateIdentifier::parse(bad),
                    Err(TemplateError::InvalidIdentifier { .. })
                ),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_coordinate_display() {
        let coordinate = ArtifactCoordinate {
            group_id: "g".into(),
            artifact_id: "a".into(),
            version: Version::new(1, 2, 3),
        };
        assert_eq!(coordinate.to_string(), "g:a#1.2.3");
    }

    #[test]
    fn test_archive_zip_part() {
        assert_eq!(PartKind::archive_zip().to_string(), "archive:zip");
    }
}
