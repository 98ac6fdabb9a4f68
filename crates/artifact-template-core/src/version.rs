//! Artifact versions and version ranges.
//!
//! Versions are dotted numbers (`1`, `1.2`, `1.2.3`) with an optional
//! qualifier after a dash (`1.2.3-pc`). A qualified version sorts before the
//! plain release with the same numbers.
//!
//! Ranges come in three forms:
//! - `2.0` — fuzzy: every revision of major 2, minor 0 (`2.0.0`, `2.0.17`, ...)
//! - `2.0.3` — exact
//! - `[1.0,2.0)`, `(1.0,]`, `[1.5]` — maven-style intervals

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed artifact version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
    pub qualifier: Option<String>,
}

impl Version {
    pub fn new(major: u32, minor: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            revision,
            qualifier: None,
        }
    }

    /// Parse a version string. Missing minor/revision default to zero.
    ///
    /// Returns `None` for empty input, non-numeric components, or more than
    /// three numeric components.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (numbers, qualifier) = match s.split_once('-') {
            Some((numbers, qualifier)) if !qualifier.is_empty() => {
                (numbers, Some(qualifier.to_string()))
            }
            Some(_) => return None,
            None => (s, None),
        };

        let mut parts = numbers.split('.');
        let major = parse_component(parts.next()?)?;
        let minor = parts.next().map(parse_component).unwrap_or(Some(0))?;
        let revision = parts.next().map(parse_component).unwrap_or(Some(0))?;
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            major,
            minor,
            revision,
            qualifier,
        })
    }

    /// `major.minor`, the form templates use for default artifact versions.
    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.revision)
            .cmp(&(other.major, other.minor, other.revision))
            .then_with(|| match (&self.qualifier, &other.qualifier) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)?;
        if let Some(q) = &self.qualifier {
            write!(f, "-{q}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid version '{s}'"))
    }
}

/// One end of an interval range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

/// The set of versions a template identifier accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRange {
    /// No range given: any version.
    Any,
    /// `2` or `2.0`: every version sharing the given leading components.
    Fuzzy { major: u32, minor: Option<u32> },
    /// `2.0.3` or `2.0.3-pc`: exactly this version.
    Exact(Version),
    /// Maven interval notation.
    Interval {
        lower: Option<Bound>,
        upper: Option<Bound>,
    },
}

impl VersionRange {
    /// Parse the part of a template identifier after `#`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::Any);
        }

        if s.starts_with('[') || s.starts_with('(') {
            return Self::parse_interval(s);
        }

        let components = s.split('.').count();
        let version = Version::parse(s).ok_or_else(|| format!("invalid version '{s}'"))?;
        if components < 3 && version.qualifier.is_none() {
            Ok(Self::Fuzzy {
                major: version.major,
                minor: (components == 2).then_some(version.minor),
            })
        } else {
            Ok(Self::Exact(version))
        }
    }

    fn parse_interval(s: &str) -> Result<Self, String> {
        let lower_inclusive = s.starts_with('[');
        let upper_inclusive = match s.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(format!("unterminated version interval '{s}'")),
        };
        let body = &s[1..s.len() - 1];

        let Some((lo, hi)) = body.split_once(',') else {
            // `[1.5]` pins a single version
            if !(lower_inclusive && upper_inclusive) {
                return Err(format!("single-version interval must use brackets: '{s}'"));
            }
            let version = Version::parse(body).ok_or_else(|| format!("invalid version '{body}'"))?;
            return Ok(Self::Exact(version));
        };

        let bound = |text: &str, inclusive: bool| -> Result<Option<Bound>, String> {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            let version = Version::parse(text).ok_or_else(|| format!("invalid version '{text}'"))?;
            Ok(Some(Bound { version, inclusive }))
        };

        Ok(Self::Interval {
            lower: bound(lo, lower_inclusive)?,
            upper: bound(hi, upper_inclusive)?,
        })
    }

    /// Whether `version` lies inside this range.
    pub fn contains(&self, version: &Version) -> bool {
        match self {
            Self::Any => true,
            Self::Fuzzy { major, minor } => {
                version.major == *major && minor.is_none_or(|m| version.minor == m)
            }
            Self::Exact(v) => v == version,
            Self::Interval { lower, upper } => {
                let above = lower.as_ref().is_none_or(|b| match version.cmp(&b.version) {
                    Ordering::Greater => true,
                    Ordering::Equal => b.inclusive,
                    Ordering::Less => false,
                });
                let below = upper.as_ref().is_none_or(|b| match version.cmp(&b.version) {
                    Ordering::Less => true,
                    Ordering::Equal => b.inclusive,
                    Ordering::Greater => false,
                });
                above && below
            }
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => Ok(()),
            Self::Fuzzy { major, minor: None } => write!(f, "{major}"),
            Self::Fuzzy {
                major,
                minor: Some(minor),
            } => write!(f, "{major}.{minor}"),
            Self::Exact(v) => write!(f, "{v}"),
            Self::Interval { lower, upper } => {
                match lower {
                    Some(b) => write!(f, "{}{}", if b.inclusive { '[' } else { '(' }, b.version)?,
                    None => write!(f, "(")?,
                }
                write!(f, ",")?;
                match upper {
                    Some(b) => write!(f, "{}{}", b.version, if b.inclusive { ']' } else { ')' }),
                    None => write!(f, ")"),
                }
            }
        }
    }
}
