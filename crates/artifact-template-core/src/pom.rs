//! Just enough `pom.xml` reading for templates that derive their version from
//! the parent pom of the installation.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::version::Version;

/// Used whenever the parent pom is missing or has no usable version.
pub const DEFAULT_ARTIFACT_VERSION: &str = "1.0";

/// `major.minor` of the project version declared by
/// `<installation_path>/parent/pom.xml`, or [`DEFAULT_ARTIFACT_VERSION`].
pub fn default_artifact_version(installation_path: &Path) -> String {
    let pom = installation_path.join("parent").join("pom.xml");
    let version = std::fs::read_to_string(&pom)
        .ok()
        .and_then(|xml| project_version(&xml))
        .and_then(|v| Version::parse(&v));

    match version {
        Some(version) => version.major_minor(),
        None => {
            tracing::debug!("no usable version in {}, using {DEFAULT_ARTIFACT_VERSION}", pom.display());
            DEFAULT_ARTIFACT_VERSION.to_string()
        }
    }
}

/// The project version of a pom, falling back to the version of its own
/// `<parent>`. `${name}` references to `<properties>` are substituted.
pub fn project_version(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<String> = Vec::new();
    let mut version = None;
    let mut parent_version = None;
    let mut properties = HashMap::new();

    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(t) => {
                let text = t.unescape().ok()?.trim().to_string();
                let names: Vec<&str> = path.iter().map(String::as_str).collect();
                match names.as_slice() {
                    ["project", "version"] => version = Some(text),
                    ["project", "parent", "version"] => parent_version = Some(text),
                    ["project", "properties", name] => {
                        properties.insert(name.to_string(), text);
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    version
        .or(parent_version)
        .map(|v| substitute(&v, &properties))
}

fn substitute(value: &str, properties: &HashMap<String, String>) -> String {
    let mut out = String::new();
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        let name = &rest[start + 2..start + 2 + len];
        out.push_str(&rest[..start]);
        match properties.get(name) {
            Some(v) => out.push_str(v),
            None => out.push_str(&rest[start..start + 3 + len]),
        }
        rest = &rest[start + 3 + len..];
    }
    out.push_str(rest);
    out
}
