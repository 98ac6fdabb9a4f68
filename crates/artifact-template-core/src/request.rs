//! Template requests: what the caller (or a parent template) asks to project.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TemplateError};

/// A request to project one template.
///
/// String fields and string-valued `properties` may contain template syntax;
/// they are expanded once before the template is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRequest {
    /// Request type name, e.g. `create-library`.
    pub kind: String,

    /// Root of the final installation.
    #[serde(default = "default_installation_path")]
    pub installation_path: String,

    /// Sub-path under which this template's output is nested in the projection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_name: Option<String>,

    /// Replace existing files in the installation instead of reporting a conflict.
    #[serde(default)]
    pub overwrite: bool,

    /// Explicit template identifier; falls back to the kind's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Contribute no files and project none of the discovered dependencies.
    #[serde(default)]
    pub delegating_only: bool,

    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

fn default_installation_path() -> String {
    ".".into()
}

impl TemplateRequest {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            installation_path: default_installation_path(),
            directory_name: None,
            overwrite: false,
            template: None,
            delegating_only: false,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_installation_path(mut self, path: impl Into<String>) -> Self {
        self.installation_path = path.into();
        self
    }

    pub fn with_directory_name(mut self, name: impl Into<String>) -> Self {
        self.directory_name = Some(name.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// The identifier of the template to project: explicit, else the kind's default.
    pub fn template_identifier(&self, kinds: &RequestKinds) -> Result<String> {
        self.template
            .clone()
            .or_else(|| kinds.get(&self.kind).and_then(|k| k.template.clone()))
            .ok_or_else(|| TemplateError::UnknownTemplate {
                kind: self.kind.clone(),
            })
    }

    /// Delegating-only either by request flag or by kind.
    pub fn is_delegating_only(&self, kinds: &RequestKinds) -> bool {
        self.delegating_only || kinds.get(&self.kind).is_some_and(|k| k.delegating_only)
    }

    /// The request as a JSON value, the shape templates see as `request`.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Defaults registered for one request kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestKind {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub delegating_only: bool,
}

/// All known request kinds, by name.
pub type RequestKinds = BTreeMap<String, RequestKind>;
