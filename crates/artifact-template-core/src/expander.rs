//! Expansion of a request's own string properties.
//!
//! Each string field is rendered once, in a fixed order: `installation_path`,
//! `directory_name`, `template`, then string-valued `properties` by name. The
//! data model is rebuilt after every field, so later fields see the expanded
//! values of earlier ones. The request is only updated once every field has
//! rendered.

use serde_json::Value;

use crate::context::RunContext;
use crate::error::{Result, TemplateError};
use crate::request::TemplateRequest;
use crate::templates::renderer::TemplateRenderer;

pub struct PropertyExpander<'a> {
    renderer: &'a TemplateRenderer,
}

enum Field {
    InstallationPath,
    DirectoryName,
    Template,
    Property(String),
}

impl Field {
    fn name(&self) -> String {
        match self {
            Self::InstallationPath => "installation_path".into(),
            Self::DirectoryName => "directory_name".into(),
            Self::Template => "template".into(),
            Self::Property(name) => format!("properties.{name}"),
        }
    }

    fn get(&self, request: &TemplateRequest) -> Option<String> {
        match self {
            Self::InstallationPath => Some(request.installation_path.clone()),
            Self::DirectoryName => request.directory_name.clone(),
            Self::Template => request.template.clone(),
            Self::Property(name) => request
                .properties
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    fn set(&self, request: &mut TemplateRequest, value: String) {
        match self {
            Self::InstallationPath => request.installation_path = value,
            Self::DirectoryName => request.directory_name = Some(value),
            Self::Template => request.template = Some(value),
            Self::Property(name) => {
                request.properties.insert(name.clone(), Value::String(value));
            }
        }
    }
}

impl<'a> PropertyExpander<'a> {
    pub fn new(renderer: &'a TemplateRenderer) -> Self {
        Self { renderer }
    }

    /// Render every non-null string field of `request` in place.
    pub fn expand(&self, request: &mut TemplateRequest, context: &RunContext) -> Result<()> {
        let mut fields = vec![Field::InstallationPath, Field::DirectoryName, Field::Template];
        fields.extend(
            request
                .properties
                .iter()
                .filter(|(_, v)| v.is_string())
                .map(|(k, _)| Field::Property(k.clone())),
        );

        let mut expanded = request.clone();
        for field in fields {
            let Some(value) = field.get(&expanded) else {
                continue;
            };

            let data = context.data_model(&expanded);
            let rendered = self.renderer.render(&value, &data).map_err(|e| {
                TemplateError::PropertyExpansion {
                    kind: request.kind.clone(),
                    field: field.name(),
                    value: value.clone(),
                    message: e.to_string(),
                }
            })?;
            field.set(&mut expanded, rendered);
        }

        *request = expanded;
        Ok(())
    }
}
