//! Tool configuration: where templates are resolved from, which request
//! kinds exist, and the settings templates can read through the `config`
//! helper.
//!
//! Stored as `artifact-template.json`:
//!
//! ```json
//! {
//!   "repositories": ["/home/me/.m2/repository"],
//!   "kinds": {
//!     "create-library": { "template": "com.example:library-template#1.0" },
//!     "create-all": { "template": "com.example:aggregate#1.0", "delegating_only": true }
//!   },
//!   "settings": {
//!     "maven": { "group_id": "com.example", "java": 21 }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TemplateError};
use crate::request::RequestKinds;

/// Default file name looked up in the working directory.
pub const CONFIG_FILE: &str = "artifact-template.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Local repository roots, searched in order.
    #[serde(default)]
    pub repositories: Vec<PathBuf>,

    /// Request kinds and their default templates.
    #[serde(default)]
    pub kinds: RequestKinds,

    /// Named sections, rendered by `{{config "name"}}`.
    #[serde(default)]
    pub settings: BTreeMap<String, Value>,
}

impl ToolConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| TemplateError::ConfigNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| TemplateError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load `path` if it exists, otherwise fall back to an empty configuration.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}
