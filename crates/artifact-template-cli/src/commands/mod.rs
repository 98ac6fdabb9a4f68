//! CLI command implementations for artifact-template.
//!
//! Each module corresponds to a subcommand (`artifact-template <command>`).

pub mod project;
pub mod resolve;

use std::path::{Path, PathBuf};

use anyhow::Result;

use artifact_template_core::config::{ToolConfig, CONFIG_FILE};

/// Load the configuration and put the command-line repositories first.
///
/// An explicitly given config file must exist; the default one is optional.
pub fn load_config(path: Option<&Path>, repositories: &[PathBuf]) -> Result<ToolConfig> {
    let mut config = match path {
        Some(path) => ToolConfig::load(path)?,
        None => ToolConfig::load_or_default(Path::new(CONFIG_FILE))?,
    };

    let mut roots = repositories.to_vec();
    roots.append(&mut config.repositories);
    config.repositories = roots;

    tracing::debug!("repositories: {:?}", config.repositories);
    Ok(config)
}
