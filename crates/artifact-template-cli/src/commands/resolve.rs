use anyhow::Result;

use artifact_template_core::artifact::{PartKind, TemplateIdentifier};
use artifact_template_core::config::ToolConfig;
use artifact_template_core::repository::LocalRepository;
use artifact_template_core::resolver::ArtifactResolver;

use crate::output;

/// Show the artifact a template identifier resolves to, and whether it carries
/// the packaged template content.
pub async fn run(config: ToolConfig, identifier: &str) -> Result<()> {
    output::print_header(&format!("artifact-template resolve: {identifier}"));

    let parsed = TemplateIdentifier::parse(identifier)?;
    let repository = LocalRepository::new(config.repositories);
    for root in repository.roots() {
        output::print_key_value("Repository", &root.display().to_string());
    }

    let Some(coordinate) = repository.resolve(&parsed)? else {
        output::print_error(&format!("no artifact matches {parsed}"));
        anyhow::bail!("unable to resolve template {identifier}");
    };
    output::print_key_value("Resolved", &coordinate.to_string());

    let part = PartKind::archive_zip();
    if repository.resolve_part(&coordinate, &part)?.is_some() {
        output::print_success(&format!("{coordinate} provides {part}"));
    } else {
        output::print_warning(&format!("{coordinate} has no {part} part"));
    }

    Ok(())
}
