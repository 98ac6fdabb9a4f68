use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use dialoguer::Confirm;
use serde_json::Value;

use artifact_template_core::config::ToolConfig;
use artifact_template_core::installer::ProjectionOutcome;
use artifact_template_core::processor::TemplateProcessor;
use artifact_template_core::repository::LocalRepository;
use artifact_template_core::request::TemplateRequest;

use crate::output;

/// Command-line inputs of `artifact-template project`.
pub struct ProjectArgs {
    pub kind: Option<String>,
    pub installation_path: Option<String>,
    pub directory_name: Option<String>,
    pub template: Option<String>,
    pub overwrite: bool,
    pub delegating_only: bool,
    pub properties: Vec<String>,
    pub request: Option<PathBuf>,
    pub no_input: bool,
}

/// Project a template request.
///
/// The request comes from `--request` (if given) with the command-line
/// arguments applied on top. When the projection would replace existing files
/// the user is asked whether to overwrite them, unless `--no-input` is set or
/// stdin is not a terminal; declining is reported as a failure.
pub async fn run(config: ToolConfig, args: ProjectArgs) -> Result<()> {
    let no_input = args.no_input;
    let request = build_request(args)?;
    output::print_header(&format!("artifact-template project: {}", request.kind));

    if config.repositories.is_empty() {
        output::print_warning("no repositories configured, use --repository or artifact-template.json");
    }

    output::print_key_value("Kind", &request.kind);
    if let Some(template) = &request.template {
        output::print_key_value("Template", template);
    }
    output::print_key_value("Installation path", &request.installation_path);

    let processor = Arc::new(
        TemplateProcessor::new(LocalRepository::new(config.repositories), config.kinds)
            .with_settings(&config.settings),
    );

    output::print_step(1, 2, "Projecting templates");
    let mut outcome = project(&processor, request.clone()).await?;

    if let ProjectionOutcome::AlreadyExists(conflict) = &outcome {
        output::print_warning(&format!(
            "{} path(s) already exist in {}:",
            conflict.paths.len(),
            conflict.installation_path.display()
        ));
        for path in &conflict.paths {
            println!("    {}", path.display());
        }

        let interactive = !no_input && console::Term::stdout().is_term();
        if !interactive
            || !Confirm::new()
                .with_prompt("Overwrite the existing files?")
                .default(false)
                .interact()?
        {
            output::print_error("nothing was installed");
            anyhow::bail!("installation already exists; re-run with --overwrite to replace it");
        }

        let mut again = request;
        again.overwrite = true;
        outcome = project(&processor, again).await?;
    }

    output::print_step(2, 2, "Installing");
    match outcome {
        ProjectionOutcome::Installed(report) => {
            for file in &report.files {
                println!("    {}", file.display());
            }
            output::print_success(&format!(
                "Installed {} file(s) into {}",
                report.files.len(),
                report.installation_path.display()
            ));
        }
        ProjectionOutcome::AlreadyExists(conflict) => {
            anyhow::bail!(
                "{} path(s) still conflict in {}",
                conflict.paths.len(),
                conflict.installation_path.display()
            );
        }
    }

    Ok(())
}

async fn project(
    processor: &Arc<TemplateProcessor>,
    request: TemplateRequest,
) -> Result<ProjectionOutcome> {
    let processor = Arc::clone(processor);
    let outcome = tokio::task::spawn_blocking(move || processor.run(request))
        .await
        .context("projection task panicked")?
        .context("failed to project the requested artifact template")?;
    Ok(outcome)
}

fn build_request(args: ProjectArgs) -> Result<TemplateRequest> {
    let mut request = match (&args.request, &args.kind) {
        (Some(path), _) => load_request(path)?,
        (None, Some(kind)) => TemplateRequest::new(kind.clone()),
        (None, None) => anyhow::bail!("a request kind or --request file is required"),
    };

    if let (Some(_), Some(kind)) = (&args.request, &args.kind) {
        request.kind = kind.clone();
    }
    if let Some(path) = args.installation_path {
        request.installation_path = path;
    }
    if args.directory_name.is_some() {
        request.directory_name = args.directory_name;
    }
    if args.template.is_some() {
        request.template = args.template;
    }
    request.overwrite |= args.overwrite;
    request.delegating_only |= args.delegating_only;

    for property in &args.properties {
        let (name, value) = parse_property(property)?;
        request.properties.insert(name, value);
    }

    Ok(request)
}

/// Read a request from a `.json` file, or YAML for any other extension.
fn load_request(path: &Path) -> Result<TemplateRequest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request file {}", path.display()))?;
    let request = if path.extension().is_some_and(|e| e == "json") {
        serde_json::from_str(&contents)
            .with_context(|| format!("invalid request in {}", path.display()))?
    } else {
        serde_yaml::from_str(&contents)
            .with_context(|| format!("invalid request in {}", path.display()))?
    };
    Ok(request)
}

/// `key=value`, the value read as a YAML scalar so `true` and `3` keep their type.
fn parse_property(raw: &str) -> Result<(String, Value)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("property '{raw}' must be of the form key=value"))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("property '{raw}' has an empty name");
    }

    let value = match serde_yaml::from_str::<Value>(value) {
        Ok(parsed @ (Value::Bool(_) | Value::Number(_))) => parsed,
        _ => Value::String(value.to_string()),
    };
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args() -> ProjectArgs {
        ProjectArgs {
            kind: None,
            installation_path: None,
            directory_name: None,
            template: None,
            overwrite: false,
            delegating_only: false,
            properties: Vec::new(),
            request: None,
            no_input: true,
        }
    }

    #[test]
    fn test_parse_property_types() {
        assert_eq!(parse_property("name=orders").unwrap(), ("name".into(), json!("orders")));
        assert_eq!(parse_property("tests=true").unwrap(), ("tests".into(), json!(true)));
        assert_eq!(parse_property("count=3").unwrap(), ("count".into(), json!(3)));
        assert_eq!(parse_property("empty=").unwrap(), ("empty".into(), json!("")));
        assert_eq!(
            parse_property("pkg={{request.properties.name}}").unwrap(),
            ("pkg".into(), json!("{{request.properties.name}}"))
        );
        assert!(parse_property("novalue").is_err());
        assert!(parse_property("=x").is_err());
    }

    #[test]
    fn test_request_from_arguments() {
        let request = build_request(ProjectArgs {
            kind: Some("create-library".into()),
            installation_path: Some("out".into()),
            template: Some("g:lib#1.0".into()),
            properties: vec!["name=orders".into()],
            ..args()
        })
        .unwrap();

        assert_eq!(request.kind, "create-library");
        assert_eq!(request.installation_path, "out");
        assert_eq!(request.template.as_deref(), Some("g:lib#1.0"));
        assert_eq!(request.properties["name"], json!("orders"));
    }

    #[test]
    fn test_request_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.yaml");
        std::fs::write(
            &path,
            "kind: create-api\ntemplate: g:api#2.0\nproperties:\n  name: orders\n  tests: true\n",
        )
        .unwrap();

        let request = build_request(ProjectArgs {
            request: Some(path),
            overwrite: true,
            properties: vec!["name=billing".into()],
            ..args()
        })
        .unwrap();

        assert_eq!(request.kind, "create-api");
        assert_eq!(request.template.as_deref(), Some("g:api#2.0"));
        assert!(request.overwrite);
        assert_eq!(request.properties["name"], json!("billing"));
        assert_eq!(request.properties["tests"], json!(true));
    }

    #[test]
    fn test_kind_required() {
        assert!(build_request(args()).is_err());
    }
}
