//! artifact-template CLI: project versioned artifact templates into directories.
//!
//! Two commands:
//! - `project` runs a template request, including every sub-template it
//!   declares, and installs the result.
//! - `resolve` shows which artifact a template identifier resolves to.
//!
//! Templates are looked up in the local repositories listed in
//! `artifact-template.json` and given with `--repository`.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "artifact-template",
    about = "Project versioned artifact templates, with their sub-templates, into a directory",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file (default: ./artifact-template.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Local repository root, searched before the configured ones
    #[arg(
        long = "repository",
        global = true,
        env = "ARTIFACT_TEMPLATE_REPOSITORY",
        value_delimiter = ','
    )]
    repositories: Vec<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a template request into an installation directory
    Project {
        /// Request kind, e.g. create-library (may come from --request instead)
        kind: Option<String>,

        /// Installation directory (default: current directory)
        installation_path: Option<String>,

        /// Sub-directory of the projection the template's own content goes to
        #[arg(long)]
        directory_name: Option<String>,

        /// Template identifier: groupId:artifactId#versionRange
        #[arg(long, short)]
        template: Option<String>,

        /// Replace files that already exist in the installation directory
        #[arg(long)]
        overwrite: bool,

        /// Project none of the template's content or dependencies
        #[arg(long)]
        delegating_only: bool,

        /// Request property as key=value (repeatable)
        #[arg(long = "property", short = 'p', value_name = "KEY=VALUE")]
        properties: Vec<String>,

        /// Read the request from a YAML or JSON file
        #[arg(long)]
        request: Option<PathBuf>,

        /// Never prompt; report conflicts and exit
        #[arg(long)]
        no_input: bool,
    },

    /// Resolve a template identifier against the repositories
    Resolve {
        /// Template identifier: groupId:artifactId#versionRange
        identifier: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = commands::load_config(cli.config.as_deref(), &cli.repositories)?;

    match cli.command {
        Commands::Project {
            kind,
            installation_path,
            directory_name,
            template,
            overwrite,
            delegating_only,
            properties,
            request,
            no_input,
        } => {
            let args = commands::project::ProjectArgs {
                kind,
                installation_path,
                directory_name,
                template,
                overwrite,
                delegating_only,
                properties,
                request,
                no_input,
            };
            commands::project::run(config, args).await?;
        }
        Commands::Resolve { identifier } => {
            commands::resolve::run(config, &identifier).await?;
        }
    }

    Ok(())
}
