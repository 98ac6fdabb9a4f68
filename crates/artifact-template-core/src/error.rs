//! Unified error types for artifact template projection.
//!
//! Every variant here is fatal: it aborts the whole run and the scratch tree is
//! discarded. An installation conflict is not an error; it is reported through
//! [`ProjectionOutcome::AlreadyExists`](crate::installer::ProjectionOutcome).

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur while projecting an artifact template.
#[derive(Error, Debug)]
pub enum TemplateError {
    // --- Configuration ---

    /// The configuration file (`artifact-template.json`) was not found.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file exists but contains invalid JSON.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // --- Resolution ---

    /// A template identifier is not of the form `groupId:artifactId#versionRange`.
    #[error("invalid template identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    /// The request names no template and its kind has no default one.
    #[error("no template configured for request kind '{kind}' (set 'template' or register the kind)")]
    UnknownTemplate { kind: String },

    /// No available artifact matches the template identifier.
    #[error("unable to resolve template {identifier} of {requester}")]
    UnresolvedTemplate { identifier: String, requester: String },

    /// The artifact resolved but does not carry the packaged template content.
    #[error("part '{part}' not found for artifact: {coordinate}")]
    PartMissing { coordinate: String, part: String },

    /// The template archive could not be read.
    #[error("failed to unpack template {coordinate}")]
    Archive {
        coordinate: String,
        #[source]
        source: zip::result::ZipError,
    },

    // --- Evaluation ---

    /// A string property of a request failed to render.
    #[error("failed while processing {kind}.{field}'s value '{value}': {message}")]
    PropertyExpansion {
        kind: String,
        field: String,
        value: String,
        message: String,
    },

    /// The dependency declaration script of a template failed to evaluate.
    #[error("failed to evaluate the {script} script of template {coordinate}: {message}")]
    DependencyScript {
        script: String,
        coordinate: String,
        message: String,
    },

    /// A dynamic file or the static directive file of a template failed to render.
    #[error("failed to render {path} of template {coordinate}: {message}")]
    TemplateRender {
        path: PathBuf,
        coordinate: String,
        message: String,
    },

    /// A static directive refers to a path that cannot be applied.
    #[error("invalid static directive in template {coordinate}: {message}")]
    StaticDirective { coordinate: String, message: String },

    /// A template-supplied path is absolute or climbs out of the projection root.
    #[error("path '{path}' from {origin} must be relative and stay inside the projection")]
    EscapingPath { origin: String, path: String },

    /// A template (transitively) depends on itself with identical properties.
    #[error("template dependency cycle: {}", .chain.join(" -> "))]
    DependencyCycle { chain: Vec<String> },

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A catch-all for errors from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Alias for `Result<T, TemplateError>`.
pub type Result<T> = std::result::Result<T, TemplateError>;
