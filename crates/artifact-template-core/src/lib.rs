//! Core library for artifact template projection.
//!
//! An artifact template is a versioned, zip-packaged directory tree of static
//! assets and Handlebars templates. [`processor::TemplateProcessor`] takes a
//! [`request::TemplateRequest`], resolves its template through an
//! [`resolver::ArtifactResolver`], recursively projects the templates it
//! declares as dependencies into one scratch tree, and finally installs that
//! tree into the requested directory unless doing so would replace existing
//! files.
//!
//! ```ignore
//! use artifact_template_core::processor::TemplateProcessor;
//! use artifact_template_core::repository::LocalRepository;
//! use artifact_template_core::request::TemplateRequest;
//!
//! let repository = LocalRepository::new(vec!["/home/me/.m2/repository".into()]);
//! let processor = TemplateProcessor::new(repository, config.kinds);
//! let outcome = processor.run(
//!     TemplateRequest::new("create-library")
//!         .with_template("com.example:library-template#1.0")
//!         .with_property("name", "orders"),
//! )?;
//! ```

pub mod artifact;
pub mod config;
pub mod context;
pub mod dependencies;
pub mod error;
pub mod expander;
pub mod fs;
pub mod installer;
pub mod pom;
pub mod processor;
pub mod projector;
pub mod repository;
pub mod request;
pub mod resolver;
pub mod templates;
pub mod version;

#[cfg(test)]
mod testing;
