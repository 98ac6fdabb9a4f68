//! Templating for artifact template projection.
//!
//! Every templating pass goes through the [Handlebars](https://handlebarsjs.com/)
//! based [`renderer::TemplateRenderer`]: request property expansion, the
//! dependency script, the static directive file and each dynamic file.
//!
//! ## Template variables
//!
//! - `{{request.*}}` — the (expanded) request: `kind`, `installation_path`,
//!   `directory_name`, `overwrite`, `template`, `properties.<name>`
//! - `{{context.*}}` — the run: `run_id`, `root_kind`, `depth`
//!
//! Helpers from [`support`] are always registered. Directive helpers from
//! [`control`] exist only while rendering a dynamic file or the static
//! directive file.
//!
//! Package layout conventions live in [`layout`].

pub mod control;
pub mod layout;
pub mod renderer;
pub mod support;
