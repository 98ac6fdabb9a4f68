//! Reserved on-disk conventions inside an unpacked template package.
//!
//! ```text
//! <template>/
//! ├── dependencies.yaml.hbs        # optional, lists sub-template requests
//! └── content/
//!     ├── static/**                # copied verbatim
//!     └── dynamic/
//!         ├── static.hbs           # optional, directives for the static phase
//!         ├── projected/**.hbs     # rendered, written relative to projected/
//!         └── **                   # other files: rendered if *.hbs, else copied
//! ```
//!
//! Do NOT rename these without updating existing template packages; the names
//! are part of the package format.

/// Suffix marking a file under `content/dynamic/` as a template to render.
pub const TEMPLATE_SUFFIX: &str = ".hbs";

/// Dependency declaration script at the template root.
pub const DEPENDENCIES_SCRIPT: &str = "dependencies.yaml.hbs";

/// Verbatim assets.
pub const STATIC_DIR: &str = "content/static";

/// Templated assets.
pub const DYNAMIC_DIR: &str = "content/dynamic";

/// Default destination root for rendered files, relative to [`DYNAMIC_DIR`].
pub const PROJECTED_DIR: &str = "projected";

/// Static-phase directive template, relative to [`DYNAMIC_DIR`].
pub const STATIC_TEMPLATE: &str = "static.hbs";
