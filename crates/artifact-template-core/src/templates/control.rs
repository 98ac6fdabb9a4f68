//! Projection directives issued by templates while they render.
//!
//! A dynamic file may call `{{ignore}}` or `{{relocate "path"}}`; the static
//! directive file may call `{{create_dir "dir"}}`, `{{ignore "path"}}` and
//! `{{relocate "from" "to"}}`. The helpers below record those calls into a
//! per-render slot that the renderer hands back as a plain value.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderErrorReason,
};

/// What to do with one rendered dynamic file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FileDirective {
    /// Write at the default destination.
    #[default]
    Default,
    /// Write at this path, relative to the template's destination root.
    Relocate(String),
    /// Write nothing.
    Suppress,
}

/// Directives for the static subtree of one template, applied as a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticDirectiveSet {
    /// Empty directories to materialize.
    pub create_dirs: Vec<String>,
    /// Static paths (files or whole directories) not to copy.
    pub ignored: Vec<String>,
    /// Static source path -> destination path.
    pub relocations: BTreeMap<String, String>,
}

impl StaticDirectiveSet {
    pub fn is_empty(&self) -> bool {
        self.create_dirs.is_empty() && self.ignored.is_empty() && self.relocations.is_empty()
    }
}

fn string_param(h: &Helper<'_>, helper: &'static str, index: usize) -> Result<String, RenderErrorReason> {
    let param = h
        .param(index)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex(helper, index))?;
    param
        .value()
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| RenderErrorReason::Other(format!("{helper}: parameter {index} must be a string")))
}

/// `{{ignore}}` in a dynamic file.
pub(crate) struct IgnoreFile(pub Arc<Mutex<FileDirective>>);

impl HelperDef for IgnoreFile {
    fn call<'reg: 'rc, 'rc>(
        &self,
        _: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        _: &mut dyn Output,
    ) -> HelperResult {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = FileDirective::Suppress;
        Ok(())
    }
}

/// `{{relocate "path"}}` in a dynamic file. Has no effect once ignored.
pub(crate) struct RelocateFile(pub Arc<Mutex<FileDirective>>);

impl HelperDef for RelocateFile {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        _: &mut dyn Output,
    ) -> HelperResult {
        let target = string_param(h, "relocate", 0)?;
        let mut directive = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if *directive != FileDirective::Suppress {
            *directive = FileDirective::Relocate(target);
        }
        Ok(())
    }
}

/// `{{create_dir "path"}}` in the static directive file.
pub(crate) struct CreateDir(pub Arc<Mutex<StaticDirectiveSet>>);

impl HelperDef for CreateDir {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        _: &mut dyn Output,
    ) -> HelperResult {
        let dir = string_param(h, "create_dir", 0)?;
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .create_dirs
            .push(dir);
        Ok(())
    }
}

/// `{{ignore "path"}}` in the static directive file.
pub(crate) struct IgnorePath(pub Arc<Mutex<StaticDirectiveSet>>);

impl HelperDef for IgnorePath {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        _: &mut dyn Output,
    ) -> HelperResult {
        let path = string_param(h, "ignore", 0)?;
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ignored
            .push(path);
        Ok(())
    }
}

/// `{{relocate "from" "to"}}` in the static directive file.
pub(crate) struct RelocatePath(pub Arc<Mutex<StaticDirectiveSet>>);

impl HelperDef for RelocatePath {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        _: &mut dyn Output,
    ) -> HelperResult {
        let source = string_param(h, "relocate", 0)?;
        let target = string_param(h, "relocate", 1)?;
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .relocations
            .insert(source, target);
        Ok(())
    }
}
