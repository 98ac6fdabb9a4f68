//! Run-scoped data shared by every template of one projection run.

use serde::Serialize;
use serde_json::{json, Value};

use crate::request::TemplateRequest;

/// Ambient information about the current run, exposed to templates as `context`.
#[derive(Debug, Clone, Serialize)]
pub struct RunContext {
    /// Unique per top-level run.
    pub run_id: String,
    /// Kind of the top-level request.
    pub root_kind: String,
    /// Recursion depth of the template being processed (0 = top level).
    pub depth: usize,
}

impl RunContext {
    pub fn new(root_kind: impl Into<String>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            root_kind: root_kind.into(),
            depth: 0,
        }
    }

    /// The same run, one level deeper.
    pub fn descend(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    /// The data model every templating pass renders against.
    pub fn data_model(&self, request: &TemplateRequest) -> Value {
        json!({
            "request": request.to_value(),
            "context": self,
        })
    }
}
