//! Workflow document helpers.
//!
//! A workflow document maps node ids to node descriptions; each node keeps
//! its parameters in an `inputs` object. Only that sub-object is ever
//! modified, and only for parameter names the job binds.

use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::job::MediaKind;

/// In-memory copy of a workflow, owned by a single job.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDocument {
    nodes: Map<String, Value>,
}

impl WorkflowDocument {
    /// Wrap a parsed JSON value. The top level must be an object.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        match value {
            Value::Object(nodes) => Ok(Self { nodes }),
            other => Err(CoreError::Internal(format!(
                "Workflow document must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Overwrite every matching input parameter across all nodes.
    ///
    /// `bindings` pairs a parameter name with the value to store. Nodes
    /// without an `inputs` object, or without any bound parameter, are left
    /// untouched. Returns the number of parameters written; zero is valid.
    pub fn patch_inputs(&mut self, bindings: &[(&str, String)]) -> usize {
        let mut patched = 0;
        for node in self.nodes.values_mut() {
            let Some(inputs) = node.get_mut("inputs").and_then(Value::as_object_mut) else {
                continue;
            };
            for (param, value) in bindings {
                if let Some(slot) = inputs.get_mut(*param) {
                    *slot = Value::String(value.clone());
                    patched += 1;
                }
            }
        }
        patched
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.nodes)
    }
}

/// A file the engine reports having written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducedFile {
    pub kind: MediaKind,
    pub filename: String,
}

/// Walk the `outputs` section of a completed history entry.
///
/// Nodes are visited in the order the engine reported them and categories
/// in [`MediaKind::ALL`] order. Items without a string `filename` are skipped.
pub fn produced_files(history_entry: &Value) -> Vec<ProducedFile> {
    let Some(outputs) = history_entry.get("outputs").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut files = Vec::new();
    for node_outputs in outputs.values() {
        for kind in MediaKind::ALL {
            let Some(items) = node_outputs.get(kind.output_key()).and_then(Value::as_array) else {
                continue;
            };
            for item in items {
                if let Some(filename) = item
                    .get("filename")
                    .and_then(Value::as_str)
                    .filter(|f| !f.is_empty())
                {
                    files.push(ProducedFile {
                        kind,
                        filename: filename.to_string(),
                    });
                }
            }
        }
    }
    files
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
