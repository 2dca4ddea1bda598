//! Data model shared by the three agent roles.
//!
//! Model replies are validated in two phases: JSON Schema conformance
//! (Draft 2020-12) first, then `serde` deserialization into these types.
//! The types themselves stay deterministic and free of I/O.

use anyhow::{Context, Result, bail};
use jsonschema::Draft;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PLAN_SCHEMA: &str = include_str!("../schemas/plan.schema.json");
pub const TASK_PLAN_SCHEMA: &str = include_str!("../schemas/task_plan.schema.json");
pub const CODER_OUTPUT_SCHEMA: &str = include_str!("../schemas/coder_output.schema.json");

/// One file the planner wants in the generated project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSpec {
    pub path: String,
    pub purpose: String,
}

/// High-level project breakdown produced by the planner.
///
/// Produced once per job; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub features: Vec<String>,
    pub techstack: Vec<String>,
    pub files: Vec<FileSpec>,
}

/// One per-file unit of work produced by the architect. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationStep {
    pub filepath: String,
    pub task_description: String,
}

/// The plan plus its ordered implementation steps.
///
/// Produced once by the architect; read-only during coding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlan {
    #[serde(default)]
    pub plan: Option<Plan>,
    pub implementation_steps: Vec<ImplementationStep>,
}

/// Full file content produced by one coder invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoderOutput {
    pub content: String,
}

/// Progress cursor over task-plan steps during coding.
///
/// `current_step_idx` only ever moves forward; completion is defined solely
/// by it reaching the step count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoderState {
    pub task_plan: TaskPlan,
    pub current_step_idx: usize,
}

impl CoderState {
    pub fn new(task_plan: TaskPlan) -> Self {
        Self {
            task_plan,
            current_step_idx: 0,
        }
    }

    pub fn total_steps(&self) -> usize {
        self.task_plan.implementation_steps.len()
    }

    /// The step the next coder invocation should work on, if any remain.
    pub fn current_step(&self) -> Option<&ImplementationStep> {
        self.task_plan.implementation_steps.get(self.current_step_idx)
    }

    pub fn is_complete(&self) -> bool {
        self.current_step_idx >= self.total_steps()
    }

    /// Record a successfully completed step.
    pub fn advance(&mut self) {
        self.current_step_idx += 1;
    }
}

/// Validate JSON instance against a JSON Schema (Draft 2020-12).
pub fn validate_schema(instance: &Value, schema_raw: &str) -> Result<()> {
    let schema: Value = serde_json::from_str(schema_raw).context("parse json schema")?;
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .context("compile json schema")?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!("schema validation failed:\n- {}", messages.join("\n- "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_parses_without_description() {
        let raw = json!({
            "name": "todo-app",
            "features": ["add tasks"],
            "techstack": ["html", "js"],
            "files": [{"path": "index.html", "purpose": "entry point"}]
        });
        validate_schema(&raw, PLAN_SCHEMA).expect("schema");
        let plan: Plan = serde_json::from_value(raw).expect("parse");
        assert_eq!(plan.name, "todo-app");
        assert_eq!(plan.description, None);
        assert_eq!(plan.files.len(), 1);
    }

    #[test]
    fn plan_schema_rejects_missing_files() {
        let raw = json!({
            "name": "todo-app",
            "features": [],
            "techstack": []
        });
        let err = validate_schema(&raw, PLAN_SCHEMA).expect_err("should fail");
        assert!(err.to_string().contains("schema validation failed"));
    }

    #[test]
    fn task_plan_schema_rejects_empty_steps() {
        let raw = json!({ "implementation_steps": [] });
        assert!(validate_schema(&raw, TASK_PLAN_SCHEMA).is_err());
    }

    /// The coder loop terminates exactly when the index equals the step count.
    #[test]
    fn coder_state_completes_at_step_count() {
        let task_plan = TaskPlan {
            plan: None,
            implementation_steps: vec![
                ImplementationStep {
                    filepath: "a.js".to_string(),
                    task_description: "write a".to_string(),
                },
                ImplementationStep {
                    filepath: "b.js".to_string(),
                    task_description: "write b".to_string(),
                },
            ],
        };
        let mut state = CoderState::new(task_plan);

        assert!(!state.is_complete());
        assert_eq!(state.current_step().expect("step").filepath, "a.js");
        state.advance();
        assert!(!state.is_complete());
        assert_eq!(state.current_step().expect("step").filepath, "b.js");
        state.advance();
        assert!(state.is_complete());
        assert_eq!(state.current_step(), None);
        assert_eq!(state.current_step_idx, state.total_steps());
    }
}
