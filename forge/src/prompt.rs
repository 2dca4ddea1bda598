//! Prompt builders for the three agent roles.
//!
//! Instruction text lives in embedded markdown templates, rendered with
//! minijinja. Builders are pure: same inputs, same prompt.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

use crate::model::{ImplementationStep, Plan};

const PLANNER_TEMPLATE: &str = include_str!("prompts/planner.md");
const ARCHITECT_TEMPLATE: &str = include_str!("prompts/architect.md");
const CODER_TEMPLATE: &str = include_str!("prompts/coder.md");

/// Template engine wrapper around minijinja.
pub struct PromptBuilder {
    env: Environment<'static>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("planner", PLANNER_TEMPLATE)
            .expect("planner template should be valid");
        env.add_template("architect", ARCHITECT_TEMPLATE)
            .expect("architect template should be valid");
        env.add_template("coder", CODER_TEMPLATE)
            .expect("coder template should be valid");
        Self { env }
    }

    /// Render the planner prompt for a user request.
    pub fn planner(&self, user_prompt: &str) -> Result<String> {
        let template = self.env.get_template("planner")?;
        let rendered = template
            .render(context! { user_prompt => user_prompt.trim() })
            .context("render planner prompt")?;
        Ok(rendered)
    }

    /// Render the architect prompt for a produced plan.
    pub fn architect(&self, plan: &Plan) -> Result<String> {
        let plan_json = serde_json::to_string_pretty(plan).context("serialize plan")?;
        let template = self.env.get_template("architect")?;
        let rendered = template
            .render(context! { plan_json => plan_json })
            .context("render architect prompt")?;
        Ok(rendered)
    }

    /// Render the coder prompt for a single implementation step.
    ///
    /// `existing` is the target file's current content (empty when absent);
    /// `entries` is the workspace root listing.
    pub fn coder(
        &self,
        step: &ImplementationStep,
        existing: &str,
        entries: &[String],
    ) -> Result<String> {
        let template = self.env.get_template("coder")?;
        let rendered = template
            .render(context! {
                task_description => step.task_description.trim(),
                filepath => step.filepath,
                existing => (!existing.trim().is_empty()).then(|| existing),
                entries => entries,
            })
            .context("render coder prompt")?;
        Ok(rendered)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
