//! Planner agent: user prompt → [`Plan`].

use anyhow::Result;

use crate::client::ChatClient;
use crate::model::{PLAN_SCHEMA, Plan};
use crate::prompt::PromptBuilder;

use super::parse_validated;

/// Planner wrapper that owns its prompt settings. No filesystem access.
pub struct PlannerAgent {
    prompts: PromptBuilder,
}

impl PlannerAgent {
    pub fn new() -> Self {
        Self {
            prompts: PromptBuilder::new(),
        }
    }

    /// Produce the high-level plan for a user request.
    pub fn run<C: ChatClient + ?Sized>(&self, client: &C, user_prompt: &str) -> Result<Plan> {
        let prompt = self.prompts.planner(user_prompt)?;
        let reply = client.complete(None, &prompt)?;
        parse_validated(&reply, PLAN_SCHEMA, "Plan")
    }
}

impl Default for PlannerAgent {
    fn default() -> Self {
        Self::new()
    }
}
