//! Architect agent: [`Plan`] → [`TaskPlan`].

use anyhow::Result;

use crate::client::ChatClient;
use crate::model::{Plan, TASK_PLAN_SCHEMA, TaskPlan};
use crate::prompt::PromptBuilder;

use super::parse_validated;

/// Architect wrapper that owns its prompt settings. No filesystem access.
pub struct ArchitectAgent {
    prompts: PromptBuilder,
}

impl ArchitectAgent {
    pub fn new() -> Self {
        Self {
            prompts: PromptBuilder::new(),
        }
    }

    /// Decompose a plan into ordered per-file implementation steps.
    ///
    /// The model returns only the step list; the plan is re-attached here so
    /// downstream consumers see one self-contained record.
    pub fn run<C: ChatClient + ?Sized>(&self, client: &C, plan: &Plan) -> Result<TaskPlan> {
        let prompt = self.prompts.architect(plan)?;
        let reply = client.complete(None, &prompt)?;
        let mut task_plan: TaskPlan = parse_validated(&reply, TASK_PLAN_SCHEMA, "TaskPlan")?;
        task_plan.plan = Some(plan.clone());
        Ok(task_plan)
    }
}

impl Default for ArchitectAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        ScriptedChatClient, ScriptedReply, sample_plan, sample_task_plan_reply,
    };

    #[test]
    fn architect_attaches_plan_to_parsed_steps() {
        let client = ScriptedChatClient::new(vec![ScriptedReply::Text(sample_task_plan_reply())]);
        let plan = sample_plan();
        let task_plan = ArchitectAgent::new().run(&client, &plan).expect("task plan");

        assert_eq!(task_plan.implementation_steps.len(), 2);
        assert_eq!(task_plan.plan, Some(plan));
        assert!(client.prompts()[0].contains("\"todo-app\""));
    }

    #[test]
    fn architect_rejects_reply_without_steps() {
        let client =
            ScriptedChatClient::new(vec![ScriptedReply::Text("{\"steps\": []}".to_string())]);
        let err = ArchitectAgent::new()
            .run(&client, &sample_plan())
            .expect_err("should fail");
        assert!(err.to_string().contains("schema validation failed"));
    }
}
