//! Test-only helpers: scripted chat clients and canned model replies.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::client::{ChatClient, ChatError};
use crate::model::{FileSpec, ImplementationStep, Plan, TaskPlan};

/// One scripted reply for a [`ScriptedChatClient`].
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Return this text as the assistant reply.
    Text(String),
    /// Fail the call with a rate-limit error.
    RateLimited,
}

/// Chat client that returns predetermined replies in order and records the
/// prompts it was given.
pub struct ScriptedChatClient {
    replies: Mutex<VecDeque<ScriptedReply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedChatClient {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }

    /// Number of calls made against this client.
    pub fn calls(&self) -> usize {
        self.prompts.lock().expect("prompts lock").len()
    }
}

impl ChatClient for ScriptedChatClient {
    fn complete(&self, _system: Option<&str>, user: &str) -> Result<String, ChatError> {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(user.to_string());
        let reply = self
            .replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .ok_or_else(|| ChatError::InvalidResponse("script exhausted".to_string()))?;
        match reply {
            ScriptedReply::Text(text) => Ok(text),
            ScriptedReply::RateLimited => Err(ChatError::RateLimited { retry_after: None }),
        }
    }
}

/// Deterministic plan used across tests.
pub fn sample_plan() -> Plan {
    Plan {
        name: "todo-app".to_string(),
        description: Some("a small todo app".to_string()),
        features: vec!["add tasks".to_string(), "complete tasks".to_string()],
        techstack: vec!["html".to_string(), "javascript".to_string()],
        files: vec![
            FileSpec {
                path: "index.html".to_string(),
                purpose: "markup".to_string(),
            },
            FileSpec {
                path: "script.js".to_string(),
                purpose: "behavior".to_string(),
            },
        ],
    }
}

/// Task plan matching [`sample_plan`], without the embedded plan.
pub fn sample_task_plan() -> TaskPlan {
    TaskPlan {
        plan: None,
        implementation_steps: vec![
            ImplementationStep {
                filepath: "index.html".to_string(),
                task_description: "write the markup".to_string(),
            },
            ImplementationStep {
                filepath: "script.js".to_string(),
                task_description: "write the behavior".to_string(),
            },
        ],
    }
}

/// JSON reply a well-behaved planner model would produce.
pub fn sample_plan_reply() -> String {
    serde_json::to_string(&sample_plan()).expect("serialize plan")
}

/// JSON reply a well-behaved architect model would produce.
pub fn sample_task_plan_reply() -> String {
    serde_json::to_string(&sample_task_plan()).expect("serialize task plan")
}

/// JSON reply a well-behaved coder model would produce.
pub fn coder_reply(content: &str) -> String {
    serde_json::json!({ "content": content }).to_string()
}
