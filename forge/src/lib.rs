//! Prompt-to-project generation pipeline.
//!
//! This crate drives a chat model through three sequential roles to turn a
//! natural-language prompt into a project on disk:
//!
//! - **Planner**: prompt → [`model::Plan`] (features, tech stack, file specs).
//! - **Architect**: plan → [`model::TaskPlan`] (ordered per-file tasks).
//! - **Coder**: one [`model::ImplementationStep`] per model invocation, each
//!   ending in a single file write inside the job workspace.
//!
//! The pipeline is synchronous and blocking; the HTTP facade (`forge-api`)
//! offloads it to a blocking task. Progress is published to a shared
//! [`registry::JobRegistry`] keyed by generated job ids.

pub mod agents;
pub mod archive;
pub mod client;
pub mod config;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod prompt;
pub mod registry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tools;
