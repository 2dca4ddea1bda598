//! End-to-end job orchestration: planner → architect → coder self-loop.
//!
//! The pipeline is synchronous; one job runs to completion (or failure)
//! within a single call. There are no retries and no partial-progress
//! recovery: any error propagates to the caller, the registry keeps the
//! phase the job last reached, and partially written files stay on disk.

use std::path::Path;

use anyhow::Result;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::agents::{ArchitectAgent, CoderAgent, PlannerAgent};
use crate::client::ChatClient;
use crate::model::CoderState;
use crate::registry::{JobPhase, JobRegistry};
use crate::tools::JobWorkspace;

/// Per-job options supplied by the caller.
#[derive(Debug, Clone)]
pub struct JobOptions {
    /// Cap on total model invocations for this job
    /// (one for planning, one for architecting, one per coder step).
    pub recursion_limit: u32,
}

/// Summary of a completed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub job_id: String,
    pub steps_completed: usize,
}

/// Raised when a job would exceed its model-invocation cap.
#[derive(Debug, Clone, thiserror::Error)]
#[error("recursion limit of {limit} model invocations exceeded")]
pub struct RecursionLimitExceeded {
    pub limit: u32,
}

/// Counter over model invocations for one job.
#[derive(Debug, Clone)]
struct CallBudget {
    used: u32,
    limit: u32,
}

impl CallBudget {
    fn new(limit: u32) -> Self {
        Self { used: 0, limit }
    }

    fn charge(&mut self) -> Result<()> {
        if self.used >= self.limit {
            return Err(RecursionLimitExceeded { limit: self.limit }.into());
        }
        self.used += 1;
        Ok(())
    }
}

/// Start a fresh job: generate an id, create its workspace under
/// `jobs_root`, and run the full pipeline synchronously.
///
/// Returns the job id on success. On failure the id is not surfaced; the
/// registry entry remains at the last phase reached.
pub fn start_job<C: ChatClient + ?Sized>(
    jobs_root: &Path,
    user_prompt: &str,
    options: &JobOptions,
    client: &C,
    registry: &JobRegistry,
) -> Result<String> {
    let job_id = Uuid::new_v4().to_string();
    registry.set(&job_id, JobPhase::Starting);
    let workspace = JobWorkspace::create(jobs_root.join(&job_id))?;
    run_job(
        &job_id,
        user_prompt,
        options,
        client,
        registry,
        &workspace,
        |_| {},
    )?;
    Ok(job_id)
}

/// Run the three-role pipeline for an existing job workspace.
///
/// `on_phase` observes every phase transition in order, in addition to the
/// registry updates. The coder loops one step per model invocation until the
/// cursor reaches the step count.
#[instrument(skip_all, fields(job_id = %job_id))]
pub fn run_job<C: ChatClient + ?Sized, F: FnMut(&JobPhase)>(
    job_id: &str,
    user_prompt: &str,
    options: &JobOptions,
    client: &C,
    registry: &JobRegistry,
    workspace: &JobWorkspace,
    mut on_phase: F,
) -> Result<JobOutcome> {
    let mut budget = CallBudget::new(options.recursion_limit);
    let mut transition = |phase: JobPhase| {
        on_phase(&phase);
        registry.set(job_id, phase);
    };

    transition(JobPhase::Planning);
    budget.charge()?;
    let plan = PlannerAgent::new().run(client, user_prompt)?;
    info!(name = %plan.name, files = plan.files.len(), "plan produced");

    transition(JobPhase::Architecting);
    budget.charge()?;
    let task_plan = ArchitectAgent::new().run(client, &plan)?;
    info!(steps = task_plan.implementation_steps.len(), "task plan produced");

    let mut state = CoderState::new(task_plan);
    let total = state.total_steps();
    let coder = CoderAgent::new();
    while !state.is_complete() {
        transition(JobPhase::Coding {
            step: state.current_step_idx + 1,
            total,
        });
        budget.charge()?;
        coder.step(client, workspace, &mut state)?;
    }

    transition(JobPhase::Done);
    info!(steps = total, "job complete");
    Ok(JobOutcome {
        job_id: job_id.to_string(),
        steps_completed: total,
    })
}
