//! Coder agent: one implementation step per invocation, ending in a file
//! write inside the job workspace.

use anyhow::Result;
use tracing::debug;

use crate::client::ChatClient;
use crate::model::{CODER_OUTPUT_SCHEMA, CoderOutput, CoderState};
use crate::prompt::PromptBuilder;
use crate::tools::JobWorkspace;

use super::parse_validated;

const CODER_SYSTEM: &str =
    "You are a code generator. Reply with the requested JSON only; file content must be complete and self-contained.";

/// Result of one successful coder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoderStepOutcome {
    /// Zero-based index of the step that was performed.
    pub step_idx: usize,
    /// Workspace-relative path that was written.
    pub filepath: String,
}

/// Coder wrapper that owns its prompt settings.
///
/// The harness owns the write target: the model returns full file content
/// and the file is always written at the current step's filepath.
pub struct CoderAgent {
    prompts: PromptBuilder,
}

impl CoderAgent {
    pub fn new() -> Self {
        Self {
            prompts: PromptBuilder::new(),
        }
    }

    /// Perform the current step, advancing the cursor on success.
    ///
    /// Returns `None` without calling the model when all steps are consumed.
    pub fn step<C: ChatClient + ?Sized>(
        &self,
        client: &C,
        workspace: &JobWorkspace,
        state: &mut CoderState,
    ) -> Result<Option<CoderStepOutcome>> {
        let Some(step) = state.current_step().cloned() else {
            return Ok(None);
        };

        let existing = workspace.read_file(&step.filepath)?;
        let entries = workspace.list_entries(".")?;
        let prompt = self.prompts.coder(&step, &existing, &entries)?;

        let reply = client.complete(Some(CODER_SYSTEM), &prompt)?;
        let output: CoderOutput = parse_validated(&reply, CODER_OUTPUT_SCHEMA, "CoderOutput")?;
        workspace.write_file(&step.filepath, &output.content)?;

        let step_idx = state.current_step_idx;
        state.advance();
        debug!(step_idx, filepath = %step.filepath, "coder step completed");

        Ok(Some(CoderStepOutcome {
            step_idx,
            filepath: step.filepath,
        }))
    }
}

impl Default for CoderAgent {
    fn default() -> Self {
        Self::new()
    }
}
