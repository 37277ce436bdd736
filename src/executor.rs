//! Walks the step list, isolating each step's failure and capturing a
//! screenshot for every outcome.

use tracing::{debug, warn};

use crate::artifacts::SessionArtifacts;
use crate::dispatch;
use crate::model::{Step, StepOutcome, StepStatus};
use crate::page::Page;

/// Execute every step in order, producing one outcome per step.
///
/// A failing step never stops the walk: its error is recorded in that
/// step's outcome and execution moves on. Only the surrounding session can
/// fail the run as a whole.
pub async fn run_steps(
    page: &Page,
    steps: &[Step],
    artifacts: &SessionArtifacts,
) -> Vec<StepOutcome> {
    let mut outcomes = Vec::with_capacity(steps.len());

    for (i, step) in steps.iter().enumerate() {
        let index = i + 1;
        let mut result = dispatch::dispatch(page, step).await;

        // Artifact name is decided by the action's outcome; a capture
        // failure afterwards does not rename it.
        let file = SessionArtifacts::step_file(index, result.is_err());
        if let Err(capture) = page.screenshot_to_file(artifacts.path_of(&file)).await {
            if result.is_ok() {
                // The action went through but its artifact did not: record
                // the step as failed with the capture error. The run
                // continues either way.
                result = Err(capture);
            } else {
                warn!(index, "error screenshot not captured: {capture}");
            }
        }

        let (status, error_message) = match &result {
            Ok(()) => (StepStatus::Succeeded, None),
            Err(e) => (StepStatus::Failed, Some(message_or_unknown(e.to_string()))),
        };
        debug!(index, ok = result.is_ok(), "step recorded");

        outcomes.push(StepOutcome {
            index,
            action: step.action.clone(),
            locator: step.locator.clone(),
            value: step.value.clone(),
            status,
            error_message,
            artifact_ref: artifacts.url_of(&file),
        });
    }

    outcomes
}

/// Failures with no text still need a message in the outcome record.
fn message_or_unknown(message: String) -> String {
    if message.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        message
    }
}
