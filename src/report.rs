//! Per-run HTML report, written next to the screenshots.

use tracing::debug;

use crate::artifacts::SessionArtifacts;
use crate::error::{Error, Result};
use crate::model::{StepOutcome, StepStatus};

pub const REPORT_FILE: &str = "result.html";

/// Render the report page for one run.
pub fn render(url: &str, outcomes: &[StepOutcome]) -> String {
    let mut sections = String::new();
    for outcome in outcomes {
        let (color, status) = match outcome.status {
            StepStatus::Succeeded => ("green", "succeeded"),
            StepStatus::Failed => ("red", "failed"),
        };
        let error = outcome
            .error_message
            .as_deref()
            .map(|message| format!("  <p style=\"color: red;\">Error: {}</p>\n", escape(message)))
            .unwrap_or_default();
        sections.push_str(&format!(
            "<div>\n  <p><strong>Step {}:</strong> {} - {} - \
             <span style=\"color: {color};\">{status}</span></p>\n{error}  \
             <img src=\"{}\" width=\"300\" />\n</div>\n",
            outcome.index,
            escape(outcome.action.as_str()),
            escape(&outcome.locator),
            escape(&outcome.artifact_ref),
        ));
    }
    format!(
        "<html>\n<body>\n<h1>Automation Report</h1>\n<p>URL: {}</p>\n{sections}</body>\n</html>\n",
        escape(url)
    )
}

/// Write the report into the session directory and return its public URI.
pub async fn write(
    artifacts: &SessionArtifacts,
    url: &str,
    outcomes: &[StepOutcome],
) -> Result<String> {
    let html = render(url, outcomes);
    let path = artifacts.path_of(REPORT_FILE);
    tokio::fs::write(&path, html)
        .await
        .map_err(|e| Error::Storage(format!("cannot write {}: {e}", path.display())))?;
    debug!(path = %path.display(), "report written");
    Ok(artifacts.url_of(REPORT_FILE))
}

/// Minimal escaping for text interpolated into the report markup.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
