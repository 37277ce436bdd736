//! Session orchestration: one request in, one result out, browser released
//! on every exit path.

use tracing::{info, warn};
use uuid::Uuid;

use crate::artifacts::SessionArtifacts;
use crate::browser::BrowserSession;
use crate::config::RunnerConfig;
use crate::error::{Error, Result};
use crate::executor;
use crate::model::{RunRequest, RunResult, Step, StepOutcome};
use crate::report;

/// Drives one automation run per call. All run state lives on the stack of
/// a single `run_automation` invocation, so concurrent runs share nothing
/// but this immutable configuration.
pub struct SessionRunner {
    config: RunnerConfig,
}

impl SessionRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run the full step list against `request.url`.
    ///
    /// `Err` is returned only for rejections that happen before any browser
    /// work: a missing url or step list (`InvalidRequest`) and a failed
    /// artifact-directory creation (`Storage`). Failures past that point
    /// are reported inside the `RunResult`: launch or navigation failures
    /// as `status: error`, individual step failures as failed outcomes in
    /// an otherwise successful run.
    pub async fn run_automation(&self, request: &RunRequest) -> Result<RunResult> {
        if request.url.trim().is_empty() {
            return Err(Error::InvalidRequest("missing url".into()));
        }
        let Some(steps) = request.steps.as_deref() else {
            return Err(Error::InvalidRequest("missing steps".into()));
        };

        let session_id = Uuid::new_v4().to_string();
        let artifacts = SessionArtifacts::create(
            &self.config.artifact_root,
            &self.config.public_base_url,
            &session_id,
        )
        .await?;

        info!(
            session = %session_id,
            url = %request.url,
            steps = steps.len(),
            headless = request.headless,
            "starting run"
        );

        match self.drive(request, steps, &artifacts).await {
            Ok(outcomes) => {
                let report_ref = match report::write(&artifacts, &request.url, &outcomes).await {
                    Ok(report_ref) => Some(report_ref),
                    Err(e) => {
                        warn!(session = %session_id, "report not written: {e}");
                        None
                    }
                };
                info!(session = %session_id, "run finished");
                Ok(RunResult::success(report_ref, outcomes))
            }
            Err(e) => {
                warn!(session = %session_id, "run failed: {e}");
                Ok(RunResult::error(e.to_string()))
            }
        }
    }

    /// Acquire the browser, drive the page, and release the browser no
    /// matter how the drive ends. The single release point after the
    /// fallible section is what guarantees teardown on every path.
    async fn drive(
        &self,
        request: &RunRequest,
        steps: &[Step],
        artifacts: &SessionArtifacts,
    ) -> Result<Vec<StepOutcome>> {
        let session = BrowserSession::launch(&self.config, request.headless).await?;
        let outcome = self.drive_page(&session, request, steps, artifacts).await;
        session.close().await;
        outcome
    }

    async fn drive_page(
        &self,
        session: &BrowserSession,
        request: &RunRequest,
        steps: &[Step],
        artifacts: &SessionArtifacts,
    ) -> Result<Vec<StepOutcome>> {
        let page = session.page();

        match tokio::time::timeout(self.config.navigation_timeout, page.goto(&request.url)).await
        {
            Ok(navigated) => navigated?,
            Err(_) => {
                return Err(Error::Navigation(format!(
                    "{} did not load within {:?}",
                    request.url, self.config.navigation_timeout
                )))
            }
        }

        // Not a load-event guarantee: a fixed grace period for client-side
        // rendering to settle.
        tokio::time::sleep(self.config.settle_delay).await;

        Ok(executor::run_steps(page, steps, artifacts).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(root: &std::path::Path) -> SessionRunner {
        SessionRunner::new(RunnerConfig::builder().artifact_root(root).build())
    }

    #[tokio::test]
    async fn empty_url_is_rejected_before_any_work() {
        let root = tempfile::tempdir().unwrap();
        let request = RunRequest {
            url: "  ".to_string(),
            steps: Some(vec![]),
            headless: true,
        };
        let err = runner(root.path())
            .run_automation(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        // No session directory may exist after a rejection.
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn absent_steps_are_rejected() {
        let root = tempfile::tempdir().unwrap();
        let request = RunRequest {
            url: "https://example.com".to_string(),
            steps: None,
            headless: true,
        };
        let err = runner(root.path())
            .run_automation(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn unusable_artifact_root_is_a_storage_error() {
        // A plain file as the root makes the session mkdir fail.
        let file = tempfile::NamedTempFile::new().unwrap();
        let request = RunRequest {
            url: "https://example.com".to_string(),
            steps: Some(vec![]),
            headless: true,
        };
        let err = runner(file.path())
            .run_automation(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }
}
