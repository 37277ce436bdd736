use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetTimezoneOverrideParams;
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::config::RunnerConfig;
use crate::error::{Error, Result};
use crate::page::Page;
use crate::stealth;

/// Owns one Chromium process and the single page a run drives.
///
/// The session holds the browser for exactly one run; `close` consumes it,
/// so release cannot happen twice and cannot be forgotten on a path that
/// still owns the value.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: tokio::task::JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a browser with the configured profile and open a blank page,
    /// stealth-prepared for the upcoming navigation.
    pub async fn launch(config: &RunnerConfig, headless: bool) -> Result<Self> {
        let mut builder = if headless {
            BrowserConfig::builder().new_headless_mode().no_sandbox()
        } else {
            BrowserConfig::builder().with_head().no_sandbox()
        };

        for arg in stealth::profile_key_args() {
            builder = builder.arg(arg);
        }
        for (key, value) in
            stealth::profile_kv_args(&config.profile.user_agent, &config.profile.locale)
        {
            builder = builder.arg((key, value.as_str()));
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder = builder.viewport(Viewport {
            width: config.profile.viewport_width,
            height: config.profile.viewport_height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: false,
            has_touch: false,
        });

        let cr_config = builder
            .build()
            .map_err(|e| Error::Launch(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(cr_config)
            .await
            .map_err(|e| Error::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let cr_page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::Launch(e.to_string()))?;

        stealth::apply_stealth(&cr_page).await?;

        let timezone = SetTimezoneOverrideParams::new(config.profile.timezone.clone());
        cr_page
            .execute(timezone)
            .await
            .map_err(|e| Error::Launch(format!("Failed to set timezone override: {e}")))?;

        debug!(headless, "browser session ready");

        Ok(Self {
            browser,
            page: Page::new(cr_page, config.action_timeout),
            handler_task,
        })
    }

    /// The single page owned by this session.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Tear the browser down. Teardown problems are logged, never
    /// propagated: by this point the run already has its result.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("browser close failed: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!("browser did not exit cleanly: {e}");
        }
        self.handler_task.abort();
        debug!("browser session released");
    }
}
