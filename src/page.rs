use std::path::Path;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page as CrPage, ScreenshotParams};

use crate::dom::{self, DomValue};
use crate::error::{Error, Result};

/// Wrapper around a chromiumoxide page, narrowed to what step execution
/// needs.
pub struct Page {
    inner: CrPage,
    default_timeout: Duration,
}

impl Page {
    pub(crate) fn new(inner: CrPage, default_timeout: Duration) -> Self {
        Self {
            inner,
            default_timeout,
        }
    }

    /// Default per-action wait, from the runner configuration.
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Navigate to the given URL and wait for the load to be acknowledged.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.inner
            .goto(url)
            .await
            .map_err(|e| Error::Navigation(e.to_string()))?;
        Ok(())
    }

    /// The page's current URL.
    pub async fn current_url(&self) -> Result<String> {
        self.inner
            .url()
            .await
            .map_err(|e| Error::Navigation(e.to_string()))?
            .ok_or_else(|| Error::Navigation("no URL reported".into()))
    }

    /// Run one of the XPath DOM snippets and decode its outcome record.
    pub async fn run_dom(&self, js: String) -> Result<DomValue> {
        let result = self
            .inner
            .evaluate(js)
            .await
            .map_err(|e| Error::Js(e.to_string()))?;
        let raw: String = result.into_value().map_err(|e| Error::Js(e.to_string()))?;
        dom::decode(&raw)
    }

    /// Capture a full-page PNG screenshot straight to a file.
    pub async fn screenshot_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.inner
            .save_screenshot(params, path)
            .await
            .map_err(|e| Error::Screenshot(e.to_string()))?;
        Ok(())
    }
}
