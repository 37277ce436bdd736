//! Maps one step onto exactly one page-level effect, awaited to completion.
//!
//! The action set is a closed match: adding an action is a deliberate code
//! change here, not a registration somewhere else.

use std::time::Duration;

use tracing::debug;

use crate::dom;
use crate::error::{Error, Result};
use crate::model::{ActionKind, Step};
use crate::page::Page;

/// Poll interval for `wait` and `assert-url`.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub async fn dispatch(page: &Page, step: &Step) -> Result<()> {
    debug!(action = %step.action, locator = %step.locator, "dispatching step");
    match &step.action {
        ActionKind::Click => {
            locate_and_run(page, dom::click_js(&step.locator)?).await?;
            Ok(())
        }
        ActionKind::Fill => {
            let value = step.value.as_deref().unwrap_or("");
            locate_and_run(page, dom::fill_js(&step.locator, value)?).await?;
            Ok(())
        }
        ActionKind::Wait => {
            let timeout = wait_timeout(step.value.as_deref(), page.default_timeout());
            wait_for_locator(page, &step.locator, timeout).await
        }
        ActionKind::Validate => {
            locate_and_run(page, dom::text_js(&step.locator)?).await?;
            Ok(())
        }
        ActionKind::AssertUrl => {
            let pattern = step.value.as_deref().unwrap_or("");
            wait_for_url(page, pattern, page.default_timeout()).await
        }
        ActionKind::Select => {
            let label = step.value.as_deref().unwrap_or("");
            locate_and_run(page, dom::select_js(&step.locator, label)?).await?;
            Ok(())
        }
        ActionKind::Scroll => {
            locate_and_run(page, dom::scroll_js(&step.locator)?).await?;
            Ok(())
        }
        ActionKind::Unknown(name) => Err(Error::UnknownAction(name.clone())),
    }
}

/// Run a DOM snippet with the session's implicit wait: a target that is not
/// in the DOM yet gets re-probed until the action timeout elapses. Every
/// other failure is final immediately.
async fn locate_and_run(page: &Page, js: String) -> Result<dom::DomValue> {
    let timeout = page.default_timeout();
    let start = std::time::Instant::now();
    loop {
        match page.run_dom(js.clone()).await {
            Err(Error::ElementNotFound(_)) if start.elapsed() < timeout => {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            other => return other,
        }
    }
}

/// Timeout for `wait`: the step's `value` in milliseconds, falling back to
/// the configured default when absent or non-numeric.
fn wait_timeout(value: Option<&str>, default: Duration) -> Duration {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

/// Poll until an element matching the XPath exists.
async fn wait_for_locator(page: &Page, locator: &str, timeout: Duration) -> Result<()> {
    let probe = dom::found_js(locator)?;
    let start = std::time::Instant::now();
    loop {
        let found = page.run_dom(probe.clone()).await?;
        if found.text.as_deref() == Some("true") {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(Error::Timeout(format!("element matching {locator}")));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Poll until the page's current URL matches the pattern.
async fn wait_for_url(page: &Page, pattern: &str, timeout: Duration) -> Result<()> {
    let start = std::time::Instant::now();
    loop {
        let url = page.current_url().await?;
        if url_matches(&url, pattern) {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(Error::Timeout(format!(
                "URL matching {pattern} (last was {url})"
            )));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Pattern semantics: an empty pattern matches anything, a pattern with `*`
/// wildcards over the whole URL, anything else matches by containment.
pub fn url_matches(url: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return true;
    }
    if pattern.contains('*') {
        return wildcard_match(url, pattern);
    }
    url.contains(pattern)
}

/// Greedy two-pointer match; `*` spans any run of characters.
fn wildcard_match(text: &str, pattern: &str) -> bool {
    let text = text.as_bytes();
    let pattern = pattern.as_bytes();
    let (mut t, mut p) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && pattern[p] != b'*' && pattern[p] == text[t] {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == b'*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == b'*' {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: Duration = Duration::from_millis(5000);

    #[test]
    fn wait_timeout_honours_numeric_values() {
        assert_eq!(wait_timeout(Some("100"), DEFAULT), Duration::from_millis(100));
        assert_eq!(
            wait_timeout(Some(" 2500 "), DEFAULT),
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn wait_timeout_falls_back_on_absent_or_unparseable_values() {
        assert_eq!(wait_timeout(None, DEFAULT), DEFAULT);
        assert_eq!(wait_timeout(Some(""), DEFAULT), DEFAULT);
        assert_eq!(wait_timeout(Some("soon"), DEFAULT), DEFAULT);
        assert_eq!(wait_timeout(Some("-200"), DEFAULT), DEFAULT);
        assert_eq!(wait_timeout(Some("1.5"), DEFAULT), DEFAULT);
    }

    #[test]
    fn empty_pattern_matches_any_url() {
        assert!(url_matches("https://example.com/a/b", ""));
    }

    #[test]
    fn plain_patterns_match_by_containment() {
        assert!(url_matches("https://example.com/dashboard?tab=1", "/dashboard"));
        assert!(!url_matches("https://example.com/login", "/dashboard"));
    }

    #[test]
    fn star_patterns_match_the_whole_url() {
        assert!(url_matches(
            "https://app.example.com/orders/42/confirm",
            "https://*/orders/*/confirm"
        ));
        assert!(url_matches("https://example.com/x", "*example.com*"));
        assert!(!url_matches(
            "https://example.com/orders/42",
            "https://*/orders/*/confirm"
        ));
    }

    #[test]
    fn star_pattern_must_cover_the_full_url() {
        // Unlike containment, a wildcard pattern anchors at both ends.
        assert!(!url_matches("https://example.com/a", "example.com*"));
        assert!(url_matches("https://example.com/a", "*example.com/a"));
    }
}
