use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::page::Page as CrPage;

use crate::error::{Error, Result};

/// Key-only Chrome switches for the automation profile.
/// chromiumoxide adds the `--` prefix automatically, so keys must NOT
/// include `--`.
pub fn profile_key_args() -> Vec<&'static str> {
    vec!["disable-dev-shm-usage"]
}

/// Key-value Chrome switches. The user agent and accept-language are set at
/// launch so they also cover subframes and workers.
pub fn profile_kv_args(user_agent: &str, locale: &str) -> Vec<(&'static str, String)> {
    vec![
        ("disable-blink-features", "AutomationControlled".to_string()),
        ("user-agent", user_agent.to_string()),
        ("lang", locale.to_string()),
    ]
}

/// Inject the evasion script so it runs before any site JS.
pub async fn apply_stealth(page: &CrPage) -> Result<()> {
    let params = AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_JS);
    page.execute(params)
        .await
        .map_err(|e| Error::Js(format!("Failed to inject stealth script: {e}")))?;
    Ok(())
}

/// Anti-fingerprinting overrides applied to every new document.
static STEALTH_JS: &str = r#"
// navigator.webdriver is the first thing detection scripts probe.
Object.defineProperty(Navigator.prototype, 'webdriver', {
    get: () => false,
    configurable: true,
});

// Headless Chrome ships without window.chrome.
if (!window.chrome) {
    window.chrome = { runtime: {} };
}

Object.defineProperty(navigator, 'languages', {
    get: () => ['en-US', 'en'],
    configurable: true,
});

// A non-empty plugin list is enough for the common checks.
Object.defineProperty(navigator, 'plugins', {
    get: () => [1, 2, 3],
    configurable: true,
});

// Starve canvas fingerprinting of pixel data.
const getContext = HTMLCanvasElement.prototype.getContext;
HTMLCanvasElement.prototype.getContext = function (...args) {
    const context = getContext.apply(this, args);
    if (args[0] === '2d' && context) {
        context.getImageData = function () {
            throw new Error('Blocked for anti-fingerprint');
        };
    }
    return context;
};
"#;
