//! In-page XPath operations.
//!
//! Every step effect that touches the DOM is a JavaScript snippet resolving
//! the step's XPath with `document.evaluate` and acting on the result. The
//! snippets never throw; they return a JSON outcome record that [`decode`]
//! maps onto the error taxonomy, so element-level failures stay data instead
//! of becoming CDP exceptions.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Outcome record produced by every DOM snippet.
#[derive(Debug, Deserialize)]
pub struct DomValue {
    ok: bool,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Decode a snippet's JSON outcome, turning failure records into errors.
pub fn decode(raw: &str) -> Result<DomValue> {
    let value: DomValue = serde_json::from_str(raw)
        .map_err(|e| Error::Js(format!("malformed DOM outcome: {e}")))?;
    if value.ok {
        return Ok(value);
    }
    let detail = value.detail.unwrap_or_else(|| "DOM operation failed".to_string());
    match value.kind.as_deref() {
        Some("not-found") => Err(Error::ElementNotFound(detail)),
        Some("not-select") | Some("no-option") => Err(Error::Selection(detail)),
        _ => Err(Error::Js(detail)),
    }
}

fn quote(text: &str) -> Result<String> {
    serde_json::to_string(text).map_err(|e| Error::Js(e.to_string()))
}

/// Shared resolution prelude: binds `node` to the first XPath match and
/// bails with a `not-found` record when there is none.
fn resolve_prelude(xp: &str) -> String {
    format!(
        "const node = document.evaluate({xp}, document, null, \
         XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;\n\
         if (!node) return JSON.stringify({{ ok: false, kind: 'not-found', \
         detail: 'no element matches ' + {xp} }});"
    )
}

/// Presence probe for the `wait` poll loop: always `ok`, reports whether a
/// match exists in `text`.
pub fn found_js(xpath: &str) -> Result<String> {
    let xp = quote(xpath)?;
    Ok(format!(
        r#"(() => {{
    const node = document.evaluate({xp}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
    return JSON.stringify({{ ok: true, text: node ? 'true' : 'false' }});
}})()"#
    ))
}

pub fn click_js(xpath: &str) -> Result<String> {
    let xp = quote(xpath)?;
    let prelude = resolve_prelude(&xp);
    Ok(format!(
        r#"(() => {{
    {prelude}
    node.scrollIntoView({{ block: 'center', inline: 'center' }});
    if (typeof node.click === 'function') {{
        node.click();
    }} else {{
        node.dispatchEvent(new MouseEvent('click', {{ bubbles: true, cancelable: true }}));
    }}
    return JSON.stringify({{ ok: true }});
}})()"#
    ))
}

pub fn fill_js(xpath: &str, value: &str) -> Result<String> {
    let xp = quote(xpath)?;
    let val = quote(value)?;
    let prelude = resolve_prelude(&xp);
    Ok(format!(
        r#"(() => {{
    {prelude}
    if (!('value' in node)) {{
        return JSON.stringify({{ ok: false, kind: 'not-fillable', detail: 'element matching ' + {xp} + ' is not fillable' }});
    }}
    node.focus();
    node.value = {val};
    node.dispatchEvent(new Event('input', {{ bubbles: true }}));
    node.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return JSON.stringify({{ ok: true }});
}})()"#
    ))
}

/// Read the element's text content. Nothing is asserted against it; the
/// point is to force the locate path.
pub fn text_js(xpath: &str) -> Result<String> {
    let xp = quote(xpath)?;
    let prelude = resolve_prelude(&xp);
    Ok(format!(
        r#"(() => {{
    {prelude}
    return JSON.stringify({{ ok: true, text: node.textContent || '' }});
}})()"#
    ))
}

/// Choose the option whose visible label equals `label` and fire the change
/// events a framework would expect.
pub fn select_js(xpath: &str, label: &str) -> Result<String> {
    let xp = quote(xpath)?;
    let lbl = quote(label)?;
    let prelude = resolve_prelude(&xp);
    Ok(format!(
        r#"(() => {{
    {prelude}
    if (!(node instanceof HTMLSelectElement)) {{
        return JSON.stringify({{ ok: false, kind: 'not-select', detail: 'element matching ' + {xp} + ' is not a select' }});
    }}
    const wanted = {lbl}.trim();
    const option = Array.from(node.options).find(o => (o.label || o.textContent || '').trim() === wanted);
    if (!option) {{
        return JSON.stringify({{ ok: false, kind: 'no-option', detail: 'no option labelled ' + {lbl} + ' in ' + {xp} }});
    }}
    node.value = option.value;
    node.dispatchEvent(new Event('input', {{ bubbles: true }}));
    node.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return JSON.stringify({{ ok: true }});
}})()"#
    ))
}

/// Scroll the element into the viewport if any edge is outside it.
pub fn scroll_js(xpath: &str) -> Result<String> {
    let xp = quote(xpath)?;
    let prelude = resolve_prelude(&xp);
    Ok(format!(
        r#"(() => {{
    {prelude}
    const rect = node.getBoundingClientRect();
    const visible = rect.top >= 0 && rect.left >= 0
        && rect.bottom <= window.innerHeight && rect.right <= window.innerWidth;
    if (!visible) {{
        node.scrollIntoView({{ block: 'center', inline: 'center' }});
    }}
    return JSON.stringify({{ ok: true }});
}})()"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_outcomes_decode_with_their_text() {
        let value = decode(r#"{"ok":true,"text":"Example Domain"}"#).unwrap();
        assert_eq!(value.text.as_deref(), Some("Example Domain"));
    }

    #[test]
    fn not_found_decodes_to_element_not_found() {
        let err = decode(r#"{"ok":false,"kind":"not-found","detail":"no element matches //a"}"#)
            .unwrap_err();
        assert!(matches!(err, Error::ElementNotFound(_)));
        assert_eq!(err.to_string(), "Element not found: no element matches //a");
    }

    #[test]
    fn select_failures_decode_to_selection_errors() {
        for kind in ["no-option", "not-select"] {
            let raw = format!(r#"{{"ok":false,"kind":"{kind}","detail":"nope"}}"#);
            assert!(matches!(decode(&raw).unwrap_err(), Error::Selection(_)));
        }
    }

    #[test]
    fn unknown_kinds_and_garbage_decode_to_js_errors() {
        assert!(matches!(
            decode(r#"{"ok":false,"kind":"not-fillable","detail":"x"}"#).unwrap_err(),
            Error::Js(_)
        ));
        assert!(matches!(decode("not json at all").unwrap_err(), Error::Js(_)));
    }

    #[test]
    fn snippets_escape_quotes_in_the_xpath() {
        let js = click_js(r#"//button[@aria-label="Save \"all\""]"#).unwrap();
        assert!(js.contains("document.evaluate"));
        assert!(js.contains(r#"\"Save"#));
    }

    #[test]
    fn fill_escapes_the_payload() {
        let js = fill_js("//input", "line1\nline2 \"quoted\"").unwrap();
        assert!(js.contains(r#"\n"#));
        assert!(js.contains(r#"\"quoted\""#));
    }

    #[test]
    fn select_matches_on_trimmed_visible_label() {
        let js = select_js("//select[@id='country']", "Canada").unwrap();
        assert!(js.contains("HTMLSelectElement"));
        assert!(js.contains("o.label || o.textContent"));
    }
}
