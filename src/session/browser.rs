//! [`Session`] over an `eoka` page.
//!
//! Locators are resolved in the page by [`RESOLVE_JS`], which enters the
//! locator's iframes, walks its query chain and reports the match count and
//! the state of the first match. Top-level elements are tagged with a
//! temporary attribute and then driven through eoka's own click and fill;
//! elements inside an iframe are driven from the frame's document.

use super::{ElementState, Session};
use crate::locator::Locator;
use crate::{Error, Result};
use eoka::Page;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

const REF_ATTR: &str = "data-e2e-ref";

/// Chrome flags that let [`RESOLVE_JS`] read the documents of iframes served
/// from another origin, such as the payment provider's card fields.
pub const FRAME_ACCESS_ARGS: [&str; 3] = [
    "--disable-web-security",
    "--disable-site-isolation-trials",
    "--disable-features=IsolateOrigins,site-per-process",
];

/// Resolve a serialized [`Locator`] and optionally act on the match.
///
/// Called as `(RESOLVE_JS)(spec, op, arg)` where `op` is one of `probe`,
/// `mark`, `click`, `fill` or `scroll`.
const RESOLVE_JS: &str = r##"
((spec, op, arg) => {
    const ROLE_SELECTORS = {
        button: 'button,input[type="button"],input[type="submit"],input[type="reset"],[role="button"]',
        textbox: 'input:not([type]),input[type="text"],input[type="email"],input[type="tel"],input[type="search"],input[type="url"],input[type="password"],textarea,[role="textbox"]',
        link: 'a[href],[role="link"]',
        checkbox: 'input[type="checkbox"],[role="checkbox"]',
        radio: 'input[type="radio"],[role="radio"]',
        combobox: 'select,[role="combobox"]',
        heading: 'h1,h2,h3,h4,h5,h6,[role="heading"]',
    };
    const norm = s => (s || '').replace(/\s+/g, ' ').trim();

    function accessibleName(el) {
        const label = el.getAttribute('aria-label');
        if (label) return norm(label);
        const labelledBy = el.getAttribute('aria-labelledby');
        if (labelledBy) {
            const doc = el.ownerDocument;
            const text = labelledBy.split(/\s+/).map(id => doc.getElementById(id)?.textContent || '').join(' ');
            if (norm(text)) return norm(text);
        }
        if (el.labels && el.labels.length) return norm([...el.labels].map(l => l.textContent).join(' '));
        return norm(el.innerText || el.textContent || el.value || el.title || el.getAttribute('alt') || '');
    }

    function nameMatches(el, name) {
        if (!name) return true;
        const actual = accessibleName(el);
        switch (name.kind) {
            case 'exact': return actual === name.value;
            case 'pattern': return new RegExp(name.value).test(actual);
            default: return actual.toLowerCase().includes(name.value.toLowerCase());
        }
    }

    function query(scope, q) {
        switch (q.kind) {
            case 'test_id':
                return [...scope.querySelectorAll('[data-testid="' + CSS.escape(q.value) + '"]')];
            case 'css':
                return [...scope.querySelectorAll(q.value)];
            case 'xpath': {
                const doc = scope.ownerDocument || scope;
                const snap = doc.evaluate(q.value, scope, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                const out = [];
                for (let i = 0; i < snap.snapshotLength; i++) out.push(snap.snapshotItem(i));
                return out;
            }
            case 'role': {
                const sel = ROLE_SELECTORS[q.role] || '[role="' + q.role + '"]';
                return [...scope.querySelectorAll(sel)].filter(el => nameMatches(el, q.name));
            }
        }
        return [];
    }

    let root = document;
    for (const selector of spec.frames) {
        let frame;
        try { frame = root.querySelector(selector); } catch (e) { return { status: 'invalid_selector', error: String(e) }; }
        if (!frame) return { status: 'frame_not_found', frame: selector };
        let doc = null;
        try { doc = frame.contentDocument; } catch (e) {}
        if (!doc) return { status: 'frame_inaccessible', frame: selector };
        root = doc;
    }

    let matches = [root];
    try {
        for (const q of spec.chain) {
            if (q.kind === 'nth') {
                const i = q.index < 0 ? matches.length + q.index : q.index;
                matches = matches[i] ? [matches[i]] : [];
                continue;
            }
            const next = [];
            for (const scope of matches) {
                for (const el of query(scope, q)) if (!next.includes(el)) next.push(el);
            }
            matches = next;
        }
    } catch (e) {
        return { status: 'invalid_selector', error: String(e) };
    }

    const el = matches[0];
    if (!el) return { status: 'ok', count: 0, found: false };

    const view = el.ownerDocument.defaultView || window;
    const rect = el.getBoundingClientRect();
    const style = view.getComputedStyle(el);
    const visible = rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden' && style.display !== 'none';
    const disabled = !!el.disabled || el.getAttribute('aria-disabled') === 'true' || !!el.closest('fieldset[disabled]');
    const editable = !disabled && !el.readOnly
        && (el.matches('input:not([type="radio"]):not([type="checkbox"]):not([type="button"]):not([type="submit"]),textarea,select') || el.isContentEditable);
    const box = (el.type === 'checkbox' || el.type === 'radio') ? el : el.querySelector('input[type="checkbox"],input[type="radio"]');
    const checked = box ? !!box.checked : el.getAttribute('aria-checked') === 'true';
    const inViewport = visible && rect.bottom > 0 && rect.right > 0 && rect.top < view.innerHeight && rect.left < view.innerWidth;

    switch (op) {
        case 'mark':
            el.setAttribute('data-e2e-ref', String(arg));
            break;
        case 'click':
            el.click();
            break;
        case 'scroll':
            el.scrollIntoView({ block: 'center', inline: 'center' });
            break;
        case 'fill': {
            el.focus();
            const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value')?.set;
            if (setter) setter.call(el, arg); else el.value = arg;
            el.dispatchEvent(new Event('input', { bubbles: true }));
            el.dispatchEvent(new Event('change', { bubbles: true }));
            break;
        }
    }

    return {
        status: 'ok',
        count: matches.length,
        found: true,
        text: el.textContent,
        value: 'value' in el ? String(el.value ?? '') : null,
        state: { attached: true, visible, enabled: !disabled, editable, checked, inViewport },
    };
})
"##;

#[derive(Debug, Clone, Copy)]
enum Op<'a> {
    Probe,
    Mark(u64),
    Click,
    Fill(&'a str),
    Scroll,
}

impl Op<'_> {
    fn js_args(&self) -> (&'static str, serde_json::Value) {
        match self {
            Op::Probe => ("probe", serde_json::Value::Null),
            Op::Mark(id) => ("mark", serde_json::Value::from(*id)),
            Op::Click => ("click", serde_json::Value::Null),
            Op::Fill(value) => ("fill", serde_json::Value::from(*value)),
            Op::Scroll => ("scroll", serde_json::Value::Null),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum ProbeStatus {
    Ok,
    FrameNotFound,
    FrameInaccessible,
    InvalidSelector,
}

/// Result from one in-page resolution.
#[derive(Debug, Deserialize)]
struct Probe {
    status: ProbeStatus,
    #[serde(default)]
    frame: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    count: usize,
    #[serde(default)]
    found: bool,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    state: ElementState,
}

/// A live Chrome tab driven through `eoka`.
pub struct EokaSession {
    page: Page,
    timeout: Duration,
    next_ref: AtomicU64,
}

impl EokaSession {
    /// Wrap `page`; actions wait at most `timeout` for their element.
    pub fn new(page: Page, timeout: Duration) -> Self {
        Self {
            page,
            timeout,
            next_ref: AtomicU64::new(1),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    async fn probe(&self, locator: &Locator, op: Op<'_>) -> Result<Probe> {
        let (op_name, arg) = op.js_args();
        let js = format!(
            "({})({},{},{})",
            RESOLVE_JS,
            serde_json::to_string(locator)?,
            serde_json::to_string(op_name)?,
            arg
        );
        let probe: Probe = self.page.evaluate(&js).await?;
        if probe.status == ProbeStatus::InvalidSelector {
            return Err(Error::NotActionable(format!(
                "{}: {}",
                locator,
                probe.error.unwrap_or_default()
            )));
        }
        Ok(probe)
    }

    /// Poll until `locator` has a match (visible and enabled when
    /// `actionable`), or fail with the condition seen last.
    async fn wait_for(&self, locator: &Locator, actionable: bool) -> Result<Probe> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let probe = self.probe(locator, Op::Probe).await?;
            if probe.status == ProbeStatus::Ok && probe.found {
                if probe.count > 1 {
                    return Err(strict_violation(locator, probe.count));
                }
                if !actionable || (probe.state.visible && probe.state.enabled) {
                    return Ok(probe);
                }
            }
            if Instant::now() >= deadline {
                return Err(self.timeout_error(locator, &probe));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    fn timeout_error(&self, locator: &Locator, probe: &Probe) -> Error {
        let frame = probe.frame.clone().unwrap_or_default();
        match probe.status {
            ProbeStatus::FrameNotFound => {
                Error::FrameNotFound(format!("{} (while locating {})", frame, locator))
            }
            ProbeStatus::FrameInaccessible => Error::FrameNotFound(format!(
                "{} is not readable without FRAME_ACCESS_ARGS (while locating {})",
                frame, locator
            )),
            _ if !probe.found => Error::ElementNotFound(format!(
                "{} after {}ms",
                locator,
                self.timeout.as_millis()
            )),
            _ => Error::NotActionable(format!(
                "{} (visible: {}, enabled: {}) after {}ms",
                locator,
                probe.state.visible,
                probe.state.enabled,
                self.timeout.as_millis()
            )),
        }
    }

    fn frame_error(locator: &Locator, probe: &Probe) -> Option<Error> {
        match probe.status {
            ProbeStatus::FrameNotFound | ProbeStatus::FrameInaccessible => {
                Some(Error::FrameNotFound(format!(
                    "{} (while locating {})",
                    probe.frame.clone().unwrap_or_default(),
                    locator
                )))
            }
            _ => None,
        }
    }

    /// Tag the match so eoka's selector-based input can reach it.
    async fn mark(&self, locator: &Locator) -> Result<String> {
        let id = self.next_ref.fetch_add(1, Ordering::Relaxed);
        self.probe(locator, Op::Mark(id)).await?;
        Ok(format!("[{}=\"{}\"]", REF_ATTR, id))
    }
}

fn strict_violation(locator: &Locator, count: usize) -> Error {
    Error::NotActionable(format!(
        "{} matched {} elements; pick one with nth()",
        locator, count
    ))
}

impl Session for EokaSession {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!("goto: {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> Result<usize> {
        let probe = self.probe(locator, Op::Probe).await?;
        if let Some(err) = Self::frame_error(locator, &probe) {
            return Err(err);
        }
        Ok(probe.count)
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        debug!("click: {}", locator);
        self.wait_for(locator, true).await?;
        if locator.is_framed() {
            self.probe(locator, Op::Click).await?;
        } else {
            let selector = self.mark(locator).await?;
            self.page.click(&selector).await?;
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        debug!("fill: {} = '{}'", locator, value);
        self.wait_for(locator, true).await?;
        if locator.is_framed() {
            self.probe(locator, Op::Fill(value)).await?;
        } else {
            let selector = self.mark(locator).await?;
            self.page.fill(&selector, value).await?;
        }
        Ok(())
    }

    async fn check(&self, locator: &Locator) -> Result<()> {
        debug!("check: {}", locator);
        let probe = self.wait_for(locator, true).await?;
        if probe.state.checked {
            return Ok(());
        }
        self.click(locator).await?;

        let deadline = Instant::now() + self.timeout;
        loop {
            let state = self.state(locator).await?;
            if state.checked {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::NotActionable(format!(
                    "{} did not become checked",
                    locator
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn scroll_into_view(&self, locator: &Locator) -> Result<()> {
        debug!("scroll_into_view: {}", locator);
        self.wait_for(locator, false).await?;
        self.probe(locator, Op::Scroll).await?;
        self.page.wait(200).await;
        Ok(())
    }

    async fn text_content(&self, locator: &Locator) -> Result<Option<String>> {
        Ok(self.wait_for(locator, false).await?.text)
    }

    async fn input_value(&self, locator: &Locator) -> Result<String> {
        Ok(self.wait_for(locator, false).await?.value.unwrap_or_default())
    }

    async fn state(&self, locator: &Locator) -> Result<ElementState> {
        let probe = self.probe(locator, Op::Probe).await?;
        if let Some(err) = Self::frame_error(locator, &probe) {
            return Err(err);
        }
        if !probe.found {
            return Ok(ElementState::detached());
        }
        if probe.count > 1 {
            return Err(strict_violation(locator, probe.count));
        }
        Ok(probe.state)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(self.page.screenshot().await?)
    }

    async fn pause(&self, duration: Duration) {
        self.page.wait(duration.as_millis() as u64).await;
    }
}
