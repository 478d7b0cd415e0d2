//! The browser capability a scenario drives.
//!
//! Locator providers never touch a session; facades do, through this trait.
//! One session per scenario, never shared between scenarios.

mod browser;
#[cfg(test)]
pub(crate) mod fake;

pub use browser::{EokaSession, FRAME_ACCESS_ARGS};

use crate::locator::Locator;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Snapshot of an element's interactive state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementState {
    /// At least one element matched.
    pub attached: bool,
    pub visible: bool,
    pub enabled: bool,
    pub editable: bool,
    pub checked: bool,
    pub in_viewport: bool,
}

impl ElementState {
    /// A visible, enabled, editable element inside the viewport.
    pub fn interactive() -> Self {
        Self {
            attached: true,
            visible: true,
            enabled: true,
            editable: true,
            checked: false,
            in_viewport: true,
        }
    }

    pub fn detached() -> Self {
        Self::default()
    }
}

/// Capability interface over a live browser tab.
///
/// Actions wait up to the session timeout for the element to be attached
/// (and visible and enabled for `click`, `fill` and `check`). They fail with
/// [`Error::ElementNotFound`](crate::Error::ElementNotFound),
/// [`Error::FrameNotFound`](crate::Error::FrameNotFound) or
/// [`Error::NotActionable`](crate::Error::NotActionable). A locator matching
/// several elements without an index is not actionable.
///
/// `count` and `state` read the document once and never wait.
#[allow(async_fn_in_trait)]
pub trait Session {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn count(&self, locator: &Locator) -> Result<usize>;

    async fn click(&self, locator: &Locator) -> Result<()>;

    async fn fill(&self, locator: &Locator, value: &str) -> Result<()>;

    /// Check a checkbox or radio and confirm it reports checked.
    async fn check(&self, locator: &Locator) -> Result<()>;

    async fn scroll_into_view(&self, locator: &Locator) -> Result<()>;

    /// `textContent` of the element; `None` when the page reports none.
    async fn text_content(&self, locator: &Locator) -> Result<Option<String>>;

    async fn input_value(&self, locator: &Locator) -> Result<String>;

    async fn state(&self, locator: &Locator) -> Result<ElementState>;

    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Fixed pause, e.g. to let the page recompute after a change.
    async fn pause(&self, duration: Duration);
}
