//! Auto-retrying assertions on a [`Locator`].
//!
//! ```rust,ignore
//! Expectation::new(&session, locator)
//!     .with_timeout(Duration::from_secs(5))
//!     .to_have_text(TextMatch::pattern("Carte bancaire|Tarjeta de crédito")?)
//!     .await?;
//! ```

use crate::locator::Locator;
use crate::session::Session;
use crate::step::StepRecorder;
use crate::text::{collapse_whitespace, TextMatch};
use crate::{Error, Result};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default time an assertion keeps retrying.
pub const DEFAULT_ASSERTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Default delay between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

enum Check {
    Visible,
    Enabled,
    Checked,
    Editable,
    InViewport,
    Text(TextMatch),
    ContainsText(String),
    Value(String),
}

impl Check {
    fn describe(&self, negate: bool) -> String {
        let what = match self {
            Check::Visible => "visible".to_string(),
            Check::Enabled => "enabled".to_string(),
            Check::Checked => "checked".to_string(),
            Check::Editable => "editable".to_string(),
            Check::InViewport => "in viewport".to_string(),
            Check::Text(m) => m.to_string(),
            Check::ContainsText(s) => format!("text containing '{}'", s),
            Check::Value(v) => format!("value '{}'", v),
        };
        if negate {
            format!("not {}", what)
        } else {
            what
        }
    }
}

/// One poll's observation.
struct Observed {
    /// `None` when there was no element to judge.
    holds: Option<bool>,
    actual: String,
}

impl Observed {
    fn detached() -> Self {
        Self {
            holds: None,
            actual: "no element".to_string(),
        }
    }

    fn flag(holds: bool, yes: &str, no: &str) -> Self {
        Self {
            holds: Some(holds),
            actual: if holds { yes } else { no }.to_string(),
        }
    }
}

/// An assertion on one locator, retried until it holds or times out.
pub struct Expectation<'a, S: Session> {
    session: &'a S,
    locator: Locator,
    timeout: Duration,
    poll_interval: Duration,
    negate: bool,
    soft: Option<&'a StepRecorder>,
}

#[allow(clippy::wrong_self_convention)]
impl<'a, S: Session> Expectation<'a, S> {
    pub fn new(session: &'a S, locator: Locator) -> Self {
        Self {
            session,
            locator,
            timeout: DEFAULT_ASSERTION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            negate: false,
            soft: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    /// Record failures on `recorder` instead of returning them.
    pub fn soft(mut self, recorder: &'a StepRecorder) -> Self {
        self.soft = Some(recorder);
        self
    }

    pub async fn to_be_visible(self) -> Result<()> {
        self.assert(Check::Visible).await
    }

    /// Passes when nothing matches, too.
    pub async fn to_be_hidden(self) -> Result<()> {
        self.not().assert(Check::Visible).await
    }

    pub async fn to_be_enabled(self) -> Result<()> {
        self.assert(Check::Enabled).await
    }

    pub async fn to_be_disabled(self) -> Result<()> {
        self.not().assert(Check::Enabled).await
    }

    pub async fn to_be_checked(self) -> Result<()> {
        self.assert(Check::Checked).await
    }

    pub async fn to_be_editable(self) -> Result<()> {
        self.assert(Check::Editable).await
    }

    pub async fn to_be_in_viewport(self) -> Result<()> {
        self.assert(Check::InViewport).await
    }

    pub async fn to_have_text(self, expected: impl Into<TextMatch>) -> Result<()> {
        self.assert(Check::Text(expected.into())).await
    }

    pub async fn to_contain_text(self, expected: &str) -> Result<()> {
        self.assert(Check::ContainsText(expected.to_string())).await
    }

    pub async fn to_have_value(self, expected: &str) -> Result<()> {
        self.assert(Check::Value(expected.to_string())).await
    }

    async fn observe(&self, check: &Check) -> Result<Observed> {
        let state = self.session.state(&self.locator).await?;
        if !state.attached {
            return Ok(Observed::detached());
        }
        Ok(match check {
            Check::Visible => Observed::flag(state.visible, "visible", "hidden"),
            Check::Enabled => Observed::flag(state.enabled, "enabled", "disabled"),
            Check::Checked => Observed::flag(state.checked, "checked", "unchecked"),
            Check::Editable => Observed::flag(state.editable, "editable", "read-only"),
            Check::InViewport => {
                Observed::flag(state.in_viewport, "in viewport", "outside viewport")
            }
            Check::Text(m) => self.observe_text(|t| m.matches(t)).await?,
            Check::ContainsText(s) => {
                let needle = collapse_whitespace(s);
                self.observe_text(|t| collapse_whitespace(t).contains(&needle))
                    .await?
            }
            Check::Value(v) => {
                let value = self.session.input_value(&self.locator).await?;
                Observed {
                    holds: Some(value == *v),
                    actual: format!("value '{}'", value),
                }
            }
        })
    }

    async fn observe_text(&self, matches: impl Fn(&str) -> bool) -> Result<Observed> {
        Ok(match self.session.text_content(&self.locator).await? {
            Some(text) => Observed {
                holds: Some(matches(&text)),
                actual: format!("text '{}'", collapse_whitespace(&text)),
            },
            None => Observed {
                holds: Some(matches("")),
                actual: "no text".to_string(),
            },
        })
    }

    fn satisfied(&self, check: &Check, observed: &Observed) -> bool {
        match (observed.holds, check) {
            // Nothing matched: only "not visible" is satisfied.
            (None, Check::Visible) => self.negate,
            (None, _) => false,
            (Some(holds), _) => holds != self.negate,
        }
    }

    async fn assert(self, check: Check) -> Result<()> {
        let expected = check.describe(self.negate);
        let start = Instant::now();
        debug!("expect {}: {}", self.locator, expected);

        let mut frame_error = None;
        let actual = loop {
            let actual = match self.observe(&check).await {
                Ok(observed) if self.satisfied(&check, &observed) => return Ok(()),
                Ok(observed) => {
                    frame_error = None;
                    observed.actual
                }
                Err(e @ Error::FrameNotFound(_)) => {
                    let actual = e.to_string();
                    frame_error = Some(e);
                    actual
                }
                Err(Error::ElementNotFound(_)) => {
                    frame_error = None;
                    Observed::detached().actual
                }
                Err(e) => return Err(e),
            };

            if start.elapsed() >= self.timeout {
                break actual;
            }
            tokio::time::sleep(self.poll_interval).await;
        };

        let failure = frame_error.unwrap_or_else(|| Error::AssertionFailed {
            locator: self.locator.to_string(),
            expected,
            actual,
        });
        match self.soft {
            Some(recorder) => {
                recorder.record_soft_failure(failure.to_string());
                Ok(())
            }
            None => Err(failure),
        }
    }
}
