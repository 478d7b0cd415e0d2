//! Scripted in-memory [`Session`] for unit tests.

use super::{ElementState, Session};
use crate::locator::Locator;
use crate::{Error, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// What the fake recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Goto(String),
    Click(String),
    Fill(String, String),
    Check(String),
    Scroll(String),
    Pause(Duration),
    Screenshot,
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    /// Successive `text_content` results; the last one repeats.
    pub texts: VecDeque<Option<String>>,
    pub value: String,
    pub state: ElementState,
    pub count: usize,
}

impl Default for FakeElement {
    fn default() -> Self {
        Self {
            texts: VecDeque::from([Some(String::new())]),
            value: String::new(),
            state: ElementState::interactive(),
            count: 1,
        }
    }
}

impl FakeElement {
    pub fn text(text: &str) -> Self {
        Self {
            texts: VecDeque::from([Some(text.to_string())]),
            ..Self::default()
        }
    }

    pub fn texts<I: IntoIterator<Item = &'static str>>(texts: I) -> Self {
        Self {
            texts: texts.into_iter().map(|t| Some(t.to_string())).collect(),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: ElementState) -> Self {
        self.state = state;
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }
}

#[derive(Default)]
struct Inner {
    elements: HashMap<Locator, FakeElement>,
    frames: HashSet<String>,
    calls: Vec<Call>,
}

/// Elements are keyed by the exact locator that finds them; frame-scoped
/// locators additionally need their frames registered.
#[derive(Default)]
pub struct FakeSession {
    inner: Mutex<Inner>,
    /// Resolve unregistered locators to a default interactive element.
    permissive: bool,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every locator resolves; registered ones use their scripted element.
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    pub fn with(self, locator: Locator, element: FakeElement) -> Self {
        self.lock().elements.insert(locator, element);
        self
    }

    pub fn with_frame(self, selector: &str) -> Self {
        self.lock().frames.insert(selector.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn clicks(&self, locator: &Locator) -> usize {
        let key = locator.to_string();
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Click(k) if *k == key))
            .count()
    }

    pub fn was_clicked(&self, locator: &Locator) -> bool {
        self.clicks(locator) > 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: Call) {
        self.lock().calls.push(call);
    }

    fn check_frames(&self, locator: &Locator) -> Result<()> {
        let inner = self.lock();
        for frame in locator.frames() {
            if !inner.frames.contains(frame) {
                return Err(Error::FrameNotFound(format!(
                    "{} (while locating {})",
                    frame, locator
                )));
            }
        }
        Ok(())
    }

    fn element(&self, locator: &Locator) -> Result<FakeElement> {
        self.check_frames(locator)?;
        let inner = self.lock();
        match inner.elements.get(locator) {
            Some(el) if el.count > 1 => Err(Error::NotActionable(format!(
                "{} matched {} elements; pick one with nth()",
                locator, el.count
            ))),
            Some(el) if el.count == 1 && el.state.attached => Ok(el.clone()),
            Some(_) => Err(Error::ElementNotFound(locator.to_string())),
            None if self.permissive => Ok(FakeElement::default()),
            None => Err(Error::ElementNotFound(locator.to_string())),
        }
    }

    fn actionable(&self, locator: &Locator) -> Result<FakeElement> {
        let el = self.element(locator)?;
        if !(el.state.visible && el.state.enabled) {
            return Err(Error::NotActionable(format!(
                "{} (visible: {}, enabled: {})",
                locator, el.state.visible, el.state.enabled
            )));
        }
        Ok(el)
    }
}

impl Session for FakeSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.record(Call::Goto(url.to_string()));
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> Result<usize> {
        self.check_frames(locator)?;
        let inner = self.lock();
        Ok(match inner.elements.get(locator) {
            Some(el) => el.count,
            None if self.permissive => 1,
            None => 0,
        })
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        self.actionable(locator)?;
        self.record(Call::Click(locator.to_string()));
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        self.actionable(locator)?;
        let mut inner = self.lock();
        if let Some(el) = inner.elements.get_mut(locator) {
            el.value = value.to_string();
        }
        inner
            .calls
            .push(Call::Fill(locator.to_string(), value.to_string()));
        Ok(())
    }

    async fn check(&self, locator: &Locator) -> Result<()> {
        let el = self.actionable(locator)?;
        if el.state.checked {
            return Ok(());
        }
        let mut inner = self.lock();
        inner
            .elements
            .entry(locator.clone())
            .or_default()
            .state
            .checked = true;
        inner.calls.push(Call::Check(locator.to_string()));
        Ok(())
    }

    async fn scroll_into_view(&self, locator: &Locator) -> Result<()> {
        self.element(locator)?;
        self.record(Call::Scroll(locator.to_string()));
        Ok(())
    }

    async fn text_content(&self, locator: &Locator) -> Result<Option<String>> {
        self.element(locator)?;
        let mut inner = self.lock();
        let Some(el) = inner.elements.get_mut(locator) else {
            return Ok(Some(String::new()));
        };
        if el.texts.len() > 1 {
            Ok(el.texts.pop_front().flatten())
        } else {
            Ok(el.texts.front().cloned().flatten())
        }
    }

    async fn input_value(&self, locator: &Locator) -> Result<String> {
        Ok(self.element(locator)?.value)
    }

    async fn state(&self, locator: &Locator) -> Result<ElementState> {
        self.check_frames(locator)?;
        let inner = self.lock();
        match inner.elements.get(locator) {
            Some(el) if el.count > 1 => Err(Error::NotActionable(format!(
                "{} matched {} elements; pick one with nth()",
                locator, el.count
            ))),
            Some(el) if el.count == 0 => Ok(ElementState::detached()),
            Some(el) => Ok(el.state),
            None if self.permissive => Ok(ElementState::interactive()),
            None => Ok(ElementState::detached()),
        }
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.record(Call::Screenshot);
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn pause(&self, duration: Duration) {
        self.record(Call::Pause(duration));
    }
}
