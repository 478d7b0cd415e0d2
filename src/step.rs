//! Named, nested step reports.
//!
//! Every facade operation runs through [`StepRecorder::step`], which opens a
//! `step` tracing span and records a [`StepReport`] node. Steps started while
//! another is running become its children.

use crate::{Error, Result};
use serde::Serialize;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, warn, Instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    /// Completed, but soft assertions failed inside it.
    SoftFailed,
    Failed,
}

/// One node of the step tree.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub name: String,
    pub status: StepStatus,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StepReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub soft_failures: Vec<String>,
}

impl StepReport {
    fn open(name: String) -> Self {
        Self {
            name,
            status: StepStatus::Passed,
            duration_ms: 0,
            error: None,
            children: Vec::new(),
            soft_failures: Vec::new(),
        }
    }

    /// Depth-first search by name.
    pub fn find(&self, name: &str) -> Option<&StepReport> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

#[derive(Default)]
struct Inner {
    roots: Vec<StepReport>,
    open: Vec<StepReport>,
    soft_failures: Vec<String>,
}

/// Records the step tree of one scenario run.
///
/// Steps are expected to be awaited one after another, as a scenario does;
/// the recorder is not meant to be shared between scenarios.
#[derive(Default)]
pub struct StepRecorder {
    inner: Mutex<Inner>,
}

impl StepRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `fut` as a named step.
    pub async fn step<T, F>(&self, name: impl Into<String>, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let name = name.into();
        let span = tracing::info_span!("step", name = %name);
        debug!(parent: &span, "start");

        self.lock().open.push(StepReport::open(name));
        let start = Instant::now();
        let result = fut.instrument(span.clone()).await;
        let elapsed = start.elapsed().as_millis() as u64;

        let mut inner = self.lock();
        if let Some(mut report) = inner.open.pop() {
            report.duration_ms = elapsed;
            report.status = match &result {
                Err(e) => {
                    warn!(parent: &span, "failed: {}", e);
                    report.error = Some(e.to_string());
                    StepStatus::Failed
                }
                Ok(_) if !report.soft_failures.is_empty() => StepStatus::SoftFailed,
                Ok(_) => StepStatus::Passed,
            };
            match inner.open.last_mut() {
                Some(parent) => parent.children.push(report),
                None => inner.roots.push(report),
            }
        }
        result
    }

    /// Record a failed soft assertion against the running step.
    pub fn record_soft_failure(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("soft assertion failed: {}", message);
        let mut inner = self.lock();
        if let Some(current) = inner.open.last_mut() {
            current.soft_failures.push(message.clone());
        }
        inner.soft_failures.push(message);
    }

    pub fn soft_failures(&self) -> Vec<String> {
        self.lock().soft_failures.clone()
    }

    /// Fail with [`Error::SoftAssertions`] if any soft assertion failed.
    pub fn finish(&self) -> Result<()> {
        let failures = self.soft_failures();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::SoftAssertions(failures))
        }
    }

    /// Completed top-level steps recorded so far.
    pub fn snapshot(&self) -> Vec<StepReport> {
        self.lock().roots.clone()
    }

    pub fn into_report(self) -> Vec<StepReport> {
        self.inner
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .roots
    }
}
