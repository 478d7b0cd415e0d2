//! Locator providers and page action facades, one pair per storefront page.
//!
//! A `*Locators` type only builds [`Locator`]s: it never touches the session,
//! waits or asserts. A `*Page` facade owns one, plus a [`PageContext`], and
//! exposes one method per user-meaningful step. Each method runs as a named
//! step on the context's [`StepRecorder`].

pub mod cart;
pub mod checkout;
pub mod home;
pub mod login;
pub mod product;

pub use cart::{CartLocators, CartPage, PollPolicy};
pub use checkout::{CheckoutLocators, CheckoutPage, OneyCheck, PostalCodeError};
pub use home::{HomeLocators, HomePage};
pub use login::{RedirectLoginLocators, RedirectLoginPage};
pub use product::{ProductLocators, ProductPage};

use crate::expect::{Expectation, DEFAULT_ASSERTION_TIMEOUT};
use crate::locator::Locator;
use crate::session::Session;
use crate::step::StepRecorder;
use crate::Result;
use std::future::Future;
use std::time::Duration;

/// What every facade needs from the running scenario.
pub struct PageContext<'a, S: Session> {
    pub session: &'a S,
    pub steps: &'a StepRecorder,
    /// Timeout for assertions made by facades.
    pub timeout: Duration,
    /// Record assertion failures on the step instead of failing it.
    pub soft: bool,
}

// Derives would require `S: Clone`.
impl<S: Session> Clone for PageContext<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Session> Copy for PageContext<'_, S> {}

impl<'a, S: Session> PageContext<'a, S> {
    pub fn new(session: &'a S, steps: &'a StepRecorder) -> Self {
        Self {
            session,
            steps,
            timeout: DEFAULT_ASSERTION_TIMEOUT,
            soft: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_soft_assertions(mut self, soft: bool) -> Self {
        self.soft = soft;
        self
    }

    pub fn expect(&self, locator: Locator) -> Expectation<'a, S> {
        let expectation = Expectation::new(self.session, locator).with_timeout(self.timeout);
        if self.soft {
            expectation.soft(self.steps)
        } else {
            expectation
        }
    }

    pub async fn step<T, F>(&self, name: impl Into<String>, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.steps.step(name, fut).await
    }

    /// Check `locator` unless it already is. Never unchecks.
    pub async fn ensure_checked(&self, locator: &Locator) -> Result<()> {
        if !self.session.state(locator).await?.checked {
            self.session.check(locator).await?;
        }
        Ok(())
    }
}
