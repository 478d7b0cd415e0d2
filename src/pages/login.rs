//! Login redirect shown between cart and checkout.

use super::PageContext;
use crate::locator::Locator;
use crate::session::Session;
use crate::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct RedirectLoginLocators;

impl RedirectLoginLocators {
    pub fn button_continue_as_guest(&self) -> Locator {
        Locator::test_id("accountInfosAuthEmailUnknownDrawer_button_TMI")
    }
}

pub struct RedirectLoginPage<'a, S: Session> {
    ctx: PageContext<'a, S>,
    locators: RedirectLoginLocators,
}

impl<'a, S: Session> RedirectLoginPage<'a, S> {
    pub fn new(ctx: PageContext<'a, S>) -> Self {
        Self {
            ctx,
            locators: RedirectLoginLocators,
        }
    }

    pub async fn continue_as_guest(&self) -> Result<()> {
        self.ctx
            .step("Continue as Guest", async {
                self.ctx
                    .session
                    .click(&self.locators.button_continue_as_guest())
                    .await
            })
            .await
    }
}
