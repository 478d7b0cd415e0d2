//! Storefront home page: cookie banner, search bar and search results.

use super::PageContext;
use crate::locator::Locator;
use crate::session::Session;
use crate::Result;
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct HomeLocators;

impl HomeLocators {
    pub fn button_accept_cookies(&self) -> Locator {
        Locator::css("#popin_tc_privacy_button")
    }

    pub fn button_search(&self) -> Locator {
        Locator::test_id("headerSearch_input_search")
    }

    pub fn input_search_bar(&self) -> Locator {
        Locator::role("textbox")
    }

    /// Product labels in the result list, in display order.
    pub fn span_results_list(&self) -> Locator {
        Locator::test_id("productCard_span_label")
    }
}

pub struct HomePage<'a, S: Session> {
    ctx: PageContext<'a, S>,
    locators: HomeLocators,
}

impl<'a, S: Session> HomePage<'a, S> {
    pub fn new(ctx: PageContext<'a, S>) -> Self {
        Self {
            ctx,
            locators: HomeLocators,
        }
    }

    pub fn locators(&self) -> &HomeLocators {
        &self.locators
    }

    pub async fn accept_cookies(&self) -> Result<()> {
        self.ctx
            .step("Accept cookies", async {
                self.ctx
                    .session
                    .click(&self.locators.button_accept_cookies())
                    .await
            })
            .await
    }

    pub async fn search_product(&self, product_name: &str) -> Result<()> {
        self.ctx
            .step(format!("Search for product: {}", product_name), async {
                let session = self.ctx.session;
                session.click(&self.locators.button_search()).await?;
                session
                    .fill(&self.locators.input_search_bar(), product_name)
                    .await
            })
            .await
    }

    /// Open the result at `position` (0-based).
    pub async fn select_from_results(&self, position: usize) -> Result<()> {
        self.ctx
            .step(format!("Select product #{} from results", position + 1), async {
                let result = self.locators.span_results_list().nth(position as i64);
                info!("Opening search result {}", result);
                self.ctx.session.click(&result).await
            })
            .await
    }

    pub async fn select_first_result(&self) -> Result<()> {
        self.select_from_results(0).await
    }
}
