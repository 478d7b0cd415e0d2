//! Cart page, including the loop that raises the cart total.

use super::PageContext;
use crate::locator::Locator;
use crate::session::Session;
use crate::text::{parse_amount, require_text};
use crate::{Error, Result};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct CartLocators;

impl CartLocators {
    pub fn span_product_name(&self) -> Locator {
        Locator::test_id("undefinedProductName")
    }

    pub fn span_product_size(&self) -> Locator {
        Locator::test_id("undefinedProductSize")
    }

    pub fn span_product_price(&self) -> Locator {
        Locator::test_id("undefinedPrice")
    }

    pub fn button_validate_cart(&self) -> Locator {
        Locator::test_id("invoiceDetailsCard_button_validateCart")
    }

    pub fn button_delete_quantity(&self) -> Locator {
        Locator::test_id("button_deleteQuantity")
    }

    pub fn button_add_quantity(&self) -> Locator {
        Locator::test_id("button_moreQuantity")
    }

    pub fn span_cart_amount(&self) -> Locator {
        Locator::test_id("cartInvoiceDetails_div_total_price")
    }
}

/// Bounds for [`CartPage::ensure_cart_amount_above`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause after each quantity increase, while the total is recomputed.
    pub settle: Duration,
    /// Give up after this many increases.
    pub max_increments: u32,
}

impl PollPolicy {
    pub fn new(settle: Duration, max_increments: u32) -> Self {
        Self {
            settle,
            max_increments,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 10)
    }
}

pub struct CartPage<'a, S: Session> {
    ctx: PageContext<'a, S>,
    locators: CartLocators,
}

impl<'a, S: Session> CartPage<'a, S> {
    pub fn new(ctx: PageContext<'a, S>) -> Self {
        Self {
            ctx,
            locators: CartLocators,
        }
    }

    pub fn locators(&self) -> &CartLocators {
        &self.locators
    }

    async fn read(&self, field: &str, locator: Locator) -> Result<String> {
        let raw = self.ctx.session.text_content(&locator).await?;
        require_text(field, raw)
    }

    pub async fn get_product_name(&self) -> Result<String> {
        self.ctx
            .step("Get product name from cart", async {
                self.read("cart product name", self.locators.span_product_name())
                    .await
            })
            .await
    }

    pub async fn get_product_price(&self) -> Result<String> {
        self.ctx
            .step("Get product price from cart", async {
                self.read("cart product price", self.locators.span_product_price())
                    .await
            })
            .await
    }

    pub async fn get_product_size(&self) -> Result<String> {
        self.ctx
            .step("Get product size from cart", async {
                self.read("cart product size", self.locators.span_product_size())
                    .await
            })
            .await
    }

    async fn read_cart_amount(&self) -> Result<i64> {
        let text = self.read("cart amount", self.locators.span_cart_amount()).await?;
        parse_amount("cart amount", &text)
    }

    /// Integer part of the cart total.
    pub async fn get_cart_amount(&self) -> Result<i64> {
        self.ctx
            .step("Get cart amount", async { self.read_cart_amount().await })
            .await
    }

    pub async fn increase_quantity(&self) -> Result<()> {
        self.ctx
            .step("Increase quantity", async {
                self.ctx
                    .session
                    .click(&self.locators.button_add_quantity())
                    .await
            })
            .await
    }

    pub async fn decrease_quantity(&self) -> Result<()> {
        self.ctx
            .step("Decrease quantity", async {
                self.ctx
                    .session
                    .click(&self.locators.button_delete_quantity())
                    .await
            })
            .await
    }

    pub async fn validate_cart(&self) -> Result<()> {
        self.ctx
            .step("Validate cart", async {
                self.ctx
                    .session
                    .click(&self.locators.button_validate_cart())
                    .await
            })
            .await
    }

    /// Increase the quantity until the cart total is strictly above `target`.
    ///
    /// Reads the total once per iteration. Fails with
    /// [`Error::ThresholdUnreachable`] once `policy.max_increments` increases
    /// did not get there. Returns the final total.
    pub async fn ensure_cart_amount_above(&self, target: i64, policy: &PollPolicy) -> Result<i64> {
        self.ctx
            .step(format!("Ensure cart amount above {}", target), async {
                let mut amount = self.read_cart_amount().await?;
                let mut increments = 0;
                while amount <= target {
                    if increments >= policy.max_increments {
                        return Err(Error::ThresholdUnreachable {
                            target,
                            last: amount,
                            increments,
                        });
                    }
                    increments += 1;
                    let name = format!(
                        "Increase quantity ({}/{}), cart at {}",
                        increments, policy.max_increments, amount
                    );
                    amount = self
                        .ctx
                        .step(name, async {
                            self.ctx
                                .session
                                .click(&self.locators.button_add_quantity())
                                .await?;
                            self.ctx.session.pause(policy.settle).await;
                            self.read_cart_amount().await
                        })
                        .await?;
                    debug!("Cart amount after increase {}: {}", increments, amount);
                }
                info!(
                    "Cart amount {} above {} after {} increase(s)",
                    amount, target, increments
                );
                Ok(amount)
            })
            .await
    }
}
