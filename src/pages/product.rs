//! Product detail page.

use super::PageContext;
use crate::locator::Locator;
use crate::session::Session;
use crate::text::require_text;
use crate::Result;

/// Sizes that are sold and carry no "low stock"/"unavailable" note.
const AVAILABLE_SIZE_XPATH: &str = r#"//li[@data-testid="productSize_li_sizeSold"]
  [.//div[@class="drawerProductSizes_productSizeInformationContainer__pjwUF" and not(normalize-space())]]
  /button"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductLocators;

impl ProductLocators {
    pub fn button_add_to_cart(&self) -> Locator {
        Locator::test_id("productInformation_button_addToCart")
    }

    pub fn button_available_size(&self) -> Locator {
        Locator::xpath(AVAILABLE_SIZE_XPATH)
    }

    pub fn button_go_to_cart(&self) -> Locator {
        Locator::test_id("cartConfirmationDrawer_button_seeCart")
    }

    pub fn span_product_label(&self) -> Locator {
        Locator::test_id("productPage_span_productLabel")
    }

    pub fn div_product_price(&self) -> Locator {
        Locator::test_id("productPage_div_priceContainer")
    }
}

pub struct ProductPage<'a, S: Session> {
    ctx: PageContext<'a, S>,
    locators: ProductLocators,
}

impl<'a, S: Session> ProductPage<'a, S> {
    pub fn new(ctx: PageContext<'a, S>) -> Self {
        Self {
            ctx,
            locators: ProductLocators,
        }
    }

    pub fn locators(&self) -> &ProductLocators {
        &self.locators
    }

    pub async fn add_product_to_cart(&self) -> Result<()> {
        self.ctx
            .step("Add product to cart", async {
                self.ctx
                    .session
                    .click(&self.locators.button_add_to_cart())
                    .await
            })
            .await
    }

    pub async fn select_first_available_size(&self) -> Result<()> {
        self.ctx
            .step("Select first available size", async {
                self.ctx
                    .session
                    .click(&self.locators.button_available_size().first())
                    .await
            })
            .await
    }

    pub async fn get_product_label(&self) -> Result<String> {
        self.ctx
            .step("Get product label", async {
                let raw = self
                    .ctx
                    .session
                    .text_content(&self.locators.span_product_label())
                    .await?;
                require_text("product label", raw)
            })
            .await
    }

    /// Displayed price, normalized but not parsed (it may carry a
    /// strike-through price too).
    pub async fn get_product_price(&self) -> Result<String> {
        self.ctx
            .step("Get product price", async {
                let raw = self
                    .ctx
                    .session
                    .text_content(&self.locators.div_product_price())
                    .await?;
                require_text("product price", raw)
            })
            .await
    }

    pub async fn go_to_cart(&self) -> Result<()> {
        self.ctx
            .step("Go to cart", async {
                self.ctx
                    .session
                    .click(&self.locators.button_go_to_cart())
                    .await
            })
            .await
    }
}
