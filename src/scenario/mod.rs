//! The "check payment" scenario: walk the funnel from the home page to the
//! payment step and verify every payment method the locale offers.
//!
//! [`CheckoutStage::path`] gives the stages in order for a locale, and
//! [`CheckPayment::run`] drives them one by one. The only locale-specific
//! behaviour comes from [`LocaleVariant`]: whether the original address must
//! be confirmed after billing, and which payment methods are shown.

use crate::config::{Fixture, RunSettings};
use crate::locale::{AddressConfirmation, Locale, LocaleVariant, PaymentMethod};
use crate::pages::{
    CartPage, CheckoutPage, HomePage, OneyCheck, PageContext, PollPolicy, ProductPage,
    RedirectLoginPage,
};
use crate::session::Session;
use crate::Result;
use serde::Serialize;
use tracing::info;

/// Where the scenario is in the funnel. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStage {
    Home,
    Search,
    ProductList,
    ProductDetail,
    Cart,
    GuestOrLogin,
    PostalCode,
    ShippingAddress,
    ShippingMethod,
    Billing,
    OriginalAddressConfirm,
    Loyalty,
    PaymentMethodSelection,
}

impl CheckoutStage {
    /// Stages visited for `locale`, in order.
    pub fn path(locale: Locale) -> Vec<CheckoutStage> {
        use CheckoutStage::*;
        let mut path = vec![
            Home,
            Search,
            ProductList,
            ProductDetail,
            Cart,
            GuestOrLogin,
            PostalCode,
            ShippingAddress,
            ShippingMethod,
            Billing,
        ];
        if locale.variant().address_confirmation == AddressConfirmation::OriginalAddress {
            path.push(OriginalAddressConfirm);
        }
        path.extend([Loyalty, PaymentMethodSelection]);
        path
    }

    pub fn is_terminal(self) -> bool {
        self == CheckoutStage::PaymentMethodSelection
    }
}

/// Knobs of the scenario that come from the run settings.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioSettings {
    /// Raise the cart total above this before checkout.
    pub target_cart_amount: Option<i64>,
    pub poll: PollPolicy,
    /// Oney is offered strictly above this cart total.
    pub oney_threshold: i64,
    /// Search result to open (0-based).
    pub result_position: usize,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            target_cart_amount: None,
            poll: PollPolicy::default(),
            oney_threshold: 100,
            result_position: 0,
        }
    }
}

impl From<&RunSettings> for ScenarioSettings {
    fn from(run: &RunSettings) -> Self {
        Self {
            target_cart_amount: run.target_cart_amount,
            poll: PollPolicy::new(run.settle(), run.max_quantity_increments),
            oney_threshold: run.oney_threshold,
            result_position: 0,
        }
    }
}

/// What a successful run observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckoutOutcome {
    pub product_label: String,
    pub product_price: String,
    pub cart_amount: i64,
    pub verified_methods: Vec<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oney: Option<OneyCheck>,
}

/// Sequencer for one project.
pub struct CheckPayment<'a> {
    base_url: &'a str,
    locale: Locale,
    fixture: &'a Fixture,
    settings: ScenarioSettings,
}

impl<'a> CheckPayment<'a> {
    pub fn new(base_url: &'a str, locale: Locale, fixture: &'a Fixture) -> Self {
        Self {
            base_url,
            locale,
            fixture,
            settings: ScenarioSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ScenarioSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn variant(&self) -> LocaleVariant {
        self.locale.variant()
    }

    /// Drive every stage of [`CheckoutStage::path`] in order.
    pub async fn run<S: Session>(&self, ctx: PageContext<'_, S>) -> Result<CheckoutOutcome> {
        let mut outcome = CheckoutOutcome::default();
        for stage in CheckoutStage::path(self.locale) {
            info!("[{}] stage {:?}", self.locale, stage);
            self.enter(stage, ctx, &mut outcome).await?;
        }
        Ok(outcome)
    }

    async fn enter<S: Session>(
        &self,
        stage: CheckoutStage,
        ctx: PageContext<'_, S>,
        outcome: &mut CheckoutOutcome,
    ) -> Result<()> {
        let fixture = self.fixture;
        match stage {
            CheckoutStage::Home => {
                ctx.step(format!("Open {}", self.base_url), async {
                    ctx.session.goto(self.base_url).await
                })
                .await?;
                HomePage::new(ctx).accept_cookies().await
            }
            CheckoutStage::Search => HomePage::new(ctx).search_product(&fixture.search_term).await,
            CheckoutStage::ProductList => {
                HomePage::new(ctx)
                    .select_from_results(self.settings.result_position)
                    .await
            }
            CheckoutStage::ProductDetail => {
                let product = ProductPage::new(ctx);
                outcome.product_label = product.get_product_label().await?;
                outcome.product_price = product.get_product_price().await?;
                info!(
                    "Product: {} ({})",
                    outcome.product_label, outcome.product_price
                );
                product.add_product_to_cart().await?;
                product.select_first_available_size().await?;
                product.go_to_cart().await
            }
            CheckoutStage::Cart => {
                let cart = CartPage::new(ctx);
                outcome.cart_amount = match self.settings.target_cart_amount {
                    Some(target) => {
                        cart.ensure_cart_amount_above(target, &self.settings.poll)
                            .await?
                    }
                    None => cart.get_cart_amount().await?,
                };
                cart.validate_cart().await
            }
            CheckoutStage::GuestOrLogin => RedirectLoginPage::new(ctx).continue_as_guest().await,
            CheckoutStage::PostalCode => {
                let checkout = CheckoutPage::new(ctx, self.locale);
                checkout.input_postal_code(&fixture.postal_code).await?;
                checkout.select_home_delivery().await
            }
            CheckoutStage::ShippingAddress => {
                let checkout = CheckoutPage::new(ctx, self.locale);
                checkout
                    .input_shipping_information(&fixture.shipping_info)
                    .await?;
                checkout.check_country_form().await?;
                checkout.check_postal_code_form(&fixture.postal_code).await?;
                checkout.validate_shipping_address().await?;
                checkout.input_phone_number(&fixture.phone_number).await
            }
            CheckoutStage::ShippingMethod => {
                CheckoutPage::new(ctx, self.locale)
                    .validate_shipping_step()
                    .await
            }
            CheckoutStage::Billing => {
                let checkout = CheckoutPage::new(ctx, self.locale);
                checkout.go_to_billing_information().await?;
                checkout
                    .complete_billing_information(&fixture.billing_info)
                    .await?;
                checkout.validate_billing_information().await
            }
            CheckoutStage::OriginalAddressConfirm => {
                CheckoutPage::new(ctx, self.locale)
                    .validate_original_address()
                    .await
            }
            CheckoutStage::Loyalty => {
                // Billing sends the funnel back to the shipping step.
                let checkout = CheckoutPage::new(ctx, self.locale);
                checkout.validate_shipping_step().await?;
                checkout.validate_loyalty_step().await
            }
            CheckoutStage::PaymentMethodSelection => {
                let checkout = CheckoutPage::new(ctx, self.locale);
                for &method in self.variant().payment_methods {
                    let oney = checkout
                        .verify_payment_method(
                            method,
                            outcome.cart_amount,
                            self.settings.oney_threshold,
                        )
                        .await?;
                    if oney.is_some() {
                        outcome.oney = oney;
                    }
                    outcome.verified_methods.push(method);
                }
                Ok(())
            }
        }
    }
}
