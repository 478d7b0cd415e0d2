//! Checkout funnel: postal code, shipping address, billing, loyalty and the
//! payment step.
//!
//! Address and billing forms carry the locale in their test ids
//! (`homeAddressFormFR_input_city`); [`CheckoutLocators`] fills that in from
//! the locale it was built with, and from nothing else.

use super::PageContext;
use crate::config::{BillingInfo, ShippingInfo};
use crate::locale::{Locale, PaymentMethod};
use crate::locator::{FrameLocator, Locator, NameMatch};
use crate::session::Session;
use crate::text::TextMatch;
use crate::Result;
use serde::Serialize;
use tracing::info;

/// Placeholder replaced by the locale tag in localized test ids.
const LOCALE_PLACEHOLDER: &str = "{locale}";

/// Host serving the embedded card fields.
const CARD_FRAME_HOST: &str = "payment.payline.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutLocators {
    locale: Locale,
}

impl CheckoutLocators {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    fn localized(&self, template: &str) -> Locator {
        Locator::test_id(template.replace(LOCALE_PLACEHOLDER, self.locale.tag()))
    }

    // Delivery

    pub fn input_postal_code(&self) -> Locator {
        Locator::test_id("postalCode_input_postalCode")
    }

    pub fn button_confirm_postal_code(&self) -> Locator {
        Locator::test_id("postalCode_button_validate")
    }

    pub fn div_postal_code_error_message(&self) -> Locator {
        Locator::test_id("postalCode_div_errorMessage")
    }

    pub fn label_home_delivery(&self) -> Locator {
        Locator::test_id("deliveryChoices_radio_shippingHome")
    }

    pub fn input_radio_home_delivery(&self) -> Locator {
        Locator::css(r#"input[type="radio"][value="HOME"]"#)
    }

    pub fn button_close_address_form(&self) -> Locator {
        Locator::role_named("button", NameMatch::Exact("close button".into()))
    }

    pub fn input_phone_number(&self) -> Locator {
        Locator::test_id("mobileForm-mobile")
    }

    pub fn button_validate_shipping_step(&self) -> Locator {
        Locator::test_id("shippingStep_button_validate")
    }

    // Shipping address form

    pub fn input_form_last_name(&self) -> Locator {
        self.localized("homeAddressForm{locale}_input_lastName")
    }

    pub fn input_form_first_name(&self) -> Locator {
        self.localized("homeAddressForm{locale}_input_firstName")
    }

    pub fn input_form_street(&self) -> Locator {
        self.localized("homeAddressForm{locale}_input_addressLine1")
    }

    pub fn input_form_street_extra(&self) -> Locator {
        self.localized("homeAddressForm{locale}_input_addressLine2")
    }

    pub fn input_form_postal_code(&self) -> Locator {
        self.localized("homeAddressForm{locale}_input_postalCode")
    }

    pub fn input_form_city(&self) -> Locator {
        self.localized("homeAddressForm{locale}_input_city")
    }

    pub fn select_form_country(&self) -> Locator {
        self.localized("homeAddressForm{locale}_select_country")
    }

    pub fn span_same_billing_address(&self) -> Locator {
        self.localized("homeAddressForm{locale}_button_billingDifferentThanShipping")
    }

    pub fn button_complete_shipping_form(&self) -> Locator {
        self.localized("homeAddressForm{locale}_button_validate")
    }

    // Billing form

    pub fn span_complete_form(&self) -> Locator {
        Locator::role_named(
            "button",
            NameMatch::Substring(self.locale.texts().complete_billing_button.into()),
        )
    }

    pub fn input_form_birth_date(&self) -> Locator {
        self.localized("billingForm{locale}_input_birthDate")
    }

    pub fn input_form_email(&self) -> Locator {
        self.localized("billingForm{locale}_input_email")
    }

    pub fn button_complete_billing_form(&self) -> Locator {
        self.localized("billingForm{locale}_button_validate")
    }

    pub fn input_original_address(&self) -> Locator {
        Locator::css(r#"input[type="radio"][value="BILLING-WRONG-ADDRESS"]"#)
    }

    pub fn button_validate_address(&self) -> Locator {
        Locator::test_id("billingAddressFrDialogContent-validation_btn")
    }

    pub fn button_validate_loyalty_step(&self) -> Locator {
        Locator::test_id("loyaltyStep_button_goNextStep")
    }

    // Payment step

    /// Radio input selecting `method`.
    pub fn input_payment_option(&self, method: PaymentMethod) -> Locator {
        Locator::css(format!(r#"input[type="radio"][value="{}"]"#, method.code()))
    }

    /// Label of the radio selecting `method`.
    pub fn label_payment_option(&self, method: PaymentMethod) -> Locator {
        Locator::test_id(format!("paymentStepPayline_radio_paymentOptions_{}", method.code()))
    }

    pub fn iframe_credit_card_number(&self) -> FrameLocator {
        FrameLocator::new(format!(
            r#"iframe[id*="cardNumber"][src*="{}"]"#,
            CARD_FRAME_HOST
        ))
    }

    pub fn input_credit_card_number(&self) -> Locator {
        self.iframe_credit_card_number().locator(r#"input[type="tel"]"#)
    }

    pub fn input_credit_card_expiry_date(&self) -> Locator {
        Locator::css(r#"input[id*="expirationDate"]"#)
    }

    pub fn iframe_credit_card_cvv(&self) -> FrameLocator {
        FrameLocator::new(format!(r#"iframe[id*="cvv"][src*="{}"]"#, CARD_FRAME_HOST))
    }

    pub fn input_credit_card_cvv(&self) -> Locator {
        self.iframe_credit_card_cvv().locator(r#"input[type="tel"]"#)
    }

    pub fn button_google_pay(&self) -> Locator {
        Locator::role_named(
            "button",
            NameMatch::Substring(self.locale.texts().google_pay_button.into()),
        )
    }

    pub fn button_paypal(&self) -> Locator {
        Locator::css(r#"button[id*="paypal"]"#)
    }

    pub fn div_illicado(&self) -> Locator {
        Locator::css(r#"div[class*="pl-pmContainer pl-illicado"]"#)
    }

    pub fn button_illicado(&self) -> Locator {
        self.div_illicado().get_by_role("button", None)
    }

    pub fn div_gift_card(&self) -> Locator {
        Locator::css(r#"div[class*="pl-pmContainer pl-cadeau-kiabi"]"#)
    }

    pub fn button_gift_card(&self) -> Locator {
        self.div_gift_card().get_by_role("button", None)
    }

    pub fn div_voucher(&self) -> Locator {
        Locator::css(r#"div[class*="pl-pmContainer pl-globalpos"]"#)
    }

    pub fn input_voucher_number(&self) -> Locator {
        self.div_voucher().get_by_role("textbox", None)
    }

    pub fn button_voucher(&self) -> Locator {
        self.div_voucher().get_by_role("button", None)
    }

    pub fn div_payment_on_delivery(&self) -> Locator {
        Locator::css(r#"div[id*="PaymentOptionContentContainer_CRBT"]"#)
    }

    pub fn button_payment_on_delivery(&self) -> Locator {
        self.div_payment_on_delivery().get_by_role("button", None)
    }

    pub fn div_refund_voucher(&self) -> Locator {
        Locator::css(r#"div[id*="PaymentOptionContentContainer_REFUND_VOUCHER"]"#)
    }

    pub fn input_refund_voucher_number(&self) -> Locator {
        Locator::test_id("RefundVoucher_input")
    }

    pub fn button_refund_voucher(&self) -> Locator {
        self.div_refund_voucher().get_by_role("button", None)
    }

    /// Every accessor whose test id depends on the locale.
    pub fn localized_locators(&self) -> Vec<Locator> {
        vec![
            self.input_form_last_name(),
            self.input_form_first_name(),
            self.input_form_street(),
            self.input_form_street_extra(),
            self.input_form_postal_code(),
            self.input_form_city(),
            self.select_form_country(),
            self.span_same_billing_address(),
            self.button_complete_shipping_form(),
            self.input_form_birth_date(),
            self.input_form_email(),
            self.button_complete_billing_form(),
        ]
    }
}

/// Ways the postal-code field rejects its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostalCodeError {
    Missing,
    /// Six digits or more.
    TooLong,
    /// Letters instead of digits.
    BadFormat,
}

impl PostalCodeError {
    /// Input that triggers this rejection.
    pub fn sample_input(self) -> &'static str {
        match self {
            PostalCodeError::Missing => "",
            PostalCodeError::TooLong => "750012",
            PostalCodeError::BadFormat => "abcde",
        }
    }

    pub fn message(self, locale: Locale) -> &'static str {
        let texts = locale.texts();
        match self {
            PostalCodeError::Missing => texts.postal_code_required,
            PostalCodeError::TooLong => texts.postal_code_too_long,
            PostalCodeError::BadFormat => texts.postal_code_bad_format,
        }
    }
}

/// How the Oney option was found, given the cart total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OneyCheck {
    /// Above the threshold: enabled and selected.
    Selected,
    /// At or below the threshold: disabled, left alone.
    Unavailable,
}

pub struct CheckoutPage<'a, S: Session> {
    ctx: PageContext<'a, S>,
    locators: CheckoutLocators,
}

impl<'a, S: Session> CheckoutPage<'a, S> {
    /// Bind the facade to `locale` for its whole lifetime.
    pub fn new(ctx: PageContext<'a, S>, locale: Locale) -> Self {
        Self {
            ctx,
            locators: CheckoutLocators::new(locale),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locators.locale()
    }

    pub fn locators(&self) -> &CheckoutLocators {
        &self.locators
    }

    pub async fn input_postal_code(&self, postal_code: &str) -> Result<()> {
        self.ctx
            .step("Input Postal Code", async {
                let session = self.ctx.session;
                session
                    .fill(&self.locators.input_postal_code(), postal_code)
                    .await?;
                session
                    .click(&self.locators.button_confirm_postal_code())
                    .await
            })
            .await
    }

    /// Submit input the postal-code field must refuse, and check the message.
    pub async fn reject_postal_code(&self, error: PostalCodeError) -> Result<()> {
        let name = match error {
            PostalCodeError::Missing => "Input no postal code in textbox",
            PostalCodeError::TooLong => "Input six-digit postal code in textbox",
            PostalCodeError::BadFormat => "Input text in postal code textbox",
        };
        self.ctx
            .step(name, async {
                let session = self.ctx.session;
                let input = error.sample_input();
                if !input.is_empty() {
                    session.fill(&self.locators.input_postal_code(), input).await?;
                }
                session
                    .click(&self.locators.button_confirm_postal_code())
                    .await?;

                let message = self.locators.div_postal_code_error_message();
                self.ctx.expect(message.clone()).to_be_visible().await?;
                self.ctx
                    .expect(message)
                    .to_contain_text(error.message(self.locale()))
                    .await?;
                self.ctx
                    .expect(self.locators.button_confirm_postal_code())
                    .to_be_in_viewport()
                    .await
            })
            .await
    }

    pub async fn input_no_postal_code(&self) -> Result<()> {
        self.reject_postal_code(PostalCodeError::Missing).await
    }

    pub async fn input_six_digit_postal_code(&self) -> Result<()> {
        self.reject_postal_code(PostalCodeError::TooLong).await
    }

    pub async fn input_text_as_postal_code(&self) -> Result<()> {
        self.reject_postal_code(PostalCodeError::BadFormat).await
    }

    pub async fn select_home_delivery(&self) -> Result<()> {
        self.ctx
            .step("Select Home Delivery", async {
                let session = self.ctx.session;
                session.click(&self.locators.label_home_delivery()).await?;
                session
                    .click(&self.locators.input_radio_home_delivery())
                    .await
            })
            .await
    }

    pub async fn close_address_form(&self) -> Result<()> {
        self.ctx
            .step("Close Address Form", async {
                self.ctx
                    .session
                    .click(&self.locators.button_close_address_form())
                    .await
            })
            .await
    }

    /// Fill the address form and make sure billing uses the same address.
    pub async fn input_shipping_information(&self, info: &ShippingInfo) -> Result<()> {
        self.ctx
            .step("Input Shipping Information", async {
                let session = self.ctx.session;
                let loc = &self.locators;
                session.fill(&loc.input_form_last_name(), &info.last_name).await?;
                session.fill(&loc.input_form_first_name(), &info.first_name).await?;
                session.fill(&loc.input_form_street(), &info.street_name).await?;
                session
                    .fill(&loc.input_form_street_extra(), &info.street_name_extra)
                    .await?;
                session.fill(&loc.input_form_city(), &info.city).await?;
                self.ctx.ensure_checked(&loc.span_same_billing_address()).await
            })
            .await
    }

    /// The postal code typed earlier is carried over, read-only.
    pub async fn check_postal_code_form(&self, postal_code: &str) -> Result<()> {
        self.ctx
            .step("Check Postal Code Form", async {
                let field = self.locators.input_form_postal_code();
                self.ctx.expect(field.clone()).to_be_disabled().await?;
                self.ctx.expect(field).to_have_value(postal_code).await
            })
            .await
    }

    /// The country is fixed to the storefront's locale.
    pub async fn check_country_form(&self) -> Result<()> {
        self.ctx
            .step("Check Country Form", async {
                let field = self.locators.select_form_country();
                self.ctx.expect(field.clone()).to_be_disabled().await?;
                self.ctx
                    .expect(field)
                    .to_have_value(self.locale().tag())
                    .await
            })
            .await
    }

    pub async fn validate_shipping_address(&self) -> Result<()> {
        self.ctx
            .step("Validate Shipping Address", async {
                self.ctx
                    .session
                    .click(&self.locators.button_complete_shipping_form())
                    .await
            })
            .await
    }

    pub async fn input_phone_number(&self, phone_number: &str) -> Result<()> {
        self.ctx
            .step("Input Phone Number", async {
                self.ctx
                    .session
                    .fill(&self.locators.input_phone_number(), phone_number)
                    .await
            })
            .await
    }

    pub async fn validate_shipping_step(&self) -> Result<()> {
        self.ctx
            .step("Validate Shipping Step", async {
                self.ctx
                    .session
                    .click(&self.locators.button_validate_shipping_step())
                    .await
            })
            .await
    }

    pub async fn go_to_billing_information(&self) -> Result<()> {
        self.ctx
            .step("Go to Billing Information", async {
                self.ctx
                    .session
                    .click(&self.locators.span_complete_form())
                    .await
            })
            .await
    }

    pub async fn complete_billing_information(&self, info: &BillingInfo) -> Result<()> {
        self.ctx
            .step("Complete Billing Information", async {
                let session = self.ctx.session;
                session
                    .fill(&self.locators.input_form_birth_date(), &info.birth_date)
                    .await?;
                session
                    .fill(&self.locators.input_form_email(), &info.email)
                    .await
            })
            .await
    }

    pub async fn validate_billing_information(&self) -> Result<()> {
        self.ctx
            .step("Validate Billing Information", async {
                self.ctx
                    .session
                    .click(&self.locators.button_complete_billing_form())
                    .await
            })
            .await
    }

    /// Keep the address as typed when the storefront proposes a correction.
    pub async fn validate_original_address(&self) -> Result<()> {
        self.ctx
            .step("Validate Original Address", async {
                self.ctx
                    .expect(self.locators.input_original_address())
                    .to_be_checked()
                    .await?;
                self.ctx
                    .session
                    .click(&self.locators.button_validate_address())
                    .await
            })
            .await
    }

    pub async fn validate_loyalty_step(&self) -> Result<()> {
        self.ctx
            .step("Validate Loyalty Step", async {
                self.ctx
                    .session
                    .click(&self.locators.button_validate_loyalty_step())
                    .await
            })
            .await
    }

    async fn select_payment_option(&self, method: PaymentMethod) -> Result<()> {
        self.ctx
            .session
            .click(&self.locators.input_payment_option(method))
            .await
    }

    async fn expect_label(&self, method: PaymentMethod, text: TextMatch) -> Result<()> {
        self.ctx
            .expect(self.locators.label_payment_option(method))
            .to_have_text(text)
            .await
    }

    async fn expect_usable(&self, field: Locator) -> Result<()> {
        self.ctx.expect(field.clone()).to_be_in_viewport().await?;
        self.ctx.expect(field).to_be_editable().await
    }

    /// Card number and CVV live in provider iframes; the expiry date does not.
    pub async fn verify_credit_card_form(&self) -> Result<()> {
        self.ctx
            .step("Verify Credit Card Form", async {
                let method = PaymentMethod::CreditCard;
                let loc = &self.locators;
                let radio = loc.input_payment_option(method);
                self.ctx.session.scroll_into_view(&radio).await?;
                self.ctx.session.click(&radio).await?;

                let label = loc.label_payment_option(method);
                self.ctx.expect(label).to_be_visible().await?;
                let expected = self.locale().texts().credit_card_label;
                self.expect_label(method, TextMatch::Contains(expected.into()))
                    .await?;

                for field in [loc.input_credit_card_number(), loc.input_credit_card_expiry_date()] {
                    self.ctx.expect(field.clone()).to_be_visible().await?;
                    self.ctx.expect(field).to_be_editable().await?;
                }
                self.expect_usable(loc.input_credit_card_cvv()).await
            })
            .await
    }

    pub async fn verify_google_pay_form(&self) -> Result<()> {
        self.ctx
            .step("Verify Google Pay Form", async {
                let method = PaymentMethod::GooglePay;
                self.select_payment_option(method).await?;
                self.expect_label(method, "Google Pay".into()).await?;
                self.ctx
                    .expect(self.locators.button_google_pay())
                    .to_be_in_viewport()
                    .await
            })
            .await
    }

    pub async fn verify_paypal_form(&self) -> Result<()> {
        self.ctx
            .step("Verify PayPal Form", async {
                let method = PaymentMethod::Paypal;
                self.select_payment_option(method).await?;
                self.ctx
                    .expect(self.locators.label_payment_option(method))
                    .to_contain_text("Paypal")
                    .await?;
                self.ctx
                    .expect(self.locators.button_paypal())
                    .to_be_in_viewport()
                    .await
            })
            .await
    }

    pub async fn verify_illicado_form(&self) -> Result<()> {
        self.ctx
            .step("Verify Illicado Form", async {
                let method = PaymentMethod::Illicado;
                self.select_payment_option(method).await?;
                self.expect_label(method, "Illicado".into()).await?;
                self.ctx
                    .expect(self.locators.button_illicado())
                    .to_be_in_viewport()
                    .await
            })
            .await
    }

    pub async fn verify_gift_card_form(&self) -> Result<()> {
        self.ctx
            .step("Verify Gift Card Form", async {
                let method = PaymentMethod::GiftCard;
                self.select_payment_option(method).await?;
                self.expect_label(method, "Carte cadeau Kiabi".into()).await?;
                self.ctx
                    .expect(self.locators.button_gift_card())
                    .to_be_in_viewport()
                    .await
            })
            .await
    }

    pub async fn verify_voucher_form(&self) -> Result<()> {
        self.ctx
            .step("Verify Voucher Form", async {
                let method = PaymentMethod::Voucher;
                self.select_payment_option(method).await?;
                self.expect_label(method, "Bon d'achat".into()).await?;
                self.expect_usable(self.locators.input_voucher_number()).await?;
                self.ctx
                    .expect(self.locators.button_voucher())
                    .to_be_in_viewport()
                    .await
            })
            .await
    }

    /// Oney is only offered above `threshold`: above it the option must be
    /// enabled and gets selected; at or below it must be disabled and is not
    /// touched.
    pub async fn verify_oney_form(&self, cart_amount: i64, threshold: i64) -> Result<OneyCheck> {
        self.ctx
            .step("Verify Oney Form", async {
                let method = PaymentMethod::Oney;
                self.expect_label(method, "Oney".into()).await?;
                let radio = self.locators.input_payment_option(method);
                if cart_amount > threshold {
                    self.ctx.expect(radio.clone()).to_be_enabled().await?;
                    self.ctx.session.click(&radio).await?;
                    info!("Oney selected for cart amount {}", cart_amount);
                    Ok(OneyCheck::Selected)
                } else {
                    self.ctx.expect(radio).to_be_disabled().await?;
                    info!(
                        "Oney unavailable for cart amount {} (threshold {})",
                        cart_amount, threshold
                    );
                    Ok(OneyCheck::Unavailable)
                }
            })
            .await
    }

    pub async fn verify_payment_on_delivery_form(&self) -> Result<()> {
        self.ctx
            .step("Verify Payment on Delivery Form", async {
                let method = PaymentMethod::PaymentOnDelivery;
                self.select_payment_option(method).await?;
                self.expect_label(method, "Contra reembolso".into()).await?;
                self.ctx
                    .expect(self.locators.button_payment_on_delivery())
                    .to_be_in_viewport()
                    .await
            })
            .await
    }

    pub async fn verify_refund_voucher_form(&self) -> Result<()> {
        self.ctx
            .step("Verify Refund Voucher Form", async {
                let method = PaymentMethod::RefundVoucher;
                self.select_payment_option(method).await?;
                self.expect_label(method, "Bono reembolso".into()).await?;
                self.expect_usable(self.locators.input_refund_voucher_number())
                    .await?;
                self.ctx
                    .expect(self.locators.button_refund_voucher())
                    .to_be_in_viewport()
                    .await
            })
            .await
    }

    /// Verify one payment method. Oney needs the cart total and threshold;
    /// its outcome is returned.
    pub async fn verify_payment_method(
        &self,
        method: PaymentMethod,
        cart_amount: i64,
        oney_threshold: i64,
    ) -> Result<Option<OneyCheck>> {
        match method {
            PaymentMethod::CreditCard => self.verify_credit_card_form().await?,
            PaymentMethod::GooglePay => self.verify_google_pay_form().await?,
            PaymentMethod::Paypal => self.verify_paypal_form().await?,
            PaymentMethod::Illicado => self.verify_illicado_form().await?,
            PaymentMethod::GiftCard => self.verify_gift_card_form().await?,
            PaymentMethod::Voucher => self.verify_voucher_form().await?,
            PaymentMethod::PaymentOnDelivery => self.verify_payment_on_delivery_form().await?,
            PaymentMethod::RefundVoucher => self.verify_refund_voucher_form().await?,
            PaymentMethod::Oney => {
                return self
                    .verify_oney_form(cart_amount, oney_threshold)
                    .await
                    .map(Some)
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fake::{Call, FakeElement, FakeSession};
    use crate::session::ElementState;
    use crate::step::StepRecorder;
    use crate::Error;
    use std::time::Duration;

    fn ctx<'a>(session: &'a FakeSession, steps: &'a StepRecorder) -> PageContext<'a, FakeSession> {
        PageContext::new(session, steps).with_timeout(Duration::from_millis(30))
    }

    #[test]
    fn localized_ids_use_only_the_bound_tag() {
        for locale in Locale::ALL {
            let loc = CheckoutLocators::new(locale);
            for other in Locale::ALL.into_iter().filter(|l| *l != locale) {
                for locator in loc.localized_locators() {
                    assert!(locator.references(locale.tag()), "{locator}");
                    assert!(
                        !locator.references(&format!("Form{}_", other.tag())),
                        "{locator} mentions {}",
                        other.tag()
                    );
                }
            }
        }
    }

    #[test]
    fn localized_ids_interpolate_tag() {
        let loc = CheckoutLocators::new(Locale::Es);
        assert_eq!(
            loc.input_form_city(),
            Locator::test_id("homeAddressFormES_input_city")
        );
        assert_eq!(
            loc.button_complete_billing_form(),
            Locator::test_id("billingFormES_button_validate")
        );
    }

    #[test]
    fn payment_locators_use_option_code() {
        let loc = CheckoutLocators::new(Locale::Fr);
        assert_eq!(
            loc.label_payment_option(PaymentMethod::Oney),
            Locator::test_id("paymentStepPayline_radio_paymentOptions_PNF")
        );
        assert!(loc
            .input_payment_option(PaymentMethod::RefundVoucher)
            .references(r#"[value="REFUND_VOUCHER"]"#));
    }

    #[test]
    fn card_fields_are_frame_scoped() {
        let loc = CheckoutLocators::new(Locale::Fr);
        let number = loc.input_credit_card_number();
        assert_eq!(
            number.frames(),
            [r#"iframe[id*="cardNumber"][src*="payment.payline.com"]"#]
        );
        assert!(loc.input_credit_card_cvv().is_framed());
        assert!(!loc.input_credit_card_expiry_date().is_framed());
    }

    #[tokio::test]
    async fn shipping_information_fills_in_order_and_checks_once() {
        let session = FakeSession::permissive();
        let steps = StepRecorder::new();
        let checkout = CheckoutPage::new(ctx(&session, &steps), Locale::Fr);
        let info = ShippingInfo {
            last_name: "Martin".into(),
            first_name: "Claire".into(),
            street_name: "10 rue de Lille".into(),
            street_name_extra: String::new(),
            city: "Lille".into(),
        };

        checkout.input_shipping_information(&info).await.unwrap();

        let loc = checkout.locators();
        let calls = session.calls();
        assert_eq!(calls.len(), 6);
        assert_eq!(
            calls[0],
            Call::Fill(loc.input_form_last_name().to_string(), "Martin".into())
        );
        assert_eq!(
            calls[4],
            Call::Fill(loc.input_form_city().to_string(), "Lille".into())
        );
        assert_eq!(
            calls[5],
            Call::Check(loc.span_same_billing_address().to_string())
        );
    }

    #[tokio::test]
    async fn country_form_expects_locale_value() {
        let loc = CheckoutLocators::new(Locale::Es);
        let disabled = ElementState {
            enabled: false,
            ..ElementState::interactive()
        };
        let session = FakeSession::new().with(
            loc.select_form_country(),
            FakeElement::default().with_state(disabled).with_value("ES"),
        );
        let steps = StepRecorder::new();
        let checkout = CheckoutPage::new(ctx(&session, &steps), Locale::Es);

        checkout.check_country_form().await.unwrap();
    }

    #[tokio::test]
    async fn postal_code_form_must_be_disabled() {
        let loc = CheckoutLocators::new(Locale::Fr);
        let session = FakeSession::new().with(
            loc.input_form_postal_code(),
            FakeElement::default().with_value("59000"),
        );
        let steps = StepRecorder::new();
        let checkout = CheckoutPage::new(ctx(&session, &steps), Locale::Fr);

        let err = checkout.check_postal_code_form("59000").await.unwrap_err();
        assert!(matches!(err, Error::AssertionFailed { ref expected, .. } if expected == "not enabled"));
    }

    #[tokio::test]
    async fn missing_postal_code_shows_locale_message() {
        let loc = CheckoutLocators::new(Locale::Es);
        let session = FakeSession::new()
            .with(loc.button_confirm_postal_code(), FakeElement::default())
            .with(loc.input_postal_code(), FakeElement::default())
            .with(
                loc.div_postal_code_error_message(),
                FakeElement::text("Se requiere el código postal"),
            );
        let steps = StepRecorder::new();
        let checkout = CheckoutPage::new(ctx(&session, &steps), Locale::Es);

        checkout.input_no_postal_code().await.unwrap();
        assert_eq!(
            session.calls(),
            vec![Call::Click(loc.button_confirm_postal_code().to_string())]
        );

        // A French message fails the Spanish check.
        let session = FakeSession::new()
            .with(loc.button_confirm_postal_code(), FakeElement::default())
            .with(loc.input_postal_code(), FakeElement::default())
            .with(
                loc.div_postal_code_error_message(),
                FakeElement::text("Le code postal est requis"),
            );
        let checkout = CheckoutPage::new(ctx(&session, &steps), Locale::Es);
        assert!(checkout.input_no_postal_code().await.is_err());
    }

    #[tokio::test]
    async fn too_long_postal_code_is_filled_first() {
        let loc = CheckoutLocators::new(Locale::Fr);
        let session = FakeSession::permissive().with(
            loc.div_postal_code_error_message(),
            FakeElement::text("Le code postal peut comporter maximum 5 caractères"),
        );
        let steps = StepRecorder::new();
        let checkout = CheckoutPage::new(ctx(&session, &steps), Locale::Fr);

        checkout.input_six_digit_postal_code().await.unwrap();
        assert_eq!(
            session.calls()[0],
            Call::Fill(loc.input_postal_code().to_string(), "750012".into())
        );
    }

    fn oney_session(loc: &CheckoutLocators, enabled: bool) -> FakeSession {
        let state = ElementState {
            enabled,
            ..ElementState::interactive()
        };
        FakeSession::new()
            .with(
                loc.label_payment_option(PaymentMethod::Oney),
                FakeElement::text("Oney"),
            )
            .with(
                loc.input_payment_option(PaymentMethod::Oney),
                FakeElement::default().with_state(state),
            )
    }

    #[tokio::test]
    async fn oney_above_threshold_is_selected() {
        let loc = CheckoutLocators::new(Locale::Fr);
        let session = oney_session(&loc, true);
        let steps = StepRecorder::new();
        let checkout = CheckoutPage::new(ctx(&session, &steps), Locale::Fr);

        let outcome = checkout.verify_oney_form(150, 100).await.unwrap();
        assert_eq!(outcome, OneyCheck::Selected);
        assert!(session.was_clicked(&loc.input_payment_option(PaymentMethod::Oney)));
    }

    #[tokio::test]
    async fn oney_at_or_below_threshold_is_left_alone() {
        let loc = CheckoutLocators::new(Locale::Fr);
        for amount in [80, 100] {
            let session = oney_session(&loc, false);
            let steps = StepRecorder::new();
            let checkout = CheckoutPage::new(ctx(&session, &steps), Locale::Fr);

            let outcome = checkout.verify_oney_form(amount, 100).await.unwrap();
            assert_eq!(outcome, OneyCheck::Unavailable);
            assert!(session.calls().is_empty(), "{amount}");
        }
    }

    #[tokio::test]
    async fn oney_enabled_at_low_amount_fails() {
        let loc = CheckoutLocators::new(Locale::Fr);
        let session = oney_session(&loc, true);
        let steps = StepRecorder::new();
        let checkout = CheckoutPage::new(ctx(&session, &steps), Locale::Fr);

        assert!(checkout.verify_oney_form(80, 100).await.is_err());
        assert!(session.calls().is_empty());
    }

    #[tokio::test]
    async fn credit_card_needs_the_provider_frames() {
        let loc = CheckoutLocators::new(Locale::Fr);
        let session = FakeSession::permissive().with(
            loc.label_payment_option(PaymentMethod::CreditCard),
            FakeElement::text("Carte bancaire"),
        );
        let steps = StepRecorder::new();
        let checkout = CheckoutPage::new(ctx(&session, &steps), Locale::Fr);

        let err = checkout.verify_credit_card_form().await.unwrap_err();
        assert!(matches!(err, Error::FrameNotFound(ref f) if f.contains("cardNumber")));

        let session = FakeSession::permissive()
            .with_frame(loc.iframe_credit_card_number().selectors()[0].as_str())
            .with_frame(loc.iframe_credit_card_cvv().selectors()[0].as_str())
            .with(
                loc.label_payment_option(PaymentMethod::CreditCard),
                FakeElement::text("Carte bancaire"),
            );
        let checkout = CheckoutPage::new(ctx(&session, &steps), Locale::Fr);
        checkout.verify_credit_card_form().await.unwrap();
    }

    #[tokio::test]
    async fn wrong_label_fails_verification() {
        let loc = CheckoutLocators::new(Locale::Es);
        let session = FakeSession::permissive().with(
            loc.label_payment_option(PaymentMethod::PaymentOnDelivery),
            FakeElement::text("Pago en tienda"),
        );
        let steps = StepRecorder::new();
        let checkout = CheckoutPage::new(ctx(&session, &steps), Locale::Es);

        let err = checkout.verify_payment_on_delivery_form().await.unwrap_err();
        assert!(matches!(err, Error::AssertionFailed { ref actual, .. } if actual == "text 'Pago en tienda'"));
    }
}
