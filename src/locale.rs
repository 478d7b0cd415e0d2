//! Storefront locales and the steps that differ between them.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A storefront locale variant.
///
/// Parsed once from configuration and then bound to locator providers and
/// facades for their whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Locale {
    Fr,
    Es,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::Fr, Locale::Es];

    /// Tag interpolated into locale-dependent test ids (`FR`, `ES`).
    pub fn tag(self) -> &'static str {
        match self {
            Locale::Fr => "FR",
            Locale::Es => "ES",
        }
    }

    /// BCP 47 language tag for the browser context.
    pub fn language_tag(self) -> &'static str {
        match self {
            Locale::Fr => "fr-FR",
            Locale::Es => "es-ES",
        }
    }

    /// Steps that only some locales go through.
    pub fn variant(self) -> LocaleVariant {
        match self {
            Locale::Fr => LocaleVariant {
                address_confirmation: AddressConfirmation::OriginalAddress,
                payment_methods: &[
                    PaymentMethod::CreditCard,
                    PaymentMethod::GooglePay,
                    PaymentMethod::Paypal,
                    PaymentMethod::Illicado,
                    PaymentMethod::GiftCard,
                    PaymentMethod::Voucher,
                    PaymentMethod::Oney,
                ],
            },
            Locale::Es => LocaleVariant {
                address_confirmation: AddressConfirmation::None,
                payment_methods: &[
                    PaymentMethod::CreditCard,
                    PaymentMethod::GooglePay,
                    PaymentMethod::Paypal,
                    PaymentMethod::PaymentOnDelivery,
                    PaymentMethod::RefundVoucher,
                ],
            },
        }
    }

    pub fn texts(self) -> &'static LocaleTexts {
        match self {
            Locale::Fr => &FR_TEXTS,
            Locale::Es => &ES_TEXTS,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "FR" | "fr" | "fr-FR" => Ok(Locale::Fr),
            "ES" | "es" | "es-ES" => Ok(Locale::Es),
            other => Err(Error::InvalidLocale(other.to_string())),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.tag().to_string()
    }
}

/// The locale-specific part of the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleVariant {
    /// Extra confirmation after billing validation.
    pub address_confirmation: AddressConfirmation,
    /// Payment methods offered, in display order.
    pub payment_methods: &'static [PaymentMethod],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressConfirmation {
    /// The storefront proposes a corrected address; keep the one typed in.
    OriginalAddress,
    None,
}

/// Payment options shown on the payment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PaymentMethod {
    CreditCard,
    GooglePay,
    Paypal,
    Illicado,
    GiftCard,
    Voucher,
    Oney,
    PaymentOnDelivery,
    RefundVoucher,
}

impl PaymentMethod {
    /// Payment-option code used by the storefront radios and test ids.
    pub fn code(self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CBE",
            PaymentMethod::GooglePay => "GGP",
            PaymentMethod::Paypal => "PAL",
            PaymentMethod::Illicado => "ILI",
            PaymentMethod::GiftCard => "KDO",
            PaymentMethod::Voucher => "BAR",
            PaymentMethod::Oney => "PNF",
            PaymentMethod::PaymentOnDelivery => "CRBT",
            PaymentMethod::RefundVoucher => "REFUND_VOUCHER",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::GooglePay => "Google Pay",
            PaymentMethod::Paypal => "PayPal",
            PaymentMethod::Illicado => "Illicado",
            PaymentMethod::GiftCard => "Gift Card",
            PaymentMethod::Voucher => "Voucher",
            PaymentMethod::Oney => "Oney",
            PaymentMethod::PaymentOnDelivery => "Payment on Delivery",
            PaymentMethod::RefundVoucher => "Refund Voucher",
        }
    }
}

/// User-visible strings that differ per locale.
#[derive(Debug)]
pub struct LocaleTexts {
    pub complete_billing_button: &'static str,
    pub credit_card_label: &'static str,
    pub google_pay_button: &'static str,
    pub postal_code_required: &'static str,
    pub postal_code_too_long: &'static str,
    pub postal_code_bad_format: &'static str,
}

static FR_TEXTS: LocaleTexts = LocaleTexts {
    complete_billing_button: "Compléter",
    credit_card_label: "Carte bancaire",
    google_pay_button: "Acheter avec GPay",
    postal_code_required: "Le code postal est requis",
    postal_code_too_long: "Le code postal peut comporter maximum 5 caractères",
    postal_code_bad_format: "Le format du code postal est incorrect",
};

static ES_TEXTS: LocaleTexts = LocaleTexts {
    complete_billing_button: "Completar",
    credit_card_label: "Tarjeta de crédito",
    google_pay_button: "Comprar con GPay",
    postal_code_required: "Se requiere el código postal",
    postal_code_too_long: "El código postal puede incluir máximo 5 caracteres",
    postal_code_bad_format: "El formato del código postal es incorrecto",
};
