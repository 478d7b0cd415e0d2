use super::params::{self, Params};
use crate::Result;
use serde::Deserialize;
use std::path::Path;

/// Customer and product data for one locale, read once per scenario.
///
/// Keys are camelCase so existing JSON fixtures load unchanged (JSON is valid
/// YAML).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub search_term: String,
    pub postal_code: String,
    pub shipping_info: ShippingInfo,
    pub phone_number: String,
    pub billing_info: BillingInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub last_name: String,
    pub first_name: String,
    pub street_name: String,
    #[serde(default)]
    pub street_name_extra: String,
    pub city: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingInfo {
    pub birth_date: String,
    pub email: String,
}

impl Fixture {
    /// Load a fixture file, substituting `${var}` from `params` and the file's
    /// own `params:` definitions.
    pub fn load_with_params<P: AsRef<Path>>(path: P, params: &Params) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse_with_params(&content, params)
    }

    pub fn parse_with_params(yaml: &str, params: &Params) -> Result<Self> {
        let value = params::substituted(yaml, params)?;
        Ok(serde_yaml::from_value(value)?)
    }
}
