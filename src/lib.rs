//! # storefront-e2e
//!
//! Page-object browser checks for a storefront purchase funnel: search, product,
//! cart, checkout and payment-method verification, per locale.
//!
//! Pages are split in two layers. A `*Locators` provider turns a logical element
//! name into a deferred [`Locator`] descriptor; a `*Page` facade composes those
//! descriptors into named, reportable operations. Both sit on top of a
//! [`Session`], the browser capability the scenario owns.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use storefront_e2e::{Params, Runner, SuiteConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> storefront_e2e::Result<()> {
//! let config = SuiteConfig::load_with_params("configs/suite.yaml", &Params::new())?;
//! let result = Runner::new(config, "configs").run().await?;
//! println!("Success: {}", result.success());
//! # Ok(())
//! # }
//! ```

mod config;
pub mod expect;
pub mod locale;
pub mod locator;
pub mod pages;
mod runner;
pub mod scenario;
pub mod session;
pub mod step;
pub mod text;

pub use config::{
    BillingInfo, BrowserConfig, Fixture, OnFailure, ParamDef, Params, ProjectConfig,
    RunSettings, ShippingInfo, SuiteConfig, Viewport,
};
pub use expect::Expectation;
pub use locale::{AddressConfirmation, Locale, LocaleVariant, PaymentMethod};
pub use locator::{FrameLocator, Locator, NameMatch, Query};
pub use runner::{ProjectResult, Runner, SuiteResult};
pub use session::{EokaSession, ElementState, Session, FRAME_ACCESS_ARGS};
pub use step::{StepRecorder, StepReport, StepStatus};
pub use text::TextMatch;

/// Result type for storefront-e2e operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a suite or driving a scenario.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("invalid locale '{0}', expected FR or ES")]
    InvalidLocale(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("frame not found: {0}")]
    FrameNotFound(String),

    #[error("element not actionable: {0}")]
    NotActionable(String),

    #[error("no content for {0}")]
    ContentAbsent(String),

    #[error("cannot parse {field} from '{value}'")]
    Parse { field: String, value: String },

    #[error("assertion failed on {locator}: expected {expected}, got {actual}")]
    AssertionFailed {
        locator: String,
        expected: String,
        actual: String,
    },

    #[error("{} soft assertion(s) failed: {}", .0.len(), .0.join("; "))]
    SoftAssertions(Vec<String>),

    #[error("cart amount {last} still not above {target} after {increments} quantity increase(s)")]
    ThresholdUnreachable {
        target: i64,
        last: i64,
        increments: u32,
    },
}
