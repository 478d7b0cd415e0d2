pub mod fixture;
pub mod params;
pub mod schema;

pub use fixture::{BillingInfo, Fixture, ShippingInfo};
pub use params::{ParamDef, Params};
pub use schema::{BrowserConfig, OnFailure, ProjectConfig, RunSettings, SuiteConfig, Viewport};
