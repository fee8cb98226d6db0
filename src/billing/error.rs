use thiserror::Error;

/// Failures of tier table construction and cost computation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// A tier row's price is not a finite number
    #[error("tier row {row}: price {value:?} is not a finite number")]
    MalformedPrice { row: usize, value: String },

    #[error("module '{module}': usage {usage} is invalid, usage must be non-negative")]
    InvalidUsage { module: String, usage: f64 },

    #[error("module '{module}' uses tiered pricing but no tier table was supplied")]
    MissingTierTable { module: String },

    #[error("module '{module}': unknown pricing type '{pricing_type}'")]
    UnknownPricingType {
        module: String,
        pricing_type: String,
    },
}
