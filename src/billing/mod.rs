pub mod calculator;
pub mod error;
pub mod snapshot;
pub mod tiers;
pub mod types;

pub use calculator::{calculate_total, ModuleCost, PricingEngine};
pub use error::PricingError;
pub use snapshot::PricingSnapshot;
pub use tiers::{Allocation, Band, ClassifiedRow, TierTable};
pub use types::{
    CostRecord, ModuleDefinition, PricingType, RawTierRow, RawValue, DEFAULT_CATEGORY,
};
