pub mod defaults;
pub mod error;
pub mod loader;
pub mod overrides;
pub mod types;

pub use defaults::{category_for, DEFAULT_CATEGORIES};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use overrides::{
    parse_assignment, parse_tier_assignment, OverrideError, OverrideManager, PriceOverride,
};
pub use types::*;
