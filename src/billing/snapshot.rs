use super::{ModuleDefinition, PricingError, RawTierRow, TierTable};
use std::collections::HashMap;

/// Immutable pricing configuration handed to one computation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingSnapshot {
    pub modules: Vec<ModuleDefinition>,
    /// Raw tier rows keyed by module name
    pub tiers: HashMap<String, Vec<RawTierRow>>,
    pub currency: String,
}

impl PricingSnapshot {
    pub fn new(modules: Vec<ModuleDefinition>, currency: impl Into<String>) -> Self {
        Self {
            modules,
            tiers: HashMap::new(),
            currency: currency.into(),
        }
    }

    pub fn with_tiers(mut self, module: impl Into<String>, rows: Vec<RawTierRow>) -> Self {
        self.tiers.insert(module.into(), rows);
        self
    }

    pub fn module(&self, name: &str) -> Option<&ModuleDefinition> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn tier_rows(&self, module: &str) -> &[RawTierRow] {
        self.tiers.get(module).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Build a fresh tier table for a module. A module without rows gets an empty table.
    pub fn tier_table(&self, module: &str) -> Result<TierTable, PricingError> {
        TierTable::build(self.tier_rows(module))
    }
}
