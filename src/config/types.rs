use crate::billing::{ModuleDefinition, RawTierRow, RawValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_CURRENCY: &str = "FCFA";
pub const DEFAULT_MAX_USAGE: u32 = 1000;

/// Pricing catalogue as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Upper bound of the usage range offered by the simulator
    #[serde(default = "default_max_usage")]
    pub max_usage: u32,
    #[serde(default)]
    pub modules: Vec<ModuleDefinition>,
    #[serde(default)]
    pub tiers: Vec<TierEntry>,
    /// Default usage quantities keyed by module name
    #[serde(default)]
    pub usage: BTreeMap<String, f64>,
}

/// One tier row keyed by the module it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierEntry {
    pub module: String,
    pub threshold: RawValue,
    pub price: RawValue,
}

impl TierEntry {
    pub fn new(
        module: impl Into<String>,
        threshold: impl Into<RawValue>,
        price: impl Into<RawValue>,
    ) -> Self {
        Self {
            module: module.into(),
            threshold: threshold.into(),
            price: price.into(),
        }
    }

    pub fn row(&self) -> RawTierRow {
        RawTierRow {
            threshold: self.threshold.clone(),
            price: self.price.clone(),
        }
    }
}

impl PricingConfig {
    /// Tier rows grouped by module, each group in file order
    pub fn tier_rows(&self) -> HashMap<String, Vec<RawTierRow>> {
        let mut grouped: HashMap<String, Vec<RawTierRow>> = HashMap::new();
        for entry in &self.tiers {
            grouped
                .entry(entry.module.clone())
                .or_default()
                .push(entry.row());
        }
        grouped
    }

    pub fn module(&self, name: &str) -> Option<&ModuleDefinition> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Configured usage for every module, zero where unspecified
    pub fn usage_map(&self) -> HashMap<String, f64> {
        self.modules
            .iter()
            .map(|m| {
                let quantity = self.usage.get(&m.name).copied().unwrap_or(0.0);
                (m.name.clone(), quantity)
            })
            .collect()
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_max_usage() -> u32 {
    DEFAULT_MAX_USAGE
}
