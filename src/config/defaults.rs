use super::types::{PricingConfig, TierEntry, DEFAULT_CURRENCY, DEFAULT_MAX_USAGE};
use crate::billing::{ModuleDefinition, DEFAULT_CATEGORY};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

/// Built-in display grouping for the stock transport-operator modules
pub static DEFAULT_CATEGORIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Booking Manager", "Booking & Sales"),
        ("Online Booking Manager", "Booking & Sales"),
        ("Parcel Manager", "Cargo & Parcel"),
        ("Expense Manager", "Finance"),
        ("Customer Communication Manager", "Customer Service"),
        ("Customer Support Personnel (External)", "Customer Service"),
        ("Maintenance Manager", "Fleet Operations"),
        ("Performance Optimization Tools", "Optimization"),
        ("HR Configuration Manager", "HR & Admin"),
        ("Fleet Configuration Manager", "Fleet Operations"),
        ("Procurement Manager", "Finance"),
        ("Accounting and Tax Manager", "Finance"),
    ])
});

/// Category for a module name, `Other` when it is not a stock module
pub fn category_for(module: &str) -> &'static str {
    DEFAULT_CATEGORIES
        .get(module)
        .copied()
        .unwrap_or(DEFAULT_CATEGORY)
}

impl Default for PricingConfig {
    fn default() -> Self {
        let modules = vec![
            ModuleDefinition::flat("Booking Manager", 250.0),
            ModuleDefinition::tiered("Online Booking Manager"),
            ModuleDefinition::tiered("Parcel Manager"),
            ModuleDefinition::flat("Expense Manager", 100.0),
            ModuleDefinition::tiered("Customer Communication Manager"),
            ModuleDefinition::flat("Customer Support Personnel (External)", 1500.0),
            ModuleDefinition::flat("Maintenance Manager", 200.0),
            ModuleDefinition::flat("Performance Optimization Tools", 500.0),
            ModuleDefinition::flat("HR Configuration Manager", 150.0),
            ModuleDefinition::tiered("Fleet Configuration Manager"),
            ModuleDefinition::flat("Procurement Manager", 120.0),
            ModuleDefinition::flat("Accounting and Tax Manager", 300.0),
        ]
        .into_iter()
        .map(|m| {
            let category = category_for(&m.name);
            m.with_category(category)
        })
        .collect();

        let tiers = vec![
            TierEntry::new("Online Booking Manager", 100.0, 50.0),
            TierEntry::new("Online Booking Manager", 500.0, 40.0),
            TierEntry::new("Online Booking Manager", "inf", 30.0),
            TierEntry::new("Parcel Manager", 200.0, 75.0),
            TierEntry::new("Parcel Manager", 1000.0, 60.0),
            TierEntry::new("Parcel Manager", "Unlimited", 45.0),
            TierEntry::new("Customer Communication Manager", 500.0, 15.0),
            TierEntry::new("Customer Communication Manager", "inf", 10.0),
            TierEntry::new("Fleet Configuration Manager", 10.0, 5000.0),
            TierEntry::new("Fleet Configuration Manager", 50.0, 4000.0),
        ];

        PricingConfig {
            currency: DEFAULT_CURRENCY.to_string(),
            max_usage: DEFAULT_MAX_USAGE,
            modules,
            tiers,
            usage: BTreeMap::new(),
        }
    }
}
