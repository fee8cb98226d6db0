use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned to modules without an explicit grouping
pub const DEFAULT_CATEGORY: &str = "Other";

/// Pricing model of a billable module
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PricingType {
    Flat,
    Tiered,
    /// Anything the configuration named that is neither flat nor tiered
    Unknown(String),
}

impl PricingType {
    pub fn as_str(&self) -> &str {
        match self {
            PricingType::Flat => "flat",
            PricingType::Tiered => "tiered",
            PricingType::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for PricingType {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "flat" => PricingType::Flat,
            "tiered" => PricingType::Tiered,
            _ => PricingType::Unknown(value.trim().to_string()),
        }
    }
}

impl From<String> for PricingType {
    fn from(value: String) -> Self {
        PricingType::from(value.as_str())
    }
}

impl From<PricingType> for String {
    fn from(value: PricingType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PricingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One billable capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub pricing_type: PricingType,
    /// Only meaningful for flat pricing
    #[serde(rename = "unit_price", default, skip_serializing_if = "Option::is_none")]
    pub flat_unit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ModuleDefinition {
    pub fn flat(name: impl Into<String>, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            pricing_type: PricingType::Flat,
            flat_unit_price: Some(unit_price),
            category: None,
        }
    }

    pub fn tiered(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pricing_type: PricingType::Tiered,
            flat_unit_price: None,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Flat unit price with absent or NaN values read as zero
    pub fn effective_flat_price(&self) -> f64 {
        self.flat_unit_price
            .filter(|price| !price.is_nan())
            .unwrap_or(0.0)
    }

    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }
}

/// Threshold or price cell as it appears in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// The cell as a finite number, if it reads as one
    pub fn as_finite(&self) -> Option<f64> {
        let value = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

/// One row of a module's pricing ladder, unvalidated and in supplied order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTierRow {
    pub threshold: RawValue,
    pub price: RawValue,
}

impl RawTierRow {
    pub fn new(threshold: impl Into<RawValue>, price: impl Into<RawValue>) -> Self {
        Self {
            threshold: threshold.into(),
            price: price.into(),
        }
    }
}

/// Cost of one module for one usage quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub module: String,
    pub category: String,
    pub usage: f64,
    pub pricing_type: PricingType,
    /// Marginal price actually charged
    pub unit_price_used: Option<f64>,
    pub cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_type_parsing() {
        assert_eq!(PricingType::from(" Flat "), PricingType::Flat);
        assert_eq!(PricingType::from("TIERED"), PricingType::Tiered);
        assert_eq!(
            PricingType::from("volume"),
            PricingType::Unknown("volume".to_string())
        );
        assert_eq!(String::from(PricingType::Tiered), "tiered");
    }

    #[test]
    fn test_effective_flat_price() {
        let mut module = ModuleDefinition::flat("Expense Manager", 120.0);
        assert_eq!(module.effective_flat_price(), 120.0);

        module.flat_unit_price = Some(f64::NAN);
        assert_eq!(module.effective_flat_price(), 0.0);

        module.flat_unit_price = None;
        assert_eq!(module.effective_flat_price(), 0.0);
    }

    #[test]
    fn test_raw_value_as_finite() {
        assert_eq!(RawValue::from(100.0).as_finite(), Some(100.0));
        assert_eq!(RawValue::from(" 250 ").as_finite(), Some(250.0));
        assert_eq!(RawValue::from("inf").as_finite(), None);
        assert_eq!(RawValue::from("NaN").as_finite(), None);
        assert_eq!(RawValue::from("unlimited").as_finite(), None);
        assert_eq!(RawValue::from(f64::INFINITY).as_finite(), None);
    }

    #[test]
    fn test_module_deserializes_from_toml() {
        let module: ModuleDefinition = toml::from_str(
            r#"
            name = "Booking Manager"
            type = "Flat"
            unit_price = 250.0
            "#,
        )
        .unwrap();

        assert_eq!(module.pricing_type, PricingType::Flat);
        assert_eq!(module.flat_unit_price, Some(250.0));
        assert_eq!(module.category_or_default(), DEFAULT_CATEGORY);
    }
}
