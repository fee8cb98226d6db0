use crate::billing::{ModuleCost, PricingEngine, PricingSnapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// One line of the cost breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub module: String,
    pub category: String,
    pub usage: f64,
    pub pricing_type: String,
    pub unit_price_used: Option<f64>,
    pub cost: Option<f64>,
    /// Set when the module could not be priced
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub cost: f64,
    pub modules: usize,
}

/// Aggregated costs for a whole snapshot
#[derive(Debug, Clone, Serialize)]
pub struct Breakdown {
    pub currency: String,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<BreakdownRow>,
    pub categories: Vec<CategoryTotal>,
    /// Sum over successfully priced modules only
    pub total_cost: f64,
    pub failed_modules: usize,
}

impl Breakdown {
    /// Price every module of `snapshot` and aggregate the results
    pub fn compute(snapshot: &PricingSnapshot, usage: &HashMap<String, f64>) -> Self {
        let results = PricingEngine::new().compute_batch(snapshot, usage);
        Self::from_results(results, &snapshot.currency)
    }

    pub fn from_results(results: Vec<ModuleCost>, currency: &str) -> Self {
        let mut categories: BTreeMap<String, CategoryTotal> = BTreeMap::new();
        let mut total_cost = 0.0;
        let mut failed_modules = 0;

        let rows = results
            .into_iter()
            .map(|item| match item.result {
                Ok(record) => {
                    total_cost += record.cost;
                    let category = categories
                        .entry(record.category.clone())
                        .or_insert_with(|| CategoryTotal {
                            category: record.category.clone(),
                            cost: 0.0,
                            modules: 0,
                        });
                    category.cost += record.cost;
                    category.modules += 1;

                    BreakdownRow {
                        module: record.module,
                        category: record.category,
                        usage: record.usage,
                        pricing_type: record.pricing_type.to_string(),
                        unit_price_used: record.unit_price_used,
                        cost: Some(record.cost),
                        error: None,
                    }
                }
                Err(e) => {
                    failed_modules += 1;
                    BreakdownRow {
                        module: item.module,
                        category: item.category,
                        usage: item.usage,
                        pricing_type: item.pricing_type.to_string(),
                        unit_price_used: None,
                        cost: None,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect();

        Self {
            currency: currency.to_string(),
            generated_at: Utc::now(),
            rows,
            categories: categories.into_values().collect(),
            total_cost,
            failed_modules,
        }
    }

    pub fn failed_rows(&self) -> impl Iterator<Item = &BreakdownRow> {
        self.rows.iter().filter(|row| row.error.is_some())
    }

    pub fn row(&self, module: &str) -> Option<&BreakdownRow> {
        self.rows.iter().find(|row| row.module == module)
    }
}

/// Format a monetary amount with thousands separators and no decimals
pub fn format_amount(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Format a unit price with two decimals, `-` when none applied
pub fn format_unit_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("{:.2}", p),
        None => "-".to_string(),
    }
}

/// Format a usage quantity without a trailing `.0` for whole numbers
pub fn format_usage(usage: f64) -> String {
    if usage.fract() == 0.0 {
        format!("{:.0}", usage)
    } else {
        format!("{}", usage)
    }
}
