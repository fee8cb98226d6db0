use crate::billing::{
    CostRecord, ModuleDefinition, PricingError, PricingSnapshot, PricingType, TierTable,
};
use rayon::prelude::*;
use std::collections::HashMap;

/// Calculate cost for a flat-priced quantity
pub fn calculate_flat_cost(usage: f64, unit_price: f64) -> f64 {
    usage * unit_price
}

/// Result of pricing one module inside a batch
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleCost {
    pub module: String,
    pub category: String,
    pub usage: f64,
    pub pricing_type: PricingType,
    pub result: Result<CostRecord, PricingError>,
}

impl ModuleCost {
    pub fn cost(&self) -> Option<f64> {
        self.result.as_ref().ok().map(|record| record.cost)
    }
}

/// Stateless cost calculator for flat and tiered modules
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine;

impl PricingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Price `usage` units of `module`.
    ///
    /// Tiered modules need their `TierTable`; flat modules ignore it.
    pub fn compute(
        &self,
        module: &ModuleDefinition,
        usage: f64,
        tier_table: Option<&TierTable>,
    ) -> Result<CostRecord, PricingError> {
        if !usage.is_finite() || usage < 0.0 {
            return Err(PricingError::InvalidUsage {
                module: module.name.clone(),
                usage,
            });
        }

        let (unit_price_used, cost) = match &module.pricing_type {
            PricingType::Flat => {
                let unit_price = module.effective_flat_price();
                (Some(unit_price), calculate_flat_cost(usage, unit_price))
            }
            PricingType::Tiered => {
                let table = tier_table.ok_or_else(|| PricingError::MissingTierTable {
                    module: module.name.clone(),
                })?;
                let allocation = table.allocate(usage);
                (allocation.unit_price_used, allocation.cost)
            }
            PricingType::Unknown(raw) => {
                return Err(PricingError::UnknownPricingType {
                    module: module.name.clone(),
                    pricing_type: raw.clone(),
                })
            }
        };

        Ok(CostRecord {
            module: module.name.clone(),
            category: module.category_or_default().to_string(),
            usage,
            pricing_type: module.pricing_type.clone(),
            unit_price_used,
            cost,
        })
    }

    /// Price one module of a snapshot, building its tier table on the way
    pub fn compute_in_snapshot(
        &self,
        snapshot: &PricingSnapshot,
        module: &ModuleDefinition,
        usage: f64,
    ) -> Result<CostRecord, PricingError> {
        let table = match module.pricing_type {
            PricingType::Tiered => Some(snapshot.tier_table(&module.name)?),
            _ => None,
        };
        self.compute(module, usage, table.as_ref())
    }

    /// Price every module of a snapshot in parallel.
    ///
    /// Modules missing from `usage` are priced at zero. Results keep the
    /// snapshot's module order and one failure never affects the others.
    pub fn compute_batch(
        &self,
        snapshot: &PricingSnapshot,
        usage: &HashMap<String, f64>,
    ) -> Vec<ModuleCost> {
        snapshot
            .modules
            .par_iter()
            .map(|module| {
                let quantity = usage.get(&module.name).copied().unwrap_or(0.0);
                ModuleCost {
                    module: module.name.clone(),
                    category: module.category_or_default().to_string(),
                    usage: quantity,
                    pricing_type: module.pricing_type.clone(),
                    result: self.compute_in_snapshot(snapshot, module, quantity),
                }
            })
            .collect()
    }
}

/// Sum of all successfully priced modules
pub fn calculate_total(results: &[ModuleCost]) -> f64 {
    results.iter().filter_map(ModuleCost::cost).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::RawTierRow;
    use proptest::prelude::*;

    fn tiered_table(rows: &[(&str, f64)]) -> TierTable {
        let raw: Vec<RawTierRow> = rows
            .iter()
            .map(|(threshold, price)| RawTierRow::new(*threshold, *price))
            .collect();
        TierTable::build(&raw).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_flat_module_cost() {
        let engine = PricingEngine::new();
        let module = ModuleDefinition::flat("Booking Manager", 250.0);

        let record = engine.compute(&module, 40.0, None).unwrap();
        assert_eq!(record.cost, 10000.0);
        assert_eq!(record.unit_price_used, Some(250.0));
        assert_eq!(record.pricing_type, PricingType::Flat);
    }

    #[test]
    fn test_flat_module_without_price() {
        let engine = PricingEngine::new();
        let mut module = ModuleDefinition::flat("HR Configuration Manager", 0.0);
        module.flat_unit_price = None;

        let record = engine.compute(&module, 12.0, None).unwrap();
        assert_eq!(record.cost, 0.0);
        assert_eq!(record.unit_price_used, Some(0.0));
    }

    #[test]
    fn test_tiered_module_cost() {
        let engine = PricingEngine::new();
        let module = ModuleDefinition::tiered("Parcel Manager");
        let table = tiered_table(&[("100", 10.0), ("inf", 5.0)]);

        let record = engine.compute(&module, 150.0, Some(&table)).unwrap();
        assert_eq!(record.cost, 1250.0);
        assert_eq!(record.unit_price_used, Some(5.0));
    }

    #[test]
    fn test_tiered_unsorted_matches_sorted() {
        let engine = PricingEngine::new();
        let module = ModuleDefinition::tiered("Parcel Manager");
        let unsorted = tiered_table(&[("200", 8.0), ("100", 10.0)]);
        let sorted = tiered_table(&[("100", 10.0), ("200", 8.0)]);

        for usage in [0.0, 50.0, 100.0, 150.0, 200.0, 350.0] {
            assert_eq!(
                engine.compute(&module, usage, Some(&unsorted)),
                engine.compute(&module, usage, Some(&sorted))
            );
        }
    }

    #[test]
    fn test_zero_usage_costs_nothing() {
        let engine = PricingEngine::new();
        let flat = ModuleDefinition::flat("Expense Manager", 75.0);
        let tiered = ModuleDefinition::tiered("Parcel Manager");
        let table = tiered_table(&[("100", 10.0)]);

        assert_eq!(engine.compute(&flat, 0.0, None).unwrap().cost, 0.0);
        let record = engine.compute(&tiered, 0.0, Some(&table)).unwrap();
        assert_eq!(record.cost, 0.0);
        assert_eq!(record.unit_price_used, None);
    }

    #[test]
    fn test_negative_usage_rejected() {
        let engine = PricingEngine::new();
        let module = ModuleDefinition::tiered("Parcel Manager");
        let table = tiered_table(&[("100", 10.0)]);

        let err = engine.compute(&module, -5.0, Some(&table)).unwrap_err();
        assert_eq!(
            err,
            PricingError::InvalidUsage {
                module: "Parcel Manager".to_string(),
                usage: -5.0
            }
        );
        assert!(matches!(
            engine.compute(&module, f64::NAN, Some(&table)),
            Err(PricingError::InvalidUsage { .. })
        ));
        assert!(matches!(
            engine.compute(&module, f64::INFINITY, Some(&table)),
            Err(PricingError::InvalidUsage { .. })
        ));
    }

    #[test]
    fn test_missing_tier_table() {
        let engine = PricingEngine::new();
        let module = ModuleDefinition::tiered("Parcel Manager");
        assert!(matches!(
            engine.compute(&module, 10.0, None),
            Err(PricingError::MissingTierTable { .. })
        ));
    }

    #[test]
    fn test_unknown_pricing_type() {
        let engine = PricingEngine::new();
        let mut module = ModuleDefinition::flat("Maintenance Manager", 10.0);
        module.pricing_type = PricingType::from("volume");

        let err = engine.compute(&module, 10.0, None).unwrap_err();
        assert_eq!(
            err,
            PricingError::UnknownPricingType {
                module: "Maintenance Manager".to_string(),
                pricing_type: "volume".to_string()
            }
        );
    }

    #[test]
    fn test_batch_isolates_failures() {
        let engine = PricingEngine::new();
        let snapshot = PricingSnapshot::new(
            vec![
                ModuleDefinition::flat("Booking Manager", 250.0).with_category("Booking & Sales"),
                ModuleDefinition::tiered("Parcel Manager"),
                ModuleDefinition::tiered("Broken Module"),
                ModuleDefinition::tiered("Unpriced Module"),
            ],
            "FCFA",
        )
        .with_tiers(
            "Parcel Manager",
            vec![RawTierRow::new(50.0, 4.0), RawTierRow::new(150.0, 3.0)],
        )
        .with_tiers("Broken Module", vec![RawTierRow::new(10.0, "abc")]);

        let usage = HashMap::from([
            ("Booking Manager".to_string(), 40.0),
            ("Parcel Manager".to_string(), 200.0),
            ("Broken Module".to_string(), 5.0),
        ]);

        let results = engine.compute_batch(&snapshot, &usage);
        let names: Vec<&str> = results.iter().map(|r| r.module.as_str()).collect();
        assert_eq!(
            names,
            ["Booking Manager", "Parcel Manager", "Broken Module", "Unpriced Module"]
        );

        assert_eq!(results[0].cost(), Some(10000.0));
        assert_eq!(results[0].category, "Booking & Sales");
        assert_eq!(results[1].cost(), Some(650.0));
        assert_eq!(results[1].category, "Other");
        assert!(matches!(
            results[2].result,
            Err(PricingError::MalformedPrice { row: 0, .. })
        ));
        // No rows and no usage: empty table, nothing charged
        assert_eq!(results[3].usage, 0.0);
        assert_eq!(results[3].cost(), Some(0.0));

        assert_eq!(calculate_total(&results), 10650.0);
    }

    fn arb_table() -> impl Strategy<Value = TierTable> {
        (
            prop::collection::btree_map(1u32..1_000, 0u32..100, 0..6),
            prop::option::of(0u32..100),
        )
            .prop_map(|(bands, open_ended)| {
                let mut rows: Vec<RawTierRow> = bands
                    .into_iter()
                    .map(|(bound, price)| RawTierRow::new(bound as f64, price as f64))
                    .collect();
                if let Some(price) = open_ended {
                    rows.push(RawTierRow::new("inf", price as f64));
                }
                TierTable::build(&rows).unwrap()
            })
    }

    proptest! {
        #[test]
        fn prop_flat_cost_is_linear(u1 in 0.0..1e6f64, u2 in 0.0..1e6f64, price in 0.0..1e4f64) {
            let engine = PricingEngine::new();
            let module = ModuleDefinition::flat("Flat", price);
            let a = engine.compute(&module, u1, None).unwrap().cost;
            let b = engine.compute(&module, u2, None).unwrap().cost;
            let sum = engine.compute(&module, u1 + u2, None).unwrap().cost;
            prop_assert!(close(sum, a + b));
        }

        #[test]
        fn prop_tiered_cost_is_monotonic(table in arb_table(), u1 in 0.0..2_000f64, delta in 0.0..2_000f64) {
            let low = table.allocate(u1).cost;
            let high = table.allocate(u1 + delta).cost;
            prop_assert!(low <= high + 1e-9 * high.abs().max(1.0));
        }

        #[test]
        fn prop_tiered_cost_is_continuous(table in arb_table(), usage in 0.0..2_000f64) {
            let max_price = table
                .bands()
                .iter()
                .map(|band| band.price)
                .chain(table.open_ended_price())
                .fold(0.0, f64::max);
            let epsilon = 1e-3;
            let jump = table.allocate(usage + epsilon).cost - table.allocate(usage).cost;
            prop_assert!(jump <= epsilon * max_price + 1e-6);
        }

        #[test]
        fn prop_row_order_does_not_matter(
            bands in prop::collection::btree_map(1u32..1_000, 0u32..100, 0..6),
            usage in 0.0..2_000f64,
        ) {
            let rows: Vec<RawTierRow> = bands
                .into_iter()
                .map(|(bound, price)| RawTierRow::new(bound as f64, price as f64))
                .collect();
            let mut reversed = rows.clone();
            reversed.reverse();

            let forward = TierTable::build(&rows).unwrap().allocate(usage);
            let backward = TierTable::build(&reversed).unwrap().allocate(usage);
            prop_assert_eq!(forward, backward);
        }
    }
}
