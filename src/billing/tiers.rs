use super::{PricingError, RawTierRow};
use serde::Serialize;

/// A finite pricing band covering `(previous bound, bound]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub bound: f64,
    pub price: f64,
}

/// A raw tier row after its single classification pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassifiedRow {
    FiniteBand(Band),
    /// Row without a numeric threshold; only its price survives
    OpenEnded { price: f64 },
}

impl ClassifiedRow {
    /// Classify one raw row. `index` is only used to locate errors.
    pub fn classify(index: usize, row: &RawTierRow) -> Result<Self, PricingError> {
        let price = row
            .price
            .as_finite()
            .ok_or_else(|| PricingError::MalformedPrice {
                row: index,
                value: row.price.to_string(),
            })?;

        Ok(match row.threshold.as_finite() {
            Some(bound) => ClassifiedRow::FiniteBand(Band { bound, price }),
            None => ClassifiedRow::OpenEnded { price },
        })
    }
}

/// Outcome of allocating usage across a tier table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    pub cost: f64,
    pub unit_price_used: Option<f64>,
}

/// Normalized graduated pricing for one module
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierTable {
    bands: Vec<Band>,
    open_ended_price: Option<f64>,
    #[serde(skip)]
    duplicate_sentinels: usize,
}

impl TierTable {
    /// Build a table from raw rows in any order
    pub fn build(rows: &[RawTierRow]) -> Result<Self, PricingError> {
        let classified = rows
            .iter()
            .enumerate()
            .map(|(index, row)| ClassifiedRow::classify(index, row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_classified(classified))
    }

    pub fn from_classified<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = ClassifiedRow>,
    {
        let mut table = TierTable::default();

        for row in rows {
            match row {
                ClassifiedRow::FiniteBand(band) => table.bands.push(band),
                ClassifiedRow::OpenEnded { price } => {
                    // First sentinel wins
                    if table.open_ended_price.is_none() {
                        table.open_ended_price = Some(price);
                    } else {
                        table.duplicate_sentinels += 1;
                    }
                }
            }
        }

        // Stable: equal bounds keep their input order
        table.bands.sort_by(|a, b| a.bound.total_cmp(&b.bound));
        table
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn open_ended_price(&self) -> Option<f64> {
        self.open_ended_price
    }

    /// Number of sentinel rows ignored because an earlier one already set the open-ended price
    pub fn duplicate_sentinels(&self) -> usize {
        self.duplicate_sentinels
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty() && self.open_ended_price.is_none()
    }

    /// Price for usage beyond the last finite band
    pub fn fallback_price(&self) -> Option<f64> {
        self.open_ended_price
            .or_else(|| self.bands.last().map(|band| band.price))
    }

    /// Bill `usage` progressively across the bands.
    ///
    /// `usage` is expected to be non-negative; validation happens in the engine.
    pub fn allocate(&self, usage: f64) -> Allocation {
        let mut allocation = Allocation {
            cost: 0.0,
            unit_price_used: None,
        };

        if self.is_empty() {
            return allocation;
        }

        let mut remaining = usage;
        let mut previous = 0.0_f64;

        for band in &self.bands {
            if remaining <= 0.0 {
                break;
            }

            let span = band.bound - previous;
            let portion = span.min(remaining).max(0.0);
            if portion > 0.0 {
                allocation.cost += portion * band.price;
                allocation.unit_price_used = Some(band.price);
                remaining -= portion;
            }
            // Usage starts at zero, so a negative bound never widens the next band
            previous = previous.max(band.bound);
        }

        if remaining > 0.0 {
            if let Some(fallback) = self.fallback_price() {
                allocation.cost += remaining * fallback;
                allocation.unit_price_used = Some(fallback);
            }
        }

        allocation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, f64)]) -> TierTable {
        let raw: Vec<RawTierRow> = rows
            .iter()
            .map(|(threshold, price)| RawTierRow::new(*threshold, *price))
            .collect();
        TierTable::build(&raw).unwrap()
    }

    #[test]
    fn test_build_sorts_and_extracts_sentinel() {
        let table = table(&[("200", 8.0), ("inf", 5.0), ("100", 10.0)]);

        assert_eq!(
            table.bands(),
            &[
                Band {
                    bound: 100.0,
                    price: 10.0
                },
                Band {
                    bound: 200.0,
                    price: 8.0
                },
            ]
        );
        assert_eq!(table.open_ended_price(), Some(5.0));
        assert_eq!(table.duplicate_sentinels(), 0);
    }

    #[test]
    fn test_build_empty() {
        let table = TierTable::build(&[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.open_ended_price(), None);
        assert_eq!(table.fallback_price(), None);
    }

    #[test]
    fn test_first_sentinel_wins() {
        let table = table(&[("", 7.0), ("100", 10.0), ("unlimited", 3.0)]);
        assert_eq!(table.open_ended_price(), Some(7.0));
        assert_eq!(table.duplicate_sentinels(), 1);
    }

    #[test]
    fn test_malformed_price_is_an_error() {
        let rows = vec![
            RawTierRow::new("100", 10.0),
            RawTierRow::new("200", "ten"),
        ];
        let err = TierTable::build(&rows).unwrap_err();
        assert_eq!(
            err,
            PricingError::MalformedPrice {
                row: 1,
                value: "ten".to_string()
            }
        );

        // A sentinel row still needs a real price
        let rows = vec![RawTierRow::new("inf", "n/a")];
        assert!(matches!(
            TierTable::build(&rows),
            Err(PricingError::MalformedPrice { row: 0, .. })
        ));
    }

    #[test]
    fn test_allocate_with_sentinel() {
        let table = table(&[("100", 10.0), ("inf", 5.0)]);
        let allocation = table.allocate(150.0);
        assert_eq!(allocation.cost, 1250.0);
        assert_eq!(allocation.unit_price_used, Some(5.0));
    }

    #[test]
    fn test_negative_bound_does_not_widen_next_band() {
        let table = table(&[("-10", 5.0), ("100", 10.0), ("inf", 1.0)]);
        let allocation = table.allocate(200.0);

        // Second band still covers (0, 100], not (-10, 100]
        assert_eq!(allocation.cost, 100.0 * 10.0 + 100.0 * 1.0);
        assert_eq!(allocation.unit_price_used, Some(1.0));
        assert_eq!(table.allocate(100.0).cost, 1000.0);
    }

    #[test]
    fn test_allocate_falls_back_to_last_band() {
        let table = table(&[("50", 4.0), ("150", 3.0)]);
        let allocation = table.allocate(200.0);
        assert_eq!(allocation.cost, 650.0);
        assert_eq!(allocation.unit_price_used, Some(3.0));
    }

    #[test]
    fn test_allocate_inside_first_band() {
        let table = table(&[("100", 10.0), ("200", 8.0)]);
        let allocation = table.allocate(40.0);
        assert_eq!(allocation.cost, 400.0);
        assert_eq!(allocation.unit_price_used, Some(10.0));
    }

    #[test]
    fn test_allocate_exactly_on_boundary() {
        let table = table(&[("100", 10.0), ("200", 8.0), ("inf", 5.0)]);
        let allocation = table.allocate(100.0);
        assert_eq!(allocation.cost, 1000.0);
        // Nothing spilled into the second band
        assert_eq!(allocation.unit_price_used, Some(10.0));
    }

    #[test]
    fn test_allocate_only_sentinel() {
        let table = table(&[("open", 2.5)]);
        let allocation = table.allocate(10.0);
        assert_eq!(allocation.cost, 25.0);
        assert_eq!(allocation.unit_price_used, Some(2.5));
    }

    #[test]
    fn test_duplicate_bounds_are_zero_width() {
        let table = table(&[("100", 10.0), ("100", 99.0), ("200", 8.0)]);
        let allocation = table.allocate(150.0);
        assert_eq!(allocation.cost, 100.0 * 10.0 + 50.0 * 8.0);
        assert_eq!(allocation.unit_price_used, Some(8.0));
    }

    #[test]
    fn test_zero_usage_on_tiers() {
        let table = table(&[("100", 10.0)]);
        let allocation = table.allocate(0.0);
        assert_eq!(allocation.cost, 0.0);
        assert_eq!(allocation.unit_price_used, None);
    }

    #[test]
    fn test_empty_table_charges_nothing() {
        let allocation = TierTable::default().allocate(500.0);
        assert_eq!(allocation.cost, 0.0);
        assert_eq!(allocation.unit_price_used, None);
    }
}
