use tracing::debug;

use crate::config::{PlannerConfig, TravelChargeMode};
use crate::domain::plan::CostEntry;
use crate::domain::types::Catalog;
use crate::error::PlanError;

pub fn travel_surcharge(depot_distance: f64, travel_rate: f64) -> f64 {
    depot_distance * travel_rate
}

/// Blended per-unit cost: sticker price plus surcharges, split across the
/// units in the package, weighted by the container preference.
pub fn unit_cost(price: f64, travel: f64, shipping: f64, unit_count: u32, preference: f64) -> f64 {
    (price + travel + shipping) / unit_count as f64 * preference
}

/// Derive a cost entry for every (vendor, package) pair in catalog order.
///
/// Under `PerUnit` travel charging, the vendor's travel surcharge is folded
/// into each unit's cost, so travel is effectively paid once per unit bought
/// there. `PerVisit` leaves it out here and the allocation solver charges it
/// once per visited vendor instead. The shipping surcharge is evaluated
/// against the package's own sticker price at this stage; plan reporting
/// re-applies the rule to the vendor subtotal.
pub fn build_cost_table(
    catalog: &Catalog,
    config: &PlannerConfig,
    depot_distances: &[f64],
) -> Result<Vec<CostEntry>, PlanError> {
    let mut entries = Vec::new();

    for (vendor_idx, vendor) in catalog.vendors.iter().enumerate() {
        let travel = match config.travel_charge {
            TravelChargeMode::PerUnit => {
                travel_surcharge(depot_distances[vendor_idx], config.travel_rate)
            }
            TravelChargeMode::PerVisit => 0.0,
        };

        for (package_idx, package) in vendor.packages.iter().enumerate() {
            let preference = catalog.preference(&package.container).ok_or_else(|| {
                PlanError::Configuration(format!(
                    "package '{}' at '{}' uses container '{}' which has no preference entry",
                    package.id, vendor.name, package.container
                ))
            })?;
            let shipping = vendor
                .shipping
                .as_ref()
                .map(|rule| rule.surcharge(package.price))
                .unwrap_or(0.0);
            let cost = unit_cost(package.price, travel, shipping, package.unit_count, preference);

            debug!(
                "{} / {}: unit cost {:.4} (travel {:.4}, shipping {:.2})",
                vendor.name, package.id, cost, travel, shipping
            );

            entries.push(CostEntry {
                vendor: vendor_idx,
                package: package_idx,
                unit_count: package.unit_count,
                unit_cost: cost,
            });
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::demo::demo_catalog;

    fn travel_free_config() -> PlannerConfig {
        PlannerConfig {
            travel_rate: 0.0,
            ..PlannerConfig::default()
        }
    }

    fn entry_for(entries: &[CostEntry], vendor: usize, package: usize) -> CostEntry {
        *entries
            .iter()
            .find(|e| e.vendor == vendor && e.package == package)
            .unwrap()
    }

    #[test]
    fn blended_formula_matches_hand_computation() {
        // (price + travel + shipping) / units * preference
        assert!((unit_cost(9.29, 0.0, 10.0, 10, 1.0) - 1.929).abs() < 1e-12);
        assert!((unit_cost(32.99, 0.0, 0.0, 24, 2.0) - 32.99 / 24.0 * 2.0).abs() < 1e-12);
    }

    #[test]
    fn demo_catalog_yields_one_entry_per_package() {
        let catalog = demo_catalog();
        let distances = vec![0.0; catalog.vendors.len()];
        let entries = build_cost_table(&catalog, &PlannerConfig::default(), &distances).unwrap();
        let package_count: usize = catalog.vendors.iter().map(|v| v.packages.len()).sum();
        assert_eq!(entries.len(), package_count);
        assert_eq!(entries.len(), 10);
    }

    #[test]
    fn threshold_shipping_is_folded_into_unit_costs() {
        let catalog = demo_catalog();
        let distances = vec![0.0; catalog.vendors.len()];
        let entries = build_cost_table(&catalog, &travel_free_config(), &distances).unwrap();

        // Cardenas 10-pack is under the $80 threshold, so the $10 fee applies.
        let cardenas_cans = entry_for(&entries, 0, 0);
        assert!((cardenas_cans.unit_cost - (9.29 + 10.0) / 10.0).abs() < 1e-12);

        // 7-Eleven charges its flat fee regardless; plastic multiplies by 1.5.
        let big_gulp = entry_for(&entries, 5, 1);
        assert!((big_gulp.unit_cost - (2.29 + 9.55) * 1.5).abs() < 1e-12);
    }

    #[test]
    fn vendors_without_rules_pay_no_shipping() {
        let catalog = demo_catalog();
        let distances = vec![0.0; catalog.vendors.len()];
        let entries = build_cost_table(&catalog, &travel_free_config(), &distances).unwrap();

        let vending_can = entry_for(&entries, 4, 0);
        assert!((vending_can.unit_cost - 1.35).abs() < 1e-12);
    }

    #[test]
    fn per_unit_travel_raises_costs_with_distance() {
        let catalog = demo_catalog();
        let mut distances = vec![0.0; catalog.vendors.len()];
        distances[4] = 2.0; // Vending, rate 0.5 -> surcharge 1.0 per package

        let entries = build_cost_table(&catalog, &PlannerConfig::default(), &distances).unwrap();
        let vending_can = entry_for(&entries, 4, 0);
        assert!((vending_can.unit_cost - (1.35 + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn per_visit_mode_leaves_travel_out_of_unit_costs() {
        let catalog = demo_catalog();
        let mut distances = vec![0.0; catalog.vendors.len()];
        distances[4] = 2.0;

        let config = PlannerConfig {
            travel_charge: crate::config::TravelChargeMode::PerVisit,
            ..PlannerConfig::default()
        };
        let entries = build_cost_table(&catalog, &config, &distances).unwrap();
        let vending_can = entry_for(&entries, 4, 0);
        assert!((vending_can.unit_cost - 1.35).abs() < 1e-12);
    }

    #[test]
    fn cost_per_package_scales_unit_cost() {
        let entry = CostEntry {
            vendor: 0,
            package: 0,
            unit_count: 12,
            unit_cost: 0.5,
        };
        assert!((entry.cost_per_package() - 6.0).abs() < 1e-12);
    }
}
