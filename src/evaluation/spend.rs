use itertools::Itertools;

use crate::domain::plan::{AllocationPlan, PlanRow, VendorSpend};
use crate::domain::types::Catalog;

/// Resolve plan lines into presentation rows, keeping plan order.
pub fn find_plan_rows(
    plan: &AllocationPlan,
    catalog: &Catalog,
    depot_distances: &[f64],
) -> Vec<PlanRow> {
    plan.lines
        .iter()
        .map(|line| {
            let vendor = &catalog.vendors[line.vendor];
            let package = &vendor.packages[line.package];
            PlanRow {
                vendor: vendor.name.clone(),
                package: package.id.clone(),
                quantity: line.quantity,
                units: line.units,
                container: package.container.clone(),
                subtotal: line.quantity as f64 * package.price,
                depot_distance: depot_distances[line.vendor],
                fl_oz_per_unit: package.fluid_ounces / package.unit_count as f64,
            }
        })
        .collect()
}

/// Sticker spend per visited vendor, with the vendor's shipping rule applied
/// to the vendor-level subtotal rather than to individual packages.
pub fn find_vendor_spend(plan: &AllocationPlan, catalog: &Catalog) -> Vec<VendorSpend> {
    plan.lines
        .iter()
        .map(|line| (line.vendor, line))
        .into_group_map()
        .into_iter()
        .sorted_by_key(|(vendor_idx, _)| *vendor_idx)
        .map(|(vendor_idx, lines)| {
            let vendor = &catalog.vendors[vendor_idx];
            let subtotal: f64 = lines
                .iter()
                .map(|line| line.quantity as f64 * vendor.packages[line.package].price)
                .sum();
            let shipping = vendor
                .shipping
                .as_ref()
                .map(|rule| rule.surcharge(subtotal));
            VendorSpend {
                vendor: vendor.name.clone(),
                subtotal,
                shipping,
            }
        })
        .collect()
}
