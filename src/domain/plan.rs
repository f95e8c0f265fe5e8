use itertools::Itertools;

use crate::domain::types::ContainerCategory;

/// Blended per-unit cost for one (vendor, package) pair, derived fresh each
/// run and indexed back into the catalog by position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEntry {
    pub vendor: usize,
    pub package: usize,
    pub unit_count: u32,
    pub unit_cost: f64,
}

impl CostEntry {
    pub fn cost_per_package(&self) -> f64 {
        self.unit_cost * self.unit_count as f64
    }
}

/// One purchased line: `quantity` packages of a catalog package, adding
/// `units` individual units to the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseLine {
    pub vendor: usize,
    pub package: usize,
    pub quantity: u32,
    pub units: u32,
}

/// Result of the allocation stage. `total_cost` is the blended objective
/// value; the lines always sum to exactly `requested_units`.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationPlan {
    pub requested_units: u32,
    pub lines: Vec<PurchaseLine>,
    pub total_cost: f64,
}

impl AllocationPlan {
    pub fn total_units(&self) -> u32 {
        self.lines.iter().map(|line| line.units).sum()
    }

    /// Vendor indices that appear in the plan, each once, ordered by first
    /// appearance. Lines need not be grouped by vendor.
    pub fn visited_vendors(&self) -> Vec<usize> {
        self.lines.iter().map(|line| line.vendor).unique().collect()
    }
}

/// Presentation row for one purchase line, with names resolved and the
/// sticker subtotal (no surcharges) alongside the logistics numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRow {
    pub vendor: String,
    pub package: String,
    pub quantity: u32,
    pub units: u32,
    pub container: ContainerCategory,
    pub subtotal: f64,
    pub depot_distance: f64,
    pub fl_oz_per_unit: f64,
}

/// Sticker spend at one vendor with its shipping rule re-applied to the
/// vendor-level subtotal. `shipping` is None for vendors without a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorSpend {
    pub vendor: String,
    pub subtotal: f64,
    pub shipping: Option<f64>,
}

impl VendorSpend {
    pub fn total(&self) -> f64 {
        self.subtotal + self.shipping.unwrap_or(0.0)
    }
}

/// Closed tour over the visited vendors. `stops` carries the depot name at
/// both ends; `exact` records whether the optimal-tour search ran (as opposed
/// to the heuristic used past the exact-stop cutoff).
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    pub stops: Vec<String>,
    pub total_distance: f64,
    pub exact: bool,
}

/// Everything one planning run produces. `tour` is None when fewer than two
/// vendors are visited and the route stage was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    pub allocation: AllocationPlan,
    pub rows: Vec<PlanRow>,
    pub vendor_spend: Vec<VendorSpend>,
    pub tour: Option<Tour>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(vendor: usize, package: usize, quantity: u32, units: u32) -> PurchaseLine {
        PurchaseLine {
            vendor,
            package,
            quantity,
            units,
        }
    }

    #[test]
    fn visited_vendors_deduplicates_in_order() {
        let plan = AllocationPlan {
            requested_units: 30,
            lines: vec![line(0, 0, 1, 6), line(0, 1, 1, 12), line(2, 0, 1, 12)],
            total_cost: 0.0,
        };
        assert_eq!(plan.visited_vendors(), vec![0, 2]);
        assert_eq!(plan.total_units(), 30);
    }

    #[test]
    fn visited_vendors_handles_interleaved_lines() {
        // Hand-built plans need not group their lines by vendor.
        let plan = AllocationPlan {
            requested_units: 30,
            lines: vec![line(1, 0, 1, 6), line(0, 0, 1, 12), line(1, 1, 1, 12)],
            total_cost: 0.0,
        };
        assert_eq!(plan.visited_vendors(), vec![1, 0]);
    }

    #[test]
    fn vendor_spend_total_includes_shipping_when_present() {
        let with_rule = VendorSpend {
            vendor: "Cardenas".to_string(),
            subtotal: 18.58,
            shipping: Some(10.0),
        };
        let without_rule = VendorSpend {
            vendor: "Vons".to_string(),
            subtotal: 3.47,
            shipping: None,
        };
        assert!((with_rule.total() - 28.58).abs() < 1e-9);
        assert!((without_rule.total() - 3.47).abs() < 1e-9);
    }
}
