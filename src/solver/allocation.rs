use tracing::{debug, info};

use crate::config::constant::{MAX_REQUESTED_UNITS, PER_VISIT_MAX_VENDORS};
use crate::config::{PlannerConfig, TravelChargeMode};
use crate::domain::plan::{AllocationPlan, CostEntry, PurchaseLine};
use crate::error::PlanError;
use crate::evaluation::cost::travel_surcharge;
use crate::setup::init::PlanContext;
use crate::utils::Deadline;

const STAGE: &str = "allocation";
const DEADLINE_STRIDE: usize = 4096;

/// Pick non-negative integer package multiples that hit `requested_units`
/// exactly at minimum blended cost.
///
/// Dynamic program over achievable unit totals, with unbounded multiplicity
/// per entry. Entries are scanned in catalog order and a cell is replaced
/// only on strict improvement, so equal-cost plans tie-break towards earlier
/// catalog positions and reruns are identical.
///
/// Requests outside `1..=MAX_REQUESTED_UNITS` are rejected, and the tables
/// never extend past the target by more than one smallest-package stride, so
/// their size stays bounded whatever unit counts the catalog carries.
pub fn solve(
    requested_units: u32,
    ctx: &PlanContext,
    config: &PlannerConfig,
    deadline: &Deadline,
) -> Result<AllocationPlan, PlanError> {
    deadline.check(STAGE)?;
    validate_request(requested_units)?;

    // When even the smallest package overshoots the target, no combination
    // can land on it and that package is the nearest achievable total above.
    let smallest = ctx.entries.iter().map(|entry| entry.unit_count).min();
    if matches!(smallest, Some(count) if count > requested_units) {
        return Err(PlanError::Infeasible {
            requested_units,
            nearest_below: None,
            nearest_above: smallest,
        });
    }

    match config.travel_charge {
        TravelChargeMode::PerUnit => solve_per_unit(requested_units, ctx, deadline),
        TravelChargeMode::PerVisit => solve_per_visit(requested_units, ctx, config, deadline),
    }
}

/// Requested totals outside `1..=MAX_REQUESTED_UNITS` are validation errors.
pub(crate) fn validate_request(requested_units: u32) -> Result<(), PlanError> {
    if requested_units == 0 {
        return Err(PlanError::Validation(
            "requested unit count must be positive".to_string(),
        ));
    }
    if requested_units > MAX_REQUESTED_UNITS {
        return Err(PlanError::Validation(format!(
            "requested unit count {} exceeds the supported maximum of {}",
            requested_units, MAX_REQUESTED_UNITS
        )));
    }
    Ok(())
}

fn solve_per_unit(
    requested_units: u32,
    ctx: &PlanContext,
    deadline: &Deadline,
) -> Result<AllocationPlan, PlanError> {
    let target = requested_units as usize;
    let limit = lookahead_limit(target, &ctx.entries);
    let (best, choice) = find_best_costs(limit, &ctx.entries, None, deadline)?;

    if !best[target].is_finite() {
        return Err(infeasibility(requested_units, &best));
    }

    let lines = reconstruct_lines(target, &ctx.entries, &choice);
    let plan = AllocationPlan {
        requested_units,
        lines,
        total_cost: best[target],
    };
    debug_assert_eq!(plan.total_units(), requested_units);
    info!(
        "Allocation found: {} lines, blended cost {:.2}",
        plan.lines.len(),
        plan.total_cost
    );
    Ok(plan)
}

/// Per-visit variant: unit costs carry no travel, and each vendor's travel
/// surcharge is paid once if the plan touches it. Solved exactly by trying
/// every vendor subset and running the unit-total program restricted to it;
/// subsets whose fixed travel alone already loses are skipped.
fn solve_per_visit(
    requested_units: u32,
    ctx: &PlanContext,
    config: &PlannerConfig,
    deadline: &Deadline,
) -> Result<AllocationPlan, PlanError> {
    let vendor_count = ctx.depot_distances.len();
    if vendor_count > PER_VISIT_MAX_VENDORS {
        return Err(PlanError::Configuration(format!(
            "per-visit travel charging supports at most {} vendors, catalog has {}",
            PER_VISIT_MAX_VENDORS, vendor_count
        )));
    }

    let target = requested_units as usize;
    let limit = lookahead_limit(target, &ctx.entries);

    // Reachability does not depend on which vendors get charged for travel,
    // so infeasibility is diagnosed against the unrestricted table.
    let (full_best, full_choice) = find_best_costs(limit, &ctx.entries, None, deadline)?;
    if !full_best[target].is_finite() {
        return Err(infeasibility(requested_units, &full_best));
    }

    let fixed_costs: Vec<f64> = ctx
        .depot_distances
        .iter()
        .map(|distance| travel_surcharge(*distance, config.travel_rate))
        .collect();

    let full_mask: u64 = (1u64 << vendor_count) - 1;
    let mut best_mask = full_mask;
    let mut best_total = full_best[target] + masked_fixed(full_mask, &fixed_costs);

    for mask in 1..full_mask {
        deadline.check(STAGE)?;
        let fixed = masked_fixed(mask, &fixed_costs);
        if fixed >= best_total {
            continue;
        }
        let (best, _) = find_best_costs(limit, &ctx.entries, Some(mask), deadline)?;
        if !best[target].is_finite() {
            continue;
        }
        let total = fixed + best[target];
        if total < best_total {
            best_total = total;
            best_mask = mask;
        }
    }

    let choice = if best_mask == full_mask {
        full_choice
    } else {
        find_best_costs(limit, &ctx.entries, Some(best_mask), deadline)?.1
    };
    let lines = reconstruct_lines(target, &ctx.entries, &choice);
    let plan = AllocationPlan {
        requested_units,
        lines,
        total_cost: best_total,
    };
    debug_assert_eq!(plan.total_units(), requested_units);
    debug!("Per-visit winner mask: {:#b}", best_mask);
    info!(
        "Allocation found: {} lines, blended cost {:.2} with per-visit travel",
        plan.lines.len(),
        plan.total_cost
    );
    Ok(plan)
}

/// Minimum cost to buy each unit total in 0..=limit, plus the entry index of
/// the last transition for reconstruction. `vendor_mask` restricts which
/// vendors may supply packages.
fn find_best_costs(
    limit: usize,
    entries: &[CostEntry],
    vendor_mask: Option<u64>,
    deadline: &Deadline,
) -> Result<(Vec<f64>, Vec<usize>), PlanError> {
    let mut best = vec![f64::INFINITY; limit + 1];
    let mut choice = vec![usize::MAX; limit + 1];
    best[0] = 0.0;

    for units in 1..=limit {
        if units % DEADLINE_STRIDE == 0 {
            deadline.check(STAGE)?;
        }
        for (entry_idx, entry) in entries.iter().enumerate() {
            if let Some(mask) = vendor_mask {
                if mask & (1u64 << entry.vendor) == 0 {
                    continue;
                }
            }
            let count = entry.unit_count as usize;
            if count > units {
                continue;
            }
            let prev = best[units - count];
            if !prev.is_finite() {
                continue;
            }
            let candidate = prev + entry.cost_per_package();
            if candidate < best[units] {
                best[units] = candidate;
                choice[units] = entry_idx;
            }
        }
    }

    Ok((best, choice))
}

/// Walk the choice table back from the target, tallying packages per entry.
fn reconstruct_lines(target: usize, entries: &[CostEntry], choice: &[usize]) -> Vec<PurchaseLine> {
    let mut counts = vec![0u32; entries.len()];
    let mut units = target;
    while units > 0 {
        let entry_idx = choice[units];
        counts[entry_idx] += 1;
        units -= entries[entry_idx].unit_count as usize;
    }

    counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(entry_idx, &quantity)| {
            let entry = &entries[entry_idx];
            PurchaseLine {
                vendor: entry.vendor,
                package: entry.package,
                quantity,
                units: quantity * entry.unit_count,
            }
        })
        .collect()
}

// The table extends one smallest-package stride past the target: a stack of
// the smallest package lands in every window of that width, so the nearest
// achievable total above the target is always on the table. `solve` has
// already bounded the target and ruled out catalogs whose smallest package
// overshoots it, which caps the table length.
fn lookahead_limit(target: usize, entries: &[CostEntry]) -> usize {
    let min_count = entries
        .iter()
        .map(|entry| entry.unit_count as usize)
        .min()
        .unwrap_or(0);
    target + min_count
}

fn infeasibility(requested_units: u32, best: &[f64]) -> PlanError {
    let target = requested_units as usize;
    let nearest_below = (1..target)
        .rev()
        .find(|&units| best[units].is_finite())
        .map(|units| units as u32);
    let nearest_above = ((target + 1)..best.len())
        .find(|&units| best[units].is_finite())
        .map(|units| units as u32);
    PlanError::Infeasible {
        requested_units,
        nearest_below,
        nearest_above,
    }
}

fn masked_fixed(mask: u64, fixed_costs: &[f64]) -> f64 {
    fixed_costs
        .iter()
        .enumerate()
        .filter(|(vendor_idx, _)| mask & (1u64 << vendor_idx) != 0)
        .map(|(_, fixed)| fixed)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::time::Duration;

    fn entry(vendor: usize, package: usize, unit_count: u32, unit_cost: f64) -> CostEntry {
        CostEntry {
            vendor,
            package,
            unit_count,
            unit_cost,
        }
    }

    fn ctx_of(entries: Vec<CostEntry>, vendor_count: usize) -> PlanContext {
        PlanContext {
            depot_distances: vec![0.0; vendor_count],
            entries,
        }
    }

    fn long_deadline() -> Deadline {
        Deadline::start(Duration::from_secs(30))
    }

    /// Reference enumeration over all quantity combinations.
    fn brute_force_min(entries: &[CostEntry], entry_idx: usize, remaining: u32) -> Option<f64> {
        if remaining == 0 {
            return Some(0.0);
        }
        if entry_idx == entries.len() {
            return None;
        }
        let count = entries[entry_idx].unit_count;
        let mut best: Option<f64> = None;
        for quantity in 0..=(remaining / count) {
            if let Some(rest) =
                brute_force_min(entries, entry_idx + 1, remaining - quantity * count)
            {
                let total = rest + quantity as f64 * entries[entry_idx].cost_per_package();
                best = Some(match best {
                    Some(current) if current <= total => current,
                    _ => total,
                });
            }
        }
        best
    }

    #[test]
    fn prefers_the_cheaper_larger_pack() {
        // 6-packs at $3.00 vs 12-packs at $5.00: 24 units should be two
        // 12-packs for $10, not four 6-packs for $12.
        let ctx = ctx_of(
            vec![entry(0, 0, 6, 3.0 / 6.0), entry(1, 0, 12, 5.0 / 12.0)],
            2,
        );
        let plan = solve(24, &ctx, &PlannerConfig::default(), &long_deadline()).unwrap();

        assert_eq!(plan.lines.len(), 1);
        assert_eq!(plan.lines[0].vendor, 1);
        assert_eq!(plan.lines[0].quantity, 2);
        assert_eq!(plan.total_units(), 24);
        assert!((plan.total_cost - 10.0).abs() < 1e-9);
    }

    #[test]
    fn below_smallest_pack_is_infeasible_with_neighbours() {
        let ctx = ctx_of(vec![entry(0, 0, 6, 0.5)], 1);
        let err = solve(1, &ctx, &PlannerConfig::default(), &long_deadline()).unwrap_err();
        assert_eq!(
            err,
            PlanError::Infeasible {
                requested_units: 1,
                nearest_below: None,
                nearest_above: Some(6),
            }
        );
    }

    #[test]
    fn unreachable_total_reports_neighbours_on_both_sides() {
        let ctx = ctx_of(vec![entry(0, 0, 6, 0.5), entry(0, 1, 10, 0.4)], 1);
        let err = solve(7, &ctx, &PlannerConfig::default(), &long_deadline()).unwrap_err();
        assert_eq!(
            err,
            PlanError::Infeasible {
                requested_units: 7,
                nearest_below: Some(6),
                nearest_above: Some(10),
            }
        );
    }

    #[test]
    fn gigantic_pack_sizes_surface_as_infeasible() {
        // A pack size near u32::MAX must produce an error, not a table.
        let ctx = ctx_of(vec![entry(0, 0, 4_000_000_000, 0.01)], 1);
        let expected = PlanError::Infeasible {
            requested_units: 1,
            nearest_below: None,
            nearest_above: Some(4_000_000_000),
        };

        let err = solve(1, &ctx, &PlannerConfig::default(), &long_deadline()).unwrap_err();
        assert_eq!(err, expected);

        let per_visit = PlannerConfig {
            travel_charge: TravelChargeMode::PerVisit,
            ..PlannerConfig::default()
        };
        let err = solve(1, &ctx, &per_visit, &long_deadline()).unwrap_err();
        assert_eq!(err, expected);
    }

    #[test]
    fn lookahead_is_sized_by_the_smallest_pack() {
        // The huge pack can never join a plan and must not inflate the
        // diagnostics window either.
        let ctx = ctx_of(
            vec![entry(0, 0, 3, 0.5), entry(0, 1, 4_000_000_000, 0.01)],
            1,
        );

        let plan = solve(9, &ctx, &PlannerConfig::default(), &long_deadline()).unwrap();
        assert_eq!(plan.total_units(), 9);
        assert!((plan.total_cost - 4.5).abs() < 1e-9);

        let err = solve(7, &ctx, &PlannerConfig::default(), &long_deadline()).unwrap_err();
        assert_eq!(
            err,
            PlanError::Infeasible {
                requested_units: 7,
                nearest_below: Some(6),
                nearest_above: Some(9),
            }
        );
    }

    #[test]
    fn solver_rejects_out_of_range_requests() {
        let ctx = ctx_of(vec![entry(0, 0, 1, 1.0)], 1);
        assert!(matches!(
            solve(0, &ctx, &PlannerConfig::default(), &long_deadline()),
            Err(PlanError::Validation(_))
        ));
        assert!(matches!(
            solve(
                MAX_REQUESTED_UNITS + 1,
                &ctx,
                &PlannerConfig::default(),
                &long_deadline()
            ),
            Err(PlanError::Validation(_))
        ));
    }

    #[test]
    fn matches_brute_force_on_random_instances() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..25 {
            let entry_count = rng.gen_range(2..=5);
            let entries: Vec<CostEntry> = (0..entry_count)
                .map(|idx| {
                    entry(
                        idx % 3,
                        idx,
                        rng.gen_range(1..=9),
                        rng.gen_range(0.1..5.0),
                    )
                })
                .collect();
            let requested = rng.gen_range(1..=30u32);
            let ctx = ctx_of(entries.clone(), 3);

            let reference = brute_force_min(&entries, 0, requested);
            match solve(requested, &ctx, &PlannerConfig::default(), &long_deadline()) {
                Ok(plan) => {
                    let expected = reference.expect("solver found a plan brute force missed");
                    assert!(
                        (plan.total_cost - expected).abs() < 1e-9,
                        "requested {}: dp {} vs brute force {}",
                        requested,
                        plan.total_cost,
                        expected
                    );
                    assert_eq!(plan.total_units(), requested);
                }
                Err(PlanError::Infeasible { .. }) => assert!(reference.is_none()),
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
    }

    #[test]
    fn reruns_are_identical() {
        let ctx = ctx_of(
            vec![
                entry(0, 0, 6, 0.5),
                entry(1, 0, 12, 0.45),
                entry(2, 0, 5, 0.52),
            ],
            3,
        );
        let first = solve(60, &ctx, &PlannerConfig::default(), &long_deadline()).unwrap();
        let second = solve(60, &ctx, &PlannerConfig::default(), &long_deadline()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn equal_cost_plans_resolve_to_the_earlier_entry() {
        // Two identical offers: the plan must consistently pick the first.
        let ctx = ctx_of(vec![entry(0, 0, 6, 0.5), entry(1, 0, 6, 0.5)], 2);
        let plan = solve(12, &ctx, &PlannerConfig::default(), &long_deadline()).unwrap();
        assert_eq!(plan.lines.len(), 1);
        assert_eq!(plan.lines[0].vendor, 0);
    }

    #[test]
    fn per_visit_mode_consolidates_travel() {
        // Vendor A: $3.00 6-packs, 4 miles out (fixed travel $2.00 at the
        // default rate). Vendor B: $9.50 12-packs at the depot. Folding
        // travel per unit makes A look worse than B for 12 units; charging
        // the trip once makes A the winner.
        let per_unit_ctx = ctx_of(
            vec![entry(0, 0, 6, (3.0 + 2.0) / 6.0), entry(1, 0, 12, 9.5 / 12.0)],
            2,
        );
        let per_unit_plan = solve(
            12,
            &per_unit_ctx,
            &PlannerConfig::default(),
            &long_deadline(),
        )
        .unwrap();
        assert_eq!(per_unit_plan.lines[0].vendor, 1);
        assert!((per_unit_plan.total_cost - 9.5).abs() < 1e-9);

        let per_visit_config = PlannerConfig {
            travel_charge: TravelChargeMode::PerVisit,
            ..PlannerConfig::default()
        };
        let per_visit_ctx = PlanContext {
            depot_distances: vec![4.0, 0.0],
            entries: vec![entry(0, 0, 6, 3.0 / 6.0), entry(1, 0, 12, 9.5 / 12.0)],
        };
        let per_visit_plan = solve(12, &per_visit_ctx, &per_visit_config, &long_deadline()).unwrap();
        assert_eq!(per_visit_plan.lines[0].vendor, 0);
        assert_eq!(per_visit_plan.lines[0].quantity, 2);
        assert!((per_visit_plan.total_cost - 8.0).abs() < 1e-9);
    }

    #[test]
    fn per_visit_mode_caps_vendor_count() {
        let vendor_count = PER_VISIT_MAX_VENDORS + 1;
        let entries: Vec<CostEntry> = (0..vendor_count).map(|v| entry(v, 0, 1, 1.0)).collect();
        let ctx = ctx_of(entries, vendor_count);
        let config = PlannerConfig {
            travel_charge: TravelChargeMode::PerVisit,
            ..PlannerConfig::default()
        };
        assert!(matches!(
            solve(5, &ctx, &config, &long_deadline()),
            Err(PlanError::Configuration(_))
        ));
    }

    #[test]
    fn exhausted_budget_surfaces_as_timeout() {
        let ctx = ctx_of(vec![entry(0, 0, 1, 1.0)], 1);
        let deadline = Deadline::start(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        assert!(matches!(
            solve(100, &ctx, &PlannerConfig::default(), &deadline),
            Err(PlanError::SolverTimeout { .. })
        ));
    }
}
