use std::time::Duration;

pub mod constant {
    pub(crate) const DEPOT_NAME: &str = "Home";
    pub(crate) const EARTH_RADIUS_MILES: f64 = 3958.8;
    pub(crate) const TRAVEL_RATE_PER_MILE: f64 = 0.5;
    pub(crate) const SOLVER_TIME_BUDGET_MS: u64 = 5_000;
    pub(crate) const EXACT_ROUTE_MAX_STOPS: usize = 12;
    pub(crate) const MAX_REQUESTED_UNITS: u32 = 1_000_000;
    pub(crate) const PER_VISIT_MAX_VENDORS: usize = 20;
    pub(crate) const PLAN_CSV_PATH: &str = "trip_plan.csv";
}

/// How the depot-to-vendor travel surcharge enters the objective.
///
/// `PerUnit` folds the surcharge into every unit bought at the vendor, which
/// double-counts travel proportionally to quantity. That is the historical
/// cost model and stays the default. `PerVisit` charges the surcharge once
/// per vendor that actually appears in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TravelChargeMode {
    #[default]
    PerUnit,
    PerVisit,
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub travel_rate: f64,
    pub travel_charge: TravelChargeMode,
    pub solver_time_budget: Duration,
    pub exact_route_max_stops: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            travel_rate: constant::TRAVEL_RATE_PER_MILE,
            travel_charge: TravelChargeMode::default(),
            solver_time_budget: Duration::from_millis(constant::SOLVER_TIME_BUDGET_MS),
            exact_route_max_stops: constant::EXACT_ROUTE_MAX_STOPS,
        }
    }
}
