use std::env;
use std::error::Error;
use std::io::{self, Write};

use tracing::{info, span, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::constant::PLAN_CSV_PATH;
use crate::config::PlannerConfig;
use crate::distance::matrix::{create_dm, print_dist_matrix};
use crate::domain::plan::{Tour, TripPlan};
use crate::domain::types::Catalog;
use crate::error::PlanError;
use crate::evaluation::spend::{find_plan_rows, find_vendor_spend};
use crate::fixtures::demo::{demo_catalog, load_catalog};
use crate::report;
use crate::setup::init::prepare;
use crate::solver::{allocation, route};
use crate::utils::Deadline;

/// Initialize tracing for console diagnostics
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .with_span_events(fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE)
                .pretty(),
        )
        .init();
}

/// Run both planning stages for one request and collect the result.
///
/// The allocation stage always runs. The route stage only runs when the
/// purchase plan spreads over at least two vendors; a single stop needs no
/// ordering, so `tour` comes back None.
pub fn plan(
    catalog: &Catalog,
    config: &PlannerConfig,
    requested_units: u32,
) -> Result<TripPlan, PlanError> {
    allocation::validate_request(requested_units)?;

    let ctx = {
        let span = span!(Level::INFO, "setup");
        let _guard = span.enter();
        prepare(catalog, config)?
    };

    let allocation = {
        let span = span!(Level::INFO, "allocation", units = requested_units);
        let _guard = span.enter();
        let deadline = Deadline::start(config.solver_time_budget);
        allocation::solve(requested_units, &ctx, config, &deadline)?
    };

    let rows = find_plan_rows(&allocation, catalog, &ctx.depot_distances);
    let vendor_spend = find_vendor_spend(&allocation, catalog);

    let visited = allocation.visited_vendors();
    let tour = if visited.len() < 2 {
        info!(
            "Plan visits {} vendor(s), skipping route planning",
            visited.len()
        );
        None
    } else {
        let mut points = Vec::with_capacity(visited.len() + 1);
        points.push(catalog.depot.coords);
        points.extend(
            visited
                .iter()
                .map(|&vendor_idx| catalog.vendors[vendor_idx].coords),
        );
        let matrix = create_dm(&points);
        print_dist_matrix(&matrix);

        let solution = {
            let span = span!(Level::INFO, "route", stops = visited.len());
            let _guard = span.enter();
            let deadline = Deadline::start(config.solver_time_budget);
            route::solve(&matrix, config, &deadline)?
        };

        // Matrix index 0 is the depot, so stop i maps back through visited.
        let mut stops = Vec::with_capacity(solution.order.len() + 2);
        stops.push(catalog.depot.name.clone());
        stops.extend(
            solution
                .order
                .iter()
                .map(|&idx| catalog.vendors[visited[idx - 1]].name.clone()),
        );
        stops.push(catalog.depot.name.clone());

        Some(Tour {
            stops,
            total_distance: solution.total_distance,
            exact: solution.exact,
        })
    };

    Ok(TripPlan {
        allocation,
        rows,
        vendor_spend,
        tour,
    })
}

pub fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let mut args = env::args().skip(1);
    let requested_units = match args.next() {
        Some(raw) => parse_units(&raw)?,
        None => prompt_for_units()?,
    };
    let catalog = match args.next() {
        Some(path) => load_catalog(&path)?,
        None => demo_catalog(),
    };

    info!(
        "Planning a trip for {} units across {} vendors",
        requested_units,
        catalog.vendors.len()
    );

    let config = PlannerConfig::default();
    let trip = plan(&catalog, &config, requested_units)?;

    report::print_plan(&trip);
    report::save_plan_to_csv(&trip, PLAN_CSV_PATH)?;
    Ok(())
}

fn prompt_for_units() -> Result<u32, Box<dyn Error>> {
    print!("Enter the number of sodas you want: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(parse_units(line.trim())?)
}

fn parse_units(raw: &str) -> Result<u32, PlanError> {
    raw.parse::<u32>().map_err(|_| {
        PlanError::Validation(format!("'{}' is not a whole number of units", raw))
    })
}
