use tracing::{debug, info};

use crate::config::PlannerConfig;
use crate::distance::geo::haversine;
use crate::domain::plan::CostEntry;
use crate::domain::types::Catalog;
use crate::error::PlanError;
use crate::evaluation::cost::build_cost_table;

/// Validated, derived inputs shared by the solver stages.
#[derive(Debug, Clone)]
pub struct PlanContext {
    pub depot_distances: Vec<f64>,
    pub entries: Vec<CostEntry>,
}

/// Validate the catalog and assemble the per-run context: depot distance per
/// vendor plus the blended cost table.
pub fn prepare(catalog: &Catalog, config: &PlannerConfig) -> Result<PlanContext, PlanError> {
    info!(
        "Preparing run context for {} vendors at depot '{}'",
        catalog.vendors.len(),
        catalog.depot.name
    );
    catalog.validate()?;

    let depot_distances: Vec<f64> = catalog
        .vendors
        .iter()
        .map(|vendor| haversine(catalog.depot.coords, vendor.coords))
        .collect();
    debug!("Depot distances (miles): {:?}", depot_distances);

    let entries = build_cost_table(catalog, config, &depot_distances)?;
    info!("Prepared {} cost entries", entries.len());

    Ok(PlanContext {
        depot_distances,
        entries,
    })
}
