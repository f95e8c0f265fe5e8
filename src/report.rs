use std::error::Error;

use colored::Colorize;
use csv::Writer;

use crate::domain::plan::TripPlan;

/// Print the purchase lines, per-vendor spend, and tour to the console.
pub fn print_plan(trip: &TripPlan) {
    println!("\nAmounts to buy (in number of units):");
    for row in &trip.rows {
        println!(
            "{} - {}: {} units, {} container, Total Cost: ${:.2}, Travel Distance: {:.2} miles, Fluid Ounces per Unit: {:.2} oz",
            row.vendor,
            row.package,
            row.units,
            row.container,
            row.subtotal,
            row.depot_distance,
            row.fl_oz_per_unit
        );
    }

    for spend in &trip.vendor_spend {
        if spend.shipping.is_some() {
            println!(
                "Total cost for {} including shipping: ${:.2}",
                spend.vendor,
                spend.total()
            );
        }
    }

    println!(
        "{}",
        format_args!(
            "Total blended cost for {} units: ${:.2}",
            trip.allocation.requested_units, trip.allocation.total_cost
        )
        .to_string()
        .green()
    );

    match &trip.tour {
        Some(tour) => {
            println!("\nOptimized route for visiting multiple stores:");
            println!("Route:");
            println!(" {}", tour.stops.join(" -> "));
            println!("Distance of the route: {:.2} miles", tour.total_distance);
            if !tour.exact {
                println!(
                    "{}",
                    "Route found heuristically, a shorter ordering may exist.".yellow()
                );
            }
        }
        None => {
            println!(
                "{}",
                "\nAll purchases from one stop, no route needed.".yellow()
            );
        }
    }
}

/// Write the purchase rows to a CSV file.
pub fn save_plan_to_csv(trip: &TripPlan, filename: &str) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path(filename)?;

    wtr.write_record([
        "vendor",
        "package",
        "quantity",
        "units",
        "container",
        "subtotal",
        "depot_distance_miles",
        "fl_oz_per_unit",
    ])?;

    for row in &trip.rows {
        wtr.write_record([
            row.vendor.clone(),
            row.package.clone(),
            row.quantity.to_string(),
            row.units.to_string(),
            row.container.to_string(),
            format!("{:.2}", row.subtotal),
            format!("{:.2}", row.depot_distance),
            format!("{:.2}", row.fl_oz_per_unit),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
