use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::config::constant::DEPOT_NAME;
use crate::domain::types::{
    Catalog, ContainerCategory, Coordinates, Location, Package, ShippingRule, Vendor,
};
use crate::utils::round_cents;

const CONTAINER_ROTATION: [ContainerCategory; 3] = [
    ContainerCategory::Can,
    ContainerCategory::Plastic,
    ContainerCategory::Glass,
];

/// Generate a seeded random catalog for testing.
///
/// Vendors land within a few miles of the depot, prices and pack sizes cover
/// the ranges the planner has to cope with, and roughly a third of vendors
/// carry a shipping rule. The same seed always yields the same catalog.
pub fn generate_random_catalog(
    seed: u64,
    vendor_count: usize,
    packages_per_vendor: usize,
) -> Catalog {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let depot = Location {
        name: DEPOT_NAME.to_string(),
        coords: Coordinates {
            lat: 33.72,
            lon: -117.15,
        },
    };

    let mut vendors = Vec::with_capacity(vendor_count);
    for vendor_idx in 0..vendor_count {
        let coords = Coordinates {
            lat: depot.coords.lat + rng.gen_range(-0.05..0.05),
            lon: depot.coords.lon + rng.gen_range(-0.05..0.05),
        };

        let mut packages = Vec::with_capacity(packages_per_vendor);
        for package_idx in 0..packages_per_vendor {
            let unit_count = rng.gen_range(1..=24);
            packages.push(Package {
                id: format!("pack-{}", package_idx + 1),
                price: round_cents(rng.gen_range(1.0..40.0)),
                fluid_ounces: unit_count as f64 * 12.0,
                unit_count,
                container: CONTAINER_ROTATION[(vendor_idx + package_idx) % 3].clone(),
            });
        }

        let shipping = if rng.gen_bool(0.3) {
            let free_threshold = if rng.gen_bool(0.5) {
                Some(round_cents(rng.gen_range(40.0..120.0)))
            } else {
                None
            };
            Some(ShippingRule {
                fee: round_cents(rng.gen_range(2.0..12.0)),
                free_threshold,
            })
        } else {
            None
        };

        vendors.push(Vendor {
            name: format!("Vendor-{}", vendor_idx + 1),
            coords,
            packages,
            shipping,
        });
    }

    let catalog = Catalog {
        depot,
        vendors,
        container_preferences: HashMap::from([
            (ContainerCategory::Can, 1.0),
            (ContainerCategory::Plastic, 1.5),
            (ContainerCategory::Glass, 2.0),
        ]),
    };

    info!(
        "Generated catalog (seed {}): {} vendors, {} packages each",
        seed, vendor_count, packages_per_vendor
    );
    catalog
}
