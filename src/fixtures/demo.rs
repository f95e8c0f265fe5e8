use std::collections::HashMap;
use std::fs;

use tracing::info;

use crate::config::constant::DEPOT_NAME;
use crate::domain::types::{
    Catalog, ContainerCategory, Coordinates, Location, Package, ShippingRule, Vendor,
};
use crate::error::PlanError;

fn package(
    id: &str,
    price: f64,
    fluid_ounces: f64,
    unit_count: u32,
    container: ContainerCategory,
) -> Package {
    Package {
        id: id.to_string(),
        price,
        fluid_ounces,
        unit_count,
        container,
    }
}

/// The built-in demo catalog: seven Menifee-area soda sources around one home
/// depot, with the delivery vendors sharing the depot coordinates.
pub fn demo_catalog() -> Catalog {
    use ContainerCategory::{Can, Glass, Plastic};

    let home = Coordinates {
        lat: 33.721_880,
        lon: -117.139_720,
    };

    let vendors = vec![
        Vendor {
            name: "Cardenas".to_string(),
            coords: home,
            packages: vec![
                package("7.5oz_can_10pack", 9.29, 75.0, 10, Can),
                package("16.9oz_bottle_6pack", 7.99, 101.4, 6, Plastic),
            ],
            shipping: Some(ShippingRule {
                fee: 10.0,
                free_threshold: Some(80.0),
            }),
        },
        Vendor {
            name: "Vons".to_string(),
            coords: Coordinates {
                lat: 33.713_120,
                lon: -117.193_024,
            },
            packages: vec![
                package("7.5oz_can_6pack", 3.47, 45.0, 6, Can),
                package("12oz_glass_24pack", 32.99, 288.0, 24, Glass),
            ],
            shipping: None,
        },
        Vendor {
            name: "StaterBros".to_string(),
            coords: Coordinates {
                lat: 33.683_840,
                lon: -117.152_600,
            },
            packages: vec![package("12oz_can_12pack", 4.99, 144.0, 12, Can)],
            shipping: None,
        },
        Vendor {
            name: "Ralphs".to_string(),
            coords: Coordinates {
                lat: 33.684_230,
                lon: -117.168_590,
            },
            packages: vec![
                package("2L", 1.49, 67.6, 1, Plastic),
                package("12oz_can_12pack", 3.99, 144.0, 12, Can),
            ],
            shipping: None,
        },
        Vendor {
            name: "Vending".to_string(),
            coords: Coordinates {
                lat: 33.720_240,
                lon: -117.149_050,
            },
            packages: vec![package("12oz_can", 1.35, 12.0, 1, Can)],
            shipping: None,
        },
        Vendor {
            name: "7-Eleven".to_string(),
            coords: home,
            packages: vec![
                package("20oz_bottle", 3.74, 20.0, 1, Plastic),
                package("30oz_BigGulp", 2.29, 30.0, 1, Plastic),
            ],
            shipping: Some(ShippingRule {
                fee: 9.55,
                free_threshold: None,
            }),
        },
    ];

    Catalog {
        depot: Location {
            name: DEPOT_NAME.to_string(),
            coords: home,
        },
        vendors,
        container_preferences: HashMap::from([(Can, 1.0), (Glass, 2.0), (Plastic, 1.5)]),
    }
}

/// Load a catalog from a JSON file on disk.
pub fn load_catalog(path: &str) -> Result<Catalog, PlanError> {
    let raw = fs::read_to_string(path).map_err(|err| {
        PlanError::Configuration(format!("cannot read catalog file '{}': {}", path, err))
    })?;
    let catalog: Catalog = serde_json::from_str(&raw).map_err(|err| {
        PlanError::Configuration(format!("catalog file '{}' is not valid: {}", path, err))
    })?;
    info!(
        "Loaded catalog from '{}': {} vendors",
        path,
        catalog.vendors.len()
    );
    Ok(catalog)
}
