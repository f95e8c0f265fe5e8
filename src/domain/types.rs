use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::distance::geo::validate_coordinates;
use crate::error::PlanError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub coords: Coordinates,
}

/// Open-ended container tag. The well-known values get variants, anything else
/// rides along as `Other` so a new category only needs a preference entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContainerCategory {
    Can,
    Glass,
    Plastic,
    Other(String),
}

impl From<String> for ContainerCategory {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "can" => ContainerCategory::Can,
            "glass" => ContainerCategory::Glass,
            "plastic" => ContainerCategory::Plastic,
            _ => ContainerCategory::Other(raw),
        }
    }
}

impl From<ContainerCategory> for String {
    fn from(category: ContainerCategory) -> Self {
        category.to_string()
    }
}

impl std::fmt::Display for ContainerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerCategory::Can => write!(f, "can"),
            ContainerCategory::Glass => write!(f, "glass"),
            ContainerCategory::Plastic => write!(f, "plastic"),
            ContainerCategory::Other(tag) => write!(f, "{}", tag),
        }
    }
}

/// Vendor delivery pricing. With a `free_threshold` the fee is waived once the
/// applicable subtotal reaches it; without one the fee is always charged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingRule {
    pub fee: f64,
    pub free_threshold: Option<f64>,
}

impl ShippingRule {
    pub fn surcharge(&self, subtotal: f64) -> f64 {
        match self.free_threshold {
            Some(threshold) if subtotal >= threshold => 0.0,
            _ => self.fee,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    pub price: f64,
    pub fluid_ounces: f64,
    pub unit_count: u32,
    pub container: ContainerCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub name: String,
    pub coords: Coordinates,
    pub packages: Vec<Package>,
    pub shipping: Option<ShippingRule>,
}

/// Immutable reference data for one planning run: the depot, every vendor with
/// its packages, and the container preference table (lower multiplier means
/// more preferred).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub depot: Location,
    pub vendors: Vec<Vendor>,
    pub container_preferences: HashMap<ContainerCategory, f64>,
}

impl Catalog {
    pub fn preference(&self, category: &ContainerCategory) -> Option<f64> {
        self.container_preferences.get(category).copied()
    }

    /// Check every cross-reference and value range before the solvers run.
    /// Coordinate problems are validation errors, everything else is a
    /// configuration error.
    pub fn validate(&self) -> Result<(), PlanError> {
        validate_coordinates(&self.depot.name, self.depot.coords)?;

        if self.vendors.is_empty() {
            return Err(PlanError::Configuration(
                "catalog contains no vendors".to_string(),
            ));
        }

        for (category, multiplier) in &self.container_preferences {
            if !multiplier.is_finite() || *multiplier < 0.0 {
                return Err(PlanError::Configuration(format!(
                    "container preference for '{}' must be a finite value >= 0, got {}",
                    category, multiplier
                )));
            }
        }

        let mut seen_vendors = HashSet::new();
        for vendor in &self.vendors {
            if vendor.name.is_empty() {
                return Err(PlanError::Configuration(
                    "vendor with an empty name".to_string(),
                ));
            }
            if vendor.name == self.depot.name {
                return Err(PlanError::Configuration(format!(
                    "vendor '{}' reuses the depot name",
                    vendor.name
                )));
            }
            if !seen_vendors.insert(vendor.name.clone()) {
                return Err(PlanError::Configuration(format!(
                    "duplicate vendor '{}'",
                    vendor.name
                )));
            }
            validate_coordinates(&vendor.name, vendor.coords)?;

            if vendor.packages.is_empty() {
                return Err(PlanError::Configuration(format!(
                    "vendor '{}' offers no packages",
                    vendor.name
                )));
            }

            if let Some(rule) = &vendor.shipping {
                if !rule.fee.is_finite() || rule.fee < 0.0 {
                    return Err(PlanError::Configuration(format!(
                        "vendor '{}' has an invalid shipping fee {}",
                        vendor.name, rule.fee
                    )));
                }
                if let Some(threshold) = rule.free_threshold {
                    if !threshold.is_finite() || threshold <= 0.0 {
                        return Err(PlanError::Configuration(format!(
                            "vendor '{}' has an invalid free-shipping threshold {}",
                            vendor.name, threshold
                        )));
                    }
                }
            }

            let mut seen_packages = HashSet::new();
            for package in &vendor.packages {
                if package.id.is_empty() {
                    return Err(PlanError::Configuration(format!(
                        "vendor '{}' has a package with an empty id",
                        vendor.name
                    )));
                }
                if !seen_packages.insert(package.id.clone()) {
                    return Err(PlanError::Configuration(format!(
                        "vendor '{}' lists package '{}' twice",
                        vendor.name, package.id
                    )));
                }
                if !package.price.is_finite() || package.price <= 0.0 {
                    return Err(PlanError::Configuration(format!(
                        "package '{}' at '{}' has an invalid price {}",
                        package.id, vendor.name, package.price
                    )));
                }
                if !package.fluid_ounces.is_finite() || package.fluid_ounces <= 0.0 {
                    return Err(PlanError::Configuration(format!(
                        "package '{}' at '{}' has an invalid volume {}",
                        package.id, vendor.name, package.fluid_ounces
                    )));
                }
                if package.unit_count == 0 {
                    return Err(PlanError::Configuration(format!(
                        "package '{}' at '{}' has a unit count of 0",
                        package.id, vendor.name
                    )));
                }
                if self.preference(&package.container).is_none() {
                    return Err(PlanError::Configuration(format!(
                        "package '{}' at '{}' uses container '{}' which has no preference entry",
                        package.id, vendor.name, package.container
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::demo::demo_catalog;

    #[test]
    fn demo_catalog_passes_validation() {
        assert!(demo_catalog().validate().is_ok());
    }

    #[test]
    fn container_tags_round_trip_through_strings() {
        assert_eq!(
            ContainerCategory::from("can".to_string()),
            ContainerCategory::Can
        );
        assert_eq!(
            ContainerCategory::from("cup".to_string()),
            ContainerCategory::Other("cup".to_string())
        );
        assert_eq!(String::from(ContainerCategory::Glass), "glass");
        assert_eq!(ContainerCategory::Plastic.to_string(), "plastic");
    }

    #[test]
    fn threshold_rule_waives_fee_at_the_threshold() {
        let rule = ShippingRule {
            fee: 10.0,
            free_threshold: Some(80.0),
        };
        assert_eq!(rule.surcharge(79.99), 10.0);
        assert_eq!(rule.surcharge(80.0), 0.0);
        assert_eq!(rule.surcharge(200.0), 0.0);
    }

    #[test]
    fn flat_rule_always_charges() {
        let rule = ShippingRule {
            fee: 9.55,
            free_threshold: None,
        };
        assert_eq!(rule.surcharge(0.0), 9.55);
        assert_eq!(rule.surcharge(500.0), 9.55);
    }

    #[test]
    fn zero_unit_count_is_rejected() {
        let mut catalog = demo_catalog();
        catalog.vendors[0].packages[0].unit_count = 0;
        let err = catalog.validate().unwrap_err();
        assert!(matches!(err, PlanError::Configuration(_)));
        assert!(err.to_string().contains("unit count of 0"));
    }

    #[test]
    fn unknown_container_is_rejected() {
        let mut catalog = demo_catalog();
        catalog.vendors[0].packages[0].container = ContainerCategory::Other("pouch".to_string());
        let err = catalog.validate().unwrap_err();
        assert!(err.to_string().contains("no preference entry"));
    }

    #[test]
    fn out_of_range_latitude_is_a_validation_error() {
        let mut catalog = demo_catalog();
        catalog.vendors[0].coords.lat = 99.0;
        assert!(matches!(
            catalog.validate().unwrap_err(),
            PlanError::Validation(_)
        ));
    }

    #[test]
    fn duplicate_vendor_names_are_rejected() {
        let mut catalog = demo_catalog();
        let clone = catalog.vendors[0].clone();
        catalog.vendors.push(clone);
        assert!(matches!(
            catalog.validate().unwrap_err(),
            PlanError::Configuration(_)
        ));
    }
}
