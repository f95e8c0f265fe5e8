use crate::config::constant::EARTH_RADIUS_MILES;
use crate::domain::types::Coordinates;
use crate::error::PlanError;

/// Great-circle distance between two points in miles (haversine).
///
/// Symmetric, zero for identical points. The intermediate term is clamped to
/// [0, 1] so floating-point overshoot near antipodal or near-coincident
/// points never leaves the sqrt/atan2 domain.
pub fn haversine(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let r_lat1 = a.lat.to_radians();
    let r_lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + r_lat1.cos() * r_lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Reject non-finite or out-of-range coordinates before they reach any
/// distance computation.
pub fn validate_coordinates(name: &str, coords: Coordinates) -> Result<(), PlanError> {
    if !coords.lat.is_finite() || !(-90.0..=90.0).contains(&coords.lat) {
        return Err(PlanError::Validation(format!(
            "'{}' has latitude {} outside [-90, 90]",
            name, coords.lat
        )));
    }
    if !coords.lon.is_finite() || !(-180.0..=180.0).contains(&coords.lon) {
        return Err(PlanError::Validation(format!(
            "'{}' has longitude {} outside [-180, 180]",
            name, coords.lon
        )));
    }
    Ok(())
}
