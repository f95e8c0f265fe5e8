use tracing::debug;

use crate::distance::geo::haversine;
use crate::domain::types::Coordinates;

/// Create the full pairwise distance matrix for an ordered set of points.
/// Only the upper triangle is computed; the lower half is mirrored.
pub fn create_dm(points: &[Coordinates]) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut dm = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let distance = haversine(points[i], points[j]);
            dm[i][j] = distance;
            dm[j][i] = distance;
        }
    }

    debug!("Distance matrix for {} points built", n);
    dm
}

// Log the matrix rows for debugging.
pub fn print_dist_matrix(dm: &[Vec<f64>]) {
    debug!("Distance matrix:");
    for row in dm {
        debug!("{:?}", row);
    }
}
