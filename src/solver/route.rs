use tracing::{debug, info};

use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::utils::Deadline;

const STAGE: &str = "route";
const DEADLINE_MASK_STRIDE: usize = 1024;

/// Stop ordering for one closed tour over the distance matrix. Row and
/// column 0 of the matrix are the depot; `order` holds the remaining matrix
/// indices in visiting sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSolution {
    pub order: Vec<usize>,
    pub total_distance: f64,
    pub exact: bool,
}

/// Find a short closed tour that leaves the depot, visits every other point
/// once, and returns. Small instances are solved exactly by Held-Karp;
/// larger ones get a nearest-neighbour build plus local descent.
pub fn solve(
    matrix: &[Vec<f64>],
    config: &PlannerConfig,
    deadline: &Deadline,
) -> Result<RouteSolution, PlanError> {
    deadline.check(STAGE)?;
    debug_assert!(matrix.len() >= 2);
    let stops = matrix.len() - 1;

    if stops <= config.exact_route_max_stops {
        find_exact_tour(matrix, stops, deadline)
    } else {
        find_heuristic_tour(matrix, stops, deadline)
    }
}

/// Held-Karp over subsets of stops. State is (visited set, last stop), laid
/// out as one flat table of `2^stops * stops` cells.
fn find_exact_tour(
    matrix: &[Vec<f64>],
    stops: usize,
    deadline: &Deadline,
) -> Result<RouteSolution, PlanError> {
    let full: usize = (1 << stops) - 1;
    let mut dp = vec![f64::INFINITY; (full + 1) * stops];
    let mut parent = vec![usize::MAX; (full + 1) * stops];

    for j in 0..stops {
        dp[(1 << j) * stops + j] = matrix[0][j + 1];
    }

    for mask in 1..=full {
        if mask % DEADLINE_MASK_STRIDE == 0 {
            deadline.check(STAGE)?;
        }
        for j in 0..stops {
            if mask & (1 << j) == 0 {
                continue;
            }
            let here = dp[mask * stops + j];
            if !here.is_finite() {
                continue;
            }
            for k in 0..stops {
                if mask & (1 << k) != 0 {
                    continue;
                }
                let next_mask = mask | (1 << k);
                let candidate = here + matrix[j + 1][k + 1];
                if candidate < dp[next_mask * stops + k] {
                    dp[next_mask * stops + k] = candidate;
                    parent[next_mask * stops + k] = j;
                }
            }
        }
    }

    let mut best_last = 0;
    let mut best_total = f64::INFINITY;
    for j in 0..stops {
        let total = dp[full * stops + j] + matrix[j + 1][0];
        if total < best_total {
            best_total = total;
            best_last = j;
        }
    }

    let mut order = Vec::with_capacity(stops);
    let mut mask = full;
    let mut j = best_last;
    loop {
        order.push(j + 1);
        let prev = parent[mask * stops + j];
        if prev == usize::MAX {
            break;
        }
        mask ^= 1 << j;
        j = prev;
    }
    order.reverse();

    info!("Exact tour over {} stops: {:.2} miles", stops, best_total);
    Ok(RouteSolution {
        order,
        total_distance: best_total,
        exact: true,
    })
}

/// Nearest-neighbour construction followed by 2-opt and pairwise-swap
/// descent, repeated until neither move improves the tour.
fn find_heuristic_tour(
    matrix: &[Vec<f64>],
    stops: usize,
    deadline: &Deadline,
) -> Result<RouteSolution, PlanError> {
    let mut remaining: Vec<usize> = (1..=stops).collect();
    let mut order = Vec::with_capacity(stops);
    let mut current = 0;
    while !remaining.is_empty() {
        let mut best_pos = 0;
        for pos in 1..remaining.len() {
            if matrix[current][remaining[pos]] < matrix[current][remaining[best_pos]] {
                best_pos = pos;
            }
        }
        current = remaining.swap_remove(best_pos);
        order.push(current);
    }

    let mut improved = true;
    while improved {
        deadline.check(STAGE)?;
        improved = false;

        // 2-opt: reverse order[i..=k] when the two replaced edges shrink.
        for i in 0..stops - 1 {
            for k in i + 1..stops {
                let before_i = if i == 0 { 0 } else { order[i - 1] };
                let after_k = if k == stops - 1 { 0 } else { order[k + 1] };
                let delta = matrix[before_i][order[k]] + matrix[order[i]][after_k]
                    - matrix[before_i][order[i]]
                    - matrix[order[k]][after_k];
                if delta < -1e-9 {
                    order[i..=k].reverse();
                    improved = true;
                }
            }
        }

        // Pairwise swaps catch moves that segment reversal cannot express.
        let mut best_total = find_tour_distance(&order, matrix);
        for i in 0..stops - 1 {
            for k in i + 1..stops {
                order.swap(i, k);
                let total = find_tour_distance(&order, matrix);
                if total < best_total - 1e-9 {
                    best_total = total;
                    improved = true;
                } else {
                    order.swap(i, k);
                }
            }
        }
    }

    let total_distance = find_tour_distance(&order, matrix);
    debug!("Heuristic tour order: {:?}", order);
    info!(
        "Heuristic tour over {} stops: {:.2} miles",
        stops, total_distance
    );
    Ok(RouteSolution {
        order,
        total_distance,
        exact: false,
    })
}

/// Total length of the closed tour depot -> order[0] -> .. -> depot.
fn find_tour_distance(order: &[usize], matrix: &[Vec<f64>]) -> f64 {
    let mut total = matrix[0][order[0]];
    for pair in order.windows(2) {
        total += matrix[pair[0]][pair[1]];
    }
    total + matrix[order[order.len() - 1]][0]
}
