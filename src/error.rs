use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Failure taxonomy for a planning run.
///
/// Nothing here is recovered silently: every variant propagates to the caller
/// and the binary exits nonzero with the message rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanError {
    /// Malformed or out-of-domain user input (bad requested quantity,
    /// out-of-range coordinates).
    Validation(String),
    /// Inconsistent static catalog data (unknown container category, zero
    /// unit count, duplicate names). Fatal, never defaulted.
    Configuration(String),
    /// No integer combination of package sizes reaches the requested total.
    /// Carries the closest achievable totals when any exist.
    Infeasible {
        requested_units: u32,
        nearest_below: Option<u32>,
        nearest_above: Option<u32>,
    },
    /// A solver stage ran past its wall-clock budget. Distinct from
    /// infeasibility; a retry with a larger budget may succeed.
    SolverTimeout { stage: &'static str, budget: Duration },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::Validation(msg) => write!(f, "invalid input: {}", msg),
            PlanError::Configuration(msg) => write!(f, "catalog configuration error: {}", msg),
            PlanError::Infeasible {
                requested_units,
                nearest_below,
                nearest_above,
            } => {
                write!(
                    f,
                    "no package combination adds up to exactly {} units",
                    requested_units
                )?;
                match (nearest_below, nearest_above) {
                    (Some(lo), Some(hi)) => {
                        write!(f, " (nearest achievable totals: {} and {})", lo, hi)
                    }
                    (Some(lo), None) => write!(f, " (nearest achievable total: {})", lo),
                    (None, Some(hi)) => write!(f, " (nearest achievable total: {})", hi),
                    (None, None) => Ok(()),
                }
            }
            PlanError::SolverTimeout { stage, budget } => {
                write!(f, "{} solver exceeded its {:?} time budget", stage, budget)
            }
        }
    }
}

impl Error for PlanError {}
