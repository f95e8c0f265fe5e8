use std::time::{Duration, Instant};

use crate::error::PlanError;

/// Wall-clock budget for one solver stage.
#[derive(Debug, Clone)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn start(budget: Duration) -> Self {
        Deadline {
            started: Instant::now(),
            budget,
        }
    }

    pub fn check(&self, stage: &'static str) -> Result<(), PlanError> {
        if self.started.elapsed() > self.budget {
            Err(PlanError::SolverTimeout {
                stage,
                budget: self.budget,
            })
        } else {
            Ok(())
        }
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
