//! Module for constructing and solving the flux balance problems of a model

pub mod problem;
pub mod solvers;

use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use thiserror::Error;

use crate::metabolic_model::model::ModelError;

/// Struct representing the solution of a flux balance problem
#[derive(Clone, Debug, PartialEq)]
pub struct FluxSolution {
    /// The status of the optimization, representing if it was completed successfully
    pub status: OptimizationStatus,
    /// Optimized value of the objective
    ///
    /// Some(f64) if the optimization was completed successfully, None otherwise
    pub objective_value: Option<f64>,
    /// Flux of every reaction at the optimum, keyed by reaction id
    ///
    /// Some(IndexMap) if the problem could be solved, None otherwise
    pub fluxes: Option<IndexMap<String, f64>>,
}

impl FluxSolution {
    /// Solution of a problem which could not be solved
    pub fn failed(status: OptimizationStatus) -> Self {
        FluxSolution {
            status,
            objective_value: None,
            fluxes: None,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == OptimizationStatus::Optimal
    }

    /// Flux of a reaction at the optimum
    pub fn flux(&self, reaction: &str) -> Option<f64> {
        self.fluxes.as_ref()?.get(reaction).copied()
    }

    /// The objective value, or an error carrying the status if the problem was not solved
    pub fn optimal_value(&self) -> Result<f64, SolveError> {
        match (self.status, self.objective_value) {
            (OptimizationStatus::Optimal, Some(value)) => Ok(value),
            (status, _) => Err(SolveError::NotOptimal(status)),
        }
    }
}

/// Minimum and maximum flux of a reaction
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FluxRange {
    pub minimum: f64,
    pub maximum: f64,
}

/// Status of an optimization problem
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OptimizationStatus {
    /// Problem has been optimized
    Optimal,
    /// Problem can't be optimized because objective value is not bounded
    Unbounded,
    /// Problem can't be solved because it is infeasible (conflicting constraints)
    Infeasible,
    /// An approximate solution has been found
    AlmostOptimal,
    /// A numerical error occurred during solving
    NumericalError,
    /// The solver hit the maximum allowed iterations, or max time, or made insufficient progress
    SolverHalted,
}

impl Display for OptimizationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizationStatus::Optimal => write!(f, "optimal"),
            OptimizationStatus::Unbounded => write!(f, "unbounded"),
            OptimizationStatus::Infeasible => write!(f, "infeasible"),
            OptimizationStatus::AlmostOptimal => write!(f, "almost optimal"),
            OptimizationStatus::NumericalError => write!(f, "numerical error"),
            OptimizationStatus::SolverHalted => write!(f, "solver halted"),
        }
    }
}

/// Direction of optimization
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectiveSense {
    Minimize,
    Maximize,
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("The model has no objective")]
    NoObjective,
    #[error("The problem could not be solved, status: {0}")]
    NotOptimal(OptimizationStatus),
    #[error("Invalid solver settings: {0}")]
    Settings(String),
    #[error("Invalid fraction of optimum {0}, expected a value in [0, 1]")]
    InvalidFraction(f64),
    #[error(transparent)]
    Model(#[from] ModelError),
}
