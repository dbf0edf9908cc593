//! Interface for the solvers used to optimize flux balance problems
pub mod clarabel;

use indexmap::IndexMap;

use crate::metabolic_model::model::Model;
use crate::optimize::{FluxRange, FluxSolution, SolveError};

/// A solver able to optimize the steady state fluxes of a model
pub trait FluxSolver {
    /// Maximize the model's objective subject to steady state and the flux bounds
    fn optimize(&self, model: &Model) -> Result<FluxSolution, SolveError>;

    /// Flux variability analysis
    ///
    /// For each reaction in `reactions`, find its minimum and maximum flux while the model's
    /// objective stays at least `fraction_of_optimum` of its optimum.
    fn fva(
        &self,
        model: &Model,
        reactions: &[String],
        fraction_of_optimum: f64,
    ) -> Result<IndexMap<String, FluxRange>, SolveError>;
}
