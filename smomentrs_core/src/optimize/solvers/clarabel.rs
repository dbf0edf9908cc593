//! Implements a solver interface for Clarabel
//!
//! Clarabel solves `min ½xᵀPx + qᵀx` subject to `Ax + s = b`, `s ∈ K`. Linear problems use a zero
//! P, the steady state rows go into the zero cone and the bound rows into the nonnegative cone.
use clarabel::algebra::CscMatrix;
use clarabel::solver::{DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT};
use indexmap::IndexMap;
use log::debug;

use crate::configuration::tolerance;
use crate::metabolic_model::model::Model;
use crate::optimize::problem::LinearProblem;
use crate::optimize::solvers::FluxSolver;
use crate::optimize::{FluxRange, FluxSolution, ObjectiveSense, OptimizationStatus, SolveError};

/// Interior point LP solver backed by Clarabel
#[derive(Copy, Clone, Debug)]
pub struct ClarabelSolver {
    /// Feasibility tolerance
    pub tolerance: f64,
    /// Maximum number of interior point iterations
    pub max_iter: u32,
}

impl Default for ClarabelSolver {
    fn default() -> Self {
        ClarabelSolver {
            tolerance: tolerance(),
            max_iter: 200,
        }
    }
}

impl ClarabelSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solve a linear problem, returning the status and the variable values if a solution was
    /// found
    pub fn solve_problem(
        &self,
        problem: &LinearProblem,
    ) -> Result<(OptimizationStatus, Option<Vec<f64>>), SolveError> {
        let n = problem.num_variables();
        let num_equalities = problem.num_equalities();
        let num_inequalities = problem.num_inequalities();

        let p = CscMatrix::new(n, n, vec![0; n + 1], vec![], vec![]);
        let q = problem.minimization_objective();
        let (col_offsets, row_indices, values) = problem.constraint_matrix().disassemble();
        let a = CscMatrix::new(
            num_equalities + num_inequalities,
            n,
            col_offsets,
            row_indices,
            values,
        );
        let b = problem.rhs();

        let mut cones = Vec::with_capacity(2);
        if num_equalities > 0 {
            cones.push(SupportedConeT::ZeroConeT(num_equalities));
        }
        if num_inequalities > 0 {
            cones.push(SupportedConeT::NonnegativeConeT(num_inequalities));
        }

        let settings = DefaultSettingsBuilder::default()
            .verbose(false)
            .tol_feas(self.tolerance)
            .max_iter(self.max_iter)
            .build()
            .map_err(|err| SolveError::Settings(err.to_string()))?;

        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings);
        solver.solve();

        let status = match solver.solution.status {
            SolverStatus::Solved => OptimizationStatus::Optimal,
            SolverStatus::AlmostSolved => OptimizationStatus::AlmostOptimal,
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                OptimizationStatus::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                OptimizationStatus::Unbounded
            }
            SolverStatus::NumericalError => OptimizationStatus::NumericalError,
            _ => OptimizationStatus::SolverHalted,
        };
        debug!("Clarabel finished with status {status}");
        let values = match status {
            OptimizationStatus::Optimal | OptimizationStatus::AlmostOptimal => {
                Some(solver.solution.x.clone())
            }
            _ => None,
        };
        Ok((status, values))
    }

    /// Optimal value of the problem's current objective
    fn optimal_value(&self, problem: &LinearProblem) -> Result<f64, SolveError> {
        match self.solve_problem(problem)? {
            (OptimizationStatus::Optimal, Some(values)) => Ok(problem.objective_value(&values)),
            (status, _) => Err(SolveError::NotOptimal(status)),
        }
    }
}

impl FluxSolver for ClarabelSolver {
    fn optimize(&self, model: &Model) -> Result<FluxSolution, SolveError> {
        let problem = LinearProblem::from_model(model)?;
        if !problem.has_objective() {
            return Err(SolveError::NoObjective);
        }
        let (status, values) = self.solve_problem(&problem)?;
        let Some(values) = values else {
            return Ok(FluxSolution::failed(status));
        };
        let fluxes = problem
            .variables()
            .iter()
            .cloned()
            .zip(values.iter().copied())
            .collect();
        Ok(FluxSolution {
            status,
            objective_value: Some(problem.objective_value(&values)),
            fluxes: Some(fluxes),
        })
    }

    fn fva(
        &self,
        model: &Model,
        reactions: &[String],
        fraction_of_optimum: f64,
    ) -> Result<IndexMap<String, FluxRange>, SolveError> {
        if !(0. ..=1.).contains(&fraction_of_optimum) {
            return Err(SolveError::InvalidFraction(fraction_of_optimum));
        }
        let mut problem = LinearProblem::from_model(model)?;
        if !problem.has_objective() {
            return Err(SolveError::NoObjective);
        }
        let optimum = self.optimal_value(&problem)?;
        problem.add_objective_floor(fraction_of_optimum * optimum - self.tolerance);

        let mut ranges = IndexMap::with_capacity(reactions.len());
        for reaction in reactions {
            problem.set_single_objective(reaction, ObjectiveSense::Minimize)?;
            let minimum = self.optimal_value(&problem)?;
            problem.set_single_objective(reaction, ObjectiveSense::Maximize)?;
            let maximum = self.optimal_value(&problem)?;
            ranges.insert(reaction.clone(), FluxRange { minimum, maximum });
        }
        Ok(ranges)
    }
}
