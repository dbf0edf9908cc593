//! Flux variability of a protein-constrained model under several protein pool sizes
use indexmap::IndexMap;
use log::info;

use crate::analysis::AnalysisError;
use crate::enhance::POOL_REACTION;
use crate::metabolic_model::model::Model;
use crate::optimize::solvers::FluxSolver;
use crate::optimize::{FluxRange, FluxSolution};

/// Result of one pool size
#[derive(Clone, Debug, PartialEq)]
pub struct ProtPoolFva {
    /// Upper bound of the pool reaction
    pub pool_upper_bound: f64,
    pub solution: FluxSolution,
    /// Flux ranges at the optimum
    pub ranges: IndexMap<String, FluxRange>,
}

/// For each pool upper bound, optimize and run an FVA at 100% of the optimum
///
/// `objective` replaces the model's objective when given. When `reactions` is empty the ranges
/// of all reactions are calculated. The model is unchanged afterwards.
pub fn fva_prot_pool<S: FluxSolver + ?Sized>(
    model: &mut Model,
    solver: &S,
    pool_upper_bounds: &[f64],
    objective: Option<&str>,
    reactions: &[String],
) -> Result<Vec<ProtPoolFva>, AnalysisError> {
    let reactions: Vec<String> = if reactions.is_empty() {
        model.reactions.keys().cloned().collect()
    } else {
        reactions.to_vec()
    };

    let mut results = Vec::with_capacity(pool_upper_bounds.len());
    for &pool_upper_bound in pool_upper_bounds {
        let mut ctx = model.context();
        if let Some(objective) = objective {
            ctx.set_objective(objective)?;
        }
        ctx.set_upper_bound(POOL_REACTION, pool_upper_bound)?;
        let solution = solver.optimize(&ctx)?;
        let optimum = solution.optimal_value()?;
        info!("Objective value {optimum} for a protein pool upper bound of {pool_upper_bound}");
        let ranges = solver.fva(&ctx, &reactions, 1.)?;
        results.push(ProtPoolFva {
            pool_upper_bound,
            solution,
            ranges,
        });
    }
    Ok(results)
}
