//! Provides struct representing the linear program of a flux balance problem
//!
//! The problem is kept in the form `min q·x` subject to `A_eq x = b_eq` and `A_ineq x ≤ b_ineq`,
//! with one variable per reaction and one equality row per metabolite (steady state). Flux
//! bounds become inequality rows, infinite bounds are left out.
use indexmap::{IndexMap, IndexSet};
use nalgebra_sparse::coo::CooMatrix;
use nalgebra_sparse::csc::CscMatrix;

use crate::metabolic_model::model::{Model, ModelError};
use crate::optimize::{ObjectiveSense, SolveError};

/// A sparse row of coefficients, keyed by variable index
type Row = Vec<(usize, f64)>;

/// A linear program over the fluxes of a model
#[derive(Clone, Debug)]
pub struct LinearProblem {
    /// Variable ids (reaction ids) in column order
    variables: IndexSet<String>,
    /// Objective coefficients in column order
    objective: Vec<f64>,
    /// Objective sense
    sense: ObjectiveSense,
    /// Rows of `A_eq x = b_eq`
    equalities: Vec<(Row, f64)>,
    /// Rows of `A_ineq x ≤ b_ineq`
    inequalities: Vec<(Row, f64)>,
}

impl LinearProblem {
    // region Creation Functions
    /// Create the steady state problem of a model, maximizing the model's objective
    pub fn from_model(model: &Model) -> Result<Self, SolveError> {
        let variables: IndexSet<String> = model.reactions.keys().cloned().collect();

        let mut metabolite_rows: IndexMap<&str, Row> = model
            .metabolites
            .keys()
            .map(|id| (id.as_str(), Row::new()))
            .collect();
        let mut inequalities = Vec::new();
        for (index, reaction) in model.reactions.values().enumerate() {
            for (metabolite, coefficient) in &reaction.metabolites {
                metabolite_rows
                    .entry(metabolite.as_str())
                    .or_default()
                    .push((index, *coefficient));
            }
            if reaction.upper_bound.is_finite() {
                inequalities.push((vec![(index, 1.)], reaction.upper_bound));
            }
            if reaction.lower_bound.is_finite() {
                inequalities.push((vec![(index, -1.)], -reaction.lower_bound));
            }
        }
        let equalities = metabolite_rows
            .into_values()
            .filter(|row| !row.is_empty())
            .map(|row| (row, 0.))
            .collect();

        let mut problem = LinearProblem {
            objective: vec![0.; variables.len()],
            variables,
            sense: ObjectiveSense::Maximize,
            equalities,
            inequalities,
        };
        problem.set_objective(&model.objective, ObjectiveSense::Maximize)?;
        Ok(problem)
    }
    // endregion Creation Functions

    // region Objective
    /// Replace the objective, coefficients keyed by reaction id
    pub fn set_objective(
        &mut self,
        coefficients: &IndexMap<String, f64>,
        sense: ObjectiveSense,
    ) -> Result<(), SolveError> {
        let mut objective = vec![0.; self.variables.len()];
        for (id, coefficient) in coefficients {
            objective[self.index_of(id)?] = *coefficient;
        }
        self.objective = objective;
        self.sense = sense;
        Ok(())
    }

    /// Optimize the flux of a single reaction
    pub fn set_single_objective(
        &mut self,
        reaction: &str,
        sense: ObjectiveSense,
    ) -> Result<(), SolveError> {
        let mut coefficients = IndexMap::new();
        coefficients.insert(reaction.to_string(), 1.);
        self.set_objective(&coefficients, sense)
    }

    pub fn has_objective(&self) -> bool {
        self.objective.iter().any(|c| *c != 0.)
    }

    /// Value of the objective for the given variable values
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.iter().zip(values).map(|(c, x)| c * x).sum()
    }

    /// Objective coefficients of the equivalent minimization problem
    pub fn minimization_objective(&self) -> Vec<f64> {
        match self.sense {
            ObjectiveSense::Minimize => self.objective.clone(),
            ObjectiveSense::Maximize => self.objective.iter().map(|c| -c).collect(),
        }
    }
    // endregion Objective

    // region Constraints
    /// Require the current objective to reach at least `minimum`
    pub fn add_objective_floor(&mut self, minimum: f64) {
        let row: Row = self
            .objective
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != 0.)
            .map(|(i, c)| (i, -c))
            .collect();
        self.inequalities.push((row, -minimum));
    }
    // endregion Constraints

    // region Accessors
    pub fn index_of(&self, variable: &str) -> Result<usize, SolveError> {
        self.variables
            .get_index_of(variable)
            .ok_or_else(|| ModelError::ReactionNotFound(variable.to_string()).into())
    }

    pub fn variables(&self) -> &IndexSet<String> {
        &self.variables
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_equalities(&self) -> usize {
        self.equalities.len()
    }

    pub fn num_inequalities(&self) -> usize {
        self.inequalities.len()
    }

    /// Stacked constraint matrix, equality rows first
    pub fn constraint_matrix(&self) -> CscMatrix<f64> {
        let mut coo = CooMatrix::new(
            self.num_equalities() + self.num_inequalities(),
            self.num_variables(),
        );
        for (row_index, (row, _)) in self.equalities.iter().chain(&self.inequalities).enumerate() {
            for (column, value) in row {
                coo.push(row_index, *column, *value);
            }
        }
        CscMatrix::from(&coo)
    }

    /// Stacked right hand side, equality rows first
    pub fn rhs(&self) -> Vec<f64> {
        self.equalities
            .iter()
            .chain(&self.inequalities)
            .map(|(_, b)| *b)
            .collect()
    }
    // endregion Accessors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::reaction::Reaction;

    fn model() -> Model {
        let mut model = Model::new_empty();
        let mut uptake = IndexMap::new();
        uptake.insert("a".to_string(), 1.);
        model.add_reaction(Reaction::new("EX_a", uptake, 0., 10.));
        let mut conversion = IndexMap::new();
        conversion.insert("a".to_string(), -1.);
        conversion.insert("b".to_string(), 2.);
        model.add_reaction(Reaction::new("CONV", conversion, f64::NEG_INFINITY, f64::INFINITY));
        let mut sink = IndexMap::new();
        sink.insert("b".to_string(), -1.);
        model.add_reaction(Reaction::new("SINK_b", sink, 0., 1000.));
        model.set_objective("SINK_b").unwrap();
        model
    }

    #[test]
    fn problem_layout() {
        let problem = LinearProblem::from_model(&model()).unwrap();
        assert_eq!(problem.num_variables(), 3);
        assert_eq!(problem.num_equalities(), 2);
        // Infinite bounds of CONV are left out
        assert_eq!(problem.num_inequalities(), 4);
        assert_eq!(problem.rhs(), vec![0., 0., 10., -0., 1000., -0.]);
        assert_eq!(problem.minimization_objective(), vec![0., 0., -1.]);

        let matrix = problem.constraint_matrix();
        assert_eq!(matrix.nrows(), 6);
        assert_eq!(matrix.ncols(), 3);
        assert_eq!(matrix.nnz(), 8);
    }

    #[test]
    fn objective_floor() {
        let mut problem = LinearProblem::from_model(&model()).unwrap();
        problem.add_objective_floor(15.);
        assert_eq!(problem.num_inequalities(), 5);
        assert_eq!(problem.rhs().last(), Some(&-15.));
        assert_eq!(problem.objective_value(&[10., 10., 20.]), 20.);
        assert!(problem.set_single_objective("UNKNOWN", ObjectiveSense::Minimize).is_err());
    }
}
