//! Scoped model modifications
//!
//! A [`ModelContext`] borrows a [`Model`] mutably and records every change made through it.
//! When the context is dropped the changes are undone in reverse order, so the model is
//! returned to its prior state on every exit path (including early returns through `?`).
use std::ops::Deref;

use indexmap::IndexMap;

use crate::metabolic_model::model::{Model, ModelError};

enum Undo {
    Bounds {
        reaction: String,
        lower: f64,
        upper: f64,
    },
    Stoichiometry {
        reaction: String,
        metabolites: IndexMap<String, f64>,
    },
    Objective(IndexMap<String, f64>),
}

/// Guard over a model whose modifications are reverted on drop
pub struct ModelContext<'m> {
    model: &'m mut Model,
    undo: Vec<Undo>,
}

impl Model {
    /// Open a scope in which changes to bounds, coefficients and the objective are reverted
    /// once the returned guard goes out of scope
    pub fn context(&mut self) -> ModelContext<'_> {
        ModelContext {
            model: self,
            undo: Vec::new(),
        }
    }
}

impl<'m> ModelContext<'m> {
    /// Open a nested scope, whose changes are reverted before those of this scope
    pub fn context(&mut self) -> ModelContext<'_> {
        self.model.context()
    }

    /// Set both flux bounds of a reaction
    pub fn set_bounds(&mut self, reaction: &str, lower: f64, upper: f64) -> Result<(), ModelError> {
        if lower > upper {
            return Err(ModelError::InvalidBounds {
                reaction: reaction.to_string(),
                lower,
                upper,
            });
        }
        let rxn = self.model.reaction_mut(reaction)?;
        self.undo.push(Undo::Bounds {
            reaction: reaction.to_string(),
            lower: rxn.lower_bound,
            upper: rxn.upper_bound,
        });
        rxn.lower_bound = lower;
        rxn.upper_bound = upper;
        Ok(())
    }

    /// Set the lower flux bound of a reaction, keeping the upper bound
    pub fn set_lower_bound(&mut self, reaction: &str, lower: f64) -> Result<(), ModelError> {
        let upper = self.model.reaction(reaction)?.upper_bound;
        self.set_bounds(reaction, lower, upper)
    }

    /// Set the upper flux bound of a reaction, keeping the lower bound
    pub fn set_upper_bound(&mut self, reaction: &str, upper: f64) -> Result<(), ModelError> {
        let lower = self.model.reaction(reaction)?.lower_bound;
        self.set_bounds(reaction, lower, upper)
    }

    /// Set a stoichiometric coefficient, removing the metabolite from the reaction when 0
    pub fn set_coefficient(
        &mut self,
        reaction: &str,
        metabolite: &str,
        value: f64,
    ) -> Result<(), ModelError> {
        let rxn = self.model.reaction_mut(reaction)?;
        self.undo.push(Undo::Stoichiometry {
            reaction: reaction.to_string(),
            metabolites: rxn.metabolites.clone(),
        });
        rxn.set_coefficient(metabolite, value);
        Ok(())
    }

    /// Replace the objective with maximisation of a single reaction
    pub fn set_objective(&mut self, reaction: &str) -> Result<(), ModelError> {
        let previous = self.model.objective.clone();
        self.model.set_objective(reaction)?;
        self.undo.push(Undo::Objective(previous));
        Ok(())
    }
}

impl Deref for ModelContext<'_> {
    type Target = Model;

    fn deref(&self) -> &Self::Target {
        self.model
    }
}

impl Drop for ModelContext<'_> {
    fn drop(&mut self) {
        while let Some(undo) = self.undo.pop() {
            match undo {
                Undo::Bounds {
                    reaction,
                    lower,
                    upper,
                } => {
                    if let Some(rxn) = self.model.reactions.get_mut(&reaction) {
                        rxn.lower_bound = lower;
                        rxn.upper_bound = upper;
                    }
                }
                Undo::Stoichiometry {
                    reaction,
                    metabolites,
                } => {
                    if let Some(rxn) = self.model.reactions.get_mut(&reaction) {
                        rxn.metabolites = metabolites;
                    }
                }
                Undo::Objective(objective) => self.model.objective = objective,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::reaction::Reaction;

    fn model() -> Model {
        let mut model = Model::new_empty();
        let mut metabolites = IndexMap::new();
        metabolites.insert("a".to_string(), -1.);
        metabolites.insert("prot_pool".to_string(), -0.25);
        metabolites.insert("b".to_string(), 1.);
        model.add_reaction(Reaction::new("R1", metabolites, 0., 10.));
        model.add_reaction(Reaction::new("BIO", IndexMap::new(), 0., 1000.));
        model.set_objective("R1").unwrap();
        model
    }

    #[test]
    fn changes_are_reverted_on_drop() {
        let mut model = model();
        let original = model.clone();
        {
            let mut ctx = model.context();
            ctx.set_bounds("R1", 2., 3.).unwrap();
            ctx.set_coefficient("R1", "prot_pool", 0.).unwrap();
            ctx.set_objective("BIO").unwrap();
            assert_eq!(ctx.reactions["R1"].lower_bound, 2.);
            assert!(!ctx.reactions["R1"].metabolites.contains_key("prot_pool"));
            assert_eq!(ctx.objective.get("BIO"), Some(&1.));
        }
        assert_eq!(model, original);
        // Coefficient order is preserved
        let order: Vec<&String> = model.reactions["R1"].metabolites.keys().collect();
        assert_eq!(order, vec!["a", "prot_pool", "b"]);
    }

    #[test]
    fn nested_contexts() {
        let mut model = model();
        let original = model.clone();
        {
            let mut outer = model.context();
            outer.set_upper_bound("R1", 5.).unwrap();
            {
                let mut inner = outer.context();
                inner.set_lower_bound("R1", 1.).unwrap();
                assert_eq!(inner.reactions["R1"].lower_bound, 1.);
                assert_eq!(inner.reactions["R1"].upper_bound, 5.);
            }
            assert_eq!(outer.reactions["R1"].lower_bound, 0.);
            assert_eq!(outer.reactions["R1"].upper_bound, 5.);
        }
        assert_eq!(model, original);
    }

    #[test]
    fn reverted_after_error() {
        fn failing(model: &mut Model) -> Result<(), ModelError> {
            let mut ctx = model.context();
            ctx.set_bounds("R1", 1., 1.)?;
            ctx.set_bounds("missing", 0., 1.)?;
            Ok(())
        }
        let mut model = model();
        let original = model.clone();
        assert_eq!(
            failing(&mut model),
            Err(ModelError::ReactionNotFound("missing".to_string()))
        );
        assert_eq!(model, original);

        let mut ctx = model.context();
        assert!(matches!(
            ctx.set_bounds("R1", 5., 1.),
            Err(ModelError::InvalidBounds { .. })
        ));
    }
}
