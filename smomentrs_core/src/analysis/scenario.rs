//! Growth scenarios: flux bound overrides and the reaction whose flux is observed
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::io::project::{read_json_file, ProjectDataError};
use crate::metabolic_model::context::ModelContext;
use crate::metabolic_model::model::ModelError;

/// New bounds of a reaction, bounds left out keep their value
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTarget {
    pub reaction: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Bound overrides keyed by reaction id
    #[serde(default)]
    pub setup: IndexMap<String, BoundOverride>,
    /// Reaction whose flux is compared between solutions
    pub target: ScenarioTarget,
    /// Reaction to maximize instead of the model's objective
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    /// Scenarios sharing a substitution name are merged in the differential analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitution_name: Option<String>,
}

/// Scenarios keyed by name
pub type Scenarios = IndexMap<String, Scenario>;

pub fn read_scenarios<P: AsRef<Path>>(path: P) -> Result<Scenarios, ProjectDataError> {
    read_json_file(path)
}

impl Scenario {
    /// Apply the objective and bound overrides inside a model context
    pub fn apply(&self, ctx: &mut ModelContext<'_>) -> Result<(), ModelError> {
        if let Some(objective) = &self.objective {
            ctx.set_objective(objective)?;
        }
        for (reaction, bounds) in &self.setup {
            let current = ctx.reaction(reaction)?;
            let lower = bounds.lower_bound.unwrap_or(current.lower_bound);
            let upper = bounds.upper_bound.unwrap_or(current.upper_bound);
            ctx.set_bounds(reaction, lower, upper)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::model::Model;
    use crate::metabolic_model::reaction::Reaction;

    #[test]
    fn parse_scenarios() {
        let scenarios: Scenarios = serde_json::from_str(
            r#"{
                "glucose": {
                    "setup": {"EX_glc__D_e": {"lower_bound": -10}, "EX_ac_e": {"upper_bound": 0}},
                    "target": {"reaction": "BIOMASS"}
                },
                "acetate": {
                    "setup": {"EX_ac_e": {"lower_bound": -10}},
                    "target": {"reaction": "BIOMASS"},
                    "objective": "ATPM",
                    "substitution_name": "organic_acids"
                }
            }"#,
        )
        .unwrap();
        let glucose = &scenarios["glucose"];
        assert_eq!(glucose.setup["EX_glc__D_e"].lower_bound, Some(-10.));
        assert_eq!(glucose.setup["EX_glc__D_e"].upper_bound, None);
        assert_eq!(glucose.objective, None);
        let acetate = &scenarios["acetate"];
        assert_eq!(acetate.objective.as_deref(), Some("ATPM"));
        assert_eq!(acetate.substitution_name.as_deref(), Some("organic_acids"));
    }

    #[test]
    fn apply_scenario() {
        let mut model = Model::new_empty();
        model.add_reaction(Reaction::new("EX_glc", IndexMap::new(), -10., 1000.));
        model.add_reaction(Reaction::new("BIO", IndexMap::new(), 0., 1000.));
        model.set_objective("EX_glc").unwrap();
        let original = model.clone();

        let mut setup = IndexMap::new();
        // A lower bound above the current upper bound is valid together with the new upper bound
        setup.insert(
            "BIO".to_string(),
            BoundOverride {
                lower_bound: Some(2000.),
                upper_bound: Some(3000.),
            },
        );
        setup.insert(
            "EX_glc".to_string(),
            BoundOverride {
                lower_bound: Some(-5.),
                upper_bound: None,
            },
        );
        let scenario = Scenario {
            setup,
            target: ScenarioTarget {
                reaction: "BIO".to_string(),
            },
            objective: Some("BIO".to_string()),
            substitution_name: None,
        };
        {
            let mut ctx = model.context();
            scenario.apply(&mut ctx).unwrap();
            assert_eq!(ctx.reactions["BIO"].lower_bound, 2000.);
            assert_eq!(ctx.reactions["BIO"].upper_bound, 3000.);
            assert_eq!(ctx.reactions["EX_glc"].lower_bound, -5.);
            assert_eq!(ctx.reactions["EX_glc"].upper_bound, 1000.);
            assert_eq!(ctx.objective.get("BIO"), Some(&1.));
        }
        assert_eq!(model, original);
    }

    #[test]
    fn unknown_reaction() {
        let mut model = Model::new_empty();
        let mut setup = IndexMap::new();
        setup.insert("MISSING".to_string(), BoundOverride::default());
        let scenario = Scenario {
            setup,
            target: ScenarioTarget {
                reaction: "BIO".to_string(),
            },
            objective: None,
            substitution_name: None,
        };
        let mut ctx = model.context();
        match scenario.apply(&mut ctx) {
            Err(ModelError::ReactionNotFound(id)) => assert_eq!(id, "MISSING"),
            other => panic!("Expected a missing reaction, got {other:?}"),
        }
    }
}
