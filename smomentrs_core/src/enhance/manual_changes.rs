//! Manual corrections of the kcats of an enhanced model
//!
//! A change multiplies the kcat of a reaction by a factor, which divides its protein pool
//! coefficient by that factor. Changes are read from JSON as
//! `{"PFK": ["forward", 2.0], "PGI": ["", 0.5]}`, the empty direction selecting a reaction
//! which was not split.
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{AssemblyError, PROT_POOL};
use crate::io::project::{read_json_file, ProjectDataError};
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::ReactionDirection;

/// Change of one reaction's kcat
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(String, f64)", into = "(String, f64)")]
pub struct KcatChange {
    pub direction: Option<ReactionDirection>,
    pub factor: f64,
}

impl TryFrom<(String, f64)> for KcatChange {
    type Error = String;

    fn try_from((direction, factor): (String, f64)) -> Result<Self, Self::Error> {
        let direction = match direction.as_str() {
            "" => None,
            "forward" => Some(ReactionDirection::Forward),
            "reverse" => Some(ReactionDirection::Reverse),
            other => {
                return Err(format!(
                    "invalid direction {:?}, expected \"forward\", \"reverse\" or \"\"",
                    other
                ))
            }
        };
        Ok(KcatChange { direction, factor })
    }
}

impl From<KcatChange> for (String, f64) {
    fn from(change: KcatChange) -> Self {
        let direction = change.direction.map(|d| d.to_string()).unwrap_or_default();
        (direction, change.factor)
    }
}

/// Reaction id (as in the input model) to its kcat change
pub type KcatChanges = IndexMap<String, KcatChange>;

pub fn read_kcat_changes<P: AsRef<Path>>(path: P) -> Result<KcatChanges, ProjectDataError> {
    read_json_file(path)
}

/// Apply kcat changes to the protein pool coefficients of an sMOMENT model
///
/// Every change is validated before anything is modified.
pub fn apply_manual_changes(model: &mut Model, changes: &KcatChanges) -> Result<(), AssemblyError> {
    let mut updates = Vec::new();
    for (base_id, change) in changes {
        let id = match change.direction {
            Some(ReactionDirection::Forward) => format!("{}_forward", base_id),
            Some(ReactionDirection::Reverse) => format!("{}_reverse", base_id),
            None => base_id.clone(),
        };
        if !(change.factor.is_finite() && change.factor > 0.) {
            return Err(AssemblyError::InvalidKcatFactor {
                reaction: id,
                factor: change.factor,
            });
        }
        let coefficient = *model
            .reaction(&id)?
            .metabolites
            .get(PROT_POOL)
            .ok_or_else(|| AssemblyError::MissingPoolCoefficient {
                reaction: id.clone(),
            })?;
        updates.push((id, coefficient / change.factor, change.factor));
    }
    for (id, coefficient, factor) in updates {
        model.reaction_mut(&id)?.set_coefficient(PROT_POOL, coefficient);
        log::info!("Manual change of {}'s kcat, change factor {}", id, factor);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::model::ModelError;
    use crate::metabolic_model::reaction::Reaction;
    use approx::assert_relative_eq;

    fn model() -> Model {
        let mut model = Model::new_empty();
        for id in ["PFK", "PGI_forward", "PGI_reverse"] {
            let mut metabolites = IndexMap::new();
            metabolites.insert(PROT_POOL.to_string(), -0.01);
            model.add_reaction(Reaction::new(id, metabolites, 0., 1000.));
        }
        model.add_reaction(Reaction::new("EX_glc__D_e", IndexMap::new(), -10., 1000.));
        model
    }

    #[test]
    fn read_changes() {
        let changes: KcatChanges =
            serde_json::from_str(r#"{"PFK": ["", 2.0], "PGI": ["reverse", 0.5]}"#).unwrap();
        assert_eq!(changes["PFK"].direction, None);
        assert_eq!(changes["PGI"].direction, Some(ReactionDirection::Reverse));
        assert!(serde_json::from_str::<KcatChanges>(r#"{"PFK": ["sideways", 2.0]}"#).is_err());
        assert_eq!(
            serde_json::to_string(&changes).unwrap(),
            r#"{"PFK":["",2.0],"PGI":["reverse",0.5]}"#
        );
    }

    #[test]
    fn pool_coefficients_are_scaled() {
        let mut model = model();
        let changes: KcatChanges =
            serde_json::from_str(r#"{"PFK": ["", 2.0], "PGI": ["reverse", 0.5]}"#).unwrap();
        apply_manual_changes(&mut model, &changes).unwrap();
        let pool = |id: &str| model.reaction(id).unwrap().metabolites[PROT_POOL];
        assert_relative_eq!(pool("PFK"), -0.005);
        assert_relative_eq!(pool("PGI_reverse"), -0.02);
        assert_relative_eq!(pool("PGI_forward"), -0.01);
    }

    #[test]
    fn invalid_changes_leave_model_untouched() {
        let mut model = model();
        let before = model.clone();
        let mut changes: KcatChanges =
            serde_json::from_str(r#"{"PFK": ["", 2.0], "EX_glc__D_e": ["", 2.0]}"#).unwrap();
        match apply_manual_changes(&mut model, &changes) {
            Err(AssemblyError::MissingPoolCoefficient { reaction }) => {
                assert_eq!(reaction, "EX_glc__D_e")
            }
            _ => panic!("Missing pool coefficient not reported"),
        }
        assert_eq!(model, before);

        changes.shift_remove("EX_glc__D_e");
        changes.insert(
            "ACALD".to_string(),
            KcatChange {
                direction: Some(ReactionDirection::Forward),
                factor: 2.,
            },
        );
        match apply_manual_changes(&mut model, &changes) {
            Err(AssemblyError::Model(ModelError::ReactionNotFound(id))) => {
                assert_eq!(id, "ACALD_forward")
            }
            _ => panic!("Unknown reaction not reported"),
        }

        changes.shift_remove("ACALD");
        changes.insert(
            "PGI".to_string(),
            KcatChange {
                direction: Some(ReactionDirection::Forward),
                factor: 0.,
            },
        );
        assert!(matches!(
            apply_manual_changes(&mut model, &changes),
            Err(AssemblyError::InvalidKcatFactor { .. })
        ));
        assert_eq!(model, before);
    }
}
