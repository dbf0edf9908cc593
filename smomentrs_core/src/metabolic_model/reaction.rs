//! This module provides a struct for representing reactions
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::model::Gpr;
use super::Annotation;
use crate::configuration::{default_lower_bound, default_upper_bound};

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Metabolite stoichiometry of the reaction
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Gene Protein Reaction rule describing which enzymes catalyse the reaction
    #[builder(default = "None")]
    pub gpr: Option<Gpr>,
    /// Lower flux bound
    #[builder(default = "default_lower_bound()")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "default_upper_bound()")]
    pub upper_bound: f64,
    /// Reaction subsystem
    #[builder(default = "None")]
    pub subsystem: Option<String>,
    /// Notes about the reaction
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Reaction Annotations
    #[builder(default = "Annotation::new()")]
    pub annotation: Annotation,
}

impl Reaction {
    /// Create a reaction with the given id, stoichiometry and bounds
    pub fn new(
        id: &str,
        metabolites: IndexMap<String, f64>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Reaction {
        Reaction {
            id: id.to_string(),
            metabolites,
            name: None,
            gpr: None,
            lower_bound,
            upper_bound,
            subsystem: None,
            notes: None,
            annotation: Annotation::new(),
        }
    }

    /// Id of the forward half of this reaction once it is split
    ///
    /// # Note:
    /// The forward id is "{reaction_id}_forward"
    pub fn get_forward_id(&self) -> String {
        format!("{}_forward", &self.id)
    }

    /// Id of the reverse half of this reaction once it is split
    ///
    /// # Note:
    /// The reverse id is "{reaction_id}_reverse"
    pub fn get_reverse_id(&self) -> String {
        format!("{}_reverse", &self.id)
    }

    /// Id of the half of this reaction running in `direction`
    pub fn get_directional_id(&self, direction: ReactionDirection) -> String {
        match direction {
            ReactionDirection::Forward => self.get_forward_id(),
            ReactionDirection::Reverse => self.get_reverse_id(),
        }
    }

    /// Upper bound of the forward half
    pub(crate) fn get_forward_upper_bound(&self) -> f64 {
        self.upper_bound.max(0f64)
    }

    /// Lower bound of the forward half
    pub(crate) fn get_forward_lower_bound(&self) -> f64 {
        self.lower_bound.max(0f64)
    }

    /// Upper bound of the reverse half
    pub(crate) fn get_reverse_upper_bound(&self) -> f64 {
        if self.lower_bound < 0f64 {
            -self.lower_bound
        } else {
            0f64
        }
    }

    /// Lower bound of the reverse half
    pub(crate) fn get_reverse_lower_bound(&self) -> f64 {
        if self.upper_bound < 0f64 {
            -self.upper_bound
        } else {
            0f64
        }
    }

    /// A reaction is reversible when it can carry negative flux
    pub fn is_reversible(&self) -> bool {
        self.lower_bound < 0f64
    }

    /// Whether any gene rule is attached to the reaction
    pub fn has_gene_rule(&self) -> bool {
        self.gpr.is_some()
    }

    /// The gene rule as an id string, empty when the reaction has none
    pub fn gene_reaction_rule(&self) -> String {
        self.gpr
            .as_ref()
            .map(|gpr| gpr.to_string_id())
            .unwrap_or_default()
    }

    /// Metabolites consumed by the reaction, with their (negative) coefficients
    pub fn reactants(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.metabolites.iter().filter(|(_, coef)| **coef < 0f64)
    }

    /// Metabolites produced by the reaction, with their (positive) coefficients
    pub fn products(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.metabolites.iter().filter(|(_, coef)| **coef > 0f64)
    }

    /// Set the coefficient of `metabolite`, dropping it from the reaction when the value is 0
    pub fn set_coefficient(&mut self, metabolite: &str, value: f64) {
        if value == 0f64 {
            self.metabolites.shift_remove(metabolite);
        } else if let Some(coef) = self.metabolites.get_mut(metabolite) {
            *coef = value;
        } else {
            self.metabolites.insert(metabolite.to_string(), value);
        }
    }

    /// Add `delta` to the coefficient of `metabolite` (inserting it if absent)
    pub fn add_coefficient(&mut self, metabolite: &str, delta: f64) {
        let current = self.metabolites.get(metabolite).copied().unwrap_or(0f64);
        self.set_coefficient(metabolite, current + delta);
    }
}

/// Direction in which flux passes through a reaction
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionDirection {
    Forward,
    Reverse,
}

impl Display for ReactionDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReactionDirection::Forward => write!(f, "forward"),
            ReactionDirection::Reverse => write!(f, "reverse"),
        }
    }
}
