//! Per reaction outcome of a model enhancement
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use thiserror::Error;

use crate::gene_rule::Alternative;

/// Where the kcat of an enhanced reaction comes from
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KcatOrigin {
    /// The reaction kcat mapping
    Mapped,
    /// The default kcat derived from all known kcats
    Default,
}

/// The enzyme constraint added to a reaction
#[derive(Clone, Debug, PartialEq)]
pub enum EnzymeConstraint {
    /// sMOMENT: consumption of the protein pool by the cheapest alternative
    Pool {
        coefficient: f64,
        enzyme: Alternative,
    },
    /// GECKO: one reaction copy per alternative, consuming the enzymes' pseudo-metabolites
    Usage { copies: Vec<String> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Applied {
    pub kcat: f64,
    pub kcat_origin: KcatOrigin,
    pub constraint: EnzymeConstraint,
}

/// Why a reaction with enzymes was left without enzyme constraint
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Skipped {
    #[error("excluded by the user")]
    Excluded,
    #[error("empty gene rule")]
    EmptyGeneRule,
    #[error("no mass known for {}", .proteins.join(", "))]
    MissingMass { proteins: Vec<String> },
    #[error("no kcat known")]
    NoKcat,
}

pub type ReactionOutcome = Result<Applied, Skipped>;

/// Outcome of every reaction considered by an assembler, in model order
#[derive(Clone, Debug, Default)]
pub struct EnhancementReport {
    outcomes: IndexMap<String, ReactionOutcome>,
}

impl EnhancementReport {
    pub fn new() -> Self {
        EnhancementReport::default()
    }

    pub fn record(&mut self, reaction: &str, outcome: ReactionOutcome) {
        match &outcome {
            Ok(applied) => log::debug!("Reaction {}: kcat {}", reaction, applied.kcat),
            Err(reason) => log::info!("Reaction {} is left unconstrained: {}", reaction, reason),
        }
        self.outcomes.insert(reaction.to_string(), outcome);
    }

    pub fn get(&self, reaction: &str) -> Option<&ReactionOutcome> {
        self.outcomes.get(reaction)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ReactionOutcome> {
        self.outcomes.iter()
    }

    pub fn applied(&self) -> impl Iterator<Item = (&String, &Applied)> {
        self.outcomes
            .iter()
            .filter_map(|(id, outcome)| outcome.as_ref().ok().map(|a| (id, a)))
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&String, &Skipped)> {
        self.outcomes
            .iter()
            .filter_map(|(id, outcome)| outcome.as_ref().err().map(|s| (id, s)))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl Display for EnhancementReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let defaults = self
            .applied()
            .filter(|(_, a)| a.kcat_origin == KcatOrigin::Default)
            .count();
        write!(
            f,
            "{} reactions constrained ({} with the default kcat), {} skipped",
            self.applied().count(),
            defaults,
            self.skipped().count()
        )
    }
}
