//! Splitting of reactions catalysed by proteins with measured concentrations
//!
//! The enzyme alternatives of such a reaction are partitioned into measured ones (any member
//! protein measured) and unmeasured ones. The unmeasured alternatives together become
//! `<id>_GPRSPLIT_1`, every measured alternative its own copy numbered after it. When more
//! than one copy results, the copies are capped by split arms (see [`super::arm`]).
use indexmap::{IndexMap, IndexSet};

use super::arm::{split_arms, SplitArm};
use super::{ReactionOrigin, ReactionOrigins, GPR_SPLIT_INFIX};
use crate::gene_rule::{Alternative, GeneRule};
use crate::io::project::{EnzymeStoichiometries, ProteinMasses};
use crate::metabolic_model::edit::ModelEdit;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::Reaction;

/// Alternatives of a gene rule partitioned by measurement
#[derive(Clone, Debug, PartialEq)]
pub struct MeasuredPartition {
    pub measured: Vec<Alternative>,
    pub unmeasured: Vec<Alternative>,
}

impl MeasuredPartition {
    pub fn new(rule: &GeneRule, concentrations: &IndexMap<String, f64>) -> MeasuredPartition {
        let (measured, unmeasured) = rule
            .iter()
            .cloned()
            .partition(|alt| alt.proteins().iter().any(|p| concentrations.contains_key(p)));
        MeasuredPartition {
            measured,
            unmeasured,
        }
    }

    /// Whether the copies need arms to share the reaction's bound
    pub fn needs_arms(&self) -> bool {
        !self.unmeasured.is_empty() || self.measured.len() > 1
    }

    /// The groups of alternatives of every copy in numbering order
    fn copies(&self) -> Vec<Vec<Alternative>> {
        let mut copies = Vec::new();
        if !self.unmeasured.is_empty() {
            copies.push(self.unmeasured.clone());
        }
        copies.extend(self.measured.iter().map(|alt| vec![alt.clone()]));
        copies
    }
}

/// Id of the `number`th copy of a split reaction
pub fn split_id(reaction: &str, number: usize) -> String {
    format!("{}{}{}", reaction, GPR_SPLIT_INFIX, number)
}

/// Split every reaction with a measured enzyme, returning the ids of the split reactions
///
/// Excluded reactions, reactions missing from the enzyme stoichiometry table, and reactions
/// naming a protein without known mass are kept as they are. The enzyme stoichiometry table
/// gains an entry for every copy.
pub fn split_measured_reactions(
    model: &mut Model,
    stoichiometries: &mut EnzymeStoichiometries,
    concentrations: &IndexMap<String, f64>,
    masses: &ProteinMasses,
    excluded: &IndexSet<String>,
    origins: &mut ReactionOrigins,
) -> Vec<String> {
    log::info!(
        "Measured protein concentrations given for {} proteins",
        concentrations.len()
    );
    let mut edit = ModelEdit::new();
    let mut split = Vec::new();
    for reaction in model.reactions.values() {
        if excluded.contains(&reaction.id) {
            continue;
        }
        let Some(rule) = stoichiometries.gene_rule(&reaction.id) else {
            continue;
        };
        if rule.proteins().iter().any(|p| !masses.contains_key(p)) {
            continue;
        }
        let partition = MeasuredPartition::new(&rule, concentrations);
        if partition.measured.is_empty() {
            continue;
        }

        let arms = if partition.needs_arms() {
            split_arms(reaction)
        } else {
            Vec::new()
        };
        for (number, alternatives) in partition.copies().into_iter().enumerate() {
            let copy = split_copy(reaction, number + 1, &alternatives, &arms);
            let entries = stoichiometries.entries_for(&reaction.id, &alternatives);
            stoichiometries.insert(&copy.id, entries);
            origins.register(
                &copy.id,
                ReactionOrigin {
                    root: reaction.id.clone(),
                    enzyme_key: copy.id.clone(),
                    direction: None,
                },
            );
            edit.add_reaction(copy);
        }
        for arm in arms {
            edit.add_metabolite(arm.metabolite);
            edit.add_reaction(arm.reaction);
        }
        edit.remove_reaction(&reaction.id);
        split.push(reaction.id.clone());
    }
    edit.apply(model);
    for id in &split {
        log::info!("Split {} by measured enzymes", id);
    }
    split
}

fn split_copy(
    reaction: &Reaction,
    number: usize,
    alternatives: &[Alternative],
    arms: &[SplitArm],
) -> Reaction {
    let mut copy = reaction.clone();
    copy.id = split_id(&reaction.id, number);
    copy.gpr = GeneRule::new(alternatives.to_vec()).to_gpr();
    for arm in arms {
        copy.set_coefficient(&arm.metabolite.id, 1.);
    }
    copy
}
