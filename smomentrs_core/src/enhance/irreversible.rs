//! Splitting of reversible enzyme-catalysed reactions into two irreversible reactions
//!
//! Only reactions with a gene rule are split, as only those receive an enzyme cost. The
//! halves are named `<id>_forward` and `<id>_reverse`. Both carry flux in `[0, x]`, the
//! reverse half with the stoichiometry negated.
//!
//! Arm metabolites (prefix `armm_`) of reactions split by enzyme alternatives are not negated:
//! a metabolite `armm_<id>_forward` belongs to the forward half only and `armm_<id>_reverse`
//! to the reverse half only, any other arm metabolite is kept unchanged in both.
use indexmap::IndexMap;

use super::{ReactionOrigins, ARM_METABOLITE_PREFIX};
use crate::metabolic_model::edit::ModelEdit;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::{Reaction, ReactionDirection};

/// Whether the reaction is split by [`make_irreversible`]
pub fn needs_split(reaction: &Reaction) -> bool {
    reaction.is_reversible() && reaction.has_gene_rule()
}

fn is_arm_metabolite(id: &str) -> bool {
    id.starts_with(ARM_METABOLITE_PREFIX)
}

fn half_metabolites(
    metabolites: &IndexMap<String, f64>,
    direction: ReactionDirection,
) -> IndexMap<String, f64> {
    let (own_suffix, other_suffix) = match direction {
        ReactionDirection::Forward => ("_forward", "_reverse"),
        ReactionDirection::Reverse => ("_reverse", "_forward"),
    };
    metabolites
        .iter()
        .filter_map(|(id, coef)| {
            if is_arm_metabolite(id) {
                if id.ends_with(other_suffix) && !id.ends_with(own_suffix) {
                    None
                } else {
                    Some((id.clone(), *coef))
                }
            } else {
                match direction {
                    ReactionDirection::Forward => Some((id.clone(), *coef)),
                    ReactionDirection::Reverse => Some((id.clone(), -coef)),
                }
            }
        })
        .collect()
}

/// The forward and reverse halves of a reaction
///
/// Together the halves allow exactly the net flux range of the reaction: the forward half
/// carries `[max(lb, 0), max(ub, 0)]` and the reverse half `[max(-ub, 0), max(-lb, 0)]`.
pub fn split_reaction(reaction: &Reaction) -> (Reaction, Reaction) {
    let mut forward = reaction.clone();
    forward.id = reaction.get_forward_id();
    forward.lower_bound = reaction.get_forward_lower_bound();
    forward.upper_bound = reaction.get_forward_upper_bound();
    forward.metabolites = half_metabolites(&reaction.metabolites, ReactionDirection::Forward);

    let mut reverse = reaction.clone();
    reverse.id = reaction.get_reverse_id();
    reverse.lower_bound = reaction.get_reverse_lower_bound();
    reverse.upper_bound = reaction.get_reverse_upper_bound();
    reverse.metabolites = half_metabolites(&reaction.metabolites, ReactionDirection::Reverse);

    (forward, reverse)
}

/// Split every reversible reaction with a gene rule, returning the ids of the split reactions
///
/// The objective coefficient of a split reaction moves to its forward half, and the reverse
/// half gets the negated coefficient. Running the pass on its own result does nothing.
pub fn make_irreversible(model: &mut Model, origins: &mut ReactionOrigins) -> Vec<String> {
    let mut edit = ModelEdit::new();
    let mut split = Vec::new();
    let mut objective = Vec::new();
    for reaction in model.reactions.values().filter(|r| needs_split(r)) {
        let (forward, reverse) = split_reaction(reaction);
        origins.register_direction(&reaction.id, &forward.id, ReactionDirection::Forward);
        origins.register_direction(&reaction.id, &reverse.id, ReactionDirection::Reverse);
        if let Some(coef) = model.objective.get(&reaction.id) {
            objective.push((forward.id.clone(), *coef));
            objective.push((reverse.id.clone(), -coef));
        }
        edit.remove_reaction(&reaction.id);
        edit.add_reaction(forward);
        edit.add_reaction(reverse);
        split.push(reaction.id.clone());
    }
    edit.apply(model);
    model.objective.extend(objective);
    if !split.is_empty() {
        log::debug!("Split {} reversible reactions", split.len());
    }
    split
}
