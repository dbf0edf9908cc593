//! Arm reactions, which let several enzyme-specific copies of a reaction share its flux bound
//!
//! Two shapes are used:
//!
//! * [`split_arms`] (sMOMENT): every copy produces one unit of an arm metabolite which a single
//!   arm reaction drains. The arm reaction's bound caps the summed flux of the copies. A
//!   reversible reaction gets one arm per direction.
//! * [`isozyme_arm`] (GECKO): the arm reaction takes over the reactants of the reaction and
//!   produces an intermediate metabolite, which every copy consumes instead.
use indexmap::IndexMap;

use super::{ARM_METABOLITE_PREFIX, ARM_REACTION_PREFIX, PSEUDO_COMPARTMENT};
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::{Reaction, ReactionDirection};

/// An arm metabolite with the reaction draining it
#[derive(Clone, Debug, PartialEq)]
pub struct SplitArm {
    pub metabolite: Metabolite,
    pub reaction: Reaction,
}

fn split_arm(id: &str, root: &str, upper_bound: f64) -> SplitArm {
    let metabolite_id = format!("{}{}", ARM_METABOLITE_PREFIX, id);
    let metabolite = Metabolite::new(
        &metabolite_id,
        &format!("arm reaction metabolite for splitting of {}", root),
        PSEUDO_COMPARTMENT,
    );
    let mut metabolites = IndexMap::new();
    metabolites.insert(metabolite_id, -1.);
    let mut reaction = Reaction::new(
        &format!("{}{}", ARM_REACTION_PREFIX, id),
        metabolites,
        0.,
        upper_bound,
    );
    reaction.name = Some(format!("Arm reaction for splitting of {}", root));
    SplitArm {
        metabolite,
        reaction,
    }
}

/// Arms capping the copies of `reaction`
///
/// An irreversible reaction gets the arm `armr_<id>` draining `armm_<id>`, bounded by the
/// reaction's upper bound. A reversible reaction gets `armr_<id>_forward` bounded by the
/// upper bound and `armr_<id>_reverse` bounded by the negated lower bound.
pub fn split_arms(reaction: &Reaction) -> Vec<SplitArm> {
    if reaction.is_reversible() {
        [ReactionDirection::Forward, ReactionDirection::Reverse]
            .into_iter()
            .map(|direction| {
                let bound = match direction {
                    ReactionDirection::Forward => reaction.get_forward_upper_bound(),
                    ReactionDirection::Reverse => reaction.get_reverse_upper_bound(),
                };
                split_arm(&reaction.get_directional_id(direction), &reaction.id, bound)
            })
            .collect()
    } else {
        vec![split_arm(&reaction.id, &reaction.id, reaction.upper_bound)]
    }
}

/// Route the reactants of `reaction` through the intermediate `im_<number>`
///
/// Returns the intermediate metabolite and the arm reaction `arm_reaction_<number>`, which
/// consumes the reactants and is bounded by the reaction's upper bound. The reactants of
/// `reaction` are replaced by one unit of the intermediate.
pub fn isozyme_arm(reaction: &mut Reaction, number: usize) -> (Metabolite, Reaction) {
    let intermediate_id = format!("im_{}", number);
    let intermediate = Metabolite::new(
        &intermediate_id,
        &format!("Intermediate metabolite of arm reaction {}", number),
        PSEUDO_COMPARTMENT,
    );
    let mut arm_metabolites: IndexMap<String, f64> = reaction
        .reactants()
        .map(|(id, coef)| (id.clone(), *coef))
        .collect();
    for id in arm_metabolites.keys() {
        reaction.set_coefficient(id, 0.);
    }
    arm_metabolites.insert(intermediate_id.clone(), 1.);
    reaction.set_coefficient(&intermediate_id, -1.);

    let mut arm = Reaction::new(
        &format!("arm_reaction_{}", number),
        arm_metabolites,
        0.,
        reaction.upper_bound,
    );
    arm.name = Some(format!(
        "Arm reaction no. {} for gene rule {}",
        number,
        reaction.gene_reaction_rule()
    ));
    arm.subsystem = Some(PSEUDO_COMPARTMENT.to_string());
    (intermediate, arm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pgi(lower_bound: f64) -> Reaction {
        let mut metabolites = IndexMap::new();
        metabolites.insert("g6p_c".to_string(), -1.);
        metabolites.insert("f6p_c".to_string(), 1.);
        Reaction::new("PGI", metabolites, lower_bound, 800.)
    }

    #[test]
    fn irreversible_split_arm() {
        let arms = split_arms(&pgi(0.));
        assert_eq!(arms.len(), 1);
        assert_eq!(arms[0].metabolite.id, "armm_PGI");
        assert_eq!(arms[0].reaction.id, "armr_PGI");
        assert_eq!(arms[0].reaction.metabolites.get("armm_PGI"), Some(&-1.));
        assert_eq!(arms[0].reaction.upper_bound, 800.);
    }

    #[test]
    fn reversible_split_arms() {
        let arms = split_arms(&pgi(-300.));
        let ids: Vec<&str> = arms.iter().map(|a| a.reaction.id.as_str()).collect();
        assert_eq!(ids, vec!["armr_PGI_forward", "armr_PGI_reverse"]);
        assert_eq!(arms[0].metabolite.id, "armm_PGI_forward");
        assert_eq!(arms[0].reaction.upper_bound, 800.);
        assert_eq!(arms[1].metabolite.id, "armm_PGI_reverse");
        assert_eq!(arms[1].reaction.upper_bound, 300.);
    }

    #[test]
    fn isozyme_arm_takes_reactants() {
        let mut reaction = pgi(0.);
        let (intermediate, arm) = isozyme_arm(&mut reaction, 3);
        assert_eq!(intermediate.id, "im_3");
        assert_eq!(arm.id, "arm_reaction_3");
        assert_eq!(arm.metabolites.get("g6p_c"), Some(&-1.));
        assert_eq!(arm.metabolites.get("im_3"), Some(&1.));
        assert_eq!(arm.upper_bound, 800.);
        assert_eq!(reaction.metabolites.get("g6p_c"), None);
        assert_eq!(reaction.metabolites.get("im_3"), Some(&-1.));
        assert_eq!(reaction.metabolites.get("f6p_c"), Some(&1.));
    }
}
