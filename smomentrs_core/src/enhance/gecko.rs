//! GECKO assembler
//!
//! Every protein becomes a pseudo-metabolite `<protein>_met`. A measured protein is delivered
//! by `EU_<protein>`, bounded by its concentration. An unmeasured protein is made by
//! `ER_<protein>` from the protein pool, at the cost of its mass. Each enzyme-catalysed
//! reaction is replaced by one copy `<id>_iso<i>` per enzyme alternative, consuming
//! `units / (kcat × 3600)` of every member protein. Copies of a reaction with several
//! alternatives share the reaction's bound through an isozyme arm.
use indexmap::IndexMap;

use super::arm::isozyme_arm;
use super::irreversible::make_irreversible;
use super::protein_data::add_prot_pool_reaction;
use super::report::{Applied, EnhancementReport, EnzymeConstraint};
use super::{
    enzyme_demand, resolve_candidate, AssemblyError, Enhancement, EnhancementInput,
    ReactionOrigins, SmomentOptions, PROT_POOL, PSEUDO_COMPARTMENT,
};
use crate::io::project::ProteinMasses;
use crate::metabolic_model::edit::ModelEdit;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::Reaction;

/// Upper bound of the usage reaction of an unmeasured protein
const UNMEASURED_USAGE_BOUND: f64 = 1000.;

/// Pseudo-metabolite of a protein
pub fn protein_metabolite_id(protein: &str) -> String {
    format!("{}_met", protein)
}

/// Add the pseudo-metabolite and usage reaction of every protein with known mass
pub fn add_protein_usage_reactions(
    model: &mut Model,
    masses: &ProteinMasses,
    concentrations: &IndexMap<String, f64>,
) {
    for (protein, mass) in masses {
        let metabolite = protein_metabolite_id(protein);
        model.add_metabolite(Metabolite::new(
            &metabolite,
            &format!("Protein {}", protein),
            PSEUDO_COMPARTMENT,
        ));
        let mut metabolites = IndexMap::new();
        metabolites.insert(metabolite, 1.);
        let mut reaction = match concentrations.get(protein) {
            Some(concentration) => {
                let mut reaction =
                    Reaction::new(&format!("EU_{}", protein), metabolites, 0., *concentration);
                reaction.name = Some(format!("Enzyme usage reaction of measured protein {}", protein));
                reaction
            }
            None => {
                metabolites.insert(PROT_POOL.to_string(), -mass);
                let mut reaction = Reaction::new(
                    &format!("ER_{}", protein),
                    metabolites,
                    0.,
                    UNMEASURED_USAGE_BOUND,
                );
                reaction.name = Some(format!("Enzyme usage reaction of unmeasured protein {}", protein));
                reaction
            }
        };
        reaction.subsystem = Some(PSEUDO_COMPARTMENT.to_string());
        model.add_reaction(reaction);
    }
}

/// Build the GECKO model of `model`
pub fn create_gecko_model(
    mut model: Model,
    input: EnhancementInput,
    options: &SmomentOptions,
) -> Result<Enhancement, AssemblyError> {
    let protein_data = input.protein_data;
    let p_measured = protein_data.p_measured(input.masses);
    let concentrations = protein_data.usable_concentrations(input.masses);
    let mut origins = ReactionOrigins::new();

    make_irreversible(&mut model, &mut origins);
    add_prot_pool_reaction(&mut model, protein_data.pool_bound(p_measured))?;
    add_protein_usage_reactions(&mut model, input.masses, &concentrations);

    let default_kcat = input
        .kcats
        .default_kcat(options.default_kcat_selection, &mut options.rng());
    match default_kcat {
        Some(kcat) => log::info!("Default kcat is {}", kcat),
        None => log::warn!("No kcat is known, there is no default kcat"),
    }

    let mut report = EnhancementReport::new();
    let mut edit = ModelEdit::new();
    let mut objective: Vec<(String, f64)> = Vec::new();
    let mut arm_number = 1;
    for (id, reaction) in &model.reactions {
        let origin = origins.origin(id);
        let candidate = match resolve_candidate(
            reaction,
            &origin,
            input.stoichiometries,
            input.masses,
            input.kcats,
            options,
            default_kcat,
        ) {
            None => continue,
            Some(Err(skipped)) => {
                report.record(id, Err(skipped));
                continue;
            }
            Some(Ok(candidate)) => candidate,
        };

        let mut base = reaction.clone();
        if candidate.rule.len() > 1 {
            let (intermediate, arm) = isozyme_arm(&mut base, arm_number);
            edit.add_metabolite(intermediate);
            edit.add_reaction(arm);
            arm_number += 1;
        }
        let mut copies = Vec::new();
        for (i, alternative) in candidate.rule.iter().enumerate() {
            let mut copy = base.clone();
            copy.id = format!("{}_iso{}", id, i + 1);
            copy.gpr = Some(alternative.to_gpr());
            for protein in alternative.proteins() {
                let units = input
                    .stoichiometries
                    .units(&candidate.enzyme_key, alternative, protein);
                copy.add_coefficient(
                    &protein_metabolite_id(protein),
                    -enzyme_demand(units, candidate.kcat),
                );
            }
            if let Some(coef) = model.objective.get(id) {
                objective.push((copy.id.clone(), *coef));
            }
            copies.push(copy.id.clone());
            edit.add_reaction(copy);
        }
        edit.remove_reaction(id);
        report.record(
            id,
            Ok(Applied {
                kcat: candidate.kcat,
                kcat_origin: candidate.kcat_origin,
                constraint: EnzymeConstraint::Usage { copies },
            }),
        );
    }
    edit.apply(&mut model);
    model.objective.extend(objective);
    log::info!("GECKO model: {}", report);
    Ok(Enhancement { model, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::protein_data::ProteinData;
    use crate::enhance::report::Skipped;
    use crate::gene_rule::structure_gene_rule;
    use crate::io::project::{EnzymeComplexEntry, EnzymeStoichiometries};
    use crate::kcat::selection::EC_NAMESPACE;
    use crate::kcat::{ReactionKcatMapping, ReactionKcats};
    use approx::assert_relative_eq;

    fn hex1() -> Reaction {
        let mut metabolites = IndexMap::new();
        metabolites.insert("glc__D_c".to_string(), -1.);
        metabolites.insert("atp_c".to_string(), -1.);
        metabolites.insert("g6p_c".to_string(), 1.);
        metabolites.insert("adp_c".to_string(), 1.);
        let mut reaction = Reaction::new("HEX1", metabolites, 0., 1000.);
        reaction.gpr = structure_gene_rule("b2388 or (b1621 and b0001)").unwrap().to_gpr();
        reaction
            .annotation
            .insert(EC_NAMESPACE.to_string(), vec!["2.7.1.1".to_string()]);
        reaction
    }

    fn project(model: &Model) -> (ProteinMasses, ProteinData, EnzymeStoichiometries, ReactionKcatMapping) {
        let masses: ProteinMasses = [("b2388", 30.), ("b1621", 20.), ("b0001", 10.)]
            .into_iter()
            .map(|(p, m)| (p.to_string(), m))
            .collect();
        let protein_data = ProteinData {
            p_total: 0.5,
            unmeasured_protein_fraction: 0.5,
            mean_saturation: 0.5,
            concentrations: [("b1621".to_string(), 0.002)].into_iter().collect(),
        };
        let mut stoichiometries = EnzymeStoichiometries::from_model(model).unwrap();
        stoichiometries.insert(
            "HEX1",
            vec![
                EnzymeComplexEntry {
                    proteins: vec!["b2388".to_string()],
                    units: IndexMap::new(),
                },
                EnzymeComplexEntry {
                    proteins: vec!["b1621".to_string(), "b0001".to_string()],
                    units: [("b0001".to_string(), 3.)].into_iter().collect(),
                },
            ],
        );
        let mut kcats = ReactionKcatMapping::new();
        kcats.insert(
            "HEX1",
            ReactionKcats {
                forward: Some(10.),
                reverse: None,
            },
        );
        (masses, protein_data, stoichiometries, kcats)
    }

    #[test]
    fn usage_reactions() {
        let mut model = Model::new_empty();
        let (masses, protein_data, _, _) = project(&model);
        add_protein_usage_reactions(&mut model, &masses, &protein_data.concentrations);
        let er = model.reaction("ER_b2388").unwrap();
        assert_eq!(er.metabolites.get(PROT_POOL), Some(&-30.));
        assert_eq!(er.metabolites.get("b2388_met"), Some(&1.));
        assert_eq!(er.upper_bound, 1000.);
        let eu = model.reaction("EU_b1621").unwrap();
        assert_eq!(eu.metabolites.get(PROT_POOL), None);
        assert_eq!(eu.upper_bound, 0.002);
        assert!(model.metabolites.contains_key("b0001_met"));
    }

    #[test]
    fn isozyme_copies() {
        let mut model = Model::new_empty();
        model.add_reaction(hex1());
        model.set_objective("HEX1").unwrap();
        let (masses, protein_data, stoichiometries, kcats) = project(&model);
        let input = EnhancementInput {
            masses: &masses,
            protein_data: &protein_data,
            stoichiometries: &stoichiometries,
            kcats: &kcats,
        };
        let enhancement = create_gecko_model(model, input, &SmomentOptions::default()).unwrap();
        let model = &enhancement.model;

        assert!(!model.reactions.contains_key("HEX1"));
        let arm = model.reaction("arm_reaction_1").unwrap();
        assert_eq!(arm.metabolites.get("glc__D_c"), Some(&-1.));
        assert_eq!(arm.metabolites.get("im_1"), Some(&1.));

        let first = model.reaction("HEX1_iso1").unwrap();
        assert_eq!(first.metabolites.get("im_1"), Some(&-1.));
        assert_eq!(first.metabolites.get("glc__D_c"), None);
        assert_relative_eq!(*first.metabolites.get("b2388_met").unwrap(), -1. / 36000.);
        let second = model.reaction("HEX1_iso2").unwrap();
        assert_relative_eq!(*second.metabolites.get("b1621_met").unwrap(), -1. / 36000.);
        assert_relative_eq!(*second.metabolites.get("b0001_met").unwrap(), -3. / 36000.);
        assert_eq!(second.gene_reaction_rule(), "(b1621 and b0001)");

        assert_eq!(model.objective.get("HEX1_iso1"), Some(&1.));
        assert_eq!(model.objective.get("HEX1_iso2"), Some(&1.));
        match enhancement.report.get("HEX1") {
            Some(Ok(Applied {
                constraint: EnzymeConstraint::Usage { copies },
                ..
            })) => assert_eq!(copies, &vec!["HEX1_iso1".to_string(), "HEX1_iso2".to_string()]),
            _ => panic!("HEX1 was not constrained"),
        }
    }

    #[test]
    fn single_enzyme_needs_no_arm() {
        let mut reaction = hex1();
        reaction.gpr = structure_gene_rule("b2388").unwrap().to_gpr();
        reaction.lower_bound = -1000.;
        let mut model = Model::new_empty();
        model.add_reaction(reaction);
        let (masses, protein_data, _, kcats) = project(&model);
        let stoichiometries = EnzymeStoichiometries::from_model(&model).unwrap();
        let input = EnhancementInput {
            masses: &masses,
            protein_data: &protein_data,
            stoichiometries: &stoichiometries,
            kcats: &kcats,
        };
        let enhancement = create_gecko_model(model, input, &SmomentOptions::default()).unwrap();
        let model = &enhancement.model;
        assert!(model.reactions.contains_key("HEX1_forward_iso1"));
        assert!(model.reactions.contains_key("HEX1_reverse_iso1"));
        assert!(!model.reactions.keys().any(|id| id.starts_with("arm_reaction")));
        // The reverse kcat falls back to the default, the median of all known kcats
        assert_relative_eq!(
            *model
                .reaction("HEX1_reverse_iso1")
                .unwrap()
                .metabolites
                .get("b2388_met")
                .unwrap(),
            -1. / 36000.
        );
    }

    #[test]
    fn excluded_reaction_is_kept() {
        let mut model = Model::new_empty();
        model.add_reaction(hex1());
        let (masses, protein_data, stoichiometries, kcats) = project(&model);
        let input = EnhancementInput {
            masses: &masses,
            protein_data: &protein_data,
            stoichiometries: &stoichiometries,
            kcats: &kcats,
        };
        let options = SmomentOptions {
            excluded_reactions: ["HEX1".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let enhancement = create_gecko_model(model, input, &options).unwrap();
        assert!(enhancement.model.reactions.contains_key("HEX1"));
        assert_eq!(enhancement.report.get("HEX1"), Some(&Err(Skipped::Excluded)));
    }
}
