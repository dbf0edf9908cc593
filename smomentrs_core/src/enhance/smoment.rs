//! sMOMENT assembler
//!
//! Every enzyme-catalysed reaction consumes the shared protein pool in proportion to its flux,
//! with the cost of its cheapest enzyme alternative: `-Σ units × mass / (kcat × 3600)` over
//! the alternative's members. Members with a measured concentration additionally consume their
//! own pseudo-metabolite, with `-units / (kcat × 3600)`.
use indexmap::IndexMap;

use super::irreversible::make_irreversible;
use super::measured::split_measured_reactions;
use super::protein_data::{add_delivery_reactions, add_prot_pool_reaction, enzyme_metabolite_id};
use super::report::{Applied, EnhancementReport, EnzymeConstraint};
use super::{
    enzyme_demand, resolve_candidate, AssemblyError, Candidate, Enhancement, EnhancementInput,
    ReactionOrigins, SmomentOptions, PROT_POOL,
};
use crate::gene_rule::Alternative;
use crate::io::project::{EnzymeStoichiometries, ProteinMasses};
use crate::metabolic_model::model::Model;

/// Enzyme costs of one reaction
#[derive(Clone, Debug, PartialEq)]
struct EnzymeCosts {
    /// The alternative with the smallest protein pool cost
    enzyme: Alternative,
    /// Protein pool coefficient of that alternative (0 or negative)
    pool_coefficient: f64,
    /// Coefficients of measured proteins' pseudo-metabolites, over all alternatives
    measured: IndexMap<String, f64>,
}

fn enzyme_costs(
    candidate: &Candidate,
    stoichiometries: &EnzymeStoichiometries,
    masses: &ProteinMasses,
    concentrations: &IndexMap<String, f64>,
) -> Option<EnzymeCosts> {
    let mut measured: IndexMap<String, f64> = IndexMap::new();
    let mut cheapest: Option<(&Alternative, f64)> = None;
    for alternative in candidate.rule.iter() {
        let mut pool_coefficient = 0.;
        for protein in alternative.proteins() {
            let units = stoichiometries.units(&candidate.enzyme_key, alternative, protein);
            let demand = enzyme_demand(units, candidate.kcat);
            pool_coefficient -= demand * masses.get(protein).copied().unwrap_or_default();
            if concentrations.contains_key(protein) {
                *measured.entry(enzyme_metabolite_id(protein)).or_default() -= demand;
            }
        }
        // The first alternative wins ties
        if cheapest.map_or(true, |(_, best)| pool_coefficient > best) {
            cheapest = Some((alternative, pool_coefficient));
        }
    }
    cheapest.map(|(enzyme, pool_coefficient)| EnzymeCosts {
        enzyme: enzyme.clone(),
        pool_coefficient,
        measured,
    })
}

/// Build the sMOMENT model of `model`
///
/// The passes run in order: split by measured enzymes, split reversible reactions, add the
/// protein pool and the measured protein deliveries, then add the enzyme costs.
pub fn create_smoment_model(
    mut model: Model,
    input: EnhancementInput,
    options: &SmomentOptions,
) -> Result<Enhancement, AssemblyError> {
    let protein_data = input.protein_data;
    let p_measured = protein_data.p_measured(input.masses);
    let concentrations = protein_data.usable_concentrations(input.masses);
    let mut stoichiometries = input.stoichiometries.clone();
    let mut origins = ReactionOrigins::new();

    split_measured_reactions(
        &mut model,
        &mut stoichiometries,
        &concentrations,
        input.masses,
        &options.excluded_reactions,
        &mut origins,
    );
    make_irreversible(&mut model, &mut origins);
    add_prot_pool_reaction(&mut model, protein_data.pool_bound(p_measured))?;
    add_delivery_reactions(&mut model, &concentrations);

    let default_kcat = input
        .kcats
        .default_kcat(options.default_kcat_selection, &mut options.rng());
    match default_kcat {
        Some(kcat) => log::info!("Default kcat is {}", kcat),
        None => log::warn!("No kcat is known, there is no default kcat"),
    }

    let mut report = EnhancementReport::new();
    let ids: Vec<String> = model.reactions.keys().cloned().collect();
    for id in ids {
        let origin = origins.origin(&id);
        let reaction = model.reaction(&id)?;
        let candidate = match resolve_candidate(
            reaction,
            &origin,
            &stoichiometries,
            input.masses,
            input.kcats,
            options,
            default_kcat,
        ) {
            None => continue,
            Some(Err(skipped)) => {
                report.record(&id, Err(skipped));
                continue;
            }
            Some(Ok(candidate)) => candidate,
        };
        let Some(costs) = enzyme_costs(
            &candidate,
            &stoichiometries,
            input.masses,
            &concentrations,
        ) else {
            continue;
        };

        let reaction = model.reaction_mut(&id)?;
        for (metabolite, coefficient) in &costs.measured {
            reaction.add_coefficient(metabolite, *coefficient);
        }
        if costs.pool_coefficient < 0. {
            reaction.add_coefficient(PROT_POOL, costs.pool_coefficient);
        }
        log::debug!(
            "Reaction {}: kcat {}, enzyme {}",
            id,
            candidate.kcat,
            costs.enzyme
        );
        report.record(
            &id,
            Ok(Applied {
                kcat: candidate.kcat,
                kcat_origin: candidate.kcat_origin,
                constraint: EnzymeConstraint::Pool {
                    coefficient: costs.pool_coefficient,
                    enzyme: costs.enzyme,
                },
            }),
        );
    }
    log::info!("sMOMENT model: {}", report);
    Ok(Enhancement { model, report })
}
