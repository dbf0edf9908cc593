//! Proteome data and the reactions delivering protein to the model
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{
    AssemblyError, ENZYME_DELIVERY_PREFIX, ENZYME_PREFIX, POOL_REACTION, PROT_POOL,
    PSEUDO_COMPARTMENT,
};
use crate::io::project::{read_json_file, write_json_file, ProjectDataError, ProteinMasses};
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::Reaction;

/// Total protein content and measured protein concentrations of the modelled cells
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProteinData {
    /// Protein mass per cell dry weight, g/gDW
    pub p_total: f64,
    /// Mass fraction of the unmeasured proteins which are enzymes of the model
    pub unmeasured_protein_fraction: f64,
    /// Mean saturation of the unmeasured enzymes
    pub mean_saturation: f64,
    /// Measured concentrations, mmol/gDW
    #[serde(default)]
    pub concentrations: IndexMap<String, f64>,
}

impl ProteinData {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<ProteinData, ProjectDataError> {
        read_json_file(path)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), ProjectDataError> {
        write_json_file(self, path)
    }

    pub fn is_measured(&self, protein: &str) -> bool {
        self.concentrations.contains_key(protein)
    }

    /// Measured concentrations of the proteins with a known mass
    ///
    /// A measured protein without known mass can't be charged and is left out, with a warning.
    pub fn usable_concentrations(&self, masses: &ProteinMasses) -> IndexMap<String, f64> {
        self.concentrations
            .iter()
            .filter(|(protein, _)| {
                let known = masses.contains_key(protein.as_str());
                if !known {
                    log::warn!(
                        "Measured protein {} has no known mass, its concentration is ignored",
                        protein
                    );
                }
                known
            })
            .map(|(protein, concentration)| (protein.clone(), *concentration))
            .collect()
    }

    /// Mass of all measured proteins, g/gDW
    ///
    /// With masses in kDa (g/mmol) and concentrations in mmol/gDW this is the sum of their
    /// products. Measured proteins without known mass are left out.
    pub fn p_measured(&self, masses: &ProteinMasses) -> f64 {
        self.concentrations
            .iter()
            .filter_map(|(protein, concentration)| masses.get(protein).map(|mass| concentration * mass))
            .sum()
    }

    /// Upper bound of the protein pool reaction
    pub fn pool_bound(&self, p_measured: f64) -> f64 {
        (self.p_total - p_measured) * self.unmeasured_protein_fraction * self.mean_saturation
    }
}

/// Add the protein pool pseudo-metabolite and the reaction delivering it
pub fn add_prot_pool_reaction(model: &mut Model, upper_bound: f64) -> Result<(), AssemblyError> {
    if upper_bound < 0. {
        return Err(AssemblyError::NegativePoolBound { bound: upper_bound });
    }
    model.add_metabolite(Metabolite::new(
        PROT_POOL,
        "prot_pool pseudometabolite for unmeasured proteins",
        PSEUDO_COMPARTMENT,
    ));
    let mut metabolites = IndexMap::new();
    metabolites.insert(PROT_POOL.to_string(), 1.);
    let mut reaction = Reaction::new(POOL_REACTION, metabolites, 0., upper_bound);
    reaction.name = Some("prot_pool reaction for unmeasured proteins".to_string());
    reaction.subsystem = Some(PSEUDO_COMPARTMENT.to_string());
    model.add_reaction(reaction);
    log::info!("Protein pool bound is {}", upper_bound);
    Ok(())
}

/// Pseudo-metabolite of a measured protein
pub fn enzyme_metabolite_id(protein: &str) -> String {
    format!("{}{}", ENZYME_PREFIX, protein)
}

/// Add one pseudo-metabolite per measured protein with a reaction delivering at most the
/// measured concentration
pub fn add_delivery_reactions(model: &mut Model, concentrations: &IndexMap<String, f64>) {
    for (protein, concentration) in concentrations {
        let metabolite = enzyme_metabolite_id(protein);
        model.add_metabolite(Metabolite::new(
            &metabolite,
            &format!("Pseudo-metabolite of protein {}", protein),
            PSEUDO_COMPARTMENT,
        ));
        let mut metabolites = IndexMap::new();
        metabolites.insert(metabolite, 1.);
        let mut reaction = Reaction::new(
            &format!("{}{}", ENZYME_DELIVERY_PREFIX, protein),
            metabolites,
            0.,
            *concentration,
        );
        reaction.name = Some(format!("Delivery reaction of pseudo-metabolite {}", protein));
        model.add_reaction(reaction);
    }
}
