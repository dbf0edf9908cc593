//! Selection of one kcat per reaction direction
//!
//! For a reaction the kcats of all its eligible EC numbers are merged into a
//! [`CompleteEntry`]. The substrates (or products, for the reverse direction) of the reaction
//! are matched against the entry's substrate keys by BiGG id, and kcats are collected from
//! organisms in order of increasing taxonomic distance to the modelled organism until enough
//! samples are found. Too few samples trigger a second search over all substrates. A kcat
//! measured for one of the reaction's proteins is added before the samples are reduced to a
//! single value.
use indexmap::{IndexMap, IndexSet};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::database::{KcatDatabase, OrganismKcats, ALL_SUBSTRATES};
use super::protein_database::ProteinKcatDatabase;
use super::taxonomy::{taxonomic_distances, TaxonomyProvider};
use super::{KcatSelection, ReactionKcatMapping, ReactionKcats};
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::{Reaction, ReactionDirection};

/// Annotation key holding the EC numbers of a reaction
pub const EC_NAMESPACE: &str = "ec-code";

/// Samples wanted before the taxonomic search stops widening
pub const DEFAULT_MIN_SAMPLES: usize = 10;

/// Placeholder used when none of a reaction's metabolites has a BiGG id
const UNKNOWN_METABOLITE: &str = "X";

/// EC numbers of a reaction, without wildcarded ones (e.g. `2.1.1.-`) unless all are wildcarded
pub fn eligible_ec_numbers(ec_numbers: &[String]) -> Vec<String> {
    let exact: Vec<String> = ec_numbers
        .iter()
        .filter(|ec| !ec.contains('-'))
        .cloned()
        .collect();
    if exact.is_empty() {
        ec_numbers.to_vec()
    } else {
        exact
    }
}

/// BiGG ids of the metabolites consumed in `direction`
///
/// Reactants for the forward direction, products for the reverse direction. A placeholder
/// that matches no database key is returned when no metabolite has a BiGG id.
pub fn reaction_bigg_ids(model: &Model, reaction: &Reaction, direction: ReactionDirection) -> Vec<String> {
    let side: Vec<&String> = match direction {
        ReactionDirection::Forward => reaction.reactants().map(|(id, _)| id).collect(),
        ReactionDirection::Reverse => reaction.products().map(|(id, _)| id).collect(),
    };
    let ids: Vec<String> = side
        .into_iter()
        .filter_map(|id| model.metabolites.get(id))
        .filter_map(|met| met.bigg_id())
        .map(|id| id.to_string())
        .collect();
    if ids.is_empty() {
        vec![UNKNOWN_METABOLITE.to_string()]
    } else {
        ids
    }
}

/// Kcats of several EC numbers merged by substrate and organism
///
/// Always holds the pseudo substrate `ALL`, collecting every organism's kcats regardless of
/// substrate.
#[derive(Clone, Debug, PartialEq)]
pub struct CompleteEntry {
    substrates: IndexMap<String, OrganismKcats>,
}

impl CompleteEntry {
    /// Merge the non wildcarded entries of the eligible `ec_numbers`
    pub fn from_database(ec_numbers: &[String], database: &KcatDatabase) -> CompleteEntry {
        let mut substrates: IndexMap<String, OrganismKcats> = IndexMap::new();
        substrates.insert(ALL_SUBSTRATES.to_string(), IndexMap::new());
        for ec_number in eligible_ec_numbers(ec_numbers) {
            let Some(entry) = database.get(&ec_number) else {
                log::info!("No entry for EC number {}", ec_number);
                continue;
            };
            if entry.wildcard {
                continue;
            }
            for (substrate, organisms) in &entry.substrates {
                for (organism, kcats) in organisms {
                    if substrate != ALL_SUBSTRATES {
                        substrates
                            .entry(substrate.clone())
                            .or_default()
                            .entry(organism.clone())
                            .or_default()
                            .extend(kcats);
                    }
                    substrates
                        .entry(ALL_SUBSTRATES.to_string())
                        .or_default()
                        .entry(organism.clone())
                        .or_default()
                        .extend(kcats);
                }
            }
        }
        CompleteEntry { substrates }
    }

    /// True when no organism has any kcat for the EC numbers
    pub fn is_empty(&self) -> bool {
        self.substrates
            .get(ALL_SUBSTRATES)
            .map_or(true, |organisms| organisms.is_empty())
    }

    pub fn substrates(&self) -> impl Iterator<Item = &String> {
        self.substrates.keys()
    }

    /// Substrate keys matching the given BiGG ids, `["ALL"]` when none match
    ///
    /// A key matches when it equals one of the ids, or when every `;` separated part of it is
    /// one of the ids (multi-substrate keys such as `atp;f6p`).
    pub fn searched_metabolites(&self, bigg_ids: &[String]) -> Vec<String> {
        let mut matched: IndexSet<String> = IndexSet::new();
        for key in self.substrates.keys() {
            let exact = bigg_ids.iter().any(|id| id == key);
            let all_parts = key.split(';').all(|part| bigg_ids.iter().any(|id| id == part));
            if exact || all_parts {
                matched.insert(key.clone());
            }
        }
        if matched.is_empty() {
            vec![ALL_SUBSTRATES.to_string()]
        } else {
            matched.into_iter().collect()
        }
    }

    /// Organism to kcats over the searched substrate keys
    fn organism_kcats(&self, searched: &[String]) -> OrganismKcats {
        let mut merged: OrganismKcats = IndexMap::new();
        for substrate in searched {
            let Some(organisms) = self.substrates.get(substrate) else {
                continue;
            };
            for (organism, kcats) in organisms {
                merged.entry(organism.clone()).or_default().extend(kcats);
            }
        }
        merged
    }
}

/// Picks kcats for reactions of a model of one organism
pub struct KcatSelector<'a> {
    organism: String,
    kcat_database: &'a KcatDatabase,
    protein_kcat_database: Option<&'a ProteinKcatDatabase>,
    taxonomy: &'a mut dyn TaxonomyProvider,
    selection: KcatSelection,
    min_samples: usize,
    rng: StdRng,
}

impl<'a> KcatSelector<'a> {
    pub fn new(
        organism: &str,
        kcat_database: &'a KcatDatabase,
        taxonomy: &'a mut dyn TaxonomyProvider,
        selection: KcatSelection,
    ) -> Self {
        KcatSelector {
            organism: organism.to_string(),
            kcat_database,
            protein_kcat_database: None,
            taxonomy,
            selection,
            min_samples: DEFAULT_MIN_SAMPLES,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_protein_kcat_database(mut self, database: &'a ProteinKcatDatabase) -> Self {
        self.protein_kcat_database = Some(database);
        self
    }

    /// Seed the generator used by [`KcatSelection::Random`]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Kcats for the searched substrates, nearest organisms first
    ///
    /// Organisms are visited by increasing taxonomic distance, taking every organism at a
    /// distance before moving on, until at least the wanted number of samples is collected or
    /// no organism is left. Organisms without a shared taxon rank after all others.
    pub fn kcat_samples(&mut self, searched: &[String], entry: &CompleteEntry) -> Vec<f64> {
        let organism_kcats = entry.organism_kcats(searched);
        if organism_kcats.is_empty() {
            return Vec::new();
        }

        let mut organisms: Vec<String> = organism_kcats.keys().cloned().collect();
        if !organism_kcats.contains_key(&self.organism) {
            organisms.push(self.organism.clone());
        }
        let lineages = self.taxonomy.lineages(&organisms);
        let distances = taxonomic_distances(&self.organism, &lineages);
        let unrelated = distances.values().max().map_or(0, |max| max + 1);
        let distance_of = |organism: &String| distances.get(organism).copied().unwrap_or(unrelated);

        let nearest = organism_kcats.keys().map(distance_of).min().unwrap_or(0);
        let farthest = organism_kcats.keys().map(distance_of).max().unwrap_or(0);
        let mut samples = Vec::new();
        let mut current = nearest;
        while samples.len() < self.min_samples && current <= farthest {
            for (organism, kcats) in &organism_kcats {
                if distance_of(organism) == current {
                    samples.extend(kcats);
                }
            }
            current += 1;
        }
        samples
    }

    /// Kcat of `reaction` in `direction`, `None` when no sample is found
    pub fn select_kcat(
        &mut self,
        model: &Model,
        reaction: &Reaction,
        direction: ReactionDirection,
        ec_numbers: &[String],
    ) -> Option<f64> {
        let entry = CompleteEntry::from_database(ec_numbers, self.kcat_database);
        self.select_from_entry(model, reaction, direction, &entry)
    }

    fn select_from_entry(
        &mut self,
        model: &Model,
        reaction: &Reaction,
        direction: ReactionDirection,
        entry: &CompleteEntry,
    ) -> Option<f64> {
        let bigg_ids = reaction_bigg_ids(model, reaction, direction);
        let searched = entry.searched_metabolites(&bigg_ids);
        let mut samples = self.kcat_samples(&searched, entry);
        if samples.len() < self.min_samples && searched != [ALL_SUBSTRATES] {
            log::debug!(
                "{} {}: {} samples for {:?}, searching all substrates",
                reaction.id,
                direction,
                samples.len(),
                searched
            );
            samples = self.kcat_samples(&[ALL_SUBSTRATES.to_string()], entry);
        }
        if let Some(kcat) = self.protein_kcat(reaction, direction) {
            samples.push(kcat);
        }
        self.selection.reduce(&samples, &mut self.rng)
    }

    fn protein_kcat(&self, reaction: &Reaction, direction: ReactionDirection) -> Option<f64> {
        let database = self.protein_kcat_database?;
        let genes = reaction.gpr.as_ref()?.gene_ids();
        database.kcat_for(&reaction.id, direction, &genes)
    }

    /// Forward and reverse kcats of a reaction
    ///
    /// Reactions without EC numbers only get kcats from the protein kcat database. `None` when
    /// the reaction has EC numbers but none of them has any kcat.
    pub fn reaction_kcats(&mut self, model: &Model, reaction: &Reaction) -> Option<ReactionKcats> {
        let ec_numbers = reaction
            .annotation
            .get(EC_NAMESPACE)
            .filter(|ecs| !ecs.is_empty());
        let Some(ec_numbers) = ec_numbers else {
            return Some(ReactionKcats {
                forward: self.protein_kcat(reaction, ReactionDirection::Forward),
                reverse: self.protein_kcat(reaction, ReactionDirection::Reverse),
            });
        };
        let entry = CompleteEntry::from_database(ec_numbers, self.kcat_database);
        if entry.is_empty() {
            log::info!("No kcats for the EC numbers {:?} of {}", ec_numbers, reaction.id);
            return None;
        }
        Some(ReactionKcats {
            forward: self.select_from_entry(model, reaction, ReactionDirection::Forward, &entry),
            reverse: self.select_from_entry(model, reaction, ReactionDirection::Reverse, &entry),
        })
    }
}

/// Kcats of every reaction of `model`
pub fn get_reactions_kcat_mapping(model: &Model, selector: &mut KcatSelector) -> ReactionKcatMapping {
    let mut mapping = ReactionKcatMapping::new();
    for reaction in model.reactions.values() {
        let Some(kcats) = selector.reaction_kcats(model, reaction) else {
            continue;
        };
        log::info!(
            "Reaction {}: forward kcat {:?}, reverse kcat {:?}",
            reaction.id,
            kcats.forward,
            kcats.reverse
        );
        mapping.insert(&reaction.id, kcats);
    }
    mapping
}
