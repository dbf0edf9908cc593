//! Data files of a model building project
//!
//! Every table a project needs (protein masses, protein data, enzyme stoichiometries, kcat
//! mappings, scenarios) is stored as a JSON document. The generic [`read_json_file`] and
//! [`write_json_file`] helpers handle the file access, the enzyme stoichiometry table is
//! defined here.
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gene_rule::{Alternative, GeneRule, GeneRuleError};
use crate::metabolic_model::model::Model;

/// Protein molecular masses in kDa, keyed by protein id
pub type ProteinMasses = IndexMap<String, f64>;

/// Read and deserialize a JSON document
pub fn read_json_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, ProjectDataError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|err| ProjectDataError::UnableToRead {
        path: path.display().to_string(),
        source: err,
    })?;
    serde_json::from_str(&data).map_err(|err| ProjectDataError::UnableToParse {
        path: path.display().to_string(),
        source: err,
    })
}

/// Serialize a value as pretty printed JSON
pub fn write_json_file<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<(), ProjectDataError> {
    let path = path.as_ref();
    let data = serde_json::to_string_pretty(value)?;
    fs::write(path, data).map_err(|err| ProjectDataError::UnableToWrite {
        path: path.display().to_string(),
        source: err,
    })
}

/// One enzyme alternative of a reaction with the number of units of each member protein
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnzymeComplexEntry {
    pub proteins: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub units: IndexMap<String, f64>,
}

impl EnzymeComplexEntry {
    /// Entry for an alternative with one unit of every member
    pub fn from_alternative(alternative: &Alternative) -> EnzymeComplexEntry {
        EnzymeComplexEntry {
            proteins: alternative.proteins().to_vec(),
            units: IndexMap::new(),
        }
    }

    pub fn alternative(&self) -> Option<Alternative> {
        Alternative::from_proteins(self.proteins.clone())
    }

    /// Units of `protein` in this enzyme, 1 when not given
    pub fn units_of(&self, protein: &str) -> f64 {
        self.units.get(protein).copied().unwrap_or(1.)
    }
}

/// Enzyme stoichiometry table: reaction id to its enzyme alternatives
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnzymeStoichiometries {
    entries: IndexMap<String, Vec<EnzymeComplexEntry>>,
}

impl EnzymeStoichiometries {
    /// Initial table derived from the gene rules of a model, with one unit of every protein
    pub fn from_model(model: &Model) -> Result<EnzymeStoichiometries, GeneRuleError> {
        let mut table = EnzymeStoichiometries::default();
        for reaction in model.reactions.values() {
            let Some(gpr) = &reaction.gpr else { continue };
            let rule = GeneRule::try_from(gpr)?;
            if rule.is_empty() {
                continue;
            }
            table.insert_rule(&reaction.id, &rule);
        }
        Ok(table)
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<EnzymeStoichiometries, ProjectDataError> {
        read_json_file(path)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), ProjectDataError> {
        write_json_file(self, path)
    }

    pub fn get(&self, reaction: &str) -> Option<&[EnzymeComplexEntry]> {
        self.entries.get(reaction).map(|entries| entries.as_slice())
    }

    pub fn contains(&self, reaction: &str) -> bool {
        self.entries.contains_key(reaction)
    }

    /// Structured gene rule of a reaction, entries without proteins are ignored
    pub fn gene_rule(&self, reaction: &str) -> Option<GeneRule> {
        let entries = self.entries.get(reaction)?;
        Some(GeneRule::new(
            entries.iter().filter_map(|e| e.alternative()).collect(),
        ))
    }

    /// Units of `protein` in the enzyme `alternative` of `reaction`, 1 when not given
    pub fn units(&self, reaction: &str, alternative: &Alternative, protein: &str) -> f64 {
        self.entries
            .get(reaction)
            .and_then(|entries| {
                entries
                    .iter()
                    .find(|e| e.proteins.as_slice() == alternative.proteins())
            })
            .map(|e| e.units_of(protein))
            .unwrap_or(1.)
    }

    pub fn insert(&mut self, reaction: &str, entries: Vec<EnzymeComplexEntry>) {
        self.entries.insert(reaction.to_string(), entries);
    }

    /// Insert a rule with one unit of every protein
    pub fn insert_rule(&mut self, reaction: &str, rule: &GeneRule) {
        self.insert(
            reaction,
            rule.iter().map(EnzymeComplexEntry::from_alternative).collect(),
        );
    }

    /// Entries of `reaction` restricted to the given alternatives, keeping their unit counts
    pub fn entries_for(&self, reaction: &str, alternatives: &[Alternative]) -> Vec<EnzymeComplexEntry> {
        alternatives
            .iter()
            .map(|alt| {
                let mut entry = EnzymeComplexEntry::from_alternative(alt);
                for protein in alt.proteins() {
                    let units = self.units(reaction, alt, protein);
                    if units != 1. {
                        entry.units.insert(protein.clone(), units);
                    }
                }
                entry
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ProjectDataError {
    #[error("Unable to read {path}: {source}")]
    UnableToRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Unable to parse {path}: {source}")]
    UnableToParse {
        path: String,
        source: serde_json::Error,
    },
    #[error("Unable to write {path}: {source}")]
    UnableToWrite {
        path: String,
        source: std::io::Error,
    },
    #[error("Unable to serialize project data")]
    Serialize(#[from] serde_json::Error),
    #[error("Invalid gene rule in project data")]
    GeneRule(#[from] GeneRuleError),
}
