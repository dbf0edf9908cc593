//! Protein level kcat overrides
//!
//! A JSON file `{protein_id: {"kcats": [...], "direction": {reaction_id: "forward"|"reverse"}}}`
//! holding kcats measured for specific proteins.
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::io::project::{read_json_file, ProjectDataError};
use crate::metabolic_model::reaction::ReactionDirection;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProteinKcatEntry {
    #[serde(default)]
    pub kcats: Vec<f64>,
    /// Reaction id to the direction the kcats apply to
    #[serde(default)]
    pub direction: IndexMap<String, ReactionDirection>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProteinKcatDatabase {
    entries: IndexMap<String, ProteinKcatEntry>,
}

impl ProteinKcatDatabase {
    pub fn new(entries: IndexMap<String, ProteinKcatEntry>) -> Self {
        ProteinKcatDatabase { entries }
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ProjectDataError> {
        read_json_file(path)
    }

    pub fn get(&self, protein: &str) -> Option<&ProteinKcatEntry> {
        self.entries.get(protein)
    }

    /// Kcat for `reaction` in `direction` from the given proteins
    ///
    /// Each protein with kcats registered for this reaction and direction contributes its
    /// largest kcat, the smallest contribution is returned.
    pub fn kcat_for<'a, I>(&self, reaction: &str, direction: ReactionDirection, proteins: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a String>,
    {
        proteins
            .into_iter()
            .filter_map(|protein| self.entries.get(protein))
            .filter(|entry| entry.direction.get(reaction) == Some(&direction))
            .filter_map(|entry| entry.kcats.iter().copied().reduce(f64::max))
            .reduce(f64::min)
    }
}
