//! EC-number keyed kcat databases
//!
//! On disk a database is a JSON object `{EC number: entry}`, where each entry maps substrate
//! keys (BiGG ids, `;` separated for several substrates) to `{organism: [kcat, ...]}` and also
//! carries the `WILDCARD`, `SOURCE` and `TRANSFER` fields.
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::io::project::{read_json_file, write_json_file, ProjectDataError};

/// Organism to measured kcats (1/s)
pub type OrganismKcats = IndexMap<String, Vec<f64>>;

/// Substrate key used for kcats regardless of substrate
pub const ALL_SUBSTRATES: &str = "ALL";

/// Kcats known for one EC number
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KcatEntry {
    /// Whether the entry was found through relaxed (prefix) EC number matching
    #[serde(rename = "WILDCARD", default)]
    pub wildcard: bool,
    /// Name of the database(s) the entry comes from
    #[serde(rename = "SOURCE", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// EC number this entry was transferred to
    #[serde(rename = "TRANSFER", default, skip_serializing_if = "Option::is_none")]
    pub transfer: Option<String>,
    /// Substrate key to organism kcats
    #[serde(flatten)]
    pub substrates: IndexMap<String, OrganismKcats>,
}

impl KcatEntry {
    /// Every organism with at least one kcat in this entry
    pub fn organisms(&self) -> impl Iterator<Item = &String> {
        self.substrates.values().flat_map(|organisms| organisms.keys())
    }
}

/// EC number to [`KcatEntry`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KcatDatabase {
    entries: IndexMap<String, KcatEntry>,
}

impl KcatDatabase {
    pub fn new() -> Self {
        KcatDatabase::default()
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ProjectDataError> {
        read_json_file(path)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), ProjectDataError> {
        write_json_file(self, path)
    }

    pub fn get(&self, ec_number: &str) -> Option<&KcatEntry> {
        self.entries.get(ec_number)
    }

    pub fn insert(&mut self, ec_number: &str, entry: KcatEntry) {
        self.entries.insert(ec_number.to_string(), entry);
    }

    pub fn contains(&self, ec_number: &str) -> bool {
        self.entries.contains_key(ec_number)
    }

    pub fn ec_numbers(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, KcatEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, KcatEntry)> for KcatDatabase {
    fn from_iter<T: IntoIterator<Item = (String, KcatEntry)>>(iter: T) -> Self {
        KcatDatabase {
            entries: iter.into_iter().collect(),
        }
    }
}
