//! Turnover number (kcat) data: databases, their combination, taxonomic ranking of organisms
//! and the selection of one kcat per reaction direction.
pub mod combine;
pub mod database;
pub mod protein_database;
pub mod selection;
pub mod taxonomy;

use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::io::project::{read_json_file, write_json_file, ProjectDataError};
use crate::metabolic_model::reaction::ReactionDirection;

/// How a list of kcat samples is reduced to a single value
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KcatSelection {
    Mean,
    #[default]
    Median,
    Random,
}

impl KcatSelection {
    /// Reduce `samples` to one value, `None` if there are no samples
    pub fn reduce<R: Rng + ?Sized>(&self, samples: &[f64], rng: &mut R) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        match self {
            KcatSelection::Mean => Some(samples.iter().sum::<f64>() / samples.len() as f64),
            KcatSelection::Median => {
                let mut sorted = samples.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    Some((sorted[mid - 1] + sorted[mid]) / 2.)
                } else {
                    Some(sorted[mid])
                }
            }
            KcatSelection::Random => samples.choose(rng).copied(),
        }
    }
}

impl FromStr for KcatSelection {
    type Err = KcatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mean" => Ok(KcatSelection::Mean),
            "median" => Ok(KcatSelection::Median),
            "random" => Ok(KcatSelection::Random),
            _ => Err(KcatError::InvalidSelection(s.to_string())),
        }
    }
}

impl Display for KcatSelection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KcatSelection::Mean => write!(f, "mean"),
            KcatSelection::Median => write!(f, "median"),
            KcatSelection::Random => write!(f, "random"),
        }
    }
}

/// Selected kcats (1/s) of both directions of a reaction, `None` where no kcat was found
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionKcats {
    #[serde(default)]
    pub forward: Option<f64>,
    #[serde(default)]
    pub reverse: Option<f64>,
}

impl ReactionKcats {
    pub fn get(&self, direction: ReactionDirection) -> Option<f64> {
        match direction {
            ReactionDirection::Forward => self.forward,
            ReactionDirection::Reverse => self.reverse,
        }
    }
}

/// Reaction id to its selected kcats
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionKcatMapping {
    entries: IndexMap<String, ReactionKcats>,
}

impl ReactionKcatMapping {
    pub fn new() -> Self {
        ReactionKcatMapping::default()
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ProjectDataError> {
        read_json_file(path)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), ProjectDataError> {
        write_json_file(self, path)
    }

    pub fn insert(&mut self, reaction: &str, kcats: ReactionKcats) {
        self.entries.insert(reaction.to_string(), kcats);
    }

    pub fn get(&self, reaction: &str) -> Option<&ReactionKcats> {
        self.entries.get(reaction)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ReactionKcats> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every known forward and reverse kcat, NaN and non-positive values excluded
    pub fn known_kcats(&self) -> Vec<f64> {
        self.entries
            .values()
            .flat_map(|k| [k.forward, k.reverse])
            .flatten()
            .filter(|k| *k > 0.)
            .collect()
    }

    /// Network wide default kcat: all known kcats reduced with `selection`
    pub fn default_kcat<R: Rng + ?Sized>(&self, selection: KcatSelection, rng: &mut R) -> Option<f64> {
        selection.reduce(&self.known_kcats(), rng)
    }
}

#[derive(Debug, Error)]
pub enum KcatError {
    #[error("Invalid kcat selection {0:?}, expected one of mean, median or random")]
    InvalidSelection(String),
    #[error("Unable to read kcat data")]
    ProjectData(#[from] ProjectDataError),
    #[error("Taxonomy lookup failed")]
    Taxonomy(#[from] taxonomy::TaxonomyError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn parse_selection() {
        assert_eq!("Median".parse::<KcatSelection>().unwrap(), KcatSelection::Median);
        assert_eq!(" mean".parse::<KcatSelection>().unwrap(), KcatSelection::Mean);
        match "average".parse::<KcatSelection>() {
            Err(KcatError::InvalidSelection(value)) => assert_eq!(value, "average"),
            _ => panic!("Expected an invalid selection error"),
        }
        assert_eq!(KcatSelection::Random.to_string(), "random");
    }

    #[test]
    fn reduce_samples() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = [4., 1., 3., 2.];
        assert_relative_eq!(KcatSelection::Mean.reduce(&samples, &mut rng).unwrap(), 2.5);
        assert_relative_eq!(KcatSelection::Median.reduce(&samples, &mut rng).unwrap(), 2.5);
        assert_relative_eq!(
            KcatSelection::Median.reduce(&[5., 1., 3.], &mut rng).unwrap(),
            3.
        );
        let picked = KcatSelection::Random.reduce(&samples, &mut rng).unwrap();
        assert!(samples.contains(&picked));
        assert_eq!(KcatSelection::Mean.reduce(&[], &mut rng), None);
    }

    #[test]
    fn default_kcat_of_mapping() {
        let data = r#"{
            "PFK": {"forward": 100.0, "reverse": null},
            "PGI": {"forward": 20.0, "reverse": 30.0},
            "HEX1": {}
        }"#;
        let mapping: ReactionKcatMapping = serde_json::from_str(data).unwrap();
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.get("HEX1"), Some(&ReactionKcats::default()));
        assert_eq!(
            mapping.get("PGI").unwrap().get(ReactionDirection::Reverse),
            Some(30.)
        );
        let mut rng = StdRng::seed_from_u64(1);
        assert_relative_eq!(
            mapping.default_kcat(KcatSelection::Median, &mut rng).unwrap(),
            30.
        );
        assert_eq!(
            ReactionKcatMapping::new().default_kcat(KcatSelection::Median, &mut rng),
            None
        );
    }

    #[test]
    fn non_positive_kcats_are_unknown() {
        let mut mapping = ReactionKcatMapping::new();
        mapping.insert("PFK", ReactionKcats { forward: Some(0.), reverse: Some(-5.) });
        mapping.insert("PGI", ReactionKcats { forward: Some(f64::NAN), reverse: Some(40.) });
        assert_eq!(mapping.known_kcats(), vec![40.]);
    }
}
