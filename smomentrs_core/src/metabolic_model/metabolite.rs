//! This module provides the metabolite struct representing a metabolite

use derive_builder::Builder;

use super::Annotation;

/// Annotation namespace holding BiGG metabolite identifiers
pub const BIGG_NAMESPACE: &str = "bigg.metabolite";

/// Represents a metabolite
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Metabolite {
    /// Used to identify the metabolite (must be unique)
    pub id: String,
    /// Human Readable name of the metabolite
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Which compartment the metabolite is in
    #[builder(default = "None")]
    pub compartment: Option<String>,
    /// Electrical charge of the Metabolite
    #[builder(default = "0")]
    pub charge: i32,
    /// Chemical Formula of the metabolite
    #[builder(default = "None")]
    pub formula: Option<String>,
    /// Notes about the metabolite
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Metabolite annotations
    #[builder(default = "Annotation::new()")]
    pub annotation: Annotation,
}

impl Metabolite {
    /// Create a metabolite with an id, name and compartment, as used for the pseudo-metabolites
    /// added during model enhancement
    pub fn new(id: &str, name: &str, compartment: &str) -> Metabolite {
        Metabolite {
            id: id.to_string(),
            name: Some(name.to_string()),
            compartment: Some(compartment.to_string()),
            charge: 0,
            formula: None,
            notes: None,
            annotation: Annotation::new(),
        }
    }

    /// First BiGG identifier in the annotations, if any
    pub fn bigg_id(&self) -> Option<&str> {
        self.annotation
            .get(BIGG_NAMESPACE)
            .and_then(|ids| ids.first())
            .map(|id| id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bigg_id_lookup() {
        let mut met = Metabolite::new("glc__D_c", "D-Glucose", "c");
        assert_eq!(met.bigg_id(), None);
        met.annotation.insert(
            BIGG_NAMESPACE.to_string(),
            vec!["glc__D".to_string(), "glc_D".to_string()],
        );
        assert_eq!(met.bigg_id(), Some("glc__D"));
    }
}
