//! This module provides the Gene struct
use std::fmt::{Display, Formatter};

use derive_builder::Builder;

use super::Annotation;

/// Structure Representing a Gene
#[derive(Builder, Clone, Debug, PartialEq)]
pub struct Gene {
    /// Used to identify the gene
    pub id: String,
    /// Human Readable Gene Name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Notes about the gene
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Gene Annotations
    #[builder(default = "Annotation::new()")]
    pub annotation: Annotation,
}

impl Gene {
    /// Create a gene with only an id
    pub fn new(id: &str) -> Gene {
        Gene {
            id: id.to_string(),
            name: None,
            notes: None,
            annotation: Annotation::new(),
        }
    }
}

impl Display for Gene {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}
