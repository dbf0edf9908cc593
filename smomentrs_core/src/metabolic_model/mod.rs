//! Module providing the Model struct for representing a metabolic model, together with the
//! staging and scoped-modification helpers used by the enhancement and analysis passes.

pub mod context;
pub mod edit;
pub mod gene;
pub mod metabolite;
pub mod model;
pub mod reaction;

use indexmap::IndexMap;

/// Annotations of a model component, normalised to `{namespace: [values]}`
pub type Annotation = IndexMap<String, Vec<String>>;
