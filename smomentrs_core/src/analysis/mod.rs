//! Analyses of protein-constrained models
//!
//! All analyses modify the model only inside [`ModelContext`](crate::metabolic_model::context::ModelContext)
//! scopes, so the model handed in is unchanged once they return.
pub mod differential;
pub mod flux_control;
pub mod fva_prot_pool;
pub mod scenario;

use thiserror::Error;

use crate::io::project::ProjectDataError;
use crate::metabolic_model::model::ModelError;
use crate::optimize::SolveError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error(transparent)]
    ProjectData(#[from] ProjectDataError),
    #[error("Unable to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Malformed line {line} in flux control file {path}: {reason}")]
    MalformedFluxControl {
        path: String,
        line: usize,
        reason: String,
    },
    #[error("Target reaction {reaction} has no flux in the base solution, relative changes are undefined")]
    ZeroBaseFlux { reaction: String },
    #[error("Unknown scenario {0}")]
    UnknownScenario(String),
}
