//! Global defaults used when building model components and solving flux problems
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

pub struct Configuration {
    /// Lower bound given to reactions built without an explicit one
    pub lower_bound: f64,
    /// Upper bound given to reactions built without an explicit one
    pub upper_bound: f64,
    /// Feasibility and optimality tolerance handed to the LP solver
    pub tolerance: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            tolerance: 1e-07,
        }
    }
}

/// Current default lower bound, falling back to the built in default if the lock is poisoned
pub(crate) fn default_lower_bound() -> f64 {
    CONFIGURATION
        .read()
        .map(|c| c.lower_bound)
        .unwrap_or(Configuration::default().lower_bound)
}

/// Current default upper bound, falling back to the built in default if the lock is poisoned
pub(crate) fn default_upper_bound() -> f64 {
    CONFIGURATION
        .read()
        .map(|c| c.upper_bound)
        .unwrap_or(Configuration::default().upper_bound)
}

pub(crate) fn tolerance() -> f64 {
    CONFIGURATION
        .read()
        .map(|c| c.tolerance)
        .unwrap_or(Configuration::default().tolerance)
}
