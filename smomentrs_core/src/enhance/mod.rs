//! Construction of protein-constrained models
//!
//! A stoichiometric model is enhanced in a fixed order of passes:
//!
//! 1. reactions catalysed by proteins with measured concentrations are split by enzyme
//!    alternative ([`measured`], sMOMENT only)
//! 2. reversible reactions with a gene rule are split into two irreversible reactions
//!    ([`irreversible`])
//! 3. the shared protein pool and the per-protein pseudo-metabolites are added
//!    ([`protein_data`])
//! 4. every remaining enzyme-catalysed reaction gets its enzyme cost ([`smoment`] or [`gecko`])
//!
//! The result of every reaction of the last pass is collected in an [`EnhancementReport`].
pub mod arm;
pub mod gecko;
pub mod irreversible;
pub mod manual_changes;
pub mod measured;
pub mod protein_data;
pub mod report;
pub mod smoment;

use indexmap::{IndexMap, IndexSet};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gene_rule::GeneRule;
use crate::io::project::{EnzymeStoichiometries, ProjectDataError, ProteinMasses};
use crate::kcat::{KcatSelection, ReactionKcatMapping};
use crate::kcat::selection::EC_NAMESPACE;
use crate::metabolic_model::model::{Model, ModelError};
use crate::metabolic_model::reaction::{Reaction, ReactionDirection};
use protein_data::ProteinData;
use report::{EnhancementReport, KcatOrigin, Skipped};

/// Pseudo-metabolite holding the protein pool shared by all unmeasured enzymes
pub const PROT_POOL: &str = "prot_pool";
/// Reaction delivering the protein pool
pub const POOL_REACTION: &str = "ER_pool";
/// Prefix of the pseudo-metabolite of a measured protein
pub const ENZYME_PREFIX: &str = "ENZYME_";
/// Prefix of the reaction delivering a measured protein
pub const ENZYME_DELIVERY_PREFIX: &str = "ENZYME_DELIVERY_";
/// Prefix of arm metabolites created when splitting by enzyme alternatives
pub const ARM_METABOLITE_PREFIX: &str = "armm_";
/// Prefix of arm reactions created when splitting by enzyme alternatives
pub const ARM_REACTION_PREFIX: &str = "armr_";
/// Infix of the reactions created when splitting by enzyme alternatives
pub const GPR_SPLIT_INFIX: &str = "_GPRSPLIT_";
/// Compartment of every pseudo-metabolite
pub const PSEUDO_COMPARTMENT: &str = "sMOMENT";

/// Seconds per hour, kcats are given per second and fluxes per hour
const SECONDS_PER_HOUR: f64 = 3600.;

/// Where a reaction of the enhanced model comes from
#[derive(Clone, Debug, PartialEq)]
pub struct ReactionOrigin {
    /// Reaction of the input model, used for exclusions and kcats
    pub root: String,
    /// Key of the reaction's enzymes in the enzyme stoichiometry table
    pub enzyme_key: String,
    /// Direction of the root reaction this reaction carries, `None` when not split
    pub direction: Option<ReactionDirection>,
}

impl ReactionOrigin {
    fn of(id: &str) -> ReactionOrigin {
        ReactionOrigin {
            root: id.to_string(),
            enzyme_key: id.to_string(),
            direction: None,
        }
    }

    /// Direction used to look up the kcat, forward when the reaction was never split
    pub fn kcat_direction(&self) -> ReactionDirection {
        self.direction.unwrap_or(ReactionDirection::Forward)
    }
}

/// Origins of the reactions created by the splitting passes
///
/// Reactions which were never split are their own origin.
#[derive(Clone, Debug, Default)]
pub struct ReactionOrigins {
    origins: IndexMap<String, ReactionOrigin>,
}

impl ReactionOrigins {
    pub fn new() -> Self {
        ReactionOrigins::default()
    }

    pub fn origin(&self, id: &str) -> ReactionOrigin {
        self.origins
            .get(id)
            .cloned()
            .unwrap_or_else(|| ReactionOrigin::of(id))
    }

    pub fn register(&mut self, id: &str, origin: ReactionOrigin) {
        self.origins.insert(id.to_string(), origin);
    }

    /// Record that `child` carries `parent` in `direction`
    pub fn register_direction(&mut self, parent: &str, child: &str, direction: ReactionDirection) {
        let mut origin = self.origin(parent);
        origin.direction = Some(direction);
        self.register(child, origin);
    }
}

/// Run options shared by the sMOMENT and GECKO assemblers
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SmomentOptions {
    /// Reactions (ids of the input model) which get no enzyme constraint
    #[serde(default)]
    pub excluded_reactions: IndexSet<String>,
    /// How the default kcat is derived from all known kcats
    #[serde(default)]
    pub default_kcat_selection: KcatSelection,
    /// Seed for [`KcatSelection::Random`]
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SmomentOptions {
    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Project data consumed by the assemblers
#[derive(Clone, Copy, Debug)]
pub struct EnhancementInput<'a> {
    pub masses: &'a ProteinMasses,
    pub protein_data: &'a ProteinData,
    pub stoichiometries: &'a EnzymeStoichiometries,
    pub kcats: &'a ReactionKcatMapping,
}

/// An enhanced model with the per reaction outcome of the enhancement
#[derive(Clone, Debug)]
pub struct Enhancement {
    pub model: Model,
    pub report: EnhancementReport,
}

/// A reaction which passed every check and gets an enzyme constraint
#[derive(Clone, Debug)]
pub(crate) struct Candidate {
    pub rule: GeneRule,
    pub enzyme_key: String,
    pub kcat: f64,
    pub kcat_origin: KcatOrigin,
}

/// Decides whether `reaction` gets an enzyme constraint and with which kcat
///
/// `None` for reactions without an entry in the enzyme stoichiometry table, which are not
/// enzyme-catalysed as far as the assembler is concerned.
pub(crate) fn resolve_candidate(
    reaction: &Reaction,
    origin: &ReactionOrigin,
    stoichiometries: &EnzymeStoichiometries,
    masses: &ProteinMasses,
    kcats: &ReactionKcatMapping,
    options: &SmomentOptions,
    default_kcat: Option<f64>,
) -> Option<Result<Candidate, Skipped>> {
    let rule = stoichiometries.gene_rule(&origin.enzyme_key)?;
    if options.excluded_reactions.contains(&origin.root) {
        return Some(Err(Skipped::Excluded));
    }
    if rule.is_empty() {
        return Some(Err(Skipped::EmptyGeneRule));
    }
    let missing: Vec<String> = rule
        .proteins()
        .into_iter()
        .filter(|p| !masses.contains_key(p))
        .collect();
    if !missing.is_empty() {
        return Some(Err(Skipped::MissingMass { proteins: missing }));
    }

    let direction = origin.kcat_direction();
    let mapped = kcats
        .get(&origin.root)
        .and_then(|k| k.get(direction))
        .filter(|k| {
            let usable = *k > 0.;
            if !usable && !k.is_nan() {
                log::warn!(
                    "Reaction {} ({}) has the non-positive kcat {}, it is ignored",
                    reaction.id,
                    direction,
                    k
                );
            }
            usable
        });
    let has_ec_numbers = reaction
        .annotation
        .get(EC_NAMESPACE)
        .is_some_and(|ecs| !ecs.is_empty());
    let (kcat, kcat_origin) = match (mapped, default_kcat) {
        (Some(kcat), _) => (kcat, KcatOrigin::Mapped),
        (None, _) if kcats.get(&origin.root).is_some() && !has_ec_numbers => {
            return Some(Err(Skipped::NoKcat));
        }
        (None, Some(default)) => {
            log::info!(
                "Reaction {} ({}) uses the default kcat {}",
                reaction.id,
                direction,
                default
            );
            (default, KcatOrigin::Default)
        }
        (None, None) => return Some(Err(Skipped::NoKcat)),
    };
    Some(Ok(Candidate {
        rule,
        enzyme_key: origin.enzyme_key.clone(),
        kcat,
        kcat_origin,
    }))
}

/// Enzyme amount needed per unit of flux, in mmol/gDW per mmol/(gDW h)
pub(crate) fn enzyme_demand(units: f64, kcat: f64) -> f64 {
    units / (kcat * SECONDS_PER_HOUR)
}

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("The protein pool bound {bound} is negative, the measured protein mass exceeds the total protein mass")]
    NegativePoolBound { bound: f64 },
    #[error("Reaction {reaction} has no prot_pool coefficient")]
    MissingPoolCoefficient { reaction: String },
    #[error("Invalid kcat change factor {factor} for reaction {reaction}")]
    InvalidKcatFactor { reaction: String, factor: f64 },
    #[error(transparent)]
    ProjectData(#[from] ProjectDataError),
}
