//! This module provides the Model struct for representing an entire metabolic model
use std::fmt::{Display, Formatter};

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::Reaction;

/// Represents a Genome Scale Metabolic Model
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    /// Map of reaction ids to Reaction Objects
    pub reactions: IndexMap<String, Reaction>,
    /// Map of gene ids to Gene Objects
    pub genes: IndexMap<String, Gene>,
    /// Map of metabolite ids to Metabolite Objects
    pub metabolites: IndexMap<String, Metabolite>,
    /// Map of reaction ids to objective function coefficients (the objective is maximised)
    pub objective: IndexMap<String, f64>,
    /// Id associated with the Model
    pub id: Option<String>,
    /// Compartments in the model
    ///
    /// An IndexMap<String, String> of {short name: long name}
    pub compartments: Option<IndexMap<String, String>>,
    /// A version identifier for the Model, stored as a string
    pub version: Option<String>,
}

impl Model {
    pub fn new_empty() -> Self {
        Model::default()
    }

    /// Add a reaction to the model, replacing any reaction with the same id
    ///
    /// Genes named in the reaction's GPR which are not yet in the model are added.
    ///
    /// # Examples
    /// ```rust
    /// use smomentrs_core::metabolic_model::model::Model;
    /// use smomentrs_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// let new_reaction = ReactionBuilder::default().id("new_reaction".to_string()).build().unwrap();
    /// model.add_reaction(new_reaction);
    /// assert!(model.reactions.contains_key("new_reaction"));
    /// ```
    pub fn add_reaction(&mut self, reaction: Reaction) {
        if let Some(gpr) = &reaction.gpr {
            for gene in gpr.gene_ids() {
                if !self.genes.contains_key(&gene) {
                    self.genes.insert(gene.clone(), Gene::new(&gene));
                }
            }
        }
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Add a gene to the model
    pub fn add_gene(&mut self, gene: Gene) {
        let id = gene.id.clone();
        self.genes.insert(id, gene);
    }

    /// Add a metabolite to the model, replacing any metabolite with the same id
    pub fn add_metabolite(&mut self, metabolite: Metabolite) {
        let id = metabolite.id.clone();
        self.metabolites.insert(id, metabolite);
    }

    /// Remove a reaction (and its objective coefficient) from the model
    pub fn remove_reaction(&mut self, id: &str) -> Option<Reaction> {
        self.objective.shift_remove(id);
        self.reactions.shift_remove(id)
    }

    /// Look up a reaction by id
    pub fn reaction(&self, id: &str) -> Result<&Reaction, ModelError> {
        self.reactions
            .get(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))
    }

    /// Look up a reaction by id for modification
    pub fn reaction_mut(&mut self, id: &str) -> Result<&mut Reaction, ModelError> {
        self.reactions
            .get_mut(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))
    }

    /// Replace the objective with maximisation of a single reaction
    pub fn set_objective(&mut self, reaction_id: &str) -> Result<(), ModelError> {
        self.reaction(reaction_id)?;
        self.objective.clear();
        self.objective.insert(reaction_id.to_string(), 1.);
        Ok(())
    }

    /// Ids of all reactions in which `metabolite` takes part
    pub fn reactions_of_metabolite(&self, metabolite: &str) -> Vec<String> {
        self.reactions
            .values()
            .filter(|r| r.metabolites.contains_key(metabolite))
            .map(|r| r.id.clone())
            .collect()
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Model {} ({} reactions, {} metabolites, {} genes)",
            self.id.as_deref().unwrap_or("<unnamed>"),
            self.reactions.len(),
            self.metabolites.len(),
            self.genes.len()
        )
    }
}

/// Errors raised when looking up or modifying model components
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Reaction {0} is not present in the model")]
    ReactionNotFound(String),
    #[error("Metabolite {0} is not present in the model")]
    MetaboliteNotFound(String),
    #[error("Invalid bounds for reaction {reaction}: lower bound {lower} exceeds upper bound {upper}")]
    InvalidBounds {
        reaction: String,
        lower: f64,
        upper: f64,
    },
}

// region GPR Functionality
/// Representation of a Gene Protein Reaction Rule as an AST
#[derive(Clone, Debug, PartialEq)]
pub enum Gpr {
    /// Operation on two genes (see [`GprOperation`])
    Operation(GprOperation),
    /// A terminal gene Node, holding the gene id
    GeneNode(String),
}

impl Display for Gpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_id())
    }
}

impl Gpr {
    /// Create a new binary operation node
    pub fn new_binary_operation(
        left: Gpr,
        operator: GprOperatorType,
        right: Gpr,
    ) -> Result<Gpr, GprError> {
        let op = match operator {
            GprOperatorType::Or => GprOperation::Or {
                left: Box::new(left),
                right: Box::new(right),
            },
            GprOperatorType::And => GprOperation::And {
                left: Box::new(left),
                right: Box::new(right),
            },
            GprOperatorType::Not => return Err(GprError::InvalidBinaryOp),
        };
        Ok(Gpr::Operation(op))
    }

    /// Create a new unary operation node
    pub fn new_unary_operation(operator: GprOperatorType, operand: Gpr) -> Result<Gpr, GprError> {
        let op = match operator {
            GprOperatorType::Not => GprOperation::Not {
                val: Box::new(operand),
            },
            _ => return Err(GprError::InvalidUnaryOp),
        };
        Ok(Gpr::Operation(op))
    }

    /// Create a new gene node
    pub fn new_gene_node(gene: &str) -> Gpr {
        Gpr::GeneNode(gene.to_string())
    }

    /// Generate a GPR string with gene ids from the GPR AST
    pub fn to_string_id(&self) -> String {
        match self {
            Gpr::Operation(op) => match op {
                GprOperation::Or { left, right } => {
                    format!("({} or {})", left.to_string_id(), right.to_string_id())
                }
                GprOperation::And { left, right } => {
                    format!("({} and {})", left.to_string_id(), right.to_string_id())
                }
                GprOperation::Not { val } => {
                    format!("(not {})", val)
                }
            },
            Gpr::GeneNode(gene_ref) => gene_ref.to_string(),
        }
    }

    /// Ids of every gene mentioned in the rule, in order of first appearance
    pub fn gene_ids(&self) -> IndexSet<String> {
        let mut genes = IndexSet::new();
        self.collect_genes(&mut genes);
        genes
    }

    fn collect_genes(&self, genes: &mut IndexSet<String>) {
        match self {
            Gpr::Operation(GprOperation::Or { left, right })
            | Gpr::Operation(GprOperation::And { left, right }) => {
                left.collect_genes(genes);
                right.collect_genes(genes);
            }
            Gpr::Operation(GprOperation::Not { val }) => val.collect_genes(genes),
            Gpr::GeneNode(gene) => {
                genes.insert(gene.clone());
            }
        }
    }
}

/// Possible operations on genes
#[derive(Clone, Debug, PartialEq)]
pub enum GprOperation {
    Or { left: Box<Gpr>, right: Box<Gpr> },
    And { left: Box<Gpr>, right: Box<Gpr> },
    Not { val: Box<Gpr> },
}

/// Types of Allowed GPR Operations
pub enum GprOperatorType {
    /// Or, any one of the operands suffices
    Or,
    /// And, both operands are required
    And,
    /// Not, negation of the operand
    Not,
}

#[derive(Clone, Debug, Error)]
pub enum GprError {
    #[error("Invalid Binary Operation")]
    InvalidBinaryOp,
    #[error("Invalid Unary Operation")]
    InvalidUnaryOp,
}

// endregion GPR Functionality
