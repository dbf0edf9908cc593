//! Structuring of gene rules into enzyme alternatives
//!
//! A gene rule such as `b0001 or (b0002 and b0003)` is read as an OR of alternatives, each of
//! which is either a single protein or a complex (AND of proteins). Rules which do not fit this
//! shape, an `or` nested within an `and` or any use of `not`, are rejected.
use std::fmt::{Display, Formatter};

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::io::gpr_parse::{parse_gpr, GprParseError};
use crate::metabolic_model::model::{Gpr, GprOperation};

/// One way of catalysing a reaction
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Alternative {
    /// A single protein
    Single(String),
    /// A complex of proteins, all of which are required
    Complex(Vec<String>),
}

impl Alternative {
    /// Build an alternative from its member proteins, `None` when there are no members
    pub fn from_proteins(mut proteins: Vec<String>) -> Option<Alternative> {
        match proteins.len() {
            0 => None,
            1 => proteins.pop().map(Alternative::Single),
            _ => Some(Alternative::Complex(proteins)),
        }
    }

    /// Member proteins of the alternative
    pub fn proteins(&self) -> &[String] {
        match self {
            Alternative::Single(protein) => std::slice::from_ref(protein),
            Alternative::Complex(proteins) => proteins,
        }
    }

    pub fn contains(&self, protein: &str) -> bool {
        self.proteins().iter().any(|p| p == protein)
    }

    /// The alternative as a GPR tree
    pub fn to_gpr(&self) -> Gpr {
        let mut proteins = self.proteins().iter();
        // An alternative always has at least one member
        let first = proteins
            .next()
            .map(|p| Gpr::new_gene_node(p))
            .unwrap_or_else(|| Gpr::new_gene_node(""));
        proteins.fold(first, |left, p| {
            Gpr::Operation(GprOperation::And {
                left: Box::new(left),
                right: Box::new(Gpr::new_gene_node(p)),
            })
        })
    }
}

impl Display for Alternative {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.proteins().join(" and "))
    }
}

/// A structured gene rule, an ordered OR of [`Alternative`]s
///
/// The empty rule means no enzyme is required.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GeneRule {
    alternatives: Vec<Alternative>,
}

impl GeneRule {
    pub fn new(alternatives: Vec<Alternative>) -> GeneRule {
        GeneRule { alternatives }
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Alternative> {
        self.alternatives.iter()
    }

    /// Every protein named in the rule, in order of first appearance
    pub fn proteins(&self) -> IndexSet<String> {
        self.alternatives
            .iter()
            .flat_map(|alt| alt.proteins().iter().cloned())
            .collect()
    }

    /// The rule as a GPR tree, `None` for the empty rule
    pub fn to_gpr(&self) -> Option<Gpr> {
        let mut alternatives = self.alternatives.iter();
        let first = alternatives.next()?.to_gpr();
        Some(alternatives.fold(first, |left, alt| {
            Gpr::Operation(GprOperation::Or {
                left: Box::new(left),
                right: Box::new(alt.to_gpr()),
            })
        }))
    }
}

impl Display for GeneRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .alternatives
            .iter()
            .map(|alt| match alt {
                Alternative::Complex(_) if self.alternatives.len() > 1 => format!("({})", alt),
                _ => alt.to_string(),
            })
            .collect();
        write!(f, "{}", parts.join(" or "))
    }
}

impl<'a> IntoIterator for &'a GeneRule {
    type Item = &'a Alternative;
    type IntoIter = std::slice::Iter<'a, Alternative>;

    fn into_iter(self) -> Self::IntoIter {
        self.alternatives.iter()
    }
}

/// Structure a gene rule string into its alternatives
///
/// # Examples
/// ```rust
/// use smomentrs_core::gene_rule::{structure_gene_rule, Alternative};
/// let rule = structure_gene_rule("b0001 or (b0002 and b0003)").unwrap();
/// assert_eq!(rule.alternatives()[0], Alternative::Single("b0001".to_string()));
/// assert_eq!(rule.alternatives()[1].proteins(), ["b0002", "b0003"]);
/// assert!(structure_gene_rule("").unwrap().is_empty());
/// ```
pub fn structure_gene_rule(rule: &str) -> Result<GeneRule, GeneRuleError> {
    let rule = rule.trim();
    if rule.is_empty() {
        return Ok(GeneRule::default());
    }
    let mut scratch = IndexMap::new();
    let gpr = parse_gpr(rule, &mut scratch).map_err(|source| GeneRuleError::Parse {
        rule: rule.to_string(),
        source,
    })?;
    GeneRule::try_from(&gpr)
}

impl TryFrom<&Gpr> for GeneRule {
    type Error = GeneRuleError;

    fn try_from(gpr: &Gpr) -> Result<Self, Self::Error> {
        let mut alternatives = Vec::new();
        collect_alternatives(gpr, gpr, &mut alternatives)?;
        Ok(GeneRule::new(alternatives))
    }
}

/// Walk the top level OR chain, each operand becomes one alternative
fn collect_alternatives(
    root: &Gpr,
    node: &Gpr,
    alternatives: &mut Vec<Alternative>,
) -> Result<(), GeneRuleError> {
    match node {
        Gpr::Operation(GprOperation::Or { left, right }) => {
            collect_alternatives(root, left, alternatives)?;
            collect_alternatives(root, right, alternatives)
        }
        other => {
            let mut members = Vec::new();
            collect_complex(root, other, &mut members)?;
            if let Some(alternative) = Alternative::from_proteins(members) {
                alternatives.push(alternative);
            }
            Ok(())
        }
    }
}

/// Walk an AND chain, which may only contain genes
fn collect_complex(root: &Gpr, node: &Gpr, members: &mut Vec<String>) -> Result<(), GeneRuleError> {
    match node {
        Gpr::GeneNode(gene) => {
            members.push(gene.clone());
            Ok(())
        }
        Gpr::Operation(GprOperation::And { left, right }) => {
            collect_complex(root, left, members)?;
            collect_complex(root, right, members)
        }
        Gpr::Operation(GprOperation::Or { .. }) => Err(GeneRuleError::NestedGrouping {
            rule: root.to_string_id(),
        }),
        Gpr::Operation(GprOperation::Not { .. }) => Err(GeneRuleError::Negation {
            rule: root.to_string_id(),
        }),
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeneRuleError {
    #[error("Unable to parse gene rule {rule:?}: {source}")]
    Parse { rule: String, source: GprParseError },
    #[error("Unsupported gene rule {rule:?}: an `or` grouping within an `and` cannot be expressed as enzyme alternatives")]
    NestedGrouping { rule: String },
    #[error("Unsupported gene rule {rule:?}: `not` cannot be expressed as enzyme alternatives")]
    Negation { rule: String },
}
