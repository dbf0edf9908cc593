//! Module providing JSON IO for Models, using the cobrapy JSON layout
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::io::gpr_parse::{parse_gpr, GprParseError};
use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::{ReactionBuilder, ReactionBuilderError};
use crate::metabolic_model::Annotation;

// region JSON Model
/// Represents a JSON serialized model, used for reading and writing models in json format
#[derive(Serialize, Deserialize)]
struct JsonModel {
    metabolites: Vec<JsonMetabolite>,
    reactions: Vec<JsonReaction>,
    genes: Vec<JsonGene>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compartments: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct JsonMetabolite {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    compartment: Option<String>,
    #[serde(default)]
    charge: Option<i32>,
    #[serde(default)]
    formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct JsonReaction {
    id: String,
    #[serde(default)]
    name: Option<String>,
    metabolites: IndexMap<String, f64>,
    lower_bound: f64,
    upper_bound: f64,
    #[serde(default)]
    gene_reaction_rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    objective_coefficient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subsystem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct JsonGene {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}
// endregion JSON Model

// region Conversions
/// Normalise a JSON annotation object to `{namespace: [values]}`
///
/// Scalars become one element lists, anything other than an object yields no annotations.
fn annotation_from_value(value: Option<Value>) -> Annotation {
    let mut annotation = Annotation::new();
    if let Some(Value::Object(map)) = value {
        for (key, val) in map {
            let values = match val {
                Value::Array(items) => items.into_iter().filter_map(value_to_string).collect(),
                other => value_to_string(other).into_iter().collect(),
            };
            annotation.insert(key, values);
        }
    }
    annotation
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// `sbo` terms are written back as plain strings, everything else as lists
fn annotation_to_value(annotation: &Annotation) -> Option<Value> {
    if annotation.is_empty() {
        return None;
    }
    let map = annotation
        .iter()
        .map(|(key, values)| {
            let val = if key == "sbo" && values.len() == 1 {
                Value::String(values[0].clone())
            } else {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            };
            (key.clone(), val)
        })
        .collect();
    Some(Value::Object(map))
}

/// Notes are kept as their JSON text
fn notes_to_value(notes: &Option<String>) -> Option<Value> {
    notes
        .as_ref()
        .map(|n| serde_json::from_str(n).unwrap_or_else(|_| Value::String(n.clone())))
}

impl From<JsonGene> for Gene {
    fn from(g: JsonGene) -> Self {
        Self {
            id: g.id,
            name: g.name,
            notes: g.notes.map(|v| v.to_string()),
            annotation: annotation_from_value(g.annotation),
        }
    }
}

impl From<JsonMetabolite> for Metabolite {
    fn from(m: JsonMetabolite) -> Self {
        Self {
            id: m.id,
            name: m.name,
            compartment: m.compartment,
            charge: m.charge.unwrap_or_default(),
            formula: m.formula,
            notes: m.notes.map(|v| v.to_string()),
            annotation: annotation_from_value(m.annotation),
        }
    }
}

impl From<&Gene> for JsonGene {
    fn from(g: &Gene) -> Self {
        Self {
            id: g.id.clone(),
            name: g.name.clone(),
            notes: notes_to_value(&g.notes),
            annotation: annotation_to_value(&g.annotation),
        }
    }
}

impl From<&Metabolite> for JsonMetabolite {
    fn from(m: &Metabolite) -> Self {
        Self {
            id: m.id.clone(),
            name: m.name.clone(),
            compartment: m.compartment.clone(),
            charge: Some(m.charge),
            formula: m.formula.clone(),
            notes: notes_to_value(&m.notes),
            annotation: annotation_to_value(&m.annotation),
        }
    }
}

impl Model {
    /// Read a model stored in the cobrapy JSON layout
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Model, JsonError> {
        let model_str = fs::read_to_string(path.as_ref())
            .map_err(|err| JsonError::UnableToRead(format!("{}: {}", path.as_ref().display(), err)))?;
        Model::from_json_str(&model_str)
    }

    /// Parse a model from a string in the cobrapy JSON layout
    pub fn from_json_str(model_str: &str) -> Result<Model, JsonError> {
        let json_model = serde_json::from_str::<JsonModel>(model_str)
            .map_err(|err| JsonError::UnableToParse(err.to_string()))?;
        Model::from_json(json_model)
    }

    /// Write the model in the cobrapy JSON layout
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        let json_model = self.to_json()?;
        let model_string = serde_json::to_string_pretty(&json_model)?;
        fs::write(path, model_string)?;
        Ok(())
    }

    fn from_json(json_model: JsonModel) -> Result<Self, JsonError> {
        let mut model = Model::new_empty();
        // Start by converting the genes and metabolites using the From methods
        json_model.genes.into_iter().for_each(|g| {
            model.genes.insert(g.id.clone(), Gene::from(g));
        });
        json_model.metabolites.into_iter().for_each(|m| {
            model.metabolites.insert(m.id.clone(), Metabolite::from(m));
        });
        /* Now, iterate through the reactions, parsing GPRs, and adding to
        the objective along the way
        */
        for rxn in json_model.reactions {
            let rule = rxn.gene_reaction_rule.trim();
            let gpr = if !rule.is_empty() {
                Some(parse_gpr(rule, &mut model.genes).map_err(|err| {
                    JsonError::GprParserError {
                        reaction: rxn.id.clone(),
                        source: err,
                    }
                })?)
            } else {
                None
            };
            let new_reaction = ReactionBuilder::default()
                .id(rxn.id.clone())
                .metabolites(rxn.metabolites)
                .name(rxn.name)
                .gpr(gpr)
                .lower_bound(rxn.lower_bound)
                .upper_bound(rxn.upper_bound)
                .subsystem(rxn.subsystem)
                .notes(rxn.notes.map(|v| v.to_string()))
                .annotation(annotation_from_value(rxn.annotation))
                .build()?;
            model.reactions.insert(rxn.id.clone(), new_reaction);
            // Add the reaction to the objective function if desired
            if let Some(coef) = rxn.objective_coefficient.filter(|c| *c != 0.) {
                model.objective.insert(rxn.id, coef);
            }
        }
        model.id = json_model.id;
        model.compartments = json_model.compartments;
        model.version = json_model.version;
        Ok(model)
    }

    fn to_json(&self) -> Result<JsonModel, JsonError> {
        let json_reactions = self
            .reactions
            .values()
            .map(|r| JsonReaction {
                id: r.id.clone(),
                name: r.name.clone(),
                metabolites: r.metabolites.clone(),
                lower_bound: r.lower_bound,
                upper_bound: r.upper_bound,
                gene_reaction_rule: r.gene_reaction_rule(),
                objective_coefficient: self.objective.get(&r.id).copied(),
                subsystem: r.subsystem.clone(),
                notes: notes_to_value(&r.notes),
                annotation: annotation_to_value(&r.annotation),
            })
            .collect();

        Ok(JsonModel {
            metabolites: self.metabolites.values().map(JsonMetabolite::from).collect(),
            reactions: json_reactions,
            genes: self.genes.values().map(JsonGene::from).collect(),
            id: self.id.clone(),
            compartments: self.compartments.clone(),
            version: self.version.clone(),
        })
    }
}

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to parse the GPR rule of reaction {reaction}: {source}")]
    GprParserError {
        reaction: String,
        source: GprParseError,
    },
    #[error("Unable to read file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse json due to {0}")]
    UnableToParse(String),
    #[error("Unable to build reaction")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
    #[error("Serde json error")]
    SerdeJsonParseError(#[from] serde_json::Error),
    #[error("Unable to write to file")]
    UnableToWrite(#[from] std::io::Error),
}

// endregion Conversions

#[cfg(test)]
mod json_tests {
    use super::*;
    use crate::metabolic_model::model::{Gpr, GprOperation};
    use std::path::PathBuf;

    fn toy_model_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join("models")
            .join("toy_model.json")
    }

    #[test]
    fn json_metabolite() {
        let data = r#"{
"id":"glc__D_e",
"name":"D-Glucose",
"compartment":"e",
"charge":0,
"formula":"C6H12O6",
"notes":{"original_bigg_ids":["glc_D_e"]},
"annotation":{
"bigg.metabolite":["glc__D"],
"chebi":["CHEBI:12965","CHEBI:20999"],
"sabiork":[1406,"1407"],
"sbo":"SBO:0000247"
}
}"#;
        let met: Metabolite = serde_json::from_str::<JsonMetabolite>(data).unwrap().into();
        assert_eq!(met.id, "glc__D_e");
        assert_eq!(met.name.clone().unwrap(), "D-Glucose");
        assert_eq!(met.compartment.clone().unwrap(), "e");
        assert_eq!(met.charge, 0);
        assert_eq!(met.bigg_id(), Some("glc__D"));
        assert_eq!(met.annotation["sbo"], vec!["SBO:0000247"]);
        assert_eq!(met.annotation["sabiork"], vec!["1406", "1407"]);
        assert_eq!(met.annotation["chebi"].len(), 2);
    }

    #[test]
    fn read_json() {
        let model: Model = Model::read_json(toy_model_path()).unwrap();
        let (_, met) = model.metabolites.first().unwrap();
        assert_eq!(met.id, "glc__D_e");
        assert_eq!(met.formula.clone().unwrap(), "C6H12O6");

        let reaction = &model.reactions["HEX1"];
        assert_eq!(reaction.name.clone().unwrap(), "Hexokinase");
        assert_eq!(reaction.metabolites["atp_c"], -1.0);
        assert_eq!(reaction.annotation["ec-code"], vec!["2.7.1.1", "2.7.1.2"]);
        match reaction.gpr {
            Some(Gpr::Operation(GprOperation::Or { ref left, ref right })) => {
                assert_eq!(**left, Gpr::GeneNode("b2388".to_string()));
                assert_eq!(**right, Gpr::GeneNode("b1621".to_string()));
            }
            _ => panic!("Incorrect Parse"),
        }
        // Scalar annotations become single element lists
        assert_eq!(model.reactions["PFK"].annotation["ec-code"], vec!["2.7.1.11"]);
        assert!(model.reactions["BIOMASS"].gpr.is_none());

        assert_eq!(model.objective.len(), 1);
        assert_eq!(model.objective["BIOMASS"], 1.0);
        assert_eq!(model.id.clone().unwrap(), "toy_model");
        assert_eq!(model.version.clone().unwrap(), "1");
        assert_eq!(model.genes.len(), 6);
        assert_eq!(model.genes["b3916"].name.clone().unwrap(), "pfkA");
        let mut expected_compartments: IndexMap<String, String> = IndexMap::new();
        expected_compartments.insert("c".to_string(), "cytosol".to_string());
        expected_compartments.insert("e".to_string(), "extracellular space".to_string());
        assert_eq!(model.compartments.clone().unwrap(), expected_compartments);
    }

    #[test]
    fn write_then_read() {
        let model = Model::read_json(toy_model_path()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("written.json");
        model.write_json(&out).unwrap();
        let reread = Model::read_json(&out).unwrap();
        assert_eq!(model, reread);
    }

    #[test]
    fn invalid_rule_names_reaction() {
        let data = r#"{"metabolites": [], "genes": [], "reactions": [
            {"id": "BAD", "metabolites": {}, "lower_bound": 0, "upper_bound": 1,
             "gene_reaction_rule": "(b1 and b2"}]}"#;
        match Model::from_json_str(data) {
            Err(JsonError::GprParserError { reaction, .. }) => assert_eq!(reaction, "BAD"),
            _ => panic!("Expected a GPR parse error"),
        }
        assert!(matches!(
            Model::read_json("does/not/exist.json"),
            Err(JsonError::UnableToRead(_))
        ));
    }
}
