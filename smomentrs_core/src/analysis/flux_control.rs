//! Flux control of the enzyme constraints
//!
//! The flux control of a reaction is the relative change of a target flux when the reaction's
//! protein pool cost is removed. A value of 1 means the constraint does not limit the target.
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info};

use crate::analysis::scenario::{Scenario, Scenarios};
use crate::analysis::AnalysisError;
use crate::enhance::{POOL_REACTION, PROT_POOL};
use crate::metabolic_model::context::ModelContext;
use crate::metabolic_model::model::{Model, ModelError};
use crate::optimize::solvers::FluxSolver;
use crate::optimize::FluxSolution;

const HEADER: &str = "Reaction ID\tReaction name\tRelative objective flux change";

#[derive(Clone, Debug, PartialEq)]
pub struct FluxControlEntry {
    pub reaction: String,
    pub name: String,
    /// Target flux without the reaction's pool cost divided by the base target flux
    pub relative_change: f64,
}

/// Flux control of every pool constrained reaction under one scenario
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FluxControlTable {
    entries: Vec<FluxControlEntry>,
}

impl FluxControlTable {
    pub fn new(entries: Vec<FluxControlEntry>) -> Self {
        FluxControlTable { entries }
    }

    pub fn entries(&self) -> &[FluxControlEntry] {
        &self.entries
    }

    pub fn get(&self, reaction: &str) -> Option<&FluxControlEntry> {
        self.entries.iter().find(|entry| entry.reaction == reaction)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tab separated representation, one header line followed by one line per reaction
    pub fn to_tsv(&self) -> String {
        let mut output = String::from(HEADER);
        output.push('\n');
        for entry in &self.entries {
            // Writing to a String can't fail
            let _ = writeln!(
                output,
                "{}\t{}\t{}",
                entry.reaction, entry.name, entry.relative_change
            );
        }
        output
    }

    /// Parse the tab separated representation, `path` is only used in error messages
    pub fn from_tsv(data: &str, path: &str) -> Result<Self, AnalysisError> {
        let mut entries = Vec::new();
        // The first line is the header
        for (index, line) in data.lines().enumerate().skip(1) {
            if line.is_empty() {
                continue;
            }
            let malformed = |reason: String| AnalysisError::MalformedFluxControl {
                path: path.to_string(),
                line: index + 1,
                reason,
            };
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 3 {
                return Err(malformed(format!(
                    "expected 3 tab separated fields, found {}",
                    fields.len()
                )));
            }
            let relative_change = fields[2]
                .trim()
                .parse::<f64>()
                .map_err(|err| malformed(format!("invalid change '{}': {err}", fields[2])))?;
            entries.push(FluxControlEntry {
                reaction: fields[0].to_string(),
                name: fields[1].to_string(),
                relative_change,
            });
        }
        Ok(FluxControlTable { entries })
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), AnalysisError> {
        let path = path.as_ref();
        fs::write(path, self.to_tsv()).map_err(|source| AnalysisError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| AnalysisError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_tsv(&data, &path.display().to_string())
    }
}

/// Name of the flux control file of a scenario
pub fn flux_control_file_name(project: &str, scenario: &str) -> String {
    format!("{project}_reaction_flux_control_{scenario}.txt")
}

/// Flux of the target reaction in an optimal solution
fn target_flux(solution: &FluxSolution, target: &str) -> Result<f64, AnalysisError> {
    solution.optimal_value()?;
    solution
        .flux(target)
        .ok_or_else(|| ModelError::ReactionNotFound(target.to_string()).into())
}

/// Flux control of every reaction carrying a protein pool cost, measured on the target reaction
pub fn reaction_flux_control<S: FluxSolver + ?Sized>(
    ctx: &mut ModelContext<'_>,
    solver: &S,
    target: &str,
) -> Result<FluxControlTable, AnalysisError> {
    let base = target_flux(&solver.optimize(ctx)?, target)?;
    if base == 0. {
        return Err(AnalysisError::ZeroBaseFlux {
            reaction: target.to_string(),
        });
    }

    let constrained: Vec<(String, String)> = ctx
        .reactions
        .values()
        .filter(|reaction| reaction.id != POOL_REACTION)
        .filter(|reaction| reaction.metabolites.contains_key(PROT_POOL))
        .map(|reaction| {
            (
                reaction.id.clone(),
                reaction.name.clone().unwrap_or_default(),
            )
        })
        .collect();

    let mut entries = Vec::with_capacity(constrained.len());
    for (reaction, name) in constrained {
        let mut relaxed = ctx.context();
        relaxed.set_coefficient(&reaction, PROT_POOL, 0.)?;
        let flux = target_flux(&solver.optimize(&relaxed)?, target)?;
        let relative_change = flux / base;
        debug!("Removing the pool cost of {reaction} changes {target} by {relative_change}");
        entries.push(FluxControlEntry {
            reaction,
            name,
            relative_change,
        });
    }
    Ok(FluxControlTable { entries })
}

/// Flux control under a scenario, the model is restored afterwards
pub fn flux_control_of_scenario<S: FluxSolver + ?Sized>(
    model: &mut Model,
    solver: &S,
    scenario: &Scenario,
) -> Result<FluxControlTable, AnalysisError> {
    let mut ctx = model.context();
    scenario.apply(&mut ctx)?;
    reaction_flux_control(&mut ctx, solver, &scenario.target.reaction)
}

/// Flux control tables of all scenarios, keyed by scenario name
pub fn flux_control_by_scenario<S: FluxSolver + ?Sized>(
    model: &mut Model,
    solver: &S,
    scenarios: &Scenarios,
) -> Result<IndexMap<String, FluxControlTable>, AnalysisError> {
    let mut tables = IndexMap::with_capacity(scenarios.len());
    for (name, scenario) in scenarios {
        info!("Calculating the flux control of scenario {name}");
        let table = flux_control_of_scenario(model, solver, scenario)?;
        tables.insert(name.clone(), table);
    }
    Ok(tables)
}

/// Write one flux control file per scenario into `folder`, returning the written paths
pub fn write_flux_control_files<P: AsRef<Path>>(
    folder: P,
    project: &str,
    tables: &IndexMap<String, FluxControlTable>,
) -> Result<Vec<PathBuf>, AnalysisError> {
    let mut paths = Vec::with_capacity(tables.len());
    for (scenario, table) in tables {
        let path = folder.as_ref().join(flux_control_file_name(project, scenario));
        table.write(&path)?;
        paths.push(path);
    }
    Ok(paths)
}

/// Read the flux control files of the given scenarios from `folder`
pub fn read_flux_control_files<P: AsRef<Path>>(
    folder: P,
    project: &str,
    scenarios: &[String],
) -> Result<IndexMap<String, FluxControlTable>, AnalysisError> {
    scenarios
        .iter()
        .map(|scenario| {
            let path = folder.as_ref().join(flux_control_file_name(project, scenario));
            Ok((scenario.clone(), FluxControlTable::read(path)?))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::analysis::scenario::{BoundOverride, ScenarioTarget};
    use crate::metabolic_model::reaction::Reaction;
    use crate::optimize::{FluxRange, OptimizationStatus, SolveError};

    /// Solver returning a fixed target flux, replaced by the scripted value of the first listed
    /// reaction that has lost its pool cost
    pub(crate) struct ScriptedSolver {
        pub target: String,
        pub base: f64,
        pub relaxed: IndexMap<String, f64>,
    }

    impl FluxSolver for ScriptedSolver {
        fn optimize(&self, model: &Model) -> Result<FluxSolution, SolveError> {
            let value = self
                .relaxed
                .iter()
                .find(|(reaction, _)| {
                    !model.reactions[reaction.as_str()]
                        .metabolites
                        .contains_key(PROT_POOL)
                })
                .map(|(_, value)| *value)
                .unwrap_or(self.base);
            let mut fluxes = IndexMap::new();
            fluxes.insert(self.target.clone(), value);
            Ok(FluxSolution {
                status: OptimizationStatus::Optimal,
                objective_value: Some(value),
                fluxes: Some(fluxes),
            })
        }

        fn fva(
            &self,
            model: &Model,
            reactions: &[String],
            _fraction_of_optimum: f64,
        ) -> Result<IndexMap<String, FluxRange>, SolveError> {
            Ok(reactions
                .iter()
                .map(|id| {
                    let reaction = &model.reactions[id.as_str()];
                    (
                        id.clone(),
                        FluxRange {
                            minimum: reaction.lower_bound,
                            maximum: reaction.upper_bound,
                        },
                    )
                })
                .collect())
        }
    }

    pub(crate) fn pool_model() -> Model {
        let mut model = Model::new_empty();
        for (id, cost) in [("R1", -0.1), ("R2", -0.2), ("R3", -0.3)] {
            let mut metabolites = IndexMap::new();
            metabolites.insert("a".to_string(), -1.);
            metabolites.insert(PROT_POOL.to_string(), cost);
            let mut reaction = Reaction::new(id, metabolites, 0., 1000.);
            reaction.name = Some(format!("reaction {id}"));
            model.add_reaction(reaction);
        }
        let mut pool = IndexMap::new();
        pool.insert(PROT_POOL.to_string(), 1.);
        model.add_reaction(Reaction::new(POOL_REACTION, pool, 0., 0.1));
        model.add_reaction(Reaction::new("EX_a", IndexMap::new(), -10., 0.));
        model.add_reaction(Reaction::new("BIOMASS", IndexMap::new(), 0., 1000.));
        model.set_objective("BIOMASS").unwrap();
        model
    }

    fn solver() -> ScriptedSolver {
        let mut relaxed = IndexMap::new();
        relaxed.insert("R1".to_string(), 1.0015);
        relaxed.insert("R2".to_string(), 1.0005);
        ScriptedSolver {
            target: "BIOMASS".to_string(),
            base: 1.,
            relaxed,
        }
    }

    #[test]
    fn flux_control_of_pool_reactions() {
        let mut model = pool_model();
        let original = model.clone();
        let table = {
            let mut ctx = model.context();
            reaction_flux_control(&mut ctx, &solver(), "BIOMASS").unwrap()
        };
        assert_eq!(model, original);

        // The pool reaction itself and reactions without pool cost are left out
        let ids: Vec<&str> = table.entries().iter().map(|e| e.reaction.as_str()).collect();
        assert_eq!(ids, vec!["R1", "R2", "R3"]);
        assert_relative_eq!(table.get("R1").unwrap().relative_change, 1.0015);
        assert_relative_eq!(table.get("R2").unwrap().relative_change, 1.0005);
        assert_relative_eq!(table.get("R3").unwrap().relative_change, 1.);
        assert_eq!(table.get("R1").unwrap().name, "reaction R1");
    }

    #[test]
    fn zero_base_flux() {
        let mut model = pool_model();
        let mut ctx = model.context();
        let solver = ScriptedSolver {
            target: "BIOMASS".to_string(),
            base: 0.,
            relaxed: IndexMap::new(),
        };
        match reaction_flux_control(&mut ctx, &solver, "BIOMASS") {
            Err(AnalysisError::ZeroBaseFlux { reaction }) => assert_eq!(reaction, "BIOMASS"),
            other => panic!("Expected zero base flux, got {other:?}"),
        }
    }

    #[test]
    fn scenarios_are_reverted() {
        let mut model = pool_model();
        let original = model.clone();
        let mut setup = IndexMap::new();
        setup.insert(
            "EX_a".to_string(),
            BoundOverride {
                lower_bound: Some(-5.),
                upper_bound: None,
            },
        );
        let mut scenarios = Scenarios::new();
        scenarios.insert(
            "limited".to_string(),
            Scenario {
                setup,
                target: ScenarioTarget {
                    reaction: "BIOMASS".to_string(),
                },
                objective: None,
                substitution_name: None,
            },
        );
        let tables = flux_control_by_scenario(&mut model, &solver(), &scenarios).unwrap();
        assert_eq!(model, original);
        assert_eq!(tables["limited"].len(), 3);
    }

    #[test]
    fn write_and_read_files() {
        let mut model = pool_model();
        let table = {
            let mut ctx = model.context();
            reaction_flux_control(&mut ctx, &solver(), "BIOMASS").unwrap()
        };
        let mut tables = IndexMap::new();
        tables.insert("glucose".to_string(), table.clone());

        let dir = tempfile::tempdir().unwrap();
        let paths = write_flux_control_files(dir.path(), "toy", &tables).unwrap();
        assert_eq!(
            paths[0],
            dir.path().join("toy_reaction_flux_control_glucose.txt")
        );
        let contents = fs::read_to_string(&paths[0]).unwrap();
        assert!(contents.starts_with(HEADER));
        assert!(contents.contains("R1\treaction R1\t1.0015\n"));

        let read = read_flux_control_files(dir.path(), "toy", &["glucose".to_string()]).unwrap();
        assert_eq!(read["glucose"], table);
    }

    #[test]
    fn malformed_file() {
        let data = format!("{HEADER}\nR1\tname\n");
        match FluxControlTable::from_tsv(&data, "test.txt") {
            Err(AnalysisError::MalformedFluxControl { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected a malformed file, got {other:?}"),
        }
        let data = format!("{HEADER}\nR1\tname\tnot a number\n");
        assert!(FluxControlTable::from_tsv(&data, "test.txt").is_err());
    }
}
