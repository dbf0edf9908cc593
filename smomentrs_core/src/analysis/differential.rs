//! Differential reactions: reactions whose enzyme constraint limits the target flux
use indexmap::{IndexMap, IndexSet};
use log::info;

use crate::analysis::flux_control::FluxControlTable;
use crate::analysis::scenario::Scenarios;

/// Relative change a reaction's flux control must reach to count as differential
pub const DEFAULT_THRESHOLD: f64 = 0.001;

impl FluxControlTable {
    /// Reactions whose flux control is at least `1 + threshold`
    pub fn differential_reactions(&self, threshold: f64) -> IndexSet<String> {
        self.entries()
            .iter()
            .filter(|entry| entry.relative_change >= 1. + threshold)
            .map(|entry| entry.reaction.clone())
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DifferentialReactions {
    /// Differential reactions of every (merged) scenario
    pub by_scenario: IndexMap<String, IndexSet<String>>,
    /// Reactions differential in exactly one (merged) scenario
    pub unique: IndexMap<String, IndexSet<String>>,
    /// Reactions differential in all (merged) scenarios
    pub common: IndexSet<String>,
}

/// Classify the differential reactions of several scenarios
///
/// Scenarios with a `substitution_name` are merged into the group of that name before the
/// comparison, the union of their differential reactions is used for the group.
pub fn get_differential_reactions(
    tables: &IndexMap<String, FluxControlTable>,
    scenarios: &Scenarios,
    threshold: f64,
) -> DifferentialReactions {
    let mut by_scenario: IndexMap<String, IndexSet<String>> = tables
        .iter()
        .map(|(name, table)| (name.clone(), table.differential_reactions(threshold)))
        .collect();

    for name in tables.keys() {
        let Some(substitution) = scenarios
            .get(name)
            .and_then(|scenario| scenario.substitution_name.as_ref())
        else {
            continue;
        };
        if substitution == name {
            continue;
        }
        let Some(reactions) = by_scenario.shift_remove(name) else {
            continue;
        };
        by_scenario
            .entry(substitution.clone())
            .or_default()
            .extend(reactions);
    }

    let mut unique = IndexMap::with_capacity(by_scenario.len());
    for (name, reactions) in &by_scenario {
        let unique_reactions: IndexSet<String> = reactions
            .iter()
            .filter(|reaction| {
                by_scenario
                    .iter()
                    .filter(|(other, _)| *other != name)
                    .all(|(_, others)| !others.contains(*reaction))
            })
            .cloned()
            .collect();
        info!("Unique differential reactions of {name}: {unique_reactions:?}");
        unique.insert(name.clone(), unique_reactions);
    }

    let mut groups = by_scenario.values();
    let common: IndexSet<String> = match groups.next() {
        Some(first) => first
            .iter()
            .filter(|reaction| groups.clone().all(|group| group.contains(*reaction)))
            .cloned()
            .collect(),
        None => IndexSet::new(),
    };
    info!("Differential reactions of all scenarios: {common:?}");

    DifferentialReactions {
        by_scenario,
        unique,
        common,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::flux_control::FluxControlEntry;
    use crate::analysis::scenario::{Scenario, ScenarioTarget};

    fn table(changes: &[(&str, f64)]) -> FluxControlTable {
        FluxControlTable::new(
            changes
                .iter()
                .map(|(reaction, relative_change)| FluxControlEntry {
                    reaction: reaction.to_string(),
                    name: String::new(),
                    relative_change: *relative_change,
                })
                .collect(),
        )
    }

    fn scenario(substitution_name: Option<&str>) -> Scenario {
        Scenario {
            setup: IndexMap::new(),
            target: ScenarioTarget {
                reaction: "BIOMASS".to_string(),
            },
            objective: None,
            substitution_name: substitution_name.map(str::to_string),
        }
    }

    #[test]
    fn threshold() {
        let table = table(&[("R1", 1.0015), ("R2", 1.0005), ("R3", 0.9)]);
        let differential = table.differential_reactions(DEFAULT_THRESHOLD);
        assert!(differential.contains("R1"));
        assert!(!differential.contains("R2"));
        assert!(!differential.contains("R3"));
        // The threshold itself counts as differential
        assert!(table.differential_reactions(0.0005).contains("R2"));
    }

    #[test]
    fn unique_and_common() {
        let mut tables = IndexMap::new();
        tables.insert("glucose".to_string(), table(&[("R1", 1.1), ("R2", 1.1), ("R3", 1.)]));
        tables.insert("acetate".to_string(), table(&[("R1", 1.1), ("R3", 1.1)]));
        let mut scenarios = Scenarios::new();
        scenarios.insert("glucose".to_string(), scenario(None));
        scenarios.insert("acetate".to_string(), scenario(None));

        let result = get_differential_reactions(&tables, &scenarios, DEFAULT_THRESHOLD);
        assert_eq!(result.unique["glucose"], IndexSet::from(["R2".to_string()]));
        assert_eq!(result.unique["acetate"], IndexSet::from(["R3".to_string()]));
        assert_eq!(result.common, IndexSet::from(["R1".to_string()]));
    }

    #[test]
    fn substitutions_are_merged() {
        let mut tables = IndexMap::new();
        tables.insert("glucose".to_string(), table(&[("R1", 1.1), ("R2", 1.1)]));
        tables.insert("acetate".to_string(), table(&[("R1", 1.1), ("R3", 1.1)]));
        tables.insert("succinate".to_string(), table(&[("R1", 1.1), ("R4", 1.1)]));
        let mut scenarios = Scenarios::new();
        scenarios.insert("glucose".to_string(), scenario(None));
        scenarios.insert("acetate".to_string(), scenario(Some("organic_acids")));
        scenarios.insert("succinate".to_string(), scenario(Some("organic_acids")));

        let result = get_differential_reactions(&tables, &scenarios, DEFAULT_THRESHOLD);
        let names: Vec<&String> = result.by_scenario.keys().collect();
        assert_eq!(names, vec!["glucose", "organic_acids"]);
        assert_eq!(
            result.by_scenario["organic_acids"],
            IndexSet::from(["R1".to_string(), "R3".to_string(), "R4".to_string()])
        );
        assert_eq!(
            result.unique["organic_acids"],
            IndexSet::from(["R3".to_string(), "R4".to_string()])
        );
        assert_eq!(result.common, IndexSet::from(["R1".to_string()]));
    }

    #[test]
    fn no_scenarios() {
        let result = get_differential_reactions(&IndexMap::new(), &Scenarios::new(), DEFAULT_THRESHOLD);
        assert!(result.common.is_empty());
        assert!(result.unique.is_empty());
    }
}
