//! Combination of two kcat databases (SABIO-RK and BRENDA in a standard project)
use indexmap::IndexSet;

use super::database::{KcatDatabase, KcatEntry};

/// A kcat database together with the name recorded in the `SOURCE` field of its entries
#[derive(Clone, Copy, Debug)]
pub struct NamedDatabase<'a> {
    pub name: &'a str,
    pub database: &'a KcatDatabase,
}

impl<'a> NamedDatabase<'a> {
    pub fn new(name: &'a str, database: &'a KcatDatabase) -> Self {
        NamedDatabase { name, database }
    }
}

/// Combine two kcat databases EC number by EC number
///
/// * EC numbers wildcarded in both sources (or wildcarded in one and missing from the other)
///   are dropped.
/// * If only one source has a non wildcarded entry, that entry is taken verbatim and tagged
///   with the source's name.
/// * If both have non wildcarded entries the substrate keys are united. For a substrate found
///   in both, the organism maps are merged with the second source's kcat lists replacing the
///   first's for organisms present in both (the first source's samples for that organism are
///   lost). The entry is tagged `"<second> and <first>"`.
///
/// EC numbers are visited in the order of the second database, followed by those only found
/// in the first.
pub fn combine_kcat_databases(first: NamedDatabase, second: NamedDatabase) -> KcatDatabase {
    let ec_numbers: IndexSet<&String> = second
        .database
        .ec_numbers()
        .chain(first.database.ec_numbers())
        .collect();

    let mut combined = KcatDatabase::new();
    for ec_number in ec_numbers {
        let first_entry = usable_entry(first, ec_number);
        let second_entry = usable_entry(second, ec_number);
        let entry = match (first_entry, second_entry) {
            (None, None) => {
                log::debug!("Dropping {}: no exact entry in {} or {}", ec_number, first.name, second.name);
                continue;
            }
            (Some(entry), None) => tagged(entry, first.name),
            (None, Some(entry)) => tagged(entry, second.name),
            (Some(first_entry), Some(second_entry)) => {
                merge_entries(first_entry, second_entry, first.name, second.name)
            }
        };
        combined.insert(ec_number, entry);
    }
    log::info!(
        "Combined {} ({} EC numbers) and {} ({} EC numbers) into {} EC numbers",
        first.name,
        first.database.len(),
        second.name,
        second.database.len(),
        combined.len()
    );
    combined
}

/// The entry of a source for `ec_number`, unless it is missing or wildcarded
fn usable_entry<'a>(source: NamedDatabase<'a>, ec_number: &str) -> Option<&'a KcatEntry> {
    match source.database.get(ec_number) {
        None => {
            log::warn!("{} is missing from {}", ec_number, source.name);
            None
        }
        Some(entry) if entry.wildcard => None,
        Some(entry) => Some(entry),
    }
}

fn tagged(entry: &KcatEntry, source: &str) -> KcatEntry {
    let mut entry = entry.clone();
    entry.wildcard = false;
    entry.source = Some(source.to_string());
    entry
}

fn merge_entries(first: &KcatEntry, second: &KcatEntry, first_name: &str, second_name: &str) -> KcatEntry {
    let mut substrates = first.substrates.clone();
    for (substrate, organisms) in &second.substrates {
        match substrates.get_mut(substrate) {
            Some(existing) => {
                for (organism, kcats) in organisms {
                    existing.insert(organism.clone(), kcats.clone());
                }
            }
            None => {
                substrates.insert(substrate.clone(), organisms.clone());
            }
        }
    }
    KcatEntry {
        wildcard: false,
        source: Some(format!("{} and {}", second_name, first_name)),
        transfer: second.transfer.clone().or_else(|| first.transfer.clone()),
        substrates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    /// Entry from `(substrate, organism, kcats)` rows
    fn entry(wildcard: bool, rows: Vec<(&str, &str, Vec<f64>)>) -> KcatEntry {
        let mut substrates: IndexMap<String, IndexMap<String, Vec<f64>>> = IndexMap::new();
        for (substrate, organism, kcats) in rows {
            substrates
                .entry(substrate.to_string())
                .or_default()
                .insert(organism.to_string(), kcats);
        }
        KcatEntry {
            wildcard,
            source: None,
            transfer: None,
            substrates,
        }
    }

    fn databases() -> (KcatDatabase, KcatDatabase) {
        let mut sabio = KcatDatabase::new();
        let mut brenda = KcatDatabase::new();
        // Only in BRENDA
        brenda.insert("1.1.1.1", entry(false, vec![("etoh", "Escherichia coli", vec![10.])]));
        // Wildcarded in both
        sabio.insert("1.1.1.2", entry(true, vec![("ALL", "Escherichia coli", vec![1.])]));
        brenda.insert("1.1.1.2", entry(true, vec![("ALL", "Escherichia coli", vec![2.])]));
        // Wildcarded in BRENDA, exact in SABIO-RK
        sabio.insert("2.7.1.11", entry(false, vec![("f6p", "Homo sapiens", vec![50.])]));
        brenda.insert("2.7.1.11", entry(true, vec![("f6p", "Escherichia coli", vec![5.])]));
        // Exact in both
        sabio.insert(
            "5.3.1.9",
            entry(
                false,
                vec![
                    ("g6p", "Escherichia coli", vec![20.]),
                    ("g6p", "Homo sapiens", vec![30.]),
                    ("f6p", "Escherichia coli", vec![25.]),
                ],
            ),
        );
        brenda.insert(
            "5.3.1.9",
            entry(
                false,
                vec![
                    ("g6p", "Escherichia coli", vec![40., 41.]),
                    ("ALL", "Bacillus subtilis", vec![7.]),
                ],
            ),
        );
        (sabio, brenda)
    }

    #[test]
    fn combine() {
        let (sabio, brenda) = databases();
        let combined = combine_kcat_databases(
            NamedDatabase::new("SABIO-RK", &sabio),
            NamedDatabase::new("BRENDA", &brenda),
        );
        assert_eq!(combined.len(), 3);
        assert!(!combined.contains("1.1.1.2"));

        let only_brenda = combined.get("1.1.1.1").unwrap();
        let mut expected = brenda.get("1.1.1.1").unwrap().clone();
        expected.source = Some("BRENDA".to_string());
        assert_eq!(only_brenda, &expected);
        assert!(!only_brenda.wildcard);

        let only_sabio = combined.get("2.7.1.11").unwrap();
        assert_eq!(only_sabio.source.as_deref(), Some("SABIO-RK"));
        assert_eq!(only_sabio.substrates["f6p"].len(), 1);
        assert!(only_sabio.substrates["f6p"].contains_key("Homo sapiens"));

        let both = combined.get("5.3.1.9").unwrap();
        assert_eq!(both.source.as_deref(), Some("BRENDA and SABIO-RK"));
        let substrates: Vec<&String> = both.substrates.keys().collect();
        assert_eq!(substrates, vec!["g6p", "f6p", "ALL"]);
        // Shallow merge, BRENDA's list replaces SABIO-RK's for the same organism
        assert_eq!(both.substrates["g6p"]["Escherichia coli"], vec![40., 41.]);
        assert_eq!(both.substrates["g6p"]["Homo sapiens"], vec![30.]);
    }

    #[test]
    fn ec_number_order() {
        let (sabio, brenda) = databases();
        let combined = combine_kcat_databases(
            NamedDatabase::new("SABIO-RK", &sabio),
            NamedDatabase::new("BRENDA", &brenda),
        );
        let order: Vec<&String> = combined.ec_numbers().collect();
        assert_eq!(order, vec!["1.1.1.1", "2.7.1.11", "5.3.1.9"]);
    }
}
