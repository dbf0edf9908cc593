//! Staged model edits
//!
//! Passes which rewrite many reactions iterate over a snapshot of the model and collect their
//! changes in a [`ModelEdit`], which is merged back in one step once the iteration is done.
use indexmap::IndexSet;

use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::Reaction;

/// Additions and removals waiting to be applied to a [`Model`]
#[derive(Debug, Default, Clone)]
pub struct ModelEdit {
    metabolites: Vec<Metabolite>,
    removed_reactions: IndexSet<String>,
    reactions: Vec<Reaction>,
}

impl ModelEdit {
    pub fn new() -> Self {
        ModelEdit::default()
    }

    /// Stage a new metabolite
    pub fn add_metabolite(&mut self, metabolite: Metabolite) {
        self.metabolites.push(metabolite);
    }

    /// Stage a new reaction (it replaces any existing reaction with the same id)
    pub fn add_reaction(&mut self, reaction: Reaction) {
        self.reactions.push(reaction);
    }

    /// Stage the removal of a reaction
    pub fn remove_reaction(&mut self, id: &str) {
        self.removed_reactions.insert(id.to_string());
    }

    /// Whether a metabolite with this id has already been staged
    pub fn has_metabolite(&self, id: &str) -> bool {
        self.metabolites.iter().any(|m| m.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.metabolites.is_empty() && self.removed_reactions.is_empty() && self.reactions.is_empty()
    }

    /// Merge the staged changes into `model`
    ///
    /// Metabolites are added first, then removals are carried out, then reactions are added,
    /// so a reaction may be removed and re-added under the same id within one edit.
    pub fn apply(self, model: &mut Model) {
        for metabolite in self.metabolites {
            model.add_metabolite(metabolite);
        }
        for id in &self.removed_reactions {
            model.remove_reaction(id);
        }
        for reaction in self.reactions {
            model.add_reaction(reaction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn staged_changes_are_applied_in_order() {
        let mut model = Model::new_empty();
        model.add_reaction(Reaction::new("R1", IndexMap::new(), -10., 10.));
        model.add_reaction(Reaction::new("R2", IndexMap::new(), 0., 10.));

        let mut edit = ModelEdit::new();
        edit.add_metabolite(Metabolite::new("prot_pool", "prot_pool", "sMOMENT"));
        edit.remove_reaction("R1");
        edit.add_reaction(Reaction::new("R1_forward", IndexMap::new(), 0., 10.));
        edit.remove_reaction("R2");
        edit.add_reaction(Reaction::new("R2", IndexMap::new(), 0., 5.));
        assert!(edit.has_metabolite("prot_pool"));
        assert!(!edit.is_empty());

        // Nothing changes until the edit is applied
        assert_eq!(model.reactions.len(), 2);
        edit.apply(&mut model);

        let ids: Vec<&String> = model.reactions.keys().collect();
        assert_eq!(ids, vec!["R1_forward", "R2"]);
        assert_eq!(model.reactions["R2"].upper_bound, 5.);
        assert!(model.metabolites.contains_key("prot_pool"));
    }
}
