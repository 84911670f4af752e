//! Dependency gate.
//!
//! Runtime enablement state of dependencies is not observable from here, so
//! every declared dependency of an enabled service escalates to human review.

use changelet_core::{Action, Catalogue, ChangeSet};

use crate::error::ValidationError;
use crate::gate::{Gate, Stage};

pub struct DependencyGate<'a> {
    catalogue: &'a Catalogue,
}

impl<'a> DependencyGate<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        Self { catalogue }
    }
}

impl Gate for DependencyGate<'_> {
    fn stage(&self) -> Stage {
        Stage::Dependency
    }

    fn check(&self, changeset: &ChangeSet) -> Vec<ValidationError> {
        changeset
            .changes
            .iter()
            .filter(|change| change.action == Action::Enable)
            .flat_map(|change| {
                self.catalogue
                    .dependencies_of(&change.service)
                    .iter()
                    .map(|dep| ValidationError::dependency_uncertainty(&change.service, dep))
            })
            .collect()
    }
}
