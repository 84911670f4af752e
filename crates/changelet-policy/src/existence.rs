//! Catalogue existence gate.

use changelet_core::{Catalogue, ChangeSet};

use crate::error::ValidationError;
use crate::gate::{Gate, Stage};

/// Every change must target a service known to the catalogue (by id or name).
pub struct ExistenceGate<'a> {
    catalogue: &'a Catalogue,
}

impl<'a> ExistenceGate<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        Self { catalogue }
    }
}

impl Gate for ExistenceGate<'_> {
    fn stage(&self) -> Stage {
        Stage::Existence
    }

    fn check(&self, changeset: &ChangeSet) -> Vec<ValidationError> {
        changeset
            .changes
            .iter()
            .filter(|change| !self.catalogue.contains(&change.service))
            .map(|change| ValidationError::unknown_service(&change.service))
            .collect()
    }
}
