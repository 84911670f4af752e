//! Role permission gate.
//!
//! Checks every change action against the permitted verbs of the caller's
//! role. The role is taken as already resolved from the request context.

use changelet_core::{ChangeSet, PolicyTables};

use crate::error::ValidationError;
use crate::gate::{Gate, Stage};

pub struct PermissionGate<'a> {
    policy: &'a PolicyTables,
}

impl<'a> PermissionGate<'a> {
    pub fn new(policy: &'a PolicyTables) -> Self {
        Self { policy }
    }

    /// Role the gate evaluates for `changeset`.
    pub fn effective_role<'c>(&'c self, changeset: &'c ChangeSet) -> &'c str {
        changeset
            .request_context
            .role_or(&self.policy.default_role)
    }
}

impl Gate for PermissionGate<'_> {
    fn stage(&self) -> Stage {
        Stage::Permission
    }

    fn check(&self, changeset: &ChangeSet) -> Vec<ValidationError> {
        let role = self.effective_role(changeset);
        if !self.policy.role_permissions.contains_key(role) {
            tracing::debug!(role = %role, "Role has no entry in the permission matrix");
        }

        changeset
            .changes
            .iter()
            .filter(|change| !self.policy.permits(role, change.action))
            .map(|change| ValidationError::permission_denied(role, change.action, &change.service))
            .collect()
    }
}
