//! Changelet Policy Enforcement
//!
//! Runs canonical changesets through the gate pipeline: schema, catalogue
//! existence, role permission (hard gates), then dependency and
//! risk/confidence (soft gates). The outcome is always a
//! [`ValidationResult`](changelet_core::ValidationResult); no gate raises.

pub mod dependency;
pub mod error;
pub mod existence;
pub mod gate;
pub mod risk;
pub mod role;
pub mod schema;
pub mod validator;

pub use error::{Severity, ValidationError, ValidationErrorKind};
pub use gate::{Gate, Stage};
pub use schema::{ChangeSetSchema, EMBEDDED_CHANGESET_SCHEMA, SchemaError};
pub use validator::{ChangeSetValidator, validate};
