//! Changelet core types.
//!
//! Shared data model for the normalize / validate / convert pipeline that
//! turns agent change proposals into deployment-values documents.

pub mod catalogue;
pub mod changeset;
pub mod config;
pub mod mapping;
pub mod result;

pub use catalogue::{Catalogue, Service};
pub use changeset::{Action, Change, ChangeConfig, ChangeSet, Metadata, RequestContext, Risk};
pub use config::{
    ActionRule, ChangeletConfig, ConfigError, NormalizerConfig, PolicyTables, read_document,
};
pub use mapping::{MappingTable, ServiceMappings};
pub use result::{ValidationResult, ValidationStatus};
