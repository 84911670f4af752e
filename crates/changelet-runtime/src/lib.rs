//! Changelet runtime: normalize, validate, convert.
//!
//! - [`normalize`] turns a raw agent proposal into a canonical changeset
//! - [`changelet_policy`] gates it, driven through [`Pipeline`]
//! - [`convert`] projects it onto a nested deployment-values document

pub mod convert;
pub mod normalize;
pub mod pipeline;

pub use convert::{Converter, DeploymentValues, convert};
pub use normalize::{Normalizer, normalize};
pub use pipeline::{Pipeline, PipelineError, PipelineOutcome};

pub use changelet_policy::ChangeSetSchema;
