//! svcgen Core Library
//!
//! This library generates the HTTP surface of a service from a resolved
//! service model: shape types, server handler stubs, client bindings and
//! their mocks. Output is deterministic, and structurally identical shapes
//! are defined exactly once per run.

pub mod artifact;
pub mod config;
pub mod delegates;
pub mod driver;
pub mod error;
pub mod generate;
pub mod ledger;
pub mod model;
pub mod persist;
pub mod plan;
pub mod shape;
pub mod templates;
pub mod utils;

pub use crate::{
    artifact::{Artifact, ArtifactKind},
    config::Config,
    delegates::{Delegate, Delegates},
    driver::Driver,
    error::{Error, Result},
    generate::{generate, generate_with},
    model::ServiceModel,
    persist::{ArtifactWriter, FsWriter, MemoryWriter},
    templates::TemplateManager,
};
