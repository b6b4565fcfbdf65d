//! neon-sdk: Typed resource bindings for the Neon provider protocol.
//!
//! This crate implements the resource binding pattern over
//! [`neon_protocol`]:
//! - `Output`: single-assignment deferred values for resource fields
//! - `DeclarationGraph`: the explicit context resources are declared into
//! - `ResourceOptions`: cross-cutting options passed through to the runtime
//! - `Project` / `Provider`: the typed Neon bindings
//! - `testutil`: an in-memory runtime for exercising bindings in tests
//!
//! Bindings perform no remote I/O themselves: declaring a resource returns
//! immediately with every output field pending, and the runtime resolves the
//! fields out of band.

pub mod error;
pub mod graph;
pub mod options;
pub mod output;
pub mod project;
pub mod provider;
pub mod resource;
pub mod testutil;

pub use error::BindingError;
pub use graph::DeclarationGraph;
pub use options::ResourceOptions;
pub use output::Output;
pub use project::{Project, ProjectArgs};
pub use provider::{Provider, ProviderArgs};
pub use resource::ResourceFields;
