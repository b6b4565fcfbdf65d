//! neon-protocol: Wire contract for the resource-provider protocol.
//!
//! This crate defines the types exchanged between resource bindings and a
//! provider-protocol runtime:
//! - `Urn`: stable identity of a declared resource
//! - `PropertyValue`: the wire representation of resource fields
//! - `RegisterRequest`/`RegisterResponse`: declare a new pending resource
//! - `ReadRequest`/`ReadResponse`: attach to an existing remote resource
//! - `ProviderRuntime`: the trait a runtime implements to serve both calls
//!
//! The crate contains no transport: runtimes may serve the contract
//! in-process or over any RPC layer that can carry the serde wire model.

pub mod error;
pub mod runtime;
pub mod types;

pub use error::ProtocolError;
pub use runtime::ProviderRuntime;
pub use types::{
  PropertyValue, ReadRequest, ReadResponse, RegisterOptions, RegisterRequest, RegisterResponse, Urn,
};
