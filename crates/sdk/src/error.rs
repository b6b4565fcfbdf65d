//! Error types for the binding layer.

use neon_protocol::ProtocolError;
use thiserror::Error;

/// Errors that can occur while declaring or reading a resource.
///
/// Remote failures pass through as [`BindingError::Protocol`] without
/// translation; the binding performs no recovery or retries. The type is
/// `Clone` because a single failure is fanned out to every pending field of
/// the affected resource.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
  /// The resource options are malformed (e.g. a link to an undeclared
  /// resource, or a missing required property).
  #[error("invalid resource configuration: {0}")]
  Configuration(String),

  /// A second resource was declared under an already used local name.
  #[error("duplicate resource name: {name}")]
  DuplicateName { name: String },

  /// A field or option carried a value of the wrong type.
  #[error("wrong type for `{field}`: expected {expected}, got {actual}")]
  WrongType {
    field: String,
    expected: String,
    actual: String,
  },

  /// The runtime answered without resolving a declared output field.
  #[error("field `{field}` was not resolved by the runtime")]
  Unresolved { field: String },

  /// The runtime dropped the resource before resolving its fields.
  #[error("resolution canceled by the runtime")]
  Canceled,

  /// A runtime failure, propagated unchanged.
  #[error(transparent)]
  Protocol(#[from] ProtocolError),
}

impl BindingError {
  /// True when the error is a failed lookup of an existing remote entity.
  pub fn is_not_found(&self) -> bool {
    matches!(self, BindingError::Protocol(ProtocolError::NotFound { .. }))
  }
}
