//! Errors surfaced by provider-protocol runtimes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures a runtime can report for a register or read call.
///
/// The variants carry only strings so the error can cross a wire boundary
/// unchanged and be cloned into every pending field of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ProtocolError {
  /// No remote entity exists for the requested identity.
  #[error("resource not found: {id}")]
  NotFound { id: String },

  /// A remote or transport failure, propagated verbatim.
  #[error("remote failure: {message}")]
  Remote { message: String },

  /// The runtime could not make sense of the request payload. Only
  /// out-of-process runtimes construct this; an in-process runtime receives
  /// requests as typed values.
  #[error("malformed wire payload: {message}")]
  Wire { message: String },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_includes_identity() {
    let err = ProtocolError::NotFound {
      id: "proud-sun-12345678".to_string(),
    };
    assert_eq!(err.to_string(), "resource not found: proud-sun-12345678");
  }

  #[test]
  fn serialization_roundtrip() {
    let err = ProtocolError::Remote {
      message: "api quota exceeded".to_string(),
    };
    let json = serde_json::to_string(&err).unwrap();
    let back: ProtocolError = serde_json::from_str(&json).unwrap();
    assert_eq!(err, back);
  }

  #[test]
  fn wire_failures_cross_the_boundary_intact() {
    let err = ProtocolError::Wire {
      message: "truncated frame".to_string(),
    };
    assert_eq!(err.to_string(), "malformed wire payload: truncated frame");

    let json = serde_json::to_string(&err).unwrap();
    let back: ProtocolError = serde_json::from_str(&json).unwrap();
    assert_eq!(err, back);
  }
}
