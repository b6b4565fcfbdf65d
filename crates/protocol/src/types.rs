//! Wire types for the provider protocol.
//!
//! Every resource field travels as a [`PropertyValue`]. A binding declares a
//! new resource with a [`RegisterRequest`] and attaches to an existing remote
//! entity with a [`ReadRequest`]; the runtime answers with the resolved field
//! values. All types serialize to JSON so the contract can be carried over
//! any transport.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a declared resource within one declaration graph.
///
/// Formatted as `urn:decl::<kind>::<name>`. The URN is assigned when the
/// resource is declared and never changes, which makes it usable as a
/// dependency link target before the remote identity exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Urn(String);

impl Urn {
  /// Build the URN for a resource of `kind` declared under `name`.
  pub fn new(kind: &str, name: &str) -> Self {
    Self(format!("urn:decl::{kind}::{name}"))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Urn {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A resource property value on the wire.
///
/// The Neon schema is all strings today; the remaining variants keep the
/// contract usable for providers with richer schemas. `Null` marks an
/// optional field that was resolved as absent, which is distinct from the
/// field being missing from a response altogether.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
  /// An optional field resolved as absent.
  Null,
  /// A string value.
  String(String),
  /// A boolean value.
  Bool(bool),
  /// A numeric value.
  Number(f64),
  /// An ordered sequence of values.
  Array(Vec<PropertyValue>),
  /// A map with string keys.
  Object(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
  /// Name of the variant, for wrong-type diagnostics.
  pub fn type_name(&self) -> &'static str {
    match self {
      PropertyValue::Null => "null",
      PropertyValue::String(_) => "string",
      PropertyValue::Bool(_) => "bool",
      PropertyValue::Number(_) => "number",
      PropertyValue::Array(_) => "array",
      PropertyValue::Object(_) => "object",
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      PropertyValue::String(s) => Some(s),
      _ => None,
    }
  }
}

impl From<&str> for PropertyValue {
  fn from(value: &str) -> Self {
    PropertyValue::String(value.to_string())
  }
}

impl From<String> for PropertyValue {
  fn from(value: String) -> Self {
    PropertyValue::String(value)
  }
}

/// Cross-cutting registration options, passed through to the runtime verbatim.
///
/// The binding layer validates these before registration; the runtime uses
/// them for ordering, provider selection, and deletion protection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterOptions {
  /// Parent resource in the declaration graph.
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub parent: Option<Urn>,

  /// Explicit dependencies beyond those implied by field references.
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub depends_on: Vec<Urn>,

  /// Provider resource to route this resource's lifecycle calls through.
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub provider: Option<Urn>,

  /// When set, the runtime must refuse to delete the remote entity.
  #[serde(skip_serializing_if = "std::ops::Not::not", default)]
  pub protect: bool,
}

/// Declare a new pending resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
  /// Resource kind token, e.g. `neon:resource:Project`.
  pub kind: String,
  /// Local name, unique within the declaration graph.
  pub name: String,
  /// Caller-supplied input fields. Absent optional inputs are omitted,
  /// never defaulted by the binding.
  pub inputs: BTreeMap<String, PropertyValue>,
  /// Cross-cutting options, opaque to the binding.
  pub options: RegisterOptions,
}

/// Runtime answer to a [`RegisterRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
  /// Provider-assigned identity of the created entity.
  pub id: String,
  /// Resolved output fields.
  pub outputs: BTreeMap<String, PropertyValue>,
}

/// Attach to an existing remote entity by its provider-assigned identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadRequest {
  pub kind: String,
  pub id: String,
}

/// Runtime answer to a [`ReadRequest`].
///
/// Inputs and outputs are reported separately: on a read, the inputs are
/// recovered from the remote entity's current state, not from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadResponse {
  pub inputs: BTreeMap<String, PropertyValue>,
  pub outputs: BTreeMap<String, PropertyValue>,
}
