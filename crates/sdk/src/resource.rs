//! Generic registration machinery shared by all resource bindings.
//!
//! A binding declares its schema as two field lists, inputs and outputs,
//! and delegates to [`register`] (construct a new resource) or [`attach`]
//! (adopt an existing remote entity). Both return immediately with every
//! field pending; a spawned task performs the runtime call and resolves the
//! cells exactly once.
//!
//! Resolution rules for a register call:
//! - a field present in the response outputs takes that value;
//! - an input field absent from the response echoes the request input, or
//!   `Null` when the input was omitted by the caller;
//! - a declared output absent from the response is rejected as unresolved.
//!
//! On an attach, the caller supplies no inputs: every field resolves from
//! the remote entity's current state.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::{debug, warn};

use neon_protocol::{PropertyValue, ReadRequest, RegisterRequest, Urn};

use crate::error::BindingError;
use crate::graph::DeclarationGraph;
use crate::options::ResourceOptions;
use crate::output::{Output, OutputCell};

/// The pending field map of a declared resource.
pub struct ResourceFields {
  urn: Urn,
  fields: BTreeMap<String, Output<PropertyValue>>,
}

// Field values are watch handles with an attached conversion closure, so
// only the URN and the field names are printable.
impl fmt::Debug for ResourceFields {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ResourceFields")
      .field("urn", &self.urn)
      .field("fields", &self.fields.keys().collect::<Vec<_>>())
      .finish_non_exhaustive()
  }
}

impl ResourceFields {
  pub fn urn(&self) -> &Urn {
    &self.urn
  }

  /// Pending value handle for a field.
  ///
  /// # Panics
  ///
  /// Panics if `field` is not part of the resource's schema. Reading an
  /// unknown field is a programming error, not a recoverable condition.
  pub fn output(&self, field: &str) -> Output<PropertyValue> {
    match self.fields.get(field) {
      Some(output) => output.clone(),
      None => panic!("unknown field `{field}` on {}", self.urn),
    }
  }

  /// Names of every declared field, in sorted order.
  pub fn field_names(&self) -> impl Iterator<Item = &str> {
    self.fields.keys().map(String::as_str)
  }

  /// Typed view of a field that must resolve to a string.
  pub fn string_output(&self, field: &str) -> Output<String> {
    let name = field.to_string();
    self.output(field).try_map(move |value| match value {
      PropertyValue::String(s) => Ok(s),
      other => Err(BindingError::WrongType {
        field: name.clone(),
        expected: "string".to_string(),
        actual: other.type_name().to_string(),
      }),
    })
  }

  /// Typed view of an optional string field; `Null` reads as `None`.
  pub fn optional_string_output(&self, field: &str) -> Output<Option<String>> {
    let name = field.to_string();
    self.output(field).try_map(move |value| match value {
      PropertyValue::Null => Ok(None),
      PropertyValue::String(s) => Ok(Some(s)),
      other => Err(BindingError::WrongType {
        field: name.clone(),
        expected: "string or null".to_string(),
        actual: other.type_name().to_string(),
      }),
    })
  }
}

/// Declare a new resource and register it with the runtime.
///
/// Returns immediately; no network I/O happens on the calling task. Must be
/// called from within a tokio runtime, which carries the registration.
pub fn register(
  graph: &DeclarationGraph,
  kind: &str,
  name: &str,
  input_fields: &[&str],
  inputs: BTreeMap<String, PropertyValue>,
  output_fields: &[&str],
  options: &ResourceOptions,
) -> Result<ResourceFields, BindingError> {
  options.validate(graph)?;
  let urn = graph.declare(kind, name)?;
  graph.link(&urn, options);

  let (cells, fields) = pending_fields(input_fields.iter().chain(output_fields).copied());

  let runtime = graph.runtime();
  let request = RegisterRequest {
    kind: kind.to_string(),
    name: name.to_string(),
    inputs,
    options: options.to_wire(),
  };
  let echo = request.inputs.clone();
  let input_set: BTreeSet<String> = input_fields.iter().map(|f| f.to_string()).collect();
  let task_urn = urn.clone();

  tokio::spawn(async move {
    debug!(urn = %task_urn, "registering resource");
    match runtime.register_resource(request).await {
      Ok(resp) => {
        debug!(urn = %task_urn, id = %resp.id, "resource registered");
        for (field, cell) in cells {
          if let Some(value) = resp.outputs.get(&field) {
            cell.resolve(value.clone());
          } else if input_set.contains(&field) {
            cell.resolve(echo.get(&field).cloned().unwrap_or(PropertyValue::Null));
          } else {
            warn!(urn = %task_urn, field = %field, "runtime omitted a declared output");
            cell.reject(BindingError::Unresolved { field });
          }
        }
      }
      Err(err) => {
        warn!(urn = %task_urn, error = %err, "registration failed");
        for (_, cell) in cells {
          cell.reject(BindingError::Protocol(err.clone()));
        }
      }
    }
  });

  Ok(ResourceFields { urn, fields })
}

/// Attach to an existing remote entity by its provider-assigned identity.
///
/// All fields, inputs included, become pending reads; caller-supplied
/// values play no part. A missing remote entity rejects every field with the
/// runtime's not-found error.
pub fn attach(
  graph: &DeclarationGraph,
  kind: &str,
  name: &str,
  id: &str,
  input_fields: &[&str],
  output_fields: &[&str],
  options: &ResourceOptions,
) -> Result<ResourceFields, BindingError> {
  options.validate(graph)?;
  let urn = graph.declare(kind, name)?;
  graph.link(&urn, options);

  let (cells, fields) = pending_fields(input_fields.iter().chain(output_fields).copied());

  let runtime = graph.runtime();
  let request = ReadRequest {
    kind: kind.to_string(),
    id: id.to_string(),
  };
  let input_set: BTreeSet<String> = input_fields.iter().map(|f| f.to_string()).collect();
  let task_urn = urn.clone();

  tokio::spawn(async move {
    debug!(urn = %task_urn, id = %request.id, "reading resource");
    match runtime.read_resource(request).await {
      Ok(resp) => {
        for (field, cell) in cells {
          if let Some(value) = resp.outputs.get(&field).or_else(|| resp.inputs.get(&field)) {
            cell.resolve(value.clone());
          } else if input_set.contains(&field) {
            // Remote state may legitimately omit an optional input.
            cell.resolve(PropertyValue::Null);
          } else {
            warn!(urn = %task_urn, field = %field, "read omitted a declared output");
            cell.reject(BindingError::Unresolved { field });
          }
        }
      }
      Err(err) => {
        warn!(urn = %task_urn, error = %err, "read failed");
        for (_, cell) in cells {
          cell.reject(BindingError::Protocol(err.clone()));
        }
      }
    }
  });

  Ok(ResourceFields { urn, fields })
}

fn pending_fields<'a>(
  names: impl Iterator<Item = &'a str>,
) -> (
  BTreeMap<String, OutputCell>,
  BTreeMap<String, Output<PropertyValue>>,
) {
  let mut cells = BTreeMap::new();
  let mut fields = BTreeMap::new();
  for name in names {
    let (cell, output) = Output::pending();
    cells.insert(name.to_string(), cell);
    fields.insert(name.to_string(), output);
  }
  (cells, fields)
}
