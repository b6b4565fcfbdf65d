//! Cross-cutting resource options.
//!
//! Options carry concerns that apply to any resource kind: parent/child
//! relationships, explicit dependencies, provider selection, and deletion
//! protection. The binding validates them against the declaration graph and
//! then passes them through to the runtime verbatim.

use neon_protocol::{RegisterOptions, Urn};

use crate::error::BindingError;
use crate::graph::DeclarationGraph;
use crate::provider::Provider;

/// Options for a single resource declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceOptions {
  /// Parent resource in the declaration graph.
  pub parent: Option<Urn>,

  /// Resources that must resolve before this one.
  pub depends_on: Vec<Urn>,

  /// Provider resource to route lifecycle calls through.
  pub provider: Option<Urn>,

  /// Ask the runtime to refuse deletion of the remote entity.
  pub protect: bool,
}

impl ResourceOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn parent(mut self, urn: &Urn) -> Self {
    self.parent = Some(urn.clone());
    self
  }

  pub fn depends_on(mut self, urn: &Urn) -> Self {
    self.depends_on.push(urn.clone());
    self
  }

  pub fn provider(mut self, urn: &Urn) -> Self {
    self.provider = Some(urn.clone());
    self
  }

  pub fn protect(mut self, protect: bool) -> Self {
    self.protect = protect;
    self
  }

  /// Validate the options against the graph they will be declared into.
  ///
  /// Runs before any registration: a malformed option set must never reach
  /// the runtime.
  pub(crate) fn validate(&self, graph: &DeclarationGraph) -> Result<(), BindingError> {
    for dep in &self.depends_on {
      if !graph.contains(dep) {
        return Err(BindingError::Configuration(format!(
          "depends_on references undeclared resource {dep}"
        )));
      }
    }

    if let Some(parent) = &self.parent
      && !graph.contains(parent)
    {
      return Err(BindingError::Configuration(format!(
        "parent references undeclared resource {parent}"
      )));
    }

    if let Some(provider) = &self.provider {
      match graph.kind_of(provider) {
        None => {
          return Err(BindingError::Configuration(format!(
            "provider references undeclared resource {provider}"
          )));
        }
        Some(kind) if kind != Provider::KIND => {
          return Err(BindingError::WrongType {
            field: "provider".to_string(),
            expected: Provider::KIND.to_string(),
            actual: kind,
          });
        }
        Some(_) => {}
      }
    }

    Ok(())
  }

  /// Wire form handed to the runtime.
  pub(crate) fn to_wire(&self) -> RegisterOptions {
    RegisterOptions {
      parent: self.parent.clone(),
      depends_on: self.depends_on.clone(),
      provider: self.provider.clone(),
      protect: self.protect,
    }
  }
}
