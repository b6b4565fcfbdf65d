//! The explicit declaration graph resources are registered into.
//!
//! A [`DeclarationGraph`] replaces the ambient process-wide registry found in
//! other SDKs: every construct call takes the graph it declares into. The
//! graph owns the handle to the provider-protocol runtime, enforces
//! local-name uniqueness, and records the dependency edges declared through
//! resource options.
//!
//! Edges point from dependency to dependent, so topological order is
//! resolution order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use neon_protocol::{ProviderRuntime, Urn};

use crate::error::BindingError;
use crate::options::ResourceOptions;

/// One declaration pass: the set of resources declared together and their
/// dependency edges.
pub struct DeclarationGraph {
  runtime: Arc<dyn ProviderRuntime>,
  inner: Mutex<Inner>,
}

struct Inner {
  graph: DiGraph<Urn, ()>,
  nodes: HashMap<Urn, NodeIndex>,
  names: HashMap<String, Urn>,
  kinds: HashMap<Urn, String>,
}

impl DeclarationGraph {
  /// Create an empty graph bound to a runtime handle.
  pub fn new(runtime: Arc<dyn ProviderRuntime>) -> Self {
    Self {
      runtime,
      inner: Mutex::new(Inner {
        graph: DiGraph::new(),
        nodes: HashMap::new(),
        names: HashMap::new(),
        kinds: HashMap::new(),
      }),
    }
  }

  /// Convenience constructor wrapping the runtime in an `Arc`.
  pub fn with_runtime(runtime: impl ProviderRuntime + 'static) -> Self {
    Self::new(Arc::new(runtime))
  }

  pub(crate) fn runtime(&self) -> Arc<dyn ProviderRuntime> {
    self.runtime.clone()
  }

  /// Reserve a local name and return the URN of the new declaration.
  ///
  /// Local names are unique across the whole graph regardless of kind; a
  /// collision fails with [`BindingError::DuplicateName`] before anything
  /// reaches the runtime.
  pub(crate) fn declare(&self, kind: &str, name: &str) -> Result<Urn, BindingError> {
    let mut inner = self.inner.lock().expect("declaration graph lock poisoned");

    if inner.names.contains_key(name) {
      return Err(BindingError::DuplicateName {
        name: name.to_string(),
      });
    }

    let urn = Urn::new(kind, name);
    let idx = inner.graph.add_node(urn.clone());
    inner.nodes.insert(urn.clone(), idx);
    inner.names.insert(name.to_string(), urn.clone());
    inner.kinds.insert(urn.clone(), kind.to_string());

    debug!(%urn, "declared resource");
    Ok(urn)
  }

  /// Record the dependency edges a resource declared through its options.
  ///
  /// Options are validated before declaration, so every referenced URN is
  /// already a node here.
  pub(crate) fn link(&self, urn: &Urn, options: &ResourceOptions) {
    let mut inner = self.inner.lock().expect("declaration graph lock poisoned");

    let Some(&dependent) = inner.nodes.get(urn) else {
      return;
    };

    let mut deps: Vec<&Urn> = options.depends_on.iter().collect();
    if let Some(parent) = &options.parent {
      deps.push(parent);
    }
    if let Some(provider) = &options.provider {
      deps.push(provider);
    }

    let edges: Vec<(NodeIndex, NodeIndex)> = deps
      .into_iter()
      .filter_map(|dep| inner.nodes.get(dep).map(|&idx| (idx, dependent)))
      .collect();
    for (from, to) in edges {
      inner.graph.add_edge(from, to, ());
    }
  }

  /// Whether `urn` has been declared in this graph.
  pub fn contains(&self, urn: &Urn) -> bool {
    let inner = self.inner.lock().expect("declaration graph lock poisoned");
    inner.nodes.contains_key(urn)
  }

  /// Kind token of a declared resource.
  pub fn kind_of(&self, urn: &Urn) -> Option<String> {
    let inner = self.inner.lock().expect("declaration graph lock poisoned");
    inner.kinds.get(urn).cloned()
  }

  /// Direct dependencies of a declared resource.
  pub fn dependencies(&self, urn: &Urn) -> Vec<Urn> {
    let inner = self.inner.lock().expect("declaration graph lock poisoned");
    let Some(&idx) = inner.nodes.get(urn) else {
      return Vec::new();
    };

    inner
      .graph
      .neighbors_directed(idx, Direction::Incoming)
      .map(|dep| inner.graph[dep].clone())
      .collect()
  }

  /// Number of resources declared so far.
  pub fn resource_count(&self) -> usize {
    let inner = self.inner.lock().expect("declaration graph lock poisoned");
    inner.nodes.len()
  }

  /// All declarations in dependency order.
  ///
  /// Cycles cannot normally occur because edges only reference already
  /// declared resources; the error is kept for defense at the API boundary.
  pub fn declaration_order(&self) -> Result<Vec<Urn>, BindingError> {
    let inner = self.inner.lock().expect("declaration graph lock poisoned");
    let sorted = toposort(&inner.graph, None)
      .map_err(|_| BindingError::Configuration("dependency cycle detected".to_string()))?;

    Ok(sorted.into_iter().map(|idx| inner.graph[idx].clone()).collect())
  }
}
