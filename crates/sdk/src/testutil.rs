//! In-memory provider runtime for tests.
//!
//! [`MemoryRuntime`] answers register and read calls from local state and
//! records every request it sees, so tests can assert on the exact wire
//! traffic a binding produced. A gate lets a test hold calls open to observe
//! fields in their pending state.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;

use neon_protocol::{
  PropertyValue, ProtocolError, ProviderRuntime, ReadRequest, ReadResponse, RegisterRequest,
  RegisterResponse,
};

/// A registered resource as the runtime remembers it.
#[derive(Debug, Clone)]
struct StoredResource {
  kind: String,
  inputs: BTreeMap<String, PropertyValue>,
  outputs: BTreeMap<String, PropertyValue>,
}

#[derive(Default)]
struct MemoryState {
  seeded: HashMap<String, BTreeMap<String, PropertyValue>>,
  resources: HashMap<String, StoredResource>,
  registrations: Vec<RegisterRequest>,
  reads: Vec<ReadRequest>,
  next_id: u64,
}

/// In-memory [`ProviderRuntime`] with request recording and a hold gate.
pub struct MemoryRuntime {
  state: Mutex<MemoryState>,
  gate: watch::Sender<bool>,
}

impl Default for MemoryRuntime {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryRuntime {
  pub fn new() -> Self {
    let (gate, _) = watch::channel(false);
    Self {
      state: Mutex::new(MemoryState::default()),
      gate,
    }
  }

  /// Seed the outputs every registration of `kind` will resolve with.
  pub fn with_outputs(self, kind: &str, outputs: BTreeMap<String, PropertyValue>) -> Self {
    self
      .state
      .lock()
      .expect("memory runtime lock poisoned")
      .seeded
      .insert(kind.to_string(), outputs);
    self
  }

  /// Hold all future calls open until [`release`](Self::release).
  pub fn hold(&self) {
    self.gate.send_replace(true);
  }

  /// Let held calls proceed.
  pub fn release(&self) {
    self.gate.send_replace(false);
  }

  /// Place a resource in remote state without going through registration.
  pub fn insert_resource(
    &self,
    id: &str,
    kind: &str,
    inputs: BTreeMap<String, PropertyValue>,
    outputs: BTreeMap<String, PropertyValue>,
  ) {
    let mut state = self.state.lock().expect("memory runtime lock poisoned");
    state.resources.insert(
      id.to_string(),
      StoredResource {
        kind: kind.to_string(),
        inputs,
        outputs,
      },
    );
  }

  /// Every register request seen so far, in call order.
  pub fn registrations(&self) -> Vec<RegisterRequest> {
    let state = self.state.lock().expect("memory runtime lock poisoned");
    state.registrations.clone()
  }

  /// Every read request seen so far, in call order.
  pub fn reads(&self) -> Vec<ReadRequest> {
    let state = self.state.lock().expect("memory runtime lock poisoned");
    state.reads.clone()
  }

  async fn wait_gate(&self) {
    let mut rx = self.gate.subscribe();
    loop {
      if !*rx.borrow_and_update() {
        return;
      }
      if rx.changed().await.is_err() {
        return;
      }
    }
  }

  fn assign_id(state: &mut MemoryState, kind: &str) -> String {
    state.next_id += 1;
    let slug = kind
      .rsplit(':')
      .next()
      .unwrap_or("resource")
      .to_lowercase();
    format!("{slug}-{:04}", state.next_id)
  }
}

#[async_trait]
impl ProviderRuntime for MemoryRuntime {
  async fn register_resource(
    &self,
    req: RegisterRequest,
  ) -> Result<RegisterResponse, ProtocolError> {
    self.wait_gate().await;

    let mut state = self.state.lock().expect("memory runtime lock poisoned");
    let id = Self::assign_id(&mut state, &req.kind);

    let mut outputs = state.seeded.get(&req.kind).cloned().unwrap_or_default();
    outputs.insert("identifier".to_string(), PropertyValue::from(id.as_str()));

    state.resources.insert(
      id.clone(),
      StoredResource {
        kind: req.kind.clone(),
        inputs: req.inputs.clone(),
        outputs: outputs.clone(),
      },
    );
    state.registrations.push(req);

    Ok(RegisterResponse { id, outputs })
  }

  async fn read_resource(&self, req: ReadRequest) -> Result<ReadResponse, ProtocolError> {
    self.wait_gate().await;

    let mut state = self.state.lock().expect("memory runtime lock poisoned");
    state.reads.push(req.clone());

    match state.resources.get(&req.id) {
      Some(stored) if stored.kind == req.kind => Ok(ReadResponse {
        inputs: stored.inputs.clone(),
        outputs: stored.outputs.clone(),
      }),
      _ => Err(ProtocolError::NotFound { id: req.id }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn register_assigns_sequential_ids() {
    let runtime = MemoryRuntime::new();

    let first = runtime
      .register_resource(RegisterRequest {
        kind: "neon:resource:Project".to_string(),
        name: "a".to_string(),
        inputs: BTreeMap::new(),
        options: Default::default(),
      })
      .await
      .unwrap();
    assert_eq!(first.id, "project-0001");
    assert_eq!(
      first.outputs.get("identifier"),
      Some(&PropertyValue::from("project-0001"))
    );
  }

  #[tokio::test]
  async fn read_returns_registered_state() {
    let runtime = MemoryRuntime::new();
    let inputs = BTreeMap::from([("name".to_string(), PropertyValue::from("p1"))]);

    let resp = runtime
      .register_resource(RegisterRequest {
        kind: "neon:resource:Project".to_string(),
        name: "a".to_string(),
        inputs: inputs.clone(),
        options: Default::default(),
      })
      .await
      .unwrap();

    let read = runtime
      .read_resource(ReadRequest {
        kind: "neon:resource:Project".to_string(),
        id: resp.id,
      })
      .await
      .unwrap();
    assert_eq!(read.inputs, inputs);
  }

  #[tokio::test]
  async fn read_unknown_id_is_not_found() {
    let runtime = MemoryRuntime::new();
    let err = runtime
      .read_resource(ReadRequest {
        kind: "neon:resource:Project".to_string(),
        id: "missing".to_string(),
      })
      .await
      .unwrap_err();
    assert_eq!(
      err,
      ProtocolError::NotFound {
        id: "missing".to_string()
      }
    );
  }

  #[tokio::test]
  async fn read_with_wrong_kind_is_not_found() {
    let runtime = MemoryRuntime::new();
    runtime.insert_resource("p-1", "neon:resource:Project", BTreeMap::new(), BTreeMap::new());

    let err = runtime
      .read_resource(ReadRequest {
        kind: "neon:provider".to_string(),
        id: "p-1".to_string(),
      })
      .await
      .unwrap_err();
    assert!(matches!(err, ProtocolError::NotFound { .. }));
  }
}
