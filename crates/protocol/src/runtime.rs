//! The provider-protocol contract consumed by resource bindings.

use async_trait::async_trait;

use crate::error::ProtocolError;
use crate::types::{ReadRequest, ReadResponse, RegisterRequest, RegisterResponse};

/// A runtime that reconciles declared resources with remote state.
///
/// Bindings are typed client stubs over this trait: they register desired
/// inputs and read the resolved fields back. Everything else (diffing,
/// retries, rollback, deletion) is the runtime's responsibility.
#[async_trait]
pub trait ProviderRuntime: Send + Sync {
  /// Register a new pending resource and resolve its fields.
  async fn register_resource(&self, req: RegisterRequest) -> Result<RegisterResponse, ProtocolError>;

  /// Resolve all fields of an already existing remote entity.
  ///
  /// Returns [`ProtocolError::NotFound`] when no entity matches the id.
  async fn read_resource(&self, req: ReadRequest) -> Result<ReadResponse, ProtocolError>;
}
