//! Single-assignment deferred values for resource fields.
//!
//! Every resource field is declared before its value is known: the binding
//! hands the resolver half ([`OutputCell`]) to a registration task and the
//! reader half ([`Output`]) to the caller. Reading an unresolved output
//! suspends the reader until the runtime resolves or rejects the cell; it
//! never returns a default.
//!
//! Typed views are derived lazily with [`Output::map`] and
//! [`Output::try_map`]: the conversion runs at read time, so deriving a view
//! spawns nothing and can happen outside an async context.

use std::sync::Arc;

use neon_protocol::PropertyValue;
use tokio::sync::watch;

use crate::error::BindingError;

type Raw = Option<Result<PropertyValue, BindingError>>;
type Convert<T> = Arc<dyn Fn(PropertyValue) -> Result<T, BindingError> + Send + Sync>;

/// Resolver half of a pending field. Write-once: after the first `resolve`
/// or `reject`, later calls are ignored.
pub struct OutputCell {
  tx: watch::Sender<Raw>,
}

impl OutputCell {
  /// Resolve the field with its final value.
  pub fn resolve(&self, value: PropertyValue) {
    self.tx.send_if_modified(|slot| {
      if slot.is_none() {
        *slot = Some(Ok(value));
        true
      } else {
        false
      }
    });
  }

  /// Reject the field; all readers observe the same error.
  pub fn reject(&self, err: BindingError) {
    self.tx.send_if_modified(|slot| {
      if slot.is_none() {
        *slot = Some(Err(err));
        true
      } else {
        false
      }
    });
  }
}

/// Reader half of a pending field.
///
/// Cloning an `Output` clones the view, not the value: all clones observe
/// the same single resolution.
pub struct Output<T> {
  rx: watch::Receiver<Raw>,
  convert: Convert<T>,
}

impl<T> Clone for Output<T> {
  fn clone(&self) -> Self {
    Self {
      rx: self.rx.clone(),
      convert: self.convert.clone(),
    }
  }
}

impl Output<PropertyValue> {
  /// Create a pending field, returning the resolver and reader halves.
  pub fn pending() -> (OutputCell, Output<PropertyValue>) {
    let (tx, rx) = watch::channel(None);
    (OutputCell { tx }, Output { rx, convert: Arc::new(Ok) })
  }

  /// An output that is already resolved. Mostly useful in tests.
  pub fn resolved(value: PropertyValue) -> Output<PropertyValue> {
    let (cell, output) = Output::pending();
    cell.resolve(value);
    output
  }
}

impl<T: 'static> Output<T> {
  /// Wait for the field to resolve and return its value.
  ///
  /// Suspends until the runtime resolves the cell. Returns
  /// [`BindingError::Canceled`] if the resolver half is dropped without ever
  /// resolving.
  pub async fn get(&self) -> Result<T, BindingError> {
    let mut rx = self.rx.clone();
    loop {
      let current = rx.borrow_and_update().clone();
      if let Some(raw) = current {
        return raw.and_then(|value| (self.convert)(value));
      }
      if rx.changed().await.is_err() {
        return Err(BindingError::Canceled);
      }
    }
  }

  /// Non-blocking peek: `None` while the field is still pending.
  pub fn try_get(&self) -> Option<Result<T, BindingError>> {
    self
      .rx
      .borrow()
      .clone()
      .map(|raw| raw.and_then(|value| (self.convert)(value)))
  }

  /// Derive a view that applies `f` to the resolved value at read time.
  pub fn map<U>(&self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Output<U> {
    let convert = self.convert.clone();
    Output {
      rx: self.rx.clone(),
      convert: Arc::new(move |raw| convert(raw).map(&f)),
    }
  }

  /// Derive a fallible view; conversion errors surface to the reader.
  pub fn try_map<U>(&self, f: impl Fn(T) -> Result<U, BindingError> + Send + Sync + 'static) -> Output<U> {
    let convert = self.convert.clone();
    Output {
      rx: self.rx.clone(),
      convert: Arc::new(move |raw| convert(raw).and_then(&f)),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;

  #[tokio::test]
  async fn get_suspends_until_resolved() {
    let (cell, output) = Output::pending();

    // Still pending: a bounded wait must time out rather than observe a
    // default value.
    let pending = tokio::time::timeout(Duration::from_millis(20), output.get()).await;
    assert!(pending.is_err());
    assert!(output.try_get().is_none());

    cell.resolve(PropertyValue::from("ready"));
    assert_eq!(output.get().await.unwrap(), PropertyValue::from("ready"));
  }

  #[tokio::test]
  async fn resolution_is_write_once() {
    let (cell, output) = Output::pending();

    cell.resolve(PropertyValue::from("first"));
    cell.resolve(PropertyValue::from("second"));
    cell.reject(BindingError::Canceled);

    assert_eq!(output.get().await.unwrap(), PropertyValue::from("first"));
  }

  #[tokio::test]
  async fn reject_propagates_to_all_clones() {
    let (cell, output) = Output::pending();
    let clone = output.clone();

    cell.reject(BindingError::Unresolved {
      field: "identifier".to_string(),
    });

    assert!(matches!(output.get().await, Err(BindingError::Unresolved { .. })));
    assert!(matches!(clone.get().await, Err(BindingError::Unresolved { .. })));
  }

  #[tokio::test]
  async fn dropped_cell_cancels_readers() {
    let (cell, output) = Output::pending();
    drop(cell);

    assert_eq!(output.get().await, Err(BindingError::Canceled));
  }

  #[tokio::test]
  async fn map_converts_at_read_time() {
    let (cell, output) = Output::pending();
    let upper = output.map(|v| match v {
      PropertyValue::String(s) => s.to_uppercase(),
      other => other.type_name().to_string(),
    });

    cell.resolve(PropertyValue::from("ep-cool-darkness"));
    assert_eq!(upper.get().await.unwrap(), "EP-COOL-DARKNESS");
  }

  #[tokio::test]
  async fn try_map_surfaces_conversion_errors() {
    let (cell, output) = Output::pending();
    let typed = output.try_map(|v| match v {
      PropertyValue::String(s) => Ok(s),
      other => Err(BindingError::WrongType {
        field: "identifier".to_string(),
        expected: "string".to_string(),
        actual: other.type_name().to_string(),
      }),
    });

    cell.resolve(PropertyValue::Bool(true));
    assert!(matches!(typed.get().await, Err(BindingError::WrongType { .. })));
  }

  #[tokio::test]
  async fn resolved_is_immediately_available() {
    let output = Output::resolved(PropertyValue::from("now"));
    assert_eq!(output.try_get().unwrap().unwrap(), PropertyValue::from("now"));
  }
}
