//! The explicit Neon provider binding.
//!
//! Declaring a provider lets several resources in the same graph talk to
//! Neon under different credentials; resources select one through
//! [`ResourceOptions::provider`]. The API key comes from the arguments or,
//! when absent, from the `NEON_API_KEY` environment variable.

use std::collections::BTreeMap;
use std::env;

use neon_protocol::{PropertyValue, Urn};

use crate::error::BindingError;
use crate::graph::DeclarationGraph;
use crate::options::ResourceOptions;
use crate::output::Output;
use crate::resource::{self, ResourceFields};

/// Arguments for constructing a [`Provider`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderArgs {
  /// Neon API key. Falls back to `NEON_API_KEY` when unset.
  pub api_key: Option<String>,
}

/// A declared provider configuration.
#[derive(Debug)]
pub struct Provider {
  fields: ResourceFields,
}

impl Provider {
  pub const KIND: &'static str = "neon:provider";

  /// Environment variable consulted when no API key argument is given.
  pub const API_KEY_ENV: &'static str = "NEON_API_KEY";

  /// Declare a provider under the unique local name `name`.
  ///
  /// Fails with a configuration error before any registration when no API
  /// key can be resolved. An empty string counts as unset.
  pub fn new(
    graph: &DeclarationGraph,
    name: &str,
    args: ProviderArgs,
    options: &ResourceOptions,
  ) -> Result<Provider, BindingError> {
    let api_key = resolve_api_key(args.api_key)?;
    let inputs = BTreeMap::from([("api_key".to_string(), PropertyValue::String(api_key))]);

    let fields = resource::register(graph, Self::KIND, name, &["api_key"], inputs, &[], options)?;
    Ok(Provider { fields })
  }

  pub fn urn(&self) -> &Urn {
    self.fields.urn()
  }

  /// The API key this provider was configured with.
  pub fn api_key(&self) -> Output<String> {
    self.fields.string_output("api_key")
  }
}

fn resolve_api_key(arg: Option<String>) -> Result<String, BindingError> {
  if let Some(key) = arg.filter(|k| !k.is_empty()) {
    return Ok(key);
  }
  match env::var(Provider::API_KEY_ENV) {
    Ok(key) if !key.is_empty() => Ok(key),
    _ => Err(BindingError::Configuration(
      "missing required property `api_key`".to_string(),
    )),
  }
}
