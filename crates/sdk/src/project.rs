//! The Neon `Project` resource binding.
//!
//! A project is Neon's top-level unit: it owns branches, databases, roles
//! and endpoints, and the provider creates sensible defaults for all of them
//! when the project comes up. This binding exposes the two writable inputs
//! and the nine provider-computed outputs as typed deferred values.

use std::collections::BTreeMap;

use neon_protocol::{PropertyValue, Urn};

use crate::error::BindingError;
use crate::graph::DeclarationGraph;
use crate::options::ResourceOptions;
use crate::output::Output;
use crate::resource::{self, ResourceFields};

/// Arguments for constructing a [`Project`].
///
/// Both arguments are optional; an omitted argument is left out of the
/// registration entirely so the provider picks its own default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectArgs {
  /// Neon project name.
  pub name: Option<String>,

  /// Neon Org ID.
  pub org_id: Option<String>,
}

impl ProjectArgs {
  fn into_inputs(self) -> BTreeMap<String, PropertyValue> {
    let mut inputs = BTreeMap::new();
    if let Some(name) = self.name {
      inputs.insert("name".to_string(), PropertyValue::String(name));
    }
    if let Some(org_id) = self.org_id {
      inputs.insert("org_id".to_string(), PropertyValue::String(org_id));
    }
    inputs
  }
}

/// A declared Neon project.
#[derive(Debug)]
pub struct Project {
  fields: ResourceFields,
}

impl Project {
  pub const KIND: &'static str = "neon:resource:Project";

  const INPUTS: &'static [&'static str] = &["name", "org_id"];
  const OUTPUTS: &'static [&'static str] = &[
    "connection_uri",
    "connection_uri_pooler",
    "default_branch_name",
    "default_database_name",
    "default_endpoint_host",
    "default_endpoint_host_pooler",
    "default_role_name",
    "default_role_password",
    "identifier",
  ];

  /// Declare a new project under the unique local name `name`.
  ///
  /// Registration happens on a background task; the returned handle's fields
  /// resolve once the runtime answers.
  pub fn new(
    graph: &DeclarationGraph,
    name: &str,
    args: ProjectArgs,
    options: &ResourceOptions,
  ) -> Result<Project, BindingError> {
    let fields = resource::register(
      graph,
      Self::KIND,
      name,
      Self::INPUTS,
      args.into_inputs(),
      Self::OUTPUTS,
      options,
    )?;
    Ok(Project { fields })
  }

  /// Look up an existing project by its provider-assigned ID.
  ///
  /// Every field, inputs included, resolves from the remote project's
  /// current state; if no project with that ID exists, all fields reject
  /// with the runtime's not-found error.
  pub fn get(
    graph: &DeclarationGraph,
    name: &str,
    id: &str,
    options: &ResourceOptions,
  ) -> Result<Project, BindingError> {
    let fields = resource::attach(graph, Self::KIND, name, id, Self::INPUTS, Self::OUTPUTS, options)?;
    Ok(Project { fields })
  }

  pub fn urn(&self) -> &Urn {
    self.fields.urn()
  }

  /// Neon project name.
  pub fn name(&self) -> Output<Option<String>> {
    self.fields.optional_string_output("name")
  }

  /// Neon Org ID.
  pub fn org_id(&self) -> Output<Option<String>> {
    self.fields.optional_string_output("org_id")
  }

  /// URI to connect to the default database using the default endpoint.
  pub fn connection_uri(&self) -> Output<String> {
    self.fields.string_output("connection_uri")
  }

  /// URI to connect to the default database using the default endpoint in
  /// the pooler mode.
  pub fn connection_uri_pooler(&self) -> Output<String> {
    self.fields.string_output("connection_uri_pooler")
  }

  /// Neon default branch's name.
  pub fn default_branch_name(&self) -> Output<String> {
    self.fields.string_output("default_branch_name")
  }

  /// Neon default database's name.
  pub fn default_database_name(&self) -> Output<String> {
    self.fields.string_output("default_database_name")
  }

  /// The default endpoint's host.
  pub fn default_endpoint_host(&self) -> Output<String> {
    self.fields.string_output("default_endpoint_host")
  }

  /// The default endpoint's host with the pooler mode active.
  pub fn default_endpoint_host_pooler(&self) -> Output<String> {
    self.fields.string_output("default_endpoint_host_pooler")
  }

  /// Neon default role's name.
  pub fn default_role_name(&self) -> Output<String> {
    self.fields.string_output("default_role_name")
  }

  /// Neon default role's password.
  pub fn default_role_password(&self) -> Output<String> {
    self.fields.string_output("default_role_password")
  }

  /// Project ID.
  pub fn identifier(&self) -> Output<String> {
    self.fields.string_output("identifier")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::MemoryRuntime;
  use std::sync::Arc;

  fn project_outputs() -> BTreeMap<String, PropertyValue> {
    BTreeMap::from([
      ("connection_uri".to_string(), PropertyValue::from("postgresql://u@host/db")),
      ("connection_uri_pooler".to_string(), PropertyValue::from("postgresql://u@host-pooler/db")),
      ("default_branch_name".to_string(), PropertyValue::from("main")),
      ("default_database_name".to_string(), PropertyValue::from("neondb")),
      ("default_endpoint_host".to_string(), PropertyValue::from("ep-a.neon.tech")),
      ("default_endpoint_host_pooler".to_string(), PropertyValue::from("ep-a-pooler.neon.tech")),
      ("default_role_name".to_string(), PropertyValue::from("neondb_owner")),
      ("default_role_password".to_string(), PropertyValue::from("s3cret")),
    ])
  }

  fn seeded_runtime() -> Arc<MemoryRuntime> {
    Arc::new(MemoryRuntime::new().with_outputs(Project::KIND, project_outputs()))
  }

  #[tokio::test]
  async fn new_registers_with_the_exact_kind_token() {
    let runtime = seeded_runtime();
    let graph = DeclarationGraph::new(runtime.clone());

    let project =
      Project::new(&graph, "db", ProjectArgs::default(), &ResourceOptions::new()).unwrap();
    project.identifier().get().await.unwrap();

    assert_eq!(runtime.registrations()[0].kind, "neon:resource:Project");
    // Handles are debug-printable, as unwrap_err on the constructor needs.
    assert!(format!("{project:?}").contains("urn:decl::neon:resource:Project::db"));
  }

  #[tokio::test]
  async fn inputs_mirror_the_arguments_exactly() {
    let runtime = seeded_runtime();
    let graph = DeclarationGraph::new(runtime.clone());

    let project = Project::new(
      &graph,
      "db",
      ProjectArgs {
        name: Some("p1".to_string()),
        org_id: None,
      },
      &ResourceOptions::new(),
    )
    .unwrap();

    assert_eq!(project.name().get().await.unwrap(), Some("p1".to_string()));
    assert_eq!(project.org_id().get().await.unwrap(), None);

    let sent = &runtime.registrations()[0].inputs;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent.get("name"), Some(&PropertyValue::from("p1")));
  }

  #[tokio::test]
  async fn outputs_resolve_to_provider_values() {
    let graph = DeclarationGraph::new(seeded_runtime());
    let project = Project::new(&graph, "db", ProjectArgs::default(), &ResourceOptions::new()).unwrap();

    assert_eq!(project.default_branch_name().get().await.unwrap(), "main");
    assert_eq!(project.default_database_name().get().await.unwrap(), "neondb");
    assert_eq!(project.default_role_password().get().await.unwrap(), "s3cret");
    assert_eq!(project.identifier().get().await.unwrap(), "project-0001");
  }

  #[tokio::test]
  async fn duplicate_local_name_fails_for_the_second_declaration() {
    let graph = DeclarationGraph::new(seeded_runtime());

    Project::new(&graph, "db", ProjectArgs::default(), &ResourceOptions::new()).unwrap();
    let err =
      Project::new(&graph, "db", ProjectArgs::default(), &ResourceOptions::new()).unwrap_err();
    assert_eq!(
      err,
      BindingError::DuplicateName {
        name: "db".to_string()
      }
    );
  }

  #[tokio::test]
  async fn get_reads_instead_of_registering() {
    let runtime = seeded_runtime();
    runtime.insert_resource(
      "imported-1",
      Project::KIND,
      BTreeMap::from([("name".to_string(), PropertyValue::from("existing"))]),
      project_outputs(),
    );
    let graph = DeclarationGraph::new(runtime.clone());

    let project = Project::get(&graph, "imported", "imported-1", &ResourceOptions::new()).unwrap();

    assert_eq!(project.name().get().await.unwrap(), Some("existing".to_string()));
    assert_eq!(project.connection_uri().get().await.unwrap(), "postgresql://u@host/db");

    assert!(runtime.registrations().is_empty());
    assert_eq!(runtime.reads().len(), 1);
    assert_eq!(runtime.reads()[0].id, "imported-1");
  }

  #[tokio::test]
  async fn get_of_a_missing_project_rejects_every_field() {
    let graph = DeclarationGraph::new(seeded_runtime());
    let project = Project::get(&graph, "ghost", "nope", &ResourceOptions::new()).unwrap();

    assert!(project.identifier().get().await.unwrap_err().is_not_found());
    assert!(project.name().get().await.unwrap_err().is_not_found());
  }

  #[tokio::test]
  async fn non_string_output_surfaces_wrong_type() {
    let runtime = Arc::new(MemoryRuntime::new().with_outputs(
      Project::KIND,
      BTreeMap::from([("default_branch_name".to_string(), PropertyValue::Number(7.0))]),
    ));
    let graph = DeclarationGraph::new(runtime);
    let project = Project::new(&graph, "db", ProjectArgs::default(), &ResourceOptions::new()).unwrap();

    assert_eq!(
      project.default_branch_name().get().await,
      Err(BindingError::WrongType {
        field: "default_branch_name".to_string(),
        expected: "string".to_string(),
        actual: "number".to_string(),
      })
    );
  }
}
