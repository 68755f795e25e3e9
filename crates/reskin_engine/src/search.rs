//! Variable usage search and local variable listing

use crate::config::EngineConfig;
use crate::error::HostError;
use crate::host::{DocumentHost, NodeKind};
use reskin_core::{NodeId, VariableId};
use rustc_hash::FxHashSet;
use serde::Serialize;

/// A variable stored in one of the document's local theme collections
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalVariable {
    pub id: VariableId,
    pub name: String,
    pub collection_name: String,
}

/// A node that references the searched variable
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VariableUsage {
    pub node: NodeId,
    pub name: String,
    pub kind: NodeKind,
    /// Bound fields, plus `componentProperties.<name>` for instance slots
    pub properties: Vec<String>,
}

/// Every node under `roots` bound to `variable`, hidden nodes included
pub fn find_nodes_with_variable<H: DocumentHost + ?Sized>(
    host: &H,
    roots: &[NodeId],
    variable: &VariableId,
) -> Vec<VariableUsage> {
    let mut usages = Vec::new();
    let mut seen = FxHashSet::default();
    let mut stack: Vec<NodeId> = roots.iter().rev().cloned().collect();

    while let Some(id) = stack.pop() {
        if !seen.insert(id.clone()) {
            continue;
        }
        let Some(node) = host.node(&id) else {
            continue;
        };

        let mut properties: Vec<String> = host
            .bound_variables(&id)
            .into_iter()
            .filter(|(_, aliases)| aliases.iter().any(|a| &a.id == variable))
            .map(|(field, _)| field)
            .collect();

        if node.capabilities().has_component_properties {
            properties.extend(
                host.component_properties(&id)
                    .into_iter()
                    .filter(|(_, p)| p.bound_variable.as_ref().is_some_and(|a| &a.id == variable))
                    .map(|(name, _)| format!("componentProperties.{name}")),
            );
        }

        if !properties.is_empty() {
            usages.push(VariableUsage {
                node: node.id.clone(),
                name: node.name.clone(),
                kind: node.kind,
                properties,
            });
        }

        stack.extend(node.children.iter().rev().cloned());
    }

    tracing::debug!("find_nodes_with_variable: {} uses of {}", usages.len(), variable);
    usages
}

/// Variables of the local collections named in `config.theme_collections`, swaps excluded
///
/// Collections are listed in host order and variables in collection order.
/// Dangling variable ids are skipped.
pub async fn list_local_variables<H: DocumentHost + ?Sized>(
    host: &H,
    config: &EngineConfig,
) -> Result<Vec<LocalVariable>, HostError> {
    let collections = host.local_variable_collections().await?;
    let mut variables = Vec::new();

    for collection in collections.iter().filter(|c| config.lists_collection(&c.name)) {
        for id in &collection.variable_ids {
            let Some(variable) = host.variable_by_id(id).await? else {
                tracing::debug!("list_local_variables: {} has no variable {}", collection.name, id);
                continue;
            };
            variables.push(LocalVariable {
                id: variable.id,
                name: variable.name,
                collection_name: collection.name.clone(),
            });
        }
    }

    tracing::debug!("list_local_variables: {} variables", variables.len());
    Ok(variables)
}
