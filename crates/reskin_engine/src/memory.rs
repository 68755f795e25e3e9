//! In-memory document host
//!
//! [`MemoryDocument`] implements [`DocumentHost`] over a JSON snapshot of a
//! design document. It backs the command-line driver and every engine test.
//!
//! Paint bindings are stored where the live host stores them, on the paints
//! themselves; the `fills`/`strokes` entries of [`DocumentHost::bound_variables`]
//! are derived from `boundColor` on solid paints.

use crate::error::{HostError, HostResult};
use crate::host::{
    BoundVariables, ComponentInfo, ComponentProperty, ComponentSet, ComponentSetSummary, DocumentHost,
    NodeInfo, NodeKind, TextCase, TextDecoration, VariantProperties,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use reskin_core::{
    CollectionId, ComponentId, ModeId, NodeId, Paint, PaintField, PaintSlot, VariableId,
};
use reskin_theme::{
    Mode, ResolvedType, Variable, VariableAlias, VariableCollection, VariableValue,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Longest alias chain followed when resolving a value
const MAX_ALIAS_DEPTH: usize = 16;

/// Name of the mode a fresh collection starts with
const INITIAL_MODE_NAME: &str = "Mode 1";

fn visible() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot format
// ─────────────────────────────────────────────────────────────────────────────

/// One node of a document snapshot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default = "visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
    /// namespace → key → value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub shared_plugin_data: BTreeMap<String, BTreeMap<String, String>>,
    /// Bindings of non-paint fields
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub bound_variables: BoundVariables,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fills: Option<Vec<Paint>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub mixed_fills: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Vec<Paint>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub component_properties: IndexMap<String, ComponentProperty>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub explicit_variable_modes: BTreeMap<CollectionId, ModeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_properties: Option<VariantProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_component: Option<ComponentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_case: Option<TextCase>,
}

impl NodeRecord {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            visible: true,
            children: Vec::new(),
            shared_plugin_data: BTreeMap::new(),
            bound_variables: BoundVariables::new(),
            fills: None,
            mixed_fills: false,
            strokes: None,
            component_properties: IndexMap::new(),
            explicit_variable_modes: BTreeMap::new(),
            variant_properties: None,
            main_component: None,
            text_decoration: None,
            text_case: None,
        }
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn with_plugin_data(mut self, namespace: &str, key: &str, value: impl Into<String>) -> Self {
        self.shared_plugin_data
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
        self
    }

    pub fn with_fills(mut self, fills: Vec<Paint>) -> Self {
        self.fills = Some(fills);
        self
    }

    pub fn with_strokes(mut self, strokes: Vec<Paint>) -> Self {
        self.strokes = Some(strokes);
        self
    }

    pub fn with_binding(mut self, field: &str, variable: impl Into<VariableId>) -> Self {
        self.bound_variables
            .entry(field.to_string())
            .or_default()
            .push(VariableAlias::new(variable));
        self
    }

    pub fn with_component_property(mut self, name: &str, property: ComponentProperty) -> Self {
        self.component_properties.insert(name.to_string(), property);
        self
    }

    pub fn with_explicit_mode(mut self, collection: impl Into<CollectionId>, mode: impl Into<ModeId>) -> Self {
        self.explicit_variable_modes.insert(collection.into(), mode.into());
        self
    }

    pub fn with_variant(mut self, properties: VariantProperties) -> Self {
        self.variant_properties = Some(properties);
        self
    }

    pub fn with_main_component(mut self, component: impl Into<ComponentId>) -> Self {
        self.main_component = Some(component.into());
        self
    }

    fn paints(&self, field: PaintField) -> &Option<Vec<Paint>> {
        match field {
            PaintField::Fills => &self.fills,
            PaintField::Strokes => &self.strokes,
        }
    }
}

/// A component set as stored in a snapshot; children are component ids
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSetRecord {
    pub id: ComponentId,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub children: Vec<ComponentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_variant: Option<ComponentId>,
}

/// Serializable document state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    #[serde(default)]
    pub selection: Vec<NodeId>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub collections: Vec<VariableCollection>,
    #[serde(default)]
    pub components: Vec<ComponentInfo>,
    #[serde(default)]
    pub component_sets: Vec<ComponentSetRecord>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct DocumentState {
    selection: Vec<NodeId>,
    nodes: IndexMap<NodeId, NodeRecord>,
    parents: FxHashMap<NodeId, NodeId>,
    variables: IndexMap<VariableId, Variable>,
    collections: IndexMap<CollectionId, VariableCollection>,
    components: IndexMap<ComponentId, ComponentInfo>,
    component_sets: Vec<ComponentSetRecord>,
    loaded_fonts: FxHashSet<NodeId>,
    next_id: u64,
}

impl DocumentState {
    fn node(&self, id: &NodeId) -> HostResult<&NodeRecord> {
        self.nodes.get(id).ok_or_else(|| HostError::NodeNotFound(id.clone()))
    }

    fn node_mut(&mut self, id: &NodeId) -> HostResult<&mut NodeRecord> {
        self.nodes.get_mut(id).ok_or_else(|| HostError::NodeNotFound(id.clone()))
    }

    fn collection_mut(&mut self, id: &CollectionId) -> HostResult<&mut VariableCollection> {
        self.collections
            .get_mut(id)
            .ok_or_else(|| HostError::CollectionNotFound(id.clone()))
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}:local:{}", self.next_id)
    }

    /// Mode a node sees for `collection`: nearest pinned ancestor, else the default mode
    fn mode_for(&self, node: &NodeId, collection: &CollectionId) -> Option<ModeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(mode) = self
                .nodes
                .get(id)
                .and_then(|n| n.explicit_variable_modes.get(collection))
            {
                return Some(mode.clone());
            }
            current = self.parents.get(id);
        }
        self.collections
            .get(collection)
            .and_then(|c| c.default_mode().cloned())
    }

    fn resolve(&self, variable: &Variable, node: &NodeId, depth: usize) -> HostResult<VariableValue> {
        if depth > MAX_ALIAS_DEPTH {
            return Err(HostError::Resolve {
                variable: variable.id.clone(),
                reason: "alias chain too deep".to_string(),
            });
        }

        let value = self
            .mode_for(node, &variable.collection_id)
            .and_then(|mode| variable.values_by_mode.get(&mode))
            // Library variables whose collection is unknown here resolve in their first mode
            .or_else(|| variable.values_by_mode.values().next())
            .ok_or_else(|| HostError::Resolve {
                variable: variable.id.clone(),
                reason: "no value for the consumer's mode".to_string(),
            })?;

        match value {
            VariableValue::Alias(alias) => {
                let target = self
                    .variables
                    .get(&alias.id)
                    .ok_or_else(|| HostError::VariableNotFound(alias.id.clone()))?;
                self.resolve(target, node, depth + 1)
            }
            other => Ok(other.clone()),
        }
    }

    fn component_set(&self, record: &ComponentSetRecord) -> ComponentSet {
        ComponentSet {
            id: record.id.clone(),
            key: record.key.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            children: record
                .children
                .iter()
                .filter_map(|id| self.components.get(id).cloned())
                .collect(),
            default_variant: record.default_variant.clone(),
        }
    }
}

/// Write counters, for asserting what a run touched
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub bindings: usize,
    pub paints: usize,
    pub modes: usize,
    pub component_properties: usize,
    pub text: usize,
    pub swaps: usize,
    pub local_variables: usize,
}

impl WriteCounts {
    pub fn total(&self) -> usize {
        self.bindings
            + self.paints
            + self.modes
            + self.component_properties
            + self.text
            + self.swaps
            + self.local_variables
    }
}

/// Single-threaded document host backed by a snapshot
#[derive(Debug, Default)]
pub struct MemoryDocument {
    state: RefCell<DocumentState>,
    writes: Cell<WriteCounts>,
}

impl MemoryDocument {
    pub fn new(snapshot: DocumentSnapshot) -> Self {
        let mut state = DocumentState {
            selection: snapshot.selection,
            ..DocumentState::default()
        };

        for mut node in snapshot.nodes {
            // Paint bindings live on the paints
            node.bound_variables
                .retain(|field, _| PaintField::from_field(field).is_none());
            for child in &node.children {
                state.parents.insert(child.clone(), node.id.clone());
            }
            state.nodes.insert(node.id.clone(), node);
        }

        for variable in snapshot.variables {
            state.variables.insert(variable.id.clone(), variable);
        }
        for collection in snapshot.collections {
            state.collections.insert(collection.id.clone(), collection);
        }
        for component in snapshot.components {
            state.components.insert(component.id.clone(), component);
        }
        for set in &snapshot.component_sets {
            for child in &set.children {
                if let Some(component) = state.components.get_mut(child) {
                    component.parent_set.get_or_insert_with(|| ComponentSetSummary {
                        id: set.id.clone(),
                        key: set.key.clone(),
                        description: set.description.clone(),
                    });
                }
            }
        }
        state.component_sets = snapshot.component_sets;

        tracing::debug!(
            "MemoryDocument::new - {} nodes, {} variables, {} collections",
            state.nodes.len(),
            state.variables.len(),
            state.collections.len()
        );

        Self {
            state: RefCell::new(state),
            writes: Cell::new(WriteCounts::default()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Current state as a snapshot
    pub fn snapshot(&self) -> DocumentSnapshot {
        let state = self.state.borrow();
        let components = state
            .components
            .values()
            .cloned()
            .map(|mut c| {
                // Derived from the sets on load
                c.parent_set = None;
                c
            })
            .collect();

        DocumentSnapshot {
            selection: state.selection.clone(),
            nodes: state.nodes.values().cloned().collect(),
            variables: state.variables.values().cloned().collect(),
            collections: state.collections.values().cloned().collect(),
            components,
            component_sets: state.component_sets.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    pub fn set_selection(&self, selection: Vec<NodeId>) {
        self.state.borrow_mut().selection = selection;
    }

    pub fn record(&self, id: &NodeId) -> Option<NodeRecord> {
        self.state.borrow().nodes.get(id).cloned()
    }

    pub fn variable(&self, id: &VariableId) -> Option<Variable> {
        self.state.borrow().variables.get(id).cloned()
    }

    /// Local (non-library) collection by name
    pub fn local_collection(&self, name: &str) -> Option<VariableCollection> {
        self.state
            .borrow()
            .collections
            .values()
            .find(|c| !c.remote && c.name == name)
            .cloned()
    }

    pub fn writes(&self) -> WriteCounts {
        self.writes.get()
    }

    fn count(&self, bump: impl FnOnce(&mut WriteCounts)) {
        let mut counts = self.writes.get();
        bump(&mut counts);
        self.writes.set(counts);
    }
}

#[async_trait(?Send)]
impl DocumentHost for MemoryDocument {
    fn selection(&self) -> Vec<NodeId> {
        self.state.borrow().selection.clone()
    }

    fn node(&self, id: &NodeId) -> Option<NodeInfo> {
        self.state.borrow().nodes.get(id).map(|n| NodeInfo {
            id: n.id.clone(),
            name: n.name.clone(),
            kind: n.kind,
            visible: n.visible,
            children: n.children.clone(),
        })
    }

    fn shared_plugin_data(&self, node: &NodeId, namespace: &str, key: &str) -> Option<String> {
        let state = self.state.borrow();
        state
            .nodes
            .get(node)?
            .shared_plugin_data
            .get(namespace)?
            .get(key)
            .cloned()
    }

    fn bound_variables(&self, node: &NodeId) -> BoundVariables {
        let state = self.state.borrow();
        let Some(record) = state.nodes.get(node) else {
            return BoundVariables::new();
        };

        let mut bound = BoundVariables::new();
        for field in [PaintField::Fills, PaintField::Strokes] {
            let aliases: Vec<VariableAlias> = record
                .paints(field)
                .iter()
                .flatten()
                .filter_map(|paint| paint.bound_variable().cloned().map(VariableAlias::new))
                .collect();
            if !aliases.is_empty() {
                bound.insert(field.as_str().to_string(), aliases);
            }
        }
        for (field, aliases) in &record.bound_variables {
            bound.insert(field.clone(), aliases.clone());
        }
        bound
    }

    fn component_properties(&self, node: &NodeId) -> IndexMap<String, ComponentProperty> {
        self.state
            .borrow()
            .nodes
            .get(node)
            .map(|n| n.component_properties.clone())
            .unwrap_or_default()
    }

    fn explicit_variable_modes(&self, node: &NodeId) -> BTreeMap<CollectionId, ModeId> {
        self.state
            .borrow()
            .nodes
            .get(node)
            .map(|n| n.explicit_variable_modes.clone())
            .unwrap_or_default()
    }

    fn paints(&self, node: &NodeId, field: PaintField) -> Option<PaintSlot> {
        let state = self.state.borrow();
        let record = state.nodes.get(node)?;
        if !record.kind.capabilities().supports(field) {
            return None;
        }
        if field == PaintField::Fills && record.mixed_fills {
            return Some(PaintSlot::Mixed);
        }
        Some(PaintSlot::Paints(record.paints(field).clone().unwrap_or_default()))
    }

    fn set_paints(&self, node: &NodeId, field: PaintField, paints: Vec<Paint>) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let record = state.node_mut(node)?;
        if !record.kind.capabilities().supports(field) {
            return Err(HostError::Unsupported {
                node: node.clone(),
                operation: "set paints",
            });
        }

        match field {
            PaintField::Fills => {
                record.fills = Some(paints);
                record.mixed_fills = false;
            }
            PaintField::Strokes => record.strokes = Some(paints),
        }
        drop(state);
        self.count(|w| w.paints += 1);
        Ok(())
    }

    fn set_bound_variable(&self, node: &NodeId, field: &str, variable: &Variable) -> Result<(), HostError> {
        if PaintField::from_field(field).is_some() {
            return Err(HostError::Other(format!(
                "{field} is bound through its paints"
            )));
        }

        let mut state = self.state.borrow_mut();
        state
            .node_mut(node)?
            .bound_variables
            .insert(field.to_string(), vec![variable.alias()]);
        drop(state);
        self.count(|w| w.bindings += 1);
        Ok(())
    }

    fn set_explicit_variable_mode(
        &self,
        node: &NodeId,
        collection: &CollectionId,
        mode: &ModeId,
    ) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let known = state
            .collections
            .get(collection)
            .ok_or_else(|| HostError::CollectionNotFound(collection.clone()))?
            .modes
            .iter()
            .any(|m| &m.mode_id == mode);
        if !known {
            return Err(HostError::ModeNotFound {
                collection: collection.clone(),
                mode: mode.clone(),
            });
        }

        state
            .node_mut(node)?
            .explicit_variable_modes
            .insert(collection.clone(), mode.clone());
        drop(state);
        self.count(|w| w.modes += 1);
        Ok(())
    }

    fn set_component_property_aliases(
        &self,
        node: &NodeId,
        aliases: Vec<(String, VariableAlias)>,
    ) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let record = state.node_mut(node)?;

        if let Some((missing, _)) = aliases
            .iter()
            .find(|(name, _)| !record.component_properties.contains_key(name))
        {
            return Err(HostError::Other(format!(
                "component property '{missing}' not found on {node}"
            )));
        }

        for (name, alias) in aliases {
            if let Some(property) = record.component_properties.get_mut(&name) {
                property.bound_variable = Some(alias);
            }
        }
        drop(state);
        self.count(|w| w.component_properties += 1);
        Ok(())
    }

    async fn variable_by_id(&self, id: &VariableId) -> Result<Option<Variable>, HostError> {
        Ok(self.state.borrow().variables.get(id).cloned())
    }

    async fn variable_collection_by_id(
        &self,
        id: &CollectionId,
    ) -> Result<Option<VariableCollection>, HostError> {
        Ok(self.state.borrow().collections.get(id).cloned())
    }

    fn resolve_for_consumer(&self, variable: &Variable, node: &NodeId) -> Result<VariableValue, HostError> {
        self.state.borrow().resolve(variable, node, 0)
    }

    async fn load_font(&self, node: &NodeId) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if state.node(node)?.kind != NodeKind::Text {
            return Err(HostError::Unsupported {
                node: node.clone(),
                operation: "load font",
            });
        }
        state.loaded_fonts.insert(node.clone());
        Ok(())
    }

    fn set_text_decoration(&self, node: &NodeId, value: TextDecoration) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if !state.loaded_fonts.contains(node) {
            return Err(HostError::FontNotLoaded(node.clone()));
        }
        state.node_mut(node)?.text_decoration = Some(value);
        drop(state);
        self.count(|w| w.text += 1);
        Ok(())
    }

    fn set_text_case(&self, node: &NodeId, value: TextCase) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if !state.loaded_fonts.contains(node) {
            return Err(HostError::FontNotLoaded(node.clone()));
        }
        state.node_mut(node)?.text_case = Some(value);
        drop(state);
        self.count(|w| w.text += 1);
        Ok(())
    }

    fn variant_properties(&self, node: &NodeId) -> Option<VariantProperties> {
        self.state.borrow().nodes.get(node)?.variant_properties.clone()
    }

    async fn import_component_set_by_key(&self, key: &str) -> Result<ComponentSet, HostError> {
        let state = self.state.borrow();
        state
            .component_sets
            .iter()
            .find(|set| set.key == key)
            .map(|set| state.component_set(set))
            .ok_or_else(|| HostError::ComponentNotFound(key.to_string()))
    }

    async fn main_component(&self, node: &NodeId) -> Result<Option<ComponentInfo>, HostError> {
        let state = self.state.borrow();
        let record = state.node(node)?;
        Ok(record
            .main_component
            .as_ref()
            .and_then(|id| state.components.get(id).cloned()))
    }

    fn swap_component(&self, node: &NodeId, component: &ComponentId) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let variant = state
            .components
            .get(component)
            .ok_or_else(|| HostError::ComponentNotFound(component.to_string()))?
            .variant_properties
            .clone();

        let record = state.node_mut(node)?;
        if record.kind != NodeKind::Instance {
            return Err(HostError::Unsupported {
                node: node.clone(),
                operation: "swap component",
            });
        }
        record.main_component = Some(component.clone());
        record.variant_properties = variant;
        drop(state);
        self.count(|w| w.swaps += 1);
        Ok(())
    }

    async fn local_variable_collections(&self) -> Result<Vec<VariableCollection>, HostError> {
        Ok(self
            .state
            .borrow()
            .collections
            .values()
            .filter(|c| !c.remote)
            .cloned()
            .collect())
    }

    fn create_variable_collection(&self, name: &str) -> Result<VariableCollection, HostError> {
        let mut state = self.state.borrow_mut();
        let id = CollectionId::from(state.fresh_id("VariableCollectionId"));
        let mode = ModeId::from(state.fresh_id("Mode"));

        let mut collection = VariableCollection::new(id.clone(), name);
        collection.modes = vec![Mode::new(mode.clone(), INITIAL_MODE_NAME)];
        collection.default_mode_id = Some(mode);
        state.collections.insert(id, collection.clone());
        drop(state);
        self.count(|w| w.local_variables += 1);
        Ok(collection)
    }

    fn add_mode(&self, collection: &CollectionId, name: &str) -> Result<ModeId, HostError> {
        let mut state = self.state.borrow_mut();
        let mode = ModeId::from(state.fresh_id("Mode"));
        state
            .collection_mut(collection)?
            .modes
            .push(Mode::new(mode.clone(), name));
        drop(state);
        self.count(|w| w.local_variables += 1);
        Ok(mode)
    }

    fn remove_mode(&self, collection: &CollectionId, mode: &ModeId) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let target = state.collection_mut(collection)?;
        if !target.modes.iter().any(|m| &m.mode_id == mode) {
            return Err(HostError::ModeNotFound {
                collection: collection.clone(),
                mode: mode.clone(),
            });
        }
        if target.modes.len() == 1 {
            return Err(HostError::Other(format!(
                "cannot remove the only mode of collection {collection}"
            )));
        }

        target.modes.retain(|m| &m.mode_id != mode);
        if target.default_mode_id.as_ref() == Some(mode) {
            target.default_mode_id = target.modes.first().map(|m| m.mode_id.clone());
        }
        let owned: Vec<VariableId> = target.variable_ids.clone();
        for id in owned {
            if let Some(variable) = state.variables.get_mut(&id) {
                variable.values_by_mode.remove(mode);
            }
        }
        drop(state);
        self.count(|w| w.local_variables += 1);
        Ok(())
    }

    fn create_variable(
        &self,
        name: &str,
        collection: &CollectionId,
        resolved_type: ResolvedType,
    ) -> Result<Variable, HostError> {
        let mut state = self.state.borrow_mut();
        let id = VariableId::from(state.fresh_id("VariableID"));
        state.collection_mut(collection)?.variable_ids.push(id.clone());

        let variable = Variable::new(id.clone(), name, resolved_type, collection.clone());
        state.variables.insert(id, variable.clone());
        drop(state);
        self.count(|w| w.local_variables += 1);
        Ok(variable)
    }

    fn set_variable_value_for_mode(
        &self,
        variable: &VariableId,
        mode: &ModeId,
        value: VariableValue,
    ) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let collection_id = state
            .variables
            .get(variable)
            .ok_or_else(|| HostError::VariableNotFound(variable.clone()))?
            .collection_id
            .clone();

        let has_mode = state
            .collections
            .get(&collection_id)
            .is_some_and(|c| c.modes.iter().any(|m| &m.mode_id == mode));
        if !has_mode {
            return Err(HostError::ModeNotFound {
                collection: collection_id,
                mode: mode.clone(),
            });
        }

        if let Some(target) = state.variables.get_mut(variable) {
            target.values_by_mode.insert(mode.clone(), value);
        }
        drop(state);
        self.count(|w| w.local_variables += 1);
        Ok(())
    }
}
