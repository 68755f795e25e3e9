//! Document host capability boundary
//!
//! The engine never owns the document. Everything it reads or writes goes
//! through [`DocumentHost`], keyed by opaque [`NodeId`]s that are resolved fresh
//! at the start of each phase.
//!
//! Methods the host may suspend on (variable and collection lookups, font
//! loading, component import, local collection enumeration) are `async`.
//! Hosts are single-threaded, so the trait is `?Send`.

use crate::error::HostError;
use async_trait::async_trait;
use indexmap::IndexMap;
use reskin_core::{
    CollectionId, ComponentId, ModeId, NodeId, Paint, PaintField, PaintSlot, SolidPaint, VariableId,
};
use reskin_theme::{ResolvedType, Variable, VariableAlias, VariableCollection, VariableValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Node categories
// ─────────────────────────────────────────────────────────────────────────────

/// Closed set of node categories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Frame,
    Group,
    Section,
    Component,
    ComponentSet,
    Instance,
    Text,
    Rectangle,
    Ellipse,
    Vector,
    Line,
    Polygon,
    Star,
    BooleanOperation,
    Slice,
}

/// Capability witnesses, computed once per node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub has_fills: bool,
    pub has_strokes: bool,
    pub has_component_properties: bool,
    pub has_children: bool,
    pub has_text: bool,
}

impl Capabilities {
    pub fn supports(&self, field: PaintField) -> bool {
        match field {
            PaintField::Fills => self.has_fills,
            PaintField::Strokes => self.has_strokes,
        }
    }
}

impl NodeKind {
    /// Node kinds whose children are walked during flattening
    pub fn is_container(self) -> bool {
        matches!(
            self,
            NodeKind::Component
                | NodeKind::ComponentSet
                | NodeKind::Instance
                | NodeKind::Frame
                | NodeKind::Group
                | NodeKind::Section
        )
    }

    pub fn capabilities(self) -> Capabilities {
        let paintable = !matches!(self, NodeKind::Group | NodeKind::Slice);
        Capabilities {
            has_fills: paintable && self != NodeKind::Line,
            has_strokes: paintable && self != NodeKind::Section,
            has_component_properties: self == NodeKind::Instance,
            has_children: self.is_container() || self == NodeKind::BooleanOperation,
            has_text: self == NodeKind::Text,
        }
    }
}

/// Structural view of one node
#[derive(Clone, Debug, PartialEq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub visible: bool,
    pub children: Vec<NodeId>,
}

impl NodeInfo {
    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bindings and components
// ─────────────────────────────────────────────────────────────────────────────

/// Bound variables per node field (`fills`, `strokes`, `itemSpacing`, ...)
pub type BoundVariables = IndexMap<String, Vec<VariableAlias>>;

/// Variant option set of a component, e.g. `{size: sm, state: hover}`
pub type VariantProperties = BTreeMap<String, String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentPropertyKind {
    Boolean,
    Text,
    InstanceSwap,
    Variant,
}

/// One property of an instance, possibly bound to a variable
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentProperty {
    #[serde(rename = "type")]
    pub kind: ComponentPropertyKind,
    pub value: VariableValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_variable: Option<VariableAlias>,
}

/// Component set a variant belongs to
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentSetSummary {
    pub id: ComponentId,
    pub key: String,
    #[serde(default)]
    pub description: String,
}

/// A component definition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    pub id: ComponentId,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub variant_properties: Option<VariantProperties>,
    #[serde(default)]
    pub parent_set: Option<ComponentSetSummary>,
}

impl ComponentInfo {
    /// Description carrying provenance metadata: the set's for variants, else the component's own
    pub fn provenance_description(&self) -> &str {
        match &self.parent_set {
            Some(set) => &set.description,
            None => &self.description,
        }
    }
}

/// An imported component set with its variants
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentSet {
    pub id: ComponentId,
    pub key: String,
    pub name: String,
    pub description: String,
    pub children: Vec<ComponentInfo>,
    pub default_variant: Option<ComponentId>,
}

impl ComponentSet {
    /// Variant whose properties equal `current`, else the declared default variant
    pub fn matching_variant(&self, current: Option<&VariantProperties>) -> Option<&ComponentInfo> {
        let exact = current.and_then(|props| {
            self.children
                .iter()
                .find(|child| child.variant_properties.as_ref() == Some(props))
        });

        exact.or_else(|| {
            let default = self.default_variant.as_ref()?;
            self.children.iter().find(|child| &child.id == default)
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text properties
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    Strikethrough,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextCase {
    #[default]
    Original,
    Upper,
    Lower,
    Title,
    SmallCaps,
    SmallCapsForced,
}

/// Error for token values that are not a known text property value
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("unknown text property value '{0}'")]
pub struct UnknownTextValue(pub String);

impl FromStr for TextDecoration {
    type Err = UnknownTextValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "UNDERLINE" => Ok(Self::Underline),
            "STRIKETHROUGH" => Ok(Self::Strikethrough),
            _ => Err(UnknownTextValue(s.to_string())),
        }
    }
}

impl FromStr for TextCase {
    type Err = UnknownTextValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ORIGINAL" => Ok(Self::Original),
            "UPPER" => Ok(Self::Upper),
            "LOWER" => Ok(Self::Lower),
            "TITLE" => Ok(Self::Title),
            "SMALL_CAPS" => Ok(Self::SmallCaps),
            "SMALL_CAPS_FORCED" => Ok(Self::SmallCapsForced),
            _ => Err(UnknownTextValue(s.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Host trait
// ─────────────────────────────────────────────────────────────────────────────

/// Capabilities the engine consumes from the live document
#[async_trait(?Send)]
pub trait DocumentHost {
    // ========== Tree ==========

    /// Root nodes of the current selection
    fn selection(&self) -> Vec<NodeId>;

    fn node(&self, id: &NodeId) -> Option<NodeInfo>;

    fn shared_plugin_data(&self, node: &NodeId, namespace: &str, key: &str) -> Option<String>;

    // ========== Bindings ==========

    fn bound_variables(&self, node: &NodeId) -> BoundVariables;

    fn component_properties(&self, node: &NodeId) -> IndexMap<String, ComponentProperty>;

    /// Pinned modes per collection
    fn explicit_variable_modes(&self, node: &NodeId) -> BTreeMap<CollectionId, ModeId>;

    fn paints(&self, node: &NodeId, field: PaintField) -> Option<PaintSlot>;

    fn set_paints(&self, node: &NodeId, field: PaintField, paints: Vec<Paint>) -> Result<(), HostError>;

    fn set_bound_variable(&self, node: &NodeId, field: &str, variable: &Variable) -> Result<(), HostError>;

    /// Bind a solid paint's color to a variable
    fn bind_paint_to_variable(&self, paint: &SolidPaint, variable: &Variable) -> SolidPaint {
        paint.clone().bound_to(variable.id.clone())
    }

    fn set_explicit_variable_mode(
        &self,
        node: &NodeId,
        collection: &CollectionId,
        mode: &ModeId,
    ) -> Result<(), HostError>;

    /// Apply several component-property aliases in one write
    fn set_component_property_aliases(
        &self,
        node: &NodeId,
        aliases: Vec<(String, VariableAlias)>,
    ) -> Result<(), HostError>;

    // ========== Variables ==========

    async fn variable_by_id(&self, id: &VariableId) -> Result<Option<Variable>, HostError>;

    async fn variable_collection_by_id(
        &self,
        id: &CollectionId,
    ) -> Result<Option<VariableCollection>, HostError>;

    /// Resolve a variable's value in the context of a consuming node
    fn resolve_for_consumer(&self, variable: &Variable, node: &NodeId) -> Result<VariableValue, HostError>;

    // ========== Text ==========

    async fn load_font(&self, node: &NodeId) -> Result<(), HostError>;

    fn set_text_decoration(&self, node: &NodeId, value: TextDecoration) -> Result<(), HostError>;

    fn set_text_case(&self, node: &NodeId, value: TextCase) -> Result<(), HostError>;

    // ========== Components ==========

    fn variant_properties(&self, node: &NodeId) -> Option<VariantProperties>;

    async fn import_component_set_by_key(&self, key: &str) -> Result<ComponentSet, HostError>;

    async fn main_component(&self, node: &NodeId) -> Result<Option<ComponentInfo>, HostError>;

    /// Swap an instance's definition in place, keeping position, size and overrides
    fn swap_component(&self, node: &NodeId, component: &ComponentId) -> Result<(), HostError>;

    // ========== Local variables ==========

    async fn local_variable_collections(&self) -> Result<Vec<VariableCollection>, HostError>;

    fn create_variable_collection(&self, name: &str) -> Result<VariableCollection, HostError>;

    fn add_mode(&self, collection: &CollectionId, name: &str) -> Result<ModeId, HostError>;

    fn remove_mode(&self, collection: &CollectionId, mode: &ModeId) -> Result<(), HostError>;

    fn create_variable(
        &self,
        name: &str,
        collection: &CollectionId,
        resolved_type: ResolvedType,
    ) -> Result<Variable, HostError>;

    fn set_variable_value_for_mode(
        &self,
        variable: &VariableId,
        mode: &ModeId,
        value: VariableValue,
    ) -> Result<(), HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: &str, size: &str) -> ComponentInfo {
        ComponentInfo {
            id: ComponentId::from(id),
            key: format!("key-{id}"),
            name: format!("size={size}"),
            description: String::new(),
            variant_properties: Some(VariantProperties::from([("size".to_string(), size.to_string())])),
            parent_set: None,
        }
    }

    fn set(default_variant: Option<&str>) -> ComponentSet {
        ComponentSet {
            id: ComponentId::from("set"),
            key: "set-key".to_string(),
            name: "Icon".to_string(),
            description: String::new(),
            children: vec![variant("sm", "sm"), variant("lg", "lg")],
            default_variant: default_variant.map(ComponentId::from),
        }
    }

    #[test]
    fn variant_match_prefers_exact_properties() {
        let props = VariantProperties::from([("size".to_string(), "lg".to_string())]);
        let matched = set(Some("sm")).matching_variant(Some(&props)).map(|c| c.id.clone());
        assert_eq!(matched, Some(ComponentId::from("lg")));
    }

    #[test]
    fn variant_match_falls_back_to_default() {
        let props = VariantProperties::from([("size".to_string(), "xl".to_string())]);
        let component_set = set(Some("sm"));
        assert_eq!(
            component_set.matching_variant(Some(&props)).map(|c| c.id.as_str()),
            Some("sm")
        );
        assert!(set(None).matching_variant(Some(&props)).is_none());
        assert!(set(None).matching_variant(None).is_none());
    }

    #[test]
    fn containers_are_walked_and_instances_expose_properties() {
        assert!(NodeKind::Section.is_container());
        assert!(!NodeKind::Text.is_container());
        assert!(NodeKind::Instance.capabilities().has_component_properties);
        assert!(!NodeKind::Frame.capabilities().has_component_properties);
        assert!(!NodeKind::Group.capabilities().has_fills);
    }

    #[test]
    fn text_values_parse_host_enums() {
        assert_eq!("UNDERLINE".parse(), Ok(TextDecoration::Underline));
        assert_eq!("small_caps".parse(), Ok(TextCase::SmallCaps));
        assert!("BOLD".parse::<TextCase>().is_err());
    }

    #[test]
    fn unknown_text_value_is_a_std_error() {
        let err: Box<dyn std::error::Error> = Box::new("BLINK".parse::<TextDecoration>().unwrap_err());
        assert_eq!(err.to_string(), "unknown text property value 'BLINK'");
        assert!(err.source().is_none());
    }
}
