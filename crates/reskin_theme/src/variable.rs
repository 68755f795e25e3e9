//! Variables, collections and modes

use reskin_core::{CollectionId, Color, ModeId, VariableId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value type a variable resolves to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolvedType {
    Boolean,
    Float,
    String,
    Color,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AliasType {
    #[default]
    #[serde(rename = "VARIABLE_ALIAS")]
    VariableAlias,
}

/// Reference to a variable, as found in bound-variable maps and alias values
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableAlias {
    #[serde(rename = "type", default)]
    pub kind: AliasType,
    pub id: VariableId,
}

impl VariableAlias {
    pub fn new(id: impl Into<VariableId>) -> Self {
        Self {
            kind: AliasType::VariableAlias,
            id: id.into(),
        }
    }
}

/// Raw per-mode value of a variable
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Boolean(bool),
    Float(f64),
    String(String),
    Alias(VariableAlias),
    Color(Color),
}

impl VariableValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            VariableValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&VariableAlias> {
        match self {
            VariableValue::Alias(alias) => Some(alias),
            _ => None,
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Boolean(b) => write!(f, "{b}"),
            VariableValue::Float(n) => write!(f, "{n}"),
            VariableValue::String(s) => f.write_str(s),
            VariableValue::Alias(alias) => write!(f, "alias({})", alias.id),
            VariableValue::Color(c) => write!(f, "rgba({}, {}, {}, {})", c.r, c.g, c.b, c.a),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(s: &str) -> Self {
        VariableValue::String(s.to_string())
    }
}

impl From<Color> for VariableValue {
    fn from(color: Color) -> Self {
        VariableValue::Color(color)
    }
}

impl From<f64> for VariableValue {
    fn from(n: f64) -> Self {
        VariableValue::Float(n)
    }
}

/// A named mode of a variable collection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mode {
    pub mode_id: ModeId,
    pub name: String,
}

impl Mode {
    pub fn new(mode_id: impl Into<ModeId>, name: impl Into<String>) -> Self {
        Self {
            mode_id: mode_id.into(),
            name: name.into(),
        }
    }
}

/// A design token
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: VariableId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub resolved_type: ResolvedType,
    #[serde(rename = "variableCollectionId")]
    pub collection_id: CollectionId,
    #[serde(default)]
    pub values_by_mode: BTreeMap<ModeId, VariableValue>,
    #[serde(default)]
    pub remote: bool,
}

impl Variable {
    pub fn new(
        id: impl Into<VariableId>,
        name: impl Into<String>,
        resolved_type: ResolvedType,
        collection_id: impl Into<CollectionId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            key: None,
            resolved_type,
            collection_id: collection_id.into(),
            values_by_mode: BTreeMap::new(),
            remote: false,
        }
    }

    pub fn with_value(mut self, mode: impl Into<ModeId>, value: impl Into<VariableValue>) -> Self {
        self.values_by_mode.insert(mode.into(), value.into());
        self
    }

    pub fn alias(&self) -> VariableAlias {
        VariableAlias::new(self.id.clone())
    }
}

/// A variable collection as reported by the host
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableCollection {
    pub id: CollectionId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub modes: Vec<Mode>,
    #[serde(default)]
    pub default_mode_id: Option<ModeId>,
    #[serde(default)]
    pub variable_ids: Vec<VariableId>,
    #[serde(default)]
    pub remote: bool,
}

impl VariableCollection {
    pub fn new(id: impl Into<CollectionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            key: None,
            modes: Vec::new(),
            default_mode_id: None,
            variable_ids: Vec::new(),
            remote: false,
        }
    }

    pub fn mode_name(&self, mode_id: &ModeId) -> Option<&str> {
        self.modes
            .iter()
            .find(|m| &m.mode_id == mode_id)
            .map(|m| m.name.as_str())
    }

    pub fn mode_by_name(&self, name: &str) -> Option<&Mode> {
        self.modes.iter().find(|m| m.name == name)
    }

    /// Default mode, falling back to the first declared mode
    pub fn default_mode(&self) -> Option<&ModeId> {
        self.default_mode_id
            .as_ref()
            .or_else(|| self.modes.first().map(|m| &m.mode_id))
    }
}
