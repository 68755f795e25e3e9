//! Target themes and their collection bindings

use crate::variable::{Mode, Variable};
use reskin_core::CollectionId;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("theme '{theme}' declares collection '{collection}' more than once")]
    DuplicateCollection { theme: String, collection: String },

    #[error("theme '{0}' appears more than once in the catalog")]
    DuplicateTheme(String),

    #[error("theme '{0}' not found")]
    ThemeNotFound(String),
}

/// A named group of variables mirroring one source-library collection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionBinding {
    pub name: String,
    pub key: String,
    /// Underlying collection id, used to pin explicit modes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CollectionId>,
    #[serde(default)]
    pub variables: Option<Vec<Variable>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modes: Option<Vec<Mode>>,
}

impl CollectionBinding {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            id: None,
            variables: None,
            modes: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<CollectionId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn with_modes(mut self, modes: Vec<Mode>) -> Self {
        self.modes = Some(modes);
        self
    }

    /// Variables of this binding (empty when the library returned none)
    pub fn variables(&self) -> &[Variable] {
        self.variables.as_deref().unwrap_or_default()
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables().iter().find(|v| v.name == name)
    }
}

/// One brand's token library
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub collections: Vec<CollectionBinding>,
}

impl Theme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            favorite: false,
            collections: Vec::new(),
        }
    }

    pub fn with_collection(mut self, collection: CollectionBinding) -> Self {
        self.collections.push(collection);
        self
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionBinding> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Check that collection names are unique within the theme
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = FxHashSet::default();
        for collection in &self.collections {
            if !seen.insert(collection.name.as_str()) {
                return Err(CatalogError::DuplicateCollection {
                    theme: self.name.clone(),
                    collection: collection.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Validate a whole catalog: unique theme names, unique collections per theme
    pub fn validate_catalog(themes: &[Theme]) -> Result<(), CatalogError> {
        let mut seen = FxHashSet::default();
        for theme in themes {
            if !seen.insert(theme.name.as_str()) {
                return Err(CatalogError::DuplicateTheme(theme.name.clone()));
            }
            theme.validate()?;
        }
        Ok(())
    }

    /// Find a theme by name in a catalog
    pub fn find<'a>(themes: &'a [Theme], name: &str) -> Result<&'a Theme, CatalogError> {
        themes
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| CatalogError::ThemeNotFound(name.to_string()))
    }
}
