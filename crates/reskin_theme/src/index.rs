//! Constant-time target lookups
//!
//! Built once per apply run from the target [`Theme`], so per-property
//! resolution never scans variable lists.

use crate::theme::Theme;
use crate::variable::{Mode, Variable};
use reskin_core::{CollectionId, ModeId};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Why a target lookup failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("collection not found in target theme: {0}")]
    CollectionNotFound(String),

    #[error("variable not found for path: {path} (collection {collection})")]
    VariableNotFound { collection: String, path: String },
}

#[derive(Clone, Debug, Default)]
struct CollectionEntry {
    id: Option<CollectionId>,
    modes: Vec<Mode>,
}

/// `(collection name, variable name) → Variable` index over one theme
#[derive(Clone, Debug, Default)]
pub struct ThemeIndex {
    theme: String,
    collections: FxHashMap<String, CollectionEntry>,
    variables: FxHashMap<(String, String), Variable>,
}

impl ThemeIndex {
    pub fn build(theme: &Theme) -> Self {
        let mut collections = FxHashMap::default();
        let mut variables = FxHashMap::default();

        for binding in &theme.collections {
            let id = binding
                .id
                .clone()
                .or_else(|| binding.variables().first().map(|v| v.collection_id.clone()));

            collections.insert(
                binding.name.clone(),
                CollectionEntry {
                    id,
                    modes: binding.modes.clone().unwrap_or_default(),
                },
            );

            for variable in binding.variables() {
                // First declaration wins, matching a linear find over the list
                variables
                    .entry((binding.name.clone(), variable.name.clone()))
                    .or_insert_with(|| variable.clone());
            }
        }

        tracing::debug!(
            "ThemeIndex::build - theme '{}': {} collections, {} variables",
            theme.name,
            collections.len(),
            variables.len()
        );

        Self {
            theme: theme.name.clone(),
            collections,
            variables,
        }
    }

    pub fn theme_name(&self) -> &str {
        &self.theme
    }

    pub fn has_collection(&self, collection: &str) -> bool {
        self.collections.contains_key(collection)
    }

    /// Look up the equivalently-named variable in a same-named collection
    pub fn variable(&self, collection: &str, path: &str) -> Result<&Variable, LookupError> {
        if !self.collections.contains_key(collection) {
            return Err(LookupError::CollectionNotFound(collection.to_string()));
        }
        self.variables
            .get(&(collection.to_string(), path.to_string()))
            .ok_or_else(|| LookupError::VariableNotFound {
                collection: collection.to_string(),
                path: path.to_string(),
            })
    }

    /// Collection id of a target collection
    pub fn collection_id(&self, collection: &str) -> Option<&CollectionId> {
        self.collections.get(collection).and_then(|c| c.id.as_ref())
    }

    /// Modes declared for a target collection
    pub fn modes(&self, collection: &str) -> &[Mode] {
        self.collections
            .get(collection)
            .map(|c| c.modes.as_slice())
            .unwrap_or_default()
    }

    /// Resolve a mode name to the target collection's own mode id
    pub fn mode_id(&self, collection: &str, mode_name: &str) -> Option<&ModeId> {
        self.modes(collection)
            .iter()
            .find(|m| m.name == mode_name)
            .map(|m| &m.mode_id)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
