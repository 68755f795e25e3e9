//! Engine error types

use crate::log::{ErrorKind, ErrorRecord};
use reskin_core::{CollectionId, ModeId, NodeId, VariableId};
use reskin_theme::LookupError;
use thiserror::Error;

/// Failure reported by a document host capability
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("variable not found: {0}")]
    VariableNotFound(VariableId),

    #[error("variable collection not found: {0}")]
    CollectionNotFound(CollectionId),

    #[error("mode {mode} not found in collection {collection}")]
    ModeNotFound { collection: CollectionId, mode: ModeId },

    #[error("no component or component set with key: {0}")]
    ComponentNotFound(String),

    #[error("font not loaded for node {0}")]
    FontNotLoaded(NodeId),

    #[error("{operation} is not supported on node {node}")]
    Unsupported { node: NodeId, operation: &'static str },

    #[error("failed to resolve variable {variable}: {reason}")]
    Resolve { variable: VariableId, reason: String },

    #[error("host error: {0}")]
    Other(String),
}

/// Node-scoped failure recorded in the application log
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ThemeError {
    pub kind: ErrorKind,
    pub node: NodeId,
    pub message: String,
}

impl ThemeError {
    pub fn new(kind: ErrorKind, node: &NodeId, message: impl Into<String>) -> Self {
        Self {
            kind,
            node: node.clone(),
            message: message.into(),
        }
    }

    pub fn variable_not_found(node: &NodeId, path: &str) -> Self {
        Self::new(
            ErrorKind::VariableNotFound,
            node,
            format!("Variable not found for path: {path}"),
        )
    }

    pub fn collection_not_found(node: &NodeId, collection: &str) -> Self {
        Self::new(
            ErrorKind::CollectionNotFound,
            node,
            format!("Collection not found in target theme: {collection}"),
        )
    }

    /// Map a target-index miss onto the log taxonomy
    pub fn from_lookup(node: &NodeId, error: LookupError) -> Self {
        match error {
            LookupError::CollectionNotFound(collection) => Self::collection_not_found(node, &collection),
            LookupError::VariableNotFound { path, .. } => Self::variable_not_found(node, &path),
        }
    }

    /// A stale or unresolvable variable; fatal for one token/property only
    pub fn stale_variable(node: &NodeId, path: &str, source: &HostError) -> Self {
        Self::new(
            ErrorKind::UnknownError,
            node,
            format!("Failed to resolve variable for path: {path}. Variable may be stale ({source})"),
        )
    }

    pub fn host(node: &NodeId, context: &str, source: &HostError) -> Self {
        Self::new(ErrorKind::UnknownError, node, format!("{context}: {source}"))
    }
}

impl From<ThemeError> for ErrorRecord {
    fn from(error: ThemeError) -> Self {
        ErrorRecord {
            message: error.message,
            node: error.node,
            kind: error.kind,
        }
    }
}

/// Result type for host operations
pub type HostResult<T> = std::result::Result<T, HostError>;
