//! Application log
//!
//! Each phase returns its own [`ApplicationLog`]; the orchestrator concatenates
//! them. A log lives for one apply run and is never shared between runs.

use crate::error::ThemeError;
use reskin_core::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure taxonomy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    VariableNotFound,
    CollectionNotFound,
    ComponentImportFailed,
    VariantMatchFailed,
    GradientParseFailed,
    ProvenanceKeyMissing,
    /// Pinned mode has no same-named mode in the target collection
    ModeNotFound,
    /// Fills were mixed; gradient applied as the only fill
    MixedFills,
    UnknownError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One logged failure, with the node it happened on
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
    pub node: NodeId,
    pub kind: ErrorKind,
}

/// Ordered, append-only list of failures for one run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationLog {
    records: Vec<ErrorRecord>,
}

impl ApplicationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ThemeError) {
        tracing::debug!(kind = %error.kind, node = %error.node, "{}", error.message);
        self.records.push(error.into());
    }

    /// Append another log after this one, keeping order
    pub fn append(&mut self, mut other: ApplicationLog) {
        self.records.append(&mut other.records);
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count(&self, kind: ErrorKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }

    pub fn for_node<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item = &'a ErrorRecord> + 'a {
        self.records.iter().filter(move |r| &r.node == node)
    }

    pub fn into_records(self) -> Vec<ErrorRecord> {
        self.records
    }
}

/// Log and counters returned by one phase
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhaseReport<S> {
    pub log: ApplicationLog,
    pub stats: S,
}

impl Extend<ThemeError> for ApplicationLog {
    fn extend<T: IntoIterator<Item = ThemeError>>(&mut self, iter: T) {
        for error in iter {
            self.push(error);
        }
    }
}

impl FromIterator<ThemeError> for ApplicationLog {
    fn from_iter<T: IntoIterator<Item = ThemeError>>(iter: T) -> Self {
        let mut log = Self::new();
        log.extend(iter);
        log
    }
}

impl<'a> IntoIterator for &'a ApplicationLog {
    type Item = &'a ErrorRecord;
    type IntoIter = std::slice::Iter<'a, ErrorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
