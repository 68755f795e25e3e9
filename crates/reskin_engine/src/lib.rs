//! Reskin Engine
//!
//! Re-skins a design document to a target theme.
//!
//! # Phases
//!
//! An apply run walks the host's current selection twice:
//!
//! 1. **Metadata styling** ([`MetadataApplier`]): token bundles attached to nodes
//!    drive text decoration/case, gradient overlays, icon swaps and component swaps.
//! 2. **Variable rebinding** ([`VariableRebinder`]): every bound-variable reference
//!    is pointed at the same-named variable of the target theme.
//!
//! With [`ThemeDepth::Local`] the target collections are first copied into the
//! document ([`LocalMaterializer`]).
//!
//! Failures never abort a run. They are collected per node into an
//! [`ApplicationLog`] returned with the [`ApplyReport`].
//!
//! # Example
//!
//! ```rust,no_run
//! use reskin_engine::{apply_theme, MemoryDocument};
//! use reskin_theme::{Theme, ThemeDepth};
//!
//! # async fn run(snapshot: &str, theme: &Theme) -> Result<(), serde_json::Error> {
//! let document = MemoryDocument::from_json(snapshot)?;
//! let report = apply_theme(&document, theme, ThemeDepth::Full).await;
//! for record in &report.log {
//!     eprintln!("{} [{}] {}", record.node, record.kind, record.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod apply;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod log;
pub mod materialize;
pub mod memory;
pub mod metadata;
pub mod rebind;
pub mod search;
pub mod tokens;
pub mod traversal;

pub use apply::{apply_theme, ApplyReport, ThemeApplier};
pub use config::{ConfigError, EngineConfig};
pub use error::{HostError, HostResult, ThemeError};
pub use events::{ApplyListener, NoopListener, Phase, ThemeEvent};
pub use host::{
    BoundVariables, Capabilities, ComponentInfo, ComponentProperty, ComponentPropertyKind, ComponentSet,
    ComponentSetSummary, DocumentHost, NodeInfo, NodeKind, TextCase, TextDecoration, VariantProperties,
};
pub use log::{ApplicationLog, ErrorKind, ErrorRecord, PhaseReport};
pub use materialize::{LocalMaterializer, MaterializeStats};
pub use memory::{ComponentSetRecord, DocumentSnapshot, MemoryDocument, NodeRecord, WriteCounts};
pub use metadata::{MetadataApplier, MetadataStats};
pub use rebind::{BindingSite, NodeOutcome, RebindStats, SourceVariableConfig, Target, VariableRebinder};
pub use search::{find_nodes_with_variable, list_local_variables, LocalVariable, VariableUsage};
pub use tokens::{read_token_json, StyleToken, TokenBundle};
pub use traversal::{flatten_nodes, flatten_selection};

pub use reskin_theme::{Theme, ThemeDepth};
