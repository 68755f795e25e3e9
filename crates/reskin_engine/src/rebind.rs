//! Phase 2: variable rebinding
//!
//! Every bound-variable reference left on the refreshed node list is pointed at
//! the equivalently-named variable of the target theme. Component-property
//! slots on instances are staged and committed in one write per node. Node
//! tasks run concurrently on the current thread and each returns its own
//! [`NodeOutcome`]; outcomes are merged in input order once all have settled.

use crate::config::EngineConfig;
use crate::error::{HostError, ThemeError};
use crate::events::{ApplyListener, Phase, ThemeEvent};
use crate::host::DocumentHost;
use crate::log::{ApplicationLog, ErrorKind, PhaseReport};
use futures::future::join_all;
use indexmap::IndexSet;
use reskin_core::{CollectionId, ModeId, NodeId, Paint, PaintField, PaintSlot, VariableId};
use reskin_theme::{ThemeDepth, ThemeIndex, Variable, VariableAlias, VariableCollection};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::ops::AddAssign;

/// Counters for one rebinding pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebindStats {
    /// Direct bindings pointed at a target variable
    pub rebound: usize,
    /// Component-property slots pointed at a target variable
    pub component_slots: usize,
    /// References already bound to the target variable
    pub already_themed: usize,
    /// References skipped because the depth excluded them
    pub filtered: usize,
}

impl AddAssign for RebindStats {
    fn add_assign(&mut self, other: Self) {
        self.rebound += other.rebound;
        self.component_slots += other.component_slots;
        self.already_themed += other.already_themed;
        self.filtered += other.filtered;
    }
}

/// Result of processing one node
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeOutcome {
    pub node: NodeId,
    pub log: ApplicationLog,
    pub stats: RebindStats,
}

impl NodeOutcome {
    fn new(node: &NodeId) -> Self {
        Self {
            node: node.clone(),
            ..Self::default()
        }
    }
}

/// Where a source reference lives in the document
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingSite<'s> {
    /// A bound node field (`fills`, `itemSpacing`, ...)
    Field(&'s str),
    /// A component property slot on an instance
    ComponentProperty(&'s str),
}

/// Everything needed to find a source variable's counterpart in the target
#[derive(Clone, Debug, PartialEq)]
pub struct SourceVariableConfig {
    /// Name of the source variable's collection
    pub collection: String,
    /// Name of the source variable
    pub path: String,
    /// Names of the modes pinned on the node, as seen from the source collection
    pub explicit_modes: Vec<String>,
    pub variable: Variable,
}

impl SourceVariableConfig {
    pub fn variable_id(&self) -> &VariableId {
        &self.variable.id
    }
}

/// What to do with one source reference
#[derive(Clone, Copy, Debug)]
pub enum Target<'v> {
    Rebind(&'v Variable),
    /// Already bound to the target variable
    AlreadyThemed,
    /// Excluded by the theme depth
    Filtered,
}

/// Phase 2 driver
pub struct VariableRebinder<'a, H: DocumentHost + ?Sized> {
    host: &'a H,
    config: &'a EngineConfig,
    index: &'a ThemeIndex,
    depth: ThemeDepth,
    listener: &'a dyn ApplyListener,
}

impl<'a, H: DocumentHost + ?Sized> VariableRebinder<'a, H> {
    pub fn new(
        host: &'a H,
        config: &'a EngineConfig,
        index: &'a ThemeIndex,
        depth: ThemeDepth,
        listener: &'a dyn ApplyListener,
    ) -> Self {
        Self {
            host,
            config,
            index,
            depth,
            listener,
        }
    }

    /// Rebind every reference on `nodes`
    pub async fn run(&self, nodes: &[NodeId]) -> PhaseReport<RebindStats> {
        let total = nodes.len();
        let done = Cell::new(0usize);

        let tasks = nodes.iter().map(|id| {
            let done = &done;
            async move {
                let outcome = self.rebind_node(id).await;
                tokio::task::yield_now().await;

                done.set(done.get() + 1);
                self.listener.on_event(&ThemeEvent::Progress {
                    phase: Phase::Variables,
                    done: done.get(),
                    total,
                });
                outcome
            }
        });

        let outcomes = join_all(tasks).await;

        let mut log = ApplicationLog::new();
        let mut stats = RebindStats::default();
        for outcome in outcomes {
            log.append(outcome.log);
            stats += outcome.stats;
        }

        tracing::info!(
            "rebind pass: {} nodes, {} rebound, {} slots, {} already themed, {} errors",
            total,
            stats.rebound,
            stats.component_slots,
            stats.already_themed,
            log.len()
        );

        PhaseReport { log, stats }
    }

    /// Process one node: component slots first, then direct bindings
    pub async fn rebind_node(&self, id: &NodeId) -> NodeOutcome {
        let mut outcome = NodeOutcome::new(id);
        let Some(node) = self.host.node(id) else {
            return outcome;
        };

        if node.capabilities().has_component_properties {
            self.rebind_component_properties(id, &mut outcome).await;
        }
        self.rebind_fields(id, &mut outcome).await;

        outcome
    }

    // ========== Component properties ==========

    async fn rebind_component_properties(&self, id: &NodeId, outcome: &mut NodeOutcome) {
        let mut staged: Vec<(String, VariableAlias)> = Vec::new();

        for (name, property) in self.host.component_properties(id) {
            let Some(alias) = property.bound_variable else {
                continue;
            };

            let site = BindingSite::ComponentProperty(&name);
            let source = match self.source_config(id, &alias.id).await {
                Ok(source) => source,
                Err(err) => {
                    outcome.log.push(err);
                    continue;
                }
            };

            match self.resolve_target(id, &source, site) {
                Ok(Target::Rebind(target)) => staged.push((name.clone(), target.alias())),
                Ok(skip) => record_skip(&mut outcome.stats, skip),
                Err(err) => outcome.log.push(err),
            }
        }

        if staged.is_empty() {
            return;
        }

        let count = staged.len();
        match self.host.set_component_property_aliases(id, staged) {
            Ok(()) => outcome.stats.component_slots += count,
            Err(err) => outcome
                .log
                .push(ThemeError::host(id, "Error setting component properties", &err)),
        }
    }

    // ========== Direct bindings ==========

    async fn rebind_fields(&self, id: &NodeId, outcome: &mut NodeOutcome) {
        for (field, aliases) in self.host.bound_variables(id) {
            let unique: IndexSet<VariableId> = aliases.into_iter().map(|a| a.id).collect();

            for source_id in unique {
                let source = match self.source_config(id, &source_id).await {
                    Ok(source) => source,
                    Err(err) => {
                        outcome.log.push(err);
                        continue;
                    }
                };

                let target = match self.resolve_target(id, &source, BindingSite::Field(&field)) {
                    Ok(Target::Rebind(target)) => target,
                    Ok(skip) => {
                        record_skip(&mut outcome.stats, skip);
                        continue;
                    }
                    Err(err) => {
                        outcome.log.push(err);
                        continue;
                    }
                };

                match self.write_binding(id, &field, &source, target) {
                    Ok(true) => outcome.stats.rebound += 1,
                    Ok(false) => continue,
                    Err(err) => {
                        outcome.log.push(err);
                        continue;
                    }
                }

                if !source.explicit_modes.is_empty() {
                    self.pin_modes(id, &source, target, &mut outcome.log).await;
                }
            }
        }
    }

    /// Point `field` at `target`; `false` when no paint on the node carried the source binding
    fn write_binding(
        &self,
        id: &NodeId,
        field: &str,
        source: &SourceVariableConfig,
        target: &Variable,
    ) -> Result<bool, ThemeError> {
        let Some(paint_field) = PaintField::from_field(field) else {
            return self
                .host
                .set_bound_variable(id, field, target)
                .map(|()| true)
                .map_err(|err| ThemeError::host(id, &format!("Error binding {field}"), &err));
        };

        let paints = match self.host.paints(id, paint_field) {
            Some(PaintSlot::Paints(paints)) => paints,
            Some(PaintSlot::Mixed) | None => {
                return Err(ThemeError::new(
                    ErrorKind::UnknownError,
                    id,
                    format!("Cannot rebind {field}: paints are mixed or unavailable"),
                ))
            }
        };

        let mut replaced = false;
        let paints: Vec<Paint> = paints
            .into_iter()
            .map(|paint| match paint {
                Paint::Solid(solid) if solid.bound_color.as_ref() == Some(source.variable_id()) => {
                    replaced = true;
                    Paint::Solid(self.host.bind_paint_to_variable(&solid, target))
                }
                other => other,
            })
            .collect();

        if !replaced {
            tracing::trace!("{id}: no {field} paint bound to {}", source.variable_id());
            return Ok(false);
        }

        self.host
            .set_paints(id, paint_field, paints)
            .map(|()| true)
            .map_err(|err| ThemeError::host(id, &format!("Error binding {field}"), &err))
    }

    async fn pin_modes(
        &self,
        id: &NodeId,
        source: &SourceVariableConfig,
        target: &Variable,
        log: &mut ApplicationLog,
    ) {
        let collection_id = self
            .index
            .collection_id(&source.collection)
            .cloned()
            .unwrap_or_else(|| target.collection_id.clone());

        // Theme bindings may omit modes; ask the host for the live collection
        let live = if self.index.modes(&source.collection).is_empty() {
            self.host
                .variable_collection_by_id(&collection_id)
                .await
                .ok()
                .flatten()
        } else {
            None
        };

        for mode_name in &source.explicit_modes {
            let mode_id: Option<ModeId> = self
                .index
                .mode_id(&source.collection, mode_name)
                .cloned()
                .or_else(|| {
                    live.as_ref()
                        .and_then(|c| c.mode_by_name(mode_name))
                        .map(|m| m.mode_id.clone())
                });

            let Some(mode_id) = mode_id else {
                log.push(ThemeError::new(
                    ErrorKind::ModeNotFound,
                    id,
                    format!(
                        "Mode '{mode_name}' not found in target collection {}",
                        source.collection
                    ),
                ));
                continue;
            };

            if let Err(err) = self.host.set_explicit_variable_mode(id, &collection_id, &mode_id) {
                log.push(ThemeError::host(id, "Error setting explicit mode", &err));
            }
        }
    }

    // ========== Resolution ==========

    /// Read a source variable, its collection name and the node's pinned mode names
    pub async fn source_config(
        &self,
        id: &NodeId,
        variable_id: &VariableId,
    ) -> Result<SourceVariableConfig, ThemeError> {
        let missing = |err: HostError| {
            ThemeError::new(
                ErrorKind::UnknownError,
                id,
                format!("Failed to read source variable {variable_id}: {err}"),
            )
        };

        let variable = self
            .host
            .variable_by_id(variable_id)
            .await
            .and_then(|v| v.ok_or_else(|| HostError::VariableNotFound(variable_id.clone())))
            .map_err(missing)?;

        let collection = self
            .host
            .variable_collection_by_id(&variable.collection_id)
            .await
            .and_then(|c| c.ok_or_else(|| HostError::CollectionNotFound(variable.collection_id.clone())))
            .map_err(missing)?;

        let pinned = self.host.explicit_variable_modes(id);
        let explicit_modes = mode_names(&pinned, &collection);

        Ok(SourceVariableConfig {
            collection: collection.name,
            path: variable.name.clone(),
            explicit_modes,
            variable,
        })
    }

    /// Target variable for a source reference, or the reason it needs no write
    pub fn resolve_target(
        &self,
        id: &NodeId,
        source: &SourceVariableConfig,
        site: BindingSite<'_>,
    ) -> Result<Target<'a>, ThemeError> {
        if self.depth.is_spacing_only() && !self.config.is_spacing_variable(&source.path) {
            return Ok(Target::Filtered);
        }

        let target = self
            .index
            .variable(&source.collection, &source.path)
            .map_err(|err| ThemeError::from_lookup(id, err))?;

        if &target.id == source.variable_id() {
            tracing::trace!("{id}: {site:?} already bound to {}", target.id);
            return Ok(Target::AlreadyThemed);
        }

        Ok(Target::Rebind(target))
    }
}

fn record_skip(stats: &mut RebindStats, skip: Target<'_>) {
    match skip {
        Target::AlreadyThemed => stats.already_themed += 1,
        Target::Filtered => stats.filtered += 1,
        Target::Rebind(_) => {}
    }
}

/// Names of pinned modes that belong to `collection`, deduplicated in pin order
fn mode_names(pinned: &BTreeMap<CollectionId, ModeId>, collection: &VariableCollection) -> Vec<String> {
    let names: IndexSet<&str> = pinned
        .values()
        .filter_map(|mode| collection.mode_name(mode))
        .collect();
    names.into_iter().map(str::to_string).collect()
}
