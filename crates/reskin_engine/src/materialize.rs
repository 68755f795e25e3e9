//! Local materialization
//!
//! Copies a target theme's collections into document-local storage so the
//! document keeps working without the library. Collections and variables are
//! matched by name, never by id, so materializing twice updates in place.

use crate::config::EngineConfig;
use crate::error::{HostError, ThemeError};
use crate::host::DocumentHost;
use crate::log::{ApplicationLog, ErrorKind, PhaseReport};
use reskin_core::{CollectionId, ModeId, NodeId};
use reskin_theme::{CollectionBinding, Mode, Theme, Variable, VariableCollection};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Counters for one materialization pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaterializeStats {
    pub collections_created: usize,
    pub modes_added: usize,
    pub variables_created: usize,
    pub variables_updated: usize,
    /// Collections left bound to the library after a failure
    pub fallbacks: usize,
}

/// Failure while copying one collection
#[derive(Error, Debug)]
enum MaterializeError {
    #[error(transparent)]
    Host(#[from] HostError),
    /// The local collection exists but its modes or variables are incomplete
    #[error("{source} (local collection {collection} was partially created)")]
    Partial {
        collection: CollectionId,
        source: HostError,
    },
}

/// Copies target collections into the document
pub struct LocalMaterializer<'a, H: DocumentHost + ?Sized> {
    host: &'a H,
    config: &'a EngineConfig,
    /// Node failures are attributed to (the first selected root)
    scope: NodeId,
}

impl<'a, H: DocumentHost + ?Sized> LocalMaterializer<'a, H> {
    pub fn new(host: &'a H, config: &'a EngineConfig, scope: NodeId) -> Self {
        Self { host, config, scope }
    }

    /// Materialize every collection of `theme`, returning the theme to apply
    ///
    /// Collections that fail keep their library binding in the returned theme.
    pub async fn run(&self, theme: &Theme) -> (Theme, PhaseReport<MaterializeStats>) {
        let mut log = ApplicationLog::new();
        let mut stats = MaterializeStats::default();
        let mut materialized = Theme {
            name: theme.name.clone(),
            favorite: theme.favorite,
            collections: Vec::with_capacity(theme.collections.len()),
        };

        let mut locals = match self.host.local_variable_collections().await {
            Ok(locals) => locals,
            Err(err) => {
                tracing::warn!("materialize: cannot list local collections: {err}");
                log.push(ThemeError::host(&self.scope, "Failed to list local collections", &err));
                stats.fallbacks = theme.collections.len();
                return (theme.clone(), PhaseReport { log, stats });
            }
        };

        for binding in &theme.collections {
            if binding.variables().is_empty() {
                materialized.collections.push(binding.clone());
                continue;
            }

            match self.materialize_collection(binding, &mut locals, &mut stats).await {
                Ok(local) => materialized.collections.push(local),
                Err(err) => {
                    tracing::warn!(
                        "materialize: collection '{}' stays remote: {err}",
                        binding.name
                    );
                    log.push(ThemeError::new(
                        ErrorKind::UnknownError,
                        &self.scope,
                        format!("Failed to materialize collection {}: {err}", binding.name),
                    ));
                    stats.fallbacks += 1;
                    materialized.collections.push(binding.clone());
                }
            }
        }

        tracing::info!(
            "materialized '{}': {} collections created, {} variables created, {} updated",
            theme.name,
            stats.collections_created,
            stats.variables_created,
            stats.variables_updated
        );

        (materialized, PhaseReport { log, stats })
    }

    async fn materialize_collection(
        &self,
        binding: &CollectionBinding,
        locals: &mut Vec<VariableCollection>,
        stats: &mut MaterializeStats,
    ) -> Result<CollectionBinding, MaterializeError> {
        let remote_modes = self.remote_modes(binding).await?;

        let existing = locals
            .iter()
            .position(|c| !c.remote && c.name == binding.name);
        let (local, created) = match existing {
            Some(i) => (locals[i].clone(), false),
            None => {
                let local = self.host.create_variable_collection(&binding.name)?;
                stats.collections_created += 1;
                (local, true)
            }
        };

        let collection = local.id.clone();
        self.populate_collection(binding, &remote_modes, local, existing, locals, stats)
            .await
            .map_err(|source| {
                if created {
                    MaterializeError::Partial { collection, source }
                } else {
                    MaterializeError::Host(source)
                }
            })
    }

    /// Copy modes and variables of `binding` into `local`, then record it in `locals`
    ///
    /// `existing` is the index of `local` in `locals`, `None` when it was just created.
    async fn populate_collection(
        &self,
        binding: &CollectionBinding,
        remote_modes: &[Mode],
        mut local: VariableCollection,
        existing: Option<usize>,
        locals: &mut Vec<VariableCollection>,
        stats: &mut MaterializeStats,
    ) -> Result<CollectionBinding, HostError> {
        // Remote mode id → local mode id, matched by mode name
        let mut mode_map: FxHashMap<ModeId, ModeId> = FxHashMap::default();
        for mode in remote_modes {
            let local_mode = match local.mode_by_name(&mode.name) {
                Some(found) => found.mode_id.clone(),
                None => {
                    let id = self.host.add_mode(&local.id, &mode.name)?;
                    local.modes.push(Mode::new(id.clone(), mode.name.clone()));
                    stats.modes_added += 1;
                    id
                }
            };
            mode_map.insert(mode.mode_id.clone(), local_mode);
        }

        if existing.is_none() {
            self.drop_default_mode(&mut local, remote_modes)?;
        }

        let mut by_name: FxHashMap<String, Variable> = FxHashMap::default();
        for id in &local.variable_ids {
            if let Some(variable) = self.host.variable_by_id(id).await? {
                by_name.insert(variable.name.clone(), variable);
            }
        }

        let mut variables = Vec::with_capacity(binding.variables().len());
        for remote in binding.variables() {
            let mut variable = match by_name.remove(&remote.name) {
                Some(variable) => {
                    stats.variables_updated += 1;
                    variable
                }
                None => {
                    let variable =
                        self.host
                            .create_variable(&remote.name, &local.id, remote.resolved_type)?;
                    local.variable_ids.push(variable.id.clone());
                    stats.variables_created += 1;
                    variable
                }
            };

            for (remote_mode, value) in &remote.values_by_mode {
                let Some(local_mode) = mode_map.get(remote_mode) else {
                    continue;
                };
                self.host
                    .set_variable_value_for_mode(&variable.id, local_mode, value.clone())?;
                variable.values_by_mode.insert(local_mode.clone(), value.clone());
            }

            variables.push(variable);
        }

        let modes = local.modes.clone();
        let id = local.id.clone();
        match existing {
            Some(i) => locals[i] = local,
            None => locals.push(local),
        }

        Ok(CollectionBinding {
            name: binding.name.clone(),
            key: binding.key.clone(),
            id: Some(id),
            variables: Some(variables),
            modes: Some(modes),
        })
    }

    /// Modes of the library collection behind `binding`
    async fn remote_modes(&self, binding: &CollectionBinding) -> Result<Vec<Mode>, HostError> {
        if let Some(modes) = binding.modes.as_ref().filter(|m| !m.is_empty()) {
            return Ok(modes.clone());
        }

        let id = binding
            .id
            .clone()
            .or_else(|| binding.variables().first().map(|v| v.collection_id.clone()))
            .ok_or_else(|| HostError::Other(format!("collection {} has no id", binding.name)))?;

        let collection = self
            .host
            .variable_collection_by_id(&id)
            .await?
            .ok_or_else(|| HostError::CollectionNotFound(id.clone()))?;
        Ok(collection.modes)
    }

    /// Remove the placeholder mode a new collection starts with
    fn drop_default_mode(&self, local: &mut VariableCollection, remote_modes: &[Mode]) -> Result<(), HostError> {
        let placeholder = &self.config.default_mode_name;
        if remote_modes.iter().any(|m| &m.name == placeholder) {
            return Ok(());
        }

        let Some(mode) = local.mode_by_name(placeholder).map(|m| m.mode_id.clone()) else {
            return Ok(());
        };

        self.host.remove_mode(&local.id, &mode)?;
        local.modes.retain(|m| m.mode_id != mode);
        if local.default_mode_id.as_ref() == Some(&mode) {
            local.default_mode_id = local.modes.first().map(|m| m.mode_id.clone());
        }
        Ok(())
    }
}
