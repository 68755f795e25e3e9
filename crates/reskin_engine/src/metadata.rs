//! Phase 1: metadata styling
//!
//! Applies the token bundle authors attach to nodes: text decoration and case,
//! gradient overlays, icon swaps and component swaps. Every token is handled in
//! isolation; a failure is logged against its node and the phase moves on.

use crate::config::EngineConfig;
use crate::error::ThemeError;
use crate::events::{ApplyListener, Phase, ThemeEvent};
use crate::host::{DocumentHost, NodeInfo, NodeKind, TextCase, TextDecoration};
use crate::log::{ApplicationLog, ErrorKind, PhaseReport};
use crate::tokens::{read_token_json, StyleToken, TokenBundle};
use reskin_core::{parse_css_gradient, NodeId, Paint, PaintField, PaintSlot};
use reskin_theme::{ThemeIndex, Variable};
use serde::Deserialize;

/// Sentinel gradient value that removes a previously applied overlay
const GRADIENT_NONE: &str = "NONE";

/// Counters for one metadata pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetadataStats {
    pub nodes_with_tokens: usize,
    pub text_properties: usize,
    pub gradients_added: usize,
    pub gradients_removed: usize,
    pub components_swapped: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TextProperty {
    Decoration,
    Case,
}

impl TextProperty {
    fn label(self) -> &'static str {
        match self {
            TextProperty::Decoration => "textDecoration",
            TextProperty::Case => "textCase",
        }
    }
}

/// Provenance recorded in a themed component's description
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Provenance {
    source_key: Option<String>,
}

/// Phase 1 driver
pub struct MetadataApplier<'a, H: DocumentHost + ?Sized> {
    host: &'a H,
    config: &'a EngineConfig,
    index: &'a ThemeIndex,
    listener: &'a dyn ApplyListener,
}

impl<'a, H: DocumentHost + ?Sized> MetadataApplier<'a, H> {
    pub fn new(
        host: &'a H,
        config: &'a EngineConfig,
        index: &'a ThemeIndex,
        listener: &'a dyn ApplyListener,
    ) -> Self {
        Self {
            host,
            config,
            index,
            listener,
        }
    }

    /// Apply token metadata to every tagged node in `nodes`
    pub async fn run(&self, nodes: &[NodeId]) -> PhaseReport<MetadataStats> {
        let mut log = ApplicationLog::new();
        let mut stats = MetadataStats::default();

        let tagged: Vec<(&NodeId, String)> = nodes
            .iter()
            .filter_map(|id| read_token_json(self.host, id, self.config).map(|raw| (id, raw)))
            .collect();
        stats.nodes_with_tokens = tagged.len();
        let total = tagged.len();

        for (done, (id, raw)) in tagged.into_iter().enumerate() {
            if let Some(node) = self.host.node(id) {
                self.apply_node(&node, &raw, &mut log, &mut stats).await;
            }
            self.listener.on_event(&ThemeEvent::Progress {
                phase: Phase::Metadata,
                done: done + 1,
                total,
            });
        }

        tracing::info!(
            "metadata pass: {} tagged nodes, {} swaps, {} errors",
            stats.nodes_with_tokens,
            stats.components_swapped,
            log.len()
        );

        PhaseReport { log, stats }
    }

    async fn apply_node(
        &self,
        node: &NodeInfo,
        raw: &str,
        log: &mut ApplicationLog,
        stats: &mut MetadataStats,
    ) {
        let bundle = match TokenBundle::parse(raw) {
            Ok(bundle) => bundle,
            Err(err) => {
                log.push(ThemeError::new(
                    ErrorKind::UnknownError,
                    &node.id,
                    format!("Invalid token metadata: {err}"),
                ));
                return;
            }
        };

        if node.capabilities().has_text {
            self.apply_text_style(node, &bundle, log, stats).await;
        } else if let Some(icon) = &bundle.icon {
            match self.apply_icon_swap(node, icon).await {
                Ok(()) => stats.components_swapped += 1,
                Err(err) => log.push(err),
            }
        } else if let Some(component) = &bundle.component {
            match self.apply_component_swap(node, component).await {
                Ok(()) => stats.components_swapped += 1,
                Err(err) => log.push(err),
            }
        } else if let Some(overlay) = &bundle.gradient_overlay {
            if let Err(err) = self.apply_gradient_overlay(node, overlay, log, stats) {
                log.push(err);
            }
        }
    }

    // ========== Text ==========

    async fn apply_text_style(
        &self,
        node: &NodeInfo,
        bundle: &TokenBundle,
        log: &mut ApplicationLog,
        stats: &mut MetadataStats,
    ) {
        // Decoration before case
        let tokens = [
            (bundle.text_decoration.as_ref(), TextProperty::Decoration),
            (bundle.text_transform.as_ref(), TextProperty::Case),
        ];

        for (token, property) in tokens {
            let Some(token) = token.filter(|t| t.should_theme) else {
                continue;
            };
            match self.apply_text_property(&node.id, token, property).await {
                Ok(()) => stats.text_properties += 1,
                Err(err) => log.push(err),
            }
        }
    }

    async fn apply_text_property(
        &self,
        node: &NodeId,
        token: &StyleToken,
        property: TextProperty,
    ) -> Result<(), ThemeError> {
        let variable = self.lookup(node, &token.collection, &token.path)?;
        let value = self.resolve_string(node, variable, &token.path)?;

        self.host
            .load_font(node)
            .await
            .map_err(|err| ThemeError::host(node, "Failed to load font", &err))?;

        let invalid = |err: crate::host::UnknownTextValue| {
            ThemeError::new(
                ErrorKind::UnknownError,
                node,
                format!("Cannot apply {}: {err}", property.label()),
            )
        };

        let written = match property {
            TextProperty::Decoration => {
                let decoration: TextDecoration = value.parse().map_err(invalid)?;
                self.host.set_text_decoration(node, decoration)
            }
            TextProperty::Case => {
                let case: TextCase = value.parse().map_err(invalid)?;
                self.host.set_text_case(node, case)
            }
        };

        written.map_err(|err| ThemeError::host(node, &format!("Error applying {}", property.label()), &err))
    }

    // ========== Gradient overlay ==========

    fn apply_gradient_overlay(
        &self,
        node: &NodeInfo,
        token: &StyleToken,
        log: &mut ApplicationLog,
        stats: &mut MetadataStats,
    ) -> Result<(), ThemeError> {
        if !token.should_theme {
            return Ok(());
        }

        let id = &node.id;
        let variable = self.lookup(id, &token.collection, &token.path)?;
        let value = self.resolve_string(id, variable, &token.path)?;
        let existing = self.host.paints(id, PaintField::Fills);

        if value == GRADIENT_NONE {
            if let Some(PaintSlot::Paints(mut fills)) = existing {
                if fills.last().is_some_and(Paint::is_gradient) {
                    fills.pop();
                    self.write_fills(id, fills)?;
                    stats.gradients_removed += 1;
                }
            }
            return Ok(());
        }

        let gradient = parse_css_gradient(&value).map_err(|err| {
            ThemeError::new(
                ErrorKind::GradientParseFailed,
                id,
                format!("Failed to parse gradient '{value}': {err}"),
            )
        })?;
        let paint = gradient.to_paint();

        let fills = match existing {
            Some(PaintSlot::Paints(mut fills)) => {
                fills.push(paint);
                fills
            }
            Some(PaintSlot::Mixed) => {
                log.push(ThemeError::new(
                    ErrorKind::MixedFills,
                    id,
                    "Fills are mixed or not an array, applying gradient as the only fill",
                ));
                vec![paint]
            }
            None => {
                return Err(ThemeError::new(
                    ErrorKind::UnknownError,
                    id,
                    format!("{:?} node has no fills to overlay", node.kind),
                ))
            }
        };

        self.write_fills(id, fills)?;
        stats.gradients_added += 1;
        Ok(())
    }

    fn write_fills(&self, node: &NodeId, fills: Vec<Paint>) -> Result<(), ThemeError> {
        self.host
            .set_paints(node, PaintField::Fills, fills)
            .map_err(|err| ThemeError::host(node, "Failed to write fills", &err))
    }

    // ========== Component swaps ==========

    async fn apply_icon_swap(&self, node: &NodeInfo, token: &StyleToken) -> Result<(), ThemeError> {
        self.require_instance(node, "Icon swap")?;

        let path = self.config.icon_variable_name(&node.name);
        let variable = self.lookup(&node.id, &token.collection, &path)?;
        let key = self.resolve_string(&node.id, variable, &path)?;

        self.swap_to_matching_variant(node, &key).await
    }

    async fn apply_component_swap(&self, node: &NodeInfo, token: &StyleToken) -> Result<(), ThemeError> {
        self.require_instance(node, "Component swap")?;

        let path = self.config.component_variable_name(&node.name);
        let key = match self.index.variable(&token.collection, &path) {
            Ok(variable) => self.resolve_string(&node.id, variable, &path)?,
            // No variable in this theme: revert to the white-label component
            Err(_) => self.provenance_key(node, &path).await?,
        };

        self.swap_to_matching_variant(node, &key).await
    }

    async fn provenance_key(&self, node: &NodeInfo, path: &str) -> Result<String, ThemeError> {
        let main = self
            .host
            .main_component(&node.id)
            .await
            .map_err(|err| ThemeError::host(&node.id, "Failed to read main component", &err))?;

        let key = main.as_ref().and_then(|component| {
            let description = component.provenance_description();
            if description.trim().is_empty() {
                return None;
            }
            serde_json::from_str::<Provenance>(description)
                .ok()
                .and_then(|p| p.source_key)
                .filter(|k| !k.is_empty())
        });

        key.ok_or_else(|| {
            ThemeError::new(
                ErrorKind::ProvenanceKeyMissing,
                &node.id,
                format!("Variable not found for path: {path} and no source key recorded on the main component"),
            )
        })
    }

    async fn swap_to_matching_variant(&self, node: &NodeInfo, key: &str) -> Result<(), ThemeError> {
        let set = self
            .host
            .import_component_set_by_key(key)
            .await
            .map_err(|err| {
                ThemeError::new(
                    ErrorKind::ComponentImportFailed,
                    &node.id,
                    format!("Failed to import component set with key: {key} ({err})"),
                )
            })?;

        let current = self.host.variant_properties(&node.id);
        let component = set.matching_variant(current.as_ref()).ok_or_else(|| {
            ThemeError::new(
                ErrorKind::VariantMatchFailed,
                &node.id,
                "No matching variant found and no default variant available",
            )
        })?;

        tracing::debug!("swapping {} to {} ({})", node.id, component.name, set.name);
        self.host
            .swap_component(&node.id, &component.id)
            .map_err(|err| ThemeError::host(&node.id, "Error swapping component", &err))
    }

    fn require_instance(&self, node: &NodeInfo, operation: &str) -> Result<(), ThemeError> {
        if node.kind == NodeKind::Instance {
            Ok(())
        } else {
            Err(ThemeError::new(
                ErrorKind::UnknownError,
                &node.id,
                format!("{operation} requires an instance, found {:?}", node.kind),
            ))
        }
    }

    // ========== Resolution ==========

    fn lookup(&self, node: &NodeId, collection: &str, path: &str) -> Result<&'a Variable, ThemeError> {
        self.index
            .variable(collection, path)
            .map_err(|err| ThemeError::from_lookup(node, err))
    }

    fn resolve_string(&self, node: &NodeId, variable: &Variable, path: &str) -> Result<String, ThemeError> {
        let value = self
            .host
            .resolve_for_consumer(variable, node)
            .map_err(|err| ThemeError::stale_variable(node, path, &err))?;

        value.as_str().map(str::to_string).ok_or_else(|| {
            ThemeError::new(
                ErrorKind::UnknownError,
                node,
                format!("Variable {path} resolved to {value}, expected a string"),
            )
        })
    }
}
