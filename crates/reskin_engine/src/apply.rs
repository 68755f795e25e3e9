//! Apply orchestration
//!
//! Sequences one run: optional local materialization, a short deferral, Phase 1
//! metadata styling, a fresh flatten, Phase 2 rebinding. The logs of each stage
//! are concatenated in that order and handed back in an [`ApplyReport`].

use crate::config::EngineConfig;
use crate::events::{ApplyListener, NoopListener, Phase, ThemeEvent};
use crate::host::DocumentHost;
use crate::log::ApplicationLog;
use crate::materialize::{LocalMaterializer, MaterializeStats};
use crate::metadata::{MetadataApplier, MetadataStats};
use crate::rebind::{RebindStats, VariableRebinder};
use crate::traversal::flatten_selection;
use reskin_theme::{Theme, ThemeDepth, ThemeIndex};
use std::borrow::Cow;

/// Outcome of one apply run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApplyReport {
    pub theme: String,
    pub depth: ThemeDepth,
    /// Materialization, Phase 1 and Phase 2 failures, in that order
    pub log: ApplicationLog,
    /// Present when the depth materialized collections locally
    pub materialize: Option<MaterializeStats>,
    pub metadata: MetadataStats,
    pub rebind: RebindStats,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.log.is_empty()
    }
}

/// Applies themes to a host's current selection
pub struct ThemeApplier<'a, H: DocumentHost + ?Sized> {
    host: &'a H,
    config: Cow<'a, EngineConfig>,
    listener: &'a dyn ApplyListener,
}

impl<'a, H: DocumentHost + ?Sized> ThemeApplier<'a, H> {
    pub fn new(host: &'a H) -> Self {
        Self {
            host,
            config: Cow::Owned(EngineConfig::default()),
            listener: &NoopListener,
        }
    }

    pub fn with_config(mut self, config: &'a EngineConfig) -> Self {
        self.config = Cow::Borrowed(config);
        self
    }

    pub fn with_listener(mut self, listener: &'a dyn ApplyListener) -> Self {
        self.listener = listener;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply `theme` to the current selection
    pub async fn apply(&self, theme: &Theme, depth: ThemeDepth) -> ApplyReport {
        tracing::info!("applying theme '{}' ({})", theme.name, depth);
        self.listener.on_event(&ThemeEvent::Started {
            theme: theme.name.clone(),
            depth,
        });

        let mut log = ApplicationLog::new();
        let mut report = ApplyReport {
            theme: theme.name.clone(),
            depth,
            ..ApplyReport::default()
        };

        let theme: Cow<'_, Theme> = if depth.materializes_locally() {
            let scope = self.host.selection().first().cloned().unwrap_or_default();
            let (local, phase) = LocalMaterializer::new(self.host, &self.config, scope)
                .run(theme)
                .await;
            self.listener.on_event(&ThemeEvent::Progress {
                phase: Phase::Materialize,
                done: local.collections.len(),
                total: local.collections.len(),
            });
            log.append(phase.log);
            report.materialize = Some(phase.stats);
            Cow::Owned(local)
        } else {
            Cow::Borrowed(theme)
        };

        if let Err(err) = theme.validate() {
            tracing::warn!("{err}; the first declaration of each collection is used");
        }
        let index = ThemeIndex::build(&theme);

        let defer = self.config.defer();
        if !defer.is_zero() {
            tokio::time::sleep(defer).await;
        }

        let nodes = flatten_selection(self.host);
        let phase1 = MetadataApplier::new(self.host, &self.config, &index, self.listener)
            .run(&nodes)
            .await;
        log.append(phase1.log);
        report.metadata = phase1.stats;

        // Swaps replace subtrees, so walk again
        let nodes = flatten_selection(self.host);
        let phase2 = VariableRebinder::new(self.host, &self.config, &index, depth, self.listener)
            .run(&nodes)
            .await;
        log.append(phase2.log);
        report.rebind = phase2.stats;

        self.listener.on_event(&ThemeEvent::LogUpdated(log.clone()));
        report.log = log;

        tracing::info!(
            "theme '{}' applied with {} logged failures",
            report.theme,
            report.log.len()
        );
        self.listener.on_event(&ThemeEvent::ThemeApplied {
            theme: report.theme.clone(),
        });

        report
    }
}

/// Apply `theme` with the default configuration and no listener
pub async fn apply_theme<H: DocumentHost + ?Sized>(host: &H, theme: &Theme, depth: ThemeDepth) -> ApplyReport {
    ThemeApplier::new(host).apply(theme, depth).await
}
