mod common;

use common::{acme_theme, apply, bound_fill, config, document, tagged};
use pretty_assertions::assert_eq;
use reskin_core::{NodeId, Paint, VariableId};
use reskin_engine::{
    DocumentHost, ErrorKind, MemoryDocument, NodeKind, NodeRecord, Phase, ThemeApplier, ThemeEvent,
};
use reskin_theme::{CollectionBinding, ResolvedType, ThemeDepth, Variable, VariableCollection, VariableValue};
use serde_json::json;
use std::cell::RefCell;

fn fill_binding(doc: &reskin_engine::MemoryDocument, node: &str) -> Option<VariableId> {
    let fills = doc.record(&NodeId::from(node))?.fills?;
    fills.first().and_then(Paint::bound_variable).cloned()
}

#[tokio::test]
async fn phase_logs_are_concatenated_in_order() {
    let doc = document(
        &["f"],
        vec![
            NodeRecord::new("f", "Frame", NodeKind::Frame).with_children(["legacy", "hero"]),
            NodeRecord::new("legacy", "Legacy", NodeKind::Rectangle).with_fills(vec![bound_fill("v-src-legacy")]),
            tagged(
                NodeRecord::new("hero", "Hero", NodeKind::Rectangle),
                json!({ "gradientOverlay": { "shouldTheme": true, "collection": "1.theme", "path": "gradient/broken" } }),
            ),
        ],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    let entries: Vec<(ErrorKind, &str)> = report
        .log
        .iter()
        .map(|r| (r.kind, r.node.as_str()))
        .collect();
    assert_eq!(
        entries,
        vec![
            (ErrorKind::GradientParseFailed, "hero"),
            (ErrorKind::VariableNotFound, "legacy"),
        ]
    );
}

#[tokio::test]
async fn listener_sees_progress_log_and_completion() {
    let doc = document(
        &["a", "b"],
        vec![
            NodeRecord::new("a", "A", NodeKind::Rectangle).with_fills(vec![bound_fill("v-src-primary")]),
            NodeRecord::new("b", "B", NodeKind::Rectangle).with_fills(vec![bound_fill("v-src-legacy")]),
        ],
    );
    let events = RefCell::new(Vec::new());
    let listener = |event: &ThemeEvent| events.borrow_mut().push(event.clone());
    let config = config();

    let report = ThemeApplier::new(&doc)
        .with_config(&config)
        .with_listener(&listener)
        .apply(&acme_theme(), ThemeDepth::Full)
        .await;

    let events = events.into_inner();
    assert_eq!(
        events.first(),
        Some(&ThemeEvent::Started {
            theme: "Acme".to_string(),
            depth: ThemeDepth::Full
        })
    );
    let rebind_progress = events
        .iter()
        .filter(|e| matches!(e, ThemeEvent::Progress { phase: Phase::Variables, .. }))
        .count();
    assert_eq!(rebind_progress, 2);

    let tail = &events[events.len() - 2..];
    assert_eq!(tail[0], ThemeEvent::LogUpdated(report.log.clone()));
    assert_eq!(
        tail[1],
        ThemeEvent::ThemeApplied {
            theme: "Acme".to_string()
        }
    );
}

#[tokio::test]
async fn swapped_subtrees_are_rebound_in_the_same_run() {
    let doc = document(
        &["f"],
        vec![
            NodeRecord::new("f", "Toolbar", NodeKind::Frame).with_children(["i"]),
            tagged(
                NodeRecord::new("i", "arrow", NodeKind::Instance)
                    .with_main_component("ic-src-sm")
                    .with_variant(common::props(&[("size", "sm")]))
                    .with_fills(vec![bound_fill("v-src-primary")]),
                json!({ "icon": { "shouldTheme": true, "collection": "1.theme" } }),
            ),
        ],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    assert!(report.is_clean(), "{:?}", report.log);
    assert_eq!(report.metadata.components_swapped, 1);
    assert_eq!(fill_binding(&doc, "i"), Some(VariableId::from("v-acme-primary")));
}

#[tokio::test]
async fn local_depth_materializes_then_binds_local_copies() {
    let doc = document(
        &["r"],
        vec![NodeRecord::new("r", "Card", NodeKind::Rectangle)
            .with_fills(vec![bound_fill("v-src-primary")])
            .with_binding("topLeftRadius", "v-src-radius")],
    );
    let theme = acme_theme();

    let report = apply(&doc, &theme, ThemeDepth::Local).await;
    assert!(report.is_clean(), "{:?}", report.log);

    let local = doc.local_collection("1.theme").expect("local collection");
    let mode_names: Vec<&str> = local.modes.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(mode_names, vec!["Light", "Dark"]);
    assert_eq!(local.variable_ids.len(), common::acme_variables().len());

    let stats = report.materialize.expect("materialize stats");
    assert_eq!(stats.collections_created, 1);
    assert_eq!(stats.modes_added, 2);
    assert_eq!(stats.variables_created, common::acme_variables().len());

    let bound = fill_binding(&doc, "r").expect("fill stays bound");
    let variable = doc.variable(&bound).expect("bound variable exists");
    assert_eq!(variable.name, "color/primary");
    assert_eq!(variable.collection_id, local.id);
    assert!(!variable.remote);

    let radius_id = doc.bound_variables(&NodeId::from("r"))["topLeftRadius"][0].id.clone();
    let radius = doc.variable(&radius_id).expect("radius bound");
    let light = local.mode_by_name("Light").unwrap().mode_id.clone();
    assert_eq!(radius.values_by_mode.get(&light), Some(&VariableValue::Float(6.0)));
}

#[tokio::test]
async fn repeated_local_runs_update_in_place() {
    let doc = document(
        &["r"],
        vec![NodeRecord::new("r", "Card", NodeKind::Rectangle).with_fills(vec![bound_fill("v-src-primary")])],
    );
    let theme = acme_theme();

    apply(&doc, &theme, ThemeDepth::Local).await;
    let first_binding = fill_binding(&doc, "r");
    let second = apply(&doc, &theme, ThemeDepth::Local).await;

    let stats = second.materialize.expect("materialize stats");
    assert_eq!(stats.collections_created, 0);
    assert_eq!(stats.variables_created, 0);
    assert_eq!(stats.variables_updated, common::acme_variables().len());
    assert_eq!(second.rebind.already_themed, 1);
    assert_eq!(fill_binding(&doc, "r"), first_binding);
}

#[tokio::test]
async fn failed_mode_setup_reports_the_partially_created_collection() {
    // A library collection without modes leaves nothing to replace the placeholder mode
    let mut spacing = VariableCollection::new("c-resp", "2.responsive");
    spacing.remote = true;
    let mut gap = Variable::new("v-resp-gap", "spacing/gap", ResolvedType::Float, "c-resp");
    gap.remote = true;

    let mut snapshot = document(
        &["r"],
        vec![NodeRecord::new("r", "Card", NodeKind::Rectangle).with_fills(vec![bound_fill("v-src-primary")])],
    )
    .snapshot();
    snapshot.collections.push(spacing);
    snapshot.variables.push(gap.clone());
    let doc = MemoryDocument::new(snapshot);

    let theme = acme_theme().with_collection(
        CollectionBinding::new("2.responsive", "acme-responsive-key")
            .with_id("c-resp")
            .with_variables(vec![gap]),
    );

    let report = apply(&doc, &theme, ThemeDepth::Local).await;

    let failures: Vec<&str> = report
        .log
        .iter()
        .filter(|r| r.kind == ErrorKind::UnknownError)
        .map(|r| r.message.as_str())
        .collect();
    assert_eq!(failures.len(), 1, "{:?}", report.log);
    assert!(failures[0].starts_with("Failed to materialize collection 2.responsive"));
    assert!(failures[0].contains("was partially created"), "{}", failures[0]);

    let partial = doc.local_collection("2.responsive").expect("partial collection stays in the document");
    assert!(failures[0].contains(partial.id.as_str()));

    let stats = report.materialize.expect("materialize stats");
    assert_eq!(stats.collections_created, 2);
    assert_eq!(stats.fallbacks, 1);
    assert!(doc.local_collection("1.theme").is_some());
}
