mod common;

use common::{acme_theme, apply, document, props, tagged};
use pretty_assertions::assert_eq;
use reskin_core::{Color, ComponentId, NodeId, Paint, SolidPaint};
use reskin_engine::{ErrorKind, MemoryDocument, NodeKind, NodeRecord, TextCase, TextDecoration};
use reskin_theme::ThemeDepth;
use serde_json::json;

fn token(collection: &str, path: &str) -> serde_json::Value {
    json!({ "shouldTheme": true, "collection": collection, "path": path })
}

fn flag(collection: &str) -> serde_json::Value {
    json!({ "shouldTheme": true, "collection": collection })
}

fn fills(doc: &MemoryDocument, node: &str) -> Vec<Paint> {
    doc.record(&NodeId::from(node))
        .and_then(|r| r.fills)
        .unwrap_or_default()
}

fn main_component(doc: &MemoryDocument, node: &str) -> Option<ComponentId> {
    doc.record(&NodeId::from(node)).and_then(|r| r.main_component)
}

fn instance(id: &str, name: &str, main: &str, variant: &[(&str, &str)]) -> NodeRecord {
    NodeRecord::new(id, name, NodeKind::Instance)
        .with_main_component(main)
        .with_variant(props(variant))
}

// ========== Text ==========

#[tokio::test]
async fn text_decoration_and_case_are_applied() {
    let doc = document(
        &["t"],
        vec![tagged(
            NodeRecord::new("t", "Link", NodeKind::Text),
            json!({
                "textDecoration": token("1.theme", "text/link-decoration"),
                "textTransform": token("1.theme", "text/case"),
            }),
        )],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    assert!(report.is_clean(), "{:?}", report.log);
    let record = doc.record(&NodeId::from("t")).unwrap();
    assert_eq!(record.text_decoration, Some(TextDecoration::Underline));
    assert_eq!(record.text_case, Some(TextCase::Upper));
    assert_eq!(report.metadata.text_properties, 2);
}

#[tokio::test]
async fn one_bad_text_token_does_not_block_the_other() {
    let doc = document(
        &["t"],
        vec![tagged(
            NodeRecord::new("t", "Link", NodeKind::Text),
            json!({
                "textDecoration": token("1.theme", "text/missing"),
                "textTransform": token("1.theme", "text/case"),
            }),
        )],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    assert_eq!(report.log.len(), 1);
    assert_eq!(report.log.records()[0].kind, ErrorKind::VariableNotFound);
    let record = doc.record(&NodeId::from("t")).unwrap();
    assert_eq!(record.text_decoration, None);
    assert_eq!(record.text_case, Some(TextCase::Upper));
}

#[tokio::test]
async fn unknown_collection_and_invalid_value_are_logged() {
    let doc = document(
        &["t"],
        vec![tagged(
            NodeRecord::new("t", "Heading", NodeKind::Text),
            json!({
                "textDecoration": token("9.unknown", "text/link-decoration"),
                "textTransform": token("1.theme", "text/bold"),
            }),
        )],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    let kinds: Vec<ErrorKind> = report.log.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![ErrorKind::CollectionNotFound, ErrorKind::UnknownError]);
}

#[tokio::test]
async fn tokens_not_marked_for_theming_are_ignored() {
    let doc = document(
        &["t"],
        vec![tagged(
            NodeRecord::new("t", "Body", NodeKind::Text),
            json!({
                "textTransform": { "shouldTheme": false, "collection": "1.theme", "path": "text/case" },
            }),
        )],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    assert!(report.is_clean());
    assert_eq!(doc.record(&NodeId::from("t")).unwrap().text_case, None);
}

// ========== Gradients ==========

#[tokio::test]
async fn gradient_overlay_is_added_then_removed() {
    let base = Paint::Solid(SolidPaint::new(Color::WHITE));
    let doc = document(
        &["r"],
        vec![tagged(
            NodeRecord::new("r", "Hero", NodeKind::Rectangle).with_fills(vec![base.clone()]),
            json!({ "gradientOverlay": token("1.theme", "gradient/hero") }),
        )],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;
    assert!(report.is_clean(), "{:?}", report.log);

    let painted = fills(&doc, "r");
    assert_eq!(painted.len(), 2);
    assert_eq!(painted[0], base);
    match &painted[1] {
        Paint::GradientLinear(gradient) => {
            assert_eq!(gradient.stops.len(), 2);
            assert_eq!(gradient.stops[0].color, Color::RED);
            assert_eq!(gradient.stops[0].position, 0.0);
            assert_eq!(gradient.stops[1].color, Color::GREEN);
            assert_eq!(gradient.stops[1].position, 1.0);
        }
        other => panic!("expected a linear gradient on top, got {other:?}"),
    }

    // Same node, now tagged with the removal sentinel
    let removal = document(
        &["r"],
        vec![tagged(
            NodeRecord::new("r", "Hero", NodeKind::Rectangle).with_fills(painted),
            json!({ "gradientOverlay": token("1.theme", "gradient/none") }),
        )],
    );
    let report = apply(&removal, &acme_theme(), ThemeDepth::Full).await;

    assert!(report.is_clean());
    assert_eq!(fills(&removal, "r"), vec![base]);
    assert_eq!(report.metadata.gradients_removed, 1);
}

#[tokio::test]
async fn removal_keeps_a_solid_top_fill() {
    let top = Paint::Solid(SolidPaint::new(Color::BLUE));
    let doc = document(
        &["r"],
        vec![tagged(
            NodeRecord::new("r", "Plain", NodeKind::Rectangle).with_fills(vec![top.clone()]),
            json!({ "gradientOverlay": token("1.theme", "gradient/none") }),
        )],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    assert!(report.is_clean());
    assert_eq!(fills(&doc, "r"), vec![top]);
    assert_eq!(doc.writes().paints, 0);
}

#[tokio::test]
async fn unparseable_gradient_leaves_fills_alone() {
    let base = Paint::Solid(SolidPaint::new(Color::WHITE));
    let doc = document(
        &["r"],
        vec![tagged(
            NodeRecord::new("r", "Hero", NodeKind::Rectangle).with_fills(vec![base.clone()]),
            json!({ "gradientOverlay": token("1.theme", "gradient/broken") }),
        )],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    assert_eq!(report.log.count(ErrorKind::GradientParseFailed), 1);
    assert_eq!(fills(&doc, "r"), vec![base]);
}

#[tokio::test]
async fn non_ascii_gradient_value_is_logged_and_the_run_completes() {
    let base = Paint::Solid(SolidPaint::new(Color::WHITE));
    let doc = document(
        &["r", "s"],
        vec![
            tagged(
                NodeRecord::new("r", "Hero", NodeKind::Rectangle).with_fills(vec![base.clone()]),
                json!({ "gradientOverlay": token("1.theme", "gradient/accent") }),
            ),
            NodeRecord::new("s", "Swatch", NodeKind::Rectangle).with_fills(vec![common::bound_fill("v-src-primary")]),
        ],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    assert_eq!(report.log.len(), 1);
    assert_eq!(report.log.records()[0].kind, ErrorKind::GradientParseFailed);
    assert_eq!(fills(&doc, "r"), vec![base]);
    // Phase 2 still ran
    assert_eq!(report.rebind.rebound, 1);
}

#[tokio::test]
async fn mixed_fills_are_replaced_by_the_gradient() {
    let mut record = NodeRecord::new("r", "Mixed", NodeKind::Rectangle);
    record.mixed_fills = true;
    let doc = document(
        &["r"],
        vec![tagged(record, json!({ "gradientOverlay": token("1.theme", "gradient/hero") }))],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    assert_eq!(report.log.count(ErrorKind::MixedFills), 1);
    let painted = fills(&doc, "r");
    assert_eq!(painted.len(), 1);
    assert!(painted[0].is_gradient());
}

// ========== Swaps ==========

#[tokio::test]
async fn icon_swap_keeps_the_variant() {
    let doc = document(
        &["i"],
        vec![tagged(
            instance("i", "arrow", "ic-src-lg", &[("size", "lg")]),
            json!({ "icon": flag("1.theme") }),
        )],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    assert!(report.is_clean(), "{:?}", report.log);
    assert_eq!(main_component(&doc, "i"), Some(ComponentId::from("ic-acme-lg")));
    assert_eq!(report.metadata.components_swapped, 1);
}

#[tokio::test]
async fn icon_swap_falls_back_to_the_default_variant() {
    let doc = document(
        &["i"],
        vec![tagged(
            instance("i", "arrow", "ic-src-lg", &[("size", "xl")]),
            json!({ "icon": flag("1.theme") }),
        )],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    assert!(report.is_clean(), "{:?}", report.log);
    assert_eq!(main_component(&doc, "i"), Some(ComponentId::from("ic-acme-sm")));
}

#[tokio::test]
async fn icon_swap_failures_leave_the_instance_alone() {
    let doc = document(
        &["missing", "broken"],
        vec![
            tagged(
                instance("missing", "chevron", "ic-src-sm", &[("size", "sm")]),
                json!({ "icon": flag("1.theme") }),
            ),
            tagged(
                instance("broken", "broken", "ic-src-sm", &[("size", "sm")]),
                json!({ "icon": flag("1.theme") }),
            ),
        ],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    let kinds: Vec<ErrorKind> = report.log.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![ErrorKind::VariableNotFound, ErrorKind::ComponentImportFailed]);
    assert_eq!(main_component(&doc, "missing"), Some(ComponentId::from("ic-src-sm")));
    assert_eq!(main_component(&doc, "broken"), Some(ComponentId::from("ic-src-sm")));
}

#[tokio::test]
async fn component_swap_without_match_or_default_is_logged() {
    let doc = document(
        &["matched", "ghost"],
        vec![
            tagged(
                instance("matched", "Button", "bt-src-primary", &[("kind", "primary")]),
                json!({ "component": flag("1.theme") }),
            ),
            tagged(
                instance("ghost", "Button", "bt-src-ghost", &[("kind", "ghost")]),
                json!({ "component": flag("1.theme") }),
            ),
        ],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    assert_eq!(main_component(&doc, "matched"), Some(ComponentId::from("bt-acme-primary")));
    assert_eq!(main_component(&doc, "ghost"), Some(ComponentId::from("bt-src-ghost")));
    assert_eq!(report.log.len(), 1);
    assert_eq!(report.log.records()[0].kind, ErrorKind::VariantMatchFailed);
    assert_eq!(report.log.records()[0].node, NodeId::from("ghost"));
}

#[tokio::test]
async fn component_swap_reverts_through_recorded_provenance() {
    let doc = document(
        &["card"],
        vec![tagged(
            instance("card", "Card", "card-src-flat", &[("style", "flat")]),
            json!({ "component": flag("1.theme") }),
        )],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    assert!(report.is_clean(), "{:?}", report.log);
    assert_eq!(main_component(&doc, "card"), Some(ComponentId::from("card-ent-flat")));
}

#[tokio::test]
async fn component_swap_without_provenance_is_logged() {
    let doc = document(
        &["badge"],
        vec![tagged(
            NodeRecord::new("badge", "Badge", NodeKind::Instance).with_main_component("badge-src"),
            json!({ "component": flag("1.theme") }),
        )],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    assert_eq!(report.log.count(ErrorKind::ProvenanceKeyMissing), 1);
    assert_eq!(main_component(&doc, "badge"), Some(ComponentId::from("badge-src")));
}

#[tokio::test]
async fn malformed_tokens_are_logged_and_skipped() {
    let doc = document(
        &["r"],
        vec![NodeRecord::new("r", "Broken", NodeKind::Rectangle).with_plugin_data(
            common::NAMESPACE,
            common::KEY,
            "{ not json",
        )],
    );

    let report = apply(&doc, &acme_theme(), ThemeDepth::Full).await;

    assert_eq!(report.log.len(), 1);
    assert_eq!(report.log.records()[0].kind, ErrorKind::UnknownError);
    assert_eq!(report.metadata.nodes_with_tokens, 1);
}
