//! Shared fixtures: a source library, the "Acme" target theme and a document
//! builder wired to both.

#![allow(dead_code)]

use reskin_core::{Color, ModeId, NodeId, Paint, SolidPaint};
use reskin_engine::{
    ApplyReport, ComponentInfo, ComponentSetRecord, DocumentSnapshot, EngineConfig, MemoryDocument, NodeRecord,
    ThemeApplier, VariantProperties,
};
use reskin_theme::{
    CollectionBinding, Mode, ResolvedType, Theme, ThemeDepth, Variable, VariableCollection, VariableValue,
};

pub const NAMESPACE: &str = "elc_admin";
pub const KEY: &str = "tokens";

// ========== Collections ==========

pub fn source_collection() -> VariableCollection {
    let mut collection = VariableCollection::new("c-src", "1.theme");
    collection.modes = vec![
        Mode::new("m-light", "Light"),
        Mode::new("m-dark", "Dark"),
        Mode::new("m-hc", "High contrast"),
    ];
    collection.default_mode_id = Some(ModeId::from("m-light"));
    collection.remote = true;
    collection
}

pub fn presentation_collection() -> VariableCollection {
    let mut collection = VariableCollection::new("c-pres", "0.presentation");
    collection.modes = vec![Mode::new("p-default", "Default")];
    collection.remote = true;
    collection
}

pub fn acme_modes() -> Vec<Mode> {
    vec![Mode::new("a-light", "Light"), Mode::new("a-dark", "Dark")]
}

pub fn acme_collection() -> VariableCollection {
    let mut collection = VariableCollection::new("c-acme", "1.theme");
    collection.modes = acme_modes();
    collection.default_mode_id = Some(ModeId::from("a-light"));
    collection.remote = true;
    collection
}

// ========== Variables ==========

fn source(id: &str, name: &str, resolved_type: ResolvedType, value: impl Into<VariableValue>) -> Variable {
    let value = value.into();
    let mut variable = Variable::new(id, name, resolved_type, "c-src")
        .with_value("m-light", value.clone())
        .with_value("m-dark", value.clone())
        .with_value("m-hc", value);
    variable.remote = true;
    variable
}

fn acme(slug: &str, name: &str, resolved_type: ResolvedType, value: impl Into<VariableValue>) -> Variable {
    let value = value.into();
    let mut variable = Variable::new(format!("v-acme-{slug}"), name, resolved_type, "c-acme")
        .with_value("a-light", value.clone())
        .with_value("a-dark", value);
    variable.remote = true;
    variable
}

pub fn source_variables() -> Vec<Variable> {
    let mut shadow = Variable::new("v-pres-shadow", "shadow/md", ResolvedType::Float, "c-pres")
        .with_value("p-default", 4.0);
    shadow.remote = true;

    vec![
        source("v-src-primary", "color/primary", ResolvedType::Color, Color::BLUE),
        source("v-src-gap", "spacing/md", ResolvedType::Float, 8.0),
        source("v-src-radius", "radius/md", ResolvedType::Float, 4.0),
        source("v-src-label", "text/label", ResolvedType::String, "Enterprise"),
        source("v-src-flag", "flag/show-icon", ResolvedType::Boolean, VariableValue::Boolean(false)),
        source("v-src-legacy", "color/legacy", ResolvedType::Color, Color::GRAY),
        shadow,
    ]
}

pub fn acme_variables() -> Vec<Variable> {
    vec![
        acme("primary", "color/primary", ResolvedType::Color, Color::rgb(0.1, 0.2, 0.8)),
        acme("gap", "spacing/md", ResolvedType::Float, 12.0),
        acme("radius", "radius/md", ResolvedType::Float, 6.0),
        acme("label", "text/label", ResolvedType::String, "Acme"),
        acme("flag", "flag/show-icon", ResolvedType::Boolean, VariableValue::Boolean(true)),
        acme("link", "text/link-decoration", ResolvedType::String, "UNDERLINE"),
        acme("case", "text/case", ResolvedType::String, "UPPER"),
        acme("bold", "text/bold", ResolvedType::String, "BOLD"),
        acme(
            "hero",
            "gradient/hero",
            ResolvedType::String,
            "linear-gradient(90deg, #ff0000 0%, #00ff00 100%)",
        ),
        acme("none", "gradient/none", ResolvedType::String, "NONE"),
        acme("broken", "gradient/broken", ResolvedType::String, "linear-gradient(90deg, #ff0000)"),
        acme(
            "accent",
            "gradient/accent",
            ResolvedType::String,
            "linear-gradient(90deg, é50%, #fff 100%)",
        ),
        acme("icon-arrow", "icons/arrow", ResolvedType::String, "icon-set-acme"),
        acme("icon-broken", "icons/broken", ResolvedType::String, "no-such-set"),
        acme("button", "components/Button", ResolvedType::String, "button-set-acme"),
    ]
}

pub fn acme_theme() -> Theme {
    Theme::new("Acme").with_collection(
        CollectionBinding::new("1.theme", "acme-theme-key")
            .with_id("c-acme")
            .with_modes(acme_modes())
            .with_variables(acme_variables()),
    )
}

// ========== Components ==========

fn variant(id: &str, property: &str, value: &str, description: &str) -> ComponentInfo {
    ComponentInfo {
        id: id.into(),
        key: format!("key-{id}"),
        name: format!("{property}={value}"),
        description: description.to_string(),
        variant_properties: Some(props(&[(property, value)])),
        parent_set: None,
    }
}

fn set(id: &str, key: &str, description: &str, children: &[&str], default: Option<&str>) -> ComponentSetRecord {
    ComponentSetRecord {
        id: id.into(),
        key: key.to_string(),
        name: id.to_string(),
        description: description.to_string(),
        children: children.iter().map(|c| (*c).into()).collect(),
        default_variant: default.map(Into::into),
    }
}

pub fn props(pairs: &[(&str, &str)]) -> VariantProperties {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn components() -> (Vec<ComponentInfo>, Vec<ComponentSetRecord>) {
    let components = vec![
        variant("ic-src-sm", "size", "sm", ""),
        variant("ic-src-lg", "size", "lg", ""),
        variant("ic-acme-sm", "size", "sm", ""),
        variant("ic-acme-lg", "size", "lg", ""),
        variant("bt-src-primary", "kind", "primary", ""),
        variant("bt-src-ghost", "kind", "ghost", ""),
        variant("bt-acme-primary", "kind", "primary", ""),
        variant("card-src-flat", "style", "flat", ""),
        variant("card-ent-flat", "style", "flat", ""),
        variant("card-ent-raised", "style", "raised", ""),
        ComponentInfo {
            id: "badge-src".into(),
            key: "key-badge-src".to_string(),
            name: "Badge".to_string(),
            description: String::new(),
            variant_properties: None,
            parent_set: None,
        },
    ];

    let sets = vec![
        set("icon-src", "icon-set-src", "", &["ic-src-sm", "ic-src-lg"], None),
        set("icon-acme", "icon-set-acme", "", &["ic-acme-sm", "ic-acme-lg"], Some("ic-acme-sm")),
        set("button-src", "button-set-src", "", &["bt-src-primary", "bt-src-ghost"], None),
        set("button-acme", "button-set-acme", "", &["bt-acme-primary"], None),
        set(
            "card-src",
            "card-set-src",
            r#"{"sourceKey":"card-set-enterprise"}"#,
            &["card-src-flat"],
            None,
        ),
        set(
            "card-enterprise",
            "card-set-enterprise",
            "",
            &["card-ent-flat", "card-ent-raised"],
            None,
        ),
    ];

    (components, sets)
}

// ========== Documents ==========

pub fn document(selection: &[&str], nodes: Vec<NodeRecord>) -> MemoryDocument {
    let (components, component_sets) = components();
    let mut variables = source_variables();
    variables.extend(acme_variables());

    MemoryDocument::new(DocumentSnapshot {
        selection: selection.iter().map(|id| NodeId::from(*id)).collect(),
        nodes,
        variables,
        collections: vec![source_collection(), presentation_collection(), acme_collection()],
        components,
        component_sets,
    })
}

/// Node carrying a token bundle
pub fn tagged(record: NodeRecord, tokens: serde_json::Value) -> NodeRecord {
    record.with_plugin_data(NAMESPACE, KEY, tokens.to_string())
}

pub fn bound_fill(variable: &str) -> Paint {
    Paint::Solid(SolidPaint::new(Color::BLUE).bound_to(variable.into()))
}

pub fn config() -> EngineConfig {
    EngineConfig {
        defer_ms: 0,
        ..EngineConfig::default()
    }
}

pub async fn apply(document: &MemoryDocument, theme: &Theme, depth: ThemeDepth) -> ApplyReport {
    let config = config();
    ThemeApplier::new(document)
        .with_config(&config)
        .apply(theme, depth)
        .await
}
