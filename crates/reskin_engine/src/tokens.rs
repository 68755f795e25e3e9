//! Token metadata attached to nodes

use crate::config::EngineConfig;
use crate::host::DocumentHost;
use reskin_core::NodeId;
use serde::{Deserialize, Serialize};

/// One themable property instruction
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleToken {
    #[serde(default)]
    pub should_theme: bool,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl StyleToken {
    pub fn new(collection: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            should_theme: true,
            path: path.into(),
            collection: collection.into(),
            value: None,
        }
    }
}

/// Tokens stored on one node
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBundle {
    #[serde(default)]
    pub text_decoration: Option<StyleToken>,
    #[serde(default)]
    pub text_transform: Option<StyleToken>,
    #[serde(default)]
    pub gradient_overlay: Option<StyleToken>,
    #[serde(default)]
    pub icon: Option<StyleToken>,
    #[serde(default)]
    pub component: Option<StyleToken>,
}

impl TokenBundle {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Raw token JSON for a node, if it carries the configured namespace/key
pub fn read_token_json<H: DocumentHost + ?Sized>(
    host: &H,
    node: &NodeId,
    config: &EngineConfig,
) -> Option<String> {
    host.shared_plugin_data(node, &config.namespace, &config.key)
        .filter(|raw| !raw.trim().is_empty())
}
