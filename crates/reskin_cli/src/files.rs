//! Snapshot, catalog and config file handling

use anyhow::{bail, Context, Result};
use reskin_engine::{EngineConfig, MemoryDocument};
use reskin_theme::Theme;
use std::fs;
use std::path::Path;

/// Theme catalog file: either a bare list of themes or `{ "themes": [...] }`
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<Theme>),
    Wrapped { themes: Vec<Theme> },
}

pub fn load_document(path: &Path) -> Result<MemoryDocument> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document snapshot {}", path.display()))?;
    MemoryDocument::from_json(&content)
        .with_context(|| format!("Failed to parse document snapshot {}", path.display()))
}

pub fn load_catalog(path: &Path) -> Result<Vec<Theme>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read theme catalog {}", path.display()))?;
    parse_catalog(&content).with_context(|| format!("Invalid theme catalog {}", path.display()))
}

pub fn parse_catalog(content: &str) -> Result<Vec<Theme>> {
    let themes = match serde_json::from_str::<CatalogFile>(content)? {
        CatalogFile::List(themes) | CatalogFile::Wrapped { themes } => themes,
    };
    if themes.is_empty() {
        bail!("catalog contains no themes");
    }
    Theme::validate_catalog(&themes)?;
    Ok(themes)
}

/// Explicit config path, else `reskin.toml` in the working directory, else defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => {
            let local = Path::new("reskin.toml");
            if local.exists() {
                Ok(EngineConfig::load(local)?)
            } else {
                Ok(EngineConfig::default())
            }
        }
    }
}

pub fn write_config(path: &Path, config: &EngineConfig) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn write_document(path: &Path, document: &MemoryDocument) -> Result<()> {
    let json = document.to_json().context("Failed to serialize document")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_accepts_list_and_wrapped_forms() {
        let list = r#"[{"name": "Acme", "collections": []}]"#;
        let wrapped = r#"{"themes": [{"name": "Acme"}, {"name": "Globex", "favorite": true}]}"#;

        assert_eq!(parse_catalog(list).unwrap()[0].name, "Acme");
        let themes = parse_catalog(wrapped).unwrap();
        assert_eq!(themes.len(), 2);
        assert!(themes[1].favorite);
    }

    #[test]
    fn catalog_rejects_duplicate_themes() {
        let duplicated = r#"[{"name": "Acme"}, {"name": "Acme"}]"#;
        assert!(parse_catalog(duplicated).is_err());
        assert!(parse_catalog("[]").is_err());
    }
}
