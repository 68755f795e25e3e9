//! Reskin CLI
//!
//! Applies a theme from a catalog to a document snapshot:
//!
//! ```text
//! reskin apply --document page.json --catalog themes.json --theme Acme --output themed.json
//! reskin themes --catalog themes.json
//! reskin usages --document page.json --variable VariableID:12:34
//! reskin variables --document page.json
//! reskin init
//! ```

mod files;
mod logging;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use reskin_core::{NodeId, VariableId};
use reskin_engine::{
    find_nodes_with_variable, list_local_variables, ApplyReport, DocumentHost, EngineConfig, ThemeApplier, ThemeEvent,
};
use reskin_theme::{Theme, ThemeDepth};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "reskin")]
#[command(about = "Re-skin design documents to a target theme")]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Engine config file (defaults to ./reskin.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a theme to the document's selection
    Apply {
        /// Document snapshot (JSON)
        #[arg(short, long)]
        document: PathBuf,

        /// Theme catalog (JSON)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Name of the theme to apply
        #[arg(short, long)]
        theme: String,

        /// full, spacing or local
        #[arg(long, default_value_t = ThemeDepth::Full)]
        depth: ThemeDepth,

        /// Where to write the themed snapshot (defaults to overwriting --document)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Exit with an error when anything was logged
        #[arg(long)]
        strict: bool,
    },

    /// List the themes of a catalog
    Themes {
        #[arg(short, long)]
        catalog: PathBuf,
    },

    /// List nodes bound to a variable, hidden nodes included
    Usages {
        #[arg(short, long)]
        document: PathBuf,

        /// Variable id to search for
        #[arg(long)]
        variable: String,

        /// Root nodes to search (defaults to the selection)
        #[arg(long)]
        root: Vec<String>,
    },

    /// List the variables of the document's local theme collections
    Variables {
        #[arg(short, long)]
        document: PathBuf,

        /// Print the list as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Write a reskin.toml with the default settings
    Init {
        #[arg(default_value = "reskin.toml")]
        path: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Apply {
            document,
            catalog,
            theme,
            depth,
            output,
            json,
            strict,
        } => {
            let config = files::load_config(cli.config.as_deref())?;
            let report = cmd_apply(&config, &document, &catalog, &theme, depth, output, json).await?;
            if strict && !report.is_clean() {
                bail!("{} failures logged while applying '{}'", report.log.len(), report.theme);
            }
            Ok(())
        }
        Commands::Themes { catalog } => cmd_themes(&catalog),
        Commands::Usages {
            document,
            variable,
            root,
        } => cmd_usages(&document, &variable, root),
        Commands::Variables { document, json } => {
            let config = files::load_config(cli.config.as_deref())?;
            cmd_variables(&config, &document, json).await
        }
        Commands::Init { path } => {
            files::write_config(&path, &EngineConfig::default())?;
            tracing::info!("Wrote {}", path.display());
            Ok(())
        }
    }
}

async fn cmd_apply(
    config: &EngineConfig,
    document_path: &Path,
    catalog_path: &Path,
    theme_name: &str,
    depth: ThemeDepth,
    output: Option<PathBuf>,
    json: bool,
) -> Result<ApplyReport> {
    let document = files::load_document(document_path)?;
    let catalog = files::load_catalog(catalog_path)?;
    let theme = Theme::find(&catalog, theme_name)?;

    if document.selection().is_empty() {
        tracing::warn!("Document selection is empty; only materialization can take effect");
    }

    let listener = |event: &ThemeEvent| {
        if let ThemeEvent::Progress { phase, done, total } = event {
            tracing::trace!("{:?}: {}/{}", phase, done, total);
        }
    };

    let report = ThemeApplier::new(&document)
        .with_config(config)
        .with_listener(&listener)
        .apply(theme, depth)
        .await;

    let output = output.unwrap_or_else(|| document_path.to_path_buf());
    files::write_document(&output, &document)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.log)?);
    } else {
        print_report(&report);
        println!("Wrote {}", output.display());
    }

    Ok(report)
}

fn print_report(report: &ApplyReport) {
    println!("Applied '{}' ({})", report.theme, report.depth);
    if let Some(stats) = &report.materialize {
        println!(
            "  materialized: {} collections created, {} variables created, {} updated",
            stats.collections_created, stats.variables_created, stats.variables_updated
        );
    }
    println!(
        "  metadata: {} tagged nodes, {} text properties, {} gradients added, {} removed, {} swaps",
        report.metadata.nodes_with_tokens,
        report.metadata.text_properties,
        report.metadata.gradients_added,
        report.metadata.gradients_removed,
        report.metadata.components_swapped
    );
    println!(
        "  variables: {} rebound, {} component slots, {} already themed, {} filtered",
        report.rebind.rebound, report.rebind.component_slots, report.rebind.already_themed, report.rebind.filtered
    );

    if report.is_clean() {
        return;
    }
    println!("{} failures:", report.log.len());
    for record in &report.log {
        println!(
            "  {:<24} {:<22} {}",
            record.node.to_string(),
            record.kind.to_string(),
            record.message
        );
    }
}

fn cmd_themes(catalog_path: &Path) -> Result<()> {
    let catalog = files::load_catalog(catalog_path)?;
    for theme in &catalog {
        let variables: usize = theme.collections.iter().map(|c| c.variables().len()).sum();
        println!(
            "{}{}  ({} collections, {} variables)",
            theme.name,
            if theme.favorite { " *" } else { "" },
            theme.collections.len(),
            variables
        );
    }
    Ok(())
}

fn cmd_usages(document_path: &Path, variable: &str, roots: Vec<String>) -> Result<()> {
    let document = files::load_document(document_path)?;
    let roots: Vec<NodeId> = if roots.is_empty() {
        document.selection()
    } else {
        roots.into_iter().map(NodeId::from).collect()
    };

    let usages = find_nodes_with_variable(&document, &roots, &VariableId::from(variable));
    if usages.is_empty() {
        println!("No nodes use {variable}");
        return Ok(());
    }
    for usage in usages {
        println!(
            "{:<24} {:<12} {:<32} {}",
            usage.node.to_string(),
            format!("{:?}", usage.kind),
            usage.name,
            usage.properties.join(", ")
        );
    }
    Ok(())
}

async fn cmd_variables(config: &EngineConfig, document_path: &Path, json: bool) -> Result<()> {
    let document = files::load_document(document_path)?;
    let variables = list_local_variables(&document, config)
        .await
        .with_context(|| format!("Failed to list local variables of {}", document_path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&variables)?);
        return Ok(());
    }
    if variables.is_empty() {
        println!("No local variables in {}", config.theme_collections.join(", "));
        return Ok(());
    }
    for variable in variables {
        println!(
            "{:<16} {:<32} {}",
            variable.collection_name,
            variable.name,
            variable.id
        );
    }
    Ok(())
}
