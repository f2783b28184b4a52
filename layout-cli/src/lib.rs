//! # Gridshift
//!
//! Command-line front end for `layout-core`: inspect, migrate, regenerate
//! and validate the layouts stored in a document file.
//!
//! ## Usage
//!
//! ```bash
//! gridshift status doc.json
//! gridshift narrow doc.json --force --output doc.next.json
//! GRIDSHIFT_NARROW_COLUMNS=6 gridshift narrow doc.json
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `Command` - One variant per subcommand
//! - `run` - Executes a command and returns what should be printed

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use layout_core::{
    fingerprint, regenerate, ConverterConfig, LayoutConfig, LayoutDocument, Outcome,
    RegenerateMode, StoredDocument, Viewport, ViewportConverter,
};

/// Command-line arguments for gridshift.
#[derive(Debug, Clone, Parser)]
#[command(name = "gridshift")]
#[command(about = "Responsive layout conversion between wide and narrow grids")]
#[command(version)]
pub struct CliArgs {
    /// Column count of the wide grid
    #[arg(
        long,
        global = true,
        env = "GRIDSHIFT_WIDE_COLUMNS",
        default_value = "12",
        value_parser = clap::value_parser!(i32).range(1..)
    )]
    pub wide_columns: i32,

    /// Column count of the narrow grid
    #[arg(
        long,
        global = true,
        env = "GRIDSHIFT_NARROW_COLUMNS",
        default_value = "4",
        value_parser = clap::value_parser!(i32).range(1..)
    )]
    pub narrow_columns: i32,

    /// Empty rows between consecutive rows of converted output
    #[arg(
        long,
        global = true,
        env = "GRIDSHIFT_ROW_SPACING",
        default_value = "2",
        value_parser = clap::value_parser!(i32).range(0..)
    )]
    pub row_spacing: i32,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Gridshift subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the fingerprint of a layout configuration file
    Fingerprint {
        /// Layout configuration JSON
        layout: PathBuf,
    },
    /// Print a document with its layouts in the versioned format
    Migrate {
        /// Document JSON
        document: PathBuf,
    },
    /// Regenerate the narrow layout from the wide one
    Narrow {
        /// Document JSON
        document: PathBuf,
        /// Regenerate even if the narrow layout is current or customized
        #[arg(long)]
        force: bool,
        /// Write the updated document here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Convert the narrow layout back into a wide one
    Wide {
        /// Document JSON
        document: PathBuf,
    },
    /// Show fingerprints, flags and staleness of a document's layouts
    Status {
        /// Document JSON
        document: PathBuf,
    },
    /// Check both layouts for out-of-grid or overlapping items
    Validate {
        /// Document JSON
        document: PathBuf,
    },
}

impl From<&CliArgs> for ConverterConfig {
    fn from(args: &CliArgs) -> Self {
        Self {
            wide_columns: args.wide_columns,
            narrow_columns: args.narrow_columns,
            row_spacing: args.row_spacing,
            ..Self::default()
        }
    }
}

/// Execute the parsed command and return its stdout text.
///
/// # Errors
///
/// Returns an error if an input file cannot be read or parsed, the output
/// file cannot be written, or validation finds a geometry violation.
pub fn run(args: &CliArgs) -> anyhow::Result<String> {
    let converter = ViewportConverter::with_config(ConverterConfig::from(args));

    match &args.command {
        Command::Fingerprint { layout } => {
            let layout = LayoutConfig::from_json(&read(layout)?)
                .with_context(|| format!("Invalid layout in {}", layout.display()))?;
            Ok(fingerprint(&layout).to_string())
        }
        Command::Migrate { document } => {
            let stored = StoredDocument::from_json(&read(document)?)
                .with_context(|| format!("Invalid document in {}", document.display()))?;
            if stored.is_versioned() {
                tracing::debug!("{} is already versioned", document.display());
            }
            Ok(stored.into_document().to_json_pretty()?)
        }
        Command::Narrow {
            document,
            force,
            output,
        } => {
            let doc = load(document)?;
            let mode = if *force {
                RegenerateMode::Force
            } else {
                RegenerateMode::IfStale
            };
            let result = regenerate(&doc.layouts, &doc.nodes, &converter, mode);
            let outcome = result.outcome;
            let updated = doc
                .with_layouts(result.pair)
                .apply_patches(&result.node_patches);
            let json = updated.to_json_pretty()?;
            tracing::info!("Narrow layout {}", describe(outcome));

            match output {
                Some(path) => {
                    fs::write(path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    Ok(format!("{}: wrote {}", describe(outcome), path.display()))
                }
                None => Ok(json),
            }
        }
        Command::Wide { document } => {
            let doc = load(document)?;
            let result = converter.to_wide(&doc.nodes, doc.layout_for(Viewport::Narrow));
            let patched = doc.apply_patches(&result.node_patches);
            let value = serde_json::json!({
                "layout": result.layout,
                "nodes": patched.nodes,
            });
            Ok(serde_json::to_string_pretty(&value)?)
        }
        Command::Status { document } => {
            let doc = load(document)?;
            Ok(status(&doc))
        }
        Command::Validate { document } => {
            let doc = load(document)?;
            for viewport in [Viewport::Wide, Viewport::Narrow] {
                let layout = doc.layout_for(viewport);
                layout
                    .validate()
                    .with_context(|| format!("{viewport} layout is invalid"))?;
                if let Some((a, b)) = layout.find_overlap() {
                    bail!("{viewport} layout: {} overlaps {}", a.node_id, b.node_id);
                }
            }
            Ok("ok".to_string())
        }
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load(path: &Path) -> anyhow::Result<LayoutDocument> {
    LayoutDocument::from_json(&read(path)?)
        .with_context(|| format!("Invalid document in {}", path.display()))
}

const fn describe(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Reused => "reused",
        Outcome::KeptCustomized => "kept (customized)",
        Outcome::Regenerated => "regenerated",
    }
}

fn status(doc: &LayoutDocument) -> String {
    let pair = &doc.layouts;
    let derived = &pair.derived;
    let generated = match &derived.generated_from_hash {
        Some(hash) => format!("{} from {hash}", derived.is_generated),
        None => derived.is_generated.to_string(),
    };

    format!(
        "master:       {} ({} items)\n\
         derived:      {} ({} items)\n\
         generated:    {generated}\n\
         customized:   {}\n\
         stale:        {}",
        pair.master_fingerprint(),
        pair.master.data.len(),
        fingerprint(&derived.data),
        derived.data.len(),
        derived.has_customizations,
        pair.is_stale(),
    )
}
