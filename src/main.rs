//! CLI entry point for remap-doctor
//!
//! Provides a command-line interface for checking documents, inspecting
//! key mappings, exporting and watching a document for changes.

use clap::{Parser, Subcommand};
use colored::*;
use remap_doctor::config::{expand_path, DocumentError, DocumentManager, DocumentWatcher, ExportTransaction};
use remap_doctor::core::{
    build_index, find_profile_duplicates, detect_rule_conflicts, normalize, validate, Configuration,
    NormalizedMapping, Severity, ValidationReport,
};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_DOCUMENT: &str = "~/.config/karabiner/karabiner.json";

#[derive(Parser)]
#[command(name = "remap-doctor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a document and report duplicates and conflicts
    Check {
        /// Path to the remapping document
        #[arg(short, long, default_value = DEFAULT_DOCUMENT)]
        config: String,
    },

    /// Show every mapping touching a key
    Inspect {
        /// Path to the remapping document
        #[arg(short, long, default_value = DEFAULT_DOCUMENT)]
        config: String,

        /// Key to inspect (e.g. caps_lock); lists all mapped keys if omitted
        #[arg(short, long)]
        key: Option<String>,

        /// Print normalized mappings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the document to a file, refusing when it has errors
    Export {
        /// Path to the remapping document
        #[arg(short, long, default_value = DEFAULT_DOCUMENT)]
        config: String,

        /// Output file
        #[arg(short, long)]
        output: String,
    },

    /// Re-check the document every time it changes
    Watch {
        /// Path to the remapping document
        #[arg(short, long, default_value = DEFAULT_DOCUMENT)]
        config: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check { config } => {
            let document = DocumentManager::new(&config)?.load()?;
            if !check_document(&document) {
                std::process::exit(1);
            }
        }
        Commands::Inspect { config, key, json } => {
            let document = DocumentManager::new(&config)?.load()?;
            inspect_document(&document, key.as_deref(), json)?;
        }
        Commands::Export { config, output } => export_document(&config, &output)?,
        Commands::Watch { config } => watch_document(&config)?,
    }

    Ok(())
}

/// Routes `tracing` output to stderr
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints validation issues; returns whether the document is exportable
fn print_report(report: &ValidationReport) -> bool {
    if report.is_empty() {
        println!("{} {}", "✓".green().bold(), "Document is valid".bold());
        return true;
    }

    for issue in &report.issues {
        let label = match issue.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!("  {} {} {}", label, issue.path.dimmed(), issue.message);
    }

    println!(
        "\n{} error(s), {} warning(s)",
        report.count(Severity::Error),
        report.count(Severity::Warning)
    );

    report.is_exportable()
}

/// Runs every check over a document
fn check_document(config: &Configuration) -> bool {
    println!("{}", "Validation".bold());
    let exportable = print_report(&validate(config));

    for profile in &config.profiles {
        let duplicates = find_profile_duplicates(profile);
        let conflicts = detect_rule_conflicts(profile.rules());

        if duplicates.is_empty() && conflicts.is_empty() {
            continue;
        }

        println!("\n{} {}", "Profile".bold(), profile.display_name().cyan());

        for found in &duplicates {
            println!(
                "  {} {}: {}",
                "duplicate".yellow(),
                found.scope,
                found.keys.join(", ").cyan()
            );
        }

        for conflict in &conflicts {
            println!("  {}", conflict.to_string().yellow());
        }
    }

    if exportable {
        println!("\n{} Ready to export", "✓".green());
    } else {
        println!("\n{}", "✗ Export blocked until errors are fixed".red());
    }

    exportable
}

/// Prints the mappings touching `key`, or every mapped key
fn inspect_document(config: &Configuration, key: Option<&str>, json: bool) -> anyhow::Result<()> {
    let entries = normalize(config);
    let index = build_index(&entries);

    let selected: Vec<&NormalizedMapping> = match key {
        Some(key) => index.touching(key),
        None => entries.iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    let Some(key) = key else {
        println!("{}", "Mapped keys".bold());
        for mapped in &index.mapped_keys {
            let sources = index.by_from_key.get(mapped).map_or(0, Vec::len);
            let targets = index.by_to_key.get(mapped).map_or(0, Vec::len);
            println!(
                "  {} {}",
                mapped.cyan(),
                format!("({} as source, {} as target)", sources, targets).dimmed()
            );
        }
        return Ok(());
    };

    if selected.is_empty() {
        println!("{} is not mapped", key.cyan());
        return Ok(());
    }

    println!("{}", format!("Mappings touching {}", key).bold());
    for entry in selected {
        let location = match &entry.rule {
            Some((rule_index, description)) => {
                format!("rule {} \"{}\"", rule_index + 1, description)
            }
            None => entry.scope.to_string(),
        };

        println!(
            "  {} {} {} {}",
            format!("[{}]", entry.mapping_type).magenta(),
            entry,
            format!("({}, {})", entry.profile_name, location).dimmed(),
            entry.id.to_string().dimmed()
        );

        if entry.condition_count > 0 {
            println!("      {} condition(s)", entry.condition_count);
        }
    }

    Ok(())
}

/// Exports the document, refusing when validation reports errors
fn export_document(config_path: &str, output: &str) -> anyhow::Result<()> {
    let document = DocumentManager::new(config_path)?.load()?;
    let target = expand_path(output)?;

    let tx = ExportTransaction::begin(target.clone())?;
    let backup = tx.backup_path().map(Path::to_path_buf);

    match tx.commit(&document) {
        Ok(report) => {
            if !report.is_empty() {
                print_report(&report);
            }
            if let Some(backup) = backup {
                println!("{} Backed up existing file to {}", "→".cyan(), backup.display());
            }
            println!("{} Exported to {}", "✓".green(), target.display());
            Ok(())
        }
        Err(DocumentError::ExportBlocked(errors)) => {
            print_report(&validate(&document));
            println!("\n{} {} error(s) must be fixed before export", "✗".red().bold(), errors);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Re-runs the checks whenever the document is written
fn watch_document(config_path: &str) -> anyhow::Result<()> {
    let manager = DocumentManager::new(config_path)?;
    let watcher = DocumentWatcher::new(manager.path())?;

    println!("{} Watching {}", "→".cyan(), manager.path().display());
    run_watched_check(&manager);

    loop {
        if watcher.wait_for_change(Duration::from_secs(1)) {
            println!("\n{} Document changed", "→".cyan());
            run_watched_check(&manager);
        }
    }
}

/// Like `check`, but a broken document is reported instead of ending the loop
fn run_watched_check(manager: &DocumentManager) {
    match manager.load() {
        Ok(document) => {
            check_document(&document);
        }
        Err(e) => println!("{} {}", "✗".red().bold(), e),
    }
}
