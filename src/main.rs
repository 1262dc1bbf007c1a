//! dimcheck CLI
//!
//! Main entry point for the `dimc` command.

use clap::{Parser, Subcommand};
use dimcheck::config::{Config, OutputFormat};
use dimcheck::{TypeRegistry, UnitCatalogue};
use miette::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "dimc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dimensional type checker for model declarations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Type-check a declaration file
    Check {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Show the type of every declaration
        #[arg(long)]
        show_types: bool,

        /// Print an intermediate form instead of checking
        #[arg(long, value_enum)]
        emit: Option<EmitType>,

        /// Fail if any warning is reported
        #[arg(long)]
        deny_warnings: bool,

        /// Configuration file (default: dimcheck.toml beside FILE, then ./)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Resolve unit names to dimension vectors
    Unit {
        /// Unit names such as `ms`, `mV` or `e-3`
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// List the SI prefixes and named units
    Prefixes,

    /// Show information about the checker
    Info,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum EmitType {
    /// Parsed model (JSON)
    Ast,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Check {
            input,
            show_types,
            emit,
            deny_warnings,
            config,
        } => {
            let mut settings = match config {
                Some(path) => Config::load(&path)?,
                None => Config::discover(&input)?,
            };
            settings.output.show_types |= show_types;
            settings.check.deny_warnings |= deny_warnings;
            check(&input, emit, &settings)
        }

        Commands::Unit { names, json } => unit(&names, json),

        Commands::Prefixes => prefixes(),

        Commands::Info => info(),
    }
}

#[derive(Serialize)]
struct CheckReport<'a> {
    file: String,
    declarations: Vec<DeclarationReport<'a>>,
    errors: Vec<String>,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct DeclarationReport<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    ty: Option<String>,
    key: Option<String>,
}

fn check(input: &Path, emit: Option<EmitType>, config: &Config) -> Result<()> {
    tracing::info!("Type-checking {:?}", input);

    let source = std::fs::read_to_string(input)
        .map_err(|e| miette::miette!("Failed to read input file: {}", e))?;

    if let Some(EmitType::Ast) = emit {
        let model = dimcheck::parse(&source)?;
        let json = serde_json::to_string_pretty(&model)
            .map_err(|e| miette::miette!("Failed to serialize AST: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    let name = input.to_string_lossy();
    let registry = TypeRegistry::new();
    let (model, checked, reporter) = dimcheck::analyze(&name, &source, &registry)?;
    tracing::debug!(
        "{} declarations, {} unit types interned",
        model.declarations.len(),
        registry.len()
    );

    match config.output.format {
        OutputFormat::Human => {
            reporter.emit_all();
            if config.output.show_types {
                for (decl_name, ty) in &checked.declarations {
                    match ty {
                        Ok(ty) => println!("{:<16} {}", decl_name, ty),
                        Err(_) => println!("{:<16} <error>", decl_name),
                    }
                }
            }
        }
        OutputFormat::Json => {
            let report = CheckReport {
                file: name.to_string(),
                declarations: checked
                    .declarations
                    .iter()
                    .map(|(decl_name, ty)| DeclarationReport {
                        name: decl_name,
                        ty: ty.as_ref().ok().map(|t| t.pretty_print()),
                        key: ty.as_ref().ok().map(|t| t.name().to_string()),
                    })
                    .collect(),
                errors: reporter.error_messages(),
                warnings: reporter.warning_messages(),
            };
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| miette::miette!("Failed to serialize report: {}", e))?;
            println!("{}", json);
        }
    }

    if reporter.has_errors() {
        return Err(miette::miette!(
            "{} errors found in {}",
            reporter.error_count(),
            input.display()
        ));
    }
    if config.check.deny_warnings && reporter.warning_count() > 0 {
        return Err(miette::miette!(
            "{} warnings found in {} (warnings are denied)",
            reporter.warning_count(),
            input.display()
        ));
    }

    if config.output.format == OutputFormat::Human {
        println!("All checks passed: {}", input.display());
    }
    Ok(())
}

#[derive(Serialize)]
struct UnitReport<'a> {
    name: &'a str,
    key: String,
    pretty: String,
    dimension: dimcheck::DimensionVector,
}

fn unit(names: &[String], json: bool) -> Result<()> {
    let catalogue = UnitCatalogue::standard();
    let mut reports = Vec::with_capacity(names.len());

    for name in names {
        let dim = dimcheck::units::try_resolve_unit_in(catalogue, name)
            .map_err(|e| miette::miette!("{}", e))?
            .ok_or_else(|| miette::miette!("unit `{}` is not recognized", name))?;
        reports.push(UnitReport {
            name,
            key: dim.serialize(),
            pretty: dim.pretty_print(),
            dimension: dim,
        });
    }

    if json {
        let json = serde_json::to_string_pretty(&reports)
            .map_err(|e| miette::miette!("Failed to serialize units: {}", e))?;
        println!("{}", json);
    } else {
        for report in &reports {
            println!("{:<8} {:<28} {}", report.name, report.key, report.pretty);
        }
    }
    Ok(())
}

fn prefixes() -> Result<()> {
    let catalogue = UnitCatalogue::standard();

    println!("Prefixes (matched in this order):");
    for prefix in catalogue.prefixes() {
        if let Some(magnitude) = catalogue.prefix_magnitude(prefix) {
            println!("  {:<4} e{}", prefix, magnitude);
        }
    }
    println!();
    println!("Units:");
    for (name, dim) in catalogue.units() {
        println!("  {:<4} {}", name, dim);
    }
    Ok(())
}

fn info() -> Result<()> {
    let catalogue = UnitCatalogue::standard();

    println!("dimcheck");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Catalogue:");
    println!("  - {} prefixes", catalogue.prefix_count());
    println!("  - {} named units", catalogue.unit_count());
    println!();
    println!("Base dimensions (serialization order):");
    println!("  temperature, time, length, mass, luminous intensity,");
    println!("  amount of substance, current, magnitude");

    Ok(())
}
