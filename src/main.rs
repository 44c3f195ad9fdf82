use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sequent_engine::{CommandRegistry, EquivInductCommand};
use sequent_netlist::{Design, DesignStats};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// sequent - SAT-based equivalence proving over logic netlists
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute engine commands against a design
    Run {
        /// Design file (JSON)
        design: PathBuf,

        /// Command line to execute, e.g. "equiv_induct -seq 4"; repeatable
        #[arg(short = 'c', long = "command", required = true)]
        commands: Vec<String>,

        /// Write the mutated design back to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print per-module statistics for a design
    Show {
        /// Design file (JSON)
        design: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Run {
            design,
            commands,
            output,
        } => run(&design, &commands, output.as_deref()),
        Commands::Show { design } => show(&design),
    }
}

fn load_design(path: &Path) -> Result<Design> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read design {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("failed to parse design {}", path.display()))
}

fn run(path: &Path, commands: &[String], output: Option<&Path>) -> Result<()> {
    let mut design = load_design(path)?;

    // Command registration is an explicit act of the host, here and nowhere
    // else.
    let mut registry = CommandRegistry::new();
    registry.register(Box::new(EquivInductCommand));

    for line in commands {
        registry
            .execute_line(line, &mut design)
            .with_context(|| format!("command failed: {line}"))?;
    }

    if let Some(output) = output {
        let data = serde_json::to_string_pretty(&design)?;
        fs::write(output, data)
            .with_context(|| format!("failed to write design {}", output.display()))?;
        info!("Wrote design to {}", output.display());
    }
    Ok(())
}

fn show(path: &Path) -> Result<()> {
    let design = load_design(path)?;
    let stats = DesignStats::from_design(&design);
    for module in &stats.modules {
        println!(
            "module {} ({} wires, {} cells)",
            module.name, module.wires, module.cells
        );
        for (kind, count) in &module.cells_by_kind {
            println!("  {count:>6} {kind}");
        }
        println!(
            "  markers: {} proven, {} unproven",
            module.proven_markers, module.unproven_markers
        );
    }
    Ok(())
}
