//! Ringwatch CLI tool.
//!
//! Analyzes CSV ledgers for money-muling rings, generates demo data and
//! inspects configuration.

use anyhow::Context;
use clap::{Parser, Subcommand};
use ringwatch::aml::types::{AnalysisResult, PatternType};
use ringwatch::catalog::{kernels, total_kernel_count};
use ringwatch::config::RingwatchConfig;
use ringwatch::demo::DemoGenerator;
use ringwatch::export::AnalysisReport;
use ringwatch::ingest::{self, IngestMode};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ringwatch")]
#[command(version, about = "Money-muling ring detection for transaction ledgers", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a CSV ledger
    Analyze {
        /// Ledger with columns transaction_id,sender_id,receiver_id,amount,timestamp
        input: PathBuf,

        /// Write the JSON report to this file
        #[arg(short, long)]
        json: Option<PathBuf>,

        /// Fail on the first malformed row instead of skipping it
        #[arg(long)]
        strict: bool,

        /// Run the detectors in parallel
        #[arg(long)]
        parallel: bool,

        /// Number of accounts to list
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Generate a demo ledger with planted rings
    Demo {
        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output CSV file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of random background transfers
        #[arg(long, default_value = "80")]
        mesh: usize,

        /// Analyze the generated ledger right away
        #[arg(long)]
        analyze: bool,
    },

    /// Print the CSV template
    Template {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List analysis kernels
    Kernels,

    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    config.logging = config.logging.with_verbosity(cli.verbose);
    config.logging.init()?;
    tracing::debug!(analysis = ?config.analysis, "configuration loaded");

    match cli.command {
        Commands::Analyze {
            input,
            json,
            strict,
            parallel,
            top,
        } => {
            if parallel {
                config.analysis.parallel_detectors = true;
            }
            let mode = if strict {
                IngestMode::Strict
            } else {
                IngestMode::Lenient
            };
            cmd_analyze(&config, &input, json.as_deref(), mode, top)?;
        }

        Commands::Demo {
            seed,
            output,
            mesh,
            analyze,
        } => {
            cmd_demo(&config, seed, output.as_deref(), mesh, analyze)?;
        }

        Commands::Template { output } => {
            cmd_template(output.as_deref())?;
        }

        Commands::Kernels => {
            cmd_kernels()?;
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RingwatchConfig> {
    let config = match path {
        Some(path) => RingwatchConfig::from_file(path)?.with_env_overrides()?,
        None => RingwatchConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

fn cmd_analyze(
    config: &RingwatchConfig,
    input: &Path,
    json: Option<&Path>,
    mode: IngestMode,
    top: usize,
) -> anyhow::Result<()> {
    let ingest = ingest::read_file(input, mode)
        .with_context(|| format!("failed to read ledger {}", input.display()))?;

    if !ingest.is_clean() {
        eprintln!(
            "warning: skipped {} malformed row(s) in {}",
            ingest.skipped.len(),
            input.display()
        );
    }

    let result = ringwatch::analyze(&ingest.transactions, &config.analysis)?;
    print_result(&result, top);

    if let Some(path) = json {
        AnalysisReport::from(&result)
            .write_json(path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        println!("\nReport written to {}", path.display());
    }

    Ok(())
}

fn cmd_demo(
    config: &RingwatchConfig,
    seed: u64,
    output: Option<&Path>,
    mesh: usize,
    analyze: bool,
) -> anyhow::Result<()> {
    let generator = DemoGenerator::new(seed).with_mesh_transactions(mesh);

    let transactions = match output {
        Some(path) => {
            let transactions = generator.write_csv(path)?;
            eprintln!(
                "Wrote {} transactions to {}",
                transactions.len(),
                path.display()
            );
            transactions
        }
        None if analyze => generator.generate(),
        None => {
            let transactions = generator.generate();
            ingest::write_transactions(std::io::stdout().lock(), &transactions)?;
            transactions
        }
    };

    if analyze {
        let result = ringwatch::analyze(&transactions, &config.analysis)?;
        print_result(&result, 20);
    }

    Ok(())
}

fn cmd_template(output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, ingest::TEMPLATE)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Template written to {}", path.display());
        }
        None => {
            std::io::stdout().lock().write_all(ingest::TEMPLATE.as_bytes())?;
        }
    }
    Ok(())
}

fn cmd_kernels() -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                 Ringwatch Analysis Kernels                       ║");
    println!("╚══════════════════════════════════════════════════════════════════╝\n");

    for kernel in kernels() {
        println!(
            "  {:<28} v{}  {}",
            kernel.id, kernel.version, kernel.description
        );
    }

    println!("\nTotal: {} kernels", total_kernel_count());
    Ok(())
}

fn print_result(result: &AnalysisResult, top: usize) {
    let summary = &result.summary;

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                     Ring Analysis Summary                        ║");
    println!("╚══════════════════════════════════════════════════════════════════╝\n");

    println!("Accounts analyzed:   {}", summary.total_accounts);
    println!("Accounts flagged:    {}", summary.flagged_accounts);
    println!("Rings detected:      {}", summary.ring_count);
    println!("Processing time:     {:.3}s", summary.elapsed_seconds);
    println!();

    for pattern in [
        PatternType::Cycle,
        PatternType::FanIn,
        PatternType::FanOut,
        PatternType::LayeringShell,
    ] {
        println!(
            "  {:<16} {:>4}",
            pattern.as_str(),
            result.rings_of(pattern).count()
        );
    }

    if !result.rings.is_empty() {
        println!("\nFraud rings:");
        println!("──────────────────────────────────────────────────────────────────");
        println!("  {:<10} {:<16} {:>6} {:>8}  members", "ring", "pattern", "risk", "size");
        for ring in &result.rings {
            println!(
                "  {:<10} {:<16} {:>6.1} {:>8}  {}",
                ring.id,
                ring.pattern_type.as_str(),
                ring.risk_score,
                ring.members.len(),
                preview(&ring.members, 4)
            );
        }
    }

    if !result.accounts.is_empty() {
        println!("\nSuspicious accounts:");
        println!("──────────────────────────────────────────────────────────────────");
        println!("  {:<14} {:>6}  {:<10} patterns", "account", "score", "ring");
        for account in result.accounts.iter().take(top) {
            let tags: Vec<String> = account
                .detected_patterns
                .iter()
                .map(ToString::to_string)
                .collect();
            println!(
                "  {:<14} {:>6.1}  {:<10} {}",
                account.account_id,
                account.suspicion_score,
                account.ring_id,
                tags.join(", ")
            );
        }
        if result.accounts.len() > top {
            println!("  ... {} more", result.accounts.len() - top);
        }
    }
}

fn preview(members: &[String], limit: usize) -> String {
    if members.len() <= limit {
        return members.join(", ");
    }
    format!(
        "{} ... (+{})",
        members[..limit].join(", "),
        members.len() - limit
    )
}
