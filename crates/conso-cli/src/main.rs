mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::run::RunArgs;

/// Monthly group consolidation and intercompany reconciliation
#[derive(Parser)]
#[command(
    name = "conso",
    version,
    about = "Monthly group consolidation and intercompany reconciliation",
    long_about = "Runs the monthly group consolidation with decimal precision: \
                  chart-of-accounts mapping, intercompany eliminations, \
                  business-unit allocation, payroll capitalization split, \
                  IFRS 16 lease reclassification and statement assembly."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full consolidation for one period
    Run(RunArgs),
    /// Run only the intercompany reconciliation and mapping alerts
    Reconcile(RunArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
}

fn main() {
    if atty::isnt(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Reconcile(args) => commands::reconcile::run(args),
        Commands::Version => {
            println!("conso {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
