use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use conso_core::config::ConsolidationConfig;
use conso_core::pipeline::{self, PeriodInput};

use crate::input;

/// One run specification: the period data plus an optional `config`
/// block. Omitted configuration fields fall back to the standard group
/// setup.
#[derive(Deserialize)]
pub struct RunSpec {
    #[serde(default)]
    pub config: ConsolidationConfig,
    pub input: PeriodInput,
}

/// Arguments shared by the run and reconcile commands
#[derive(Args)]
pub struct RunArgs {
    /// Path to the JSON run specification, or "-" for stdin
    pub input: Option<String>,

    /// Override the configured reconciliation tolerance
    #[arg(long)]
    pub tolerance: Option<Decimal>,
}

pub fn load_spec(args: &RunArgs) -> Result<RunSpec, Box<dyn std::error::Error>> {
    let mut spec: RunSpec = match args.input.as_deref() {
        Some("-") | None => {
            let data = input::stdin::read_stdin()?
                .ok_or("a run specification is required: <input.json> or piped stdin")?;
            serde_json::from_value(data)?
        }
        Some(path) => input::file::read_json(path)?,
    };

    if let Some(tolerance) = args.tolerance {
        spec.config.tolerance = tolerance;
    }
    Ok(spec)
}

pub fn run(args: RunArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let spec = load_spec(&args)?;
    let output = pipeline::run_consolidation(&spec.input, &spec.config)?;
    Ok(serde_json::to_value(output)?)
}
