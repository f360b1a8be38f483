use serde_json::{json, Value};

use conso_core::pipeline;

use super::run::{load_spec, RunArgs};

/// Run the full pipeline but report only the reconciliation recaps and
/// the mapping alert list, for the month-end review loop.
pub fn run(args: RunArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let spec = load_spec(&args)?;
    let output = pipeline::run_consolidation(&spec.input, &spec.config)?;

    Ok(json!({
        "result": {
            "period": output.result.period.to_string(),
            "pl_reconciliation": output.result.pl_reconciliation,
            "bs_reconciliation": output.result.bs_reconciliation,
            "unmapped_accounts": output.result.unmapped_accounts,
        },
        "methodology": output.methodology,
        "warnings": output.warnings,
    }))
}
