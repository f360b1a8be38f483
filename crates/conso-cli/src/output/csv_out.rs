use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// Consolidation output flattens to one record per statement row, with
/// the reporting group as the first column. Anything else falls back to
/// field/value records.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value.get("result").unwrap_or(value);

    if let Some(statements) = result.get("statements").and_then(Value::as_array) {
        let _ = wtr.write_record(["group", "label", "kind", "amount"]);
        for statement in statements {
            let group = statement
                .get("group")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let rows = statement
                .get("rows")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            for row in rows {
                let _ = wtr.write_record([
                    group,
                    row.get("label").and_then(Value::as_str).unwrap_or_default(),
                    &format_csv_value(row.get("kind").unwrap_or(&Value::Null)),
                    &format_csv_value(row.get("amount").unwrap_or(&Value::Null)),
                ]);
            }
        }
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
        }
    } else {
        let _ = wtr.write_record([&format_csv_value(result)]);
    }

    let _ = wtr.flush();
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
