use colored::Colorize;
use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format consolidation output as tables: one per assembled statement,
/// plus the reconciliation recaps. Anything else falls back to a flat
/// field/value table.
pub fn print_table(value: &Value) {
    let result = value.get("result").unwrap_or(value);

    let mut printed = false;

    if let Some(statements) = result.get("statements").and_then(Value::as_array) {
        for statement in statements {
            print_statement(statement);
        }
        printed = true;
    }

    for key in ["pl_reconciliation", "bs_reconciliation", "unmapped_accounts"] {
        if let Some(arr) = result.get(key).and_then(Value::as_array) {
            if !arr.is_empty() {
                println!("\n{}", key.replace('_', " ").to_uppercase().bold());
                print_array_table(arr);
            }
            printed = true;
        }
    }

    if !printed {
        print_flat_object(result);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow().bold());
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_statement(statement: &Value) {
    if let Some(group) = statement.get("group").and_then(Value::as_str) {
        println!("\n{}", group.bold());
    }
    let rows = match statement.get("rows").and_then(Value::as_array) {
        Some(rows) => rows,
        None => return,
    };

    let mut builder = Builder::default();
    builder.push_record(["Line", "Amount"]);
    for row in rows {
        let label = row.get("label").and_then(Value::as_str).unwrap_or_default();
        let amount = row
            .get("amount")
            .map(format_value)
            .unwrap_or_default();
        builder.push_record([label, amount.as_str()]);
    }
    println!("{}", Table::from(builder));
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        println!("{}", value);
    }
}

fn print_array_table(arr: &[Value]) {
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
