use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Render output with the tabled crate: scalar result fields first, then
/// any schedule periods, field errors, warnings and the methodology line.
pub fn print_table(value: &Value) {
    let Value::Object(envelope) = value else {
        println!("{value}");
        return;
    };

    match envelope.get("result") {
        Some(Value::Object(result)) => {
            print_fields(result);
            if let Some(Value::Array(periods)) = result.get("periods") {
                println!();
                print_rows(periods);
            }
            if let Some(Value::Object(validation)) = result.get("validation") {
                print_field_errors(validation);
            }
        }
        _ => print_fields(envelope),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if matches!(key.as_str(), "periods" | "validation") {
            continue;
        }
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_field_errors(validation: &Map<String, Value>) {
    let valid = validation.get("valid").and_then(Value::as_bool).unwrap_or(false);
    println!("\nValid: {valid}");

    if let Some(Value::Object(errors)) = validation.get("field_errors") {
        if errors.is_empty() {
            return;
        }
        let mut builder = Builder::default();
        builder.push_record(["Field", "Error"]);
        for (field, message) in errors {
            builder.push_record([field.as_str(), &format_value(message)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }

    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
