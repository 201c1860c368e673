use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// Schedules become one row per period; everything else is a two-column
/// field/value listing of the result.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            if let Some(Value::Array(periods)) = map.get("periods") {
                write_rows(&mut wtr, periods);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    write_field(&mut wtr, key, val);
                }
            }
        }
        Value::Array(rows) => write_rows(&mut wtr, rows),
        _ => {
            let _ = wtr.write_record([&format_csv_value(result)]);
        }
    }

    let _ = wtr.flush();
}

/// Nested objects (validation, policy, affordability) are flattened to
/// dotted keys so each leaf gets its own row.
fn write_field(wtr: &mut csv::Writer<io::StdoutLock<'_>>, key: &str, val: &Value) {
    match val {
        Value::Object(inner) => {
            for (k, v) in inner {
                write_field(wtr, &format!("{key}.{k}"), v);
            }
        }
        _ => {
            let _ = wtr.write_record([key, &format_csv_value(val)]);
        }
    }
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
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
