use serde_json::Value;

/// Print just the headline answer.
///
/// Validation results print `valid` or the list of failing fields; other
/// results print the first well-known field found, else the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(validation) = result_obj.get("validation") {
        println!("{}", summarize_validation(validation));
        return;
    }

    let priority_keys = [
        "monthly_payment",
        "rate_pct",
        "available_immediately",
        "approved",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn summarize_validation(validation: &Value) -> String {
    match validation.get("field_errors") {
        Some(Value::Object(errors)) if !errors.is_empty() => {
            let fields: Vec<&str> = errors.keys().map(|k| k.as_str()).collect();
            format!("invalid: {}", fields.join(", "))
        }
        _ => "valid".to_string(),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
