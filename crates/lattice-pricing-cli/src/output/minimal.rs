use serde_json::Value;

/// Print just the key answer value from the output.
///
/// A layer dump prints tab-separated rows; otherwise the first well-known
/// result field, falling back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = ["present_value", "up"];

    if let Value::Object(map) = result_obj {
        if let Some(Value::Array(rows)) = map.get("rows") {
            for row in rows {
                let cells: Vec<String> = row
                    .as_array()
                    .map(|r| r.iter().map(format_minimal).collect())
                    .unwrap_or_default();
                println!("\t{}", cells.join("\t"));
            }
            return;
        }

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

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "None".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
