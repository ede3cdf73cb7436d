use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    let Value::Object(res_map) = result else {
        print_flat_object(envelope);
        return;
    };

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in res_map {
        if is_nested(key) {
            continue;
        }
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));

    // Single layer dump
    if let (Some(Value::Array(rows)), layer) = (res_map.get("rows"), res_map.get("layer")) {
        let title = layer.and_then(Value::as_str).unwrap_or("lattice");
        print_grid(title, rows);
    }

    // Layers attached to a pricing result
    if let Some(Value::Object(layers)) = res_map.get("lattice") {
        for (name, rows) in layers {
            if let Value::Array(rows) = rows {
                print_grid(name, rows);
            }
        }
    }

    if let Some(Value::Array(probs)) = res_map.get("local_probabilities") {
        if !probs.is_empty() {
            println!("\nLocal up-probabilities:");
            print_array_table(probs);
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn is_nested(key: &str) -> bool {
    matches!(key, "rows" | "lattice" | "local_probabilities")
}

/// One row per down-move level, columns by up-move count.
fn print_grid(title: &str, rows: &[Value]) {
    let width = rows.first().and_then(Value::as_array).map_or(0, Vec::len);

    let mut builder = Builder::default();
    let mut header = vec!["down \\ up".to_string()];
    header.extend((0..width).map(|c| c.to_string()));
    builder.push_record(header);

    for (down, row) in rows.iter().enumerate() {
        let cells = row.as_array().map(Vec::as_slice).unwrap_or(&[]);
        let mut record = vec![down.to_string()];
        record.extend((0..width).map(|c| cells.get(c).map(format_cell).unwrap_or_default()));
        builder.push_record(record);
    }

    println!("\nLattice: {}", title);
    println!("{}", Table::from(builder));
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

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

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => format_value(other),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
