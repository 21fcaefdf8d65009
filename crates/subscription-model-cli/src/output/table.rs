use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Columns shown for each month of a projection.
const MONTH_COLUMNS: [&str; 9] = [
    "label",
    "marketing_spend",
    "new_customers",
    "churned",
    "customers",
    "revenue",
    "carbon_cost",
    "free_cash_flow",
    "margin_warning",
];

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr, None),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => {
            if let Some(Value::Array(months)) = res_map.get("months") {
                print_array_table(months, Some(&MONTH_COLUMNS));
                if let Some(Value::Object(summary)) = res_map.get("summary") {
                    println!();
                    print_flat_object(summary);
                }
            } else {
                print_flat_object(res_map);
            }
        }
        Value::Array(arr) => print_array_table(arr, None),
        _ => print_flat_object(envelope),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value], columns: Option<&[&str]>) {
    let Some(Value::Object(first)) = arr.first() else {
        if arr.is_empty() {
            println!("(empty)");
        }
        for item in arr {
            println!("{}", format_value(item));
        }
        return;
    };

    let headers: Vec<String> = match columns {
        Some(cols) => cols.iter().map(|c| c.to_string()).collect(),
        None => first.keys().cloned().collect(),
    };
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for map in arr.iter().filter_map(Value::as_object) {
        let row: Vec<String> = headers
            .iter()
            .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
            .collect();
        builder.push_record(row);
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
