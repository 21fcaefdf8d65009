use serde_json::Value;

/// Headline figures, most decisive first.
const PRIORITY_KEYS: [&str; 8] = [
    "npv",
    "payback_month",
    "total_mrr",
    "annual_revenue",
    "base_case_value",
    "total_new_customers",
    "carbon_per_customer",
    "demand_factors",
];

/// Print just the key answer value from the output.
///
/// Looks through the result (and a nested `summary` object, as produced by
/// `simulate`) for the first non-null headline field, then falls back to the
/// first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        let summary = map.get("summary").and_then(Value::as_object);
        for key in &PRIORITY_KEYS {
            let found = map
                .get(*key)
                .or_else(|| summary.and_then(|s| s.get(*key)))
                .filter(|v| !v.is_null());
            if let Some(val) = found {
                println!("{}", format_minimal(val));
                return;
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
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(format_minimal).collect::<Vec<_>>().join(","),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
