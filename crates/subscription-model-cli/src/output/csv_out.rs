use serde_json::Value;
use std::io;

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// A projection (`result.months`) becomes one row per month; a sensitivity
/// grid becomes one row per `variable_1` value; anything else is written as
/// `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                if let Some(Value::Array(months)) = result.get("months") {
                    write_array_csv(&mut wtr, months);
                } else if let Some(Value::Array(matrix)) = result.get("matrix") {
                    write_matrix_csv(&mut wtr, result, matrix);
                } else {
                    write_pairs(&mut wtr, result);
                }
            }
            _ => write_pairs(&mut wtr, map),
        },
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_pairs(wtr: &mut StdoutWriter<'_>, map: &serde_json::Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn write_array_csv(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn write_matrix_csv(
    wtr: &mut StdoutWriter<'_>,
    result: &serde_json::Map<String, Value>,
    matrix: &[Value],
) {
    let row_name = result
        .get("variable_1_name")
        .and_then(Value::as_str)
        .unwrap_or("variable_1");
    let row_values = result
        .get("variable_1_values")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let col_values = result
        .get("variable_2_values")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut header = vec![row_name.to_string()];
    header.extend(col_values.iter().map(format_csv_value));
    let _ = wtr.write_record(&header);

    for (idx, row) in matrix.iter().enumerate() {
        let mut record = vec![row_values.get(idx).map(format_csv_value).unwrap_or_default()];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(format_csv_value));
        }
        let _ = wtr.write_record(&record);
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_csv_value).collect::<Vec<_>>().join(";"),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
