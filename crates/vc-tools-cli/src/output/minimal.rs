use serde_json::{Map, Value};

/// Key answers, most specific first. Each key is looked up on the result
/// object and then one level down in its nested objects.
const PRIORITY_KEYS: [&str; 11] = [
    "net_tvpi",
    "expected_tvpi",
    "best_for_founders",
    "adjusted_series_a_shares",
    "effective_price",
    "expected_option_value",
    "implied_pre_money",
    "series_a_stake_pre_b",
    "target_stake",
    "pre_money",
    "total",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => {
            for key in &PRIORITY_KEYS {
                if let Some(val) = find_key(map, key) {
                    println!("{}", format_minimal(val));
                    return;
                }
            }

            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
                return;
            }
        }
        // Sweeps: print the last point
        Value::Array(points) => {
            if let Some(last) = points.last() {
                println!("{}", format_minimal(last));
                return;
            }
        }
        _ => {}
    }

    println!("{}", format_minimal(result_obj));
}

fn find_key<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
        return Some(val);
    }
    map.values()
        .filter_map(Value::as_object)
        .find_map(|nested| nested.get(key).filter(|v| !v.is_null()))
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
