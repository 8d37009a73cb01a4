//! Result rendering: JSON, YAML or a table on stdout

use anyhow::Result;
use comfy_table::Table;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, clap::ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> Result<()> {
    let json_value = serde_json::to_value(data)?;
    println!("{}", render(&json_value, format)?);
    Ok(())
}

/// Render a value in the requested format without printing it
pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Table => render_table(value),
    };
    Ok(rendered)
}

fn render_table(value: &Value) -> String {
    match value {
        Value::Array(arr) if !arr.is_empty() => {
            let mut table = Table::new();

            // Get headers from first object
            if let Value::Object(first) = &arr[0] {
                let headers: Vec<String> = first.keys().cloned().collect();
                table.set_header(headers.clone());

                for item in arr {
                    if let Value::Object(obj) = item {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| format_value(obj.get(h).unwrap_or(&Value::Null)))
                            .collect();
                        table.add_row(row);
                    }
                }
            } else {
                // Simple array of values
                table.set_header(vec!["Value"]);
                for item in arr {
                    table.add_row(vec![format_value(item)]);
                }
            }

            table.to_string()
        }
        Value::Array(_) => "(no records)".to_string(),
        Value::Object(obj) => {
            let mut table = Table::new();
            table.set_header(vec!["Key", "Value"]);

            for (key, val) in obj {
                table.add_row(vec![key.clone(), format_value(val)]);
            }

            table.to_string()
        }
        _ => format_value(value),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_json_is_pretty() {
        let out = render(&json!([{"id": 1}]), OutputFormat::Json).unwrap();
        assert!(out.contains("\n"));
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, json!([{"id": 1}]));
    }

    #[test]
    fn test_render_yaml() {
        let out = render(&json!([{"id": 1, "level": "error"}]), OutputFormat::Yaml).unwrap();
        assert!(out.contains("id: 1"));
        assert!(out.contains("level: error"));
    }

    #[test]
    fn test_render_table_of_records() {
        let records = json!([
            {"id": "a", "count": 3, "tags": ["x", "y"]},
            {"id": "b", "count": 5}
        ]);
        let out = render(&records, OutputFormat::Table).unwrap();
        assert!(out.contains("id"));
        assert!(out.contains("count"));
        assert!(out.contains("[2 items]"));
        assert!(out.contains("null"));
    }

    #[test]
    fn test_render_table_scalars_and_empty() {
        let out = render(&json!([1, "two"]), OutputFormat::Table).unwrap();
        assert!(out.contains("Value"));
        assert!(out.contains("two"));

        let out = render(&json!([]), OutputFormat::Table).unwrap();
        assert_eq!(out, "(no records)");

        let out = render(&json!({"endpoint": "http://x"}), OutputFormat::Table).unwrap();
        assert!(out.contains("endpoint"));
    }
}
