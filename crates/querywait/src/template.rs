//! `{{name}}` placeholder rendering for query text
//!
//! The waiter only ever sees the rendered string.

use regex::{Captures, Regex};

use querywait_core::CoreError;

const PLACEHOLDER: &str = r"\{\{\s*([A-Za-z_][A-Za-z0-9_.-]*)\s*\}\}";

/// Replace every placeholder with its `--var` value
///
/// Later definitions of the same name win. Any placeholder without a value
/// is an error listing all missing names.
pub fn render(template: &str, vars: &[(String, String)]) -> Result<String, CoreError> {
    let re = Regex::new(PLACEHOLDER)
        .map_err(|e| CoreError::InvalidArgument(format!("template pattern: {}", e)))?;

    let mut missing: Vec<String> = Vec::new();
    let rendered = re.replace_all(template, |caps: &Captures| {
        let name = &caps[1];
        match vars.iter().rev().find(|(key, _)| key == name) {
            Some((_, value)) => value.clone(),
            None => {
                if !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
                caps[0].to_string()
            }
        }
    });

    if !missing.is_empty() {
        return Err(CoreError::InvalidArgument(format!(
            "unresolved template variable(s): {} (pass --var NAME=VALUE)",
            missing.join(", ")
        )));
    }

    Ok(rendered.into_owned())
}
