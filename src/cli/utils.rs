use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "success": true, "message": message }))?
            );
        }
        OutputFormat::Text => println!("✓ {}", message),
    }
    Ok(())
}

fn text_field<'a>(space: &'a Value, key: &str) -> &'a str {
    space.get(key).and_then(Value::as_str).unwrap_or("")
}

fn disabled_features(space: &Value) -> String {
    space
        .get("disabledFeatures")
        .and_then(Value::as_array)
        .map(|features| {
            features
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default()
}

/// Output a single space
pub fn output_space(output_format: OutputFormat, space: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(space)?),
        OutputFormat::Text => {
            println!("ID:          {}", text_field(space, "id"));
            println!("Name:        {}", text_field(space, "name"));
            let description = text_field(space, "description");
            if !description.is_empty() {
                println!("Description: {}", description);
            }
            let disabled = disabled_features(space);
            if !disabled.is_empty() {
                println!("Disabled:    {}", disabled);
            }
            if space.get("_reserved").and_then(Value::as_bool).unwrap_or(false) {
                println!("Reserved:    yes");
            }
        }
    }
    Ok(())
}

/// Output a list of spaces
pub fn output_spaces(output_format: OutputFormat, spaces: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(spaces)?),
        OutputFormat::Text => {
            let list = spaces.as_array().map(Vec::as_slice).unwrap_or(&[]);
            if list.is_empty() {
                println!("No spaces found");
                return Ok(());
            }
            println!("{:<24} {:<32} {}", "ID", "NAME", "DISABLED FEATURES");
            for space in list {
                println!(
                    "{:<24} {:<32} {}",
                    text_field(space, "id"),
                    text_field(space, "name"),
                    disabled_features(space)
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_disabled_features() {
        let space = json!({ "id": "s", "disabledFeatures": ["discover", "dev_tools"] });
        assert_eq!(disabled_features(&space), "discover,dev_tools");
        assert_eq!(disabled_features(&json!({ "id": "s" })), "");
    }
}
