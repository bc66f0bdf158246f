use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::saved_objects::Attributes;

/// Field name -> error message
pub type FieldErrors = HashMap<String, String>;

/// Request body accepted by space create and update
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpacePayload {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub initials: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub disabled_features: Vec<String>,
    /// Accepted so clients can send back a space they fetched; never persisted.
    #[serde(rename = "_reserved", default)]
    pub reserved: Option<bool>,
}

pub fn is_valid_space_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

fn is_valid_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_alphanumeric()),
        None => false,
    }
}

impl SpacePayload {
    /// Check field rules not expressible through serde alone
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if !is_valid_space_id(&self.id) {
            errors.insert(
                "id".to_string(),
                "lower case, a-z, 0-9, \"_\", and \"-\" are allowed".to_string(),
            );
        }
        if self.name.is_empty() {
            errors.insert("name".to_string(), "must not be empty".to_string());
        }
        if let Some(initials) = &self.initials {
            if initials.chars().count() > 2 {
                errors.insert("initials".to_string(), "must be at most 2 characters".to_string());
            }
        }
        if let Some(color) = &self.color {
            if !is_valid_color(color) {
                errors.insert(
                    "color".to_string(),
                    "must be a 6 digit hex color, starting with #".to_string(),
                );
            }
        }
        if let Some(image_url) = &self.image_url {
            if !image_url.is_empty() && !image_url.starts_with("data:image") {
                errors.insert("imageUrl".to_string(), "must start with data:image".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Attributes written to the repository. Optional fields that were not
    /// supplied are left out so a partial update keeps their stored value;
    /// `disabledFeatures` is always written.
    pub fn to_attributes(&self) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("name".to_string(), Value::String(self.name.clone()));

        let optional = [
            ("description", &self.description),
            ("initials", &self.initials),
            ("color", &self.color),
            ("imageUrl", &self.image_url),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                attributes.insert(key.to_string(), Value::String(value.clone()));
            }
        }

        attributes.insert("disabledFeatures".to_string(), json!(self.disabled_features));
        attributes
    }
}
