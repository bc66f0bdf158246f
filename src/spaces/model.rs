use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::SpacesError;
use crate::saved_objects::{Attributes, SavedObject};

/// Saved-object type under which spaces are stored
pub const SPACE_TYPE: &str = "space";

/// Id of the space created at startup; it is reserved and can't be deleted
pub const DEFAULT_SPACE_ID: &str = "default";

/// Public representation of a space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub disabled_features: Vec<String>,
    #[serde(rename = "_reserved", default, skip_serializing_if = "Option::is_none")]
    pub reserved: Option<bool>,
}

impl Space {
    pub fn is_reserved(&self) -> bool {
        self.reserved.unwrap_or(false)
    }

    /// Build the public form from a stored object. The id lives on the object, not in its attributes.
    pub fn from_saved_object(object: SavedObject) -> Result<Self, SpacesError> {
        let SavedObject { id, mut attributes, .. } = object;
        attributes.insert("id".to_string(), Value::String(id.clone()));

        serde_json::from_value(Value::Object(attributes)).map_err(|e| SpacesError::Corrupt {
            id,
            reason: e.to_string(),
        })
    }

    /// Attributes written when bootstrapping the default space
    pub fn default_space_attributes() -> Attributes {
        match json!({
            "name": "Default",
            "description": "This is your default space!",
            "color": "#00bfb3",
            "disabledFeatures": [],
            "_reserved": true,
        }) {
            Value::Object(map) => map,
            _ => Attributes::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(id: &str, attributes: Value) -> SavedObject {
        SavedObject {
            object_type: SPACE_TYPE.to_string(),
            id: id.to_string(),
            attributes: attributes.as_object().cloned().unwrap(),
            version: None,
            updated_at: None,
        }
    }

    #[test]
    fn converts_saved_object_with_missing_optionals() {
        let space = Space::from_saved_object(saved("a-space", json!({ "name": "A" }))).unwrap();
        assert_eq!(space.id, "a-space");
        assert_eq!(space.name, "A");
        assert!(space.disabled_features.is_empty());
        assert!(!space.is_reserved());
    }

    #[test]
    fn serializes_camel_case_and_skips_absent_fields() {
        let space = Space::from_saved_object(saved(
            "s",
            json!({ "name": "S", "description": "", "disabledFeatures": ["dev_tools"], "imageUrl": "" }),
        ))
        .unwrap();

        let value = serde_json::to_value(&space).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "s",
                "name": "S",
                "description": "",
                "imageUrl": "",
                "disabledFeatures": ["dev_tools"],
            })
        );
    }

    #[test]
    fn default_space_is_reserved() {
        let space = Space::from_saved_object(saved(
            DEFAULT_SPACE_ID,
            Value::Object(Space::default_space_attributes()),
        ))
        .unwrap();
        assert!(space.is_reserved());
        assert_eq!(space.name, "Default");
    }

    #[test]
    fn missing_name_is_corrupt() {
        let err = Space::from_saved_object(saved("broken", json!({ "description": "x" }))).unwrap_err();
        assert!(matches!(err, SpacesError::Corrupt { ref id, .. } if id == "broken"));
    }
}
