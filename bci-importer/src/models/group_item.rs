//! Repeated-group item

use serde::{Deserialize, Serialize};

/// One item of an entity's group-list
///
/// Every field is always present; missing input becomes an empty string so
/// all items in a list share one shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GroupItem {
    #[serde(default)]
    pub sequence_number: String,
    #[serde(default)]
    pub asset_reference: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub batch: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape_is_fixed() {
        let item = GroupItem {
            sequence_number: "1".into(),
            ..GroupItem::default()
        };
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "sequence-number": "1",
                "asset-reference": "",
                "course": "",
                "batch": "",
            })
        );
    }

    #[test]
    fn test_missing_keys_deserialize_to_empty() {
        let item: GroupItem = serde_json::from_str(r#"{"course":"Intro"}"#).unwrap();
        assert_eq!(item.course, "Intro");
        assert_eq!(item.batch, "");
    }
}
