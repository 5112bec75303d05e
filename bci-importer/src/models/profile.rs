//! Field vocabulary of an import

/// Names the pipeline relies on
///
/// Defaults describe the student roster format: natural key
/// `student-first-name` + `student-last-name`, repeated fields under
/// `group-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportProfile {
    /// Kind assigned to created entities
    pub entity_kind: String,
    pub first_name_field: String,
    pub last_name_field: String,
    /// Prefix routing a field to the repeated group
    pub group_prefix: String,
    /// Attribute key holding the serialized group-list
    pub group_list_key: String,
    /// Group sub-field whose value is a remote asset URL
    pub asset_sub_field: String,
    /// Title used when both name fields are empty
    pub default_title: String,
    /// Status assigned to created entities
    pub published_status: String,
}

impl Default for ImportProfile {
    fn default() -> Self {
        Self {
            entity_kind: "student".to_string(),
            first_name_field: "student-first-name".to_string(),
            last_name_field: "student-last-name".to_string(),
            group_prefix: "group-".to_string(),
            group_list_key: "group".to_string(),
            asset_sub_field: "upload-asset".to_string(),
            default_title: "Student".to_string(),
            published_status: "publish".to_string(),
        }
    }
}
