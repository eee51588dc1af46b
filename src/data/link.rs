use serde::{Deserialize, Serialize};

/// Node-level `OMI_link` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkJson {
    /// Required; an empty value fails validation.
    #[serde(default)]
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
