use serde::{Deserialize, Serialize};

/// Node-level `OMI_personality` block, describing an agent's character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityJson {
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_message: Option<String>,
}
