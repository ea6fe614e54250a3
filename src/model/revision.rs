use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Revision {
    pub gloss_id: Id,

    pub field_name: String,

    #[serde(default)]
    pub old_value: String,

    #[serde(default)]
    pub new_value: String,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub time: u64,
}
