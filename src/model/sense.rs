use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Sense {
    pub id: Id,
}

/// Ordering link between a gloss and one of its senses.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GlossSense {
    pub gloss_id: Id,

    pub sense_id: Id,

    pub order: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SenseTranslation {
    pub id: Id,

    pub sense_id: Id,

    pub language_id: Id,

    /// Translation ids; display order comes from `Translation::index`.
    #[serde(default)]
    pub translations: Vec<Id>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Keyword {
    pub id: Id,

    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Translation {
    pub id: Id,

    pub gloss_id: Id,

    pub language_id: Id,

    pub keyword_id: Id,

    /// 1-based position within the sense/language keyword list.
    pub index: u32,

    /// Order number of the owning sense.
    pub order_index: u8,
}
