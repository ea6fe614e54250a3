use serde::{Deserialize, Serialize};

use super::Id;

pub const SENTENCE_TYPE_FIELD: &str = "SentenceType";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExampleSentence {
    pub id: Id,

    #[serde(default)]
    pub sentence_type: Option<Id>,

    #[serde(default)]
    pub negative: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SenseExampleSentence {
    pub sense_id: Id,

    pub sentence_id: Id,

    pub order: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExampleSentenceTranslation {
    pub id: Id,

    pub sentence_id: Id,

    pub language_id: Id,

    #[serde(default)]
    pub text: String,
}

/// Controlled vocabulary entry. Sentence types live under `SENTENCE_TYPE_FIELD`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FieldChoice {
    pub id: Id,

    pub field: String,

    pub name: String,

    #[serde(default)]
    pub machine_value: i64,
}
