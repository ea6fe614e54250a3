use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Dataset {
    pub id: Id,

    pub acronym: String,

    #[serde(default)]
    pub name: String,

    /// Display order of the dataset languages, also the CSV column order.
    #[serde(default)]
    pub languages: Vec<Id>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Language {
    pub id: Id,

    #[serde(default)]
    pub code: String,

    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Lemma {
    pub id: Id,

    pub dataset_id: Id,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Gloss {
    pub id: Id,

    pub lemma_id: Id,

    #[serde(default)]
    pub annotation: String,
}
