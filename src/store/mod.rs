//! In-process rendition of the relational tables the CSV core reads and writes.
//!
//! Snapshots are persisted as pretty JSON and replaced atomically.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::dataset::{Dataset, Gloss, Language, Lemma};
use crate::model::revision::Revision;
use crate::model::sense::{GlossSense, Keyword, Sense, SenseTranslation, Translation};
use crate::model::sentence::{
    ExampleSentence, ExampleSentenceTranslation, FieldChoice, SenseExampleSentence,
};
use crate::model::Id;

mod queries;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Database {
    #[serde(default)]
    next_id: Id,

    #[serde(default)]
    pub datasets: Vec<Dataset>,

    #[serde(default)]
    pub languages: Vec<Language>,

    #[serde(default)]
    pub lemmas: Vec<Lemma>,

    #[serde(default)]
    pub glosses: Vec<Gloss>,

    #[serde(default)]
    pub senses: Vec<Sense>,

    #[serde(default)]
    pub gloss_senses: Vec<GlossSense>,

    #[serde(default)]
    pub sense_translations: Vec<SenseTranslation>,

    #[serde(default)]
    pub keywords: Vec<Keyword>,

    #[serde(default)]
    pub translations: Vec<Translation>,

    #[serde(default)]
    pub example_sentences: Vec<ExampleSentence>,

    #[serde(default)]
    pub sense_sentences: Vec<SenseExampleSentence>,

    #[serde(default)]
    pub sentence_translations: Vec<ExampleSentenceTranslation>,

    #[serde(default)]
    pub field_choices: Vec<FieldChoice>,

    #[serde(default)]
    pub revisions: Vec<Revision>,
}

impl Database {
    pub fn new() -> Self {
        Database::default()
    }

    pub fn load(path: &Path) -> Result<Database> {
        if !path.exists() {
            debug!("store {} does not exist yet, starting empty", path.display());
            return Ok(Database::new());
        }

        let data = fs::read_to_string(path)?;
        let mut db: Database = serde_json::from_str(&data)?;
        db.repair_id_counter();
        Ok(db)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(path, json.as_bytes())
    }

    /// Runs `f` as one all-or-nothing unit: on `Err` every write made by `f`
    /// is discarded.
    pub fn atomic<T, E, F>(&mut self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Database) -> std::result::Result<T, E>,
        E: std::fmt::Display,
    {
        let snapshot = self.clone();
        let out = f(self);
        if let Err(e) = &out {
            warn!("rolling back: {e}");
            *self = snapshot;
        }
        out
    }

    pub(crate) fn allocate_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    // Hand-edited snapshots may carry ids above the stored counter.
    fn repair_id_counter(&mut self) {
        let max = [
            self.datasets.iter().map(|r| r.id).max(),
            self.languages.iter().map(|r| r.id).max(),
            self.lemmas.iter().map(|r| r.id).max(),
            self.glosses.iter().map(|r| r.id).max(),
            self.senses.iter().map(|r| r.id).max(),
            self.sense_translations.iter().map(|r| r.id).max(),
            self.keywords.iter().map(|r| r.id).max(),
            self.translations.iter().map(|r| r.id).max(),
            self.example_sentences.iter().map(|r| r.id).max(),
            self.sentence_translations.iter().map(|r| r.id).max(),
            self.field_choices.iter().map(|r| r.id).max(),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0);

        if max > self.next_id {
            self.next_id = max;
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "store".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}
