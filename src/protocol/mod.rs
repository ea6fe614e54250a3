use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::{json, Value};
use tracing::{debug, error};

use crate::config::{Config, QuoteMarkers};
use crate::error::{Error, Result};
use crate::model::Id;
use crate::parsers::senses;
use crate::parsers::sentences::SentenceGrammar;
use crate::services::rows::ImportReport;
use crate::services::{display, encoding, export, import, rows, sentences};
use crate::store::Database;

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn get_str<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn get_bool(payload: &Value, key: &str) -> bool {
    payload.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

// Ids arrive as numbers from the UI and as strings from spreadsheets.
fn get_gloss_id(payload: &Value) -> Option<Id> {
    match payload.get("gloss_id")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

/// CSV text of an import payload: a file at `path`, decoded first, or else
/// the inline `csv` text.
fn csv_from_payload(payload: &Value) -> std::result::Result<String, String> {
    let path = get_str(payload, "path");
    if !path.is_empty() {
        return encoding::read_text_file(&PathBuf::from(path)).map_err(|e| e.to_string());
    }
    if payload.get("csv").is_none() {
        return Err("payload.csv or payload.path is required".to_string());
    }
    Ok(get_str(payload, "csv").to_string())
}

/// One protocol connection: configuration plus the loaded store.
pub struct Session {
    config: Config,
    db: Database,
}

impl Session {
    pub fn new(config: Config, db: Database) -> Self {
        Session { config, db }
    }

    pub fn open(config: Config) -> Result<Self> {
        let db = Database::load(&config.store_path)?;
        Ok(Session::new(config, db))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    fn grammar(&self) -> Result<SentenceGrammar> {
        SentenceGrammar::new(&self.db.sentence_types(), &self.config.sentence_quote)
    }

    fn user<'a>(&'a self, payload: &'a Value) -> &'a str {
        match get_str(payload, "user") {
            "" => &self.config.revision_user,
            u => u,
        }
    }

    fn run_import(
        &mut self,
        payload: &Value,
        f: fn(&mut Database, &str, &QuoteMarkers, bool, &str) -> Result<ImportReport>,
    ) -> std::result::Result<ImportReport, String> {
        let csv = csv_from_payload(payload)?;
        let commit = get_bool(payload, "commit");
        let user = self.user(payload).to_string();
        let quote = self.config.sentence_quote.clone();

        let report = f(&mut self.db, &csv, &quote, commit, &user).map_err(|e| e.to_string())?;

        if commit && (report.created > 0 || report.updated > 0) {
            self.db
                .save(&self.config.store_path)
                .map_err(|e| format!("import applied but store could not be saved: {e}"))?;
            debug!("store saved to {}", self.config.store_path.display());
        }
        Ok(report)
    }

    pub fn handle(&mut self, input: &str) -> String {
        let req: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => {
                return json!({
                    "status": "error",
                    "message": "invalid json"
                })
                .to_string();
            }
        };

        let id = get_id(&req);
        let payload = get_payload(&req);

        match Command::from(get_cmd(&req)) {
            Command::Ping => ok(id, json!({ "message": "signbank-core alive" })),

            Command::SensesDecode => match senses::decode(get_str(payload, "text")) {
                Ok(map) => ok(id, json!({ "senses": map, "errors": [] })),
                Err(errors) => ok(id, json!({ "senses": {}, "errors": errors })),
            },

            Command::SensesEncode => {
                let value = payload.get("senses").cloned().unwrap_or(Value::Null);
                match serde_json::from_value::<senses::SenseMap>(value) {
                    Ok(map) => ok(id, json!({ "text": senses::encode(&map) })),
                    Err(e) => err(id, format!("invalid payload.senses: {e}")),
                }
            }

            Command::SentencesDecode => {
                let grammar = match self.grammar() {
                    Ok(g) => g,
                    Err(e) => return err(id, e.to_string()),
                };
                let (tuples, had_errors) = grammar.decode(get_str(payload, "text"));
                ok(id, json!({ "tuples": tuples, "had_errors": had_errors }))
            }

            Command::SentencesCompare => {
                let Some(gloss_id) = get_gloss_id(payload) else {
                    return err(id, "payload.gloss_id is required");
                };
                let grammar = match self.grammar() {
                    Ok(g) => g,
                    Err(e) => return err(id, e.to_string()),
                };
                let diff = sentences::compare(
                    gloss_id,
                    get_str(payload, "old"),
                    get_str(payload, "new"),
                    &grammar,
                );
                ok(id, json!({ "diff": diff }))
            }

            Command::GlossCells => {
                let Some(gloss_id) = get_gloss_id(payload) else {
                    return err(id, "payload.gloss_id is required");
                };
                match self.gloss_cells(gloss_id) {
                    Ok(cells) => ok(id, json!({ "gloss_id": gloss_id, "cells": cells })),
                    Err(e) => err(id, e.to_string()),
                }
            }

            Command::ImportSentences => match self.run_import(payload, rows::import_sentences) {
                Ok(report) => ok(id, json!({ "report": report })),
                Err(e) => err(id, e),
            },

            Command::ImportGlosses => match self.run_import(payload, import::import_glosses) {
                Ok(report) => ok(id, json!({ "report": report })),
                Err(e) => err(id, e),
            },

            Command::ExportGlosses => {
                let acronym = get_str(payload, "dataset");
                let Some(dataset_id) = self.db.dataset_by_acronym(acronym).map(|d| d.id) else {
                    return err(id, format!("Dataset {acronym} does not exist"));
                };
                match export::export_glosses(&self.db, dataset_id, &self.config.sentence_quote) {
                    Ok(csv) => ok(id, json!({ "csv": csv })),
                    Err(e) => {
                        error!("export failed: {e}");
                        err(id, e.to_string())
                    }
                }
            }

            Command::Unknown => err(id, "unknown command"),
        }
    }

    fn gloss_cells(&self, gloss_id: Id) -> Result<BTreeMap<String, Value>> {
        let dataset = self
            .db
            .dataset_of_gloss(gloss_id)
            .ok_or_else(|| Error::NotFound(format!("gloss {gloss_id}")))?;
        let grammar = self.grammar()?;

        let mut cells = BTreeMap::new();
        for language in self.db.dataset_languages(dataset) {
            cells.insert(
                language.name.clone(),
                json!({
                    "senses": display::senses_cell(&self.db, gloss_id, language.id),
                    "sentences": display::sentences_cell(&self.db, gloss_id, language.id, &grammar),
                }),
            );
        }
        Ok(cells)
    }
}
