//! Row validation and the "create sentences" CSV import.
//!
//! A row with errors is left out of the write phase; later rows are still
//! processed and every message is collected in the report.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::config::QuoteMarkers;
use crate::error::Result;
use crate::model::Id;
use crate::parsers::sentences::{SentenceGrammar, SentenceIdentity};
use crate::services::csv_io::{
    read_table, row_number, sentences_column, CsvRow, DATASET_COLUMN, GLOSS_ID_COLUMN,
    NEGATIVE_COLUMN, SENSE_NUMBER_COLUMN, SENTENCE_TYPE_COLUMN,
};
use crate::services::reconcile::reconcile;
use crate::services::sentences::{create_sentence, NewSentence};
use crate::store::Database;

pub const REQUIRED_SENTENCE_COLUMNS: [&str; 5] = [
    GLOSS_ID_COLUMN,
    DATASET_COLUMN,
    SENSE_NUMBER_COLUMN,
    SENTENCE_TYPE_COLUMN,
    NEGATIVE_COLUMN,
];

#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub rows: usize,
    pub accepted: usize,
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedSentenceRow {
    pub gloss_id: Id,
    pub dataset_id: Id,
    pub identity: SentenceIdentity,
    pub languages: Vec<Id>,
    pub texts: BTreeMap<Id, String>,
}

/// Resolves the dataset acronym and gloss id of a row and checks that the
/// gloss belongs to the dataset. Returns whatever could be resolved.
pub fn resolve_gloss(
    db: &Database,
    n: usize,
    dataset_acronym: &str,
    gloss_id: &str,
    errors: &mut Vec<String>,
) -> (Option<Id>, Option<Id>) {
    let dataset_acronym = dataset_acronym.trim();
    let gloss_id = gloss_id.trim();

    let dataset = db.dataset_by_acronym(dataset_acronym).map(|d| d.id);
    if dataset.is_none() {
        errors.push(format!("Row {n}: Dataset {dataset_acronym} does not exist"));
    }

    let gloss = gloss_id
        .parse::<Id>()
        .ok()
        .and_then(|id| db.gloss(id))
        .map(|g| g.id);
    if gloss.is_none() {
        errors.push(format!("Row {n}: Gloss ID {gloss_id} does not exist."));
    }

    if let (Some(dataset_id), Some(gid)) = (dataset, gloss) {
        if db.dataset_of_gloss(gid).map(|d| d.id) != Some(dataset_id) {
            errors.push(format!("Row {n}: Gloss {gid} is not in dataset {dataset_acronym}."));
        }
    }

    (dataset, gloss)
}

pub fn validate_sentence_row(
    db: &Database,
    grammar: &SentenceGrammar,
    n: usize,
    row: &CsvRow,
) -> std::result::Result<ValidatedSentenceRow, Vec<String>> {
    let mut errors = Vec::new();

    let raw = format!(
        "({}, {}, {})",
        row.get(SENSE_NUMBER_COLUMN).trim(),
        row.get(SENTENCE_TYPE_COLUMN).trim(),
        row.get(NEGATIVE_COLUMN).trim()
    );
    let identity = grammar.decode_identity(&raw);
    if identity.is_none() {
        errors.push(format!(
            "Row {n}: Error parsing sentence columns Sense Number, Sentence Type, Negative: {raw}"
        ));
    }

    let (dataset, gloss) = resolve_gloss(
        db,
        n,
        row.get(DATASET_COLUMN),
        row.get(GLOSS_ID_COLUMN),
        &mut errors,
    );

    if let (Some(gloss_id), Some(identity)) = (gloss, &identity) {
        if !reconcile(db, gloss_id).contains_key(&identity.order) {
            errors.push(format!(
                "Row {n}: Gloss {gloss_id} does not have a Sense Number {}.",
                identity.order
            ));
        }
    }

    let mut languages = Vec::new();
    let mut texts = BTreeMap::new();
    if let Some(d) = dataset.and_then(|id| db.dataset(id)) {
        for language in db.dataset_languages(d) {
            let column = sentences_column(&language.name);
            if !row.has(&column) {
                errors.push(format!("Row {n}: Missing column {column}"));
                continue;
            }
            languages.push(language.id);
            texts.insert(language.id, row.get(&column).trim().to_string());
        }
    }

    match (errors.is_empty(), dataset, gloss, identity) {
        (true, Some(dataset_id), Some(gloss_id), Some(identity)) => Ok(ValidatedSentenceRow {
            gloss_id,
            dataset_id,
            identity,
            languages,
            texts,
        }),
        _ => Err(errors),
    }
}

/// The "create sentences" import. With `commit == false` rows are only
/// validated.
pub fn import_sentences(
    db: &mut Database,
    csv_text: &str,
    quote: &QuoteMarkers,
    commit: bool,
    user: &str,
) -> Result<ImportReport> {
    let table = read_table(csv_text)?;
    let mut report = ImportReport::default();

    let required: Vec<String> = REQUIRED_SENTENCE_COLUMNS.iter().map(|c| c.to_string()).collect();
    let missing = table.missing_columns(&required);
    if !missing.is_empty() {
        report
            .errors
            .extend(missing.into_iter().map(|c| format!("Missing required column: {c}")));
        return Ok(report);
    }

    let grammar = SentenceGrammar::new(&db.sentence_types(), quote)?;

    for (index, row) in table.rows.iter().enumerate() {
        let n = row_number(index);
        report.rows += 1;

        let v = match validate_sentence_row(db, &grammar, n, row) {
            Ok(v) => v,
            Err(errors) => {
                report.errors.extend(errors);
                continue;
            }
        };

        let fields = NewSentence {
            order: v.identity.order,
            sentence_type: v.identity.sentence_type.clone(),
            negative: v.identity.negative,
            texts: v.texts.clone(),
        };

        let outcome = if commit {
            db.atomic(|db| create_sentence(db, v.gloss_id, &v.languages, &fields, &grammar, true, user))
        } else {
            create_sentence(db, v.gloss_id, &v.languages, &fields, &grammar, false, user)
        };

        match outcome {
            Ok(created) => {
                report.accepted += 1;
                if created.is_some() {
                    report.created += 1;
                }
            }
            Err(e) => report.errors.push(format!("Row {n}: {e}")),
        }
    }

    info!(
        rows = report.rows,
        accepted = report.accepted,
        created = report.created,
        errors = report.errors.len(),
        commit,
        "sentence import finished"
    );
    Ok(report)
}
