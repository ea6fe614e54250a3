//! The "update glosses" CSV import: senses and example sentence cells per
//! dataset language.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::config::QuoteMarkers;
use crate::error::Result;
use crate::model::Id;
use crate::parsers::sentences::SentenceGrammar;
use crate::services::csv_io::{
    read_table, row_number, senses_column, sentences_column, CsvRow, DATASET_COLUMN,
    GLOSS_ID_COLUMN,
};
use crate::services::display::{senses_cell, sentences_by_sense, sentences_cell};
use crate::services::reconcile::reconcile;
use crate::services::rows::{resolve_gloss, ImportReport};
use crate::services::senses::{check_senses, create_senses};
use crate::services::sentences::{compare, update_sentences, update_sentences_parse};
use crate::store::Database;

pub const REQUIRED_GLOSS_COLUMNS: [&str; 2] = [GLOSS_ID_COLUMN, DATASET_COLUMN];

#[derive(Debug, Default)]
struct RowPlan {
    senses: Vec<(Id, String)>,
    sentences: Vec<(Id, String)>,
}

impl RowPlan {
    fn is_empty(&self) -> bool {
        self.senses.is_empty() && self.sentences.is_empty()
    }
}

pub fn import_glosses(
    db: &mut Database,
    csv_text: &str,
    quote: &QuoteMarkers,
    commit: bool,
    user: &str,
) -> Result<ImportReport> {
    let table = read_table(csv_text)?;
    let mut report = ImportReport::default();

    let required: Vec<String> = REQUIRED_GLOSS_COLUMNS.iter().map(|c| c.to_string()).collect();
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

        let mut errors = Vec::new();
        let (_, gloss) = resolve_gloss(
            db,
            n,
            row.get(DATASET_COLUMN),
            row.get(GLOSS_ID_COLUMN),
            &mut errors,
        );
        let gloss_id = match gloss {
            Some(id) if errors.is_empty() => id,
            _ => {
                report.errors.extend(errors);
                continue;
            }
        };

        let plan = plan_row(db, &grammar, n, gloss_id, row, &mut errors);
        let clean = errors.is_empty();
        report.errors.append(&mut errors);

        if !commit || plan.is_empty() {
            if clean {
                report.accepted += 1;
            }
            continue;
        }

        let outcome = db.atomic(|db| {
            let mut created = 0usize;
            let mut updated = 0usize;
            let mut feedback = Vec::new();
            for (language_id, cell) in &plan.senses {
                let r = create_senses(db, gloss_id, *language_id, cell, user)?;
                created += r.created.len();
                feedback.extend(r.errors);
            }
            for (language_id, cell) in &plan.sentences {
                updated += update_sentences(db, gloss_id, *language_id, cell, &grammar, true, user)?.len();
            }
            Ok::<_, crate::error::Error>((created, updated, feedback))
        });

        match outcome {
            Ok((created, updated, feedback)) => {
                if clean {
                    report.accepted += 1;
                }
                report.created += created;
                report.updated += updated;
                report
                    .errors
                    .extend(feedback.into_iter().map(|e| format!("Row {n}: {e}")));
            }
            Err(e) => report.errors.push(format!("Row {n}: {e}")),
        }
    }

    info!(
        rows = report.rows,
        accepted = report.accepted,
        senses_created = report.created,
        sentences_updated = report.updated,
        errors = report.errors.len(),
        commit,
        "gloss import finished"
    );
    Ok(report)
}

/// Works out which cells of a row would change, collecting feedback for the
/// ones that cannot be applied.
fn plan_row(
    db: &Database,
    grammar: &SentenceGrammar,
    n: usize,
    gloss_id: Id,
    row: &CsvRow,
    errors: &mut Vec<String>,
) -> RowPlan {
    let mut plan = RowPlan::default();

    let Some(dataset) = db.dataset_of_gloss(gloss_id) else {
        return plan;
    };

    let numbers: BTreeSet<u8> = reconcile(db, gloss_id).keys().copied().collect();
    let by_sense = sentences_by_sense(db, gloss_id);

    for language in db.dataset_languages(dataset) {
        let column = senses_column(&language.name);
        if row.has(&column) {
            let new = row.get(&column).trim();
            let current = senses_cell(db, gloss_id, language.id);
            if new != current {
                if !current.is_empty() {
                    errors.push(format!(
                        "Row {n}: {column} can only be set on glosses without senses"
                    ));
                } else {
                    let problems = check_senses(&current, new);
                    if problems.is_empty() {
                        plan.senses.push((language.id, new.to_string()));
                    } else {
                        errors.extend(problems.into_iter().map(|p| format!("Row {n}: {column}: {p}")));
                    }
                }
            }
        }

        let column = sentences_column(&language.name);
        if row.has(&column) {
            let new = row.get(&column).trim();
            let current = sentences_cell(db, gloss_id, language.id, grammar);
            if new == current {
                continue;
            }
            if !update_sentences_parse(&numbers, &by_sense, new, grammar) {
                errors.push(format!(
                    "Row {n}: {column} must list existing sentences of this gloss under their own sense number: {new}"
                ));
                continue;
            }

            let diff = compare(gloss_id, &current, new, grammar);
            errors.extend(diff.errors.iter().map(|e| format!("Row {n}: {e}")));
            if !diff.changes.is_empty() {
                debug!(gloss_id, language = %language.name, changes = diff.changes.len(), "sentence texts changed");
                plan.sentences.push((language.id, grammar.encode(&diff.changes)));
            }
        }
    }

    plan
}
