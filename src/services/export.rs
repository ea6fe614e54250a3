//! Dataset export in the column layout the gloss import reads back.

use tracing::info;

use crate::config::QuoteMarkers;
use crate::error::{Error, Result};
use crate::model::Id;
use crate::parsers::sentences::SentenceGrammar;
use crate::services::csv_io::{
    senses_column, sentences_column, ANNOTATION_COLUMN, DATASET_COLUMN, GLOSS_ID_COLUMN,
};
use crate::services::display::{senses_cell, sentences_cell};
use crate::store::Database;

pub fn export_glosses(db: &Database, dataset_id: Id, quote: &QuoteMarkers) -> Result<String> {
    let dataset = db
        .dataset(dataset_id)
        .ok_or_else(|| Error::NotFound(format!("dataset {dataset_id}")))?;
    let languages = db.dataset_languages(dataset);
    let grammar = SentenceGrammar::new(&db.sentence_types(), quote)?;

    let mut header = vec![
        GLOSS_ID_COLUMN.to_string(),
        DATASET_COLUMN.to_string(),
        ANNOTATION_COLUMN.to_string(),
    ];
    for language in &languages {
        header.push(senses_column(&language.name));
        header.push(sentences_column(&language.name));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&header)?;

    let glosses = db.glosses_in_dataset(dataset_id);
    for gloss in &glosses {
        let mut record = vec![
            gloss.id.to_string(),
            dataset.acronym.clone(),
            gloss.annotation.clone(),
        ];
        for language in &languages {
            record.push(senses_cell(db, gloss.id, language.id));
            record.push(sentences_cell(db, gloss.id, language.id, &grammar));
        }
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    let text = String::from_utf8(bytes).map_err(|e| Error::InvalidInput(e.to_string()))?;

    info!(dataset = %dataset.acronym, glosses = glosses.len(), "exported glosses");
    Ok(text)
}
