//! Current cell values of a gloss, rendered from reconciled state.

use std::collections::BTreeMap;

use crate::model::Id;
use crate::parsers::senses::{self, SenseMap};
use crate::parsers::sentences::{SentenceGrammar, SentenceTuple};
use crate::services::reconcile::{reconcile, sense_translation};
use crate::store::Database;

pub fn keywords_for_sense(db: &Database, sense_id: Id, language_id: Id) -> Vec<String> {
    let Some(st) = sense_translation(db, sense_id, language_id) else {
        return Vec::new();
    };

    let mut rows: Vec<(u32, &str)> = st
        .translations
        .iter()
        .filter_map(|id| db.translation(*id))
        .filter_map(|t| db.keyword(t.keyword_id).map(|k| (t.index, k.text.as_str())))
        .collect();
    rows.sort_by_key(|(index, _)| *index);

    rows.into_iter().map(|(_, text)| text.to_string()).collect()
}

pub fn sense_map(db: &Database, gloss_id: Id, language_id: Id) -> SenseMap {
    reconcile(db, gloss_id)
        .into_iter()
        .map(|(order, sense_id)| (order, keywords_for_sense(db, sense_id, language_id)))
        .filter(|(_, keywords)| !keywords.is_empty())
        .collect()
}

pub fn senses_cell(db: &Database, gloss_id: Id, language_id: Id) -> String {
    senses::encode(&sense_map(db, gloss_id, language_id))
}

pub fn sentence_tuples(
    db: &Database,
    gloss_id: Id,
    language_id: Id,
    grammar: &SentenceGrammar,
) -> Vec<SentenceTuple> {
    let mut tuples = Vec::new();

    for (order, sense_id) in reconcile(db, gloss_id) {
        for link in db.sentences_of_sense(sense_id) {
            let Some(sentence) = db.example_sentence(link.sentence_id) else {
                continue;
            };
            let text = db
                .sentence_translation(sentence.id, language_id)
                .map(|t| t.text.clone())
                .unwrap_or_default();

            tuples.push(SentenceTuple {
                order,
                sentence_id: sentence.id,
                sentence_type: grammar.types().label_of(sentence.sentence_type).to_string(),
                negative: sentence.negative,
                text,
            });
        }
    }

    tuples
}

pub fn sentences_cell(db: &Database, gloss_id: Id, language_id: Id, grammar: &SentenceGrammar) -> String {
    grammar.encode(&sentence_tuples(db, gloss_id, language_id, grammar))
}

/// Sense order number -> ids of the example sentences recorded for it.
pub fn sentences_by_sense(db: &Database, gloss_id: Id) -> BTreeMap<u8, Vec<Id>> {
    reconcile(db, gloss_id)
        .into_iter()
        .map(|(order, sense_id)| {
            let ids = db
                .sentences_of_sense(sense_id)
                .into_iter()
                .map(|link| link.sentence_id)
                .collect();
            (order, ids)
        })
        .collect()
}
