//! Sense creation from a submitted senses cell.
//!
//! Only glosses without senses in the submitted language are written to;
//! renumbering or editing existing senses is not done through CSV.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::Id;
use crate::parsers::senses::{self, SenseMap};
use crate::services::display::senses_cell;
use crate::services::reconcile::{delete_empty, reconcile, sense_translation};
use crate::services::revision;
use crate::store::Database;

/// Order number of the placeholder sense made for glosses without senses.
pub const PLACEHOLDER_ORDER: u8 = 1;

pub const SENSES_FIELD: &str = "Senses";

#[derive(Debug, Default, Serialize)]
pub struct SenseSyncReport {
    /// Order numbers written from the submitted cell.
    pub created: Vec<u8>,

    /// The gloss already had senses in this language.
    pub skipped: bool,

    pub errors: Vec<String>,
}

/// Validation only: the errors `create_senses` would report for `new_cell`.
pub fn check_senses(current: &str, new_cell: &str) -> Vec<String> {
    if !current.is_empty() {
        return Vec::new();
    }
    match senses::decode(new_cell) {
        Ok(_) => Vec::new(),
        Err(errors) => errors,
    }
}

/// Writes the senses of `new_cell` for a gloss that has none in
/// `language_id`. Decoding errors are reported and nothing is written.
/// Callers run this inside `Database::atomic`.
pub fn create_senses(
    db: &mut Database,
    gloss_id: Id,
    language_id: Id,
    new_cell: &str,
    user: &str,
) -> Result<SenseSyncReport> {
    let mut report = SenseSyncReport::default();

    if db.gloss(gloss_id).is_none() {
        return Err(Error::NotFound(format!("gloss {gloss_id}")));
    }

    delete_empty(db, gloss_id);
    let current = senses_cell(db, gloss_id, language_id);
    if !current.is_empty() {
        debug!(gloss_id, language_id, current = %current, "gloss already has senses, not updating");
        report.skipped = true;
        return Ok(report);
    }

    let decoded = match senses::decode(new_cell) {
        Ok(m) => m,
        Err(errors) => {
            report.errors = errors;
            return Ok(report);
        }
    };
    if decoded.is_empty() {
        return Ok(report);
    }

    if db.gloss_sense_links(gloss_id).is_empty() {
        create_empty_sense(db, gloss_id, PLACEHOLDER_ORDER, true)?;
    }

    for (order, keywords) in &decoded {
        write_sense(db, gloss_id, language_id, *order, keywords)?;

        let mut single = SenseMap::new();
        single.insert(*order, keywords.clone());
        revision::record(db, gloss_id, SENSES_FIELD, "", &senses::encode(&single), user);

        report.created.push(*order);
    }

    info!(gloss_id, language_id, senses = report.created.len(), "created senses from csv");
    Ok(report)
}

/// Ensures a sense exists at `order`, with an empty sense translation for
/// every dataset language. With `erase`, translations already stored in that
/// slot are deleted.
pub fn create_empty_sense(db: &mut Database, gloss_id: Id, order: u8, erase: bool) -> Result<Id> {
    if let Some(sense_id) = reconcile(db, gloss_id).get(&order).copied() {
        if erase {
            let owned: Vec<Id> = db
                .sense_translations_of(sense_id)
                .into_iter()
                .map(|st| st.id)
                .collect();
            for st in owned {
                db.clear_sense_translation(st)?;
            }
        }
        return Ok(sense_id);
    }

    let languages: Vec<Id> = db
        .dataset_of_gloss(gloss_id)
        .map(|d| d.languages.clone())
        .ok_or_else(|| Error::NotFound(format!("dataset of gloss {gloss_id}")))?;

    let sense_id = db.create_sense();
    db.link_sense(gloss_id, sense_id, order)?;
    for language_id in languages {
        db.create_sense_translation(sense_id, language_id)?;
    }

    Ok(sense_id)
}

fn write_sense(
    db: &mut Database,
    gloss_id: Id,
    language_id: Id,
    order: u8,
    keywords: &[String],
) -> Result<()> {
    let sense_id = match reconcile(db, gloss_id).get(&order).copied() {
        Some(id) => id,
        None => {
            let id = db.create_sense();
            db.link_sense(gloss_id, id, order)?;
            id
        }
    };

    let st_id = match sense_translation(db, sense_id, language_id) {
        Some(st) => st.id,
        None => db.create_sense_translation(sense_id, language_id)?,
    };

    for (i, text) in keywords.iter().enumerate() {
        let keyword_id = db.get_or_create_keyword(text);
        let translation_id =
            db.create_translation(gloss_id, language_id, keyword_id, i as u32 + 1, order)?;
        db.attach_translation(st_id, translation_id)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::display::{keywords_for_sense, senses_cell};
    use crate::services::test_support::Fixture;

    #[test]
    fn first_sense_gets_placeholder_slot() {
        let mut fx = Fixture::new();
        let report = create_senses(&mut fx.db, fx.gloss, fx.en, "3. APPLE, FRUIT", "tester").unwrap();
        assert_eq!(report.created, vec![3]);
        assert!(report.errors.is_empty());

        let slots = reconcile(&fx.db, fx.gloss);
        assert_eq!(slots.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert!(keywords_for_sense(&fx.db, slots[&1], fx.en).is_empty());

        let sts = fx.db.sense_translations_of(slots[&3]);
        assert_eq!(sts.len(), 1);
        let indexed: Vec<(u32, String)> = sts[0]
            .translations
            .iter()
            .map(|id| {
                let t = fx.db.translation(*id).unwrap();
                (t.index, fx.db.keyword(t.keyword_id).unwrap().text.clone())
            })
            .collect();
        assert_eq!(indexed, vec![(1, "APPLE".to_string()), (2, "FRUIT".to_string())]);
        assert!(fx.db.translations.iter().all(|t| t.order_index == 3));

        assert_eq!(fx.db.revisions.len(), 1);
        assert_eq!(fx.db.revisions[0].old_value, "");
        assert_eq!(fx.db.revisions[0].new_value, "3. APPLE, FRUIT");
    }

    #[test]
    fn declared_slot_one_reuses_placeholder() {
        let mut fx = Fixture::new();
        create_senses(&mut fx.db, fx.gloss, fx.en, "1. RUN, JOG | 2. SPRINT", "tester").unwrap();

        assert_eq!(fx.db.senses.len(), 2);
        assert_eq!(senses_cell(&fx.db, fx.gloss, fx.en), "1. RUN, JOG | 2. SPRINT");
        assert_eq!(fx.db.revisions.len(), 2);
    }

    #[test]
    fn existing_senses_are_left_alone() {
        let mut fx = Fixture::new();
        fx.add_sense(1, fx.en, &["RUN"]);

        let report = create_senses(&mut fx.db, fx.gloss, fx.en, "1. WALK", "tester").unwrap();
        assert!(report.skipped);
        assert_eq!(senses_cell(&fx.db, fx.gloss, fx.en), "1. RUN");
    }

    #[test]
    fn other_language_can_still_be_filled() {
        let mut fx = Fixture::new();
        fx.add_sense(1, fx.en, &["RUN"]);

        let report = create_senses(&mut fx.db, fx.gloss, fx.nl, "1. RENNEN", "tester").unwrap();
        assert_eq!(report.created, vec![1]);
        assert_eq!(fx.db.senses.len(), 1);
        assert_eq!(senses_cell(&fx.db, fx.gloss, fx.nl), "1. RENNEN");
    }

    #[test]
    fn decode_errors_write_nothing() {
        let mut fx = Fixture::new();
        let report = create_senses(&mut fx.db, fx.gloss, fx.en, "1. A, A | 9. B", "tester").unwrap();
        assert_eq!(report.errors.len(), 2);
        assert!(fx.db.senses.is_empty());
        assert!(fx.db.keywords.is_empty());
    }

    #[test]
    fn keywords_are_shared_between_glosses() {
        let mut fx = Fixture::new();
        create_senses(&mut fx.db, fx.gloss, fx.en, "1. APPLE", "tester").unwrap();
        let lemma = fx.db.glosses[0].lemma_id;
        let other = fx.db.add_gloss(lemma, "APPLE-B");
        create_senses(&mut fx.db, other, fx.en, "1. APPLE", "tester").unwrap();

        assert_eq!(fx.db.keywords.len(), 1);
        assert_eq!(fx.db.translations.len(), 2);
    }

    #[test]
    fn erase_clears_existing_slot() {
        let mut fx = Fixture::new();
        let sense = fx.add_sense(1, fx.en, &["RUN"]);
        let again = create_empty_sense(&mut fx.db, fx.gloss, 1, true).unwrap();
        assert_eq!(again, sense);
        assert!(fx.db.translations.is_empty());
        assert!(keywords_for_sense(&fx.db, sense, fx.en).is_empty());
    }

    #[test]
    fn check_reports_decode_errors_only_for_empty_glosses() {
        assert!(check_senses("", "1. A").is_empty());
        assert_eq!(check_senses("", "1. A | 1. B").len(), 1);
        assert!(check_senses("1. A", "garbage").is_empty());
    }
}
