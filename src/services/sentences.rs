//! Example sentence updates and creation from CSV cells.
//!
//! Once created, a sentence's sense number, type and polarity are fixed; only
//! the per-language text may change. Every write entry point has a flag that
//! turns it into a dry run.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::Id;
use crate::parsers::sentences::{SentenceGrammar, SentenceTuple};
use crate::services::display::sentence_tuples;
use crate::services::reconcile::reconcile;
use crate::services::revision;
use crate::store::Database;

pub const SENTENCES_FIELD: &str = "Example Sentences";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceUpdate {
    pub sentence_id: Id,
    pub order: u8,
    pub sentence_type: Option<Id>,
    pub negative: bool,
    pub text: String,
}

#[derive(Debug, Default, Serialize)]
pub struct SentenceDiff {
    /// Tuples whose only difference from the stored value is the text.
    pub changes: Vec<SentenceTuple>,
    pub errors: Vec<String>,
}

impl SentenceDiff {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty() && self.errors.is_empty()
    }
}

/// Fields of one row of the sentence import.
#[derive(Debug, Clone)]
pub struct NewSentence {
    pub order: u8,
    pub sentence_type: String,
    pub negative: bool,
    /// Language id -> text.
    pub texts: BTreeMap<Id, String>,
}

/// Applies the text of every well-formed tuple in `new_cell` to the stored
/// sentence with the same id. Only sentences of `gloss_id` are written;
/// malformed tuples, foreign ids and unstorable texts are skipped
/// individually.
/// With `update == false` nothing is written and the would-be updates are
/// returned.
pub fn update_sentences(
    db: &mut Database,
    gloss_id: Id,
    language_id: Id,
    new_cell: &str,
    grammar: &SentenceGrammar,
    update: bool,
    user: &str,
) -> Result<Vec<SentenceUpdate>> {
    if reconcile(db, gloss_id).is_empty() {
        return Ok(Vec::new());
    }

    let before: HashMap<Id, SentenceTuple> = sentence_tuples(db, gloss_id, language_id, grammar)
        .into_iter()
        .map(|t| (t.sentence_id, t))
        .collect();

    let (tuples, rejected) = grammar.scan(new_cell);
    for fragment in &rejected {
        debug!(gloss_id, fragment = %fragment, "skipping unparsable sentence tuple");
    }

    let mut planned: Vec<(SentenceUpdate, &SentenceTuple)> = Vec::with_capacity(tuples.len());
    for t in &tuples {
        if !before.contains_key(&t.sentence_id) {
            debug!(gloss_id, sentence_id = t.sentence_id, "sentence does not belong to this gloss, skipping");
            continue;
        }
        if let Err(e) = grammar.check_text(&t.text) {
            debug!(gloss_id, sentence_id = t.sentence_id, "{e}");
            continue;
        }
        let sentence_type = match grammar.types().resolve(&t.sentence_type) {
            Ok(ty) => ty,
            Err(e) => {
                debug!(gloss_id, sentence_id = t.sentence_id, "{e}");
                continue;
            }
        };
        let u = SentenceUpdate {
            sentence_id: t.sentence_id,
            order: t.order,
            sentence_type,
            negative: t.negative,
            text: t.text.clone(),
        };
        planned.push((u, t));
    }

    if !update {
        return Ok(planned.into_iter().map(|(u, _)| u).collect());
    }

    let mut last: Option<(String, String)> = None;
    let mut applied = Vec::with_capacity(planned.len());

    for (u, t) in planned {
        if db.example_sentence(u.sentence_id).is_none() {
            debug!(gloss_id, sentence_id = u.sentence_id, "sentence no longer exists, skipping");
            continue;
        }

        // type and polarity stay as stored
        db.set_sentence_text(u.sentence_id, language_id, &u.text);

        let old = before
            .get(&u.sentence_id)
            .map(|b| grammar.encode_tuple(b))
            .unwrap_or_default();
        last = Some((old, grammar.encode_tuple(t)));
        applied.push(u);
    }

    if let Some((old, new)) = last {
        revision::record(db, gloss_id, SENTENCES_FIELD, &old, &new, user);
    }

    info!(gloss_id, language_id, updated = applied.len(), "updated example sentence texts");
    Ok(applied)
}

/// Diffs a submitted cell against the stored one. Changes to sense number,
/// type or polarity are errors and disqualify that tuple; a differing text
/// alone is a change to apply.
pub fn compare(gloss_id: Id, old_cell: &str, new_cell: &str, grammar: &SentenceGrammar) -> SentenceDiff {
    let mut diff = SentenceDiff::default();

    let (old_tuples, old_errors) = grammar.decode(old_cell);
    if old_errors {
        debug!(gloss_id, "stored sentences cell does not parse, comparing against empty");
    }
    let (new_tuples, new_errors) = grammar.decode(new_cell);
    if new_errors {
        diff.errors.push(format!(
            "Gloss {gloss_id}: Example sentences could not be parsed: {new_cell}"
        ));
        return diff;
    }

    let by_id: HashMap<Id, &SentenceTuple> = old_tuples.iter().map(|t| (t.sentence_id, t)).collect();

    for new in &new_tuples {
        let Some(old) = by_id.get(&new.sentence_id) else {
            diff.errors.push(format!(
                "Gloss {gloss_id}: Sentence {} does not exist for this gloss",
                new.sentence_id
            ));
            continue;
        };

        let mut identity_changed = false;
        if old.order != new.order {
            diff.errors.push(format!(
                "Gloss {gloss_id}, sentence {}: Sense Number cannot be modified",
                new.sentence_id
            ));
            identity_changed = true;
        }
        if old.sentence_type != new.sentence_type {
            diff.errors.push(format!(
                "Gloss {gloss_id}, sentence {}: Sentence Type cannot be modified",
                new.sentence_id
            ));
            identity_changed = true;
        }
        if old.negative != new.negative {
            diff.errors.push(format!(
                "Gloss {gloss_id}, sentence {}: Negative cannot be modified",
                new.sentence_id
            ));
            identity_changed = true;
        }

        if identity_changed || old.text == new.text {
            continue;
        }
        match grammar.check_text(&new.text) {
            Ok(()) => diff.changes.push(new.clone()),
            Err(e) => diff
                .errors
                .push(format!("Gloss {gloss_id}, sentence {}: {e}", new.sentence_id)),
        }
    }

    diff
}

/// Side-effect free check run before `update_sentences`. Rejects a cell that
/// is malformed, names an unknown sense number, moves a sentence to another
/// sense, or mentions one sentence twice. An empty cell is accepted.
pub fn update_sentences_parse(
    sense_numbers: &BTreeSet<u8>,
    sense_numbers_to_sentences: &BTreeMap<u8, Vec<Id>>,
    new_cell: &str,
    grammar: &SentenceGrammar,
) -> bool {
    if new_cell.trim().is_empty() {
        return true;
    }

    let (tuples, had_errors) = grammar.decode(new_cell);
    if had_errors {
        return false;
    }

    let mut seen: HashSet<Id> = HashSet::new();
    for t in &tuples {
        if !sense_numbers.contains(&t.order) {
            return false;
        }
        let belongs = sense_numbers_to_sentences
            .get(&t.order)
            .is_some_and(|ids| ids.contains(&t.sentence_id));
        if !belongs {
            return false;
        }
        if !seen.insert(t.sentence_id) {
            return false;
        }
    }

    true
}

/// Creates one example sentence under the sense numbered `fields.order`.
/// With `create == false` only the sense and the type are resolved.
pub fn create_sentence(
    db: &mut Database,
    gloss_id: Id,
    dataset_languages: &[Id],
    fields: &NewSentence,
    grammar: &SentenceGrammar,
    create: bool,
    user: &str,
) -> Result<Option<Id>> {
    let sense_id = reconcile(db, gloss_id)
        .get(&fields.order)
        .copied()
        .ok_or_else(|| {
            Error::NotFound(format!(
                "Gloss {gloss_id} does not have a Sense Number {}",
                fields.order
            ))
        })?;

    let sentence_type = grammar
        .types()
        .resolve(&fields.sentence_type)
        .map_err(Error::InvalidInput)?;

    for text in fields.texts.values() {
        grammar.check_text(text).map_err(Error::InvalidInput)?;
    }

    if !create {
        return Ok(None);
    }

    let sentence_id = db.create_example_sentence(sentence_type, fields.negative);
    let position = db.sentences_of_sense(sense_id).len() as u32 + 1;
    db.attach_sentence(sense_id, sentence_id, position)?;

    for language_id in dataset_languages {
        let text = fields.texts.get(language_id).map(String::as_str).unwrap_or("");
        db.set_sentence_text(sentence_id, *language_id, text);
    }

    let display = SentenceTuple {
        order: fields.order,
        sentence_id,
        sentence_type: grammar.types().label_of(sentence_type).to_string(),
        negative: fields.negative,
        text: dataset_languages
            .first()
            .and_then(|l| fields.texts.get(l))
            .cloned()
            .unwrap_or_default(),
    };
    revision::record(db, gloss_id, SENTENCES_FIELD, "", &grammar.encode_tuple(&display), user);

    debug!(gloss_id, sentence_id, order = fields.order, "created example sentence");
    Ok(Some(sentence_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::display::{sentences_by_sense, sentences_cell};
    use crate::services::test_support::Fixture;

    fn tuple(order: u8, id: Id, ty: &str, negative: bool, text: &str) -> SentenceTuple {
        SentenceTuple {
            order,
            sentence_id: id,
            sentence_type: ty.to_string(),
            negative,
            text: text.to_string(),
        }
    }

    #[test]
    fn compare_rejects_type_change() {
        let g = Fixture::new().grammar();
        let old = g.encode(&[tuple(1, 42, "Declarative", false, "He ran.")]);
        let new = g.encode(&[tuple(1, 42, "Interrogative", false, "He ran.")]);

        let diff = compare(7, &old, &new, &g);
        assert_eq!(diff.errors.len(), 1);
        assert!(diff.errors[0].contains("Sentence Type cannot be modified"));
        assert!(diff.changes.is_empty());
    }

    #[test]
    fn compare_reports_text_change() {
        let g = Fixture::new().grammar();
        let old = g.encode(&[tuple(1, 42, "Declarative", false, "He ran.")]);
        let new = g.encode(&[tuple(1, 42, "Declarative", false, "He runs.")]);

        let diff = compare(7, &old, &new, &g);
        assert!(diff.errors.is_empty());
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].sentence_id, 42);
        assert_eq!(diff.changes[0].text, "He runs.");
    }

    #[test]
    fn compare_reports_each_identity_field() {
        let g = Fixture::new().grammar();
        let old = g.encode(&[tuple(1, 42, "Declarative", false, "a")]);
        let new = g.encode(&[tuple(2, 42, "Interrogative", true, "b")]);

        let diff = compare(7, &old, &new, &g);
        assert_eq!(diff.errors.len(), 3);
        assert!(diff.errors[0].contains("Sense Number cannot be modified"));
        assert!(diff.errors[2].contains("Negative cannot be modified"));
        assert!(diff.changes.is_empty());
    }

    #[test]
    fn compare_blocks_only_offending_tuple() {
        let g = Fixture::new().grammar();
        let old = g.encode(&[
            tuple(1, 42, "Declarative", false, "a"),
            tuple(1, 43, "Declarative", false, "b"),
        ]);
        let new = g.encode(&[
            tuple(1, 42, "Declarative", true, "a2"),
            tuple(1, 43, "Declarative", false, "b2"),
        ]);

        let diff = compare(7, &old, &new, &g);
        assert_eq!(diff.errors.len(), 1);
        assert_eq!(diff.changes, vec![tuple(1, 43, "Declarative", false, "b2")]);
    }

    #[test]
    fn compare_unchanged_is_noop() {
        let g = Fixture::new().grammar();
        let cell = g.encode(&[tuple(1, 42, "Declarative", false, "a")]);
        assert!(compare(7, &cell, &cell, &g).is_noop());
        assert!(compare(7, "", "", &g).is_noop());
    }

    #[test]
    fn compare_malformed_new_cell() {
        let g = Fixture::new().grammar();
        let diff = compare(7, "", "(1, 2, 3)", &g);
        assert_eq!(diff.errors.len(), 1);
        assert!(diff.changes.is_empty());
    }

    #[test]
    fn parse_check_rejects_moved_sentence() {
        let mut fx = Fixture::new();
        let s1 = fx.add_sense(1, fx.en, &["A"]);
        let s2 = fx.add_sense(2, fx.en, &["B"]);
        let a = fx.add_sentence(s1, Some(fx.declarative), false, &[(fx.en, "a")]);
        let b = fx.add_sentence(s2, Some(fx.declarative), false, &[(fx.en, "b")]);
        let g = fx.grammar();

        let numbers: BTreeSet<u8> = reconcile(&fx.db, fx.gloss).keys().copied().collect();
        let by_sense = sentences_by_sense(&fx.db, fx.gloss);

        let ok = g.encode(&[tuple(1, a, "Declarative", false, "x"), tuple(2, b, "Declarative", false, "y")]);
        assert!(update_sentences_parse(&numbers, &by_sense, &ok, &g));

        let moved = g.encode(&[tuple(2, a, "Declarative", false, "x")]);
        assert!(!update_sentences_parse(&numbers, &by_sense, &moved, &g));

        let unknown_sense = g.encode(&[tuple(5, a, "Declarative", false, "x")]);
        assert!(!update_sentences_parse(&numbers, &by_sense, &unknown_sense, &g));

        let twice = g.encode(&[tuple(1, a, "Declarative", false, "x"), tuple(1, a, "Declarative", false, "z")]);
        assert!(!update_sentences_parse(&numbers, &by_sense, &twice, &g));

        assert!(!update_sentences_parse(&numbers, &by_sense, "nonsense", &g));
        assert!(update_sentences_parse(&numbers, &by_sense, "", &g));
    }

    #[test]
    fn update_writes_text_only() {
        let mut fx = Fixture::new();
        let sense = fx.add_sense(1, fx.en, &["RUN"]);
        let id = fx.add_sentence(sense, Some(fx.declarative), false, &[(fx.en, "He ran.")]);
        let g = fx.grammar();

        // type and polarity in the cell are ignored by the write
        let cell = g.encode(&[tuple(1, id, "Interrogative", true, "He runs.")]);
        let applied = update_sentences(&mut fx.db, fx.gloss, fx.en, &cell, &g, true, "tester").unwrap();
        assert_eq!(applied.len(), 1);

        let stored = fx.db.example_sentence(id).unwrap();
        assert_eq!(stored.sentence_type, Some(fx.declarative));
        assert!(!stored.negative);
        assert_eq!(fx.db.sentence_translation(id, fx.en).unwrap().text, "He runs.");

        let rev = fx.db.revisions.last().unwrap();
        assert!(rev.old_value.contains("He ran."));
        assert!(rev.new_value.contains("He runs."));
    }

    #[test]
    fn update_dry_run_writes_nothing() {
        let mut fx = Fixture::new();
        let sense = fx.add_sense(1, fx.en, &["RUN"]);
        let id = fx.add_sentence(sense, Some(fx.declarative), false, &[(fx.en, "He ran.")]);
        let g = fx.grammar();

        let cell = g.encode(&[tuple(1, id, "Declarative", false, "He runs.")]);
        let planned = update_sentences(&mut fx.db, fx.gloss, fx.en, &cell, &g, false, "tester").unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].sentence_type, Some(fx.declarative));
        assert_eq!(fx.db.sentence_translation(id, fx.en).unwrap().text, "He ran.");
        assert!(fx.db.revisions.is_empty());
    }

    #[test]
    fn update_skips_bad_tuples_and_missing_sentences() {
        let mut fx = Fixture::new();
        let sense = fx.add_sense(1, fx.en, &["RUN"]);
        let id = fx.add_sentence(sense, None, false, &[(fx.en, "old")]);
        let g = fx.grammar();

        let cell = format!(
            "(1, {id}, -, False, “new”) | (1, 999, -, False, “ghost”) | (1, x, -, False, “bad”)"
        );
        let applied = update_sentences(&mut fx.db, fx.gloss, fx.nl, &cell, &g, true, "tester").unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(fx.db.sentence_translation(id, fx.nl).unwrap().text, "new");
        assert_eq!(fx.db.sentence_translation(id, fx.en).unwrap().text, "old");
    }

    #[test]
    fn update_leaves_other_glosses_alone() {
        let mut fx = Fixture::new();
        let own = fx.add_sense(1, fx.en, &["RUN"]);
        let mine = fx.add_sentence(own, None, false, &[(fx.en, "mine")]);

        let lemma = fx.db.glosses[0].lemma_id;
        let other_gloss = fx.db.add_gloss(lemma, "RUN-B");
        let other_sense = fx.db.create_sense();
        fx.db.link_sense(other_gloss, other_sense, 1).unwrap();
        let theirs = fx.add_sentence(other_sense, None, false, &[(fx.en, "theirs")]);
        let g = fx.grammar();

        let cell = format!("(1, {mine}, -, False, “changed”) | (1, {theirs}, -, False, “taken over”)");
        let applied = update_sentences(&mut fx.db, fx.gloss, fx.en, &cell, &g, true, "tester").unwrap();

        assert_eq!(applied.iter().map(|u| u.sentence_id).collect::<Vec<_>>(), vec![mine]);
        assert_eq!(fx.db.sentence_translation(mine, fx.en).unwrap().text, "changed");
        assert_eq!(fx.db.sentence_translation(theirs, fx.en).unwrap().text, "theirs");
        assert!(fx.db.revisions.iter().all(|r| r.gloss_id == fx.gloss));
    }

    #[test]
    fn update_refuses_closing_marker_in_text() {
        let mut fx = Fixture::new();
        let sense = fx.add_sense(1, fx.en, &["RUN"]);
        let id = fx.add_sentence(sense, None, false, &[(fx.en, "old")]);
        let g = fx.grammar();

        let cell = format!("(1, {id}, -, False, “a ” b”)");
        let applied = update_sentences(&mut fx.db, fx.gloss, fx.en, &cell, &g, true, "tester").unwrap();
        assert!(applied.is_empty());
        assert_eq!(fx.db.sentence_translation(id, fx.en).unwrap().text, "old");
    }

    #[test]
    fn compare_reports_unstorable_text() {
        let g = Fixture::new().grammar();
        let old = g.encode(&[tuple(1, 42, "Declarative", false, "a")]);
        let new = "(1, 42, Declarative, False, “a ” b”)";

        let diff = compare(7, &old, new, &g);
        assert!(diff.changes.is_empty());
        assert_eq!(diff.errors.len(), 1);
        assert!(diff.errors[0].contains("closing marker"));
    }

    #[test]
    fn update_without_senses_is_noop() {
        let mut fx = Fixture::new();
        let g = fx.grammar();
        let applied =
            update_sentences(&mut fx.db, fx.gloss, fx.en, "(1, 1, -, False, “x”)", &g, true, "t").unwrap();
        assert!(applied.is_empty());
    }

    #[test]
    fn create_appends_to_sense() {
        let mut fx = Fixture::new();
        let sense = fx.add_sense(2, fx.en, &["RUN"]);
        let first = fx.add_sentence(sense, None, false, &[(fx.en, "one")]);
        let g = fx.grammar();

        let fields = NewSentence {
            order: 2,
            sentence_type: "Interrogative".into(),
            negative: true,
            texts: BTreeMap::from([(fx.en, "Did he run?".to_string()), (fx.nl, "Rende hij?".to_string())]),
        };
        let langs = [fx.en, fx.nl];
        let id = create_sentence(&mut fx.db, fx.gloss, &langs, &fields, &g, true, "tester")
            .unwrap()
            .unwrap();

        let links = fx.db.sentences_of_sense(sense);
        assert_eq!(links.iter().map(|l| (l.sentence_id, l.order)).collect::<Vec<_>>(), vec![(first, 1), (id, 2)]);
        let stored = fx.db.example_sentence(id).unwrap();
        assert_eq!(stored.sentence_type, Some(fx.interrogative));
        assert!(stored.negative);
        assert_eq!(fx.db.sentence_translation(id, fx.nl).unwrap().text, "Rende hij?");
        assert!(sentences_cell(&fx.db, fx.gloss, fx.en, &g).ends_with("Interrogative, True, “Did he run?”)"));
        assert_eq!(fx.db.revisions.last().unwrap().old_value, "");
    }

    #[test]
    fn create_dry_run_and_missing_sense() {
        let mut fx = Fixture::new();
        fx.add_sense(1, fx.en, &["RUN"]);
        let g = fx.grammar();
        let langs = [fx.en];

        let mut fields = NewSentence {
            order: 1,
            sentence_type: "-".into(),
            negative: false,
            texts: BTreeMap::new(),
        };
        assert_eq!(create_sentence(&mut fx.db, fx.gloss, &langs, &fields, &g, false, "t").unwrap(), None);
        assert!(fx.db.example_sentences.is_empty());

        fields.texts.insert(fx.en, "bad ” text".into());
        let err = create_sentence(&mut fx.db, fx.gloss, &langs, &fields, &g, false, "t").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        fields.texts.clear();

        fields.order = 4;
        let err = create_sentence(&mut fx.db, fx.gloss, &langs, &fields, &g, true, "t").unwrap_err();
        assert!(err.to_string().contains("does not have a Sense Number 4"));
    }
}
