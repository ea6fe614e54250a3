//! Canonical order -> sense view of a gloss.
//!
//! Stored data may hold several senses under one order number or several
//! sense translations for one language. Both are resolved first-wins and
//! reported through `warn!`; nothing is merged or raised.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::model::sense::SenseTranslation;
use crate::model::Id;
use crate::store::Database;

/// Sense order number -> sense id.
pub type SenseSlots = BTreeMap<u8, Id>;

pub fn reconcile(db: &Database, gloss_id: Id) -> SenseSlots {
    let mut slots = SenseSlots::new();

    for link in db.gloss_sense_links(gloss_id) {
        if let Some(kept) = slots.get(&link.order).copied() {
            warn!(
                gloss_id,
                order = link.order,
                kept,
                ignored = link.sense_id,
                "duplicate sense order for gloss"
            );
            continue;
        }
        slots.insert(link.order, link.sense_id);
    }

    slots
}

/// The sense translation used for `language_id`; extra ones are ignored.
pub fn sense_translation<'a>(
    db: &'a Database,
    sense_id: Id,
    language_id: Id,
) -> Option<&'a SenseTranslation> {
    let found = db.sense_translations_for(sense_id, language_id);
    if found.len() > 1 {
        warn!(
            sense_id,
            language_id,
            count = found.len(),
            "more than one sense translation for language, using the first"
        );
    }
    found.into_iter().next()
}

/// Like `reconcile`, but first drops sense translations without any
/// translation so stale empty language slots never show up in a diff.
pub fn delete_empty(db: &mut Database, gloss_id: Id) -> SenseSlots {
    let slots = reconcile(db, gloss_id);

    let empty: Vec<Id> = slots
        .values()
        .flat_map(|sense_id| db.sense_translations_of(*sense_id))
        .filter(|st| st.translations.is_empty())
        .map(|st| st.id)
        .collect();

    for id in empty {
        debug!(gloss_id, sense_translation = id, "removing empty sense translation");
        db.delete_sense_translation(id);
    }

    slots
}
