use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::revision::Revision;
use crate::model::Id;
use crate::store::Database;

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Appends one history entry; creations use an empty `old_value`.
pub fn record(db: &mut Database, gloss_id: Id, field_name: &str, old_value: &str, new_value: &str, user: &str) {
    db.record_revision(Revision {
        gloss_id,
        field_name: field_name.to_string(),
        old_value: old_value.to_string(),
        new_value: new_value.to_string(),
        user: user.to_string(),
        time: now(),
    });
}
