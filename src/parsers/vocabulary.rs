//! Sentence type labels, snapshotted from the field choice table.

use tracing::warn;

use crate::model::sentence::FieldChoice;
use crate::model::Id;

/// Labels meaning "no sentence type".
pub const UNTYPED_LABELS: [&str; 2] = ["-", "N/A"];

#[derive(Debug, Clone, Default)]
pub struct SentenceTypes {
    choices: Vec<(String, Id)>,
}

impl SentenceTypes {
    /// First occurrence of a label wins; later ones are reported and ignored.
    pub fn new(choices: Vec<(String, Id)>) -> Self {
        let mut kept: Vec<(String, Id)> = Vec::with_capacity(choices.len());
        for (label, id) in choices {
            if let Some((_, first)) = kept.iter().find(|(l, _)| *l == label) {
                warn!(label = %label, kept = first, ignored = id, "multiple sentence type choices share a label");
                continue;
            }
            kept.push((label, id));
        }
        SentenceTypes { choices: kept }
    }

    pub fn from_choices<'a>(choices: impl IntoIterator<Item = &'a FieldChoice>) -> Self {
        SentenceTypes::new(choices.into_iter().map(|c| (c.name.clone(), c.id)).collect())
    }

    /// All accepted labels, fallbacks included.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = UNTYPED_LABELS.to_vec();
        for (label, _) in &self.choices {
            if !labels.contains(&label.as_str()) {
                labels.push(label);
            }
        }
        labels
    }

    /// `Ok(None)` for the untyped fallbacks, `Err` for an unknown label.
    pub fn resolve(&self, label: &str) -> Result<Option<Id>, String> {
        let label = label.trim();
        if let Some((_, id)) = self.choices.iter().find(|(l, _)| l == label) {
            return Ok(Some(*id));
        }
        if UNTYPED_LABELS.contains(&label) {
            return Ok(None);
        }
        Err(format!("Sentence Type '{label}' does not exist"))
    }

    pub fn label_of(&self, id: Option<Id>) -> &str {
        id.and_then(|id| self.choices.iter().find(|(_, c)| *c == id))
            .map(|(l, _)| l.as_str())
            .unwrap_or(UNTYPED_LABELS[0])
    }

    /// Regex alternation over every label, longest first.
    pub fn pattern(&self) -> String {
        let mut labels = self.labels();
        labels.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        labels
            .into_iter()
            .map(escape_label)
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Escapes a vocabulary label for use inside a regex, e.g. `Question (yes/no)`
/// becomes `Question \(yes/no\)`.
pub fn escape_label(label: &str) -> String {
    regex::escape(label)
}
