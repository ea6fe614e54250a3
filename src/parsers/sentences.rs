//! Example sentences cell:
//! `(<order>, <sentence id>, <type>, True|False, “<text>”) | ...`
//!
//! The text span runs from the opening quote marker to the first closing
//! marker that is followed by the tuple's `)`. The default markers are
//! `“`/`”`, so texts may hold plain double quotes. This nested quoting is
//! independent of the CSV layer's own quoting.

use regex::{Captures, Regex};
use serde::Serialize;

use super::vocabulary::SentenceTypes;
use crate::config::QuoteMarkers;
use crate::error::Result;
use crate::model::Id;

pub const TUPLE_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceTuple {
    pub order: u8,
    pub sentence_id: Id,
    pub sentence_type: String,
    pub negative: bool,
    pub text: String,
}

/// The `(order, type, negative)` triple of a row in the sentence import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceIdentity {
    pub order: u8,
    pub sentence_type: String,
    pub negative: bool,
}

/// Compiled for one snapshot of the sentence type vocabulary.
#[derive(Debug, Clone)]
pub struct SentenceGrammar {
    tuple: Regex,
    identity: Regex,
    quote: QuoteMarkers,
    types: SentenceTypes,
}

pub fn format_negative(negative: bool) -> &'static str {
    if negative {
        "True"
    } else {
        "False"
    }
}

impl SentenceGrammar {
    pub fn new(types: &SentenceTypes, quote: &QuoteMarkers) -> Result<Self> {
        let alternation = types.pattern();

        let tuple = Regex::new(&format!(
            r"(?s)\(\s*(?P<order>\d+)\s*,\s*(?P<id>\d+)\s*,\s*(?P<type>{alternation})\s*,\s*(?P<negative>True|False)\s*,\s*{open}(?P<text>.*?){close}\s*\)",
            open = regex::escape(&quote.open),
            close = regex::escape(&quote.close),
        ))?;

        let identity = Regex::new(&format!(
            r"^\s*\(\s*(?P<order>\d+)\s*,\s*(?P<type>{alternation})\s*,\s*(?P<negative>True|False)\s*\)\s*$"
        ))?;

        Ok(SentenceGrammar {
            tuple,
            identity,
            quote: quote.clone(),
            types: types.clone(),
        })
    }

    /// The vocabulary this grammar was compiled from.
    pub fn types(&self) -> &SentenceTypes {
        &self.types
    }

    /// A text can only be stored if its encoded tuple decodes back to it.
    pub fn check_text(&self, text: &str) -> std::result::Result<(), String> {
        if text.contains(self.quote.close.as_str()) {
            return Err(format!(
                "Sentence text may not contain the closing marker {}: {text}",
                self.quote.close
            ));
        }
        Ok(())
    }

    pub fn encode_tuple(&self, t: &SentenceTuple) -> String {
        format!(
            "({}, {}, {}, {}, {}{}{})",
            t.order,
            t.sentence_id,
            t.sentence_type,
            format_negative(t.negative),
            self.quote.open,
            t.text,
            self.quote.close
        )
    }

    pub fn encode(&self, tuples: &[SentenceTuple]) -> String {
        tuples
            .iter()
            .map(|t| self.encode_tuple(t))
            .collect::<Vec<_>>()
            .join(TUPLE_SEPARATOR)
    }

    /// Strict decoding: a non-empty cell that is not entirely made of
    /// well-formed tuples yields `(vec![], true)`. An empty cell is
    /// `(vec![], false)`.
    pub fn decode(&self, text: &str) -> (Vec<SentenceTuple>, bool) {
        if text.trim().is_empty() {
            return (Vec::new(), false);
        }

        let (tuples, rejected) = self.scan(text);
        if rejected.is_empty() {
            (tuples, false)
        } else {
            (Vec::new(), true)
        }
    }

    /// Lenient decoding: returns every well-formed tuple together with the
    /// fragments that could not be parsed.
    pub fn scan(&self, text: &str) -> (Vec<SentenceTuple>, Vec<String>) {
        let mut tuples = Vec::new();
        let mut rejected = Vec::new();
        let mut last = 0usize;

        for caps in self.tuple.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };

            check_gap(&text[last..m.start()], last == 0, &mut rejected);

            match tuple_from(&caps) {
                Some(t) => tuples.push(t),
                None => rejected.push(m.as_str().to_string()),
            }
            last = m.end();
        }

        let tail = text[last..].trim();
        if !tail.is_empty() {
            rejected.push(tail.to_string());
        }

        (tuples, rejected)
    }

    pub fn decode_identity(&self, text: &str) -> Option<SentenceIdentity> {
        let caps = self.identity.captures(text)?;
        Some(SentenceIdentity {
            order: caps.name("order")?.as_str().parse().ok()?,
            sentence_type: caps.name("type")?.as_str().to_string(),
            negative: caps.name("negative")?.as_str() == "True",
        })
    }
}

// Text between two tuples must be exactly the separator; before the first
// tuple it must be blank.
fn check_gap(gap: &str, leading: bool, rejected: &mut Vec<String>) {
    let g = gap.trim();
    let ok = if leading { g.is_empty() } else { g == "|" };
    if ok {
        return;
    }

    let fragment = g.trim_matches('|').trim();
    if fragment.is_empty() {
        rejected.push(format!("missing separator near '{g}'"));
    } else {
        rejected.push(fragment.to_string());
    }
}

fn tuple_from(caps: &Captures) -> Option<SentenceTuple> {
    Some(SentenceTuple {
        order: caps.name("order")?.as_str().parse().ok()?,
        sentence_id: caps.name("id")?.as_str().parse().ok()?,
        sentence_type: caps.name("type")?.as_str().to_string(),
        negative: caps.name("negative")?.as_str() == "True",
        text: caps.name("text")?.as_str().to_string(),
    })
}
