//! Senses cell: `1. RUN, JOG | 2. SPRINT`.

use std::collections::{BTreeMap, HashSet};

pub const SENSE_SEPARATOR: &str = " | ";
pub const ORDER_SEPARATOR: &str = ". ";
pub const KEYWORD_SEPARATOR: &str = ", ";
pub const MAX_SENSE_ORDER: u8 = 8;

/// Sense order number -> keywords in display order.
pub type SenseMap = BTreeMap<u8, Vec<String>>;

pub fn encode(senses: &SenseMap) -> String {
    senses
        .iter()
        .filter(|(_, keywords)| !keywords.is_empty())
        .map(|(order, keywords)| format!("{order}{ORDER_SEPARATOR}{}", keywords.join(KEYWORD_SEPARATOR)))
        .collect::<Vec<_>>()
        .join(SENSE_SEPARATOR)
}

/// Decodes a whole cell. Any bad item rejects the cell; every problem found
/// is reported.
pub fn decode(text: &str) -> Result<SenseMap, Vec<String>> {
    let mut senses = SenseMap::new();
    let mut errors: Vec<String> = Vec::new();

    if text.trim().is_empty() {
        return Ok(senses);
    }

    for item in text.split(SENSE_SEPARATOR) {
        let item = item.trim();

        let Some((order_token, keywords_token)) = item.split_once(ORDER_SEPARATOR) else {
            errors.push(format!(
                "Sense '{item}' must start with a sense number followed by '{}'",
                ORDER_SEPARATOR.trim_end()
            ));
            continue;
        };

        let order = match parse_order(order_token.trim()) {
            Ok(o) => o,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };

        if senses.contains_key(&order) {
            errors.push(format!("Sense number {order} appears more than once"));
            continue;
        }

        match parse_keywords(order, keywords_token) {
            Ok(keywords) => {
                senses.insert(order, keywords);
            }
            Err(mut e) => errors.append(&mut e),
        }
    }

    if errors.is_empty() {
        Ok(senses)
    } else {
        Err(errors)
    }
}

fn parse_order(token: &str) -> Result<u8, String> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("Sense number '{token}' is not a number"));
    }

    match token.parse::<u8>() {
        Ok(n) if (1..=MAX_SENSE_ORDER).contains(&n) => Ok(n),
        _ => Err(format!(
            "Sense number {token} is out of range 1-{MAX_SENSE_ORDER}"
        )),
    }
}

fn parse_keywords(order: u8, token: &str) -> Result<Vec<String>, Vec<String>> {
    if token.trim().is_empty() {
        return Err(vec![format!("Sense {order} has no keywords")]);
    }

    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut keywords = Vec::new();

    for kw in token.split(KEYWORD_SEPARATOR).map(str::trim) {
        if kw.is_empty() {
            errors.push(format!("Sense {order} contains an empty keyword"));
            continue;
        }
        // case-sensitive: "Run" and "run" are distinct keywords
        if !seen.insert(kw) {
            errors.push(format!("Sense {order} contains duplicate keyword '{kw}'"));
            continue;
        }
        keywords.push(kw.to_string());
    }

    if errors.is_empty() {
        Ok(keywords)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(items: &[(u8, &[&str])]) -> SenseMap {
        items
            .iter()
            .map(|(o, kws)| (*o, kws.iter().map(|k| k.to_string()).collect()))
            .collect()
    }

    #[test]
    fn encodes_in_order() {
        let m = map(&[(2, &["SPRINT"]), (1, &["RUN", "JOG"])]);
        assert_eq!(encode(&m), "1. RUN, JOG | 2. SPRINT");
    }

    #[test]
    fn empty_map_encodes_to_empty_cell() {
        assert_eq!(encode(&SenseMap::new()), "");
        assert_eq!(encode(&map(&[(1, &[])])), "");
    }

    #[test]
    fn decodes_what_it_encodes() {
        let m = map(&[(1, &["RUN", "JOG"]), (3, &["walk fast", "Mr. Smith"]), (8, &["x"])]);
        assert_eq!(decode(&encode(&m)).unwrap(), m);
    }

    #[test]
    fn empty_cell_is_valid() {
        assert!(decode("").unwrap().is_empty());
        assert!(decode("   ").unwrap().is_empty());
    }

    #[test]
    fn rejects_duplicate_keyword() {
        let errors = decode("1. A, A").unwrap_err();
        assert_eq!(errors, vec!["Sense 1 contains duplicate keyword 'A'".to_string()]);
        // case-sensitive
        assert!(decode("1. A, a").is_ok());
    }

    #[test]
    fn rejects_duplicate_order() {
        let errors = decode("1. A | 1. B").unwrap_err();
        assert!(errors[0].contains("appears more than once"));
    }

    #[test]
    fn rejects_out_of_range_order() {
        assert!(decode("9. A").is_err());
        assert!(decode("0. A").is_err());
        assert!(decode("300. A").is_err());
    }

    #[test]
    fn rejects_malformed_items() {
        assert!(decode("A, B").unwrap_err()[0].contains("must start with a sense number"));
        assert!(decode("x. A").unwrap_err()[0].contains("is not a number"));
        assert!(decode("1. ").is_err());
        assert!(decode("1. A, , B").is_err());
    }

    #[test]
    fn one_bad_item_rejects_whole_cell() {
        let errors = decode("1. A | 2. B, B | 12. C").unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
