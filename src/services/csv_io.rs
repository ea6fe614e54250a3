//! Outer CSV layer. Cell contents are handed to the cell grammars untouched.

use std::collections::HashMap;

use crate::error::Result;

pub const GLOSS_ID_COLUMN: &str = "Signbank ID";
pub const DATASET_COLUMN: &str = "Dataset";
pub const ANNOTATION_COLUMN: &str = "Annotation";
pub const SENSE_NUMBER_COLUMN: &str = "Sense Number";
pub const SENTENCE_TYPE_COLUMN: &str = "Sentence Type";
pub const NEGATIVE_COLUMN: &str = "Negative";

pub fn senses_column(language_name: &str) -> String {
    format!("Senses ({language_name})")
}

pub fn sentences_column(language_name: &str) -> String {
    format!("Example Sentences ({language_name})")
}

#[derive(Debug, Clone, Default)]
pub struct CsvRow {
    values: HashMap<String, String>,
}

impl CsvRow {
    pub fn has(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Raw cell value; missing columns read as empty.
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

impl CsvTable {
    pub fn missing_columns(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.headers.contains(c))
            .cloned()
            .collect()
    }
}

/// Error messages use `Row <index + 2>`: one for the header line and one
/// because file lines count from 1.
pub fn row_number(index: usize) -> usize {
    index + 2
}

pub fn read_table(text: &str) -> Result<CsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let values = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(CsvRow { values });
    }

    Ok(CsvTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_by_header() {
        let table = read_table(
            "Signbank ID, Dataset ,Senses (English)\n12,NGT,\"1. RUN, JOG | 2. SPRINT\"\n13,NGT\n",
        )
        .unwrap();

        assert_eq!(table.headers, vec!["Signbank ID", "Dataset", "Senses (English)"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("Senses (English)"), "1. RUN, JOG | 2. SPRINT");
        assert!(!table.rows[1].has("Senses (English)"));
        assert_eq!(table.rows[1].get("Senses (English)"), "");
    }

    #[test]
    fn reports_missing_columns() {
        let table = read_table("Signbank ID\n1\n").unwrap();
        let missing = table.missing_columns(&[GLOSS_ID_COLUMN.to_string(), DATASET_COLUMN.to_string()]);
        assert_eq!(missing, vec!["Dataset"]);
    }

    #[test]
    fn row_numbers_skip_header() {
        assert_eq!(row_number(0), 2);
    }
}
