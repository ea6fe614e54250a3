#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    SensesDecode,
    SensesEncode,
    SentencesDecode,
    SentencesCompare,
    GlossCells,
    ImportSentences,
    ImportGlosses,
    ExportGlosses,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "senses.decode" => Command::SensesDecode,
            "senses.encode" => Command::SensesEncode,
            "sentences.decode" => Command::SentencesDecode,
            "sentences.compare" => Command::SentencesCompare,
            "gloss.cells" => Command::GlossCells,
            "import.sentences" => Command::ImportSentences,
            "import.glosses" => Command::ImportGlosses,
            "export.glosses" => Command::ExportGlosses,
            _ => Command::Unknown,
        }
    }
}
