use crate::config::QuoteMarkers;
use crate::model::sentence::SENTENCE_TYPE_FIELD;
use crate::model::Id;
use crate::parsers::sentences::SentenceGrammar;
use crate::store::Database;

/// One dataset (English + Dutch) with a single empty gloss and two
/// sentence types.
pub(crate) struct Fixture {
    pub db: Database,
    pub en: Id,
    pub nl: Id,
    pub dataset: Id,
    pub gloss: Id,
    pub declarative: Id,
    pub interrogative: Id,
}

impl Fixture {
    pub fn new() -> Self {
        let mut db = Database::new();
        let en = db.add_language("en", "English");
        let nl = db.add_language("nl", "Dutch");
        let dataset = db.add_dataset("NGT", "Nederlandse Gebarentaal", &[en, nl]);
        let lemma = db.add_lemma(dataset);
        let gloss = db.add_gloss(lemma, "RUN-A");
        let declarative = db.add_field_choice(SENTENCE_TYPE_FIELD, "Declarative", 1);
        let interrogative = db.add_field_choice(SENTENCE_TYPE_FIELD, "Interrogative", 2);

        Fixture {
            db,
            en,
            nl,
            dataset,
            gloss,
            declarative,
            interrogative,
        }
    }

    pub fn add_sense(&mut self, order: u8, language: Id, keywords: &[&str]) -> Id {
        let sense = self.db.create_sense();
        self.db.link_sense(self.gloss, sense, order).unwrap();
        let st = self.db.create_sense_translation(sense, language).unwrap();
        for (i, kw) in keywords.iter().enumerate() {
            let k = self.db.get_or_create_keyword(kw);
            let t = self
                .db
                .create_translation(self.gloss, language, k, i as u32 + 1, order)
                .unwrap();
            self.db.attach_translation(st, t).unwrap();
        }
        sense
    }

    pub fn add_sentence(
        &mut self,
        sense: Id,
        sentence_type: Option<Id>,
        negative: bool,
        texts: &[(Id, &str)],
    ) -> Id {
        let sentence = self.db.create_example_sentence(sentence_type, negative);
        let order = self.db.sentences_of_sense(sense).len() as u32 + 1;
        self.db.attach_sentence(sense, sentence, order).unwrap();
        for (language, text) in texts {
            self.db.set_sentence_text(sentence, *language, text);
        }
        sentence
    }

    pub fn grammar(&self) -> SentenceGrammar {
        SentenceGrammar::new(&self.db.sentence_types(), &QuoteMarkers::default()).unwrap()
    }
}
