use super::Database;
use crate::error::{Error, Result};
use crate::model::dataset::{Dataset, Gloss, Language, Lemma};
use crate::model::revision::Revision;
use crate::model::sense::{GlossSense, Keyword, Sense, SenseTranslation, Translation};
use crate::model::sentence::{
    ExampleSentence, ExampleSentenceTranslation, FieldChoice, SenseExampleSentence,
    SENTENCE_TYPE_FIELD,
};
use crate::model::Id;
use crate::parsers::vocabulary::SentenceTypes;

impl Database {
    pub fn add_language(&mut self, code: &str, name: &str) -> Id {
        let id = self.allocate_id();
        self.languages.push(Language {
            id,
            code: code.to_string(),
            name: name.to_string(),
        });
        id
    }

    pub fn add_dataset(&mut self, acronym: &str, name: &str, languages: &[Id]) -> Id {
        let id = self.allocate_id();
        self.datasets.push(Dataset {
            id,
            acronym: acronym.to_string(),
            name: name.to_string(),
            languages: languages.to_vec(),
        });
        id
    }

    pub fn add_lemma(&mut self, dataset_id: Id) -> Id {
        let id = self.allocate_id();
        self.lemmas.push(Lemma { id, dataset_id });
        id
    }

    pub fn add_gloss(&mut self, lemma_id: Id, annotation: &str) -> Id {
        let id = self.allocate_id();
        self.glosses.push(Gloss {
            id,
            lemma_id,
            annotation: annotation.to_string(),
        });
        id
    }

    pub fn add_field_choice(&mut self, field: &str, name: &str, machine_value: i64) -> Id {
        let id = self.allocate_id();
        self.field_choices.push(FieldChoice {
            id,
            field: field.to_string(),
            name: name.to_string(),
            machine_value,
        });
        id
    }

    pub fn gloss(&self, id: Id) -> Option<&Gloss> {
        self.glosses.iter().find(|g| g.id == id)
    }

    pub fn dataset(&self, id: Id) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    pub fn dataset_by_acronym(&self, acronym: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.acronym == acronym)
    }

    pub fn dataset_of_gloss(&self, gloss_id: Id) -> Option<&Dataset> {
        let gloss = self.gloss(gloss_id)?;
        let lemma = self.lemmas.iter().find(|l| l.id == gloss.lemma_id)?;
        self.dataset(lemma.dataset_id)
    }

    pub fn language(&self, id: Id) -> Option<&Language> {
        self.languages.iter().find(|l| l.id == id)
    }

    pub fn dataset_languages(&self, dataset: &Dataset) -> Vec<&Language> {
        dataset
            .languages
            .iter()
            .filter_map(|id| self.language(*id))
            .collect()
    }

    pub fn glosses_in_dataset(&self, dataset_id: Id) -> Vec<&Gloss> {
        self.glosses
            .iter()
            .filter(|g| {
                self.lemmas
                    .iter()
                    .any(|l| l.id == g.lemma_id && l.dataset_id == dataset_id)
            })
            .collect()
    }

    /// Sense links of a gloss ordered by `order`; ties keep insertion order.
    pub fn gloss_sense_links(&self, gloss_id: Id) -> Vec<&GlossSense> {
        let mut links: Vec<&GlossSense> = self
            .gloss_senses
            .iter()
            .filter(|gs| gs.gloss_id == gloss_id)
            .collect();
        links.sort_by_key(|gs| gs.order);
        links
    }

    pub fn sense_translations_of(&self, sense_id: Id) -> Vec<&SenseTranslation> {
        self.sense_translations
            .iter()
            .filter(|st| st.sense_id == sense_id)
            .collect()
    }

    pub fn sense_translations_for(&self, sense_id: Id, language_id: Id) -> Vec<&SenseTranslation> {
        self.sense_translations
            .iter()
            .filter(|st| st.sense_id == sense_id && st.language_id == language_id)
            .collect()
    }

    pub fn translation(&self, id: Id) -> Option<&Translation> {
        self.translations.iter().find(|t| t.id == id)
    }

    pub fn keyword(&self, id: Id) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.id == id)
    }

    pub fn sentences_of_sense(&self, sense_id: Id) -> Vec<&SenseExampleSentence> {
        let mut links: Vec<&SenseExampleSentence> = self
            .sense_sentences
            .iter()
            .filter(|s| s.sense_id == sense_id)
            .collect();
        links.sort_by_key(|s| s.order);
        links
    }

    pub fn example_sentence(&self, id: Id) -> Option<&ExampleSentence> {
        self.example_sentences.iter().find(|s| s.id == id)
    }

    pub fn sentence_translation(
        &self,
        sentence_id: Id,
        language_id: Id,
    ) -> Option<&ExampleSentenceTranslation> {
        self.sentence_translations
            .iter()
            .find(|t| t.sentence_id == sentence_id && t.language_id == language_id)
    }

    pub fn field_choices(&self, field: &str) -> Vec<&FieldChoice> {
        self.field_choices.iter().filter(|c| c.field == field).collect()
    }

    pub fn field_choice(&self, id: Id) -> Option<&FieldChoice> {
        self.field_choices.iter().find(|c| c.id == id)
    }

    /// Snapshot of the sentence type vocabulary, taken once per operation.
    pub fn sentence_types(&self) -> SentenceTypes {
        SentenceTypes::from_choices(self.field_choices(SENTENCE_TYPE_FIELD))
    }

    pub fn create_sense(&mut self) -> Id {
        let id = self.allocate_id();
        self.senses.push(Sense { id });
        id
    }

    pub fn link_sense(&mut self, gloss_id: Id, sense_id: Id, order: u8) -> Result<()> {
        if self.gloss(gloss_id).is_none() {
            return Err(Error::NotFound(format!("gloss {gloss_id}")));
        }
        self.gloss_senses.push(GlossSense {
            gloss_id,
            sense_id,
            order,
        });
        Ok(())
    }

    pub fn create_sense_translation(&mut self, sense_id: Id, language_id: Id) -> Result<Id> {
        if self.language(language_id).is_none() {
            return Err(Error::NotFound(format!("language {language_id}")));
        }
        let id = self.allocate_id();
        self.sense_translations.push(SenseTranslation {
            id,
            sense_id,
            language_id,
            translations: Vec::new(),
        });
        Ok(id)
    }

    /// Deletes the translation rows owned by a sense translation, keeping the
    /// (now empty) sense translation itself.
    pub fn clear_sense_translation(&mut self, sense_translation_id: Id) -> Result<()> {
        let st = self
            .sense_translations
            .iter_mut()
            .find(|st| st.id == sense_translation_id)
            .ok_or_else(|| Error::NotFound(format!("sense translation {sense_translation_id}")))?;
        let owned = std::mem::take(&mut st.translations);
        self.translations.retain(|t| !owned.contains(&t.id));
        Ok(())
    }

    pub fn delete_sense_translation(&mut self, sense_translation_id: Id) {
        self.sense_translations.retain(|st| st.id != sense_translation_id);
    }

    pub fn get_or_create_keyword(&mut self, text: &str) -> Id {
        if let Some(k) = self.keywords.iter().find(|k| k.text == text) {
            return k.id;
        }
        let id = self.allocate_id();
        self.keywords.push(Keyword {
            id,
            text: text.to_string(),
        });
        id
    }

    pub fn create_translation(
        &mut self,
        gloss_id: Id,
        language_id: Id,
        keyword_id: Id,
        index: u32,
        order_index: u8,
    ) -> Result<Id> {
        if self.keyword(keyword_id).is_none() {
            return Err(Error::NotFound(format!("keyword {keyword_id}")));
        }
        let id = self.allocate_id();
        self.translations.push(Translation {
            id,
            gloss_id,
            language_id,
            keyword_id,
            index,
            order_index,
        });
        Ok(id)
    }

    pub fn attach_translation(&mut self, sense_translation_id: Id, translation_id: Id) -> Result<()> {
        let st = self
            .sense_translations
            .iter_mut()
            .find(|st| st.id == sense_translation_id)
            .ok_or_else(|| Error::NotFound(format!("sense translation {sense_translation_id}")))?;
        if !st.translations.contains(&translation_id) {
            st.translations.push(translation_id);
        }
        Ok(())
    }

    pub fn create_example_sentence(&mut self, sentence_type: Option<Id>, negative: bool) -> Id {
        let id = self.allocate_id();
        self.example_sentences.push(ExampleSentence {
            id,
            sentence_type,
            negative,
        });
        id
    }

    pub fn attach_sentence(&mut self, sense_id: Id, sentence_id: Id, order: u32) -> Result<()> {
        if !self.senses.iter().any(|s| s.id == sense_id) {
            return Err(Error::NotFound(format!("sense {sense_id}")));
        }
        self.sense_sentences.push(SenseExampleSentence {
            sense_id,
            sentence_id,
            order,
        });
        Ok(())
    }

    /// Get-or-create the translation of a sentence and overwrite its text.
    pub fn set_sentence_text(&mut self, sentence_id: Id, language_id: Id, text: &str) -> Id {
        if let Some(t) = self
            .sentence_translations
            .iter_mut()
            .find(|t| t.sentence_id == sentence_id && t.language_id == language_id)
        {
            t.text = text.to_string();
            return t.id;
        }
        let id = self.allocate_id();
        self.sentence_translations.push(ExampleSentenceTranslation {
            id,
            sentence_id,
            language_id,
            text: text.to_string(),
        });
        id
    }

    pub fn record_revision(&mut self, revision: Revision) {
        self.revisions.push(revision);
    }
}
