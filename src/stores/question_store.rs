use crate::models::api::QuestionFilter;
use crate::models::question::{NewQuestion, Question, QuestionKey, QuestionUpdate};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStoreError {
    /// Same (year, study_year, module, number, exam_type) already stored.
    #[error("Question already exists")]
    Duplicate,
}

/// In-memory question bank with a secondary index for duplicate detection.
pub struct QuestionStore {
    questions: DashMap<u32, Question>,
    dedup: DashMap<QuestionKey, u32>,
    next_id: AtomicU32,
}

impl QuestionStore {
    pub fn new() -> Self {
        Self {
            questions: DashMap::new(),
            dedup: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// Insert a question together with its answers, or nothing at all.
    pub fn insert(&self, new: NewQuestion, now: i64) -> Result<Question, QuestionStoreError> {
        let key = new.dedup_key();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        match self.dedup.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(QuestionStoreError::Duplicate)
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(id);
            }
        }

        let question = Question {
            id,
            year: new.year,
            study_year: new.study_year,
            module: new.module,
            unite: new.unite,
            speciality: new.speciality,
            cours: new.cours,
            exam_type: new.exam_type,
            number: new.number,
            question_text: new.question_text,
            image: new.image,
            answers: new.answers,
            created_at: now,
            updated_at: None,
        };

        self.questions.insert(id, question.clone());
        Ok(question)
    }

    pub fn get(&self, id: u32) -> Option<Question> {
        self.questions.get(&id).map(|entry| entry.value().clone())
    }

    /// Apply a patch. When the identity fields move, the dedup index moves
    /// with them; a collision with another stored question rejects the
    /// whole update.
    pub fn update(
        &self,
        id: u32,
        update: QuestionUpdate,
        now: i64,
    ) -> Result<Option<Question>, QuestionStoreError> {
        let Some(current) = self.get(id) else {
            return Ok(None);
        };

        let old_key = current.dedup_key();
        let new_key = QuestionKey {
            year: update.year.unwrap_or(current.year),
            study_year: update.study_year.unwrap_or(current.study_year),
            module: update.module.clone().unwrap_or_else(|| current.module.clone()),
            number: update.number.unwrap_or(current.number),
            exam_type: update.exam_type.unwrap_or(current.exam_type),
        };

        if new_key != old_key {
            match self.dedup.entry(new_key) {
                dashmap::mapref::entry::Entry::Occupied(_) => {
                    return Err(QuestionStoreError::Duplicate)
                }
                dashmap::mapref::entry::Entry::Vacant(entry) => {
                    entry.insert(id);
                }
            }
            self.dedup.remove(&old_key);
        }

        let updated = self.questions.get_mut(&id).map(|mut entry| {
            let question = entry.value_mut();
            if let Some(year) = update.year {
                question.year = year;
            }
            if let Some(study_year) = update.study_year {
                question.study_year = study_year;
            }
            if let Some(module) = update.module {
                question.module = module;
            }
            if let Some(unite) = update.unite {
                question.unite = Some(unite);
            }
            if let Some(speciality) = update.speciality {
                question.speciality = speciality;
            }
            if let Some(cours) = update.cours {
                question.cours = cours;
            }
            if let Some(exam_type) = update.exam_type {
                question.exam_type = exam_type;
            }
            if let Some(number) = update.number {
                question.number = number;
            }
            if let Some(question_text) = update.question_text {
                question.question_text = question_text;
            }
            if let Some(image) = update.image {
                question.image = Some(image);
            }
            if let Some(answers) = update.answers {
                question.answers = answers;
            }
            question.updated_at = Some(now);
            question.clone()
        });

        Ok(updated)
    }

    pub fn delete(&self, id: u32) -> bool {
        match self.questions.remove(&id) {
            Some((_, question)) => {
                self.dedup.remove(&question.dedup_key());
                true
            }
            None => false,
        }
    }

    pub fn list(&self, filter: &QuestionFilter) -> Vec<Question> {
        let mut questions: Vec<Question> = self
            .questions
            .iter()
            .filter(|entry| matches_filter(entry.value(), filter))
            .map(|entry| entry.value().clone())
            .collect();

        questions.sort_by_key(|question| question.id);
        questions
            .into_iter()
            .skip(filter.skip)
            .take(filter.limit)
            .collect()
    }

    pub fn distinct_years(&self) -> Vec<u16> {
        let mut years: Vec<u16> = self
            .questions
            .iter()
            .map(|entry| entry.value().year)
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn count_answers(&self) -> usize {
        self.questions
            .iter()
            .map(|entry| entry.value().answers.len())
            .sum()
    }

    /// Question counts grouped by module, sorted by module name.
    pub fn module_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for entry in self.questions.iter() {
            *counts.entry(entry.value().module.clone()).or_default() += 1;
        }
        counts.into_iter().collect()
    }

    /// Question counts grouped by exam year, ascending.
    pub fn year_counts(&self) -> Vec<(u16, usize)> {
        let mut counts: BTreeMap<u16, usize> = BTreeMap::new();
        for entry in self.questions.iter() {
            *counts.entry(entry.value().year).or_default() += 1;
        }
        counts.into_iter().collect()
    }
}

impl Default for QuestionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_filter(question: &Question, filter: &QuestionFilter) -> bool {
    if filter.year.is_some_and(|year| question.year != year) {
        return false;
    }
    if filter
        .study_year
        .is_some_and(|study_year| question.study_year != study_year)
    {
        return false;
    }
    if filter
        .module
        .as_deref()
        .is_some_and(|module| question.module != module)
    {
        return false;
    }
    if filter
        .unite
        .as_deref()
        .is_some_and(|unite| question.unite.as_deref() != Some(unite))
    {
        return false;
    }
    if filter
        .speciality
        .as_deref()
        .is_some_and(|speciality| question.speciality != speciality)
    {
        return false;
    }
    if let Some(cours) = filter.cours.as_deref() {
        let needle = cours.to_lowercase();
        if !question
            .cours
            .iter()
            .any(|label| label.to_lowercase().contains(&needle))
        {
            return false;
        }
    }
    if filter
        .exam_type
        .is_some_and(|exam_type| question.exam_type != exam_type)
    {
        return false;
    }
    true
}
