use serde::{Deserialize, Serialize};

/// Exam session types of the French medical curriculum.
///
/// Which of these are valid for a given question depends on its study year
/// and module; see `curriculum::structure`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExamType {
    Emd,
    Emd1,
    Emd2,
    Rattrapage,
}

impl ExamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::Emd => "EMD",
            ExamType::Emd1 => "EMD1",
            ExamType::Emd2 => "EMD2",
            ExamType::Rattrapage => "RATTRAPAGE",
        }
    }
}

/// Answer option labels, a through e.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
    E,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer_text: String,
    #[serde(default)]
    pub image: Option<String>,
    pub option_label: OptionLabel,
    /// Absent in older import payloads; missing means wrong answer.
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Question {
    pub id: u32,
    /// Exam year, e.g. 2023.
    pub year: u16,
    /// Academic year (1-3).
    pub study_year: u8,
    pub module: String,
    /// Unite grouping the module belongs to. Study years 2-3 only.
    pub unite: Option<String>,
    pub speciality: String,
    /// Course labels. Historically a single string; the current schema
    /// carries one or many.
    pub cours: Vec<String>,
    pub exam_type: ExamType,
    /// Ordinal within the (year, study_year, module, exam_type) group.
    pub number: u32,
    pub question_text: String,
    pub image: Option<String>,
    pub answers: Vec<Answer>,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

/// Duplicate-detection key for the question bank.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QuestionKey {
    pub year: u16,
    pub study_year: u8,
    pub module: String,
    pub number: u32,
    pub exam_type: ExamType,
}

impl Question {
    pub fn dedup_key(&self) -> QuestionKey {
        QuestionKey {
            year: self.year,
            study_year: self.study_year,
            module: self.module.clone(),
            number: self.number,
            exam_type: self.exam_type,
        }
    }
}

/// Payload for creating a question, shared by the single-question endpoint
/// and the bulk importer.
#[derive(Clone, Debug, Deserialize)]
pub struct NewQuestion {
    pub year: u16,
    pub study_year: u8,
    pub module: String,
    #[serde(default)]
    pub unite: Option<String>,
    pub speciality: String,
    #[serde(deserialize_with = "deserialize_cours")]
    pub cours: Vec<String>,
    pub exam_type: ExamType,
    pub number: u32,
    pub question_text: String,
    #[serde(default)]
    pub image: Option<String>,
    pub answers: Vec<Answer>,
}

impl NewQuestion {
    pub fn dedup_key(&self) -> QuestionKey {
        QuestionKey {
            year: self.year,
            study_year: self.study_year,
            module: self.module.clone(),
            number: self.number,
            exam_type: self.exam_type,
        }
    }
}

/// Patchable fields of a question. Answers are replaced wholesale when
/// present, never merged.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QuestionUpdate {
    pub year: Option<u16>,
    pub study_year: Option<u8>,
    pub module: Option<String>,
    pub unite: Option<String>,
    pub speciality: Option<String>,
    #[serde(default, deserialize_with = "deserialize_cours_opt")]
    pub cours: Option<Vec<String>>,
    pub exam_type: Option<ExamType>,
    pub number: Option<u32>,
    pub question_text: Option<String>,
    pub image: Option<String>,
    pub answers: Option<Vec<Answer>>,
}

/// Accepts both the pre-migration single string and the current array form.
#[derive(Deserialize)]
#[serde(untagged)]
enum CoursField {
    One(String),
    Many(Vec<String>),
}

impl From<CoursField> for Vec<String> {
    fn from(field: CoursField) -> Self {
        match field {
            CoursField::One(course) => vec![course],
            CoursField::Many(courses) => courses,
        }
    }
}

fn deserialize_cours<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    CoursField::deserialize(deserializer).map(Vec::from)
}

fn deserialize_cours_opt<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<CoursField>::deserialize(deserializer).map(|field| field.map(Vec::from))
}
