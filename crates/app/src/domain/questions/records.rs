//! Question Records

use jiff::Timestamp;

use crate::{labels::labelled_enum, uuids::TypedUuid};

/// Question UUID
pub type QuestionUuid = TypedUuid<QuestionRecord>;

labelled_enum! {
    /// How hard a question is.
    #[derive(Default)]
    pub enum Difficulty ("difficulty") {
        #[default]
        Easy => "Easy",
        Medium => "Medium",
        Hard => "Hard",
    }
}

/// Question Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    pub uuid: QuestionUuid,
    pub question_text: String,
    pub question_image: Option<String>,
    pub options: Vec<String>,
    pub correct_answer_index: u32,
    pub difficulty: Difficulty,
    pub explanation: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
