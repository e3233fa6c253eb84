//! Question Handlers

pub(crate) mod attempts;
pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod index;
pub(crate) mod update;

#[cfg(test)]
pub(crate) mod tests {
    use umutoza_app::domain::questions::records::{Difficulty, QuestionRecord, QuestionUuid};

    use crate::test_helpers::TEST_TIME;

    pub(crate) fn make_question(uuid: QuestionUuid, question_text: &str) -> QuestionRecord {
        QuestionRecord {
            uuid,
            question_text: question_text.to_owned(),
            question_image: None,
            options: vec!["Yego".to_owned(), "Oya".to_owned()],
            correct_answer_index: 0,
            difficulty: Difficulty::Easy,
            explanation: None,
            created_at: TEST_TIME,
            updated_at: TEST_TIME,
        }
    }
}
