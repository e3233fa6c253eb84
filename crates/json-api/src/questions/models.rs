//! Question request and response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use umutoza_app::domain::questions::{
    data::QuestionDraft,
    records::QuestionRecord,
    sampler::{DEFAULT_ATTEMPT_SIZE, QuizQuestion},
};

use crate::{errors::ApiError, forms::FormInput};

/// Question Response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionResponse {
    pub id: Uuid,
    pub question_text: String,
    pub question_image: Option<String>,
    pub options: Vec<String>,
    pub correct_answer_index: u32,

    /// `Easy`, `Medium` or `Hard`
    pub difficulty: String,

    pub explanation: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<QuestionRecord> for QuestionResponse {
    fn from(record: QuestionRecord) -> Self {
        Self {
            id: record.uuid.into_uuid(),
            question_text: record.question_text,
            question_image: record.question_image,
            options: record.options,
            correct_answer_index: record.correct_answer_index,
            difficulty: record.difficulty.to_string(),
            explanation: record.explanation,
            created_at: record.created_at.to_string(),
            updated_at: record.updated_at.to_string(),
        }
    }
}

/// Question Updated Response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct QuestionUpdatedResponse {
    pub message: String,
    pub question: QuestionResponse,
}

/// Read a question from `questionText`, repeated `options`,
/// `correctAnswerIndex`, `difficulty` and `explanation` form fields.
/// Options are kept exactly as sent; trimming and blank checks happen when
/// the draft is validated.
pub(crate) fn question_draft(form: &FormInput) -> Result<QuestionDraft, ApiError> {
    let correct_answer_index = form
        .parse::<i64>("correctAnswerIndex")?
        .ok_or_else(|| ApiError::validation("correctAnswerIndex is required"))?;

    Ok(QuestionDraft {
        question_text: form.raw("questionText").unwrap_or_default().to_owned(),
        options: form.values("options").into_iter().map(str::to_owned).collect(),
        correct_answer_index,
        difficulty: form.parse("difficulty")?,
        explanation: form.text("explanation").map(str::to_owned),
    })
}

/// Attempt Request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct AttemptRequest {
    /// Questions the player has already been shown; drawn last
    pub seen_ids: Vec<Uuid>,

    /// Questions wanted, capped at 100
    pub count: Option<usize>,
}

impl AttemptRequest {
    pub(crate) fn count(&self) -> usize {
        self.count.unwrap_or(DEFAULT_ATTEMPT_SIZE)
    }
}

/// Quiz Question Response
///
/// A question as served to a player, with its explanation always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuizQuestionResponse {
    pub id: Uuid,
    pub question_text: String,
    pub question_image: Option<String>,
    pub options: Vec<String>,
    pub correct_answer_index: u32,
    pub difficulty: String,
    pub explanation: String,
}

impl From<QuizQuestion> for QuizQuestionResponse {
    fn from(question: QuizQuestion) -> Self {
        Self {
            id: question.uuid.into_uuid(),
            question_text: question.question_text,
            question_image: question.question_image,
            options: question.options,
            correct_answer_index: question.correct_answer_index,
            difficulty: question.difficulty.to_string(),
            explanation: question.explanation,
        }
    }
}

/// Attempt Response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct AttemptResponse {
    pub questions: Vec<QuizQuestionResponse>,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use umutoza_app::domain::questions::records::Difficulty;

    use super::*;

    #[test]
    fn draft_keeps_options_in_submitted_order() -> TestResult {
        let form = FormInput::from_pairs([
            ("questionText", "Ni iki?"),
            ("options", "Yego, ariko"),
            ("options", "Oya"),
            ("correctAnswerIndex", "1"),
            ("difficulty", "hard"),
        ]);

        let draft = question_draft(&form)?;

        assert_eq!(draft.options, vec!["Yego, ariko", "Oya"], "options");
        assert_eq!(draft.correct_answer_index, 1, "answer");
        assert_eq!(draft.difficulty, Some(Difficulty::Hard), "difficulty");
        assert_eq!(draft.explanation, None, "explanation");

        Ok(())
    }

    #[test]
    fn missing_answer_index_is_rejected() {
        let form = FormInput::from_pairs([("questionText", "Ni iki?"), ("options", "A")]);

        assert!(question_draft(&form).is_err(), "answer index required");
    }

    #[test]
    fn blank_difficulty_is_left_unset() -> TestResult {
        let form = FormInput::from_pairs([("correctAnswerIndex", "0"), ("difficulty", " ")]);

        assert_eq!(question_draft(&form)?.difficulty, None, "difficulty");

        Ok(())
    }

    #[test]
    fn attempts_default_to_twenty_questions() {
        assert_eq!(AttemptRequest::default().count(), 20, "default size");
    }
}
