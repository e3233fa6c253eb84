//! Question Data

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

use crate::domain::questions::{errors::QuestionValidationError, records::Difficulty};

const MIN_OPTIONS: usize = 2;

/// Question values as submitted by an admin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer_index: i64,

    /// `None` means Easy on create and "unchanged" on update.
    pub difficulty: Option<Difficulty>,

    pub explanation: Option<String>,
}

/// Trimmed, validated question values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionContent {
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer_index: u32,
    pub difficulty: Option<Difficulty>,
    pub explanation: Option<String>,
}

impl QuestionDraft {
    /// Trim every text field and check the result.
    ///
    /// # Errors
    ///
    /// Returns the first problem found with the submitted values.
    pub fn normalise(self) -> Result<QuestionContent, QuestionValidationError> {
        let question_text = self.question_text.trim().to_owned();

        if question_text.is_empty() {
            return Err(QuestionValidationError::BlankText);
        }

        let options: Vec<String> = self
            .options
            .iter()
            .map(|option| option.trim().to_owned())
            .collect();

        if options.len() < MIN_OPTIONS {
            return Err(QuestionValidationError::TooFewOptions(options.len()));
        }

        if let Some(blank) = options.iter().position(String::is_empty) {
            return Err(QuestionValidationError::BlankOption(blank));
        }

        let correct_answer_index = usize::try_from(self.correct_answer_index)
            .ok()
            .filter(|index| *index < options.len())
            .and_then(|index| u32::try_from(index).ok())
            .ok_or(QuestionValidationError::AnswerOutOfRange(
                self.correct_answer_index,
            ))?;

        let explanation = self
            .explanation
            .map(|explanation| explanation.trim().to_owned())
            .filter(|explanation| !explanation.is_empty());

        Ok(QuestionContent {
            question_text,
            options,
            correct_answer_index,
            difficulty: self.difficulty,
            explanation,
        })
    }
}

impl QuestionContent {
    /// Fingerprint of the parts that make two questions identical.
    #[must_use]
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();

        hasher.update(self.question_text.as_bytes());

        for option in &self.options {
            hasher.update([0x1f]);
            hasher.update(option.as_bytes());
        }

        hasher.update([0x1e]);
        hasher.update(self.correct_answer_index.to_be_bytes());

        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}
