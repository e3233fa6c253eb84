//! Quiz attempt sampling.

use rand::{Rng, seq::SliceRandom};
use rustc_hash::FxHashSet;

use crate::domain::questions::records::{Difficulty, QuestionRecord, QuestionUuid};

/// Questions in an attempt when the caller does not say.
pub const DEFAULT_ATTEMPT_SIZE: usize = 20;

/// Upper bound on questions in one attempt.
pub const MAX_ATTEMPT_SIZE: usize = 100;

/// A question as delivered to a quiz taker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub uuid: QuestionUuid,
    pub question_text: String,
    pub question_image: Option<String>,
    pub options: Vec<String>,
    pub correct_answer_index: u32,
    pub difficulty: Difficulty,
    pub explanation: String,
}

impl From<&QuestionRecord> for QuizQuestion {
    fn from(question: &QuestionRecord) -> Self {
        let explanation = question.explanation.clone().unwrap_or_else(|| {
            format!(
                "Based on the {} level question.",
                question.difficulty.as_str().to_lowercase()
            )
        });

        Self {
            uuid: question.uuid,
            question_text: question.question_text.clone(),
            question_image: question.question_image.clone(),
            options: question.options.clone(),
            correct_answer_index: question.correct_answer_index,
            difficulty: question.difficulty,
            explanation,
        }
    }
}

/// Pick up to `count` questions in random order, preferring ones the taker
/// has not seen. When too few unseen questions remain the whole catalog is
/// used, so an attempt is only short when the catalog itself is.
pub fn select<R: Rng + ?Sized>(
    catalog: &[QuestionRecord],
    seen: &FxHashSet<QuestionUuid>,
    count: usize,
    rng: &mut R,
) -> Vec<QuizQuestion> {
    let unseen: Vec<&QuestionRecord> = catalog
        .iter()
        .filter(|question| !seen.contains(&question.uuid))
        .collect();

    let mut pool = if unseen.len() >= count {
        unseen
    } else {
        catalog.iter().collect()
    };

    let (picked, _) = pool.partial_shuffle(rng, count);

    picked.iter().map(|question| QuizQuestion::from(*question)).collect()
}
