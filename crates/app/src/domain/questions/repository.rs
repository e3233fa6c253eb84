//! Questions Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    domain::questions::{
        data::QuestionContent,
        errors::QuestionsRepositoryError,
        records::{QuestionRecord, QuestionUuid},
    },
    labels::decode_label,
};

const LIST_QUESTIONS_SQL: &str = include_str!("sql/list_questions.sql");
const FIND_QUESTION_BY_DIGEST_SQL: &str = include_str!("sql/find_question_by_digest.sql");
const LOCK_QUESTION_SQL: &str = include_str!("sql/lock_question.sql");
const CREATE_QUESTION_SQL: &str = include_str!("sql/create_question.sql");
const UPDATE_QUESTION_SQL: &str = include_str!("sql/update_question.sql");
const DELETE_QUESTION_SQL: &str = include_str!("sql/delete_question.sql");

/// A question before and after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QuestionRevision {
    pub previous: QuestionRecord,
    pub current: QuestionRecord,
}

#[derive(Debug, Clone)]
pub(crate) struct PgQuestionsRepository {
    pool: PgPool,
}

impl PgQuestionsRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl<'r> FromRow<'r, PgRow> for QuestionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let correct_answer_index = row.try_get::<i32, _>("correct_answer_index")?;

        Ok(Self {
            uuid: QuestionUuid::from_uuid(row.try_get("uuid")?),
            question_text: row.try_get("question_text")?,
            question_image: row.try_get("question_image")?,
            options: row.try_get("options")?,
            correct_answer_index: u32::try_from(correct_answer_index).map_err(|e| {
                sqlx::Error::ColumnDecode {
                    index: "correct_answer_index".to_string(),
                    source: Box::new(e),
                }
            })?,
            difficulty: decode_label(row, "difficulty")?,
            explanation: row.try_get("explanation")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

fn answer_index(index: u32) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

#[async_trait]
impl QuestionsRepository for PgQuestionsRepository {
    async fn list_questions(&self) -> Result<Vec<QuestionRecord>, QuestionsRepositoryError> {
        Ok(query_as::<Postgres, QuestionRecord>(LIST_QUESTIONS_SQL)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_question_by_digest(
        &self,
        digest: &str,
    ) -> Result<Option<QuestionUuid>, QuestionsRepositoryError> {
        let uuid: Option<Uuid> = query_scalar(FIND_QUESTION_BY_DIGEST_SQL)
            .bind(digest)
            .fetch_optional(&self.pool)
            .await?;

        Ok(uuid.map(QuestionUuid::from_uuid))
    }

    async fn create_question(
        &self,
        uuid: QuestionUuid,
        content: QuestionContent,
        image: Option<String>,
    ) -> Result<QuestionRecord, QuestionsRepositoryError> {
        let digest = content.digest();

        Ok(query_as::<Postgres, QuestionRecord>(CREATE_QUESTION_SQL)
            .bind(uuid.into_uuid())
            .bind(content.question_text)
            .bind(image)
            .bind(content.options)
            .bind(answer_index(content.correct_answer_index))
            .bind(content.difficulty.unwrap_or_default().as_str())
            .bind(content.explanation)
            .bind(digest)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_question(
        &self,
        uuid: QuestionUuid,
        content: QuestionContent,
        image: Option<String>,
    ) -> Result<QuestionRevision, QuestionsRepositoryError> {
        let digest = content.digest();

        let mut tx = self.pool.begin().await?;

        let previous = query_as::<Postgres, QuestionRecord>(LOCK_QUESTION_SQL)
            .bind(uuid.into_uuid())
            .fetch_one(&mut *tx)
            .await?;

        let current = query_as::<Postgres, QuestionRecord>(UPDATE_QUESTION_SQL)
            .bind(uuid.into_uuid())
            .bind(content.question_text)
            .bind(image.or_else(|| previous.question_image.clone()))
            .bind(content.options)
            .bind(answer_index(content.correct_answer_index))
            .bind(content.difficulty.unwrap_or(previous.difficulty).as_str())
            .bind(content.explanation)
            .bind(digest)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(QuestionRevision { previous, current })
    }

    async fn delete_question(
        &self,
        uuid: QuestionUuid,
    ) -> Result<QuestionRecord, QuestionsRepositoryError> {
        Ok(query_as::<Postgres, QuestionRecord>(DELETE_QUESTION_SQL)
            .bind(uuid.into_uuid())
            .fetch_one(&self.pool)
            .await?)
    }
}

#[automock]
#[async_trait]
pub(crate) trait QuestionsRepository: Send + Sync {
    /// Every question, newest first.
    async fn list_questions(&self) -> Result<Vec<QuestionRecord>, QuestionsRepositoryError>;

    async fn find_question_by_digest(
        &self,
        digest: &str,
    ) -> Result<Option<QuestionUuid>, QuestionsRepositoryError>;

    async fn create_question(
        &self,
        uuid: QuestionUuid,
        content: QuestionContent,
        image: Option<String>,
    ) -> Result<QuestionRecord, QuestionsRepositoryError>;

    /// Replace a question's content. A `None` image or difficulty keeps the
    /// stored one.
    async fn update_question(
        &self,
        uuid: QuestionUuid,
        content: QuestionContent,
        image: Option<String>,
    ) -> Result<QuestionRevision, QuestionsRepositoryError>;

    async fn delete_question(
        &self,
        uuid: QuestionUuid,
    ) -> Result<QuestionRecord, QuestionsRepositoryError>;
}
