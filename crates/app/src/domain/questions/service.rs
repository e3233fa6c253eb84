//! Questions Service

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashSet;
use sqlx::PgPool;
use tracing::{Span, info};

use crate::{
    domain::questions::{
        QuestionsServiceError,
        data::{QuestionContent, QuestionDraft},
        errors::QuestionsRepositoryError,
        records::{QuestionRecord, QuestionUuid},
        repository::{PgQuestionsRepository, QuestionsRepository},
        sampler::{MAX_ATTEMPT_SIZE, QuizQuestion, select},
    },
    media::{MediaKind, MediaStorage, MediaUpload, discard},
};

#[derive(Clone)]
pub struct PgQuestionsService {
    repository: Arc<dyn QuestionsRepository>,
    media: Arc<dyn MediaStorage>,
}

impl std::fmt::Debug for PgQuestionsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgQuestionsService").finish_non_exhaustive()
    }
}

impl PgQuestionsService {
    #[must_use]
    pub fn new(pool: PgPool, media: Arc<dyn MediaStorage>) -> Self {
        Self::with_repository(Arc::new(PgQuestionsRepository::new(pool)), media)
    }

    pub(crate) fn with_repository(
        repository: Arc<dyn QuestionsRepository>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self { repository, media }
    }

    /// Fail when a question other than `own` already has this content.
    async fn ensure_unique(
        &self,
        content: &QuestionContent,
        own: Option<QuestionUuid>,
    ) -> Result<(), QuestionsServiceError> {
        match self
            .repository
            .find_question_by_digest(&content.digest())
            .await?
        {
            Some(existing) if Some(existing) != own => Err(QuestionsServiceError::Duplicate {
                existing: Some(existing),
            }),
            _ => Ok(()),
        }
    }

    async fn store_image(
        &self,
        upload: Option<MediaUpload>,
    ) -> Result<Option<String>, QuestionsServiceError> {
        match upload {
            Some(upload) => Ok(Some(self.media.store(MediaKind::Image, upload).await?)),
            None => Ok(None),
        }
    }

    /// Map a failed write, naming the conflicting question when the unique
    /// index rejected it.
    async fn write_failed(
        &self,
        error: QuestionsRepositoryError,
        content_digest: &str,
        stored: Option<&str>,
    ) -> QuestionsServiceError {
        discard(self.media.as_ref(), stored).await;

        match error {
            QuestionsRepositoryError::Duplicate => QuestionsServiceError::Duplicate {
                existing: self
                    .repository
                    .find_question_by_digest(content_digest)
                    .await
                    .ok()
                    .flatten(),
            },
            other => other.into(),
        }
    }
}

#[async_trait]
impl QuestionsService for PgQuestionsService {
    #[tracing::instrument(name = "questions.service.list_questions", skip(self), err)]
    async fn list_questions(&self) -> Result<Vec<QuestionRecord>, QuestionsServiceError> {
        Ok(self.repository.list_questions().await?)
    }

    #[tracing::instrument(
        name = "questions.service.create_question",
        skip(self, draft, image),
        fields(question_uuid = tracing::field::Empty, has_image = image.is_some()),
        err
    )]
    async fn create_question(
        &self,
        draft: QuestionDraft,
        image: Option<MediaUpload>,
    ) -> Result<QuestionRecord, QuestionsServiceError> {
        let content = draft.normalise()?;

        self.ensure_unique(&content, None).await?;

        let uuid = QuestionUuid::new();

        Span::current().record("question_uuid", tracing::field::display(uuid));

        let stored = self.store_image(image).await?;
        let digest = content.digest();

        match self
            .repository
            .create_question(uuid, content, stored.clone())
            .await
        {
            Ok(created) => {
                info!("question created");

                Ok(created)
            }
            Err(error) => Err(self.write_failed(error, &digest, stored.as_deref()).await),
        }
    }

    #[tracing::instrument(
        name = "questions.service.update_question",
        skip(self, draft, image),
        fields(question_uuid = %uuid, has_image = image.is_some()),
        err
    )]
    async fn update_question(
        &self,
        uuid: QuestionUuid,
        draft: QuestionDraft,
        image: Option<MediaUpload>,
    ) -> Result<QuestionRecord, QuestionsServiceError> {
        let content = draft.normalise()?;

        self.ensure_unique(&content, Some(uuid)).await?;

        let stored = self.store_image(image).await?;
        let digest = content.digest();

        let revision = match self
            .repository
            .update_question(uuid, content, stored.clone())
            .await
        {
            Ok(revision) => revision,
            Err(error) => return Err(self.write_failed(error, &digest, stored.as_deref()).await),
        };

        if revision.previous.question_image != revision.current.question_image {
            discard(
                self.media.as_ref(),
                revision.previous.question_image.as_deref(),
            )
            .await;
        }

        Ok(revision.current)
    }

    #[tracing::instrument(
        name = "questions.service.delete_question",
        skip(self),
        fields(question_uuid = %uuid),
        err
    )]
    async fn delete_question(&self, uuid: QuestionUuid) -> Result<(), QuestionsServiceError> {
        let deleted = self.repository.delete_question(uuid).await?;

        discard(self.media.as_ref(), deleted.question_image.as_deref()).await;

        Ok(())
    }

    #[tracing::instrument(
        name = "questions.service.sample_attempt",
        skip(self, seen),
        fields(seen = seen.len()),
        err
    )]
    async fn sample_attempt(
        &self,
        seen: Vec<QuestionUuid>,
        count: usize,
    ) -> Result<Vec<QuizQuestion>, QuestionsServiceError> {
        let catalog = self.repository.list_questions().await?;
        let seen: FxHashSet<QuestionUuid> = seen.into_iter().collect();

        Ok(select(
            &catalog,
            &seen,
            count.min(MAX_ATTEMPT_SIZE),
            &mut rand::thread_rng(),
        ))
    }
}

#[automock]
#[async_trait]
pub trait QuestionsService: Send + Sync {
    /// The whole question bank, newest first.
    async fn list_questions(&self) -> Result<Vec<QuestionRecord>, QuestionsServiceError>;

    /// Add a question. Exact duplicates of an existing question are refused.
    async fn create_question(
        &self,
        draft: QuestionDraft,
        image: Option<MediaUpload>,
    ) -> Result<QuestionRecord, QuestionsServiceError>;

    /// Replace a question's content; a new image replaces (and removes) the
    /// old one.
    async fn update_question(
        &self,
        uuid: QuestionUuid,
        draft: QuestionDraft,
        image: Option<MediaUpload>,
    ) -> Result<QuestionRecord, QuestionsServiceError>;

    async fn delete_question(&self, uuid: QuestionUuid) -> Result<(), QuestionsServiceError>;

    /// Draw a shuffled set of questions for one quiz attempt.
    async fn sample_attempt(
        &self,
        seen: Vec<QuestionUuid>,
        count: usize,
    ) -> Result<Vec<QuizQuestion>, QuestionsServiceError>;
}
