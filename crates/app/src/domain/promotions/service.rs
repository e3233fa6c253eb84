//! Promotions Service

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{Timestamp, tz::TimeZone};
use mockall::automock;
use tracing::{Span, debug, warn};

use crate::{
    database::Db,
    domain::promotions::{
        PromotionsServiceError,
        data::{PromotionDraft, PromotionPatch},
        records::{PromotionRecord, PromotionUuid},
        repository::{PgPromotionsRepository, PromotionsRepository},
        rotation::{ExposureLog, Rotation, Selection, rotate},
        schedule::ScheduleInstant,
    },
    media::{MediaKind, MediaStorage, MediaUpload, discard},
};

/// Outcome of a server-side rotation step.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionSelection {
    pub rotation: Rotation,

    /// The viewer's exposure history including anything surfaced by this step.
    pub exposures: ExposureLog,

    /// Catalog entries for the campaigns on screen after this step.
    pub promotions: Vec<PromotionRecord>,
}

#[derive(Clone)]
pub struct PgPromotionsService {
    repository: Arc<dyn PromotionsRepository>,
    media: Arc<dyn MediaStorage>,
    time_zone: TimeZone,
}

impl std::fmt::Debug for PgPromotionsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgPromotionsService")
            .field("time_zone", &self.time_zone)
            .finish_non_exhaustive()
    }
}

impl PgPromotionsService {
    #[must_use]
    pub fn new(db: Db, media: Arc<dyn MediaStorage>, time_zone: TimeZone) -> Self {
        Self::with_repository(
            Arc::new(PgPromotionsRepository::new(db)),
            media,
            time_zone,
        )
    }

    pub(crate) fn with_repository(
        repository: Arc<dyn PromotionsRepository>,
        media: Arc<dyn MediaStorage>,
        time_zone: TimeZone,
    ) -> Self {
        Self {
            repository,
            media,
            time_zone,
        }
    }

    /// Store `upload` and point the patch at it. Returns the new public path.
    async fn attach_media(
        &self,
        patch: &mut PromotionPatch,
        upload: Option<MediaUpload>,
    ) -> Result<Option<String>, PromotionsServiceError> {
        let Some(upload) = upload else {
            return Ok(None);
        };

        let stored = self.media.store(MediaKind::Promotion, upload).await?;

        patch.media_url = Some(Some(stored.clone()));

        Ok(Some(stored))
    }
}

#[async_trait]
impl PromotionsService for PgPromotionsService {
    #[tracing::instrument(name = "promotions.service.list_promotions", skip(self), err)]
    async fn list_promotions(&self) -> Result<Vec<PromotionRecord>, PromotionsServiceError> {
        Ok(self.repository.list_promotions().await?)
    }

    #[tracing::instrument(
        name = "promotions.service.list_public_promotions",
        skip(self),
        fields(at = %at),
        err
    )]
    async fn list_public_promotions(
        &self,
        at: Timestamp,
    ) -> Result<Vec<PromotionRecord>, PromotionsServiceError> {
        let instant = ScheduleInstant::new(at, &self.time_zone);

        Ok(self.repository.list_running_promotions(instant.date).await?)
    }

    #[tracing::instrument(
        name = "promotions.service.get_promotion",
        skip(self),
        fields(promotion_uuid = %uuid),
        err
    )]
    async fn get_promotion(
        &self,
        uuid: PromotionUuid,
    ) -> Result<PromotionRecord, PromotionsServiceError> {
        Ok(self.repository.get_promotion(uuid).await?)
    }

    #[tracing::instrument(
        name = "promotions.service.create_promotion",
        skip(self, patch, media),
        fields(promotion_uuid = tracing::field::Empty, has_media = media.is_some()),
        err
    )]
    async fn create_promotion(
        &self,
        mut patch: PromotionPatch,
        media: Option<MediaUpload>,
    ) -> Result<PromotionRecord, PromotionsServiceError> {
        patch.validate()?;

        let uuid = PromotionUuid::new();

        Span::current().record("promotion_uuid", tracing::field::display(uuid));

        let stored = self.attach_media(&mut patch, media).await?;

        let draft = patch.apply(PromotionDraft::default());

        match self.repository.create_promotion(uuid, draft).await {
            Ok(created) => Ok(created),
            Err(error) => {
                discard(self.media.as_ref(), stored.as_deref()).await;

                Err(error.into())
            }
        }
    }

    #[tracing::instrument(
        name = "promotions.service.update_promotion",
        skip(self, patch, media),
        fields(promotion_uuid = %uuid, has_media = media.is_some()),
        err
    )]
    async fn update_promotion(
        &self,
        uuid: PromotionUuid,
        mut patch: PromotionPatch,
        media: Option<MediaUpload>,
    ) -> Result<PromotionRecord, PromotionsServiceError> {
        patch.validate()?;

        let stored = self.attach_media(&mut patch, media).await?;

        let revision = match self.repository.update_promotion(uuid, patch).await {
            Ok(revision) => revision,
            Err(error) => {
                discard(self.media.as_ref(), stored.as_deref()).await;

                return Err(error.into());
            }
        };

        if revision.previous.creative.media_url != revision.current.creative.media_url {
            discard(
                self.media.as_ref(),
                revision.previous.creative.media_url.as_deref(),
            )
            .await;
        }

        Ok(revision.current)
    }

    #[tracing::instrument(
        name = "promotions.service.toggle_promotion",
        skip(self),
        fields(promotion_uuid = %uuid, is_active = tracing::field::Empty),
        err
    )]
    async fn toggle_promotion(
        &self,
        uuid: PromotionUuid,
    ) -> Result<PromotionRecord, PromotionsServiceError> {
        let toggled = self.repository.toggle_promotion(uuid).await?;

        Span::current().record("is_active", toggled.is_active);

        Ok(toggled)
    }

    #[tracing::instrument(
        name = "promotions.service.record_impression",
        skip(self),
        fields(promotion_uuid = %uuid),
        err
    )]
    async fn record_impression(&self, uuid: PromotionUuid) -> Result<(), PromotionsServiceError> {
        Ok(self.repository.increment_impressions(uuid).await?)
    }

    #[tracing::instrument(
        name = "promotions.service.record_click",
        skip(self),
        fields(promotion_uuid = %uuid),
        err
    )]
    async fn record_click(&self, uuid: PromotionUuid) -> Result<(), PromotionsServiceError> {
        Ok(self.repository.increment_clicks(uuid).await?)
    }

    #[tracing::instrument(
        name = "promotions.service.delete_promotion",
        skip(self),
        fields(promotion_uuid = %uuid),
        err
    )]
    async fn delete_promotion(&self, uuid: PromotionUuid) -> Result<(), PromotionsServiceError> {
        let deleted = self.repository.delete_promotion(uuid).await?;

        discard(self.media.as_ref(), deleted.creative.media_url.as_deref()).await;

        Ok(())
    }

    #[tracing::instrument(
        name = "promotions.service.select_promotions",
        skip(self, previous, exposures),
        fields(at = %at, surfaced = tracing::field::Empty),
        err
    )]
    async fn select_promotions(
        &self,
        previous: Selection,
        mut exposures: ExposureLog,
        at: Timestamp,
    ) -> Result<PromotionSelection, PromotionsServiceError> {
        let instant = ScheduleInstant::new(at, &self.time_zone);

        let catalog = self.repository.list_running_promotions(instant.date).await?;

        let rotation = rotate(&previous, &catalog, &instant, &mut exposures);

        Span::current().record("surfaced", rotation.surfaced.len());

        for promotion in &rotation.surfaced {
            match self.repository.increment_impressions(*promotion).await {
                Ok(()) => debug!(promotion_uuid = %promotion, "recorded impression"),
                Err(error) => warn!(promotion_uuid = %promotion, "failed to record impression: {error}"),
            }
        }

        let on_screen = [rotation.selection.popup, rotation.selection.bottom];

        let promotions = catalog
            .into_iter()
            .filter(|promotion| {
                on_screen
                    .iter()
                    .flatten()
                    .any(|slot| slot.promotion == promotion.uuid)
            })
            .collect();

        Ok(PromotionSelection {
            rotation,
            exposures,
            promotions,
        })
    }
}

#[automock]
#[async_trait]
pub trait PromotionsService: Send + Sync {
    /// Every campaign, newest first.
    async fn list_promotions(&self) -> Result<Vec<PromotionRecord>, PromotionsServiceError>;

    /// Active campaigns whose date window contains `at`, highest priority first.
    async fn list_public_promotions(
        &self,
        at: Timestamp,
    ) -> Result<Vec<PromotionRecord>, PromotionsServiceError>;

    async fn get_promotion(
        &self,
        uuid: PromotionUuid,
    ) -> Result<PromotionRecord, PromotionsServiceError>;

    /// Create a campaign from submitted values layered over the defaults.
    async fn create_promotion(
        &self,
        patch: PromotionPatch,
        media: Option<MediaUpload>,
    ) -> Result<PromotionRecord, PromotionsServiceError>;

    /// Overwrite the submitted fields of a campaign. Replaced media is removed.
    async fn update_promotion(
        &self,
        uuid: PromotionUuid,
        patch: PromotionPatch,
        media: Option<MediaUpload>,
    ) -> Result<PromotionRecord, PromotionsServiceError>;

    async fn toggle_promotion(
        &self,
        uuid: PromotionUuid,
    ) -> Result<PromotionRecord, PromotionsServiceError>;

    async fn record_impression(&self, uuid: PromotionUuid) -> Result<(), PromotionsServiceError>;

    async fn record_click(&self, uuid: PromotionUuid) -> Result<(), PromotionsServiceError>;

    /// Delete a campaign and, best-effort, its media file.
    async fn delete_promotion(&self, uuid: PromotionUuid) -> Result<(), PromotionsServiceError>;

    /// Run one rotation step for a viewer and count impressions for whatever
    /// it newly surfaces.
    async fn select_promotions(
        &self,
        previous: Selection,
        exposures: ExposureLog,
        at: Timestamp,
    ) -> Result<PromotionSelection, PromotionsServiceError>;
}
