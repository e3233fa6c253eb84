//! Promotions Repository

use async_trait::async_trait;
use jiff::civil::Date;
use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use mockall::automock;
use sqlx::{
    FromRow, Postgres, Row, Transaction,
    postgres::{PgArguments, PgRow},
    query, query_as,
    query::QueryAs,
};

use crate::{
    database::{self, Db},
    domain::promotions::{
        capacity::{Allocation, check_capacity},
        data::{PromotionDraft, PromotionPatch},
        errors::PromotionsRepositoryError,
        records::{Creative, Palette, PromotionRecord, PromotionUuid, Schedule},
        schedule::{Frequency, Placement, TargetHours},
    },
    labels::decode_label,
};

const LIST_PROMOTIONS_SQL: &str = include_str!("sql/list_promotions.sql");
const LIST_RUNNING_PROMOTIONS_SQL: &str = include_str!("sql/list_running_promotions.sql");
const GET_PROMOTION_SQL: &str = include_str!("sql/get_promotion.sql");
const LOCK_PROMOTION_SQL: &str = include_str!("sql/lock_promotion.sql");
const LIST_ALLOCATIONS_SQL: &str = include_str!("sql/list_allocations.sql");
const CREATE_PROMOTION_SQL: &str = include_str!("sql/create_promotion.sql");
const UPDATE_PROMOTION_SQL: &str = include_str!("sql/update_promotion.sql");
const INCREMENT_IMPRESSIONS_SQL: &str = include_str!("sql/increment_impressions.sql");
const INCREMENT_CLICKS_SQL: &str = include_str!("sql/increment_clicks.sql");
const DELETE_PROMOTION_SQL: &str = include_str!("sql/delete_promotion.sql");

/// A campaign before and after an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionRevision {
    pub previous: PromotionRecord,
    pub current: PromotionRecord,
}

/// PostgreSQL-backed promotions repository.
///
/// Every write that can change an hour's allocation holds the advisory lock of
/// the placement it lands in while checking capacity and writing.
#[derive(Debug, Clone)]
pub(crate) struct PgPromotionsRepository {
    db: Db,
}

impl PgPromotionsRepository {
    #[must_use]
    pub(crate) fn new(db: Db) -> Self {
        Self { db }
    }

    /// Inactive campaigns claim no minutes, so switching one off always
    /// succeeds even when its placement is already over-committed.
    async fn ensure_capacity(
        tx: &mut Transaction<'_, Postgres>,
        uuid: PromotionUuid,
        draft: &PromotionDraft,
    ) -> Result<(), PromotionsRepositoryError> {
        if !draft.is_active {
            return Ok(());
        }

        let placement = draft.schedule.placement;

        database::lock(tx, &capacity_lock_key(placement)).await?;

        let existing = query_as::<Postgres, Allocation>(LIST_ALLOCATIONS_SQL)
            .bind(placement.as_str())
            .bind(uuid.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        let conflicts = check_capacity(
            &Allocation {
                minutes_per_hour: draft.schedule.minutes_per_hour,
                target_hours: draft.schedule.target_hours.clone(),
            },
            &existing,
        );

        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(PromotionsRepositoryError::CapacityExceeded(conflicts))
        }
    }

    async fn write_revision(
        &self,
        uuid: PromotionUuid,
        change: impl FnOnce(&PromotionRecord) -> PromotionDraft + Send,
    ) -> Result<PromotionRevision, PromotionsRepositoryError> {
        let mut tx = self.db.begin().await?;

        let previous = query_as::<Postgres, PromotionRecord>(LOCK_PROMOTION_SQL)
            .bind(uuid.into_uuid())
            .fetch_one(&mut *tx)
            .await?;

        let draft = change(&previous);

        Self::ensure_capacity(&mut tx, uuid, &draft).await?;

        let current = bind_draft(query_as(UPDATE_PROMOTION_SQL).bind(uuid.into_uuid()), draft)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(PromotionRevision { previous, current })
    }

    async fn increment(
        &self,
        sql: &'static str,
        uuid: PromotionUuid,
    ) -> Result<(), PromotionsRepositoryError> {
        let rows_affected = query(sql)
            .bind(uuid.into_uuid())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(PromotionsRepositoryError::NotFound);
        }

        Ok(())
    }
}

fn capacity_lock_key(placement: Placement) -> String {
    format!("promotions.capacity.{placement}")
}

fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn bind_draft<'q>(
    query: QueryAs<'q, Postgres, PromotionRecord, PgArguments>,
    draft: PromotionDraft,
) -> QueryAs<'q, Postgres, PromotionRecord, PgArguments> {
    let PromotionDraft {
        creative,
        schedule,
        is_active,
    } = draft;

    let target_hours: Vec<i16> = schedule
        .target_hours
        .as_slice()
        .iter()
        .map(|hour| i16::from(*hour))
        .collect();

    query
        .bind(creative.name)
        .bind(schedule.placement.as_str())
        .bind(creative.media_type.as_str())
        .bind(creative.media_url)
        .bind(creative.link_url)
        .bind(creative.title)
        .bind(creative.description)
        .bind(saturating_i32(creative.display_duration))
        .bind(creative.palette.theme)
        .bind(creative.palette.text)
        .bind(creative.palette.background)
        .bind(creative.palette.button)
        .bind(creative.palette.button_text)
        .bind(creative.layout.as_str())
        .bind(creative.overlay_opacity)
        .bind(creative.position)
        .bind(creative.cta_text)
        .bind(creative.show_button)
        .bind(creative.can_close)
        .bind(creative.full_media)
        .bind(creative.trick_on_close)
        .bind(schedule.priority)
        .bind(saturating_i32(schedule.frequency.every))
        .bind(schedule.frequency.unit.as_str())
        .bind(schedule.start_date.map(SqlxDate::from))
        .bind(schedule.end_date.map(SqlxDate::from))
        .bind(i16::from(schedule.minutes_per_hour))
        .bind(target_hours)
        .bind(is_active)
}

fn column_error(column: &str, source: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

fn decode_count(row: &PgRow, column: &str) -> sqlx::Result<u64> {
    u64::try_from(row.try_get::<i64, _>(column)?).map_err(|error| column_error(column, error))
}

fn decode_u32(row: &PgRow, column: &str) -> sqlx::Result<u32> {
    u32::try_from(row.try_get::<i32, _>(column)?).map_err(|error| column_error(column, error))
}

fn decode_target_hours(row: &PgRow) -> sqlx::Result<TargetHours> {
    TargetHours::new(row.try_get::<Vec<i16>, _>("target_hours")?)
        .map_err(|error| column_error("target_hours", error))
}

fn decode_minutes(row: &PgRow) -> sqlx::Result<u8> {
    u8::try_from(row.try_get::<i16, _>("minutes_per_hour")?)
        .map_err(|error| column_error("minutes_per_hour", error))
}

impl<'r> FromRow<'r, PgRow> for Allocation {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            minutes_per_hour: decode_minutes(row)?,
            target_hours: decode_target_hours(row)?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for PromotionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PromotionUuid::from_uuid(row.try_get("uuid")?),
            creative: Creative {
                name: row.try_get("name")?,
                media_type: decode_label(row, "media_type")?,
                media_url: row.try_get("media_url")?,
                link_url: row.try_get("link_url")?,
                title: row.try_get("title")?,
                description: row.try_get("description")?,
                display_duration: decode_u32(row, "display_duration")?,
                layout: decode_label(row, "layout")?,
                palette: Palette {
                    theme: row.try_get("theme_color")?,
                    text: row.try_get("text_color")?,
                    background: row.try_get("background_color")?,
                    button: row.try_get("button_color")?,
                    button_text: row.try_get("button_text_color")?,
                },
                overlay_opacity: row.try_get("overlay_opacity")?,
                position: row.try_get("position")?,
                cta_text: row.try_get("cta_text")?,
                show_button: row.try_get("show_button")?,
                can_close: row.try_get("can_close")?,
                full_media: row.try_get("full_media")?,
                trick_on_close: row.try_get("trick_on_close")?,
            },
            schedule: Schedule {
                placement: decode_label(row, "placement")?,
                priority: row.try_get("priority")?,
                frequency: Frequency {
                    every: decode_u32(row, "frequency")?,
                    unit: decode_label(row, "frequency_unit")?,
                },
                start_date: row
                    .try_get::<Option<SqlxDate>, _>("start_date")?
                    .map(SqlxDate::to_jiff),
                end_date: row
                    .try_get::<Option<SqlxDate>, _>("end_date")?
                    .map(SqlxDate::to_jiff),
                minutes_per_hour: decode_minutes(row)?,
                target_hours: decode_target_hours(row)?,
            },
            is_active: row.try_get("is_active")?,
            impressions: decode_count(row, "impressions")?,
            clicks: decode_count(row, "clicks")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

#[async_trait]
impl PromotionsRepository for PgPromotionsRepository {
    async fn list_promotions(&self) -> Result<Vec<PromotionRecord>, PromotionsRepositoryError> {
        Ok(query_as::<Postgres, PromotionRecord>(LIST_PROMOTIONS_SQL)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn list_running_promotions(
        &self,
        on: Date,
    ) -> Result<Vec<PromotionRecord>, PromotionsRepositoryError> {
        Ok(query_as::<Postgres, PromotionRecord>(LIST_RUNNING_PROMOTIONS_SQL)
            .bind(SqlxDate::from(on))
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn get_promotion(
        &self,
        uuid: PromotionUuid,
    ) -> Result<PromotionRecord, PromotionsRepositoryError> {
        Ok(query_as::<Postgres, PromotionRecord>(GET_PROMOTION_SQL)
            .bind(uuid.into_uuid())
            .fetch_one(self.db.pool())
            .await?)
    }

    async fn create_promotion(
        &self,
        uuid: PromotionUuid,
        draft: PromotionDraft,
    ) -> Result<PromotionRecord, PromotionsRepositoryError> {
        let mut tx = self.db.begin().await?;

        Self::ensure_capacity(&mut tx, uuid, &draft).await?;

        let created = bind_draft(query_as(CREATE_PROMOTION_SQL).bind(uuid.into_uuid()), draft)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_promotion(
        &self,
        uuid: PromotionUuid,
        patch: PromotionPatch,
    ) -> Result<PromotionRevision, PromotionsRepositoryError> {
        self.write_revision(uuid, move |previous| {
            patch.apply(PromotionDraft::from(previous))
        })
        .await
    }

    async fn toggle_promotion(
        &self,
        uuid: PromotionUuid,
    ) -> Result<PromotionRecord, PromotionsRepositoryError> {
        self.write_revision(uuid, |previous| {
            let mut draft = PromotionDraft::from(previous);

            draft.is_active = !previous.is_active;

            draft
        })
        .await
        .map(|revision| revision.current)
    }

    async fn increment_impressions(
        &self,
        uuid: PromotionUuid,
    ) -> Result<(), PromotionsRepositoryError> {
        self.increment(INCREMENT_IMPRESSIONS_SQL, uuid).await
    }

    async fn increment_clicks(&self, uuid: PromotionUuid) -> Result<(), PromotionsRepositoryError> {
        self.increment(INCREMENT_CLICKS_SQL, uuid).await
    }

    async fn delete_promotion(
        &self,
        uuid: PromotionUuid,
    ) -> Result<PromotionRecord, PromotionsRepositoryError> {
        Ok(query_as::<Postgres, PromotionRecord>(DELETE_PROMOTION_SQL)
            .bind(uuid.into_uuid())
            .fetch_one(self.db.pool())
            .await?)
    }
}

#[automock]
#[async_trait]
pub(crate) trait PromotionsRepository: Send + Sync {
    /// All campaigns, newest first.
    async fn list_promotions(&self) -> Result<Vec<PromotionRecord>, PromotionsRepositoryError>;

    /// Active campaigns whose date window contains `on`, highest priority first.
    async fn list_running_promotions(
        &self,
        on: Date,
    ) -> Result<Vec<PromotionRecord>, PromotionsRepositoryError>;

    async fn get_promotion(
        &self,
        uuid: PromotionUuid,
    ) -> Result<PromotionRecord, PromotionsRepositoryError>;

    /// Insert a campaign; an active one needs room in every targeted hour.
    async fn create_promotion(
        &self,
        uuid: PromotionUuid,
        draft: PromotionDraft,
    ) -> Result<PromotionRecord, PromotionsRepositoryError>;

    /// Apply `patch` to the stored campaign, re-checking capacity with the
    /// merged values.
    async fn update_promotion(
        &self,
        uuid: PromotionUuid,
        patch: PromotionPatch,
    ) -> Result<PromotionRevision, PromotionsRepositoryError>;

    /// Flip `is_active`, checking capacity when switching on.
    async fn toggle_promotion(
        &self,
        uuid: PromotionUuid,
    ) -> Result<PromotionRecord, PromotionsRepositoryError>;

    async fn increment_impressions(
        &self,
        uuid: PromotionUuid,
    ) -> Result<(), PromotionsRepositoryError>;

    async fn increment_clicks(&self, uuid: PromotionUuid) -> Result<(), PromotionsRepositoryError>;

    /// Delete a campaign, returning the removed row.
    async fn delete_promotion(
        &self,
        uuid: PromotionUuid,
    ) -> Result<PromotionRecord, PromotionsRepositoryError>;
}
