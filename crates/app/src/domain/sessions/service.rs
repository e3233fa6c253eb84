//! Sessions Service

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;
use tracing::{Span, info};

use crate::{
    domain::sessions::{
        SessionsServiceError,
        data::{
            Heartbeat, NewSession, RESUMED_ACTIVITY, STARTED_ACTIVITY, SessionStart,
            SessionUpdate, StartSession,
        },
        records::{SessionRecord, SessionUuid},
        repository::{PgSessionsRepository, SessionsRepository},
    },
    media::{MediaKind, MediaStorage, discard},
};

/// How many sessions the admin overview returns.
pub const RECENT_SESSIONS_LIMIT: u32 = 50;

const MAX_PROGRESS: u8 = 100;

#[derive(Clone)]
pub struct PgSessionsService {
    repository: Arc<dyn SessionsRepository>,
    media: Arc<dyn MediaStorage>,
}

impl std::fmt::Debug for PgSessionsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSessionsService").finish_non_exhaustive()
    }
}

impl PgSessionsService {
    #[must_use]
    pub fn new(pool: PgPool, media: Arc<dyn MediaStorage>) -> Self {
        Self::with_repository(Arc::new(PgSessionsRepository::new(pool)), media)
    }

    pub(crate) fn with_repository(
        repository: Arc<dyn SessionsRepository>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self { repository, media }
    }

    /// The caller's previous session, if it still carries `name`.
    async fn returning_session(
        &self,
        session: Option<SessionUuid>,
        name: &str,
    ) -> Result<Option<SessionRecord>, SessionsServiceError> {
        let Some(uuid) = session else {
            return Ok(None);
        };

        let previous = self.repository.find_session(uuid).await?;

        Ok(previous.filter(|previous| same_name(&previous.user_name, name)))
    }
}

fn same_name(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

fn normalise_name(name: &str) -> Option<String> {
    let trimmed = name.trim();

    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[async_trait]
impl SessionsService for PgSessionsService {
    #[tracing::instrument(
        name = "sessions.service.start_session",
        skip(self, request),
        fields(
            session_uuid = tracing::field::Empty,
            resumed = tracing::field::Empty,
            has_avatar = request.avatar.is_some()
        ),
        err
    )]
    async fn start_session(
        &self,
        request: StartSession,
        now: Timestamp,
    ) -> Result<SessionStart, SessionsServiceError> {
        let name = normalise_name(&request.name).ok_or(SessionsServiceError::InvalidName)?;

        let returning = self.returning_session(request.session, &name).await?;

        let avatar = match request.avatar {
            Some(upload) => Some(self.media.store(MediaKind::Image, upload).await?),
            None => None,
        };

        let span = Span::current();

        let outcome = match &returning {
            Some(previous) => self
                .repository
                .resume_session(previous.uuid, RESUMED_ACTIVITY, avatar.clone(), now)
                .await
                .map(SessionStart::Resumed),
            None => self
                .repository
                .create_session(
                    NewSession {
                        uuid: SessionUuid::new(),
                        user_name: name,
                        user_image: avatar.clone(),
                        activity: STARTED_ACTIVITY,
                    },
                    now,
                )
                .await
                .map(SessionStart::Created),
        };

        let started = match outcome {
            Ok(started) => started,
            Err(error) => {
                discard(self.media.as_ref(), avatar.as_deref()).await;

                return Err(error.into());
            }
        };

        if let Some(previous) = returning
            && avatar.is_some()
        {
            discard(self.media.as_ref(), previous.user_image.as_deref()).await;
        }

        span.record("resumed", !started.is_created());

        span.record("session_uuid", tracing::field::display(started.record().uuid));

        info!("session started");

        Ok(started)
    }

    #[tracing::instrument(
        name = "sessions.service.record_heartbeat",
        skip(self, heartbeat),
        fields(session_uuid = %uuid, is_leaving = heartbeat.is_leaving),
        err
    )]
    async fn record_heartbeat(
        &self,
        uuid: SessionUuid,
        heartbeat: Heartbeat,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionsServiceError> {
        if let Some(progress) = heartbeat.progress
            && progress > MAX_PROGRESS
        {
            return Err(SessionsServiceError::InvalidProgress(progress));
        }

        let update = SessionUpdate {
            user_name: heartbeat.user_name.as_deref().and_then(normalise_name),
            score: heartbeat.score,
            progress: heartbeat.progress,
            status: heartbeat.status,
            activity: heartbeat.activity.filter(|activity| !activity.trim().is_empty()),
        };

        let last_active = if heartbeat.is_leaving {
            Timestamp::UNIX_EPOCH
        } else {
            now
        };

        Ok(self
            .repository
            .update_session(uuid, update, last_active)
            .await?)
    }

    #[tracing::instrument(
        name = "sessions.service.rename_session",
        skip(self, name),
        fields(session_uuid = %uuid),
        err
    )]
    async fn rename_session(
        &self,
        uuid: SessionUuid,
        name: &str,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionsServiceError> {
        let name = normalise_name(name).ok_or(SessionsServiceError::InvalidName)?;

        let update = SessionUpdate {
            user_name: Some(name),
            ..SessionUpdate::default()
        };

        Ok(self.repository.update_session(uuid, update, now).await?)
    }

    #[tracing::instrument(name = "sessions.service.list_recent_sessions", skip(self), err)]
    async fn list_recent_sessions(&self) -> Result<Vec<SessionRecord>, SessionsServiceError> {
        Ok(self
            .repository
            .list_recent_sessions(RECENT_SESSIONS_LIMIT)
            .await?)
    }

    #[tracing::instrument(
        name = "sessions.service.delete_session",
        skip(self),
        fields(session_uuid = %uuid),
        err
    )]
    async fn delete_session(&self, uuid: SessionUuid) -> Result<(), SessionsServiceError> {
        let deleted = self.repository.delete_session(uuid).await?;

        discard(self.media.as_ref(), deleted.user_image.as_deref()).await;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait SessionsService: Send + Sync {
    /// Start a session under a display name, or resume the caller's own
    /// session when they present its id with the same name.
    async fn start_session(
        &self,
        request: StartSession,
        now: Timestamp,
    ) -> Result<SessionStart, SessionsServiceError>;

    /// Apply a progress report. Leaving marks the session offline at once.
    async fn record_heartbeat(
        &self,
        uuid: SessionUuid,
        heartbeat: Heartbeat,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionsServiceError>;

    async fn rename_session(
        &self,
        uuid: SessionUuid,
        name: &str,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionsServiceError>;

    /// The most recently active sessions.
    async fn list_recent_sessions(&self) -> Result<Vec<SessionRecord>, SessionsServiceError>;

    async fn delete_session(&self, uuid: SessionUuid) -> Result<(), SessionsServiceError>;
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use mockall::predicate::{always, eq};
    use testresult::TestResult;

    use crate::{
        domain::sessions::{
            errors::SessionsRepositoryError, records::SessionStatus,
            repository::MockSessionsRepository,
        },
        media::{MediaUpload, MockMediaStorage},
    };

    use super::*;

    fn service(repository: MockSessionsRepository, media: MockMediaStorage) -> PgSessionsService {
        PgSessionsService::with_repository(Arc::new(repository), Arc::new(media))
    }

    fn session(name: &str) -> SessionRecord {
        SessionRecord {
            uuid: SessionUuid::new(),
            user_name: name.to_owned(),
            user_image: None,
            score: 0,
            progress: 0,
            status: SessionStatus::Active,
            activity: STARTED_ACTIVITY.to_owned(),
            start_time: Timestamp::UNIX_EPOCH,
            last_active: Timestamp::UNIX_EPOCH,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn start(name: &str, session: Option<SessionUuid>) -> StartSession {
        StartSession {
            name: name.to_owned(),
            session,
            avatar: None,
        }
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let result = service(MockSessionsRepository::new(), MockMediaStorage::new())
            .start_session(start("   ", None), Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(SessionsServiceError::InvalidName)),
            "expected InvalidName, got {result:?}"
        );
    }

    #[tokio::test]
    async fn new_names_create_a_trimmed_active_session() -> TestResult {
        let mut repository = MockSessionsRepository::new();
        let now = Timestamp::now();

        repository
            .expect_create_session()
            .once()
            .withf(move |session, at| {
                session.user_name == "Alice"
                    && session.activity == STARTED_ACTIVITY
                    && session.user_image.is_none()
                    && *at == now
            })
            .return_once(|session, at| {
                Ok(SessionRecord {
                    uuid: session.uuid,
                    start_time: at,
                    last_active: at,
                    ..self::session(&session.user_name)
                })
            });

        let started = service(repository, MockMediaStorage::new())
            .start_session(start("  Alice ", None), now)
            .await?;

        assert!(started.is_created());

        let record = started.into_record();

        assert_eq!(record.user_name, "Alice");
        assert_eq!(record.last_active, now);

        Ok(())
    }

    #[tokio::test]
    async fn live_name_collisions_are_reported_as_taken() {
        let mut repository = MockSessionsRepository::new();

        repository
            .expect_create_session()
            .once()
            .return_once(|_, _| Err(SessionsRepositoryError::NameTaken));

        let result = service(repository, MockMediaStorage::new())
            .start_session(start("alice", None), Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(SessionsServiceError::NameTaken)),
            "expected NameTaken, got {result:?}"
        );
    }

    #[tokio::test]
    async fn returning_holder_resumes_regardless_of_case() -> TestResult {
        let mut repository = MockSessionsRepository::new();
        let existing = session("Alice");
        let uuid = existing.uuid;

        repository
            .expect_find_session()
            .once()
            .with(eq(uuid))
            .return_once(move |_| Ok(Some(existing)));

        repository
            .expect_resume_session()
            .once()
            .with(eq(uuid), eq(RESUMED_ACTIVITY), eq(None::<String>), always())
            .return_once(|uuid, activity, _, at| {
                Ok(SessionRecord {
                    uuid,
                    activity: activity.to_owned(),
                    last_active: at,
                    ..session("Alice")
                })
            });

        repository.expect_create_session().never();

        let started = service(repository, MockMediaStorage::new())
            .start_session(start("ALICE", Some(uuid)), Timestamp::now())
            .await?;

        assert!(!started.is_created());
        assert_eq!(started.into_record().uuid, uuid);

        Ok(())
    }

    #[tokio::test]
    async fn a_different_name_does_not_resume_the_old_session() -> TestResult {
        let mut repository = MockSessionsRepository::new();
        let existing = session("Alice");
        let uuid = existing.uuid;

        repository
            .expect_find_session()
            .once()
            .return_once(move |_| Ok(Some(existing)));

        repository.expect_resume_session().never();

        repository
            .expect_create_session()
            .once()
            .return_once(|session, _| {
                Ok(SessionRecord {
                    uuid: session.uuid,
                    ..self::session(&session.user_name)
                })
            });

        let started = service(repository, MockMediaStorage::new())
            .start_session(start("Bob", Some(uuid)), Timestamp::now())
            .await?;

        assert!(started.is_created());
        assert_ne!(started.into_record().uuid, uuid);

        Ok(())
    }

    #[tokio::test]
    async fn rejected_starts_discard_the_uploaded_avatar() {
        let mut repository = MockSessionsRepository::new();
        let mut media = MockMediaStorage::new();

        media
            .expect_store()
            .once()
            .withf(|kind, _| *kind == MediaKind::Image)
            .return_once(|_, _| Ok("/uploads/img-1.png".to_owned()));

        media
            .expect_remove()
            .once()
            .withf(|path| path == "/uploads/img-1.png")
            .return_once(|_| Ok(()));

        repository
            .expect_create_session()
            .once()
            .return_once(|_, _| Err(SessionsRepositoryError::NameTaken));

        let result = service(repository, media)
            .start_session(
                StartSession {
                    name: "Alice".to_owned(),
                    session: None,
                    avatar: Some(MediaUpload {
                        file_name: Some("me.png".to_owned()),
                        content_type: Some("image/png".to_owned()),
                        size: 10,
                        path: PathBuf::from("/tmp/me"),
                    }),
                },
                Timestamp::now(),
            )
            .await;

        assert!(
            matches!(result, Err(SessionsServiceError::NameTaken)),
            "expected NameTaken, got {result:?}"
        );
    }

    #[tokio::test]
    async fn leaving_heartbeats_stamp_the_epoch() -> TestResult {
        let mut repository = MockSessionsRepository::new();
        let uuid = SessionUuid::new();

        repository
            .expect_update_session()
            .once()
            .withf(move |candidate, update, last_active| {
                *candidate == uuid
                    && update.score == Some(7)
                    && update.user_name.is_none()
                    && *last_active == Timestamp::UNIX_EPOCH
            })
            .return_once(|uuid, _, last_active| {
                Ok(SessionRecord {
                    uuid,
                    score: 7,
                    last_active,
                    ..session("Alice")
                })
            });

        let now = Timestamp::now();

        let record = service(repository, MockMediaStorage::new())
            .record_heartbeat(
                uuid,
                Heartbeat {
                    score: Some(7),
                    user_name: Some("  ".to_owned()),
                    is_leaving: true,
                    ..Heartbeat::default()
                },
                now,
            )
            .await?;

        assert!(!record.is_online(now));

        Ok(())
    }

    #[tokio::test]
    async fn heartbeats_reject_progress_over_one_hundred() {
        let result = service(MockSessionsRepository::new(), MockMediaStorage::new())
            .record_heartbeat(
                SessionUuid::new(),
                Heartbeat {
                    progress: Some(101),
                    ..Heartbeat::default()
                },
                Timestamp::now(),
            )
            .await;

        assert!(
            matches!(result, Err(SessionsServiceError::InvalidProgress(101))),
            "expected InvalidProgress, got {result:?}"
        );
    }

    #[tokio::test]
    async fn heartbeat_for_unknown_session_returns_not_found() {
        let mut repository = MockSessionsRepository::new();

        repository
            .expect_update_session()
            .once()
            .return_once(|_, _, _| Err(SessionsRepositoryError::NotFound));

        let result = service(repository, MockMediaStorage::new())
            .record_heartbeat(SessionUuid::new(), Heartbeat::default(), Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(SessionsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_recent_sessions_is_capped() -> TestResult {
        let mut repository = MockSessionsRepository::new();

        repository
            .expect_list_recent_sessions()
            .once()
            .with(eq(RECENT_SESSIONS_LIMIT))
            .return_once(|_| Ok(vec![session("Alice")]));

        let sessions = service(repository, MockMediaStorage::new())
            .list_recent_sessions()
            .await?;

        assert_eq!(sessions.len(), 1);

        Ok(())
    }
}
