//! Auth service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use sqlx::PgPool;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::auth::{
    AdminIdentity, AdminRecord, AdminSessionToken, AdminUuid, AuthServiceError, IssuedAdminToken,
    NewAdmin, hash_password,
    models::NewAdminSession,
    password::UNKNOWN_USER_HASH,
    repository::{AuthRepository, PgAuthRepository},
    verify_password,
};

/// Admin session lifetime used when none is configured.
pub const DEFAULT_TOKEN_TTL: SignedDuration = SignedDuration::from_hours(24);

/// Server-side session settings.
#[derive(Clone)]
pub struct AuthSettings {
    /// Secret mixed into every stored session hash.
    pub pepper: Zeroizing<String>,

    /// How long a session stays valid after login.
    pub token_ttl: SignedDuration,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("pepper", &"**redacted**")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

#[derive(Clone)]
pub struct PgAuthService {
    repository: Arc<dyn AuthRepository>,
    settings: AuthSettings,
}

impl std::fmt::Debug for PgAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgAuthService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PgAuthService {
    #[must_use]
    pub fn new(pool: PgPool, settings: AuthSettings) -> Self {
        Self::with_repository(Arc::new(PgAuthRepository::new(pool)), settings)
    }

    pub(crate) fn with_repository(
        repository: Arc<dyn AuthRepository>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            repository,
            settings,
        }
    }

    fn pepper(&self) -> &[u8] {
        self.settings.pepper.as_bytes()
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    #[tracing::instrument(name = "auth.service.login", skip(self, password), err)]
    async fn login(
        &self,
        username: &str,
        password: &str,
        now: Timestamp,
    ) -> Result<IssuedAdminToken, AuthServiceError> {
        let username = username.trim();

        if username.is_empty() || password.is_empty() {
            return Err(AuthServiceError::MissingCredentials);
        }

        let Some(admin) = self.repository.find_admin_by_username(username).await? else {
            verify_password(password, UNKNOWN_USER_HASH).await?;

            return Err(AuthServiceError::InvalidCredentials);
        };

        if !verify_password(password, &admin.password_hash).await? {
            return Err(AuthServiceError::InvalidCredentials);
        }

        let expires_at = now
            .checked_add(self.settings.token_ttl)
            .map_err(|_overflow| AuthServiceError::ExpiryOutOfRange)?;

        let token = AdminSessionToken::generate();

        self.repository
            .create_admin_session(NewAdminSession {
                uuid: token.session(),
                admin_uuid: admin.uuid,
                secret_hash: token.secret_hash(self.pepper(), admin.uuid),
                expires_at,
            })
            .await?;

        match self.repository.delete_expired_admin_sessions().await {
            Ok(purged) if purged > 0 => debug!(purged, "purged expired admin sessions"),
            Ok(_) => {}
            Err(source) => warn!("failed to purge expired admin sessions: {source}"),
        }

        Ok(IssuedAdminToken {
            token: token.to_bearer(),
            username: admin.username,
            expires_at,
        })
    }

    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AdminIdentity, AuthServiceError> {
        let token: AdminSessionToken = bearer_token
            .parse()
            .map_err(|_malformed| AuthServiceError::NotFound)?;

        let session = self
            .repository
            .touch_admin_session(token.session())
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        if !token.matches(self.pepper(), session.admin_uuid, &session.secret_hash) {
            return Err(AuthServiceError::NotFound);
        }

        Ok(AdminIdentity {
            admin_uuid: session.admin_uuid,
            username: session.username,
        })
    }

    #[tracing::instrument(name = "auth.service.create_admin", skip(self, password), err)]
    async fn create_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminRecord, AuthServiceError> {
        let username = username.trim();

        if username.is_empty() || password.is_empty() {
            return Err(AuthServiceError::MissingCredentials);
        }

        self.repository
            .create_admin(NewAdmin {
                uuid: AdminUuid::new(),
                username: username.to_owned(),
                password_hash: hash_password(password).await?,
            })
            .await
            .map_err(Into::into)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Open an admin session valid from `now` and return its bearer token.
    async fn login(
        &self,
        username: &str,
        password: &str,
        now: Timestamp,
    ) -> Result<IssuedAdminToken, AuthServiceError>;

    /// Resolve a bearer token to the admin whose session it proves.
    async fn authenticate_bearer(&self, bearer_token: &str)
    -> Result<AdminIdentity, AuthServiceError>;

    /// Provision a new admin account.
    async fn create_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminRecord, AuthServiceError>;
}
