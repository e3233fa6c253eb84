//! Auth data models.

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Admin UUID
pub type AdminUuid = TypedUuid<AdminRecord>;

/// Back-office account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRecord {
    pub uuid: AdminUuid,
    pub username: String,
    pub created_at: Timestamp,
}

/// Admin row including the password hash, used only during login.
#[derive(Debug, Clone)]
pub(crate) struct AdminCredentials {
    pub uuid: AdminUuid,
    pub username: String,
    pub password_hash: String,
}

/// New admin persistence payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdmin {
    pub uuid: AdminUuid,
    pub username: String,
    pub password_hash: String,
}

/// Admin session UUID, the public half of a bearer token.
pub type AdminSessionUuid = TypedUuid<AdminSession>;

/// Live admin session loaded while authenticating a bearer token.
#[derive(Debug, Clone)]
pub struct AdminSession {
    /// Admin that signed in.
    pub admin_uuid: AdminUuid,

    /// Owner's username, returned to the caller.
    pub username: String,

    /// Peppered hash of the session secret.
    pub secret_hash: String,
}

/// New session persistence payload.
#[derive(Debug, Clone)]
pub(crate) struct NewAdminSession {
    pub uuid: AdminSessionUuid,
    pub admin_uuid: AdminUuid,
    pub secret_hash: String,
    pub expires_at: Timestamp,
}

/// Login result carrying the one-time bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedAdminToken {
    pub token: String,
    pub username: String,
    pub expires_at: Timestamp,
}

/// Authenticated caller of an admin route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub admin_uuid: AdminUuid,
    pub username: String,
}
