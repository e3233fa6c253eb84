//! Admin session bearer tokens.
//!
//! A token reads `um_<session>.<secret>`: the session UUID in simple form, then
//! 32 random bytes as unpadded URL-safe base64. Only a peppered hash of the
//! secret, bound to its session and admin, is ever stored.

use std::{fmt, str::FromStr};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;
use zeroize::{Zeroize, Zeroizing};

use crate::auth::{AdminSessionUuid, AdminUuid};

const PREFIX: &str = "um_";
const SECRET_BYTES: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminTokenError {
    #[error("not an admin session token")]
    Malformed,

    #[error("admin session id is invalid")]
    InvalidSession,

    #[error("admin session secret is invalid")]
    InvalidSecret,
}

/// Proof of an admin session: the session id plus its random secret.
pub struct AdminSessionToken {
    session: AdminSessionUuid,
    secret: [u8; SECRET_BYTES],
}

impl AdminSessionToken {
    /// Mint the token for a brand-new session.
    #[must_use]
    pub fn generate() -> Self {
        let mut secret = [0_u8; SECRET_BYTES];

        OsRng.fill_bytes(&mut secret);

        Self {
            session: AdminSessionUuid::new(),
            secret,
        }
    }

    #[must_use]
    pub const fn session(&self) -> AdminSessionUuid {
        self.session
    }

    /// Stored form of the secret for a session owned by `admin`.
    #[must_use]
    pub fn secret_hash(&self, pepper: &[u8], admin: AdminUuid) -> String {
        let digest = Sha256::new()
            .chain_update(pepper)
            .chain_update(self.session.into_uuid().as_bytes())
            .chain_update(admin.into_uuid().as_bytes())
            .chain_update(self.secret)
            .finalize();

        URL_SAFE_NO_PAD.encode(digest)
    }

    /// Whether `stored` came from [`Self::secret_hash`] for this session and `admin`.
    #[must_use]
    pub fn matches(&self, pepper: &[u8], admin: AdminUuid, stored: &str) -> bool {
        constant_time_eq(
            self.secret_hash(pepper, admin).as_bytes(),
            stored.as_bytes(),
        )
    }

    /// Bearer string handed to the client once, at login.
    #[must_use]
    pub fn to_bearer(&self) -> String {
        let secret = Zeroizing::new(URL_SAFE_NO_PAD.encode(self.secret));

        format!("{PREFIX}{}.{}", self.session.into_uuid().simple(), *secret)
    }
}

impl FromStr for AdminSessionToken {
    type Err = AdminTokenError;

    fn from_str(bearer: &str) -> Result<Self, Self::Err> {
        let (session, secret) = bearer
            .strip_prefix(PREFIX)
            .and_then(|rest| rest.split_once('.'))
            .ok_or(AdminTokenError::Malformed)?;

        let session = Uuid::try_parse(session)
            .map(AdminSessionUuid::from_uuid)
            .map_err(|_invalid| AdminTokenError::InvalidSession)?;

        let decoded = Zeroizing::new(
            URL_SAFE_NO_PAD
                .decode(secret)
                .map_err(|_invalid| AdminTokenError::InvalidSecret)?,
        );

        let secret = <[u8; SECRET_BYTES]>::try_from(decoded.as_slice())
            .map_err(|_wrong_length| AdminTokenError::InvalidSecret)?;

        Ok(Self { session, secret })
    }
}

impl fmt::Debug for AdminSessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSessionToken")
            .field("session", &self.session)
            .field("secret", &"**redacted**")
            .finish()
    }
}

impl Drop for AdminSessionToken {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }

    left.iter()
        .zip(right)
        .fold(0_u8, |diff, (l, r)| diff | (l ^ r))
        == 0
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const PEPPER: &[u8] = b"pepper";

    #[test]
    fn bearer_parses_back_to_the_same_session() -> TestResult {
        let token = AdminSessionToken::generate();
        let admin = AdminUuid::new();
        let stored = token.secret_hash(PEPPER, admin);

        let bearer = token.to_bearer();

        assert!(bearer.starts_with("um_"), "prefix: {bearer}");

        let parsed: AdminSessionToken = bearer.parse()?;

        assert_eq!(parsed.session(), token.session(), "session id");
        assert!(parsed.matches(PEPPER, admin, &stored), "secret survives");

        Ok(())
    }

    #[test]
    fn stored_hash_is_bound_to_pepper_admin_and_secret() {
        let token = AdminSessionToken::generate();
        let admin = AdminUuid::new();
        let stored = token.secret_hash(PEPPER, admin);

        assert!(
            !token.matches(b"other", admin, &stored),
            "different pepper must not match"
        );
        assert!(
            !token.matches(PEPPER, AdminUuid::new(), &stored),
            "another admin must not match"
        );

        let forged = AdminSessionToken {
            session: token.session(),
            secret: [7; SECRET_BYTES],
        };

        assert!(
            !forged.matches(PEPPER, admin, &stored),
            "guessed secret must not match"
        );
    }

    #[test]
    fn rejects_malformed_bearers() {
        let session = AdminSessionUuid::new().into_uuid().simple();
        let short = URL_SAFE_NO_PAD.encode([1_u8; 8]);
        let full = URL_SAFE_NO_PAD.encode([1_u8; SECRET_BYTES]);

        let cases = [
            ("abc123".to_owned(), AdminTokenError::Malformed),
            (format!("um_{session}"), AdminTokenError::Malformed),
            (format!("xx_{session}.{full}"), AdminTokenError::Malformed),
            (format!("um_nope.{full}"), AdminTokenError::InvalidSession),
            (format!("um_{session}.{short}"), AdminTokenError::InvalidSecret),
            (format!("um_{session}.!!!"), AdminTokenError::InvalidSecret),
        ];

        for (bearer, expected) in cases {
            let result = bearer.parse::<AdminSessionToken>();

            assert!(
                matches!(&result, Err(error) if *error == expected),
                "{bearer}: expected {expected:?}, got {result:?}"
            );
        }
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let token = AdminSessionToken::generate();
        let debug = format!("{token:?}");
        let encoded = URL_SAFE_NO_PAD.encode(token.secret);

        assert!(debug.contains("**redacted**"), "{debug}");
        assert!(!debug.contains(&encoded), "{debug}");
    }
}
