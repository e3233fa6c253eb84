//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::Depot;

use umutoza_app::auth::AdminIdentity;

use crate::errors::ApiError;

/// Helpers for reading request-scoped values out of the depot.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError>;

    fn insert_admin(&mut self, admin: AdminIdentity);

    fn admin_or_401(&self) -> Result<&AdminIdentity, ApiError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError> {
        self.obtain::<T>().map_err(|_missing| {
            tracing::error!(
                type_name = std::any::type_name::<T>(),
                "depot value missing"
            );

            ApiError::internal()
        })
    }

    fn insert_admin(&mut self, admin: AdminIdentity) {
        self.inject(admin);
    }

    fn admin_or_401(&self) -> Result<&AdminIdentity, ApiError> {
        self.obtain::<AdminIdentity>()
            .map_err(|_missing| ApiError::unauthorized("Access denied. No token provided."))
    }
}
