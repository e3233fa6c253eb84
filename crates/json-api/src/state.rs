//! Handler state

use std::sync::Arc;

use umutoza_app::context::AppContext;

/// Injected into the depot once; handlers reach the domain services through `app`.
pub(crate) struct State {
    pub(crate) app: AppContext,
}

/// Wrap the application services for injection into the router.
#[must_use]
pub(crate) fn shared(app: AppContext) -> Arc<State> {
    Arc::new(State { app })
}
