use tracing::{debug, info};

/// Hooks the catalog calls after it changes.
///
/// `on_catalog_changed` runs after every successful mutation, `notify` after
/// successful creation, confirmation and cancellation events. Failed
/// operations call neither.
pub trait CatalogObserver {
    fn on_catalog_changed(&self);
    fn notify(&self, message: &str);
}

/// Default observer that writes both hooks to the tracing subscriber.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver;

impl CatalogObserver for TracingObserver {
    fn on_catalog_changed(&self) {
        debug!("Catalog changed");
    }

    fn notify(&self, message: &str) {
        info!("{}", message);
    }
}
