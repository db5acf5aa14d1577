//! Registry factory that dispatches on the configured backend.

use std::sync::Arc;

use tracing::info;

use healthlink_core::config::ticket::TicketConfig;
use healthlink_core::error::AppError;
use healthlink_core::result::AppResult;
use healthlink_core::traits::TicketRegistry;

/// Build a ticket registry for values of type `S` from configuration.
pub fn build_registry<S>(config: &TicketConfig) -> AppResult<Arc<dyn TicketRegistry<S>>>
where
    S: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    match config.provider.as_str() {
        #[cfg(feature = "memory")]
        "memory" => {
            info!(value_type = std::any::type_name::<S>(), "Initializing in-memory ticket registry");
            Ok(Arc::new(crate::memory::MemoryTicketRegistry::<S>::new()))
        }
        other => Err(AppError::configuration(format!(
            "Unknown ticket provider: '{other}'. Supported: memory"
        ))),
    }
}
