use std::sync::Arc;

use tracing::warn;

use crate::store::StorageBackend;

/// Flag recorded once the promo popup has been dismissed.
pub const BANNER_SHOWN_FLAG: &str = "silamba_banner_shown_session";

/// Per-session "already shown" flags.
///
/// Backed by a `StorageBackend` that lives only as long as the session
/// (usually `MemoryStorage`). Storage failures read as "not shown".
#[derive(Clone)]
pub struct SessionFlags {
    backend: Arc<dyn StorageBackend>,
}

impl SessionFlags {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn mark_shown(&self, key: &str) {
        if let Err(e) = self.backend.set_item(key, "true") {
            warn!(key, error = %e, "Failed to record session flag");
        }
    }

    pub fn was_shown(&self, key: &str) -> bool {
        match self.backend.get_item(key) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!(key, error = %e, "Failed to read session flag");
                false
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.backend.clear() {
            warn!(error = %e, "Failed to clear session flags");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;

    #[test]
    fn test_flags_round_trip_and_clear() {
        let flags = SessionFlags::new(Arc::new(MemoryStorage::new()));
        assert!(!flags.was_shown(BANNER_SHOWN_FLAG));
        flags.mark_shown(BANNER_SHOWN_FLAG);
        assert!(flags.was_shown(BANNER_SHOWN_FLAG));
        flags.clear();
        assert!(!flags.was_shown(BANNER_SHOWN_FLAG));
    }
}
