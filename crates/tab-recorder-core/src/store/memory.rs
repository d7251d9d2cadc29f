use crate::{
    CoreResult,
    store::{SessionRecord, SessionStore},
};

use std::sync::Mutex;

use tracing::error;

/// In-process [`SessionStore`]; does not survive restarts.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    record: Mutex<SessionRecord>,
}

impl MemorySessionStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `record`, e.g. to simulate a prior process.
    pub fn with_record(record: SessionRecord) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> CoreResult<SessionRecord> {
        let record = self.record.lock().unwrap_or_else(|e| {
            error!("Session store lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        Ok(*record)
    }

    fn save(&self, record: &SessionRecord) -> CoreResult<()> {
        let mut current = self.record.lock().unwrap_or_else(|e| {
            error!("Session store lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        *current = *record;
        Ok(())
    }
}
