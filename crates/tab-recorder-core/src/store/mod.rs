//! Durable storage for the global "recording active" flag.

mod file;
mod memory;
mod record;

pub use {file::FileSessionStore, memory::MemorySessionStore, record::SessionRecord};

use crate::CoreResult;

/// Persists the single global [`SessionRecord`].
///
/// Implementations must survive the hosting process restarting (except
/// [`MemorySessionStore`], which exists for embedding and tests).
pub trait SessionStore: Send + Sync {
    /// Read the record, or the default record if none was ever saved.
    fn load(&self) -> CoreResult<SessionRecord>;

    /// Replace the stored record.
    fn save(&self, record: &SessionRecord) -> CoreResult<()>;

    /// Last persisted `active` value, `false` if never set.
    fn get(&self) -> CoreResult<bool> {
        Ok(self.load()?.active)
    }

    /// Persist `active`. Idempotent.
    fn set(&self, active: bool) -> CoreResult<()> {
        let mut record = self.load()?;
        if record.active == active {
            return Ok(());
        }
        record.active = active;
        self.save(&record)
    }
}
