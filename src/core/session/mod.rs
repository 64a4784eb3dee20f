use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::pack::{PackError, pack_data, unpack_data};

mod memory;
#[cfg(test)]
mod mock;

pub use memory::MemStore;
#[cfg(test)]
pub use mock::MockStore;

#[derive(Error, Debug)]
pub enum Error {
    #[error("session value {key} is corrupt: {source}")]
    Corrupt { key: String, source: PackError },
    #[error(transparent)]
    Pack(#[from] PackError),
}

/// Raw key/value storage behind a single session id.
pub trait Store: Send + Sync {
    fn id(&self) -> &str;

    fn set(&self, key: &str, value: Vec<u8>);

    fn get(&self, key: &str) -> Option<Vec<u8>>;

    fn delete(&self, key: &str) -> Option<Vec<u8>>;

    /// Persists pending changes.
    fn release(&self) -> Result<(), Error>;

    /// Removes every key.
    fn flush(&self);

    fn destroy(&self) -> Result<(), Error>;
}

/// Typed access on top of [`Store`], values go through the pack helper.
pub trait StoreExt: Store {
    fn set_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), Error> {
        let buf = pack_data!(value)?;
        self.set(key, buf);
        Ok(())
    }

    fn get_value<T: DeserializeOwned + Default>(&self, key: &str) -> Result<Option<T>, Error> {
        let Some(buf) = self.get(key) else {
            return Ok(None);
        };
        let mut value = T::default();
        unpack_data!(buf, &mut value).map_err(|source| Error::Corrupt {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(value))
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

type StoreFactory = Box<dyn Fn(&str) -> Arc<dyn Store> + Send + Sync>;

/// How long a session lives unless configured otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

struct Entry {
    store: Arc<dyn Store>,
    created: Instant,
}

impl Entry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created.elapsed() >= ttl
    }
}

/// Live sessions by id. A session expires `ttl` after it was started.
pub struct SessionManager {
    stores: DashMap<String, Entry>,
    factory: StoreFactory,
    ttl: Duration,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_factory(|sid| Arc::new(MemStore::new(sid)))
    }

    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn(&str) -> Arc<dyn Store> + Send + Sync + 'static,
    {
        Self {
            stores: DashMap::new(),
            factory: Box::new(factory),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the store for `sid`, creating it if needed.
    pub fn start(&self, sid: &str) -> Arc<dyn Store> {
        self.stores
            .entry(sid.to_string())
            .or_insert_with(|| {
                tracing::trace!(sid, "Starting session");
                Entry {
                    store: (self.factory)(sid),
                    created: Instant::now(),
                }
            })
            .store
            .clone()
    }

    /// Returns the store for `sid` unless it is unknown or expired.
    pub fn read(&self, sid: &str) -> Option<Arc<dyn Store>> {
        let entry = self.stores.get(sid)?;
        if entry.is_expired(self.ttl) {
            drop(entry);
            self.expire(sid);
            return None;
        }
        Some(entry.store.clone())
    }

    /// Removes `sid` and hands its store to the caller, who becomes
    /// responsible for destroying it. Of several concurrent callers only one
    /// gets the store.
    pub fn take(&self, sid: &str) -> Option<Arc<dyn Store>> {
        let (_, entry) = self.stores.remove(sid)?;
        if entry.is_expired(self.ttl) {
            Self::discard(sid, &entry.store);
            return None;
        }
        Some(entry.store)
    }

    /// Destroys every expired session. Returns how many were removed.
    pub fn reap(&self) -> usize {
        let expired: Vec<String> = self
            .stores
            .iter()
            .filter(|entry| entry.is_expired(self.ttl))
            .map(|entry| entry.key().clone())
            .collect();
        expired.iter().filter(|sid| self.expire(sid)).count()
    }

    pub fn count(&self) -> usize {
        self.stores.len()
    }

    fn expire(&self, sid: &str) -> bool {
        match self.stores.remove_if(sid, |_, entry| entry.is_expired(self.ttl)) {
            Some((_, entry)) => {
                Self::discard(sid, &entry.store);
                true
            }
            None => false,
        }
    }

    fn discard(sid: &str, store: &Arc<dyn Store>) {
        tracing::debug!(sid, "Session expired");
        if let Err(e) = store.destroy() {
            tracing::error!("Failed to destroy expired session {}: {}", sid, e);
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
