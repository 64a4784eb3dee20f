use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::{Error, Store};

/// Session data kept in process memory.
#[derive(Debug)]
pub struct MemStore {
    sid: String,
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemStore {
    pub fn new(sid: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            data: RwLock::new(HashMap::new()),
        }
    }
}

impl Store for MemStore {
    fn id(&self) -> &str {
        &self.sid
    }

    fn set(&self, key: &str, value: Vec<u8>) {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn delete(&self, key: &str) -> Option<Vec<u8>> {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    fn release(&self) -> Result<(), Error> {
        Ok(())
    }

    fn flush(&self) {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn destroy(&self) -> Result<(), Error> {
        self.flush();
        Ok(())
    }
}
