use delegate::delegate;

use super::{Error, MemStore, Store};

/// In-memory store whose `destroy` keeps the data.
///
/// Meant for tests that need to look at what a handler left in the session
/// after the handler destroyed it.
#[derive(Debug)]
pub struct MockStore {
    inner: MemStore,
}

impl MockStore {
    pub fn new(sid: impl Into<String>) -> Self {
        Self {
            inner: MemStore::new(sid),
        }
    }
}

impl Store for MockStore {
    delegate! {
        to self.inner {
            fn id(&self) -> &str;
            fn set(&self, key: &str, value: Vec<u8>);
            fn get(&self, key: &str) -> Option<Vec<u8>>;
            fn delete(&self, key: &str) -> Option<Vec<u8>>;
            fn release(&self) -> Result<(), Error>;
            fn flush(&self);
        }
    }

    fn destroy(&self) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::StoreExt;

    #[test]
    fn test_destroy_keeps_data() {
        let store = MockStore::new("sid");
        store.set_value("uid", &1001i64).unwrap();
        store.set("raw", vec![9, 9]);

        assert!(store.destroy().is_ok());
        assert!(store.destroy().is_ok());
        assert_eq!(store.get_value::<i64>("uid").unwrap(), Some(1001));
        assert_eq!(store.get("raw"), Some(vec![9, 9]));
    }

    #[test]
    fn test_behaves_like_mem_store() {
        let store = MockStore::new("sid");
        assert_eq!(store.id(), "sid");
        store.set("a", vec![1]);
        assert_eq!(store.delete("a"), Some(vec![1]));
        store.set("b", vec![2]);
        store.flush();
        assert_eq!(store.get("b"), None);
        assert!(store.release().is_ok());
    }
}
