// Storage module structure
pub mod errors;
mod in_memory;
#[cfg(feature = "sqlite")]
mod sqlite;

use async_trait::async_trait;

// Re-export commonly used types
pub use errors::StorageError;
pub use in_memory::InMemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Key holding the serialized reading list
pub const READINGS_KEY: &str = "bp_readings";

/// Key holding the patient name
pub const PATIENT_NAME_KEY: &str = "patient_name";

/// Key holding the dark mode flag ("true" / "false")
pub const DARK_MODE_KEY: &str = "dark_mode";

/// Key-value persistence adapter.
///
/// Both calls may fail; a missing key is `Ok(None)`, not an error.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Short human-readable description of the backend
    fn describe(&self) -> String;
}

/// Mock key-value store for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory store whose reads and writes can be made to fail on demand
    #[derive(Debug, Default)]
    pub struct MockKeyValueStore {
        inner: InMemoryStore,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
        writes: AtomicUsize,
    }

    impl MockKeyValueStore {
        /// Create a new empty mock store
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock store with predefined entries
        pub fn with_entries(entries: &[(&str, &str)]) -> Self {
            Self {
                inner: InMemoryStore::with_entries(entries),
                ..Self::default()
            }
        }

        /// Configure the mock to fail every read
        pub fn with_read_failure(self) -> Self {
            self.fail_reads.store(true, Ordering::SeqCst);
            self
        }

        /// Configure the mock to fail every write
        pub fn with_write_failure(self) -> Self {
            self.fail_writes.store(true, Ordering::SeqCst);
            self
        }

        /// Toggle write failures after construction
        pub fn set_write_failure(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Number of successful writes so far
        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        /// Peek at a stored value without going through the failure switches
        pub fn raw(&self, key: &str) -> Option<String> {
            self.inner.snapshot().get(key).cloned()
        }
    }

    #[async_trait]
    impl KeyValueStore for MockKeyValueStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable(format!("mock read failure for {}", key)));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable(format!("mock write failure for {}", key)));
            }
            self.inner.set(key, value).await?;
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn describe(&self) -> String {
            "mock key-value store".to_string()
        }
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_mock_failure_switches() {
        let store = MockKeyValueStore::new().with_write_failure();
        assert!(store.set("a", "1").await.is_err());
        assert_eq!(store.write_count(), 0);

        store.set_write_failure(false);
        store.set("a", "1").await.unwrap();
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.get("a").await.unwrap(), Some("1".to_string()));

        let store = MockKeyValueStore::with_entries(&[("a", "1")]).with_read_failure();
        assert!(store.get("a").await.is_err());
        assert_eq!(store.raw("a"), Some("1".to_string()));
    }
}
