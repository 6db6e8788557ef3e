//! Store kept in RAM, for the host and for tests.

use heapless::{String, Vec};

use super::{ConfigStore, StoreError, MAX_KEY_LEN, MAX_RECORD_SIZE};

#[derive(Debug)]
struct Entry {
    namespace: String<MAX_KEY_LEN>,
    key: String<MAX_KEY_LEN>,
    data: Vec<u8, MAX_RECORD_SIZE>,
}

/// Store of up to `N` entries, lost on reset.
///
/// It enforces the same limits as the flash backend: namespaces and keys
/// of at most 15 characters and blobs of at most 64 bytes.
#[derive(Debug, Default)]
pub struct MemoryStore<const N: usize> {
    entries: Vec<Entry, N>,
    writes: usize,
}

impl<const N: usize> MemoryStore<N> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            writes: 0,
        }
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, namespace: &str, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.namespace.as_str() == namespace && e.key.as_str() == key)
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_KEY_LEN
}

impl<const N: usize> ConfigStore for MemoryStore<N> {
    fn write(&mut self, namespace: &str, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        if !valid_name(namespace) || !valid_name(key) {
            return Err(StoreError::InvalidKey);
        }
        let data = Vec::from_slice(bytes).map_err(|_| StoreError::TooLarge)?;

        if let Some(i) = self.find(namespace, key) {
            self.entries[i].data = data;
        } else {
            let mut entry = Entry {
                namespace: String::new(),
                key: String::new(),
                data,
            };
            // Lengths were checked above.
            let _ = entry.namespace.push_str(namespace);
            let _ = entry.key.push_str(key);
            self.entries.push(entry).map_err(|_| StoreError::Full)?;
        }

        self.writes += 1;
        Ok(())
    }

    fn read(
        &mut self,
        namespace: &str,
        key: &str,
        buffer: &mut [u8],
    ) -> Result<Option<usize>, StoreError> {
        if !valid_name(namespace) || !valid_name(key) {
            return Err(StoreError::InvalidKey);
        }
        let Some(i) = self.find(namespace, key) else {
            return Ok(None);
        };
        let data = &self.entries[i].data;
        let copied = data.len().min(buffer.len());
        buffer[..copied].copy_from_slice(&data[..copied]);
        Ok(Some(data.len()))
    }
}
