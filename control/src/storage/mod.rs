//! Persisting fixed-size records in a non-volatile key-value store.
//!
//! The physical layout belongs to the backend. All this crate needs is to put
//! and get bytes under a namespace and a key. On top of that, [`Record`]
//! types declare their exact serialized length and a stored blob of any
//! other length is treated as if it was not there at all.

mod memory;
mod records;

#[cfg(test)]
pub(crate) use memory::tests::FlakyStore;
pub use memory::MemoryStore;
pub use records::{animation_key, AnimationKey, AppConfig, RegistryConfig};

use crate::log;

pub const APP_NAMESPACE: &str = "app";
pub const ANIMATION_NAMESPACE: &str = "anim";
pub const REGISTRY_NAMESPACE: &str = "anim_mngr";

/// Key used for the single configuration record of a namespace.
pub const CONFIG_KEY: &str = "cfg";

/// Namespaces and keys must fit into this many characters.
pub const MAX_KEY_LEN: usize = 15;

/// Largest record that can pass through [`save_record`] and [`load_record`].
pub const MAX_RECORD_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// The backend could not be opened.
    Unavailable,
    WriteRejected,
    TooLarge,
    InvalidKey,
    /// No room left for a new entry.
    Full,
}

/// Byte-level access to the non-volatile store.
pub trait ConfigStore {
    /// Replace whatever is stored under the given key.
    ///
    /// # Errors
    ///
    /// Fails when the backend is unavailable, rejects the write or has no
    /// space left.
    fn write(&mut self, namespace: &str, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Copy the stored bytes into `buffer` and return their full length.
    ///
    /// When the stored blob is longer than `buffer`, only its beginning is
    /// copied. `Ok(None)` means nothing is stored under the key.
    ///
    /// # Errors
    ///
    /// Fails when the backend is unavailable.
    fn read(
        &mut self,
        namespace: &str,
        key: &str,
        buffer: &mut [u8],
    ) -> Result<Option<usize>, StoreError>;
}

/// Configuration with a fixed serialized form.
pub trait Record: Sized {
    const SIZE: usize;

    /// Serialize into `buffer` of exactly `SIZE` bytes.
    fn write_bytes(&self, buffer: &mut [u8]);

    /// Deserialize from `bytes` of exactly `SIZE` bytes.
    fn read_bytes(bytes: &[u8]) -> Self;
}

/// # Errors
///
/// Propagates the error of the backend. Records larger than
/// [`MAX_RECORD_SIZE`] are refused with `TooLarge`.
pub fn save_record<S: ConfigStore, R: Record>(
    store: &mut S,
    namespace: &str,
    key: &str,
    record: &R,
) -> Result<(), StoreError> {
    if R::SIZE > MAX_RECORD_SIZE {
        return Err(StoreError::TooLarge);
    }
    let mut scratch = [0; MAX_RECORD_SIZE];
    let bytes = &mut scratch[..R::SIZE];
    record.write_bytes(bytes);
    store.write(namespace, key, bytes)
}

/// Load a record, returning `None` when there is no usable one.
///
/// A stored blob of a different length than the record is most likely a
/// leftover of an older firmware, so it is refused instead of being
/// partially deserialized.
pub fn load_record<S: ConfigStore, R: Record>(
    store: &mut S,
    namespace: &str,
    key: &str,
) -> Option<R> {
    if R::SIZE > MAX_RECORD_SIZE {
        return None;
    }
    let mut scratch = [0; MAX_RECORD_SIZE];
    match store.read(namespace, key, &mut scratch) {
        Ok(Some(length)) if length == R::SIZE => Some(R::read_bytes(&scratch[..R::SIZE])),
        Ok(Some(length)) => {
            log::warning!(
                "Refusing {}/{} with length={}, expected={}",
                namespace,
                key,
                length,
                R::SIZE
            );
            None
        }
        Ok(None) => {
            log::debug!("Nothing stored under {}/{}", namespace, key);
            None
        }
        Err(error) => {
            log::warning!("Failed reading {}/{}: {:?}", namespace, key, error);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Pair(u8, u8);

    impl Record for Pair {
        const SIZE: usize = 2;

        fn write_bytes(&self, buffer: &mut [u8]) {
            buffer[0] = self.0;
            buffer[1] = self.1;
        }

        fn read_bytes(bytes: &[u8]) -> Self {
            Self(bytes[0], bytes[1])
        }
    }

    struct Huge;

    impl Record for Huge {
        const SIZE: usize = MAX_RECORD_SIZE + 1;

        fn write_bytes(&self, _buffer: &mut [u8]) {}

        fn read_bytes(_bytes: &[u8]) -> Self {
            Self
        }
    }

    #[test]
    fn saved_record_can_be_loaded_back() {
        let mut store = MemoryStore::<4>::new();
        save_record(&mut store, "ns", "key", &Pair(1, 2)).unwrap();
        assert_eq!(load_record(&mut store, "ns", "key"), Some(Pair(1, 2)));
    }

    #[test]
    fn when_nothing_is_stored_load_returns_none() {
        let mut store = MemoryStore::<4>::new();
        assert_eq!(load_record::<_, Pair>(&mut store, "ns", "key"), None);
    }

    #[test]
    fn when_stored_length_differs_load_returns_none() {
        let mut store = MemoryStore::<4>::new();
        store.write("ns", "short", &[1]).unwrap();
        store.write("ns", "long", &[1, 2, 3]).unwrap();
        assert_eq!(load_record::<_, Pair>(&mut store, "ns", "short"), None);
        assert_eq!(load_record::<_, Pair>(&mut store, "ns", "long"), None);
    }

    #[test]
    fn when_backend_fails_load_returns_none() {
        let mut store = FlakyStore::default();
        save_record(&mut store, "ns", "key", &Pair(1, 2)).unwrap();
        store.unavailable = true;
        assert_eq!(load_record::<_, Pair>(&mut store, "ns", "key"), None);
    }

    #[test]
    fn records_over_the_scratch_size_are_refused() {
        let mut store = MemoryStore::<4>::new();
        assert_eq!(
            save_record(&mut store, "ns", "key", &Huge),
            Err(StoreError::TooLarge)
        );
        assert!(load_record::<_, Huge>(&mut store, "ns", "key").is_none());
    }

    #[test]
    fn same_key_in_different_namespaces_does_not_collide() {
        let mut store = MemoryStore::<4>::new();
        save_record(&mut store, "a", "cfg", &Pair(1, 1)).unwrap();
        save_record(&mut store, "b", "cfg", &Pair(2, 2)).unwrap();
        assert_eq!(load_record(&mut store, "a", "cfg"), Some(Pair(1, 1)));
        assert_eq!(load_record(&mut store, "b", "cfg"), Some(Pair(2, 2)));
    }
}
