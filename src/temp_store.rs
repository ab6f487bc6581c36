//! Temporary storage for resized output.
//!
//! [`TempFileStore`] persists encoded bytes and hands back an opaque handle.
//! [`TempOutputs`] keeps the handles of one resize call in
//! most-recent-first order, so callers can clean up in reverse order or grab
//! the latest artifact directly.

use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Where encoded resize output goes.
pub trait TempFileStore {
    type Handle;

    /// Persist the bytes, returning a handle to the stored artifact.
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<Self::Handle>;
}

/// Handles of one resize call's temp outputs, newest first.
///
/// Owned exclusively by the resize call that populates it; concurrent resizes
/// of the same record must be serialized by the caller.
#[derive(Debug)]
pub struct TempOutputs<H> {
    handles: VecDeque<H>,
}

impl<H> TempOutputs<H> {
    pub fn new() -> Self {
        Self {
            handles: VecDeque::new(),
        }
    }

    /// Push a handle onto the front of the list.
    pub fn record(&mut self, handle: H) {
        self.handles.push_front(handle);
    }

    /// The most recently recorded handle.
    pub fn latest(&self) -> Option<&H> {
        self.handles.front()
    }

    /// Handles in most-recent-first order.
    pub fn iter(&self) -> impl Iterator<Item = &H> {
        self.handles.iter()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl<H> Default for TempOutputs<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// File-backed store writing into a private temp directory.
///
/// Files live until the store is dropped; the directory and its contents are
/// removed with it.
#[derive(Debug)]
pub struct TempDirStore {
    dir: TempDir,
    next_id: u64,
}

impl TempDirStore {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
            next_id: 0,
        })
    }
}

impl TempFileStore for TempDirStore {
    type Handle = PathBuf;

    fn write(&mut self, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(format!("resize-{:04}.bin", self.next_id));
        self.next_id += 1;
        let mut file = std::fs::File::create(&path)?;
        file.write_all(bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// In-memory store for pipeline tests; handles are indices into `writes`.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        pub writes: Vec<Vec<u8>>,
    }

    impl TempFileStore for MemoryStore {
        type Handle = usize;

        fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
            self.writes.push(bytes.to_vec());
            Ok(self.writes.len() - 1)
        }
    }

    #[test]
    fn outputs_are_ordered_most_recent_first() {
        let mut outputs = TempOutputs::new();
        outputs.record("first");
        outputs.record("second");
        outputs.record("third");

        assert_eq!(outputs.latest(), Some(&"third"));
        let ordered: Vec<_> = outputs.iter().copied().collect();
        assert_eq!(ordered, vec!["third", "second", "first"]);
        assert_eq!(outputs.len(), 3);
    }

    #[test]
    fn temp_dir_store_persists_bytes() {
        let mut store = TempDirStore::new().unwrap();
        let a = store.write(b"alpha").unwrap();
        let b = store.write(b"beta").unwrap();

        assert_ne!(a, b);
        assert_eq!(std::fs::read(&a).unwrap(), b"alpha");
        assert_eq!(std::fs::read(&b).unwrap(), b"beta");
    }

    #[test]
    fn temp_dir_store_cleans_up_on_drop() {
        let mut store = TempDirStore::new().unwrap();
        let path = store.write(b"gone soon").unwrap();
        assert!(path.exists());
        drop(store);
        assert!(!path.exists());
    }
}
