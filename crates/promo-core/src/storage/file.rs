use super::memory::apply_writes;
use crate::interface::{PrefStore, PrefValue, PrefWrite, StoreError};
use std::{
    cell::RefCell,
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

///
/// JsonFilePrefStore
///
/// Whole-document JSON store. Every batch rewrites the document once through
/// a sibling temp file and a rename, so a crash leaves either the old or the
/// new document on disk. The in-memory map only changes once the write lands.
///

#[derive(Debug)]
pub struct JsonFilePrefStore {
    path: PathBuf,
    values: RefCell<BTreeMap<String, PrefValue>>,
}

impl JsonFilePrefStore {
    /// Open the document at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let values = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(io_error(&path, &e)),
        };

        Ok(Self {
            path,
            values: RefCell::new(values),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn commit(&self, next: BTreeMap<String, PrefValue>) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec_pretty(&next).map_err(|e| StoreError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes).map_err(|e| io_error(&tmp, &e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, &e))?;

        *self.values.borrow_mut() = next;

        Ok(())
    }
}

impl PrefStore for JsonFilePrefStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values.borrow().get(key).cloned()
    }

    fn write_all(&self, writes: Vec<PrefWrite<'_>>) -> Result<(), StoreError> {
        let mut next = self.values.borrow().clone();
        apply_writes(&mut next, writes);

        if next == *self.values.borrow() {
            return Ok(());
        }

        self.commit(next)
    }
}

fn io_error(path: &Path, err: &io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

///
/// TESTS
///
