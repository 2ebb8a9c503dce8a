use promo_core::interface::{PromoCodeFile, PromoFileError};
use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

const LOCATION: &str = "<fake>/promoCode";

///
/// FakePromoFile
/// In-memory promo-code artifact. Thread-safe because reads and deletes run
/// on the blocking pool.
///

#[derive(Debug, Default)]
pub struct FakePromoFile {
    contents: Mutex<Option<String>>,
    fail_read: AtomicBool,
    fail_delete: AtomicBool,
    reads: AtomicUsize,
    deletes: AtomicUsize,
}

impl FakePromoFile {
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_contents(contents: &str) -> Self {
        let file = Self::default();
        file.write(contents);

        file
    }

    pub fn write(&self, contents: &str) {
        *self.lock() = Some(contents.to_string());
    }

    pub fn fail_reads(&self) {
        self.fail_read.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.lock().clone()
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.lock().is_some()
    }

    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.contents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PromoCodeFile for FakePromoFile {
    fn location(&self) -> String {
        LOCATION.to_string()
    }

    fn exists(&self) -> bool {
        self.is_present()
    }

    fn read_to_string(&self) -> Result<String, PromoFileError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if self.fail_read.load(Ordering::SeqCst) {
            return Err(PromoFileError::Read {
                path: LOCATION.to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        Ok(self.contents().unwrap_or_default())
    }

    fn delete(&self) -> Result<(), PromoFileError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);

        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(PromoFileError::Delete {
                path: LOCATION.to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        *self.lock() = None;
        Ok(())
    }
}
