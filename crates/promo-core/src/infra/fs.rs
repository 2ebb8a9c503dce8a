use crate::interface::{PromoCodeFile, PromoFileError};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

///
/// FsPromoCodeFile
/// The promo-code artifact on local disk.
///

#[derive(Clone, Debug)]
pub struct FsPromoCodeFile {
    path: PathBuf,
}

impl FsPromoCodeFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PromoCodeFile for FsPromoCodeFile {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read_to_string(&self) -> Result<String, PromoFileError> {
        fs::read_to_string(&self.path).map_err(|e| PromoFileError::Read {
            path: self.location(),
            reason: e.to_string(),
        })
    }

    fn delete(&self) -> Result<(), PromoFileError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(PromoFileError::Delete {
                path: self.location(),
                reason: e.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_then_deletes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("promoCode");
        fs::write(&path, "  WINTER2020\n").unwrap();

        let file = FsPromoCodeFile::new(&path);
        assert!(file.exists());
        assert_eq!(file.read_to_string().unwrap(), "  WINTER2020\n");

        file.delete().unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn deleting_missing_file_succeeds() {
        let dir = tempdir().unwrap();
        let file = FsPromoCodeFile::new(dir.path().join("promoCode"));

        assert!(!file.exists());
        file.delete().unwrap();
    }

    #[test]
    fn directory_is_not_an_artifact() {
        let dir = tempdir().unwrap();
        let file = FsPromoCodeFile::new(dir.path());

        assert!(!file.exists());
    }
}
