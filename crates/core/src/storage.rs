use crate::error::IndexError;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Blob-per-document storage: one `{doc_id}.pdf` per uploaded file. The
/// blob and the vector-index partition share the same `doc_id`, so deleting
/// a document is two independently idempotent halves.
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, IndexError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, doc_id: &str) -> PathBuf {
        self.dir.join(format!("{doc_id}.pdf"))
    }

    pub fn save(&self, doc_id: &str, bytes: &[u8]) -> Result<PathBuf, IndexError> {
        let path = self.path_for(doc_id);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    pub fn exists(&self, doc_id: &str) -> bool {
        self.path_for(doc_id).exists()
    }

    /// Remove the stored blob. `Ok(false)` when it was already gone.
    pub fn remove(&self, doc_id: &str) -> Result<bool, IndexError> {
        let path = self.path_for(doc_id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }
}

pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn discover_pdf_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn save_and_remove_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = UploadStore::open(dir.path().join("uploads"))?;

        let path = store.save("doc-1", b"%PDF-1.4\n%fake")?;
        assert!(path.exists());
        assert!(store.exists("doc-1"));

        assert!(store.remove("doc-1")?);
        assert!(!store.exists("doc-1"));
        Ok(())
    }

    #[test]
    fn removing_an_absent_blob_is_not_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = UploadStore::open(dir.path())?;
        assert!(!store.remove("never-uploaded")?);
        Ok(())
    }

    #[test]
    fn checksum_is_reproducible() {
        assert_eq!(digest_bytes(b"abc"), digest_bytes(b"abc"));
        assert_ne!(digest_bytes(b"abc"), digest_bytes(b"abd"));
    }

    #[test]
    fn discover_pdf_files_is_recursive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        File::create(base.join("a.pdf")).and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(nested.join("b.PDF"))
            .and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(base.join("notes.txt")).and_then(|mut file| file.write_all(b"text"))?;

        let files = discover_pdf_files(base);
        assert_eq!(files.len(), 2);
        Ok(())
    }
}
