use std::{
    fs,
    io::{self, Cursor, Read},
    path::{Path, PathBuf},
};
use thiserror::Error;

const EMBEDDED_PAYLOAD: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/payload.zip"));

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload entry {0:?} not found")]
    NotFound(String),
    #[error("payload archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read-only catalog of the files bundled into this executable, keyed by
/// logical filename.
#[derive(Debug, Clone, Copy)]
pub struct PayloadStore {
    bytes: &'static [u8],
}

pub fn embedded() -> PayloadStore {
    PayloadStore::from_bytes(EMBEDDED_PAYLOAD)
}

impl PayloadStore {
    pub fn from_bytes(bytes: &'static [u8]) -> Self {
        Self { bytes }
    }

    fn archive(&self) -> Result<zip::ZipArchive<Cursor<&'static [u8]>>, PayloadError> {
        Ok(zip::ZipArchive::new(Cursor::new(self.bytes))?)
    }

    /// Match a logical name against the catalog: exact first, then by
    /// suffix, ignoring ASCII case in both. Suffix ties resolve to the
    /// lexicographically first entry so lookups stay deterministic.
    pub fn resolve(&self, logical: &str) -> Option<String> {
        let archive = self.archive().ok()?;
        let wanted = logical.to_ascii_lowercase();
        let mut suffix_matches = Vec::new();
        for name in archive.file_names() {
            let lower = name.to_ascii_lowercase();
            if lower == wanted {
                return Some(name.to_string());
            }
            if lower.ends_with(&wanted) {
                suffix_matches.push(name.to_string());
            }
        }
        suffix_matches.sort();
        suffix_matches.into_iter().next()
    }

    pub fn exists(&self, logical: &str) -> bool {
        self.resolve(logical).is_some()
    }

    pub fn read(&self, logical: &str) -> Result<Vec<u8>, PayloadError> {
        let resolved = self
            .resolve(logical)
            .ok_or_else(|| PayloadError::NotFound(logical.to_string()))?;
        let mut archive = self.archive()?;
        let mut entry = archive.by_name(&resolved)?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|source| PayloadError::Io {
                path: PathBuf::from(&resolved),
                source,
            })?;
        Ok(bytes)
    }

    /// Stream an entry to `dest`, creating or overwriting the file. A
    /// failed copy may leave a truncated file behind.
    pub fn extract(&self, logical: &str, dest: &Path) -> Result<(), PayloadError> {
        let resolved = self
            .resolve(logical)
            .ok_or_else(|| PayloadError::NotFound(logical.to_string()))?;
        let mut archive = self.archive()?;
        let mut entry = archive.by_name(&resolved)?;

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| PayloadError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut out = fs::File::create(dest).map_err(|source| PayloadError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        io::copy(&mut entry, &mut out).map_err(|source| PayloadError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}
