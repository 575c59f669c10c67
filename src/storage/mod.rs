//! # Persistence Layer
//!
//! File-backed persistence with atomic replace semantics. Every write goes
//! to a sibling `.tmp` file first and is renamed into place, so the
//! enforcement engine (and a restarting control plane) never observes a
//! partially written document.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{Error, Result};

/// Create the directory (and parents) if missing.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| Error::io(e, format!("creating directory {}", path.display())))
}

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
pub fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)
        .map_err(|e| Error::serialization(e, format!("encoding {}", path.display())))?;

    let tmp = tmp_path(path);
    fs::write(&tmp, &data).map_err(|e| Error::io(e, format!("writing {}", tmp.display())))?;

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::io(e, format!("replacing {}", path.display())));
    }
    Ok(())
}

/// Read and deserialize a JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data =
        fs::read(path).map_err(|e| Error::io(e, format!("reading {}", path.display())))?;
    serde_json::from_slice(&data)
        .map_err(|e| Error::serialization(e, format!("decoding {}", path.display())))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        count: u32,
    }

    #[test]
    fn test_atomic_write_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");

        let doc = Doc { name: "example".into(), count: 3 };
        atomic_write_json(&path, &doc).unwrap();
        let loaded: Doc = read_json(&path).unwrap();
        assert_eq!(loaded, doc);

        // No temp file left behind
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_replace_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");

        atomic_write_json(&path, &Doc { name: "a".into(), count: 1 }).unwrap();
        atomic_write_json(&path, &Doc { name: "b".into(), count: 2 }).unwrap();

        let loaded: Doc = read_json(&path).unwrap();
        assert_eq!(loaded.name, "b");
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json::<Doc>(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
