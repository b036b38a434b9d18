//! Persisting run artifacts as pretty-printed JSON.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use tempfile::NamedTempFile;

use crate::EtfError;
use crate::profile::FundProfile;

/// Name of the aggregate error file of the profile pipeline.
pub const PROFILE_ERRORS_FILE: &str = "errors.json";

/// Failed identifiers and their messages, in processing order.
///
/// Serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEntries(Vec<(String, String)>);

impl ErrorEntries {
    /// An empty set of entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` against `id`.
    pub fn push(&mut self, id: impl Into<String>, message: impl Into<String>) {
        self.0.push((id.into(), message.into()));
    }

    /// Whether no identifier has failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed identifiers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The message recorded for `id`, if it failed.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == id).map(|(_, v)| v.as_str())
    }
}

impl Serialize for ErrorEntries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Writes per-ISIN profiles and the error file into one directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    /// A writer rooted at `output_dir`, created on first write.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Writes `<dir>/<ISIN>.json`, replacing any earlier copy.
    ///
    /// # Errors
    ///
    /// Returns [`EtfError::Write`] if the ISIN is not a plain file name or the
    /// file cannot be written.
    pub fn write_profile(&self, profile: &FundProfile) -> Result<PathBuf, EtfError> {
        let path = self.artifact_path(&profile.isin)?;
        write_json_atomic(&path, profile)?;
        Ok(path)
    }

    /// Writes `<dir>/errors.json`.
    ///
    /// # Errors
    ///
    /// Returns [`EtfError::Write`] if the file cannot be written.
    pub fn write_errors(&self, errors: &ErrorEntries) -> Result<PathBuf, EtfError> {
        let path = self.output_dir.join(PROFILE_ERRORS_FILE);
        write_json_atomic(&path, errors)?;
        Ok(path)
    }

    fn artifact_path(&self, id: &str) -> Result<PathBuf, EtfError> {
        let path = self.output_dir.join(format!("{id}.json"));
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
            return Err(EtfError::write(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("`{id}` is not a valid file name"),
                ),
            ));
        }
        Ok(path)
    }
}

/// Serializes `value` to `path` with two-space indentation.
///
/// The JSON goes to a temporary file next to `path` which is then renamed
/// over it, so readers see either the old or the new artifact. Missing parent
/// directories are created.
///
/// # Errors
///
/// Returns [`EtfError::Write`] on any I/O failure.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), EtfError> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|e| EtfError::write(path, e.into()))?;
    bytes.push(b'\n');

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| EtfError::write(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| EtfError::write(path, e))?;
    // Temp files are created owner-only; artifacts get the usual 0644.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(|e| EtfError::write(path, e))?;
    }
    tmp.write_all(&bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| EtfError::write(path, e))?;
    tmp.persist(path).map_err(|e| EtfError::write(path, e.error))?;
    Ok(())
}
