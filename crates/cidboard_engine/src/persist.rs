use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

const MAX_NUMBERED_COPIES: u32 = 999;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("no free file name for {0}")]
    NamesExhausted(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the download directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(PersistError::OutputDir("path is not a directory".into())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        }
        Err(err) => return Err(PersistError::OutputDir(err.to_string())),
    }
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Writes into a directory via temp file + rename, so a failed download never
/// leaves a truncated file under the final name.
pub struct AtomicFileWriter {
    dir: PathBuf,
    overwrite: bool,
}

impl AtomicFileWriter {
    /// Existing files are kept; new ones get a ` (n)` suffix like a browser would.
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            overwrite: false,
        }
    }

    pub fn overwriting(dir: PathBuf) -> Self {
        Self {
            dir,
            overwrite: true,
        }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        if self.overwrite {
            let target = self.dir.join(filename);
            tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
            return Ok(target);
        }

        for copy in 0..=MAX_NUMBERED_COPIES {
            let target = self.dir.join(numbered(filename, copy));
            match tmp.persist_noclobber(&target) {
                Ok(_) => return Ok(target),
                Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                    tmp = err.file;
                }
                Err(err) => return Err(PersistError::Io(err.error)),
            }
        }
        Err(PersistError::NamesExhausted(filename.to_string()))
    }
}

/// `report.xlsx`, `report (1).xlsx`, `report (2).xlsx`, ...
fn numbered(filename: &str, copy: u32) -> String {
    if copy == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({copy}).{ext}"),
        _ => format!("{filename} ({copy})"),
    }
}
