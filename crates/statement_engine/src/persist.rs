use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use harvest_logging::harvest_info;
use tempfile::NamedTempFile;
use thiserror::Error;

pub const STATEMENT_FILENAME: &str = "statement.txt";
pub const IMAGES_DIRNAME: &str = "images";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory {path:?} missing or not writable: {message}")]
    OutputDir { path: PathBuf, message: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure `dir` exists and is writable; create it if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let fail = |message: String| PersistError::OutputDir {
        path: dir.to_path_buf(),
        message,
    };
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| fail(e.to_string()))?;
        if !meta.is_dir() {
            return Err(fail("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| fail(e.to_string()))?;
        harvest_info!("Created output directory {:?}", dir);
    }
    // Writability probe; the temp file is removed on drop.
    NamedTempFile::new_in(dir).map_err(|e| fail(e.to_string()))?;
    Ok(())
}

/// `<root>/statement.txt` plus `<root>/images/formula_NNN.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIRNAME)
    }

    pub fn statement_path(&self) -> PathBuf {
        self.root.join(STATEMENT_FILENAME)
    }

    /// Create both directories. Failure here aborts the run.
    pub fn prepare(&self) -> Result<(), PersistError> {
        ensure_output_dir(&self.root)?;
        ensure_output_dir(&self.images_dir())
    }

    /// Atomically replace `statement.txt` with `text`.
    pub fn write_statement(&self, text: &str) -> Result<PathBuf, PersistError> {
        let target = self.statement_path();
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            tmp.write_all(b"\n")?;
        }
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        harvest_info!("Wrote statement to {:?}", target);
        Ok(target)
    }
}
