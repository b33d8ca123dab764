use crate::error::{ExtractError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Process-local staging area for intermediate response files.
///
/// Every run gets its own directory, removed when the value is dropped, so
/// concurrent runs never share an intermediate file.
pub struct ScratchSpace {
    temp_dir: TempDir,
    staged_files: HashMap<String, PathBuf>,
}

impl ScratchSpace {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("acs-extract-")
            .tempdir()
            .map_err(ExtractError::file_access(
                "create scratch directory in",
                &std::env::temp_dir(),
            ))?;

        Ok(Self {
            temp_dir,
            staged_files: HashMap::new(),
        })
    }

    fn dir_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `contents` under `file_name`, replacing any earlier file
    pub fn stage(&mut self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let dest_path = self.dir_path().join(file_name);

        let file =
            File::create(&dest_path).map_err(ExtractError::file_access("create", &dest_path))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(contents.as_bytes())
            .map_err(ExtractError::file_access("write", &dest_path))?;
        writer
            .flush()
            .map_err(ExtractError::file_access("write", &dest_path))?;

        debug!(path = %dest_path.display(), bytes = contents.len(), "staged file");
        self.staged_files
            .insert(file_name.to_string(), dest_path.clone());
        Ok(dest_path)
    }

    pub fn staged_file(&self, file_name: &str) -> Option<&PathBuf> {
        self.staged_files.get(file_name)
    }

    /// Copy a staged file out of the scratch directory before it is removed
    pub fn keep(&self, file_name: &str, destination: &Path) -> Result<PathBuf> {
        let source = self.staged_file(file_name).ok_or_else(|| {
            ExtractError::InvalidInput(format!("'{}' was never staged", file_name))
        })?;

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(ExtractError::file_access("create directory", parent))?;
            }
        }
        std::fs::copy(source, destination)
            .map_err(ExtractError::file_access("copy staged file to", destination))?;
        Ok(destination.to_path_buf())
    }
}
