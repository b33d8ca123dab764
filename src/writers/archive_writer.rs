use crate::error::{ExtractError, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Bundles the files of a shapefile set into one deflated zip archive.
pub struct ArchiveWriter;

impl ArchiveWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write `files` flat into `{shp stem}.zip` beside the shapefile
    pub fn bundle(&self, shp_path: &Path, files: &[PathBuf]) -> Result<PathBuf> {
        let archive_path = shp_path.with_extension("zip");
        let file = File::create(&archive_path)
            .map_err(ExtractError::file_access("create", &archive_path))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for path in files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .ok_or_else(|| {
                    ExtractError::InvalidInput(format!("Not a file path: {}", path.display()))
                })?;
            zip.start_file(name, options)?;
            let mut source = File::open(path).map_err(ExtractError::file_access("open", path))?;
            std::io::copy(&mut source, &mut zip)
                .map_err(ExtractError::file_access("write", &archive_path))?;
        }

        zip.finish()?;
        info!(path = %archive_path.display(), files = files.len(), "archive written");
        Ok(archive_path)
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}
