pub mod archive_writer;
pub mod shapefile_writer;

pub use archive_writer::ArchiveWriter;
pub use shapefile_writer::{dbf_field_names, ShapefileInfo, ShapefileWriter};
