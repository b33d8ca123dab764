pub mod fips_reader;
pub mod geometry_parser;
pub mod statistics_parser;

pub use fips_reader::FipsReader;
pub use geometry_parser::GeometryParser;
pub use statistics_parser::StatisticsParser;
