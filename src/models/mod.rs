pub mod fips;
pub mod geometry;
pub mod joined;
pub mod request;
pub mod statistics;

pub use fips::{FipsCodes, FipsLookup, FipsRecord};
pub use geometry::{GeometryCollection, PolygonPart, Ring, TractFeature};
pub use joined::{JoinReport, JoinedTable, JoinedTract};
pub use request::{parse_variables, AcsDataset, ExtractRequest};
pub use statistics::{
    CoercionIssue, CoercionIssueKind, CoercionReport, StatisticsTable, TractStatistics,
};
