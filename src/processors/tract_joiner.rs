use crate::models::{GeometryCollection, JoinReport, JoinedTable, JoinedTract, StatisticsTable};
use std::collections::HashSet;
use tracing::{debug, info};

/// Left join of tract geometry to tract statistics.
///
/// Every geometry feature produces exactly one output row. Statistics rows
/// without a boundary are dropped and listed in the [`JoinReport`]. Rows come
/// out sorted by tract id.
pub struct TractJoiner;

impl TractJoiner {
    pub fn new() -> Self {
        Self
    }

    pub fn join(&self, geometry: GeometryCollection, statistics: &StatisticsTable) -> JoinedTable {
        let mut report = JoinReport {
            geometry_rows: geometry.features.len(),
            ..Default::default()
        };
        let mut seen = HashSet::with_capacity(geometry.features.len());

        let mut rows: Vec<JoinedTract> = geometry
            .features
            .into_iter()
            .map(|feature| {
                let matched = statistics.get(&feature.tract).cloned();
                if matched.is_some() {
                    report.matched_rows += 1;
                } else {
                    debug!(tract = %feature.tract, "no statistics for tract");
                    report.unmatched_geometry.push(feature.tract.clone());
                }
                seen.insert(feature.tract.clone());
                JoinedTract {
                    feature,
                    statistics: matched,
                }
            })
            .collect();

        report.orphaned_statistics = statistics
            .rows()
            .iter()
            .filter(|row| !seen.contains(&row.tract))
            .map(|row| row.tract.clone())
            .collect();

        rows.sort_by(|a, b| a.feature.tract.cmp(&b.feature.tract));

        info!("{}", report.summary());
        JoinedTable::new(statistics, rows, report)
    }
}

impl Default for TractJoiner {
    fn default() -> Self {
        Self::new()
    }
}
