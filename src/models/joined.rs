use crate::models::{StatisticsTable, TractFeature, TractStatistics};

/// A tract boundary with its statistics, if the statistics table had the tract.
#[derive(Debug, Clone)]
pub struct JoinedTract {
    pub feature: TractFeature,
    pub statistics: Option<TractStatistics>,
}

impl JoinedTract {
    pub fn tract(&self) -> &str {
        &self.feature.tract
    }

    pub fn is_matched(&self) -> bool {
        self.statistics.is_some()
    }

    /// Value of the variable at `column`, null when unmatched or missing
    pub fn value(&self, column: usize) -> Option<f64> {
        self.statistics
            .as_ref()
            .and_then(|s| s.values.get(column).copied().flatten())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinReport {
    pub geometry_rows: usize,
    pub matched_rows: usize,
    pub unmatched_geometry: Vec<String>,
    pub orphaned_statistics: Vec<String>,
}

impl JoinReport {
    pub fn summary(&self) -> String {
        format!(
            "{} tracts joined: {} matched, {} without statistics, {} statistics rows without geometry",
            self.geometry_rows,
            self.matched_rows,
            self.unmatched_geometry.len(),
            self.orphaned_statistics.len()
        )
    }
}

/// Output of the geometry-side left join.
#[derive(Debug, Clone)]
pub struct JoinedTable {
    pub variables: Vec<String>,
    pub rows: Vec<JoinedTract>,
    pub report: JoinReport,
}

impl JoinedTable {
    pub fn new(statistics: &StatisticsTable, rows: Vec<JoinedTract>, report: JoinReport) -> Self {
        Self {
            variables: statistics.variables().to_vec(),
            rows,
            report,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
