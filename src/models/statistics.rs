use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Statistics for one tract, values ordered like [`StatisticsTable::variables`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TractStatistics {
    pub tract: String,
    pub name: String,
    pub state: String,
    pub county: String,
    pub values: Vec<Option<f64>>,
}

/// Parsed statistics response keyed by tract identifier.
#[derive(Debug, Clone, Default)]
pub struct StatisticsTable {
    variables: Vec<String>,
    rows: Vec<TractStatistics>,
    index: HashMap<String, usize>,
}

impl StatisticsTable {
    pub fn new(variables: Vec<String>) -> Self {
        Self {
            variables,
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add a row. A later row for the same tract replaces the earlier one.
    pub fn insert(&mut self, row: TractStatistics) {
        if let Some(&position) = self.index.get(&row.tract) {
            self.rows[position] = row;
        } else {
            self.index.insert(row.tract.clone(), self.rows.len());
            self.rows.push(row);
        }
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn rows(&self) -> &[TractStatistics] {
        &self.rows
    }

    pub fn get(&self, tract: &str) -> Option<&TractStatistics> {
        self.index.get(tract).map(|&i| &self.rows[i])
    }

    pub fn value(&self, tract: &str, variable: &str) -> Option<f64> {
        let column = self.variables.iter().position(|v| v == variable)?;
        self.get(tract)?.values.get(column).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoercionIssueKind {
    /// JSON null or empty string
    Missing,
    /// One of the Census annotation sentinel values
    Annotation,
    /// Text that does not parse as a number
    NonNumeric,
}

impl fmt::Display for CoercionIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercionIssueKind::Missing => write!(f, "missing"),
            CoercionIssueKind::Annotation => write!(f, "annotation"),
            CoercionIssueKind::NonNumeric => write!(f, "non-numeric"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoercionIssue {
    pub tract: String,
    pub variable: String,
    pub raw_value: Option<String>,
    pub kind: CoercionIssueKind,
}

/// Cells that could not be turned into a number; each became a null.
#[derive(Debug, Clone, Default)]
pub struct CoercionReport {
    pub total_cells: usize,
    pub issues: Vec<CoercionIssue>,
}

impl CoercionReport {
    pub fn record(&mut self, issue: CoercionIssue) {
        self.issues.push(issue);
    }

    pub fn count(&self, kind: CoercionIssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} cells coerced, {} null ({} missing, {} annotated, {} non-numeric)",
            self.total_cells,
            self.issues.len(),
            self.count(CoercionIssueKind::Missing),
            self.count(CoercionIssueKind::Annotation),
            self.count(CoercionIssueKind::NonNumeric),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tract: &str, value: Option<f64>) -> TractStatistics {
        TractStatistics {
            tract: tract.to_string(),
            name: format!("Census Tract {}", tract),
            state: "06".to_string(),
            county: "037".to_string(),
            values: vec![value],
        }
    }

    #[test]
    fn test_lookup_by_tract() {
        let mut table = StatisticsTable::new(vec!["DP05_0001E".to_string()]);
        table.insert(row("101110", Some(4283.0)));
        table.insert(row("101122", None));

        assert_eq!(table.len(), 2);
        assert_eq!(table.value("101110", "DP05_0001E"), Some(4283.0));
        assert_eq!(table.value("101122", "DP05_0001E"), None);
        assert_eq!(table.value("101110", "DP03_0062E"), None);
        assert!(table.get("999999").is_none());
    }

    #[test]
    fn test_duplicate_tract_replaces_row() {
        let mut table = StatisticsTable::new(vec!["DP05_0001E".to_string()]);
        table.insert(row("101110", Some(1.0)));
        table.insert(row("101110", Some(2.0)));

        assert_eq!(table.len(), 1);
        assert_eq!(table.value("101110", "DP05_0001E"), Some(2.0));
    }

    #[test]
    fn test_report_summary() {
        let mut report = CoercionReport {
            total_cells: 4,
            ..Default::default()
        };
        report.record(CoercionIssue {
            tract: "101110".to_string(),
            variable: "DP05_0001E".to_string(),
            raw_value: Some("-666666666".to_string()),
            kind: CoercionIssueKind::Annotation,
        });

        assert!(!report.is_clean());
        assert_eq!(
            report.summary(),
            "4 cells coerced, 1 null (0 missing, 1 annotated, 0 non-numeric)"
        );
    }
}
