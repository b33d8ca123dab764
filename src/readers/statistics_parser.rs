use crate::error::{ExtractError, Result};
use crate::models::{
    CoercionIssue, CoercionIssueKind, CoercionReport, StatisticsTable, TractStatistics,
};
use crate::utils::constants::{
    ANNOTATION_SENTINELS, COUNTY_COLUMN, ERROR_BODY_EXCERPT, LABEL_COLUMN, STATE_COLUMN,
    TRACT_COLUMN,
};
use serde_json::Value;
use tracing::{debug, warn};

const SERVICE: &str = "Census statistics";

/// Turns the Census data API table response into a [`StatisticsTable`].
///
/// The response is a JSON array of arrays whose first row is the header.
/// Requested variables are coerced to `f64`; cells that cannot be coerced
/// become nulls and are listed in the [`CoercionReport`], unless strict mode
/// is on, in which case non-numeric text aborts the parse.
pub struct StatisticsParser {
    strict: bool,
}

struct ColumnIndex {
    tract: usize,
    label: usize,
    state: Option<usize>,
    county: Option<usize>,
    variables: Vec<usize>,
}

impl StatisticsParser {
    pub fn new() -> Self {
        Self { strict: false }
    }

    pub fn with_strict(strict: bool) -> Self {
        Self { strict }
    }

    pub fn parse(
        &self,
        body: &str,
        variables: &[String],
    ) -> Result<(StatisticsTable, CoercionReport)> {
        if body.trim().is_empty() {
            return Err(malformed("empty response body".to_string()));
        }

        let rows: Vec<Vec<Value>> = serde_json::from_str(body).map_err(|e| {
            malformed(format!("{} in body: {}", e, excerpt(body)))
        })?;

        let mut rows = rows.into_iter();
        let header = rows
            .next()
            .ok_or_else(|| malformed("response has no header row".to_string()))?;
        let header = header
            .iter()
            .map(|cell| cell_text(cell).unwrap_or_default())
            .collect::<Vec<_>>();
        let columns = self.index_columns(&header, variables)?;

        let mut table = StatisticsTable::new(variables.to_vec());
        let mut report = CoercionReport::default();

        for (row_number, row) in rows.enumerate() {
            // header is row 0
            let row_number = row_number + 1;
            if row.len() != header.len() {
                return Err(malformed(format!(
                    "row {} has {} cells, header has {}",
                    row_number,
                    row.len(),
                    header.len()
                )));
            }

            let tract = cell_text(&row[columns.tract]).ok_or_else(|| {
                malformed(format!("row {} has no tract identifier", row_number))
            })?;

            let mut values = Vec::with_capacity(variables.len());
            for (variable, &column) in variables.iter().zip(&columns.variables) {
                report.total_cells += 1;
                let raw = cell_text(&row[column]);
                match coerce(raw.as_deref()) {
                    Ok(value) => values.push(Some(value)),
                    Err(kind) => {
                        if self.strict && kind == CoercionIssueKind::NonNumeric {
                            return Err(ExtractError::TypeCoercion {
                                variable: variable.clone(),
                                tract,
                                value: raw.unwrap_or_default(),
                            });
                        }
                        debug!(%tract, %variable, ?raw, %kind, "statistic coerced to null");
                        report.record(CoercionIssue {
                            tract: tract.clone(),
                            variable: variable.clone(),
                            raw_value: raw,
                            kind,
                        });
                        values.push(None);
                    }
                }
            }

            table.insert(TractStatistics {
                tract,
                name: cell_text(&row[columns.label]).unwrap_or_default(),
                state: columns
                    .state
                    .and_then(|i| cell_text(&row[i]))
                    .unwrap_or_default(),
                county: columns
                    .county
                    .and_then(|i| cell_text(&row[i]))
                    .unwrap_or_default(),
                values,
            });
        }

        let non_numeric = report.count(CoercionIssueKind::NonNumeric);
        if non_numeric > 0 {
            warn!(cells = non_numeric, "non-numeric statistics replaced with nulls");
        }

        Ok((table, report))
    }

    fn index_columns(&self, header: &[String], variables: &[String]) -> Result<ColumnIndex> {
        let find = |name: &str| header.iter().position(|h| h == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                malformed(format!(
                    "column '{}' missing from header [{}]",
                    name,
                    header.join(", ")
                ))
            })
        };

        Ok(ColumnIndex {
            tract: require(TRACT_COLUMN)?,
            label: require(LABEL_COLUMN)?,
            state: find(STATE_COLUMN),
            county: find(COUNTY_COLUMN),
            variables: variables
                .iter()
                .map(|v| require(v))
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

impl Default for StatisticsParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert one raw cell to a number or classify why it cannot be one
pub fn coerce(raw: Option<&str>) -> std::result::Result<f64, CoercionIssueKind> {
    let text = match raw.map(str::trim) {
        None | Some("") => return Err(CoercionIssueKind::Missing),
        Some(text) => text,
    };

    let value = text
        .parse::<f64>()
        .map_err(|_| CoercionIssueKind::NonNumeric)?;

    if !value.is_finite() {
        return Err(CoercionIssueKind::NonNumeric);
    }
    if ANNOTATION_SENTINELS.contains(&value) {
        return Err(CoercionIssueKind::Annotation);
    }

    Ok(value)
}

fn cell_text(cell: &Value) -> Option<String> {
    match cell {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn malformed(details: String) -> ExtractError {
    ExtractError::MalformedResponse {
        service: SERVICE,
        details,
    }
}

/// Leading part of a response body for error messages
pub fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(ERROR_BODY_EXCERPT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
