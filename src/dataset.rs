// Data Loader - CSV → typed disbursement records
// The dataset is a fixed artifact, so any defect here aborts startup

use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const COL_COUNTRY: &str = "Country";
pub const COL_YEAR: &str = "Year";
pub const COL_DISBURSED: &str = "Disbursed Amount (US$)";
pub const COL_DEVIATION: &str = "deviation_from_avg";

/// Columns every downstream stage reads
pub const REQUIRED_COLUMNS: [&str; 4] = [COL_COUNTRY, COL_YEAR, COL_DISBURSED, COL_DEVIATION];

// ============================================================================
// RECORD
// ============================================================================

/// One row of the disbursement table.
/// Columns beyond the four below are ignored.
/// Numeric cells that are empty or NaN load as `None` (missing).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Record {
    #[serde(rename = "Country")]
    pub country: String,

    #[serde(rename = "Year")]
    pub year: i32,

    #[serde(rename = "Disbursed Amount (US$)", deserialize_with = "missing_as_none")]
    pub disbursed_amount: Option<f64>,

    /// Signed distance from the peer-group mean, taken as-is from the file
    #[serde(rename = "deviation_from_avg", deserialize_with = "missing_as_none")]
    pub deviation_from_avg: Option<f64>,
}

impl Record {
    /// NaN arguments are stored as missing
    pub fn new(country: &str, year: i32, disbursed_amount: f64, deviation_from_avg: f64) -> Self {
        Record {
            country: country.to_string(),
            year,
            disbursed_amount: present(disbursed_amount),
            deviation_from_avg: present(deviation_from_avg),
        }
    }
}

fn present(value: f64) -> Option<f64> {
    Some(value).filter(|v| !v.is_nan())
}

// csv maps an empty field to None for Option<T>; a literal NaN is folded in too
fn missing_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.and_then(present))
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("dataset is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("malformed row at line {line}")]
    Parse {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read dataset")]
    Csv(#[from] csv::Error),
}

// ============================================================================
// DATASET
// ============================================================================

/// The loaded table: header order plus every record in file order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    column_names: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset directly from records (header = the required columns)
    pub fn from_records(records: Vec<Record>) -> Self {
        Dataset {
            column_names: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            records,
        }
    }

    /// Parse CSV from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::read_all(&mut rdr)
    }

    fn read_all<R: Read>(rdr: &mut csv::Reader<R>) -> Result<Self, DatasetError> {
        let headers = rdr.headers()?.clone();
        let column_names: Vec<String> = headers.iter().map(|h| h.to_string()).collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !column_names.iter().any(|c| c == *required))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DatasetError::MissingColumns(missing));
        }

        let mut records = Vec::new();
        for (idx, row) in rdr.records().enumerate() {
            let row = row?;
            let line = row
                .position()
                .map(|p| p.line())
                .unwrap_or(idx as u64 + 2);

            let record: Record = row
                .deserialize(Some(&headers))
                .map_err(|source| DatasetError::Parse { line, source })?;
            records.push(record);
        }

        debug!(columns = column_names.len(), rows = records.len(), "parsed dataset");

        Ok(Dataset {
            column_names,
            records,
        })
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // Column views, each the full ordered sequence of one column

    pub fn countries(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.country.as_str()).collect()
    }

    pub fn years_column(&self) -> Vec<i32> {
        self.records.iter().map(|r| r.year).collect()
    }

    pub fn disbursed_column(&self) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.disbursed_amount).collect()
    }

    pub fn deviation_column(&self) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.deviation_from_avg).collect()
    }
}

/// Load the dataset from a CSV file on disk
pub fn load_csv(csv_path: &Path) -> Result<Dataset, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .map_err(|source| DatasetError::Open {
            path: csv_path.to_path_buf(),
            source,
        })?;

    let dataset = Dataset::read_all(&mut rdr)?;
    info!(path = %csv_path.display(), rows = dataset.len(), "loaded dataset");
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Country,Year,Disbursed Amount (US$),deviation_from_avg,Region
Kenya,2000,100,5,Africa
Nepal,2000,50,-5,Asia
Kenya,2001,200,10,Africa
";

    #[test]
    fn test_from_reader_parses_records_in_order() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.records()[0], Record::new("Kenya", 2000, 100.0, 5.0));
        assert_eq!(dataset.records()[1], Record::new("Nepal", 2000, 50.0, -5.0));
        assert_eq!(dataset.records()[2], Record::new("Kenya", 2001, 200.0, 10.0));
    }

    #[test]
    fn test_extra_columns_are_kept_in_header_only() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(dataset.column_names().len(), 5);
        assert_eq!(dataset.column_names()[4], "Region");
    }

    #[test]
    fn test_column_views() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(dataset.countries(), vec!["Kenya", "Nepal", "Kenya"]);
        assert_eq!(dataset.years_column(), vec![2000, 2000, 2001]);
        assert_eq!(dataset.disbursed_column(), vec![Some(100.0), Some(50.0), Some(200.0)]);
        assert_eq!(dataset.deviation_column(), vec![Some(5.0), Some(-5.0), Some(10.0)]);
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let csv = "Country,Year\nKenya,2000\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();

        match err {
            DatasetError::MissingColumns(cols) => {
                assert_eq!(cols, vec![COL_DISBURSED.to_string(), COL_DEVIATION.to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_value_reports_line() {
        let csv = "\
Country,Year,Disbursed Amount (US$),deviation_from_avg
Kenya,2000,100,5
Nepal,not-a-year,50,-5
";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();

        match err {
            DatasetError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_and_nan_cells_load_as_missing() {
        let csv = "\
Country,Year,Disbursed Amount (US$),deviation_from_avg
Kenya,2000,100,5
Nepal,2000,,-5
Chad,2000,20,NaN
";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.disbursed_column(), vec![Some(100.0), None, Some(20.0)]);
        assert_eq!(dataset.deviation_column(), vec![Some(5.0), Some(-5.0), None]);
    }

    #[test]
    fn test_non_numeric_amount_is_still_malformed() {
        let csv = "\
Country,Year,Disbursed Amount (US$),deviation_from_avg
Kenya,2000,lots,5
";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_header_only_file_is_empty_dataset() {
        let csv = "Country,Year,Disbursed Amount (US$),deviation_from_avg\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();

        assert!(dataset.is_empty());
    }

    #[test]
    fn test_load_csv_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let dataset = load_csv(file.path()).unwrap();
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn test_load_csv_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.csv");

        let err = load_csv(&path).unwrap_err();
        assert!(matches!(err, DatasetError::Open { .. }));
        assert!(err.to_string().contains("plot.csv"));
    }
}
