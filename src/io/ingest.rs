//! CSV ingest.
//!
//! Turns a test-bench CSV into a [`TestTable`] with a fixed schema:
//!
//! | column                               | field          | required |
//! |--------------------------------------|----------------|----------|
//! | `PumpType`                           | `pump`         | yes      |
//! | `Speed`                              | `speed`        | yes      |
//! | `Flow`                               | `flow`         | yes      |
//! | `Total_Head`                         | `head`         | yes      |
//! | `Stages`                             | `stages`       | no       |
//! | `Test_Type_ID`                       | `test_type`    | no       |
//! | `Pump_Efficiency`                    | `efficiency`   | no       |
//! | `Pump_Input`                         | `power`        | no       |
//! | `Pump_Detail_Impeller_Dia_1st_Stage` | `impeller_dia` | no       |
//! | `Testpoint`                          | `testpoint`    | no       |
//! | `hs`                                 | `npsh_required`| no       |
//!
//! Header matching is case-insensitive and ignores surrounding whitespace and a
//! UTF-8 BOM. Files that are not valid UTF-8 are decoded as Latin-1. Empty or
//! unparsable numeric cells become `None`. Rows without a pump identity are
//! reported in `row_errors` and skipped.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{TestPoint, TestTable};
use crate::error::CurveError;

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number in the file (header is line 1).
    pub line: usize,
    pub message: String,
}

/// Ingest output: the table plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: TestTable,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    pump: usize,
    speed: usize,
    flow: usize,
    head: usize,
    stages: Option<usize>,
    test_type: Option<usize>,
    efficiency: Option<usize>,
    power: Option<usize>,
    impeller_dia: Option<usize>,
    testpoint: Option<usize>,
    npsh_required: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, CurveError> {
        let map: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (normalize_header_name(name), idx))
            .collect();

        let required = |name: &'static str| {
            map.get(&name.to_ascii_lowercase())
                .copied()
                .ok_or(CurveError::MissingColumn(name))
        };
        let optional = |name: &str| map.get(&name.to_ascii_lowercase()).copied();

        Ok(Self {
            pump: required("PumpType")?,
            speed: required("Speed")?,
            flow: required("Flow")?,
            head: required("Total_Head")?,
            stages: optional("Stages"),
            test_type: optional("Test_Type_ID"),
            efficiency: optional("Pump_Efficiency"),
            power: optional("Pump_Input"),
            impeller_dia: optional("Pump_Detail_Impeller_Dia_1st_Stage"),
            testpoint: optional("Testpoint"),
            npsh_required: optional("hs"),
        })
    }
}

/// Load a CSV file into a table.
pub fn load_test_table(path: &Path) -> Result<IngestedTable, CurveError> {
    let bytes = std::fs::read(path).map_err(|source| CurveError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_test_table(&bytes)
}

/// Parse CSV bytes into a table.
pub fn read_test_table(bytes: &[u8]) -> Result<IngestedTable, CurveError> {
    let text = decode_text(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = Columns::resolve(&headers)?;

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header, lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &columns, idx) {
            Ok(point) => points.push(point),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), rows_read, "skipped unreadable CSV rows");
    }
    debug!(rows = points.len(), "loaded test table");

    Ok(IngestedTable {
        table: TestTable::new(points),
        row_errors,
        rows_read,
    })
}

fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            debug!("input is not valid UTF-8; decoding as Latin-1");
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

fn normalize_header_name(name: &str) -> String {
    // Excel often writes a BOM before the first header.
    name.trim().trim_start_matches('\u{feff}').trim().to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, columns: &Columns, row_id: usize) -> Result<TestPoint, String> {
    let pump = cell(record, Some(columns.pump))
        .ok_or_else(|| "Missing `PumpType` value.".to_string())?
        .to_string();

    Ok(TestPoint {
        row_id,
        pump,
        stages: parse_opt_count(cell(record, columns.stages)),
        test_type: cell(record, columns.test_type).map(str::to_string),
        speed: parse_opt_f64(cell(record, Some(columns.speed))),
        flow: parse_opt_f64(cell(record, Some(columns.flow))),
        head: parse_opt_f64(cell(record, Some(columns.head))),
        efficiency: parse_opt_f64(cell(record, columns.efficiency)),
        power: parse_opt_f64(cell(record, columns.power)),
        impeller_dia: cell(record, columns.impeller_dia).map(str::to_string),
        testpoint: parse_opt_count(cell(record, columns.testpoint)),
        npsh_required: parse_opt_f64(cell(record, columns.npsh_required)),
    })
}

/// Non-empty cell text at `idx`.
fn cell(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    record.get(idx?).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    s?.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whole non-negative numbers, accepting spreadsheet forms like `"2.0"`.
fn parse_opt_count(s: Option<&str>) -> Option<u32> {
    let v = parse_opt_f64(s)?;
    (v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX)).then_some(v as u32)
}
