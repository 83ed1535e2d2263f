use std::fmt::Display;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TrudgeError;

/// Column order of a log file. The header text itself is never consulted.
pub const COLUMNS: [&str; 13] = [
    "time",
    "name",
    "reps",
    "weight",
    "rest",
    "positive",
    "hold",
    "negative",
    "effort",
    "heart",
    "trainer",
    "unilateral",
    "notes",
];

pub const MIN_EFFORT: u8 = 1;
pub const MAX_EFFORT: u8 = 5;

const TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
const OFFSET_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];

/// One recorded set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub time: NaiveDateTime,
    pub name: String,
    pub reps: u32,
    pub weight: f64,
    /// Rest before the set, in minutes.
    pub rest: f64,
    /// Concentric duration, seconds.
    pub positive: u32,
    pub hold: u32,
    /// Eccentric duration, seconds.
    pub negative: u32,
    pub effort: u8,
    pub heart: Option<u32>,
    pub trainer: bool,
    pub unilateral: bool,
    pub notes: String,
}

/// Load and validate a workout log from disk.
pub fn load(path: &Path) -> Result<Vec<SetRecord>, TrudgeError> {
    let data = fs::read(path).map_err(|source| TrudgeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let sets = load_from_reader(data.as_slice())?;
    debug!("loaded {} sets from {}", sets.len(), path.display());
    Ok(sets)
}

/// Parse a workout log from CSV text. The header row must carry exactly
/// [`COLUMNS`]`.len()` fields; it is checked before any data row is read.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Vec<SetRecord>, TrudgeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header_len = reader.headers()?.len();
    if header_len != COLUMNS.len() {
        return Err(TrudgeError::Schema {
            row: None,
            expected: COLUMNS.len(),
            found: header_len,
        });
    }

    let mut out = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() != COLUMNS.len() {
            return Err(TrudgeError::Schema {
                row: Some(row),
                expected: COLUMNS.len(),
                found: record.len(),
            });
        }
        out.push(parse_row(row, &record)?);
    }
    Ok(out)
}

fn parse_row(row: usize, record: &StringRecord) -> Result<SetRecord, TrudgeError> {
    let cell = |idx: usize| record.get(idx).unwrap_or_default();
    Ok(SetRecord {
        time: parse_time(cell(0)).map_err(|reason| TrudgeError::FieldParse {
            row,
            field: COLUMNS[0],
            value: cell(0).to_string(),
            reason,
        })?,
        name: cell(1).trim().to_string(),
        reps: parse_number(row, COLUMNS[2], cell(2))?,
        weight: parse_number(row, COLUMNS[3], cell(3))?,
        rest: parse_number(row, COLUMNS[4], cell(4))?,
        positive: parse_number(row, COLUMNS[5], cell(5))?,
        hold: parse_number(row, COLUMNS[6], cell(6))?,
        negative: parse_number(row, COLUMNS[7], cell(7))?,
        effort: parse_effort(row, cell(8))?,
        heart: parse_heart(row, cell(9))?,
        trainer: parse_flag(row, COLUMNS[10], cell(10))?,
        unilateral: parse_flag(row, COLUMNS[11], cell(11))?,
        notes: cell(12).trim().to_string(),
    })
}

/// Parse an ISO-8601-like timestamp after removing every space. A bare date
/// is taken as midnight and a bare hour as the top of that hour. A UTC
/// offset is accepted and dropped, keeping the wall-clock time.
pub fn parse_time(raw: &str) -> Result<NaiveDateTime, String> {
    let compact: String = raw.chars().filter(|c| *c != ' ').collect();
    for format in TIME_FORMATS {
        if let Ok(time) = NaiveDateTime::parse_from_str(&compact, format) {
            return Ok(time);
        }
    }
    for format in OFFSET_TIME_FORMATS {
        if let Ok(time) = DateTime::parse_from_str(&compact, format) {
            return Ok(time.naive_local());
        }
    }

    let (date, rest) =
        NaiveDate::parse_and_remainder(&compact, "%Y-%m-%d").map_err(|e| e.to_string())?;
    let hour = match rest.strip_prefix('T') {
        None if rest.is_empty() => 0,
        Some(hour) if (1..=2).contains(&hour.len()) && hour.bytes().all(|b| b.is_ascii_digit()) => {
            hour.parse::<u32>().map_err(|e| e.to_string())?
        }
        _ => return Err(format!("unrecognized time of day '{}'", rest)),
    };
    date.and_hms_opt(hour, 0, 0)
        .ok_or_else(|| format!("hour {} out of range", hour))
}

fn parse_number<T>(row: usize, field: &'static str, raw: &str) -> Result<T, TrudgeError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| TrudgeError::FieldParse {
            row,
            field,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Parse an effort rating and check it against [`MIN_EFFORT`]..=[`MAX_EFFORT`].
pub fn parse_effort(row: usize, raw: &str) -> Result<u8, TrudgeError> {
    let value: i64 = parse_number(row, "effort", raw)?;
    if value < MIN_EFFORT as i64 || value > MAX_EFFORT as i64 {
        return Err(TrudgeError::InvalidEffort {
            row,
            value: raw.to_string(),
        });
    }
    Ok(value as u8)
}

fn parse_heart(row: usize, raw: &str) -> Result<Option<u32>, TrudgeError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_number(row, "heart", raw).map(Some)
}

/// Decode a `Y`/`N` flag. Surrounding whitespace is ignored, case is not.
pub fn parse_flag(row: usize, field: &'static str, raw: &str) -> Result<bool, TrudgeError> {
    match raw.trim() {
        "Y" => Ok(true),
        "N" => Ok(false),
        _ => Err(TrudgeError::InvalidFlag {
            row,
            field,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "Date,Type,Reps,Weight,Rest,Conc,Hold,Ecc,Effort,Heart,Trainer,Unilateral,Notes\n";

    fn load_str(body: &str) -> Result<Vec<SetRecord>, TrudgeError> {
        let text = format!("{}{}", HEADER, body);
        load_from_reader(text.as_bytes())
    }

    #[test]
    fn test_loads_typed_rows_in_file_order() {
        let sets = load_str(concat!(
            "2024-03-01 T 18:30, Squat:Back ,5,225.5,2.5,2,0,3,4,120,N,N, felt good \n",
            "2024-03-01T18:30,Bench,8,135,1,1,1,2,3,,Y,N,\n",
        ))
        .unwrap();
        assert_eq!(sets.len(), 2);
        let first = &sets[0];
        assert_eq!(
            first.time,
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(18, 30, 0)
                .unwrap()
        );
        assert_eq!(first.name, "Squat:Back");
        assert_eq!(first.reps, 5);
        assert_eq!(first.weight, 225.5);
        assert_eq!(first.rest, 2.5);
        assert_eq!((first.positive, first.hold, first.negative), (2, 0, 3));
        assert_eq!(first.effort, 4);
        assert_eq!(first.heart, Some(120));
        assert!(!first.trainer);
        assert_eq!(first.notes, "felt good");
        assert_eq!(sets[1].name, "Bench");
        assert_eq!(sets[1].heart, None);
        assert!(sets[1].trainer);
    }

    #[test]
    fn test_header_text_is_ignored() {
        let text = "a,b,c,d,e,f,g,h,i,j,k,l,m\n2024-01-01,Row,10,50,1,1,0,1,2,,N,Y,\n";
        let sets = load_from_reader(text.as_bytes()).unwrap();
        assert!(sets[0].unilateral);
    }

    #[test]
    fn test_effort_bounds() {
        for effort in ["0", "6"] {
            let body = format!("2024-01-01,Squat,5,100,1,1,0,1,{},,N,N,\n", effort);
            match load_str(&body) {
                Err(TrudgeError::InvalidEffort { row, value }) => {
                    assert_eq!(row, 0);
                    assert_eq!(value, effort);
                }
                other => panic!("expected invalid effort, got {:?}", other),
            }
        }
        for effort in ["1", "5"] {
            let body = format!("2024-01-01,Squat,5,100,1,1,0,1,{},,N,N,\n", effort);
            assert!(load_str(&body).is_ok());
        }
    }

    #[test]
    fn test_invalid_effort_message_names_literal() {
        let err = parse_effort(3, "9").unwrap_err();
        assert!(err.to_string().contains("invalid effort value '9'"));
    }

    #[test]
    fn test_flag_decoding() {
        assert!(parse_flag(0, "trainer", "Y").unwrap());
        assert!(parse_flag(0, "trainer", " Y ").unwrap());
        assert!(!parse_flag(0, "trainer", "N").unwrap());
        assert!(matches!(
            parse_flag(0, "trainer", "y"),
            Err(TrudgeError::InvalidFlag { .. })
        ));
        assert!(parse_flag(0, "unilateral", "yes").is_err());
    }

    #[test]
    fn test_missing_column_rejected_before_rows() {
        // The data row is garbage; the header check must fire first.
        let text = "time,name,reps,weight,rest,positive,hold,negative,effort,heart,trainer,notes\nnot,a,row\n";
        match load_from_reader(text.as_bytes()) {
            Err(TrudgeError::Schema {
                row: None,
                expected: 13,
                found: 12,
            }) => {}
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_short_data_row_is_schema_error() {
        match load_str("2024-01-01,Squat,5,100\n") {
            Err(TrudgeError::Schema { row: Some(0), .. }) => {}
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_number_names_field_and_row() {
        let err = load_str(concat!(
            "2024-01-01,Squat,5,100,1,1,0,1,3,,N,N,\n",
            "2024-01-01,Squat,five,100,1,1,0,1,3,,N,N,\n",
        ))
        .unwrap_err();
        match err {
            TrudgeError::FieldParse {
                row, field, value, ..
            } => {
                assert_eq!(row, 1);
                assert_eq!(field, "reps");
                assert_eq!(value, "five");
            }
            other => panic!("expected field parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_is_field_error() {
        let err = load_str("2024-13-40,Squat,5,100,1,1,0,1,3,,N,N,\n").unwrap_err();
        assert!(matches!(err, TrudgeError::FieldParse { field: "time", .. }));
    }

    #[test]
    fn test_parse_time_variants() {
        let midnight = parse_time("2024-02-29").unwrap();
        assert_eq!(midnight.to_string(), "2024-02-29 00:00:00");
        let seconds = parse_time("2024-02-29T07:05:09").unwrap();
        assert_eq!(seconds.to_string(), "2024-02-29 07:05:09");
        let spaced = parse_time(" 2024-02-29 T07:05 ").unwrap();
        assert_eq!(spaced.to_string(), "2024-02-29 07:05:00");
    }

    #[test]
    fn test_parse_time_hour_only() {
        let hour = parse_time("2024-01-08T18").unwrap();
        assert_eq!(hour.to_string(), "2024-01-08 18:00:00");
        assert!(parse_time("2024-01-08T25").is_err());
        assert!(parse_time("2024-01-08T1800x").is_err());
    }

    #[test]
    fn test_parse_time_offset_keeps_wall_clock() {
        let utc = parse_time("2024-01-08T18:00:00+00:00").unwrap();
        assert_eq!(utc.to_string(), "2024-01-08 18:00:00");
        let shifted = parse_time("2024-01-08 T 18:30 -05:00").unwrap();
        assert_eq!(shifted.to_string(), "2024-01-08 18:30:00");
        let fraction = parse_time("2024-01-08T18:00:00.250+01:00").unwrap();
        assert_eq!(fraction.to_string(), "2024-01-08 18:00:00.250");
    }

    #[test]
    fn test_offset_timestamp_loads() {
        let sets = load_str("2024-01-08T18:00:00+00:00,Squat,5,100,1,1,0,1,3,,N,N,\n").unwrap();
        assert_eq!(sets[0].time.to_string(), "2024-01-08 18:00:00");
    }
}
