use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use crate::display::{prettify_name, Column, Labels};
use crate::record::parse_time;
use crate::{LiftMax, TrudgeError};

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Write a per-lift summary to `path`, choosing CSV or JSON by extension.
pub fn write_summary(path: &Path, rows: &[LiftMax], labels: &Labels) -> Result<(), TrudgeError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let create = || {
        File::create(path).map_err(|source| TrudgeError::Io {
            path: path.to_path_buf(),
            source,
        })
    };
    match ext.as_deref() {
        Some("csv") => write_summary_csv(create()?, rows, labels)?,
        Some("json") => write_summary_json(create()?, rows)?,
        _ => {
            return Err(TrudgeError::UnknownOutputFormat(
                path.display().to_string(),
            ))
        }
    }
    debug!("wrote {} summary rows to {}", rows.len(), path.display());
    Ok(())
}

/// CSV with human readable headers, prettified names and one decimal place.
pub fn write_summary_csv<W: Write>(
    writer: W,
    rows: &[LiftMax],
    labels: &Labels,
) -> Result<(), TrudgeError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(labels.headers(&Column::SUMMARY, false, false))?;
    for row in rows {
        writer.write_record([
            prettify_name(&row.name),
            row.time.format(TIME_FORMAT).to_string(),
            format!("{:.1}", row.orm),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_summary_json<W: Write>(writer: W, rows: &[LiftMax]) -> Result<(), TrudgeError> {
    serde_json::to_writer_pretty(writer, rows)?;
    Ok(())
}

/// Read back a summary produced by [`write_summary_csv`].
///
/// Names come back in their display form (`Behind The Neck Press`), not the
/// raw `Press:Behind The Neck` key; the mapping is one-way.
pub fn read_summary_csv<R: Read>(reader: R) -> Result<Vec<LiftMax>, TrudgeError> {
    let expected = Column::SUMMARY.len();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header_len = reader.headers()?.len();
    if header_len != expected {
        return Err(TrudgeError::Schema {
            row: None,
            expected,
            found: header_len,
        });
    }

    let mut out = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() != expected {
            return Err(TrudgeError::Schema {
                row: Some(row),
                expected,
                found: record.len(),
            });
        }
        let time_raw = &record[1];
        let orm_raw = &record[2];
        out.push(LiftMax {
            name: record[0].trim().to_string(),
            time: parse_time(time_raw).map_err(|reason| TrudgeError::FieldParse {
                row,
                field: "time",
                value: time_raw.to_string(),
                reason,
            })?,
            orm: orm_raw
                .trim()
                .parse()
                .map_err(|e: std::num::ParseFloatError| TrudgeError::FieldParse {
                    row,
                    field: "orm",
                    value: orm_raw.to_string(),
                    reason: e.to_string(),
                })?,
        });
    }
    Ok(out)
}
