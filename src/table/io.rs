//! CSV persistence of score tables.
//!
//! Columns: `method,track,target,metric,time,score`. Empty `method`, `time`
//! and `score` fields are missing values.

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::table::{EvalTable, ScoreRow};

/// Write all rows of a table as CSV, header included.
pub fn write_csv<W: Write>(table: &EvalTable, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in table {
        writer.serialize(row)?;
    }
    // An empty table still gets its header so the file reads back.
    if table.is_empty() {
        writer.write_record(["method", "track", "target", "metric", "time", "score"])?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a table previously written by [`write_csv`].
pub fn read_csv<R: Read>(reader: R) -> Result<EvalTable> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for (line_num, record) in reader.deserialize::<ScoreRow>().enumerate() {
        let row = record.map_err(|e| Error::MalformedTable {
            line: line_num + 2, // +2 for 1-based and header
            reason: e.to_string(),
        })?;
        rows.push(row);
    }

    Ok(EvalTable::from(rows))
}
