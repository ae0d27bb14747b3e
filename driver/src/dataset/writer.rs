use anyhow::{Context, Result};
use matchcore::report::{MatchRow, HEADER};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Writes the result table, header first, even when there are no rows.
pub fn write_rows<W: Write>(rows: &[MatchRow], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// `-` writes to stdout.
pub fn write_rows_to_path(rows: &[MatchRow], path: &Path) -> Result<()> {
    if path.as_os_str() == "-" {
        let stdout = io::stdout();
        return write_rows(rows, stdout.lock());
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_rows(rows, file).with_context(|| format!("writing {}", path.display()))
}

/// Writes input-format rows (used for generated flights).
pub fn write_records<T: Serialize>(records: &[T], path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
