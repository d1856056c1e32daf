//! CSV and JSON output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::ParseError;

fn create_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Write a CSV table to any writer.
///
/// Each entry of `comments` becomes a `# ` line above the header, so the
/// output can be read back with [`parse_table`](crate::parse_table).
/// Values are written with the shortest representation that round-trips.
pub fn write_csv_to<W: Write>(
    mut out: W,
    comments: &[String],
    header: &[String],
    rows: &[Vec<f64>],
) -> Result<(), ParseError> {
    for comment in comments {
        writeln!(out, "# {}", comment)?;
    }
    if !comments.is_empty() {
        writeln!(out, "#")?;
    }
    writeln!(out, "{}", header.join(","))?;

    for (r, row) in rows.iter().enumerate() {
        if row.len() != header.len() {
            return Err(ParseError::FormatError {
                line: r + 1,
                message: format!("Row has {} values for {} columns", row.len(), header.len()),
            });
        }
        let fields: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(out, "{}", fields.join(","))?;
    }
    out.flush()?;
    Ok(())
}

/// Write a CSV table to `path`, creating parent directories as needed.
pub fn write_csv(
    path: &Path,
    comments: &[String],
    header: &[String],
    rows: &[Vec<f64>],
) -> Result<(), ParseError> {
    create_parent(path)?;
    let file = BufWriter::new(File::create(path)?);
    write_csv_to(file, comments, header, rows)?;
    info!("Table written to: {}", path.display());
    Ok(())
}

/// Write `value` to `path` as pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ParseError> {
    create_parent(path)?;
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    info!("JSON written to: {}", path.display());
    Ok(())
}
