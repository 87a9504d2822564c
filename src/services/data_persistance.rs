use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::{
    domain::row::Row,
    error::{Result, ScrapeError},
};

const SEPARATOR: char = ',';

/// Overwrite `path` with one `address,name,timestamp` line per row.
pub fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    write_rows(path, rows).map_err(|source| ScrapeError::Persist {
        path: path.display().to_string(),
        source,
    })?;

    log::info!("Wrote {} rows -> {}", rows.len(), path.display());
    Ok(())
}

fn write_rows(path: &Path, rows: &[Row]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut out = BufWriter::new(fs::File::create(path)?);
    for row in rows {
        write_record(&mut out, &row.to_record())?;
    }
    out.flush()
}

fn needs_quotes(field: &str) -> bool {
    field.contains(SEPARATOR) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_record<W: Write>(w: &mut W, record: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in record {
        if !first {
            write!(w, "{}", SEPARATOR)?;
        } else {
            first = false;
        }

        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}
