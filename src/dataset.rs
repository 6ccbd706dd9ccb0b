use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

/// Timestamp format recognized in input columns.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// An input series loaded from one column of a CSV file.
///
/// Immutable once loaded. The domain is integral when every cell was a
/// timestamp or an integer-valued number; generated values are then coerced
/// back to integers.
pub struct Dataset {
    values: Vec<f64>,
    integral: bool,
}

impl Dataset {
    /// Load one named column of a CSV file with a header row.
    ///
    /// Cells are parsed either as ISO-8601 timestamps (converted to
    /// Unix-epoch seconds) or as plain floats. An optional row cap limits how
    /// much of the file is consumed.
    pub fn from_csv<P: AsRef<Path>>(
        file: P,
        column: &str,
        max_rows: Option<usize>,
    ) -> Result<Self> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut lines = BufReader::new(file).lines();

        let header = lines
            .next()
            .context("dataset is empty")?
            .context("failed to read header")?;
        let i_column = header
            .split(',')
            .position(|name| trim_field(name) == column)
            .with_context(|| format!("column {column:?} not found in header"))?;

        let mut values = Vec::new();
        let mut integral = true;

        for line in lines {
            let line = line.context("failed to read row")?;
            if line.trim().is_empty() {
                continue;
            }

            let field = line
                .split(',')
                .nth(i_column)
                .with_context(|| format!("row {} has no column {column:?}", values.len() + 1))?;
            let (value, is_integral) = parse_value(trim_field(field))
                .with_context(|| format!("invalid cell in row {}", values.len() + 1))?;

            integral &= is_integral;
            values.push(value);

            if max_rows.is_some_and(|cap| values.len() >= cap) {
                break;
            }
        }

        Ok(Self { values, integral })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn integral(&self) -> bool {
        self.integral
    }
}

fn trim_field(field: &str) -> &str {
    field.trim().trim_matches('"')
}

fn parse_value(field: &str) -> Result<(f64, bool)> {
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(field, TIMESTAMP_FORMAT) {
        return Ok((timestamp.and_utc().timestamp() as f64, true));
    }

    let value: f64 = field
        .parse()
        .with_context(|| format!("cell {field:?} is neither a timestamp nor a number"))?;
    Ok((value, value.fract() == 0.0))
}

/// Write a flat one-column CSV.
pub fn write_column<P: AsRef<Path>>(file: P, name: &str, values: &[f64]) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{name}").context("failed to write header")?;
    for value in values {
        writeln!(writer, "{value}").context("failed to write value")?;
    }
    writer.flush().context("failed to flush writer stream")?;

    Ok(())
}

/// Read back a flat one-column CSV written by [`write_column`].
pub fn read_column<P: AsRef<Path>>(file: P) -> Result<Vec<f64>> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut lines = BufReader::new(file).lines();

    lines
        .next()
        .context("file is empty")?
        .context("failed to read header")?;

    let mut values = Vec::new();
    for line in lines {
        let line = line.context("failed to read row")?;
        if line.trim().is_empty() {
            continue;
        }
        let value = line
            .trim()
            .parse()
            .with_context(|| format!("invalid value {line:?}"))?;
        values.push(value);
    }

    Ok(values)
}
