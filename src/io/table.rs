//! Numbered, quoted CSV report writer.
//!
//! Layout:
//!
//! ```text
//! #,"<column>","<column>",...
//! 1,<value>,<value>,...
//! ```
//!
//! Integers and booleans are written bare, text is quoted, missing values are
//! empty fields. Skipped columns contribute no field to either line. Every
//! record stays on one line: control characters inside quoted fields are
//! written as backslash escapes.

use std::io::{self, Write};

use crate::domain::{CanonicalRow, ColumnDescriptor, FloatFormat, Scalar};

/// First field of the header line.
pub const HEADER_MARKER: &str = "#";

/// Quote a field, doubling embedded quotes and escaping backslashes and
/// control characters (`\n`, `\r`, `\t`, `\u{..}`).
pub fn quote(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 2);
    out.push('"');
    for ch in field.chars() {
        match ch {
            '"' => out.push_str("\"\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&c.escape_unicode().to_string()),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render one cell. `None` means an empty field.
pub fn render_value(value: &Scalar, float_format: FloatFormat) -> Option<String> {
    match value {
        Scalar::Null => None,
        Scalar::Bool(b) => Some(b.to_string()),
        Scalar::Int(i) => Some(i.to_string()),
        Scalar::Float(x) => Some(match float_format {
            FloatFormat::Plain => x.to_string(),
            FloatFormat::Quoted => quote(&x.to_string()),
            FloatFormat::Truncate => (x.trunc() as i64).to_string(),
        }),
        Scalar::Text(s) => Some(quote(s)),
    }
}

pub struct TableWriter<W: Write> {
    out: W,
    columns: Vec<ColumnDescriptor>,
    skipped: Vec<bool>,
    float_format: FloatFormat,
    rows: usize,
}

impl<W: Write> TableWriter<W> {
    /// Write the header line and remember which columns `skip` excluded.
    pub fn start<F>(
        mut out: W,
        columns: Vec<ColumnDescriptor>,
        float_format: FloatFormat,
        skip: F,
    ) -> io::Result<Self>
    where
        F: Fn(&ColumnDescriptor) -> bool,
    {
        let mut skipped = Vec::with_capacity(columns.len());
        out.write_all(HEADER_MARKER.as_bytes())?;
        for col in &columns {
            let skip_col = skip(col);
            if !skip_col {
                write!(out, ",{}", quote(&col.display_name))?;
            }
            skipped.push(skip_col);
        }
        writeln!(out)?;

        Ok(Self {
            out,
            columns,
            skipped,
            float_format,
            rows: 0,
        })
    }

    /// Write one numbered row, index-aligned with the header.
    pub fn write_row(&mut self, row: &CanonicalRow) -> io::Result<()> {
        self.rows += 1;
        write!(self.out, "{}", self.rows)?;
        for (col, skipped) in self.columns.iter().zip(&self.skipped) {
            if *skipped {
                continue;
            }
            match row.get(&col.display_name).and_then(|v| render_value(v, self.float_format)) {
                Some(rendered) => write!(self.out, ",{rendered}")?,
                None => self.out.write_all(b",")?,
            }
        }
        writeln!(self.out)
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Number of columns present in the header (excluding the marker).
    pub fn columns_written(&self) -> usize {
        self.skipped.iter().filter(|s| !**s).count()
    }

    /// Flush and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
