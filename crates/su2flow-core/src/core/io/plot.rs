use crate::core::naming::OutputFormat;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Column '{name}' has {found} rows, expected {expected}")]
    RaggedColumn {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Plot output is not supported for format {0}")]
    UnsupportedFormat(OutputFormat),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Float(v) => write!(f, "{:.10}", v),
        }
    }
}

/// Ordered, named columns of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotTable {
    columns: Vec<(String, Vec<Cell>)>,
}

impl PlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_int_column(mut self, name: &str, values: impl IntoIterator<Item = i64>) -> Self {
        self.columns.push((
            name.to_string(),
            values.into_iter().map(Cell::Int).collect(),
        ));
        self
    }

    pub fn with_float_column(mut self, name: &str, values: impl IntoIterator<Item = f64>) -> Self {
        self.columns.push((
            name.to_string(),
            values.into_iter().map(Cell::Float).collect(),
        ));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    fn rows(&self) -> Result<usize, PlotError> {
        let Some((_, first)) = self.columns.first() else {
            return Ok(0);
        };
        let expected = first.len();
        for (name, column) in &self.columns {
            if column.len() != expected {
                return Err(PlotError::RaggedColumn {
                    name: name.clone(),
                    expected,
                    found: column.len(),
                });
            }
        }
        Ok(expected)
    }

    fn row(&self, i: usize) -> impl Iterator<Item = String> + '_ {
        self.columns.iter().map(move |(_, column)| column[i].to_string())
    }
}

/// Fails for formats that have no text rendition here (binary Tecplot,
/// FieldView, CGNS).
pub fn check_format(format: OutputFormat) -> Result<(), PlotError> {
    match format {
        OutputFormat::Tecplot | OutputFormat::Paraview => Ok(()),
        other => Err(PlotError::UnsupportedFormat(other)),
    }
}

pub fn write_plot(
    writer: &mut impl Write,
    format: OutputFormat,
    table: &PlotTable,
) -> Result<(), PlotError> {
    let n_rows = table.rows()?;
    match format {
        OutputFormat::Tecplot => {
            let header = table
                .names()
                .map(|name| format!("\"{}\"", name))
                .collect::<Vec<_>>()
                .join(",");
            writeln!(writer, "VARIABLES={}", header)?;
            writeln!(writer, "ZONE T= \"Visualization of the gradient\"")?;
            for i in 0..n_rows {
                writeln!(writer, "{}", table.row(i).collect::<Vec<_>>().join(", "))?;
            }
        }
        OutputFormat::Paraview => {
            let mut csv_writer = csv::WriterBuilder::new()
                .quote_style(csv::QuoteStyle::NonNumeric)
                .from_writer(writer);
            csv_writer.write_record(table.names())?;
            for i in 0..n_rows {
                csv_writer.write_record(table.row(i))?;
            }
            csv_writer.flush()?;
        }
        other => return Err(PlotError::UnsupportedFormat(other)),
    }
    Ok(())
}

pub fn write_plot_to_path<P: AsRef<Path>>(
    path: P,
    format: OutputFormat,
    table: &PlotTable,
) -> Result<(), PlotError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_plot(&mut writer, format, table)?;
    writer.flush()?;
    Ok(())
}
