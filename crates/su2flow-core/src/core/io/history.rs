use crate::core::naming;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("History file has no header line")]
    MissingHeader,
    #[error("History file has no data rows")]
    Empty,
    #[error("Parse error on line {line}: invalid number '{value}'")]
    InvalidNumber { line: usize, value: String },
    #[error("Line {line} has {found} values, header declares {expected}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Column '{0}' not found in history")]
    MissingColumn(String),
}

/// Convergence history written by the flow or adjoint solver, column-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    columns: Vec<String>,
    data: Vec<Vec<f64>>,
}

/// Header and zone lines of Tecplot and CSV plot files.
pub(crate) fn is_header_line(line: &str) -> bool {
    let upper = line.trim_start().to_uppercase();
    upper.starts_with("VARIABLES")
        || upper.starts_with("TITLE")
        || upper.starts_with("ZONE")
        || line.trim_start().starts_with('"')
}

fn parse_header(line: &str) -> Vec<String> {
    let line = line.trim();
    let body = match line.split_once('=') {
        Some((prefix, rest)) if prefix.trim().eq_ignore_ascii_case("VARIABLES") => rest,
        _ => line,
    };
    body.split(',')
        .map(naming::history_column)
        .filter(|name| !name.is_empty())
        .collect()
}

impl History {
    pub fn read_from(reader: &mut impl BufRead) -> Result<Self, HistoryError> {
        let mut columns: Option<Vec<String>> = None;
        let mut data: Vec<Vec<f64>> = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if is_header_line(trimmed) {
                let upper = trimmed.to_uppercase();
                if columns.is_none() && !upper.starts_with("TITLE") && !upper.starts_with("ZONE")
                {
                    let names = parse_header(trimmed);
                    data = vec![Vec::new(); names.len()];
                    columns = Some(names);
                }
                continue;
            }

            let names = columns.as_ref().ok_or(HistoryError::MissingHeader)?;
            let values: Vec<&str> = trimmed
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if values.len() != names.len() {
                return Err(HistoryError::ColumnCount {
                    line: line_num,
                    expected: names.len(),
                    found: values.len(),
                });
            }
            for (column, raw) in data.iter_mut().zip(values) {
                let value: f64 = raw.parse().map_err(|_| HistoryError::InvalidNumber {
                    line: line_num,
                    value: raw.to_string(),
                })?;
                column.push(value);
            }
        }

        let columns = columns.ok_or(HistoryError::MissingHeader)?;
        Ok(Self { columns, data })
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, HistoryError> {
        let file = File::open(path)?;
        Self::read_from(&mut BufReader::new(file))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.data[idx].as_slice())
    }

    pub fn last(&self, name: &str) -> Result<f64, HistoryError> {
        let column = self
            .column(name)
            .ok_or_else(|| HistoryError::MissingColumn(name.to_string()))?;
        column.last().copied().ok_or(HistoryError::Empty)
    }

    /// The final iteration number recorded by the solver.
    pub fn iterations(&self) -> Result<usize, HistoryError> {
        let last = self.last("ITERATION")?;
        Ok(last.max(0.0) as usize)
    }

    /// Final value of every objective function column.
    pub fn objective_values(&self) -> Result<BTreeMap<String, f64>, HistoryError> {
        if self.is_empty() {
            return Err(HistoryError::Empty);
        }
        let mut values = BTreeMap::new();
        for (name, column) in self.columns.iter().zip(&self.data) {
            if naming::is_objective(name) {
                if let Some(last) = column.last() {
                    values.insert(name.clone(), *last);
                }
            }
        }
        Ok(values)
    }
}
