use std::io;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_SMOOTHING_ITERATIONS: usize = 10;
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.5;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Surface file has no sensitivity column")]
    MissingSensitivity,
    #[error("Row {row}: invalid sensitivity '{value}'")]
    InvalidNumber { row: usize, value: String },
}

/// Explicit Laplacian smoothing along an ordered surface; the two end
/// points are held fixed.
pub fn laplace_smooth(values: &[f64], iterations: usize, factor: f64) -> Vec<f64> {
    let mut current = values.to_vec();
    if current.len() < 3 {
        return current;
    }
    let mut next = current.clone();
    for _ in 0..iterations {
        for i in 1..current.len() - 1 {
            let laplacian = current[i - 1] - 2.0 * current[i] + current[i + 1];
            next[i] = current[i] + factor * laplacian;
        }
        std::mem::swap(&mut current, &mut next);
    }
    current
}

/// Smooths the sensitivity column of a surface adjoint CSV file and writes
/// the result to `output`; returns the number of surface points.
pub fn filter_surface_file(
    input: &Path,
    output: &Path,
    iterations: usize,
    factor: f64,
) -> Result<usize, SurfaceError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(input)?;
    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| h.to_lowercase().contains("sensitivity"))
        .ok_or(SurfaceError::MissingSensitivity)?;

    let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    let values = records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            let raw = record.get(column).unwrap_or_default();
            raw.parse::<f64>().map_err(|_| SurfaceError::InvalidNumber {
                row: row + 1,
                value: raw.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let smoothed = laplace_smooth(&values, iterations, factor);

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_path(output)?;
    writer.write_record(&headers)?;
    for (record, value) in records.iter().zip(&smoothed) {
        let fields = record.iter().enumerate().map(|(i, field)| {
            if i == column {
                format!("{:.10e}", value)
            } else {
                field.to_string()
            }
        });
        writer.write_record(fields)?;
    }
    writer.flush()?;
    Ok(records.len())
}
