use super::history::is_header_line;
use crate::core::config::dv::DesignVariable;
use crate::core::naming::OutputFormat;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GradientError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: invalid gradient value '{value}'")]
    InvalidNumber { line: usize, value: String },
    #[error("Expected {expected} gradients, found {found}")]
    CountMismatch { expected: usize, found: usize },
}

/// Reads the raw gradient file written by SU2_DOT / SU2_GPC: one value per
/// row (first column), header and zone lines skipped.
pub fn read_gradients(reader: &mut impl BufRead) -> Result<Vec<f64>, GradientError> {
    let mut gradients = Vec::new();
    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let trimmed = line.trim();
        if trimmed.is_empty() || is_header_line(trimmed) {
            continue;
        }
        let first = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .find(|s| !s.is_empty())
            .unwrap_or(trimmed);
        let value = first.parse().map_err(|_| GradientError::InvalidNumber {
            line: line_num + 1,
            value: first.to_string(),
        })?;
        gradients.push(value);
    }
    Ok(gradients)
}

pub fn read_gradients_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<f64>, GradientError> {
    let file = File::open(path)?;
    read_gradients(&mut BufReader::new(file))
}

/// Continuous-adjoint gradient report: one row per design variable with its
/// index, gradient, finite-difference step and definition parameters.
pub struct GradientFile;

impl GradientFile {
    pub fn write_to(
        format: OutputFormat,
        design_variables: &[DesignVariable],
        gradients: &[f64],
        step: f64,
        writer: &mut impl Write,
    ) -> Result<(), GradientError> {
        if gradients.len() != design_variables.len() {
            return Err(GradientError::CountMismatch {
                expected: design_variables.len(),
                found: gradients.len(),
            });
        }

        let mut titles = vec!["iVar", "Gradient", "FinDiff_Step"];
        if let Some(first) = design_variables.first() {
            titles.extend_from_slice(first.kind.param_labels());
        }
        let quoted = titles
            .iter()
            .map(|t| format!("\"{}\"", t))
            .collect::<Vec<_>>()
            .join(",");
        match format {
            OutputFormat::Paraview => writeln!(writer, "{}", quoted)?,
            _ => writeln!(writer, "VARIABLES={}", quoted)?,
        }

        for (i, (dv, gradient)) in design_variables.iter().zip(gradients).enumerate() {
            write!(writer, "{}, {:.10}, {}", i, gradient, step)?;
            for param in &dv.params {
                write!(writer, ", {}", param)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(
        path: P,
        format: OutputFormat,
        design_variables: &[DesignVariable],
        gradients: &[f64],
        step: f64,
    ) -> Result<(), GradientError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(format, design_variables, gradients, step, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::dv::parse_definition;
    use std::io::Cursor;

    #[test]
    fn reads_values_skipping_headers() {
        let text = "VARIABLES=\"Gradient\"\nZONE T= \"x\"\n  0.125\n-2.5e-3\n\n1.0, 7\n";
        let gradients = read_gradients(&mut Cursor::new(text)).unwrap();
        assert_eq!(gradients, vec![0.125, -2.5e-3, 1.0]);
    }

    #[test]
    fn invalid_value_reports_line() {
        let text = "\"Gradient\"\n0.1\nnan-ish\n";
        let err = read_gradients(&mut Cursor::new(text)).unwrap_err();
        assert!(matches!(err, GradientError::InvalidNumber { line: 3, .. }));
    }

    #[test]
    fn writes_tecplot_gradient_report() {
        let dvs = parse_definition("( 1, 1.0 | airfoil | 0, 0.05 ); ( 1, 1.0 | airfoil | 1, 0.5 )")
            .unwrap();
        let mut out = Vec::new();
        GradientFile::write_to(OutputFormat::Tecplot, &dvs, &[0.5, -0.25], 1e-4, &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "VARIABLES=\"iVar\",\"Gradient\",\"FinDiff_Step\",\"Up/Down\",\"Loc_Max\""
        );
        assert_eq!(lines[1], "0, 0.5000000000, 0.0001, 0, 0.05");
        assert_eq!(lines[2], "1, -0.2500000000, 0.0001, 1, 0.5");
    }

    #[test]
    fn paraview_header_has_no_variables_prefix() {
        let dvs = parse_definition("( 101, 1.0 | airfoil | 1.0 )").unwrap();
        let mut out = Vec::new();
        GradientFile::write_to(OutputFormat::Paraview, &dvs, &[1.0], 0.001, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\"iVar\",\"Gradient\",\"FinDiff_Step\"\n"));
    }

    #[test]
    fn gradient_count_must_match_design_variables() {
        let dvs = parse_definition("( 1, 1.0 | airfoil | 0, 0.05 )").unwrap();
        let mut out = Vec::new();
        let err = GradientFile::write_to(OutputFormat::Tecplot, &dvs, &[], 0.1, &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            GradientError::CountMismatch {
                expected: 1,
                found: 0
            }
        ));
    }
}
