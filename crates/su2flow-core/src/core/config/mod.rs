//! SU2 configuration files.
//!
//! An SU2 config is a flat text file of `KEY= value` entries interleaved with
//! `%` comments. [`Su2Config`] keeps every line in its original order so that
//! a mutated copy differs from its source only in the values that were set.

pub mod dv;

use crate::core::naming::OutputFormat;
use dv::{DesignVariable, DvError};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Missing required config parameter: {0}")]
    MissingParameter(String),
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
    #[error("Design variable error: {0}")]
    DesignVariable(#[from] DvError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigLine {
    Comment(String),
    Blank,
    Entry { key: String, value: String },
    /// A non-comment line without `=`; kept so the file round-trips.
    Verbatim(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Su2Config {
    lines: Vec<ConfigLine>,
}

impl Su2Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_from(reader: &mut impl BufRead) -> Result<Self, ConfigError> {
        let mut lines = Vec::new();
        for line_res in reader.lines() {
            let line = line_res?;
            let trimmed = line.trim();
            let parsed = if trimmed.is_empty() {
                ConfigLine::Blank
            } else if trimmed.starts_with('%') {
                ConfigLine::Comment(line)
            } else if let Some((key, value)) = trimmed.split_once('=') {
                ConfigLine::Entry {
                    key: key.trim().to_uppercase(),
                    value: value.trim().to_string(),
                }
            } else {
                ConfigLine::Verbatim(line)
            };
            lines.push(parsed);
        }
        Ok(Self { lines })
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        debug!("Reading SU2 config from {:?}", path.as_ref());
        let file = File::open(path)?;
        Self::read_from(&mut BufReader::new(file))
    }

    pub fn write_to(&self, writer: &mut impl Write) -> Result<(), ConfigError> {
        for line in &self.lines {
            match line {
                ConfigLine::Comment(text) | ConfigLine::Verbatim(text) => {
                    writeln!(writer, "{}", text)?
                }
                ConfigLine::Blank => writeln!(writer)?,
                ConfigLine::Entry { key, value } => writeln!(writer, "{}= {}", key, value)?,
            }
        }
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes this config to `path`, leaving `self` untouched.
    pub fn copy_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        debug!("Writing working config copy to {:?}", path.as_ref());
        self.write_to_path(path)
    }

    pub fn lines(&self) -> &[ConfigLine] {
        &self.lines
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            ConfigLine::Entry { key, .. } => Some(key.as_str()),
            _ => None,
        })
    }

    /// Last entry wins when a key is repeated.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_uppercase();
        self.lines.iter().rev().find_map(|line| match line {
            ConfigLine::Entry { key: k, value } if *k == key => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingParameter(key.to_uppercase()))
    }

    pub fn get_f64(&self, key: &str) -> Result<Option<f64>, ConfigError> {
        self.get(key)
            .map(|value| {
                value.parse::<f64>().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_uppercase(),
                    value: value.to_string(),
                })
            })
            .transpose()
    }

    pub fn get_usize(&self, key: &str) -> Result<Option<usize>, ConfigError> {
        self.get(key)
            .map(|value| {
                // Solver configs sometimes spell integers as floats ("250.0").
                value
                    .parse::<usize>()
                    .ok()
                    .or_else(|| {
                        value
                            .parse::<f64>()
                            .ok()
                            .filter(|v| *v >= 0.0 && v.fract() == 0.0)
                            .map(|v| v as usize)
                    })
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: key.to_uppercase(),
                        value: value.to_string(),
                    })
            })
            .transpose()
    }

    /// Splits a comma separated value, stripping surrounding parentheses.
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(split_list)
    }

    /// Replaces the value of every entry named `key`, appending a new entry
    /// when there is none.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let key = key.trim().to_uppercase();
        let value = value.into();
        let mut found = false;
        for line in &mut self.lines {
            if let ConfigLine::Entry { key: k, value: v } = line {
                if *k == key {
                    *v = value.clone();
                    found = true;
                }
            }
        }
        if !found {
            debug!("Appending new config entry {}", key);
            self.lines.push(ConfigLine::Entry { key, value });
        }
    }

    pub fn set_many<K, V, I>(&mut self, params: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in params {
            self.set(key.as_ref(), value);
        }
    }

    /// Removes every entry named `key`; returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let key = key.to_uppercase();
        let before = self.lines.len();
        self.lines
            .retain(|line| !matches!(line, ConfigLine::Entry { key: k, .. } if *k == key));
        self.lines.len() != before
    }

    /// The active objective, falling back to the legacy `ADJ_OBJFUNC` key.
    pub fn objective(&self) -> Result<&str, ConfigError> {
        self.get("OBJECTIVE_FUNCTION")
            .or_else(|| self.get("ADJ_OBJFUNC"))
            .ok_or_else(|| ConfigError::MissingParameter("OBJECTIVE_FUNCTION".to_string()))
    }

    pub fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        let value = self.require("OUTPUT_FORMAT")?;
        value.parse().map_err(|_| ConfigError::InvalidValue {
            key: "OUTPUT_FORMAT".to_string(),
            value: value.to_string(),
        })
    }

    pub fn definition_dv(&self) -> Result<Vec<DesignVariable>, ConfigError> {
        let value = self.require("DEFINITION_DV")?;
        Ok(dv::parse_definition(value)?)
    }

    /// Scales `dv_new`/`dv_old` by each design variable's scale and writes the
    /// `DV_*` keys the solver reads for a deformation or projection run.
    pub fn unpack_dvs(&mut self, dv_new: &[f64], dv_old: &[f64]) -> Result<(), ConfigError> {
        let definition = self.definition_dv()?;
        let n_dv: usize = definition.iter().map(|dv| dv.size).sum();
        if dv_new.len() != n_dv || dv_old.len() != n_dv {
            return Err(DvError::LengthMismatch {
                expected: n_dv,
                found: dv_new.len().max(dv_old.len()),
            }
            .into());
        }

        let mut scaled_new = Vec::with_capacity(n_dv);
        let mut scaled_old = Vec::with_capacity(n_dv);
        let mut k = 0;
        for dv in &definition {
            for _ in 0..dv.size {
                scaled_new.push(dv_new[k] * dv.scale);
                scaled_old.push(dv_old[k] * dv.scale);
                k += 1;
            }
        }

        self.apply_dv_keys(&definition, &scaled_new, &scaled_old);
        Ok(())
    }

    /// Writes `DV_KIND`, `DV_MARKER`, `DV_PARAM` and the value lists as-is.
    pub fn apply_dv_keys(&mut self, definition: &[DesignVariable], new: &[f64], old: &[f64]) {
        self.set("DV_KIND", dv::format_kinds(definition));
        self.set("DV_MARKER", dv::format_markers(definition));
        self.set("DV_PARAM", dv::format_params(definition));
        self.set("DV_VALUE_OLD", dv::format_values(old));
        self.set("DV_VALUE_NEW", dv::format_values(new));
    }
}

pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
