use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid assignment '{0}'. Expected KEY=VALUE.")]
    InvalidAssignment(String),

    #[error("Key cannot be empty in assignment '{0}'.")]
    EmptyKey(String),

    #[error("Invalid step list '{0}'. Expected FLOAT or FLOAT,FLOAT,...")]
    InvalidStep(String),

    #[error("Invalid boolean '{0}'. Expected true/false, yes/no, on/off or 1/0.")]
    InvalidBool(String),
}

/// Splits `KEY=VALUE` at the first `=`; surrounding whitespace is trimmed.
pub fn parse_key_value(assignment: &str) -> Result<(String, String), ParseError> {
    let (key, value) = assignment
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidAssignment(assignment.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::EmptyKey(assignment.to_string()));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Accepts the same spellings as the `-o`/`-d` flags, ignoring case.
pub fn parse_bool(text: &str) -> Result<bool, ParseError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        _ => Err(ParseError::InvalidBool(text.to_string())),
    }
}

pub fn parse_step_list(text: &str) -> Result<Vec<f64>, ParseError> {
    let steps = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ParseError::InvalidStep(text.to_string()))?;
    if steps.is_empty() {
        return Err(ParseError::InvalidStep(text.to_string()));
    }
    Ok(steps)
}
