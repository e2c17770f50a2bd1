use phf::phf_map;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DvError {
    #[error("Malformed design variable definition '{0}'. Expected '( kind, scale | markers | params )'.")]
    Malformed(String),
    #[error("Unknown design variable kind '{0}'")]
    UnknownKind(String),
    #[error("Invalid scale '{0}' in design variable definition")]
    InvalidScale(String),
    #[error("Expected {expected} design variable values, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DvKind {
    HicksHenne,
    SurfaceBump,
    Naca4Digits,
    Translation,
    Rotation,
    FfdControlPoint,
    FfdDihedralAngle,
    FfdTwistAngle,
    FfdRotation,
    FfdCamber,
    FfdThickness,
    FfdControlPoint2d,
    FfdCamber2d,
    FfdThickness2d,
    Custom,
    Cst,
    AngleOfAttack,
}

static KIND_CODES: phf::Map<&'static str, DvKind> = phf_map! {
    "1" => DvKind::HicksHenne,
    "2" => DvKind::SurfaceBump,
    "4" => DvKind::Naca4Digits,
    "5" => DvKind::Translation,
    "6" => DvKind::Rotation,
    "7" => DvKind::FfdControlPoint,
    "8" => DvKind::FfdDihedralAngle,
    "9" => DvKind::FfdTwistAngle,
    "10" => DvKind::FfdRotation,
    "11" => DvKind::FfdCamber,
    "12" => DvKind::FfdThickness,
    "15" => DvKind::FfdControlPoint2d,
    "16" => DvKind::FfdCamber2d,
    "17" => DvKind::FfdThickness2d,
    "19" => DvKind::Custom,
    "20" => DvKind::Cst,
    "101" => DvKind::AngleOfAttack,
};

static KIND_NAMES: phf::Map<&'static str, DvKind> = phf_map! {
    "HICKS_HENNE" => DvKind::HicksHenne,
    "SURFACE_BUMP" => DvKind::SurfaceBump,
    "NACA_4DIGITS" => DvKind::Naca4Digits,
    "TRANSLATION" => DvKind::Translation,
    "ROTATION" => DvKind::Rotation,
    "FFD_CONTROL_POINT" => DvKind::FfdControlPoint,
    "FFD_DIHEDRAL_ANGLE" => DvKind::FfdDihedralAngle,
    "FFD_TWIST_ANGLE" => DvKind::FfdTwistAngle,
    "FFD_ROTATION" => DvKind::FfdRotation,
    "FFD_CAMBER" => DvKind::FfdCamber,
    "FFD_THICKNESS" => DvKind::FfdThickness,
    "FFD_CONTROL_POINT_2D" => DvKind::FfdControlPoint2d,
    "FFD_CAMBER_2D" => DvKind::FfdCamber2d,
    "FFD_THICKNESS_2D" => DvKind::FfdThickness2d,
    "CUSTOM" => DvKind::Custom,
    "CST" => DvKind::Cst,
    "ANGLE_OF_ATTACK" => DvKind::AngleOfAttack,
};

impl DvKind {
    pub fn name(&self) -> &'static str {
        match self {
            DvKind::HicksHenne => "HICKS_HENNE",
            DvKind::SurfaceBump => "SURFACE_BUMP",
            DvKind::Naca4Digits => "NACA_4DIGITS",
            DvKind::Translation => "TRANSLATION",
            DvKind::Rotation => "ROTATION",
            DvKind::FfdControlPoint => "FFD_CONTROL_POINT",
            DvKind::FfdDihedralAngle => "FFD_DIHEDRAL_ANGLE",
            DvKind::FfdTwistAngle => "FFD_TWIST_ANGLE",
            DvKind::FfdRotation => "FFD_ROTATION",
            DvKind::FfdCamber => "FFD_CAMBER",
            DvKind::FfdThickness => "FFD_THICKNESS",
            DvKind::FfdControlPoint2d => "FFD_CONTROL_POINT_2D",
            DvKind::FfdCamber2d => "FFD_CAMBER_2D",
            DvKind::FfdThickness2d => "FFD_THICKNESS_2D",
            DvKind::Custom => "CUSTOM",
            DvKind::Cst => "CST",
            DvKind::AngleOfAttack => "ANGLE_OF_ATTACK",
        }
    }

    /// Column titles of the kind-specific parameters in gradient reports.
    pub fn param_labels(&self) -> &'static [&'static str] {
        match self {
            DvKind::HicksHenne => &["Up/Down", "Loc_Max"],
            DvKind::SurfaceBump => &["Loc_Start", "Loc_End", "Loc_Max"],
            DvKind::Naca4Digits => &["1st_digit", "2nd_digit", "3rd&4th_digits"],
            DvKind::Translation => &["x_Disp", "y_Disp", "z_Disp"],
            DvKind::Rotation => &["x_Orig", "y_Orig", "z_Orig", "x_End", "y_End", "z_End"],
            DvKind::FfdControlPoint => &[
                "FFD_Box_ID", "xIndex", "yIndex", "zIndex", "xAxis", "yAxis", "zAxis",
            ],
            DvKind::FfdDihedralAngle | DvKind::FfdTwistAngle | DvKind::FfdRotation => &[
                "FFD_Box_ID", "x_Orig", "y_Orig", "z_Orig", "x_End", "y_End", "z_End",
            ],
            DvKind::FfdCamber | DvKind::FfdThickness => &["FFD_Box_ID", "xIndex", "yIndex"],
            DvKind::FfdControlPoint2d => &["FFD_Box_ID", "xIndex", "yIndex", "xAxis", "yAxis"],
            DvKind::FfdCamber2d | DvKind::FfdThickness2d => &["FFD_Box_ID", "xIndex"],
            DvKind::Cst => &["Up/Down", "Kulfan_Index", "Total_Kulfan_Num"],
            DvKind::Custom | DvKind::AngleOfAttack => &[],
        }
    }
}

impl fmt::Display for DvKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DvKind {
    type Err = DvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        KIND_CODES
            .get(s)
            .or_else(|| KIND_NAMES.get(s.to_uppercase().as_str()))
            .copied()
            .ok_or_else(|| DvError::UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignVariable {
    pub kind: DvKind,
    pub scale: f64,
    pub markers: Vec<String>,
    /// Raw parameter tokens; FFD kinds carry a box name among numbers.
    pub params: Vec<String>,
    pub size: usize,
}

/// Parses a `DEFINITION_DV` value into its design variables.
pub fn parse_definition(value: &str) -> Result<Vec<DesignVariable>, DvError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("NONE") {
        return Ok(Vec::new());
    }

    value
        .split(';')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(parse_one)
        .collect()
}

fn parse_one(chunk: &str) -> Result<DesignVariable, DvError> {
    let inner = chunk
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| DvError::Malformed(chunk.to_string()))?;

    let sections: Vec<&str> = inner.split('|').map(str::trim).collect();
    let [head, markers, params] = sections.as_slice() else {
        return Err(DvError::Malformed(chunk.to_string()));
    };

    let (kind_str, scale_str) = head
        .split_once(',')
        .ok_or_else(|| DvError::Malformed(chunk.to_string()))?;
    let kind: DvKind = kind_str.parse()?;
    let scale: f64 = scale_str
        .trim()
        .parse()
        .map_err(|_| DvError::InvalidScale(scale_str.trim().to_string()))?;

    Ok(DesignVariable {
        kind,
        scale,
        markers: split_tokens(markers),
        params: split_tokens(params),
        size: 1,
    })
}

fn split_tokens(section: &str) -> Vec<String> {
    section
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn format_kinds(definition: &[DesignVariable]) -> String {
    definition
        .iter()
        .map(|dv| dv.kind.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The solver takes a single marker list for all design variables; the
/// first definition's markers are used.
pub fn format_markers(definition: &[DesignVariable]) -> String {
    let markers = definition
        .first()
        .map(|dv| dv.markers.join(", "))
        .unwrap_or_default();
    format!("( {} )", markers)
}

pub fn format_params(definition: &[DesignVariable]) -> String {
    definition
        .iter()
        .map(|dv| format!("( {} )", dv.params.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn format_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_and_named_kinds() {
        let dvs = parse_definition(
            "( 1, 1.0 | airfoil | 0, 0.05 ); ( FFD_CONTROL_POINT, 0.5 | wing, tail | MAIN_BOX, 1, 0, 0, 0, 0, 1 )",
        )
        .unwrap();
        assert_eq!(dvs.len(), 2);
        assert_eq!(dvs[0].kind, DvKind::HicksHenne);
        assert_eq!(dvs[0].params, vec!["0", "0.05"]);
        assert_eq!(dvs[1].kind, DvKind::FfdControlPoint);
        assert_eq!(dvs[1].scale, 0.5);
        assert_eq!(dvs[1].markers, vec!["wing", "tail"]);
        assert_eq!(dvs[1].params[0], "MAIN_BOX");
    }

    #[test]
    fn none_definition_is_empty() {
        assert!(parse_definition("NONE").unwrap().is_empty());
    }

    #[test]
    fn rejects_unknown_kind_and_malformed_entries() {
        assert_eq!(
            parse_definition("( 3, 1.0 | airfoil | 0 )"),
            Err(DvError::UnknownKind("3".into()))
        );
        assert!(matches!(
            parse_definition("( 1, 1.0 | airfoil )"),
            Err(DvError::Malformed(_))
        ));
        assert!(matches!(
            parse_definition("1, 1.0 | airfoil | 0"),
            Err(DvError::Malformed(_))
        ));
        assert_eq!(
            parse_definition("( 1, big | airfoil | 0 )"),
            Err(DvError::InvalidScale("big".into()))
        );
    }

    #[test]
    fn formats_dv_keys_like_the_solver_expects() {
        let dvs = parse_definition("( 1, 1.0 | airfoil | 0, 0.05 ); ( 1, 1.0 | airfoil | 1, 0.10 )")
            .unwrap();
        assert_eq!(format_kinds(&dvs), "HICKS_HENNE, HICKS_HENNE");
        assert_eq!(format_markers(&dvs), "( airfoil )");
        assert_eq!(format_params(&dvs), "( 0, 0.05 ); ( 1, 0.10 )");
        assert_eq!(format_values(&[0.0, 1e-4]), "0, 0.0001");
    }
}
