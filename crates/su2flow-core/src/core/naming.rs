//! Static naming tables shared by the solver and its output files: plot file
//! extensions, adjoint file suffixes, and history column names.

use phf::{phf_map, phf_set};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NamingError {
    #[error("Unknown output format '{0}'")]
    UnknownFormat(String),
    #[error("No adjoint suffix is defined for objective '{0}'")]
    UnknownObjective(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Tecplot,
    TecplotBinary,
    Paraview,
    Fieldview,
    Cgns,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Tecplot => ".dat",
            OutputFormat::TecplotBinary => ".plt",
            OutputFormat::Paraview => ".csv",
            OutputFormat::Fieldview => ".uns",
            OutputFormat::Cgns => ".cgns",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TECPLOT" => Ok(OutputFormat::Tecplot),
            "TECPLOT_BINARY" => Ok(OutputFormat::TecplotBinary),
            "PARAVIEW" => Ok(OutputFormat::Paraview),
            "FIELDVIEW" => Ok(OutputFormat::Fieldview),
            "CGNS" => Ok(OutputFormat::Cgns),
            other => Err(NamingError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Tecplot => "TECPLOT",
            OutputFormat::TecplotBinary => "TECPLOT_BINARY",
            OutputFormat::Paraview => "PARAVIEW",
            OutputFormat::Fieldview => "FIELDVIEW",
            OutputFormat::Cgns => "CGNS",
        };
        f.write_str(name)
    }
}

pub fn plot_extension(format: OutputFormat) -> &'static str {
    format.extension()
}

static ADJOINT_SUFFIXES: phf::Map<&'static str, &'static str> = phf_map! {
    "DRAG" => "cd",
    "LIFT" => "cl",
    "SIDEFORCE" => "csf",
    "MOMENT_X" => "cmx",
    "MOMENT_Y" => "cmy",
    "MOMENT_Z" => "cmz",
    "FORCE_X" => "cfx",
    "FORCE_Y" => "cfy",
    "FORCE_Z" => "cfz",
    "EFFICIENCY" => "eff",
    "EQUIVALENT_AREA" => "ea",
    "NEARFIELD_PRESSURE" => "nfp",
    "THRUST" => "ct",
    "TORQUE" => "cq",
    "FIGURE_OF_MERIT" => "merit",
    "FREE_SURFACE" => "fs",
    "TOTAL_HEATFLUX" => "totheat",
    "MAXIMUM_HEATFLUX" => "maxheat",
    "INVERSE_DESIGN_PRESSURE" => "invpress",
    "INVERSE_DESIGN_HEATFLUX" => "invheat",
    "AVG_TOTAL_PRESSURE" => "avtp",
    "MASS_FLOW_RATE" => "mfr",
    "COMBO" => "combo",
};

/// Collapses a comma separated multi-objective into `COMBO`.
pub fn objective_key(objective: &str) -> String {
    let parts: Vec<&str> = objective
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    match parts.as_slice() {
        [single] => single.to_uppercase(),
        _ => "COMBO".to_string(),
    }
}

pub fn adjoint_suffix(objective: &str) -> Result<&'static str, NamingError> {
    let key = objective_key(objective);
    ADJOINT_SUFFIXES
        .get(key.as_str())
        .copied()
        .ok_or(NamingError::UnknownObjective(key))
}

static HISTORY_COLUMNS: phf::Map<&'static str, &'static str> = phf_map! {
    "Iteration" => "ITERATION",
    "CLift" => "LIFT",
    "CDrag" => "DRAG",
    "CSideForce" => "SIDEFORCE",
    "CMx" => "MOMENT_X",
    "CMy" => "MOMENT_Y",
    "CMz" => "MOMENT_Z",
    "CFx" => "FORCE_X",
    "CFy" => "FORCE_Y",
    "CFz" => "FORCE_Z",
    "CL/CD" => "EFFICIENCY",
    "CEff" => "EFFICIENCY",
    "CEquivArea" => "EQUIVALENT_AREA",
    "CNearFieldOF" => "NEARFIELD_PRESSURE",
    "CT" => "THRUST",
    "CQ" => "TORQUE",
    "CMerit" => "FIGURE_OF_MERIT",
    "CFreeSurface" => "FREE_SURFACE",
    "HeatFlux_Total" => "TOTAL_HEATFLUX",
    "HeatFlux_Maximum" => "MAXIMUM_HEATFLUX",
    "Avg_TotalPress" => "AVG_TOTAL_PRESSURE",
    "MassFlowRate" => "MASS_FLOW_RATE",
    "Time(min)" => "TIME",
};

static OBJECTIVES: phf::Set<&'static str> = phf_set! {
    "DRAG", "LIFT", "SIDEFORCE", "MOMENT_X", "MOMENT_Y", "MOMENT_Z",
    "FORCE_X", "FORCE_Y", "FORCE_Z", "EFFICIENCY", "EQUIVALENT_AREA",
    "NEARFIELD_PRESSURE", "THRUST", "TORQUE", "FIGURE_OF_MERIT",
    "FREE_SURFACE", "TOTAL_HEATFLUX", "MAXIMUM_HEATFLUX",
    "INVERSE_DESIGN_PRESSURE", "INVERSE_DESIGN_HEATFLUX",
    "AVG_TOTAL_PRESSURE", "MASS_FLOW_RATE",
};

/// Canonical name of a history file column header.
pub fn history_column(header: &str) -> String {
    let header = header.trim().trim_matches('"').trim();
    HISTORY_COLUMNS
        .get(header)
        .map(|name| name.to_string())
        .unwrap_or_else(|| header.to_uppercase())
}

pub fn is_objective(name: &str) -> bool {
    OBJECTIVES.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parses_and_maps_to_extension() {
        assert_eq!("tecplot".parse::<OutputFormat>(), Ok(OutputFormat::Tecplot));
        assert_eq!(plot_extension("PARAVIEW".parse().unwrap()), ".csv");
        assert_eq!(OutputFormat::TecplotBinary.extension(), ".plt");
        assert!("VTK".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn adjoint_suffix_handles_single_and_combined_objectives() {
        assert_eq!(adjoint_suffix("DRAG"), Ok("cd"));
        assert_eq!(adjoint_suffix(" lift "), Ok("cl"));
        assert_eq!(adjoint_suffix("DRAG, LIFT"), Ok("combo"));
        assert_eq!(
            adjoint_suffix("WAVE_DRAG"),
            Err(NamingError::UnknownObjective("WAVE_DRAG".into()))
        );
    }

    #[test]
    fn history_headers_map_to_canonical_names() {
        assert_eq!(history_column("\"Iteration\""), "ITERATION");
        assert_eq!(history_column(" \"CDrag\" "), "DRAG");
        assert_eq!(history_column("Res_Flow[0]"), "RES_FLOW[0]");
        assert!(is_objective("DRAG"));
        assert!(!is_objective("ITERATION"));
    }
}
