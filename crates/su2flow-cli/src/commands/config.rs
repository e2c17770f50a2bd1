use crate::cli::{ConfigArgs, ConfigCommands};
use crate::error::{CliError, Result};
use crate::utils::parser;
use std::path::Path;
use su2flow::core::config::Su2Config;
use su2flow::core::config::dv::DesignVariable;
use su2flow::engine::error::EngineError;
use tracing::info;

pub async fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Get { config, keys } => {
            let su2 = read(&config)?;
            for line in get_lines(&su2, &keys) {
                println!("{}", line);
            }
        }
        ConfigCommands::Set {
            config,
            pairs,
            output,
        } => {
            let mut su2 = read(&config)?;
            let assignments = pairs
                .iter()
                .map(|p| parser::parse_key_value(p))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| CliError::Argument(e.to_string()))?;
            su2.set_many(assignments);

            let target = output.as_deref().unwrap_or(&config);
            su2.write_to_path(target).map_err(EngineError::from)?;
            info!("Wrote {} assignment(s) to {:?}", pairs.len(), target);
        }
        ConfigCommands::Dv { config } => {
            let su2 = read(&config)?;
            let definition = su2.definition_dv().map_err(EngineError::from)?;
            for line in dv_lines(&definition) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<Su2Config> {
    Su2Config::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn get_lines(su2: &Su2Config, keys: &[String]) -> Vec<String> {
    keys.iter()
        .map(|key| match su2.get(key) {
            Some(value) => format!("{}= {}", key.to_uppercase(), value),
            None => format!("% {} is not set", key.to_uppercase()),
        })
        .collect()
}

fn dv_lines(definition: &[DesignVariable]) -> Vec<String> {
    definition
        .iter()
        .enumerate()
        .map(|(i, dv)| {
            format!(
                "{:>3}  {:<22} scale {:<8} markers [{}]  params [{}]",
                i,
                dv.kind.name(),
                dv.scale,
                dv.markers.join(", "),
                dv.params.join(", ")
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use su2flow::core::config::dv::DvKind;

    const CONFIG: &str = "\
% Case
MATH_PROBLEM= DIRECT
EXT_ITER= 250
DEFINITION_DV= ( 1, 1.0 | airfoil | 0, 0.05 ); ( 5, 0.5 | wing | 1, 0.0, 0.2 )
";

    fn parsed() -> Su2Config {
        Su2Config::read_from(&mut Cursor::new(CONFIG)).unwrap()
    }

    #[test]
    fn get_reports_values_and_missing_keys() {
        let lines = get_lines(&parsed(), &["ext_iter".to_string(), "CFL_NUMBER".to_string()]);
        assert_eq!(lines, vec!["EXT_ITER= 250", "% CFL_NUMBER is not set"]);
    }

    #[tokio::test]
    async fn set_writes_edits_to_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("case.cfg");
        let output = dir.path().join("edited.cfg");
        std::fs::write(&input, CONFIG).unwrap();

        run(ConfigArgs {
            command: ConfigCommands::Set {
                config: input.clone(),
                pairs: vec!["EXT_ITER=500".to_string(), "CFL_NUMBER= 4.0".to_string()],
                output: Some(output.clone()),
            },
        })
        .await
        .unwrap();

        let edited = Su2Config::read_from_path(&output).unwrap();
        assert_eq!(edited.get("EXT_ITER"), Some("500"));
        assert_eq!(edited.get("CFL_NUMBER"), Some("4.0"));
        assert_eq!(std::fs::read_to_string(&input).unwrap(), CONFIG);
    }

    #[tokio::test]
    async fn set_rejects_malformed_assignment() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("case.cfg");
        std::fs::write(&input, CONFIG).unwrap();

        let err = run(ConfigArgs {
            command: ConfigCommands::Set {
                config: input,
                pairs: vec!["EXT_ITER".to_string()],
                output: None,
            },
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Argument(_)));
    }

    #[test]
    fn dv_lines_describe_each_design_variable() {
        let definition = parsed().definition_dv().unwrap();
        assert_eq!(definition[0].kind, DvKind::HicksHenne);
        let lines = dv_lines(&definition);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("HICKS_HENNE"));
        assert!(lines[1].contains("markers [wing]"));
    }
}
