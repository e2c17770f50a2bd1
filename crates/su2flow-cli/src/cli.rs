use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Aerospace Design Laboratory",
    version,
    about = "su2flow - drives SU2 solver runs: continuous adjoint gradients, gradient projection, mesh generation and config editing.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Workflow settings file in TOML format (solver location, defaults for
    /// adjoint and projection runs).
    #[arg(long, global = true, value_name = "PATH")]
    pub workflow: Option<PathBuf>,

    /// Write the collected objective values and gradients to this TOML file.
    #[arg(long, global = true, value_name = "PATH")]
    pub summary: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the continuous adjoint pipeline: direct solution, adjoint solution
    /// and gradient projection.
    Adjoint(AdjointArgs),
    /// Project adjoint surface sensitivities onto the design variables.
    Project(ProjectArgs),
    /// Generate meshes in the native SU2 format.
    Mesh(MeshArgs),
    /// Inspect or edit an SU2 configuration file.
    Config(ConfigArgs),
}

/// Arguments for the `adjoint` subcommand.
#[derive(Args, Debug)]
pub struct AdjointArgs {
    /// SU2 configuration file of the case.
    #[arg(short = 'f', long = "file", required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Number of partitions; values above 1 run the solvers under MPI.
    #[arg(short, long, value_name = "INT")]
    pub partitions: Option<usize>,

    /// Stages to compute: all, direct, adjoint, gradient or filtered.
    #[arg(short, long, value_name = "MODE")]
    pub compute: Option<String>,

    /// Merge partitioned solutions after each parallel run.
    #[arg(short, long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub output: Option<bool>,

    /// Finite difference step for the gradient projection.
    #[arg(short, long, value_name = "FLOAT")]
    pub step: Option<f64>,

    /// Decompose the grid before the parallel direct solution.
    #[arg(short, long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub divide_grid: Option<bool>,

    /// Solver output verbosity: quiet, concise or verbose.
    #[arg(long, value_name = "LEVEL")]
    pub report: Option<String>,

    /// Set a specific workflow value, overriding the workflow file.
    /// Can be used multiple times. Example: -S adjoint.step=1e-5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `project` subcommand.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// SU2 configuration file with the design variable definition.
    #[arg(short = 'f', long = "file", required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Finite difference step: one value for all design variables or one
    /// value per design variable, repeated or comma separated.
    #[arg(short, long, value_name = "FLOAT[,FLOAT...]", action = ArgAction::Append)]
    pub step: Vec<String>,

    /// Set a specific workflow value, overriding the workflow file.
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `mesh` subcommand.
#[derive(Args, Debug)]
pub struct MeshArgs {
    #[command(subcommand)]
    pub command: MeshCommands,
}

#[derive(Subcommand, Debug)]
pub enum MeshCommands {
    /// Structured rectangular channel mesh of quadrilaterals.
    Square(SquareArgs),
}

#[derive(Args, Debug)]
pub struct SquareArgs {
    /// Write the mesh to this file.
    #[arg(short = 'f', long = "file", default_value = "channel.su2", value_name = "FILE")]
    pub output: PathBuf,

    /// Number of nodes in the x direction.
    #[arg(short = 'n', long = "n-node", default_value_t = 5, value_name = "NNODE")]
    pub n_node: usize,

    /// Number of nodes in the y direction.
    #[arg(short = 'm', long = "m-node", default_value_t = 5, value_name = "MNODE")]
    pub m_node: usize,

    /// Domain length in x.
    #[arg(short = 'x', long = "x-length", default_value_t = 1.0, value_name = "XLENGTH")]
    pub x_length: f64,

    /// Domain length in y.
    #[arg(short = 'y', long = "y-length", default_value_t = 1.0, value_name = "YLENGTH")]
    pub y_length: f64,

    /// Shift subtracted from every x coordinate.
    #[arg(long = "offsetx", default_value_t = 0.0, allow_negative_numbers = true, value_name = "OFFSETX")]
    pub offset_x: f64,

    /// Shift subtracted from every y coordinate.
    #[arg(long = "offsety", default_value_t = 0.0, allow_negative_numbers = true, value_name = "OFFSETY")]
    pub offset_y: f64,
}

/// Arguments for the `config` subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the value of one or more keys.
    Get {
        #[arg(short = 'f', long = "file", required = true, value_name = "PATH")]
        config: PathBuf,
        /// Keys to look up (case-insensitive).
        #[arg(required = true, value_name = "KEY")]
        keys: Vec<String>,
    },
    /// Set keys in place, appending the ones the file does not define yet.
    Set {
        #[arg(short = 'f', long = "file", required = true, value_name = "PATH")]
        config: PathBuf,
        /// Assignments in KEY=VALUE form.
        #[arg(required = true, value_name = "KEY=VALUE")]
        pairs: Vec<String>,
        /// Write the edited config here instead of overwriting the input.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// List the design variables declared in DEFINITION_DV.
    Dv {
        #[arg(short = 'f', long = "file", required = true, value_name = "PATH")]
        config: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjoint_flags_accept_legacy_boolean_spellings() {
        let cli = Cli::parse_from([
            "su2flow", "adjoint", "-f", "inv.cfg", "-p", "4", "-o", "False", "-d", "yes", "-c",
            "direct",
        ]);
        let Commands::Adjoint(args) = cli.command else {
            panic!("Expected 'adjoint' subcommand");
        };
        assert_eq!(args.partitions, Some(4));
        assert_eq!(args.output, Some(false));
        assert_eq!(args.divide_grid, Some(true));
        assert_eq!(args.compute.as_deref(), Some("direct"));
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from([
            "su2flow",
            "project",
            "-f",
            "turb.cfg",
            "-s",
            "0.001,0.002",
            "-vv",
            "--summary",
            "out.toml",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.summary, Some(PathBuf::from("out.toml")));
        let Commands::Project(args) = cli.command else {
            panic!("Expected 'project' subcommand");
        };
        assert_eq!(args.step, vec!["0.001,0.002".to_string()]);
    }

    #[test]
    fn project_step_can_be_repeated() {
        let cli = Cli::parse_from([
            "su2flow", "project", "-f", "turb.cfg", "-s", "0.001", "-s", "0.002,0.003",
        ]);
        let Commands::Project(args) = cli.command else {
            panic!("Expected 'project' subcommand");
        };
        assert_eq!(args.step, vec!["0.001".to_string(), "0.002,0.003".to_string()]);
    }

    #[test]
    fn square_mesh_defaults_and_negative_offsets() {
        let cli = Cli::parse_from(["su2flow", "mesh", "square", "--offsetx", "-0.5"]);
        let Commands::Mesh(MeshArgs {
            command: MeshCommands::Square(args),
        }) = cli.command
        else {
            panic!("Expected 'mesh square' subcommand");
        };
        assert_eq!(args.output, PathBuf::from("channel.su2"));
        assert_eq!((args.n_node, args.m_node), (5, 5));
        assert_eq!(args.offset_x, -0.5);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["su2flow", "-q", "-v", "config", "dv", "-f", "a.cfg"]);
        assert!(result.is_err());
    }
}
