use crate::utils::parser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use stackfault::core::io::unitcell::UnitcellFormat;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Stackfault Developers",
    version,
    about = "Stackfault CLI - Generate supercells of layered crystals with stochastic stacking faults.",
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

    /// Set the number of threads for parallel generation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a single supercell, optionally with independent faults on one layer.
    Supercell(SupercellArgs),
    /// Build an unfaulted reference plus one faulted supercell per (probability, vector) pair.
    Batch(BatchArgs),
    /// Build one transition-matrix supercell per fault probability.
    Markov(MarkovArgs),
}

/// Input format of the unit-cell file.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Toml,
    Csv,
}

impl From<FormatArg> for UnitcellFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Toml => UnitcellFormat::Toml,
            FormatArg::Csv => UnitcellFormat::Csv,
        }
    }
}

/// Arguments shared by every generating subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Path to a run configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the unit-cell file (.toml or .csv), overriding `structure.path`.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Force the unit-cell input format instead of guessing it from the extension.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Lattice for CSV unit cells as `a,b,c,alpha,beta,gamma`.
    #[arg(long, value_name = "A,B,C,AL,BE,GA", value_parser = parser::parse_lattice)]
    pub lattice: Option<[f64; 6]>,

    /// Number of unit-cell repeats along c.
    #[arg(short = 'n', long, value_name = "INT")]
    pub n_stacks: Option<usize>,

    /// Seed for the random generator. Drawn from entropy and logged when absent.
    #[arg(long, value_name = "U64")]
    pub seed: Option<u64>,

    /// Directory the structures are written to.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S structure.n-stacks=50
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `supercell` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct SupercellArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Layer that may be faulted. Requires --vector and --probability.
    #[arg(long, value_name = "NAME")]
    pub faulted_layer: Option<String>,

    /// Stacking vector `x,y,z` in unit-cell fractions.
    #[arg(long, value_name = "X,Y,Z", value_parser = parser::parse_vector, allow_hyphen_values = true)]
    pub vector: Option<[f64; 3]>,

    /// Fault probability in [0, 1].
    #[arg(short, long, value_name = "FLOAT")]
    pub probability: Option<f64>,

    /// Name of the written structure. Defaults to `<cell>_x<n-stacks>`.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
}

/// Arguments for the `batch` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct BatchArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Layer that may be faulted.
    #[arg(long, value_name = "NAME")]
    pub faulted_layer: Option<String>,

    /// Fault probabilities, comma separated.
    #[arg(short, long, value_name = "P1,P2,...", value_delimiter = ',')]
    pub probabilities: Option<Vec<f64>>,

    /// Stacking vector `x,y,z`. Repeat for several vectors.
    #[arg(long = "vector", value_name = "X,Y,Z", value_parser = parser::parse_vector, allow_hyphen_values = true)]
    pub vectors: Vec<[f64; 3]>,

    /// File name of the metadata table inside the output directory.
    #[arg(long, value_name = "NAME")]
    pub table_name: Option<String>,
}

/// Arguments for the `markov` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct MarkovArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Transition table CSV (`start,next,probability,dx,dy,dz`).
    #[arg(short, long, value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Layer the `F` placeholder stands for.
    #[arg(long, value_name = "NAME")]
    pub faulted_layer: Option<String>,

    /// Fault probabilities, comma separated.
    #[arg(short, long, value_name = "P1,P2,...", value_delimiter = ',')]
    pub probabilities: Option<Vec<f64>>,
}
