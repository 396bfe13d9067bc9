//! Application related stuff

use crate::core::common::Float;
use clap::Parser;

lazy_static! {
    /// The global application options.
    pub static ref OPTIONS: Options = Options::parse();
}

/// Returns the global application options.
pub fn options() -> &'static Options {
    &OPTIONS
}

/// System wide options.
#[derive(Parser, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Options {
    /// Form-factor threshold below which two patches may be linked without
    /// further subdivision.
    #[arg(
        long = "f-eps",
        value_name = "FLOAT",
        default_value_t = 0.04,
        help = "Estimated form factor below which patches are linked directly."
    )]
    pub f_eps: Float,

    /// Minimum allowed patch area; subdivision below this is refused.
    #[arg(
        long = "a-eps",
        value_name = "FLOAT",
        default_value_t = 0.005,
        help = "Minimum patch area in world units squared."
    )]
    pub a_eps: Float,

    /// Radiometric threshold below which a link is not refined.
    #[arg(
        long = "bf-eps",
        value_name = "FLOAT",
        default_value_t = 0.001,
        help = "Per-link energy threshold that triggers link refinement."
    )]
    pub bf_eps: Float,

    /// Jacobi-style relaxation steps per solve pass.
    #[arg(
        long = "iterations",
        short = 'i',
        value_name = "NUM",
        default_value_t = 16,
        help = "Gather/push-pull iterations per solve pass."
    )]
    pub max_iterations: usize,

    /// Path of the PLY file to write the refined mesh to.
    #[arg(
        long = "outfile",
        short = 'o',
        value_name = "FILE",
        help = "Write the refined mesh with per-vertex radiosity as ASCII PLY."
    )]
    pub outfile: Option<String>,

    /// Suppress all text output other than error messages.
    #[arg(long, help = "Suppress all text output other than error messages.")]
    pub quiet: bool,
}
