use clap::Subcommand;

use super::config::ConfigArgs;
use super::replay::ReplayArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Replay a mutation script and print the drained changelists
    Replay(ReplayArgs),

    /// Inspect the effective configuration
    Config(ConfigArgs),

    /// Show version and build information
    Info,
}
