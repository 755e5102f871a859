// Command handlers module
pub mod config;
pub mod monitor;
pub mod snapshot;

use std::path::PathBuf;

use anyhow::Result;
use clap::ArgMatches;

use crate::core::Config;

/// Load the configuration named by `--config`, or the default one
pub(crate) fn load_config(matches: &ArgMatches) -> Result<Config> {
    let path = matches.get_one::<PathBuf>("config");
    Config::resolve(path.map(PathBuf::as_path))
}
