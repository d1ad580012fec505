use anyhow::{Context, Result};
use clap::{Args, FromArgMatches, crate_version};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use env_logger::Builder;

use mdp_explore::mdp_framework::mdp_command::MDP_COMMANDS;

pub fn main() -> Result<()> {
    let command = MDP_COMMANDS.build_cli();
    let command = Verbosity::<WarnLevel>::augment_args(command.version(crate_version!()));
    let cli_matches = command.get_matches();

    //warnings are shown by default, as they report problems with the model
    let verbosity = Verbosity::<WarnLevel>::from_arg_matches(&cli_matches)?;
    Builder::new()
        .filter_level(verbosity.log_level_filter())
        .parse_default_env()
        .init();

    log::info!("MDP-Explore starting");

    MDP_COMMANDS.execute(&cli_matches).context("Executing MDP-Explore")
}
