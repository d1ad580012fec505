use anyhow::Result;
use clap::ArgMatches;
use std::io::{self, Write};

use crate::{
    mdp_framework::mdp_command::{MdpCommand, MdpOutput, get_output_path},
    mdp_objects::markov_decision_process::MarkovDecisionProcess,
    techniques::explorer::Explorer,
};

pub const MDP_EXPLORE: MdpCommand = MdpCommand::Command {
    name_short: "exp",
    name_long: Some("explore"),
    explanation_short: "Explore a Markov decision process interactively.",
    explanation_long: Some(
        "Explore a Markov decision process interactively. Commands are read from standard input, one per line; every change of the time, the action or a display option renders the transition graph again. Type `help` for a list of commands.",
    ),
    cli_command: None,
    accepts_output: true,
    execute: execute_explore,
};

fn execute_explore(mdp: &dyn MarkovDecisionProcess, cli_matches: &ArgMatches) -> Result<MdpOutput> {
    let output_path = get_output_path(cli_matches)?;
    let mut explorer = Explorer::new(mdp, &output_path);

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    writeln!(stdout, "Type `help` for a list of commands.")?;

    let stdin = io::stdin();
    explorer.run(&mut stdin.lock(), &mut stdout)?;

    Ok(MdpOutput::Nothing)
}
