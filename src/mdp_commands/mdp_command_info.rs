use anyhow::Result;
use clap::{ArgMatches, Command};
use std::fmt::Write;

use crate::{
    mdp_commands::mdp_command_render::{get_time, time_arg},
    mdp_framework::mdp_command::{MdpCommand, MdpOutput},
    mdp_objects::{markov_decision_process::MarkovDecisionProcess, transition_graph::Diagnostic},
    techniques::transition_graph_builder::{GraphOptions, ToTransitionGraph},
};

pub const MDP_INFO: MdpCommand = MdpCommand::Command {
    name_short: "info",
    name_long: None,
    explanation_short: "Show the states and controls of a Markov decision process, and check its transition matrices.",
    explanation_long: None,
    cli_command: Some(cli_info),
    accepts_output: false,
    execute: execute_info,
};

fn cli_info(command: Command) -> Command {
    command.arg(time_arg())
}

fn execute_info(mdp: &dyn MarkovDecisionProcess, cli_matches: &ArgMatches) -> Result<MdpOutput> {
    let time = get_time(cli_matches)?;
    Ok(MdpOutput::String(info(mdp, time)?))
}

pub fn info(mdp: &dyn MarkovDecisionProcess, time: usize) -> Result<String> {
    let mut f = String::new();
    let labels = mdp.state_labels();

    writeln!(
        f,
        "Markov decision process with {} states and {} controls.",
        mdp.number_of_states(),
        mdp.number_of_controls()
    )?;

    writeln!(f, "States:")?;
    for state in 0..mdp.number_of_states() {
        match labels.get(&state) {
            Some(label) => writeln!(f, "\t{}: {}", state, label)?,
            None => writeln!(f, "\t{}: (unlabelled)", state)?,
        }
    }

    writeln!(f, "Controls:")?;
    for action in 0..mdp.number_of_controls() {
        writeln!(f, "\t{}: {}", action, mdp.action_label(action))?;
    }

    write!(f, "Transition matrices at time {}:", time)?;
    for action in 0..mdp.number_of_controls() {
        write!(f, "\n\t{}: ", action)?;
        match mdp.to_transition_graph(action, time, &labels, &GraphOptions::default()) {
            Ok(graph) => {
                let row_sums = graph
                    .diagnostics
                    .iter()
                    .filter(|diagnostic| matches!(diagnostic, Diagnostic::RowSum { .. }))
                    .map(|diagnostic| diagnostic.to_string())
                    .collect::<Vec<_>>();
                if row_sums.is_empty() {
                    write!(f, "all rows sum to one")?;
                } else {
                    write!(f, "{}", row_sums.join("; "))?;
                }
            }
            Err(err) => write!(f, "{:#}", err)?,
        }
    }

    Ok(f)
}
