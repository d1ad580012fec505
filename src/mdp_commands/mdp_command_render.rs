use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, builder::PossibleValuesParser, value_parser};

use crate::{
    mdp_framework::{
        mdp_command::{MdpCommand, MdpOutput, get_output_path},
        mdp_file_handler::{MDP_FILE_HANDLERS, get_file_extensions},
        mdp_output::render_all,
    },
    mdp_objects::markov_decision_process::MarkovDecisionProcess,
    techniques::{
        explorer::MAX_TIME,
        transition_graph_builder::{GraphOptions, ToTransitionGraph},
    },
};

pub const ARG_ID_TIME: &str = "time";
pub const ARG_ID_ACTION: &str = "action";
pub const ARG_ID_HIDE_PROBABILITIES: &str = "hide-probabilities";
pub const ARG_ID_STATE_NUMBERS: &str = "state-numbers";
pub const ARG_ID_PERCENTAGE: &str = "percentage";
pub const ARG_ID_PDF: &str = "pdf";
pub const ARG_ID_FORMAT: &str = "format";

pub const MDP_RENDER: MdpCommand = MdpCommand::Command {
    name_short: "ren",
    name_long: Some("render"),
    explanation_short: "Render the transition graph of one action at one time step.",
    explanation_long: Some(
        "Render the transition graph of one action at one time step. Every state gets a node for the chosen action, and the action node has an edge to every state it may lead to, with a width proportional to the probability. A png picture is always written; further formats are added with -f, and --pdf adds a pdf picture.",
    ),
    cli_command: Some(cli_render),
    accepts_output: true,
    execute: execute_render,
};

pub fn time_arg() -> Arg {
    Arg::new(ARG_ID_TIME)
        .short('t')
        .long(ARG_ID_TIME)
        .action(ArgAction::Set)
        .value_name("TIME")
        .help("The time step.")
        .required(false)
        .default_value("0")
        .value_parser(value_parser!(u64).range(0..=MAX_TIME as u64))
}

pub fn get_time(cli_matches: &ArgMatches) -> Result<usize> {
    let time = cli_matches.get_one::<u64>(ARG_ID_TIME).copied().unwrap_or(0);
    usize::try_from(time).context("time step out of range")
}

fn cli_render(command: Command) -> Command {
    let formats = MDP_FILE_HANDLERS
        .iter()
        .map(|file_handler| format!("{}: {}", file_handler, file_handler.format_specification))
        .collect::<Vec<_>>()
        .join("\n");

    command
        .arg(time_arg())
        .arg(
            Arg::new(ARG_ID_ACTION)
                .short('a')
                .long(ARG_ID_ACTION)
                .action(ArgAction::Set)
                .value_name("ACTION")
                .help("The control action; an action that does not exist falls back to action 0.")
                .required(false)
                .default_value("0")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new(ARG_ID_HIDE_PROBABILITIES)
                .long(ARG_ID_HIDE_PROBABILITIES)
                .action(ArgAction::SetTrue)
                .help("Do not write probabilities on the edges."),
        )
        .arg(
            Arg::new(ARG_ID_STATE_NUMBERS)
                .long(ARG_ID_STATE_NUMBERS)
                .action(ArgAction::SetTrue)
                .help("Prefix the labels of states with their number."),
        )
        .arg(
            Arg::new(ARG_ID_PERCENTAGE)
                .long(ARG_ID_PERCENTAGE)
                .action(ArgAction::SetTrue)
                .help("Write probabilities as percentages."),
        )
        .arg(
            Arg::new(ARG_ID_PDF)
                .long(ARG_ID_PDF)
                .action(ArgAction::SetTrue)
                .help("Save a pdf picture as well."),
        )
        .arg(
            Arg::new(ARG_ID_FORMAT)
                .short('f')
                .long(ARG_ID_FORMAT)
                .action(ArgAction::Append)
                .value_name("FORMAT")
                .help("Further formats to write; png is always written.")
                .long_help(formats)
                .required(false)
                .value_parser(PossibleValuesParser::new(get_file_extensions())),
        )
}

pub fn get_graph_options(cli_matches: &ArgMatches) -> GraphOptions {
    GraphOptions {
        show_probabilities: !cli_matches.get_flag(ARG_ID_HIDE_PROBABILITIES),
        use_percentage: cli_matches.get_flag(ARG_ID_PERCENTAGE),
        show_state_numbers: cli_matches.get_flag(ARG_ID_STATE_NUMBERS),
    }
}

/// The formats to write: png first, then the requested ones in order, then pdf if --pdf is given.
pub fn get_formats(cli_matches: &ArgMatches) -> Vec<String> {
    let mut formats = vec!["png".to_string()];
    formats.extend(
        cli_matches
            .get_many::<String>(ARG_ID_FORMAT)
            .into_iter()
            .flatten()
            .cloned(),
    );
    if cli_matches.get_flag(ARG_ID_PDF) {
        formats.push("pdf".to_string());
    }
    let mut seen = vec![];
    formats.retain(|format| {
        if seen.contains(format) {
            false
        } else {
            seen.push(format.clone());
            true
        }
    });
    formats
}

fn execute_render(mdp: &dyn MarkovDecisionProcess, cli_matches: &ArgMatches) -> Result<MdpOutput> {
    let time = get_time(cli_matches)?;
    let action = cli_matches.get_one::<usize>(ARG_ID_ACTION).copied().unwrap_or(0);
    let options = get_graph_options(cli_matches);
    let output_path = get_output_path(cli_matches)?;

    let graph = mdp.to_transition_graph(action, time, &mdp.state_labels(), &options)?;

    let formats = get_formats(cli_matches);
    let formats = formats.iter().map(String::as_str).collect::<Vec<_>>();
    Ok(MdpOutput::Files(render_all(&graph, &output_path, &formats)?))
}
