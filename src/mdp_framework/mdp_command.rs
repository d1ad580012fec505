use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::path::PathBuf;

use crate::{
    mdp_commands::{mdp_command_explore, mdp_command_info, mdp_command_render},
    mdp_objects::{
        example_markov_decision_processes::{ExampleMarkovDecisionProcess, example_names, parse_example},
        markov_decision_process::MarkovDecisionProcess,
        tabular_markov_decision_process::TabularMarkovDecisionProcess,
    },
};

use super::importable::Importable;

pub const MDP_COMMANDS: MdpCommand = MdpCommand::Group {
    name_short: "mdp-explore",
    name_long: None,
    explanation_short: "MDP-Explore: illustrate the time-dependent Markov chain underlying a Markov decision process.",
    explanation_long: None,
    children: &[
        &mdp_command_explore::MDP_EXPLORE,
        &mdp_command_info::MDP_INFO,
        &mdp_command_render::MDP_RENDER,
    ],
};

pub const ARG_SHORT_MODEL: char = 'm';
pub const ARG_ID_MODEL: &str = "model";
pub const ARG_SHORT_EXAMPLE: char = 'e';
pub const ARG_ID_EXAMPLE: &str = "example";
pub const ARG_SHORT_OUTPUT: char = 'o';
pub const ARG_ID_OUTPUT: &str = "output";
pub const DEFAULT_OUTPUT: &str = "img/mdp";

pub enum MdpOutput {
    String(String),
    Files(Vec<PathBuf>),
    Nothing,
}

pub enum MdpCommand {
    Group {
        name_short: &'static str,
        name_long: Option<&'static str>,
        explanation_short: &'static str,
        explanation_long: Option<&'static str>,
        children: &'static [&'static MdpCommand],
    },
    Command {
        name_short: &'static str,
        name_long: Option<&'static str>,
        explanation_short: &'static str,
        explanation_long: Option<&'static str>,
        cli_command: Option<fn(command: Command) -> Command>, //create the cli command. The model arguments are always added
        accepts_output: bool, //whether an -o argument is added

        execute: fn(mdp: &dyn MarkovDecisionProcess, cli_matches: &ArgMatches) -> Result<MdpOutput>,
    },
}

impl MdpCommand {
    pub fn build_cli(&self) -> Command {
        let mut command;
        match self {
            MdpCommand::Group {
                name_short,
                name_long,
                explanation_short,
                explanation_long,
                children,
            } => {
                command = Command::new(self.long_name())
                    .about(*explanation_short)
                    .subcommand_required(true)
                    .allow_external_subcommands(false);

                if name_long.is_some() {
                    command = command.alias(*name_short);
                }

                if let Some(l) = explanation_long {
                    command = command.long_about(*l);
                }

                for child in children.iter() {
                    command = command.subcommand(child.build_cli());
                }
            }
            MdpCommand::Command {
                name_short,
                name_long,
                explanation_short,
                explanation_long,
                cli_command,
                accepts_output,
                ..
            } => {
                command = Command::new(self.long_name()).about(*explanation_short);

                if name_long.is_some() {
                    command = command.alias(*name_short);
                }

                if let Some(l) = explanation_long {
                    command = command.long_about(*l);
                }

                command = command
                    .arg(
                        Arg::new(ARG_ID_MODEL)
                            .short(ARG_SHORT_MODEL)
                            .long(ARG_ID_MODEL)
                            .action(ArgAction::Set)
                            .value_name("FILE")
                            .help("A Markov decision process file (.mdp).")
                            .required(false)
                            .conflicts_with(ARG_ID_EXAMPLE)
                            .value_parser(value_parser!(PathBuf)),
                    )
                    .arg(
                        Arg::new(ARG_ID_EXAMPLE)
                            .short(ARG_SHORT_EXAMPLE)
                            .long(ARG_ID_EXAMPLE)
                            .action(ArgAction::Set)
                            .value_name("NAME")
                            .help(format!(
                                "A built-in Markov decision process, used if no model file is given: {}.",
                                example_names()
                            ))
                            .required(false)
                            .default_value(ExampleMarkovDecisionProcess::Shooting.to_string()),
                    );

                if let Some(f) = cli_command {
                    command = (f)(command);
                }

                if *accepts_output {
                    command = command.arg(
                        Arg::new(ARG_ID_OUTPUT)
                            .short(ARG_SHORT_OUTPUT)
                            .long(ARG_ID_OUTPUT)
                            .action(ArgAction::Set)
                            .value_name("PATH")
                            .help("Path of the pictures, without extension; existing pictures are overwritten.")
                            .required(false)
                            .default_value(DEFAULT_OUTPUT)
                            .value_parser(value_parser!(PathBuf)),
                    );
                }
            }
        };
        command
    }

    pub fn long_name(&self) -> &'static str {
        match self {
            MdpCommand::Group {
                name_short,
                name_long,
                ..
            } => name_long.unwrap_or(*name_short),
            MdpCommand::Command {
                name_short,
                name_long,
                ..
            } => name_long.unwrap_or(*name_short),
        }
    }

    pub fn execute(&self, cli_matches: &ArgMatches) -> Result<()> {
        match self {
            MdpCommand::Group { children, .. } => {
                for child in children.iter() {
                    if let Some(sub_matches) = cli_matches.subcommand_matches(child.long_name()) {
                        return child.execute(sub_matches);
                    }
                }
            }
            MdpCommand::Command { execute, .. } => {
                let mdp = read_model(cli_matches).context("reading the Markov decision process")?;

                log::info!("Starting {}", self.long_name());

                match (execute)(mdp.as_ref(), cli_matches)? {
                    MdpOutput::String(result) => println!("{}", result),
                    MdpOutput::Files(files) => {
                        for file in files {
                            println!("{}", file.display());
                        }
                    }
                    MdpOutput::Nothing => {}
                }

                return Ok(());
            }
        }
        Err(anyhow!("command not recognised"))
    }
}

pub fn read_model(cli_matches: &ArgMatches) -> Result<Box<dyn MarkovDecisionProcess>> {
    if let Some(path) = cli_matches.get_one::<PathBuf>(ARG_ID_MODEL) {
        return Ok(Box::new(TabularMarkovDecisionProcess::import_from_file(path)?));
    }
    let name = cli_matches
        .get_one::<String>(ARG_ID_EXAMPLE)
        .ok_or_else(|| anyhow!("neither a model file nor an example was given"))?;
    log::info!("Using example {}", name);
    parse_example(name)?.create()
}

pub fn get_output_path(cli_matches: &ArgMatches) -> Result<PathBuf> {
    cli_matches
        .get_one::<PathBuf>(ARG_ID_OUTPUT)
        .cloned()
        .ok_or_else(|| anyhow!("no output path given"))
}

#[cfg(test)]
mod tests {
    use super::{MDP_COMMANDS, read_model};

    #[test]
    fn cli_is_consistent() {
        MDP_COMMANDS.build_cli().debug_assert();
    }

    #[test]
    fn model_from_example_or_file() {
        let cli = MDP_COMMANDS.build_cli();

        let matches = cli
            .clone()
            .try_get_matches_from(["mdp-explore", "info"])
            .unwrap();
        let mdp = read_model(matches.subcommand_matches("info").unwrap()).unwrap();
        assert_eq!(mdp.action_label(0), "Take a regular shot");

        let matches = cli
            .clone()
            .try_get_matches_from(["mdp-explore", "info", "-e", "machine-replacement"])
            .unwrap();
        let mdp = read_model(matches.subcommand_matches("info").unwrap()).unwrap();
        assert_eq!(mdp.action_label(1), "Repair");

        let matches = cli
            .clone()
            .try_get_matches_from(["mdp-explore", "info", "-m", "testfiles/periods.mdp"])
            .unwrap();
        let mdp = read_model(matches.subcommand_matches("info").unwrap()).unwrap();
        assert_eq!(mdp.number_of_states(), 3);

        let matches = cli
            .try_get_matches_from(["mdp-explore", "info", "-m", "testfiles/does-not-exist.mdp"])
            .unwrap();
        assert!(read_model(matches.subcommand_matches("info").unwrap()).is_err());
    }
}
