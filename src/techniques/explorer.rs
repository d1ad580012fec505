use anyhow::{Error, Result, anyhow};
use std::{
    fmt,
    io::{BufRead, Write},
    path::{Path, PathBuf},
    str::FromStr,
};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    mdp_framework::mdp_output::render_all,
    mdp_objects::markov_decision_process::MarkovDecisionProcess,
    techniques::transition_graph_builder::{GraphOptions, ToTransitionGraph},
};

/// Largest time step the time control accepts.
pub const MAX_TIME: usize = 10000;

/**
 * Every control event rebuilds and re-renders the whole graph before the next event is read.
 * Beyond this many states x controls that becomes too slow to do per event, and events would need debouncing.
 */
pub const SYNCHRONOUS_REBUILD_LIMIT: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum Toggle {
    #[strum(serialize = "probabilities")]
    ShowProbabilities,
    #[strum(serialize = "numbers")]
    ShowStateNumbers,
    #[strum(serialize = "percentage")]
    UsePercentage,
    #[strum(serialize = "pdf")]
    SaveToPdf,
}

impl Toggle {
    pub fn explanation(&self) -> &'static str {
        match self {
            Toggle::ShowProbabilities => "show probabilities",
            Toggle::ShowStateNumbers => "show state numbers",
            Toggle::UsePercentage => "use %",
            Toggle::SaveToPdf => "save to pdf",
        }
    }
}

/// The current value of every control of an explorer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplorerControls {
    pub time: usize,
    pub action: usize,
    pub show_probabilities: bool,
    pub show_state_numbers: bool,
    pub use_percentage: bool,
    pub save_to_pdf: bool,
}

impl Default for ExplorerControls {
    fn default() -> Self {
        Self {
            time: 0,
            action: 0,
            show_probabilities: true,
            show_state_numbers: false,
            use_percentage: false,
            save_to_pdf: false,
        }
    }
}

impl ExplorerControls {
    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            show_probabilities: self.show_probabilities,
            use_percentage: self.use_percentage,
            show_state_numbers: self.show_state_numbers,
        }
    }

    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::ShowProbabilities => self.show_probabilities,
            Toggle::ShowStateNumbers => self.show_state_numbers,
            Toggle::UsePercentage => self.use_percentage,
            Toggle::SaveToPdf => self.save_to_pdf,
        }
    }

    pub fn set(&mut self, toggle: Toggle, value: bool) {
        match toggle {
            Toggle::ShowProbabilities => self.show_probabilities = value,
            Toggle::ShowStateNumbers => self.show_state_numbers = value,
            Toggle::UsePercentage => self.use_percentage = value,
            Toggle::SaveToPdf => self.save_to_pdf = value,
        }
    }

    /// The formats a rebuild writes: always png, and pdf while saving is switched on.
    pub fn formats(&self) -> Vec<&'static str> {
        if self.save_to_pdf {
            vec!["png", "pdf"]
        } else {
            vec!["png"]
        }
    }
}

impl fmt::Display for ExplorerControls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "time {}, action {}", self.time, self.action)?;
        for toggle in Toggle::iter() {
            write!(f, ", {} {}", toggle, if self.get(toggle) { "on" } else { "off" })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Time(usize),
    Action(usize),
    /// Switch a toggle on or off, or flip it if no value is given.
    Toggle(Toggle, Option<bool>),
    Render,
    Status,
    Help,
    Quit,
}

impl ControlEvent {
    /// Whether handling the event changes the picture.
    pub fn triggers_rebuild(&self) -> bool {
        matches!(
            self,
            ControlEvent::Time(_) | ControlEvent::Action(_) | ControlEvent::Toggle(_, _) | ControlEvent::Render
        )
    }
}

fn parse_switch(value: &str) -> Result<bool> {
    match value {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(anyhow!("`{}` is neither on nor off", value)),
    }
}

impl FromStr for ControlEvent {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = words.next().ok_or_else(|| anyhow!("empty command"))?;
        let argument = words.next();
        if let Some(extra) = words.next() {
            return Err(anyhow!("unexpected `{}` after `{}`", extra, command));
        }

        let number = |what: &str| -> Result<usize> {
            let argument = argument.ok_or_else(|| anyhow!("`{}` needs a {}", command, what))?;
            argument
                .parse::<usize>()
                .map_err(|_| anyhow!("`{}` is not a valid {}", argument, what))
        };

        let event = match command {
            "time" | "t" => ControlEvent::Time(number("time step")?),
            "action" | "control" | "a" => ControlEvent::Action(number("control")?),
            "render" | "r" => ControlEvent::Render,
            "status" | "s" => ControlEvent::Status,
            "help" | "h" | "?" => ControlEvent::Help,
            "quit" | "exit" | "q" => ControlEvent::Quit,
            _ => {
                let toggle = command.parse::<Toggle>().map_err(|_| {
                    anyhow!("unknown command `{}`; type `help` for a list of commands", command)
                })?;
                ControlEvent::Toggle(toggle, argument.map(parse_switch).transpose()?)
            }
        };

        if argument.is_some() && !matches!(event, ControlEvent::Time(_) | ControlEvent::Action(_) | ControlEvent::Toggle(_, _)) {
            return Err(anyhow!("`{}` takes no argument", command));
        }
        Ok(event)
    }
}

pub fn help() -> String {
    let mut result = format!(
        "time <k>        set the time step (0 to {})\naction <u>      select the control\n",
        MAX_TIME
    );
    for toggle in Toggle::iter() {
        result.push_str(&format!(
            "{:<16}{} (on, off, or flip without argument)\n",
            format!("{} [on|off]", toggle),
            toggle.explanation()
        ));
    }
    result.push_str("render          render again\nstatus          show the controls\nquit            end the session\n");
    result
}

/**
 * An interactive session over one Markov decision process.
 *
 * Each control event is handled to completion: the graph is rebuilt from scratch and written to the output path,
 * overwriting the previous picture.
 */
pub struct Explorer<'a> {
    mdp: &'a dyn MarkovDecisionProcess,
    output_path: PathBuf,
    controls: ExplorerControls,
}

impl<'a> Explorer<'a> {
    pub fn new(mdp: &'a dyn MarkovDecisionProcess, output_path: &Path) -> Self {
        let size = mdp.number_of_states().saturating_mul(mdp.number_of_controls());
        if size > SYNCHRONOUS_REBUILD_LIMIT {
            log::warn!(
                "the process has {} states x controls, more than the {} that can be comfortably rebuilt on every event",
                size,
                SYNCHRONOUS_REBUILD_LIMIT
            );
        }
        Self {
            mdp,
            output_path: output_path.to_path_buf(),
            controls: ExplorerControls::default(),
        }
    }

    pub fn controls(&self) -> &ExplorerControls {
        &self.controls
    }

    /// Builds the graph for the current controls and writes it; returns the files written.
    pub fn rebuild(&self) -> Result<Vec<PathBuf>> {
        let labels = self.mdp.state_labels();
        let graph = self.mdp.to_transition_graph(
            self.controls.action,
            self.controls.time,
            &labels,
            &self.controls.graph_options(),
        )?;
        render_all(&graph, &self.output_path, &self.controls.formats())
    }

    /// Applies the event to the controls. Returns whether the picture needs to be rebuilt.
    /// An action the process does not have is refused and leaves the controls unchanged.
    pub fn apply(&mut self, event: ControlEvent) -> Result<bool> {
        match event {
            ControlEvent::Time(time) => {
                if time > MAX_TIME {
                    log::warn!("time {} is beyond {}; using {}", time, MAX_TIME, MAX_TIME);
                }
                self.controls.time = time.min(MAX_TIME);
            }
            ControlEvent::Action(action) => {
                if !self.mdp.is_valid_action(action) {
                    return Err(anyhow!(
                        "there is no action {}; the actions are 0 to {}",
                        action,
                        self.mdp.number_of_controls().saturating_sub(1)
                    ));
                }
                self.controls.action = action;
            }
            ControlEvent::Toggle(toggle, value) => {
                let value = value.unwrap_or(!self.controls.get(toggle));
                self.controls.set(toggle, value);
            }
            ControlEvent::Render | ControlEvent::Status | ControlEvent::Help | ControlEvent::Quit => {}
        }
        Ok(event.triggers_rebuild())
    }

    /// Reads control events line by line until the input ends or the user quits.
    pub fn run(&mut self, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<()> {
        self.report_rebuild(output)?;

        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            let event = match line.parse::<ControlEvent>() {
                Ok(event) => event,
                Err(err) => {
                    writeln!(output, "error: {}", err)?;
                    continue;
                }
            };
            log::debug!("control event {:?}", event);

            match event {
                ControlEvent::Quit => break,
                ControlEvent::Help => write!(output, "{}", help())?,
                ControlEvent::Status => writeln!(output, "{}", self.controls)?,
                _ => match self.apply(event) {
                    Ok(true) => self.report_rebuild(output)?,
                    Ok(false) => {}
                    Err(err) => writeln!(output, "error: {}", err)?,
                },
            }
        }
        Ok(())
    }

    fn report_rebuild(&self, output: &mut dyn Write) -> Result<()> {
        match self.rebuild() {
            Ok(files) => {
                for file in files {
                    writeln!(output, "written {}", file.display())?;
                }
            }
            Err(err) => writeln!(output, "error: {:#}", err)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Cursor, path::PathBuf};
    use uuid::Uuid;

    use crate::mdp_objects::{
        example_markov_decision_processes::shooting,
        tabular_markov_decision_process::TabularMarkovDecisionProcess,
    };

    use super::{ControlEvent, Explorer, MAX_TIME, Toggle};

    fn temp_output() -> PathBuf {
        std::env::temp_dir()
            .join(format!("mdp_explore_{}", Uuid::new_v4()))
            .join("mdp")
    }

    #[test]
    fn parse_events() {
        assert_eq!("time 5".parse::<ControlEvent>().unwrap(), ControlEvent::Time(5));
        assert_eq!(" action 1 ".parse::<ControlEvent>().unwrap(), ControlEvent::Action(1));
        assert_eq!(
            "pdf on".parse::<ControlEvent>().unwrap(),
            ControlEvent::Toggle(Toggle::SaveToPdf, Some(true))
        );
        assert_eq!(
            "percentage".parse::<ControlEvent>().unwrap(),
            ControlEvent::Toggle(Toggle::UsePercentage, None)
        );
        assert_eq!("quit".parse::<ControlEvent>().unwrap(), ControlEvent::Quit);

        assert!("time".parse::<ControlEvent>().is_err());
        assert!("time -1".parse::<ControlEvent>().is_err());
        assert!("numbers maybe".parse::<ControlEvent>().is_err());
        assert!("render now".parse::<ControlEvent>().is_err());
        assert!("fly".parse::<ControlEvent>().is_err());
    }

    #[test]
    fn apply_events() {
        let mdp = shooting().unwrap();
        let mut explorer = Explorer::new(&mdp, &temp_output());

        assert!(explorer.apply(ControlEvent::Time(MAX_TIME + 1)).unwrap());
        assert_eq!(explorer.controls().time, MAX_TIME);

        assert!(explorer.apply(ControlEvent::Toggle(Toggle::ShowProbabilities, None)).unwrap());
        assert!(!explorer.controls().show_probabilities);
        assert!(
            explorer
                .apply(ControlEvent::Toggle(Toggle::ShowProbabilities, Some(true)))
                .unwrap()
        );
        assert!(explorer.controls().show_probabilities);

        assert_eq!(explorer.controls().formats(), vec!["png"]);
        explorer
            .apply(ControlEvent::Toggle(Toggle::SaveToPdf, Some(true)))
            .unwrap();
        assert_eq!(explorer.controls().formats(), vec!["png", "pdf"]);

        assert!(!explorer.apply(ControlEvent::Status).unwrap());
    }

    #[test]
    fn unknown_action_is_refused() {
        let mdp = shooting().unwrap();
        let mut explorer = Explorer::new(&mdp, &temp_output());

        assert!(explorer.apply(ControlEvent::Action(1)).unwrap());
        assert_eq!(explorer.controls().action, 1);

        assert!(explorer.apply(ControlEvent::Action(99)).is_err());
        assert!(explorer.apply(ControlEvent::Action(2)).is_err());
        assert_eq!(explorer.controls().action, 1);
    }

    #[test]
    fn session_writes_png_and_pdf_on_demand() {
        let mdp = shooting().unwrap();
        let output_path = temp_output();
        let mut explorer = Explorer::new(&mdp, &output_path);

        let mut input = Cursor::new("time 3\naction 1\naction 99\nstatus\npdf on\nquit\ntime 4\n");
        let mut output = vec![];
        explorer.run(&mut input, &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output_path.with_extension("png").exists());
        assert!(output_path.with_extension("pdf").exists());
        //initial render, time, action and pdf events: four png files and one pdf file
        assert_eq!(output.matches(".png").count(), 4);
        assert_eq!(output.matches(".pdf").count(), 1);
        //the refused action neither renders nor shows up in the status
        assert!(output.contains("error: there is no action 99"));
        assert!(output.contains("time 3, action 1,"));
        //the session ended before the last line
        assert_eq!(explorer.controls().time, 3);

        let png = fs::read(output_path.with_extension("png")).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        fs::remove_dir_all(output_path.parent().unwrap()).unwrap();
    }

    #[test]
    fn session_survives_errors() {
        let fin = fs::read_to_string("testfiles/negative.mdp").unwrap();
        let mdp = fin.parse::<TabularMarkovDecisionProcess>().unwrap();
        let output_path = temp_output();
        let mut explorer = Explorer::new(&mdp, &output_path);

        let mut input = Cursor::new("jump\ntime 2\n");
        let mut output = vec![];
        explorer.run(&mut input, &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert_eq!(output.matches("error:").count(), 3);
        assert!(!output_path.with_extension("png").exists());
        assert_eq!(explorer.controls().time, 2);
    }
}
