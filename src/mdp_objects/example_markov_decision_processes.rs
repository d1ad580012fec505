use anyhow::{Result, anyhow};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter, EnumString};

use super::{
    markov_decision_process::MarkovDecisionProcess,
    tabular_markov_decision_process::{Control, TabularMarkovDecisionProcess},
};

/// Markov decision processes that ship with the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ExampleMarkovDecisionProcess {
    Shooting,
    MachineReplacement,
}

impl ExampleMarkovDecisionProcess {
    pub fn explanation(&self) -> &'static str {
        match self {
            ExampleMarkovDecisionProcess::Shooting => {
                "a target is either hit or missed; a regular shot is more reliable than a blind one"
            }
            ExampleMarkovDecisionProcess::MachineReplacement => {
                "a machine breaks down over time and repairs get worse as service personnel becomes scarce"
            }
        }
    }

    pub fn create(&self) -> Result<Box<dyn MarkovDecisionProcess>> {
        Ok(match self {
            ExampleMarkovDecisionProcess::Shooting => Box::new(shooting()?),
            ExampleMarkovDecisionProcess::MachineReplacement => Box::new(MachineReplacement::default()),
        })
    }
}

pub fn shooting() -> Result<TabularMarkovDecisionProcess> {
    let mut state_labels = BTreeMap::new();
    state_labels.insert(0, "Target hit".to_string());
    state_labels.insert(1, "Target missed".to_string());

    TabularMarkovDecisionProcess::new(
        2,
        state_labels,
        vec![
            Control::time_invariant("Take a regular shot", vec![vec![0.7, 0.3], vec![0.5, 0.5]]),
            Control::time_invariant("Take a blind shot", vec![vec![0.3, 0.7], vec![0.0, 1.0]]),
        ],
    )
}

/**
 * A variant of the machine replacement problem: as the equipment gets older, the availability of
 * knowledgeable service personnel decays and hence the risk of a bad repair increases.
 */
#[derive(Debug, Clone)]
pub struct MachineReplacement {
    pub breakdown_probability: f64,
    pub repair_decay: f64,
}

impl Default for MachineReplacement {
    fn default() -> Self {
        Self {
            breakdown_probability: 0.1,
            repair_decay: 50.0,
        }
    }
}

impl MachineReplacement {
    pub const WORKING: usize = 0;
    pub const BROKEN: usize = 1;

    pub const KEEP_RUNNING: usize = 0;
    pub const REPAIR: usize = 1;

    /// Probability that a repair at the given time results in a working machine.
    pub fn good_repair_probability(&self, time: usize) -> f64 {
        (-(time as f64) / self.repair_decay).exp()
    }
}

impl MarkovDecisionProcess for MachineReplacement {
    fn number_of_states(&self) -> usize {
        2
    }

    fn number_of_controls(&self) -> usize {
        2
    }

    fn state_labels(&self) -> BTreeMap<usize, String> {
        let mut labels = BTreeMap::new();
        labels.insert(Self::WORKING, "Working".to_string());
        labels.insert(Self::BROKEN, "Broken".to_string());
        labels
    }

    fn action_label(&self, action: usize) -> String {
        match action {
            Self::KEEP_RUNNING => "Keep running".to_string(),
            Self::REPAIR => "Repair".to_string(),
            _ => format!("Action {}", action),
        }
    }

    fn transition_probability(&self, from: usize, to: usize, time: usize, action: usize) -> f64 {
        let to_working = match (action, from) {
            (Self::KEEP_RUNNING, Self::WORKING) => 1.0 - self.breakdown_probability,
            (Self::KEEP_RUNNING, Self::BROKEN) => 0.0,
            (Self::REPAIR, Self::WORKING) => 1.0,
            (Self::REPAIR, Self::BROKEN) => self.good_repair_probability(time),
            _ => return 0.0,
        };
        match to {
            Self::WORKING => to_working,
            Self::BROKEN => 1.0 - to_working,
            _ => 0.0,
        }
    }
}

pub fn example_names() -> String {
    use strum::IntoEnumIterator;
    ExampleMarkovDecisionProcess::iter()
        .map(|example| example.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn parse_example(name: &str) -> Result<ExampleMarkovDecisionProcess> {
    name.parse::<ExampleMarkovDecisionProcess>()
        .map_err(|_| anyhow!("unknown example `{}`; known examples are {}", name, example_names()))
}
