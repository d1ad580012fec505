use anyhow::{Context, Error, Result, anyhow};
use serde_json::Value;
use std::{collections::BTreeMap, io::BufRead, str::FromStr};

use crate::{json, mdp_framework::importable::Importable};

use super::markov_decision_process::MarkovDecisionProcess;

pub const FORMAT_SPECIFICATION: &str = "A Markov decision process is a JSON structure with the top level being an object.
    This object contains the following key-value pairs:
    - `states` being the number of states (at least one);
    - `stateLabels` (optional) being a list of objects, each with `state` being a state index and `label` being its label;
    - `controls` being a non-empty list of controls.
    Each control is an object with `label` being the description of the control, and either
    `transitions` being a states x states matrix of probabilities (time-invariant), or
    `periods` being a non-empty list of such matrices, where time k uses period min(k, number of periods - 1).
    The row of a matrix is the source state, the column is the target state.
    Probabilities are numbers or literals holding a fraction, such as \"1/3\".
    For instance:
    {\"states\": 2, \"stateLabels\": [{\"state\": 0, \"label\": \"Target hit\"}, {\"state\": 1, \"label\": \"Target missed\"}],
     \"controls\": [{\"label\": \"Take a regular shot\", \"transitions\": [[0.7, 0.3], [0.5, 0.5]]}]}";

pub type TransitionMatrix = Vec<Vec<f64>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub label: String,
    pub periods: Vec<TransitionMatrix>,
}

impl Control {
    pub fn time_invariant(label: &str, transitions: TransitionMatrix) -> Self {
        Self {
            label: label.to_string(),
            periods: vec![transitions],
        }
    }

    pub fn matrix_at(&self, time: usize) -> Option<&TransitionMatrix> {
        let period = time.min(self.periods.len().checked_sub(1)?);
        self.periods.get(period)
    }
}

/// A Markov decision process given by explicit transition matrices per control.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularMarkovDecisionProcess {
    number_of_states: usize,
    state_labels: BTreeMap<usize, String>,
    controls: Vec<Control>,
}

impl TabularMarkovDecisionProcess {
    pub fn new(
        number_of_states: usize,
        state_labels: BTreeMap<usize, String>,
        controls: Vec<Control>,
    ) -> Result<Self> {
        if number_of_states == 0 {
            return Err(anyhow!("a Markov decision process needs at least one state"));
        }
        if controls.is_empty() {
            return Err(anyhow!("a Markov decision process needs at least one control"));
        }
        for (action, control) in controls.iter().enumerate() {
            if control.periods.is_empty() {
                return Err(anyhow!("control {} has no transition matrix", action));
            }
            for (period, matrix) in control.periods.iter().enumerate() {
                Self::check_dimensions(number_of_states, matrix).with_context(|| {
                    format!("control {} (`{}`), period {}", action, control.label, period)
                })?;
            }
        }
        Ok(Self {
            number_of_states,
            state_labels,
            controls,
        })
    }

    fn check_dimensions(number_of_states: usize, matrix: &TransitionMatrix) -> Result<()> {
        if matrix.len() != number_of_states {
            return Err(anyhow!(
                "matrix has {} rows, whereas there are {} states",
                matrix.len(),
                number_of_states
            ));
        }
        for (from, row) in matrix.iter().enumerate() {
            if row.len() != number_of_states {
                return Err(anyhow!(
                    "row {} has {} columns, whereas there are {} states",
                    from,
                    row.len(),
                    number_of_states
                ));
            }
        }
        Ok(())
    }

    pub fn get_controls(&self) -> &Vec<Control> {
        &self.controls
    }

    fn read_matrix(json: &Value) -> Result<TransitionMatrix> {
        let mut matrix = vec![];
        for (from, row) in json::read_list(json)?.iter().enumerate() {
            let row = json::read_list(row).with_context(|| format!("reading row {}", from))?;
            let row = row
                .iter()
                .enumerate()
                .map(|(to, value)| {
                    json::read_real(value).with_context(|| format!("reading row {}, column {}", from, to))
                })
                .collect::<Result<Vec<_>>>()?;
            matrix.push(row);
        }
        Ok(matrix)
    }

    fn read_control(json: &Value) -> Result<Control> {
        let label = json::read_field_string(json, "label")?;
        let periods = match (json::has_field(json, "transitions"), json::has_field(json, "periods")) {
            (true, false) => vec![Self::read_matrix(&json["transitions"]).context("reading transitions")?],
            (false, true) => json::read_field_list(json, "periods")?
                .iter()
                .enumerate()
                .map(|(period, matrix)| {
                    Self::read_matrix(matrix).with_context(|| format!("reading period {}", period))
                })
                .collect::<Result<Vec<_>>>()?,
            (true, true) => return Err(anyhow!("control has both `transitions` and `periods`")),
            (false, false) => return Err(anyhow!("control has neither `transitions` nor `periods`")),
        };
        Ok(Control { label, periods })
    }
}

impl MarkovDecisionProcess for TabularMarkovDecisionProcess {
    fn number_of_states(&self) -> usize {
        self.number_of_states
    }

    fn number_of_controls(&self) -> usize {
        self.controls.len()
    }

    fn state_labels(&self) -> BTreeMap<usize, String> {
        self.state_labels.clone()
    }

    fn action_label(&self, action: usize) -> String {
        match self.controls.get(action) {
            Some(control) => control.label.clone(),
            None => format!("Action {}", action),
        }
    }

    fn transition_probability(&self, from: usize, to: usize, time: usize, action: usize) -> f64 {
        self.controls
            .get(action)
            .and_then(|control| control.matrix_at(time))
            .and_then(|matrix| matrix.get(from))
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(0.0)
    }
}

impl Importable for TabularMarkovDecisionProcess {
    fn import(reader: &mut dyn BufRead) -> Result<Self> {
        let json: Value = serde_json::from_reader(reader).context("parsing JSON")?;

        let number_of_states = json::read_field_number(&json, "states")?;

        let mut state_labels = BTreeMap::new();
        if json::has_field(&json, "stateLabels") {
            for (pos, entry) in json::read_field_list(&json, "stateLabels")?.iter().enumerate() {
                let state = json::read_field_number(entry, "state")
                    .with_context(|| format!("reading state label {}", pos))?;
                let label = json::read_field_string(entry, "label")
                    .with_context(|| format!("reading state label {}", pos))?;
                state_labels.insert(state, label);
            }
        }

        let controls = json::read_field_list(&json, "controls")?
            .iter()
            .enumerate()
            .map(|(action, control)| {
                Self::read_control(control).with_context(|| format!("reading control {}", action))
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "imported Markov decision process with {} states and {} controls",
            number_of_states,
            controls.len()
        );

        Self::new(number_of_states, state_labels, controls)
    }
}

impl FromStr for TabularMarkovDecisionProcess {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::import(&mut s.as_bytes())
    }
}
